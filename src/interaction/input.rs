use eframe::egui::Rect;

/// Window-level signals the host forwards to the engine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HostInput {
    Resized(Rect),
    FocusSearch,
    Escape,
}

/// Capability the host injects so the engine never reads window state itself.
pub trait InputSource {
    fn poll(&mut self, sink: &mut Vec<HostInput>);
}

/// Input source fed by hand; used by headless hosts and tests.
#[derive(Debug, Default)]
pub struct QueuedInput {
    pending: Vec<HostInput>,
}

impl QueuedInput {
    pub fn push(&mut self, input: HostInput) {
        self.pending.push(input);
    }
}

impl InputSource for QueuedInput {
    fn poll(&mut self, sink: &mut Vec<HostInput>) {
        sink.append(&mut self.pending);
    }
}
