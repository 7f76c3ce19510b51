use eframe::egui::{Context, Key, Modifiers, Rect};

use concept_graph::interaction::{HostInput, InputSource};

/// Window-level keys and canvas resizes gathered from egui each frame.
#[derive(Debug, Default)]
pub(super) struct EguiInput {
    canvas: Option<Rect>,
    pending: Vec<HostInput>,
}

impl EguiInput {
    pub(super) fn capture(&mut self, ctx: &Context) {
        let (focus_search, escape) = ctx.input_mut(|input| {
            (
                input.consume_key(Modifiers::COMMAND, Key::K),
                input.key_pressed(Key::Escape),
            )
        });

        if focus_search {
            self.pending.push(HostInput::FocusSearch);
        }
        if escape {
            self.pending.push(HostInput::Escape);
        }
    }

    pub(super) fn observe_canvas(&mut self, rect: Rect) {
        if self.canvas == Some(rect) {
            return;
        }
        self.canvas = Some(rect);
        self.pending.push(HostInput::Resized(rect));
    }
}

impl InputSource for EguiInput {
    fn poll(&mut self, sink: &mut Vec<HostInput>) {
        sink.append(&mut self.pending);
    }
}
