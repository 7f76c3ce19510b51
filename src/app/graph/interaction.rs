use eframe::egui::{self, Rect, Response, Ui};

use concept_graph::interaction::{PointerButton, PointerEvent};

use super::super::ViewModel;

fn map_button(button: egui::PointerButton) -> Option<PointerButton> {
    match button {
        egui::PointerButton::Primary => Some(PointerButton::Primary),
        egui::PointerButton::Secondary => Some(PointerButton::Secondary),
        egui::PointerButton::Middle => Some(PointerButton::Middle),
        egui::PointerButton::Extra1 | egui::PointerButton::Extra2 => None,
    }
}

impl ViewModel {
    /// Replays this frame's raw pointer events into the engine. A press that
    /// starts on the canvas keeps the pointer captured until its release.
    pub(in crate::app) fn forward_pointer(&mut self, ui: &Ui, rect: Rect, response: &Response) {
        let over_canvas = response.contains_pointer();
        let events = ui.input(|input| input.events.clone());

        for event in events {
            let pointer_event = match event {
                egui::Event::PointerMoved(pos) if self.pointer_captured || rect.contains(pos) => {
                    Some(PointerEvent::Moved { pos })
                }
                egui::Event::PointerMoved(_) => Some(PointerEvent::Left),
                egui::Event::PointerButton {
                    pos,
                    button,
                    pressed: true,
                    ..
                } if over_canvas && rect.contains(pos) => {
                    map_button(button).map(|button| {
                        self.pointer_captured = true;
                        PointerEvent::Pressed { pos, button }
                    })
                }
                egui::Event::PointerButton {
                    pos,
                    pressed: false,
                    ..
                } if self.pointer_captured => {
                    self.pointer_captured = false;
                    Some(PointerEvent::Released { pos })
                }
                egui::Event::PointerGone if !self.pointer_captured => Some(PointerEvent::Left),
                _ => None,
            };

            if let Some(pointer_event) = pointer_event {
                self.engine.handle_pointer(pointer_event);
            }
        }

        if !over_canvas {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pos = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        self.engine.handle_pointer(PointerEvent::Wheel { pos, delta: scroll });
    }
}
