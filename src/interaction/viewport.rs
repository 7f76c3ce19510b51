use eframe::egui::{Pos2, Rect, Vec2};

/// Pan/zoom transform between simulation space and the screen. Zooming and
/// panning never touch simulation coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub rect: Rect,
    pub pan: Vec2,
    pub zoom: f32,
}

impl Viewport {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            pan: Vec2::ZERO,
            zoom: 1.0,
        }
    }

    /// Simulation-space point shown at the center of an untransformed view.
    pub fn world_center(&self) -> Vec2 {
        self.rect.size() * 0.5
    }

    pub fn world_to_screen(&self, world: Vec2) -> Pos2 {
        self.rect.min + self.pan + world * self.zoom
    }

    pub fn screen_to_world(&self, screen: Pos2) -> Vec2 {
        (screen - self.rect.min - self.pan) / self.zoom
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan += delta;
    }

    /// Scales around `pointer`, keeping the point under it fixed.
    pub fn zoom_at(&mut self, pointer: Pos2, scroll: f32, min_zoom: f32, max_zoom: f32) {
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let world_before = self.screen_to_world(pointer);
        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.zoom = (self.zoom * zoom_factor).clamp(min_zoom, max_zoom);
        self.pan = pointer - self.rect.min - (world_before * self.zoom);
    }
}
