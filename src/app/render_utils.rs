use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2};

const ARROW_LENGTH: f32 = 9.0;
const ARROW_HALF_WIDTH: f32 = 4.5;

pub(super) fn draw_background(painter: &Painter, rect: Rect, pan: Vec2, zoom: f32) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));

    let step = (56.0 * zoom.clamp(0.6, 1.8)).max(20.0);
    let origin = rect.min + pan;
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 70));

    let mut x = rect.left() + (origin.x - rect.left()).rem_euclid(step);
    while x < rect.right() {
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
        x += step;
    }

    let mut y = rect.top() + (origin.y - rect.top()).rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
        y += step;
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

pub(super) fn edge_visible(rect: Rect, start: Pos2, end: Pos2, padding: f32) -> bool {
    let min_x = start.x.min(end.x) - padding;
    let max_x = start.x.max(end.x) + padding;
    let min_y = start.y.min(end.y) - padding;
    let max_y = start.y.max(end.y) + padding;

    if max_x < rect.left() || min_x > rect.right() || max_y < rect.top() || min_y > rect.bottom() {
        return false;
    }

    if rect.contains(start) || rect.contains(end) {
        return true;
    }

    let top_left = rect.left_top();
    let top_right = rect.right_top();
    let bottom_left = rect.left_bottom();
    let bottom_right = rect.right_bottom();

    segments_intersect(start, end, top_left, top_right)
        || segments_intersect(start, end, top_right, bottom_right)
        || segments_intersect(start, end, bottom_right, bottom_left)
        || segments_intersect(start, end, bottom_left, top_left)
}

fn segments_intersect(a1: Pos2, a2: Pos2, b1: Pos2, b2: Pos2) -> bool {
    fn cross(o: Pos2, a: Pos2, b: Pos2) -> f32 {
        let oa = a - o;
        let ob = b - o;
        (oa.x * ob.y) - (oa.y * ob.x)
    }

    let c1 = cross(a1, a2, b1);
    let c2 = cross(a1, a2, b2);
    let c3 = cross(b1, b2, a1);
    let c4 = cross(b1, b2, a2);

    (c1 <= 0.0 && c2 >= 0.0 || c1 >= 0.0 && c2 <= 0.0)
        && (c3 <= 0.0 && c4 >= 0.0 || c3 >= 0.0 && c4 <= 0.0)
}

/// Triangle whose tip touches the rim of the target circle. `None` when the
/// endpoints overlap so the direction is undefined.
pub(super) fn arrowhead(
    from: Pos2,
    to: Pos2,
    target_radius: f32,
    line_width: f32,
) -> Option<[Pos2; 3]> {
    let delta = to - from;
    let length = delta.length();
    let scale = (line_width / 2.0).clamp(0.6, 2.0);
    let arrow_length = ARROW_LENGTH * scale;
    if length <= target_radius + arrow_length {
        return None;
    }

    let direction = delta / length;
    let normal = direction.rot90();
    let tip = to - direction * target_radius;
    let base = tip - direction * arrow_length;
    let half_width = ARROW_HALF_WIDTH * scale;

    Some([tip, base + normal * half_width, base - normal * half_width])
}

#[cfg(test)]
mod tests {
    use eframe::egui::{pos2, vec2};

    use super::*;

    #[test]
    fn arrow_tip_sits_on_target_rim() {
        let [tip, left, right] = arrowhead(pos2(0.0, 0.0), pos2(100.0, 0.0), 12.0, 2.0).unwrap();
        assert_eq!(tip, pos2(88.0, 0.0));
        assert!(left.x < tip.x && right.x < tip.x);
        assert_eq!(left.y, -right.y);
    }

    #[test]
    fn overlapping_endpoints_have_no_arrow() {
        assert!(arrowhead(pos2(0.0, 0.0), pos2(10.0, 0.0), 12.0, 2.0).is_none());
    }

    #[test]
    fn edge_crossing_rect_is_visible() {
        let rect = Rect::from_min_size(pos2(0.0, 0.0), vec2(100.0, 100.0));
        assert!(edge_visible(rect, pos2(-50.0, 50.0), pos2(150.0, 50.0), 0.0));
        assert!(!edge_visible(rect, pos2(-50.0, -50.0), pos2(-10.0, 150.0), 0.0));
        assert!(circle_visible(rect, pos2(-5.0, 50.0), 10.0));
    }
}
