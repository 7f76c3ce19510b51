use eframe::egui::Vec2;

use crate::physics::Simulation;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hit {
    Node(usize),
    Edge(usize),
}

/// Distance from `point` to the segment `start..end`.
pub fn point_segment_distance(point: Vec2, start: Vec2, end: Vec2) -> f32 {
    let segment = end - start;
    let length_sq = segment.length_sq();
    if length_sq <= f32::EPSILON {
        return (point - start).length();
    }

    let t = ((point - start).dot(segment) / length_sq).clamp(0.0, 1.0);
    (point - (start + segment * t)).length()
}

/// Hit-tests in simulation space. Node circles sit above the edge layer, so a
/// node under the pointer always wins; otherwise the nearest edge whose hit
/// band (`edge_hit_width` wide, centered on the line) covers the point.
pub fn hit_test(
    simulation: &Simulation,
    point: Vec2,
    node_radius: f32,
    edge_hit_width: f32,
) -> Option<Hit> {
    let bodies = simulation.bodies();

    let node = bodies
        .iter()
        .enumerate()
        .filter_map(|(index, body)| {
            let distance = (body.position - point).length();
            (distance <= node_radius).then_some((index, distance))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1));
    if let Some((index, _)) = node {
        return Some(Hit::Node(index));
    }

    let half_width = edge_hit_width * 0.5;
    simulation
        .edges()
        .iter()
        .enumerate()
        .filter_map(|(index, edge)| {
            let start = bodies.get(edge.source.index()?)?.position;
            let end = bodies.get(edge.target.index()?)?.position;
            let distance = point_segment_distance(point, start, end);
            (distance <= half_width).then_some((index, distance))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(index, _)| Hit::Edge(index))
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use eframe::egui::vec2;

    use super::*;
    use crate::filter::Subgraph;
    use crate::graph::EdgeType;
    use crate::graph::fixtures::{edge, node};
    use crate::physics::{LayoutConfig, SimulationId, TickOutcome};

    #[test]
    fn segment_distance_clamps_to_endpoints() {
        let start = vec2(0.0, 0.0);
        let end = vec2(10.0, 0.0);
        assert_abs_diff_eq!(point_segment_distance(vec2(5.0, 3.0), start, end), 3.0);
        assert_abs_diff_eq!(point_segment_distance(vec2(-4.0, 3.0), start, end), 5.0);
        assert_abs_diff_eq!(point_segment_distance(vec2(2.0, 2.0), start, start), 8.0_f32.sqrt());
    }

    #[test]
    fn nodes_win_over_edges_and_wide_band_catches_near_misses() {
        let subgraph = Subgraph {
            nodes: vec![node("a", "memory"), node("b", "memory")],
            edges: vec![edge("a", "b", EdgeType::DependsOn)],
        };
        let mut simulation = Simulation::new(
            SimulationId::first(),
            &subgraph,
            vec2(0.0, 0.0),
            LayoutConfig::default(),
        );
        let id = simulation.id();
        while simulation.tick(id) == TickOutcome::Stepped {}
        let a = simulation.bodies()[0].position;
        let b = simulation.bodies()[1].position;

        assert_eq!(hit_test(&simulation, a, 12.0, 20.0), Some(Hit::Node(0)));

        let along = b - a;
        let normal = vec2(-along.y, along.x).normalized();
        let midpoint = a + along * 0.5;
        assert!(along.length() > 30.0);
        assert_eq!(
            hit_test(&simulation, midpoint + normal * 8.0, 12.0, 20.0),
            Some(Hit::Edge(0))
        );
        assert_eq!(hit_test(&simulation, midpoint + normal * 8.0, 12.0, 2.0), None);
        assert_eq!(hit_test(&simulation, midpoint + normal * 500.0, 12.0, 20.0), None);
    }
}
