//! Hit testing: pointer position → graph element.
//!
//! All resolvers are first-match in declaration (or display) order. There
//! is no nearest-of-several tie break: when two elements are both within
//! range, the one declared first wins.

use crate::scene::LegendItem;
use kurbo::{Point, Vec2};
use rp_core::{CandidateRoute, Edge, GraphModel, Vertex};

/// Distance from `p` to the segment `a`–`b`.
///
/// Projects `p` onto the line through `a` and `b`, clamps the projection
/// parameter to `[0, 1]`, and measures to the clamped point. A degenerate
/// segment (`a == b`) is the point `a`.
pub fn dist_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let ab: Vec2 = b - a;
    let len_sq = ab.hypot2();
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// First vertex strictly within `radius` of `p`.
pub fn resolve_vertex(graph: &GraphModel, p: Point, radius: f64) -> Option<&Vertex> {
    graph
        .vertices()
        .find(|v| p.distance(Point::new(v.x, v.y)) < radius)
}

/// First edge whose midpoint marker is strictly within `radius` of `p`.
pub fn resolve_edge_marker(graph: &GraphModel, p: Point, radius: f64) -> Option<&Edge> {
    graph
        .edges()
        .find(|e| p.distance(Point::new(e.midpoint.0, e.midpoint.1)) < radius)
}

/// Index of the first candidate route with any segment strictly within
/// `threshold` of `p`. Segments whose endpoints are not in `graph` are
/// skipped.
pub fn resolve_edge_segment(
    graph: &GraphModel,
    p: Point,
    routes: &[CandidateRoute],
    threshold: f64,
) -> Option<usize> {
    routes.iter().position(|route| {
        route_distance(graph, p, route).is_some_and(|d| d < threshold)
    })
}

/// Minimum distance from `p` to any drawable segment of `route`.
pub fn route_distance(graph: &GraphModel, p: Point, route: &CandidateRoute) -> Option<f64> {
    route
        .segments()
        .filter_map(|(from, to)| {
            let a = graph.vertex(from)?;
            let b = graph.vertex(to)?;
            Some(dist_to_segment(
                p,
                Point::new(a.x, a.y),
                Point::new(b.x, b.y),
            ))
        })
        .min_by(|x, y| x.total_cmp(y))
}

/// Candidate index of the legend control containing `p`.
pub fn resolve_legend(legend: &[LegendItem], p: Point) -> Option<usize> {
    legend
        .iter()
        .find(|item| item.rect.contains(p))
        .map(|item| item.index)
}
