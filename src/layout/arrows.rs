//! Pointer arrows

use super::geometry::{quadratic_point, Point};
use super::LayoutConfig;
use crate::timeline::{HeapId, Pointee};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde::Serialize;

/// Length of each arrowhead wing
pub const HEAD_LENGTH: f64 = 12.0;

/// A pointer waiting for its target to be resolved
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub from: String,
    pub start: Point,
    pub pointee: Pointee,
}

/// A routed arrow: a quadratic curve from `start` to `end`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Arrow {
    pub from: String,
    pub to: String,
    pub start: Point,
    pub control: Point,
    pub end: Point,
}

impl Arrow {
    /// Pull both ends in from the node centers by `arrow_edge_offset` (at
    /// most a quarter of the chord each), then bow the curve perpendicular
    /// to the shortened chord by a third of its length, capped at
    /// `arrow_max_bow`. Returns `None` for links shorter than
    /// `arrow_min_distance`.
    pub fn route(
        from: impl Into<String>,
        to: impl Into<String>,
        start: Point,
        end: Point,
        config: &LayoutConfig,
    ) -> Option<Arrow> {
        let distance = start.distance_to(end);
        if distance < config.arrow_min_distance || distance == 0.0 {
            return None;
        }

        let (ux, uy) = ((end.x - start.x) / distance, (end.y - start.y) / distance);
        let inset = config.arrow_edge_offset.min(distance / 4.0);
        let start = start.offset(ux * inset, uy * inset);
        let end = end.offset(-ux * inset, -uy * inset);

        let bow = config.arrow_max_bow.min((distance - 2.0 * inset) / 3.0);
        let control = start.midpoint(end).offset(-uy * bow, ux * bow);

        Some(Arrow {
            from: from.into(),
            to: to.into(),
            start,
            control,
            end,
        })
    }

    /// Points along the curve, `segments + 1` of them, endpoints included
    pub fn sample(&self, segments: usize) -> Vec<Point> {
        let segments = segments.max(1);
        (0..=segments)
            .map(|i| {
                let t = i as f64 / segments as f64;
                quadratic_point(self.start, self.control, self.end, t)
            })
            .collect()
    }

    /// The two wing tips of the arrowhead at `end`, following the curve's
    /// final tangent
    pub fn head(&self) -> (Point, Point) {
        let (dx, dy) = (self.end.x - self.control.x, self.end.y - self.control.y);
        let angle = dy.atan2(dx);
        let spread = std::f64::consts::PI / 7.0;
        let wing = |a: f64| {
            self.end
                .offset(-HEAD_LENGTH * a.cos(), -HEAD_LENGTH * a.sin())
        };
        (wing(angle + spread), wing(angle - spread))
    }
}

/// Resolve each link to a target position and route it.
///
/// Targets are found by heap identity, then by name, then (for fields) by
/// `<object>.<target>`. Links with no target are dropped.
pub fn resolve(
    links: &[Link],
    positions: &IndexMap<String, Point>,
    heap_nodes: &FxHashMap<HeapId, String>,
    config: &LayoutConfig,
) -> Vec<Arrow> {
    links
        .iter()
        .filter_map(|link| {
            let (to, end) = target_of(link, positions, heap_nodes)?;
            Arrow::route(&link.from, to, link.start, end, config)
        })
        .collect()
}

fn target_of(
    link: &Link,
    positions: &IndexMap<String, Point>,
    heap_nodes: &FxHashMap<HeapId, String>,
) -> Option<(String, Point)> {
    let by_identity = link
        .pointee
        .heap
        .and_then(|id| heap_nodes.get(&id))
        .and_then(|name| positions.get(name).map(|p| (name.clone(), *p)));
    if by_identity.is_some() {
        return by_identity;
    }

    if let Some(p) = positions.get(&link.pointee.name) {
        return Some((link.pointee.name.clone(), *p));
    }

    let (object, _) = link.from.split_once('.')?;
    let sibling = format!("{}.{}", object, link.pointee.name);
    positions.get(&sibling).map(|p| (sibling.clone(), *p))
}
