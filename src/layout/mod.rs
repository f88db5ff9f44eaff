//! Memory layout
//!
//! Turns a [`Projection`] into canvas geometry:
//! - [`shapes`]: stack/heap partition, shape per record, object boxes
//! - [`arrows`]: pointer-to-pointee routing
//! - [`frames`]: text listings for the call-stack panel
//! - [`draw`]: a flat, backend-neutral draw list
//!
//! # Placement
//!
//! The canvas holds two sections side by side, stack on the left and heap on
//! the right. Within a section records fill a row-major grid in live order.
//! Records named `<object>.<field>` whose object is placed in the same
//! section are drawn inside that object instead of taking a cell. A row is
//! `row_pitch` tall unless one of its nodes needs more. The same projection
//! always yields the same geometry.

pub mod arrows;
pub mod draw;
pub mod frames;
pub mod geometry;
pub mod shapes;

pub use arrows::Arrow;
pub use draw::{draw_commands, Anchor, DrawCommand, Ink};
pub use frames::{describe_event, describe_record, frame_listings, FrameListing};
pub use geometry::{Bounds, Point};
pub use shapes::{display_value, FieldShape, PlacedField, PlacedNode, Region, Shape};

use crate::projection::Projection;
use crate::timeline::{HeapId, VariableRecord};
use arrows::Link;
use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

/// Vertical clearance kept between a tall node and the next grid row
pub const ROW_GAP: f64 = 20.0;

/// Canvas metrics, in canvas units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub width: f64,
    pub height: f64,
    pub padding: f64,
    pub header_height: f64,
    pub divider_gap: f64,
    pub column_pitch: f64,
    pub row_pitch: f64,
    pub scalar_radius: f64,
    pub array_cell_width: f64,
    pub array_cell_height: f64,
    pub object_width: f64,
    pub object_header: f64,
    pub object_line_height: f64,
    pub object_padding: f64,
    pub arrow_max_bow: f64,
    pub arrow_min_distance: f64,
    /// How far each arrow end is pulled in from the node centers
    pub arrow_edge_offset: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            width: Self::MIN_WIDTH,
            height: Self::MIN_HEIGHT,
            padding: 60.0,
            header_height: 40.0,
            divider_gap: 40.0,
            column_pitch: 140.0,
            row_pitch: 100.0,
            scalar_radius: 30.0,
            array_cell_width: 40.0,
            array_cell_height: 30.0,
            object_width: 200.0,
            object_header: 30.0,
            object_line_height: 26.0,
            object_padding: 10.0,
            arrow_max_bow: 80.0,
            arrow_min_distance: 50.0,
            arrow_edge_offset: 35.0,
        }
    }
}

impl LayoutConfig {
    pub const MIN_WIDTH: f64 = 1200.0;
    pub const MIN_HEIGHT: f64 = 600.0;
    /// Upper bound for either canvas extent
    pub const MAX_EXTENT: f64 = 20_000.0;

    pub fn canvas_width(&self) -> f64 {
        bounded(self.width, Self::MIN_WIDTH)
    }

    pub fn canvas_height(&self) -> f64 {
        bounded(self.height, Self::MIN_HEIGHT)
    }

    /// Name and value of the first metric that is not a finite,
    /// non-negative number, or a canvas extent above [`Self::MAX_EXTENT`]
    pub fn invalid_metric(&self) -> Option<(&'static str, f64)> {
        let metrics = [
            ("width", self.width),
            ("height", self.height),
            ("padding", self.padding),
            ("header_height", self.header_height),
            ("divider_gap", self.divider_gap),
            ("column_pitch", self.column_pitch),
            ("row_pitch", self.row_pitch),
            ("scalar_radius", self.scalar_radius),
            ("array_cell_width", self.array_cell_width),
            ("array_cell_height", self.array_cell_height),
            ("object_width", self.object_width),
            ("object_header", self.object_header),
            ("object_line_height", self.object_line_height),
            ("object_padding", self.object_padding),
            ("arrow_max_bow", self.arrow_max_bow),
            ("arrow_min_distance", self.arrow_min_distance),
            ("arrow_edge_offset", self.arrow_edge_offset),
        ];
        metrics.into_iter().find(|&(name, value)| {
            let extent = matches!(name, "width" | "height");
            !value.is_finite() || value < 0.0 || (extent && value > Self::MAX_EXTENT)
        })
    }

    pub fn section_width(&self) -> f64 {
        ((self.canvas_width() - 2.0 * self.padding - self.divider_gap) / 2.0).max(0.0)
    }

    /// Grid columns per section, never fewer than one
    pub fn columns(&self) -> usize {
        if self.column_pitch <= 0.0 {
            return 1;
        }
        ((self.section_width() / self.column_pitch).floor() as usize).max(1)
    }

    /// Top-left corner of a section's grid
    pub fn section_origin(&self, region: Region) -> Point {
        let y = self.header_height + 20.0;
        match region {
            Region::Stack => Point::new(self.padding, y),
            Region::Heap => Point::new(
                self.padding + self.section_width() + self.divider_gap,
                y,
            ),
        }
    }

    pub fn divider_x(&self) -> f64 {
        self.padding + self.section_width() + self.divider_gap / 2.0
    }
}

fn bounded(value: f64, min: f64) -> f64 {
    if value.is_finite() {
        value.clamp(min, LayoutConfig::MAX_EXTENT)
    } else {
        min
    }
}

/// Geometry for one projection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub width: f64,
    /// Canvas height, grown to fit the lowest node
    pub height: f64,
    pub stack_origin: Point,
    pub heap_origin: Point,
    pub divider_x: f64,
    pub header_height: f64,
    pub nodes: Vec<PlacedNode>,
    /// Name -> center, for nodes and nested fields. A name placed twice keeps
    /// the last position.
    pub positions: IndexMap<String, Point>,
    pub arrows: Vec<Arrow>,
}

impl Layout {
    pub fn position(&self, name: &str) -> Option<Point> {
        self.positions.get(name).copied()
    }

    pub fn node(&self, name: &str) -> Option<&PlacedNode> {
        self.nodes.iter().find(|n| n.name == name)
    }

    pub fn nodes_in(&self, region: Region) -> impl Iterator<Item = &PlacedNode> {
        self.nodes.iter().filter(move |n| n.region == region)
    }
}

pub fn layout(projection: &Projection, config: &LayoutConfig) -> Layout {
    let mut nodes = Vec::new();
    for region in [Region::Stack, Region::Heap] {
        let records: Vec<&VariableRecord> = projection
            .live
            .iter()
            .filter(|r| Region::of(r) == region)
            .collect();
        place_region(&records, region, config, &mut nodes);
    }

    let mut positions: IndexMap<String, Point> = IndexMap::new();
    let mut heap_nodes: FxHashMap<HeapId, String> = FxHashMap::default();
    let mut links = Vec::new();
    for node in &nodes {
        positions.insert(node.name.clone(), node.center);
        if let Some(id) = node.heap {
            heap_nodes.insert(id, node.name.clone());
        }
        if let (Shape::Pointer | Shape::Parameter, Some(pointee)) = (node.shape, &node.pointee) {
            links.push(Link {
                from: node.name.clone(),
                start: node.center,
                pointee: pointee.clone(),
            });
        }
        for field in &node.fields {
            positions.insert(field.name.clone(), field.center);
            if let (FieldShape::Pointer, Some(pointee)) = (field.shape, &field.pointee) {
                links.push(Link {
                    from: field.name.clone(),
                    start: field.center,
                    pointee: pointee.clone(),
                });
            }
        }
    }

    let arrows = arrows::resolve(&links, &positions, &heap_nodes, config);
    let lowest = nodes
        .iter()
        .map(|n| n.bounds.bottom() + config.padding)
        .fold(config.canvas_height(), f64::max);

    Layout {
        width: config.canvas_width(),
        height: lowest,
        stack_origin: config.section_origin(Region::Stack),
        heap_origin: config.section_origin(Region::Heap),
        divider_x: config.divider_x(),
        header_height: config.header_height,
        nodes,
        positions,
        arrows,
    }
}

fn place_region(
    records: &[&VariableRecord],
    region: Region,
    config: &LayoutConfig,
    nodes: &mut Vec<PlacedNode>,
) {
    let objects: FxHashSet<&str> = records
        .iter()
        .filter(|r| Shape::of(r) == Shape::Object)
        .map(|r| r.name.as_str())
        .collect();
    let placed: Vec<PlacedNode> = records
        .iter()
        .filter(|r| owner(r, &objects).is_none())
        .map(|record| {
            let nested: Vec<&VariableRecord> = if Shape::of(record) == Shape::Object {
                records
                    .iter()
                    .filter(|r| owner(r, &objects) == Some(record.name.as_str()))
                    .copied()
                    .collect()
            } else {
                Vec::new()
            };
            PlacedNode::place(record, Point::default(), &nested, config)
        })
        .collect();

    let columns = config.columns();
    let row_heights: Vec<f64> = placed
        .chunks(columns)
        .map(|row| {
            row.iter()
                .map(|n| n.bounds.height + ROW_GAP)
                .fold(config.row_pitch, f64::max)
        })
        .collect();

    let origin = config.section_origin(region);
    for (index, mut node) in placed.into_iter().enumerate() {
        let (col, row) = (index % columns, index / columns);
        let top: f64 = row_heights[..row].iter().sum();
        node.move_to(origin.offset(
            (col as f64 + 0.5) * config.column_pitch,
            top + row_heights[row] / 2.0,
        ));
        nodes.push(node);
    }
}

/// The placed object a `<object>.<field>` record belongs to
fn owner<'a>(record: &VariableRecord, objects: &FxHashSet<&'a str>) -> Option<&'a str> {
    let (object, _) = record.name.split_once('.')?;
    objects.get(object).copied()
}
