//! Backend-neutral draw list
//!
//! [`draw_commands`] flattens a [`Layout`] into primitives. Renderers map
//! [`Ink`] to their own colors; nothing here knows about terminals.

use super::geometry::{diamond, hexagon, Point};
use super::shapes::{FieldShape, PlacedNode, Region, Shape, FIELD_MARKER_RADIUS, POINTER_SIZE};
use super::Layout;
use serde::Serialize;

/// Dash and gap length of the section divider
const DIVIDER_DASH: f64 = 8.0;

/// Diagonal of the diamond marking a pointer field
const FIELD_POINTER_SIZE: f64 = 20.0;

/// Semantic color role of a primitive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Ink {
    Divider,
    SectionTitle,
    Scalar,
    Pointer,
    Parameter,
    Array,
    HeapBlock,
    Object,
    HeapObject,
    Field,
    PointerField,
    Arrow,
    Label,
    Muted,
}

/// Horizontal text anchoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Anchor {
    Start,
    Middle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DrawCommand {
    Circle {
        center: Point,
        radius: f64,
        ink: Ink,
    },
    /// Closed outline through `points`
    Polygon { points: Vec<Point>, ink: Ink },
    /// Outline with top-left corner `origin`
    Rect {
        origin: Point,
        width: f64,
        height: f64,
        ink: Ink,
    },
    Line { from: Point, to: Point, ink: Ink },
    /// Quadratic curve
    Curve {
        start: Point,
        control: Point,
        end: Point,
        ink: Ink,
    },
    Text {
        at: Point,
        text: String,
        anchor: Anchor,
        ink: Ink,
    },
}

pub fn draw_commands(layout: &Layout) -> Vec<DrawCommand> {
    let mut out = Vec::new();

    for (region, origin) in [
        (Region::Stack, layout.stack_origin),
        (Region::Heap, layout.heap_origin),
    ] {
        out.push(DrawCommand::Text {
            at: Point::new(origin.x, layout.header_height / 2.0),
            text: region.title().to_string(),
            anchor: Anchor::Start,
            ink: Ink::SectionTitle,
        });
    }

    let dashes = if layout.height.is_finite() && layout.height > 0.0 {
        (layout.height / (2.0 * DIVIDER_DASH)).ceil() as usize
    } else {
        0
    };
    for i in 0..dashes {
        let y = i as f64 * 2.0 * DIVIDER_DASH;
        out.push(DrawCommand::Line {
            from: Point::new(layout.divider_x, y),
            to: Point::new(layout.divider_x, (y + DIVIDER_DASH).min(layout.height)),
            ink: Ink::Divider,
        });
    }

    for node in &layout.nodes {
        draw_node(node, &mut out);
    }

    for arrow in &layout.arrows {
        out.push(DrawCommand::Curve {
            start: arrow.start,
            control: arrow.control,
            end: arrow.end,
            ink: Ink::Arrow,
        });
        let (left, right) = arrow.head();
        for wing in [left, right] {
            out.push(DrawCommand::Line {
                from: arrow.end,
                to: wing,
                ink: Ink::Arrow,
            });
        }
    }

    out
}

fn draw_node(node: &PlacedNode, out: &mut Vec<DrawCommand>) {
    let center = node.center;
    let heap = node.region == Region::Heap;

    match node.shape {
        Shape::Scalar => {
            out.push(DrawCommand::Circle {
                center,
                radius: node.bounds.width / 2.0,
                ink: Ink::Scalar,
            });
            out.push(centered_label(center, &node.label));
        }
        Shape::Pointer => {
            out.push(DrawCommand::Polygon {
                points: diamond(center, POINTER_SIZE),
                ink: Ink::Pointer,
            });
            out.push(centered_label(center, &node.label));
        }
        Shape::Parameter => {
            out.push(DrawCommand::Polygon {
                points: hexagon(center, node.bounds.width / 2.0),
                ink: Ink::Parameter,
            });
            out.push(centered_label(center, &node.label));
        }
        Shape::Array | Shape::HeapBlock => {
            let ink = if node.shape == Shape::HeapBlock {
                Ink::HeapBlock
            } else {
                Ink::Array
            };
            let bounds = node.bounds;
            out.push(DrawCommand::Rect {
                origin: Point::new(bounds.x, bounds.y),
                width: bounds.width,
                height: bounds.height,
                ink,
            });
            let cell_width = bounds.width / node.cells.len().max(1) as f64;
            for (j, value) in node.cells.iter().enumerate() {
                let left = bounds.x + j as f64 * cell_width;
                if j > 0 {
                    out.push(DrawCommand::Line {
                        from: Point::new(left, bounds.y),
                        to: Point::new(left, bounds.bottom()),
                        ink,
                    });
                }
                out.push(DrawCommand::Text {
                    at: Point::new(left + cell_width / 2.0, center.y),
                    text: value.clone(),
                    anchor: Anchor::Middle,
                    ink: Ink::Label,
                });
            }
            out.push(DrawCommand::Text {
                at: Point::new(center.x, bounds.y - 8.0),
                text: node.label.clone(),
                anchor: Anchor::Middle,
                ink: Ink::Label,
            });
            if node.hidden_cells > 0 {
                out.push(DrawCommand::Text {
                    at: Point::new(bounds.right() + 4.0, center.y),
                    text: format!("+{}", node.hidden_cells),
                    anchor: Anchor::Start,
                    ink: Ink::Muted,
                });
            }
        }
        Shape::Object => {
            let bounds = node.bounds;
            let ink = if heap { Ink::HeapObject } else { Ink::Object };
            out.push(DrawCommand::Rect {
                origin: Point::new(bounds.x, bounds.y),
                width: bounds.width,
                height: bounds.height,
                ink,
            });
            let header_bottom = (bounds.y + node.header).min(bounds.bottom());
            out.push(DrawCommand::Line {
                from: Point::new(bounds.x, header_bottom),
                to: Point::new(bounds.right(), header_bottom),
                ink,
            });
            out.push(DrawCommand::Text {
                at: Point::new(center.x, (bounds.y + header_bottom) / 2.0),
                text: node.label.clone(),
                anchor: Anchor::Middle,
                ink: Ink::Label,
            });

            for field in &node.fields {
                match field.shape {
                    FieldShape::Scalar => out.push(DrawCommand::Circle {
                        center: field.center,
                        radius: FIELD_MARKER_RADIUS,
                        ink: Ink::Field,
                    }),
                    FieldShape::Pointer => out.push(DrawCommand::Polygon {
                        points: diamond(field.center, FIELD_POINTER_SIZE),
                        ink: Ink::PointerField,
                    }),
                    FieldShape::Text => {}
                }
                out.push(DrawCommand::Text {
                    at: field.center.offset(FIELD_MARKER_RADIUS * 1.8, 0.0),
                    text: field.label.clone(),
                    anchor: Anchor::Start,
                    ink: Ink::Label,
                });
            }
        }
    }
}

fn centered_label(center: Point, text: &str) -> DrawCommand {
    DrawCommand::Text {
        at: center,
        text: text.to_string(),
        anchor: Anchor::Middle,
        ink: Ink::Label,
    }
}
