//! Shape classification and per-node geometry

use super::geometry::{Bounds, Point};
use super::LayoutConfig;
use crate::timeline::{HeapId, Pointee, ScopeId, VarKind, VariableRecord, HEAP_SCOPE, HEAP_SUFFIX};
use serde::Serialize;
use serde_json::Value;

/// Radius of the marker drawn for a field inside an object box
pub const FIELD_MARKER_RADIUS: f64 = 10.0;

/// Diagonal of the pointer diamond
pub const POINTER_SIZE: f64 = 40.0;

/// Arrays longer than this show their first cells and a count
pub const MAX_ARRAY_CELLS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Region {
    Stack,
    Heap,
}

impl Region {
    /// Heap when any of: heap scope, `new` allocation, heap kind, or a
    /// `_heap` name. Everything else is stack.
    pub fn of(record: &VariableRecord) -> Region {
        let heap = record.scope == HEAP_SCOPE
            || record.allocation.as_deref() == Some("new")
            || record.kind == VarKind::Heap
            || record.name.ends_with(HEAP_SUFFIX);
        if heap {
            Region::Heap
        } else {
            Region::Stack
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Region::Stack => "Stack",
            Region::Heap => "Heap",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Shape {
    Scalar,
    Pointer,
    Parameter,
    Array,
    Object,
    HeapBlock,
}

impl Shape {
    pub fn of(record: &VariableRecord) -> Shape {
        match record.kind {
            VarKind::Variable | VarKind::Assignment => Shape::Scalar,
            VarKind::Pointer => Shape::Pointer,
            VarKind::Parameter => Shape::Parameter,
            VarKind::Array => Shape::Array,
            VarKind::Object => Shape::Object,
            VarKind::Heap => Shape::HeapBlock,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FieldShape {
    Scalar,
    Pointer,
    /// A `members` entry with no record of its own
    Text,
}

/// A field drawn inside an object box
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedField {
    /// Qualified name (`obj.field`)
    pub name: String,
    pub label: String,
    pub shape: FieldShape,
    pub center: Point,
    pub pointee: Option<Pointee>,
}

/// A live record placed on the canvas
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedNode {
    pub name: String,
    pub scope: ScopeId,
    pub region: Region,
    pub shape: Shape,
    pub center: Point,
    pub bounds: Bounds,
    /// Height of an object's title band; zero for other shapes
    pub header: f64,
    pub label: String,
    /// Cell texts for arrays and heap blocks
    pub cells: Vec<String>,
    /// Cells not shown because the array is too long
    pub hidden_cells: usize,
    pub fields: Vec<PlacedField>,
    pub pointee: Option<Pointee>,
    pub heap: Option<HeapId>,
}

impl PlacedNode {
    /// Place `record` centered at `center`. `nested` are the live records
    /// named `<record>.<field>` in the same region, drawn inside an object.
    pub fn place(
        record: &VariableRecord,
        center: Point,
        nested: &[&VariableRecord],
        config: &LayoutConfig,
    ) -> PlacedNode {
        let shape = Shape::of(record);
        let mut node = PlacedNode {
            name: record.name.clone(),
            scope: record.scope.clone(),
            region: Region::of(record),
            shape,
            center,
            bounds: Bounds::default(),
            header: 0.0,
            label: record.name.clone(),
            cells: Vec::new(),
            hidden_cells: 0,
            fields: Vec::new(),
            pointee: record.points_to.clone(),
            heap: record.heap,
        };

        match shape {
            Shape::Scalar | Shape::Parameter => {
                let r = config.scalar_radius;
                node.bounds = Bounds::centered(center, 2.0 * r, 2.0 * r);
                if let Some(value) = display_value(&record.value) {
                    node.label = format!("{} = {}", record.name, value);
                }
            }
            Shape::Pointer => {
                node.bounds = Bounds::centered(center, POINTER_SIZE, POINTER_SIZE);
            }
            Shape::Array | Shape::HeapBlock => {
                let length = array_length(record);
                let shown = length.min(MAX_ARRAY_CELLS);
                node.cells = (0..shown)
                    .map(|i| {
                        record
                            .values
                            .as_ref()
                            .and_then(|values| values.get(i))
                            .and_then(display_value)
                            .unwrap_or_else(|| "?".to_string())
                    })
                    .collect();
                node.hidden_cells = length - shown;
                node.bounds = Bounds::centered(
                    center,
                    shown.max(1) as f64 * config.array_cell_width,
                    config.array_cell_height,
                );
            }
            Shape::Object => {
                node.label = match &record.class_type {
                    Some(class) => format!("{} : {}", record.name, class),
                    None => record.name.clone(),
                };
                node.fields = object_fields(record, nested);
                let height = config.object_header
                    + node.fields.len() as f64 * config.object_line_height
                    + 2.0 * config.object_padding;
                node.bounds = Bounds::centered(center, config.object_width, height);
                node.header = config.object_header;

                let first_row = node.bounds.y + config.object_header + config.object_padding;
                let marker_x = node.bounds.x + config.object_padding + FIELD_MARKER_RADIUS;
                for (idx, field) in node.fields.iter_mut().enumerate() {
                    field.center = Point::new(
                        marker_x,
                        first_row + idx as f64 * config.object_line_height
                            + config.object_line_height / 2.0,
                    );
                }
            }
        }

        node
    }
}

impl PlacedNode {
    /// Move the node, its box and its fields so it is centered on `center`
    pub fn move_to(&mut self, center: Point) {
        let (dx, dy) = (center.x - self.center.x, center.y - self.center.y);
        self.center = center;
        self.bounds.x += dx;
        self.bounds.y += dy;
        for field in &mut self.fields {
            field.center = field.center.offset(dx, dy);
        }
    }
}

/// Nested field records first, then `members` entries that have no record
fn object_fields(record: &VariableRecord, nested: &[&VariableRecord]) -> Vec<PlacedField> {
    let mut fields: Vec<PlacedField> = nested
        .iter()
        .map(|field| {
            let short = field
                .name
                .split_once('.')
                .map_or(field.name.as_str(), |(_, member)| member);
            let (shape, label) = if field.kind == VarKind::Pointer {
                (FieldShape::Pointer, short.to_string())
            } else {
                let label = match display_value(&field.value) {
                    Some(value) => format!("{}={}", short, value),
                    None => short.to_string(),
                };
                (FieldShape::Scalar, label)
            };
            PlacedField {
                name: field.name.clone(),
                label,
                shape,
                center: Point::default(),
                pointee: field.points_to.clone(),
            }
        })
        .collect();

    for (member, value) in &record.members {
        let qualified = format!("{}.{}", record.name, member);
        if fields.iter().any(|f| f.name == qualified) {
            continue;
        }
        let label = match display_value(value) {
            Some(value) => format!("{}={}", member, value),
            None => member.clone(),
        };
        fields.push(PlacedField {
            name: qualified,
            label,
            shape: FieldShape::Text,
            center: Point::default(),
            pointee: None,
        });
    }

    fields
}

/// Number of cells: explicit size, else first dimension, else the values
/// given, else one
pub fn array_length(record: &VariableRecord) -> usize {
    record
        .array_size
        .or_else(|| record.dimensions.as_ref().and_then(|d| d.first().copied()))
        .or_else(|| record.values.as_ref().map(Vec::len))
        .unwrap_or(1)
}

/// Text for a value, `None` for null.
///
/// Structured expressions show their `name` (identifiers) or `value`
/// (literals).
pub fn display_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Object(map) => map
            .get("name")
            .or_else(|| map.get("value"))
            .and_then(display_value)
            .or_else(|| Some(value.to_string())),
        Value::Array(items) => Some(format!(
            "[{}]",
            items
                .iter()
                .map(|v| display_value(v).unwrap_or_else(|| "null".to_string()))
                .collect::<Vec<_>>()
                .join(", ")
        )),
    }
}
