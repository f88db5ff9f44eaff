//! Call-stack frame listings for the side panel

use super::shapes::display_value;
use crate::projection::Projection;
use crate::timeline::{Event, ScopeId, VarKind, VariableRecord};
use serde::Serialize;

/// One active scope and the lines describing its live records
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameListing {
    pub scope: ScopeId,
    pub lines: Vec<String>,
}

impl FrameListing {
    pub fn title(&self) -> String {
        format!("Scope: {}", self.scope)
    }
}

/// One listing per scope on the stack, `global` first. Heap records are
/// not listed.
pub fn frame_listings(projection: &Projection) -> Vec<FrameListing> {
    let groups = projection.by_scope();
    projection
        .stack
        .iter()
        .map(|scope| FrameListing {
            scope: scope.clone(),
            lines: groups
                .get(scope.as_str())
                .map(|records| {
                    records
                        .iter()
                        .filter(|r| r.kind != VarKind::Heap)
                        .map(|r| describe_record(r))
                        .collect()
                })
                .unwrap_or_default(),
        })
        .collect()
}

/// `type name → pointee`, `type name = value`, or `type name`
pub fn describe_record(record: &VariableRecord) -> String {
    if let Some(pointee) = record.pointee_name() {
        return format!("{} {} → {}", record.kind, record.name, pointee);
    }
    match display_value(&record.value) {
        Some(value) => format!("{} {} = {}", record.kind, record.name, value),
        None => format!("{} {}", record.kind, record.name),
    }
}

/// One-line summary of an event for timeline listings
pub fn describe_event(event: &Event) -> String {
    match event {
        Event::Push { scope, .. } => format!("push {}", scope),
        Event::Pop { scope, .. } => format!("pop {}", scope),
        Event::Var { data } => format!("var {} ({})", describe_record(data), data.scope),
        Event::MemberAssign { data } => format!(
            "set {}.{} = {}",
            data.object,
            data.member,
            display_value(&data.value).unwrap_or_else(|| "null".to_string())
        ),
    }
}
