//! Step projection
//!
//! [`project`] replays the first `step` events of an [`EventLog`] and returns
//! the active scope stack and the live variables at that point. It is a
//! pure function of `(log, step)`, so stepping backward is just projecting a
//! smaller prefix.
//!
//! Live records are keyed by `(scope, name)`. A later record for the same key
//! replaces the earlier one but keeps its position, so iteration order is the
//! order of first appearance. Heap-scoped records stay live for the rest of
//! the timeline once they appear.

pub mod view;

pub use view::{describe_step, StepOutOfRange, ViewState, EMPTY_TIMELINE_MESSAGE};

use crate::timeline::{
    Event, EventLog, MemberAssignment, ScopeId, VarKind, VariableRecord, GLOBAL_SCOPE, HEAP_SCOPE,
    HEAP_SUFFIX,
};
use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

type LiveKey = (ScopeId, String);

/// Live state after a prefix of the timeline
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Projection {
    /// Number of events applied
    pub step: usize,
    /// Active scopes, `global` first
    pub stack: Vec<ScopeId>,
    /// Live records in first-appearance order
    pub live: Vec<VariableRecord>,
}

impl Projection {
    /// Live record for an exact `(scope, name)` key
    pub fn get(&self, scope: &str, name: &str) -> Option<&VariableRecord> {
        self.live
            .iter()
            .find(|r| r.scope == scope && r.name == name)
    }

    /// First live record with this name in any scope
    pub fn find(&self, name: &str) -> Option<&VariableRecord> {
        self.live.iter().find(|r| r.name == name)
    }

    pub fn is_live(&self, scope: &str, name: &str) -> bool {
        self.get(scope, name).is_some()
    }

    /// Live records grouped by scope, groups ordered by first appearance
    pub fn by_scope(&self) -> IndexMap<&str, Vec<&VariableRecord>> {
        let mut groups: IndexMap<&str, Vec<&VariableRecord>> = IndexMap::new();
        for record in &self.live {
            groups.entry(record.scope.as_str()).or_default().push(record);
        }
        groups
    }

    pub fn heap(&self) -> impl Iterator<Item = &VariableRecord> {
        self.live.iter().filter(|r| r.is_heap_scoped())
    }
}

/// Project the log at `step`, clamped to `[0, log.len()]`
pub fn project(log: &EventLog, step: usize) -> Projection {
    let step = step.min(log.len());
    let applied = &log.events()[..step];

    let stack = replay_stack(applied);

    let mut live: IndexMap<LiveKey, VariableRecord> = IndexMap::new();
    for event in applied {
        match event {
            Event::Var { data } => {
                live.insert(data.key(), data.clone());
            }
            Event::MemberAssign { data } => apply_member_assign(&mut live, data),
            Event::Push { .. } | Event::Pop { .. } => {}
        }
    }

    let live = live
        .into_values()
        .filter(|r| r.is_heap_scoped() || stack.contains(&r.scope))
        .collect();

    Projection { step, stack, live }
}

fn replay_stack(events: &[Event]) -> Vec<ScopeId> {
    let mut stack: Vec<ScopeId> = Vec::new();
    for event in events {
        match event {
            Event::Push { scope, .. } => stack.push(scope.clone()),
            Event::Pop { scope, .. } if scope == GLOBAL_SCOPE => {}
            Event::Pop { scope, .. } => {
                if stack.last() == Some(scope) {
                    stack.pop();
                } else if let Some(index) = stack.iter().rposition(|s| s == scope) {
                    debug!(%scope, "pop does not match top of stack");
                    stack.remove(index);
                }
            }
            _ => {}
        }
    }

    if stack.first().map(String::as_str) != Some(GLOBAL_SCOPE) {
        stack.retain(|s| s != GLOBAL_SCOPE);
        stack.insert(0, GLOBAL_SCOPE.to_string());
    }
    stack
}

fn apply_member_assign(live: &mut IndexMap<LiveKey, VariableRecord>, write: &MemberAssignment) {
    let by_identity = write.target.and_then(|id| {
        live.iter()
            .find(|(_, r)| r.heap == Some(id))
            .map(|(key, _)| key.clone())
    });
    let heap_key = by_identity.or_else(|| {
        let key = (
            HEAP_SCOPE.to_string(),
            format!("{}{}", write.object, HEAP_SUFFIX),
        );
        live.contains_key(&key).then_some(key)
    });

    if let Some(key) = heap_key {
        if let Some(entity) = live.get_mut(&key) {
            entity
                .members
                .insert(write.member.clone(), write.value.clone());
        }
        let field = (HEAP_SCOPE.to_string(), format!("{}.{}", key.1, write.member));
        if let Some(record) = live.get_mut(&field) {
            update_field(record, write);
        }
        return;
    }

    let field = (
        write.scope.clone(),
        format!("{}.{}", write.object, write.member),
    );
    match live.get_mut(&field) {
        Some(record) => update_field(record, write),
        None => debug!(
            object = %write.object,
            member = %write.member,
            "member write has no target"
        ),
    }
}

fn update_field(record: &mut VariableRecord, write: &MemberAssignment) {
    record.value = write.value.clone();
    if record.kind == VarKind::Pointer {
        record.points_to = write.pointee.clone();
    }
}
