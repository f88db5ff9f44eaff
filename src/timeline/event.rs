//! Timeline events and the records they carry

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Scope label. Function scopes use the function name, method scopes use
/// `object.method`, blocks use `if_body` / `else_body` / `while_loop`.
pub type ScopeId = String;

/// The outermost scope, present from the first event
pub const GLOBAL_SCOPE: &str = "global";

/// Pseudo-scope for dynamically allocated entities; never pushed
pub const HEAP_SCOPE: &str = "heap";

/// Suffix that names the entity behind a heap pointer (`p` -> `p_heap`)
pub const HEAP_SUFFIX: &str = "_heap";

/// Identity of one heap allocation, assigned sequentially by the builder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct HeapId(pub usize);

impl fmt::Display for HeapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Variable classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VarKind {
    Variable,
    Pointer,
    Array,
    Parameter,
    Object,
    Heap,
    Assignment,
}

impl VarKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VarKind::Variable => "variable",
            VarKind::Pointer => "pointer",
            VarKind::Array => "array",
            VarKind::Parameter => "parameter",
            VarKind::Object => "object",
            VarKind::Heap => "heap",
            VarKind::Assignment => "assignment",
        }
    }
}

impl fmt::Display for VarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a pointer addresses: a display name, plus the allocation identity
/// when the target is a heap entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pointee {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heap: Option<HeapId>,
}

impl Pointee {
    pub fn named(name: impl Into<String>) -> Self {
        Pointee {
            name: name.into(),
            heap: None,
        }
    }

    pub fn heap(name: impl Into<String>, id: HeapId) -> Self {
        Pointee {
            name: name.into(),
            heap: Some(id),
        }
    }
}

/// A variable as it exists at the moment of a `var` event
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableRecord {
    pub name: String,
    pub value: Value,
    pub scope: ScopeId,
    #[serde(rename = "type")]
    pub kind: VarKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub array_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Vec<usize>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<Value>>,
    #[serde(rename = "pointsTo", skip_serializing_if = "Option::is_none")]
    pub points_to: Option<Pointee>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_type: Option<String>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub members: IndexMap<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allocation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heap: Option<HeapId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

impl VariableRecord {
    pub fn new(
        name: impl Into<String>,
        value: Value,
        scope: impl Into<ScopeId>,
        kind: VarKind,
    ) -> Self {
        VariableRecord {
            name: name.into(),
            value,
            scope: scope.into(),
            kind,
            array_size: None,
            dimensions: None,
            values: None,
            points_to: None,
            class_type: None,
            members: IndexMap::new(),
            allocation: None,
            heap: None,
            id: None,
            line: None,
        }
    }

    pub fn with_pointee(mut self, pointee: Option<Pointee>) -> Self {
        self.points_to = pointee;
        self
    }

    pub fn with_class(mut self, class_type: Option<String>) -> Self {
        self.class_type = class_type;
        self
    }

    pub fn with_source(mut self, id: Option<Value>, line: Option<usize>) -> Self {
        self.id = id;
        self.line = line;
        self
    }

    /// Mark as the entity of heap allocation `id`
    pub fn allocated(mut self, id: HeapId) -> Self {
        self.allocation = Some("new".to_string());
        self.heap = Some(id);
        self
    }

    /// Identity key used by projection: a later record with the same key
    /// replaces an earlier one
    pub fn key(&self) -> (ScopeId, String) {
        (self.scope.clone(), self.name.clone())
    }

    pub fn pointee_name(&self) -> Option<&str> {
        self.points_to.as_ref().map(|p| p.name.as_str())
    }

    pub fn is_heap_scoped(&self) -> bool {
        self.scope == HEAP_SCOPE
    }
}

/// Field write on an object, either a stack object or the heap entity
/// behind a pointer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberAssignment {
    pub object: String,
    pub member: String,
    pub value: Value,
    pub scope: ScopeId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    /// Allocation the object pointed at when the write was recorded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<HeapId>,
    /// Heap entity the written value points at, for pointer fields
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pointee: Option<Pointee>,
}

/// One entry of the timeline
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    Push {
        scope: ScopeId,
        #[serde(skip_serializing_if = "Option::is_none")]
        line: Option<usize>,
    },
    Pop {
        scope: ScopeId,
        #[serde(skip_serializing_if = "Option::is_none")]
        line: Option<usize>,
    },
    Var {
        data: VariableRecord,
    },
    MemberAssign {
        data: MemberAssignment,
    },
}

impl Event {
    pub fn push(scope: impl Into<ScopeId>, line: Option<usize>) -> Self {
        Event::Push {
            scope: scope.into(),
            line,
        }
    }

    pub fn pop(scope: impl Into<ScopeId>, line: Option<usize>) -> Self {
        Event::Pop {
            scope: scope.into(),
            line,
        }
    }

    pub fn var(data: VariableRecord) -> Self {
        Event::Var { data }
    }

    pub fn line(&self) -> Option<usize> {
        match self {
            Event::Push { line, .. } | Event::Pop { line, .. } => *line,
            Event::Var { data } => data.line,
            Event::MemberAssign { data } => data.line,
        }
    }

    /// Scope the event belongs to
    pub fn scope(&self) -> &str {
        match self {
            Event::Push { scope, .. } | Event::Pop { scope, .. } => scope,
            Event::Var { data } => &data.scope,
            Event::MemberAssign { data } => &data.scope,
        }
    }

    /// Short kind label for listings
    pub fn label(&self) -> &'static str {
        match self {
            Event::Push { .. } => "push",
            Event::Pop { .. } => "pop",
            Event::Var { .. } => "var",
            Event::MemberAssign { .. } => "member_assign",
        }
    }
}

/// The complete, immutable event sequence for one document
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new(events: Vec<Event>) -> Self {
        EventLog { events }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Whether anything happens besides opening the global frame
    pub fn has_content(&self) -> bool {
        self.iter()
            .any(|e| !matches!(e, Event::Push { scope, .. } if scope == GLOBAL_SCOPE))
    }

    pub fn get(&self, index: usize) -> Option<&Event> {
        self.events.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Event> {
        self.events.iter()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn push_count(&self) -> usize {
        self.iter()
            .filter(|e| matches!(e, Event::Push { .. }))
            .count()
    }

    pub fn pop_count(&self) -> usize {
        self.iter()
            .filter(|e| matches!(e, Event::Pop { .. }))
            .count()
    }

    /// Every pop closes the most recent open push, and only `global` is
    /// left open at the end
    pub fn scope_balance_ok(&self) -> bool {
        let mut open: Vec<&str> = Vec::new();
        for event in &self.events {
            match event {
                Event::Push { scope, .. } => open.push(scope),
                Event::Pop { scope, .. } => {
                    if open.pop() != Some(scope.as_str()) {
                        return false;
                    }
                }
                _ => {}
            }
        }
        open == [GLOBAL_SCOPE]
    }

    /// All variable records in log order
    pub fn variables(&self) -> impl Iterator<Item = &VariableRecord> {
        self.iter().filter_map(|e| match e {
            Event::Var { data } => Some(data),
            _ => None,
        })
    }
}

impl<'a> IntoIterator for &'a EventLog {
    type Item = &'a Event;
    type IntoIter = std::slice::Iter<'a, Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}
