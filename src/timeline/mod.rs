//! Event timeline
//!
//! Walking a [`Document`](crate::document::Document) yields a flat, immutable
//! [`EventLog`]: scope pushes and pops, variable records, and member
//! assignments, in execution order.
//!
//! - [`event`]: event and record types
//! - [`builder`]: the document walk
//!
//! # Heap identity
//!
//! Each `new` allocation gets a sequential [`HeapId`]. The pointer record and
//! the heap entity both carry it, so arrows and member writes resolve by
//! identity rather than by the `<pointer>_heap` naming convention.

pub mod builder;
pub mod event;

pub use builder::{
    build, build_with, BuildOptions, ScopeNaming, MAX_CALL_DEPTH, MAX_PLACEHOLDER_CELLS,
    UNRESOLVED_PARAM,
};
pub use event::{
    Event, EventLog, HeapId, MemberAssignment, Pointee, ScopeId, VarKind, VariableRecord,
    GLOBAL_SCOPE, HEAP_SCOPE, HEAP_SUFFIX,
};
