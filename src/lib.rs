//! # Introduction
//!
//! memscope turns a program-structure document (the JSON an analysis front
//! end emits for a small C/C++ program) into a step-by-step picture of stack
//! and heap memory. The document is walked once into an immutable event
//! log; every navigation step is a pure projection of a prefix of that log,
//! laid out as shapes and arrows and drawn in a terminal UI built with
//! [ratatui](https://docs.rs/ratatui).
//!
//! ## Pipeline
//!
//! ```text
//! Document → Timeline Builder → EventLog → Projection(step) → Layout → Draw list → TUI
//! ```
//!
//! 1. [`document`]: lenient loading of the analysis JSON into a closed
//!    [`document::ProgramNode`] sum type.
//! 2. [`timeline`]: walks the nodes and produces the
//!    [`timeline::EventLog`] of `push`/`pop`/`var`/`member_assign` events.
//! 3. [`projection`]: replays a prefix of the log into the active scope
//!    stack and the live variables, plus [`projection::ViewState`] for
//!    navigation.
//! 4. [`layout`]: stack/heap partition, grid placement, pointer arrows and
//!    a backend-neutral draw list.
//! 5. [`ui`]: ratatui-based TUI; not part of the stable library API.
//!
//! [`config`] and [`logging`] carry the TOML configuration and the tracing
//! subscriber setup shared by the binary.
//!
//! ## Example
//!
//! ```
//! use memscope::document::Document;
//! use memscope::projection::project;
//! use memscope::timeline::build;
//!
//! let document = Document::from_json_str(
//!     r#"[{"type": "main_function", "name": "main", "params": [], "body": [
//!         {"type": "declaration", "declarations": [{"name": "x", "value": 5, "scope": "main"}]}
//!     ]}]"#,
//! ).unwrap();
//! let log = build(&document);
//! let projection = project(&log, 3);
//! assert_eq!(projection.stack, ["global", "main"]);
//! assert_eq!(projection.live[0].name, "x");
//! ```

pub mod config;
pub mod document;
pub mod layout;
pub mod logging;
pub mod projection;
pub mod timeline;
pub mod ui;
