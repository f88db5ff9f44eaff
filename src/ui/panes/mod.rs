//! TUI pane rendering modules
//!
//! # Pane Modules
//!
//! - [`memory`]: stack and heap drawn on a canvas, with pointer arrows
//! - [`frames`]: one block per active scope listing its variables
//! - [`timeline`]: the event log with the current step highlighted
//! - [`status`]: step indicator, keybindings and position badges
//!
//! Each pane module exports a `render_*` function that takes the frame, its
//! area, the data to show, focus, and any scroll state it owns.

pub mod frames;
pub mod memory;
pub mod status;
pub mod timeline;

pub use frames::render_frames_pane;
pub use memory::{render_memory_pane, MemoryViewport};
pub use status::{render_status_bar, StatusRenderData};
pub use timeline::render_timeline_pane;
