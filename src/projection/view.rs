//! Navigation state over an event log

use super::{project, Projection};
use crate::timeline::{Event, EventLog};
use thiserror::Error;

/// Placeholder shown wherever an empty timeline would be drawn
pub const EMPTY_TIMELINE_MESSAGE: &str = "No timeline data available";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("step {requested} is outside the timeline (0..={len})")]
pub struct StepOutOfRange {
    pub requested: usize,
    pub len: usize,
}

/// Current step index. The log is passed in rather than owned so the same
/// state can be checked against any log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewState {
    index: usize,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start at the end of the timeline
    pub fn at_end(log: &EventLog) -> Self {
        ViewState { index: log.len() }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Advance one step; returns false at the end
    pub fn next(&mut self, log: &EventLog) -> bool {
        if self.index < log.len() {
            self.index += 1;
            true
        } else {
            false
        }
    }

    /// Go back one step; returns false at the start
    pub fn previous(&mut self) -> bool {
        if self.index > 0 {
            self.index -= 1;
            true
        } else {
            false
        }
    }

    /// Jump to `step`, rejecting anything past the end
    pub fn goto(&mut self, log: &EventLog, step: usize) -> Result<(), StepOutOfRange> {
        if step > log.len() {
            return Err(StepOutOfRange {
                requested: step,
                len: log.len(),
            });
        }
        self.index = step;
        Ok(())
    }

    /// Jump to `step`, clamped to `[0, len]`
    pub fn goto_clamped(&mut self, log: &EventLog, step: i64) {
        let len = log.len();
        self.index = usize::try_from(step.max(0)).map_or(len, |s| s.min(len));
    }

    pub fn rewind(&mut self) {
        self.index = 0;
    }

    pub fn to_end(&mut self, log: &EventLog) {
        self.index = log.len();
    }

    pub fn is_at_start(&self) -> bool {
        self.index == 0
    }

    pub fn is_at_end(&self, log: &EventLog) -> bool {
        self.index >= log.len()
    }

    /// `"Step: i/N"`
    pub fn indicator(&self, log: &EventLog) -> String {
        format!("Step: {}/{}", self.index.min(log.len()), log.len())
    }

    pub fn project(&self, log: &EventLog) -> Projection {
        project(log, self.index)
    }
}

/// One-line description of the event most recently applied at `step`
pub fn describe_step(log: &EventLog, step: usize) -> String {
    if !log.has_content() {
        return EMPTY_TIMELINE_MESSAGE.to_string();
    }

    let Some(event) = step.checked_sub(1).and_then(|i| log.get(i)) else {
        return "No line information available".to_string();
    };

    match event {
        Event::Push { scope, .. } => format!("Entering scope: {}", scope),
        Event::Pop { scope, .. } => format!("Exiting scope: {}", scope),
        Event::Var { .. } | Event::MemberAssign { .. } => match event.line() {
            Some(line) => format!("Line {}", line),
            None => "No line information available".to_string(),
        },
    }
}
