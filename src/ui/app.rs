//! Main TUI application state and logic

use crate::config::Config;
use crate::layout::{
    self, draw_commands, frame_listings, DrawCommand, FrameListing, Layout as MemoryLayout,
};
use crate::projection::{describe_step, Projection, ViewState};
use crate::timeline::EventLog;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use std::io;
use std::time::{Duration, Instant};
use tracing::debug;

use super::panes::{self, MemoryViewport, StatusRenderData};

/// Which pane is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    Memory,
    Frames,
    Timeline,
}

impl FocusedPane {
    /// Move focus to the next pane (memory -> frames -> timeline)
    pub fn next(self) -> Self {
        match self {
            FocusedPane::Memory => FocusedPane::Frames,
            FocusedPane::Frames => FocusedPane::Timeline,
            FocusedPane::Timeline => FocusedPane::Memory,
        }
    }
}

/// Everything derived from the current step
struct StepView {
    projection: Projection,
    layout: MemoryLayout,
    commands: Vec<DrawCommand>,
    frames: Vec<FrameListing>,
}

/// The main application state
pub struct App {
    log: EventLog,
    view: ViewState,
    config: Config,
    current: StepView,

    /// Currently focused pane
    pub focused_pane: FocusedPane,

    /// Per-pane scroll state
    pub memory_viewport: MemoryViewport,
    pub frames_scroll: usize,
    pub timeline_scroll: usize,

    /// Whether the app should quit
    pub should_quit: bool,

    /// Status message to display
    pub status_message: String,

    /// Whether auto-play mode is active
    pub is_playing: bool,

    /// Last time a step was taken in play mode
    pub last_play_time: Instant,

    /// Last time space was pressed (for debouncing)
    pub last_space_press: Instant,
}

impl App {
    /// Create an app positioned at the start of the timeline
    pub fn new(log: EventLog, config: Config) -> Self {
        let view = ViewState::new();
        let current = Self::compute(&log, &view, &config);
        App {
            log,
            view,
            config,
            current,
            focused_pane: FocusedPane::Memory,
            memory_viewport: MemoryViewport::default(),
            frames_scroll: 0,
            timeline_scroll: 0,
            should_quit: false,
            status_message: String::from("Ready!"),
            is_playing: false,
            last_play_time: Instant::now(),
            last_space_press: Instant::now()
                .checked_sub(Duration::from_secs(1))
                .unwrap_or(Instant::now()),
        }
    }

    /// Start at `step` instead, clamped to the timeline
    pub fn with_step(mut self, step: usize) -> Self {
        self.view.goto_clamped(&self.log, i64::try_from(step).unwrap_or(i64::MAX));
        self.refresh();
        self
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub fn view(&self) -> ViewState {
        self.view
    }

    pub fn projection(&self) -> &Projection {
        &self.current.projection
    }

    pub fn frames(&self) -> &[FrameListing] {
        &self.current.frames
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        let interval = self.config.playback.interval();
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            // Handle auto-play mode
            if self.is_playing && self.last_play_time.elapsed() >= interval {
                if self.view.next(&self.log) {
                    self.refresh();
                    self.status_message = "Playing...".to_string();
                } else {
                    self.is_playing = false;
                    self.status_message = "Playback complete".to_string();
                }
                self.last_play_time = Instant::now();
            }

            // Use poll with timeout to allow auto-play to work
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }
        }

        Ok(())
    }

    /// Render the UI
    pub fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(size);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
            .split(main_chunks[0]);

        // Left column: Memory (top) | Timeline (bottom)
        let left_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(72), Constraint::Percentage(28)])
            .split(columns[0]);

        panes::render_memory_pane(
            frame,
            left_rows[0],
            &self.log,
            &self.current.layout,
            &self.current.commands,
            self.focused_pane == FocusedPane::Memory,
            &mut self.memory_viewport,
        );

        panes::render_timeline_pane(
            frame,
            left_rows[1],
            &self.log,
            self.view.index(),
            self.focused_pane == FocusedPane::Timeline,
            &mut self.timeline_scroll,
        );

        panes::render_frames_pane(
            frame,
            columns[1],
            &self.current.frames,
            self.focused_pane == FocusedPane::Frames,
            &mut self.frames_scroll,
        );

        let indicator = self.view.indicator(&self.log);
        let description = describe_step(&self.log, self.view.index());
        panes::render_status_bar(
            frame,
            main_chunks[1],
            &StatusRenderData {
                indicator: &indicator,
                description: &description,
                message: &self.status_message,
                is_at_start: self.view.is_at_start(),
                is_at_end: self.view.is_at_end(&self.log),
                is_playing: self.is_playing,
            },
        );
    }

    /// Handle keyboard events
    pub fn handle_key_event(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            // Number keys step forward N times directly
            KeyCode::Char(c @ '1'..='9') => {
                self.is_playing = false;
                let n = c.to_digit(10).unwrap_or(1);
                let mut stepped = 0;
                for _ in 0..n {
                    if self.view.next(&self.log) {
                        stepped += 1;
                    } else {
                        break;
                    }
                }
                self.refresh();
                self.status_message = format!("Stepped forward {} step(s)", stepped);
            }
            KeyCode::Tab => {
                self.focused_pane = self.focused_pane.next();
            }
            KeyCode::Left => {
                self.is_playing = false;
                self.status_message = if self.view.previous() {
                    self.refresh();
                    "Stepped backward".to_string()
                } else {
                    "Already at the start".to_string()
                };
            }
            KeyCode::Right => {
                self.is_playing = false;
                self.status_message = if self.view.next(&self.log) {
                    self.refresh();
                    "Stepped forward".to_string()
                } else {
                    "Already at the end".to_string()
                };
            }
            KeyCode::Up => match self.focused_pane {
                FocusedPane::Memory => self.memory_viewport.scroll_up(),
                FocusedPane::Frames => self.frames_scroll = self.frames_scroll.saturating_sub(1),
                FocusedPane::Timeline => {
                    self.timeline_scroll = self.timeline_scroll.saturating_sub(1)
                }
            },
            KeyCode::Down => match self.focused_pane {
                FocusedPane::Memory => self.memory_viewport.scroll_down(),
                FocusedPane::Frames => self.frames_scroll = self.frames_scroll.saturating_add(1),
                FocusedPane::Timeline => {
                    self.timeline_scroll = self.timeline_scroll.saturating_add(1)
                }
            },
            KeyCode::Char(' ') => {
                // Toggle auto-play mode (with 200ms debounce to prevent key repeat spam)
                if self.last_space_press.elapsed() >= Duration::from_millis(200) {
                    self.last_space_press = Instant::now();
                    self.is_playing = !self.is_playing;
                    if self.is_playing {
                        self.last_play_time = Instant::now()
                            .checked_sub(self.config.playback.interval())
                            .unwrap_or(Instant::now());
                        self.status_message = "Playing...".to_string();
                    } else {
                        self.status_message = "Paused".to_string();
                    }
                }
            }
            KeyCode::Enter => {
                self.is_playing = false;
                self.view.to_end(&self.log);
                self.refresh();
                self.status_message = "Jumped to end".to_string();
            }
            KeyCode::Backspace => {
                self.is_playing = false;
                self.view.rewind();
                self.refresh();
                self.status_message = "Jumped to start".to_string();
            }
            _ => {}
        }
    }

    /// Recompute projection, layout and frames for the current step
    fn refresh(&mut self) {
        self.current = Self::compute(&self.log, &self.view, &self.config);
        debug!(
            step = self.view.index(),
            live = self.current.projection.live.len(),
            arrows = self.current.layout.arrows.len(),
            "step recomputed"
        );
    }

    fn compute(log: &EventLog, view: &ViewState, config: &Config) -> StepView {
        let projection = view.project(log);
        let layout = layout::layout(&projection, &config.layout);
        let commands = draw_commands(&layout);
        let frames = frame_listings(&projection);
        StepView {
            projection,
            layout,
            commands,
            frames,
        }
    }
}
