//! Memory pane: the stack/heap canvas
//!
//! Paints the layout's draw list onto a ratatui [`Canvas`]. Layout
//! coordinates grow downward, the canvas grows upward, so every y is flipped
//! against the visible window. The window is as tall as half the canvas
//! width and scrolls vertically when the layout is taller.

use crate::layout::{geometry::quadratic_point, Anchor, DrawCommand, Layout, Point};
use crate::projection::EMPTY_TIMELINE_MESSAGE;
use crate::timeline::EventLog;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    symbols::Marker,
    text::Span,
    widgets::{
        canvas::{Canvas, Circle, Context, Line as CanvasLine, Rectangle},
        Block, Borders, Paragraph,
    },
    Frame,
};

/// Segments used to approximate an arrow curve
const CURVE_SEGMENTS: usize = 24;

/// Canvas units scrolled per key press
pub const SCROLL_STEP: f64 = 50.0;

/// Vertical window over the layout
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MemoryViewport {
    pub offset: f64,
}

impl MemoryViewport {
    pub fn scroll_up(&mut self) {
        self.offset = (self.offset - SCROLL_STEP).max(0.0);
    }

    pub fn scroll_down(&mut self) {
        self.offset += SCROLL_STEP;
    }
}

/// Render the memory pane
pub fn render_memory_pane(
    frame: &mut Frame,
    area: Rect,
    log: &EventLog,
    layout: &Layout,
    commands: &[DrawCommand],
    is_focused: bool,
    viewport: &mut MemoryViewport,
) {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    let block = Block::default()
        .title(" Memory ")
        .borders(Borders::ALL)
        .border_style(border_style);

    if !log.has_content() {
        let paragraph = Paragraph::new(EMPTY_TIMELINE_MESSAGE)
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    }

    let window = layout.width / 2.0;
    viewport.offset = viewport.offset.min((layout.height - window).max(0.0));
    let top = viewport.offset + window;

    let inner_width = f64::from(area.width.saturating_sub(2).max(1));
    let char_width = layout.width / inner_width;

    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .x_bounds([0.0, layout.width])
        .y_bounds([viewport.offset, top])
        .paint(|ctx| {
            for command in commands {
                paint(ctx, command, top, char_width);
            }
        });

    frame.render_widget(canvas, area);
}

fn paint(ctx: &mut Context<'_>, command: &DrawCommand, top: f64, char_width: f64) {
    let flip = |p: Point| (p.x, top - p.y);

    match command {
        DrawCommand::Circle {
            center,
            radius,
            ink,
        } => {
            let (x, y) = flip(*center);
            ctx.draw(&Circle {
                x,
                y,
                radius: *radius,
                color: DEFAULT_THEME.ink(*ink),
            });
        }
        DrawCommand::Polygon { points, ink } => {
            let color = DEFAULT_THEME.ink(*ink);
            for (i, from) in points.iter().enumerate() {
                let to = points[(i + 1) % points.len()];
                draw_segment(ctx, flip(*from), flip(to), color);
            }
        }
        DrawCommand::Rect {
            origin,
            width,
            height,
            ink,
        } => {
            let (x, y) = flip(origin.offset(0.0, *height));
            ctx.draw(&Rectangle {
                x,
                y,
                width: *width,
                height: *height,
                color: DEFAULT_THEME.ink(*ink),
            });
        }
        DrawCommand::Line { from, to, ink } => {
            draw_segment(ctx, flip(*from), flip(*to), DEFAULT_THEME.ink(*ink));
        }
        DrawCommand::Curve {
            start,
            control,
            end,
            ink,
        } => {
            let color = DEFAULT_THEME.ink(*ink);
            let mut previous = *start;
            for i in 1..=CURVE_SEGMENTS {
                let t = i as f64 / CURVE_SEGMENTS as f64;
                let next = quadratic_point(*start, *control, *end, t);
                draw_segment(ctx, flip(previous), flip(next), color);
                previous = next;
            }
        }
        DrawCommand::Text {
            at,
            text,
            anchor,
            ink,
        } => {
            let (x, y) = flip(*at);
            let x = match anchor {
                Anchor::Start => x,
                Anchor::Middle => x - text.chars().count() as f64 * char_width / 2.0,
            };
            ctx.print(
                x,
                y,
                Span::styled(text.clone(), Style::default().fg(DEFAULT_THEME.ink(*ink))),
            );
        }
    }
}

fn draw_segment(
    ctx: &mut Context<'_>,
    (x1, y1): (f64, f64),
    (x2, y2): (f64, f64),
    color: ratatui::style::Color,
) {
    ctx.draw(&CanvasLine {
        x1,
        y1,
        x2,
        y2,
        color,
    });
}
