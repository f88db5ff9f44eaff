//! Call-stack frames pane
//!
//! One bordered block per active scope, `global` at the top. Frames that do
//! not fit are reached by scrolling; the scroll offset counts whole frames.

use crate::layout::FrameListing;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn render_frames_pane(
    frame: &mut Frame,
    area: Rect,
    listings: &[FrameListing],
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    let outer = Block::default()
        .title(" Call Stack ")
        .borders(Borders::ALL)
        .border_style(border_style);
    let inner = outer.inner(area);
    frame.render_widget(outer, area);

    if listings.is_empty() {
        let paragraph =
            Paragraph::new("(no frames)").style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, inner);
        return;
    }

    *scroll_offset = (*scroll_offset).min(listings.len() - 1);

    let mut y = inner.y;
    let bottom = inner.y + inner.height;
    for listing in listings.iter().skip(*scroll_offset) {
        if y >= bottom {
            break;
        }
        let wanted = listing.lines.len().max(1) as u16 + 2;
        let height = wanted.min(bottom - y);
        let rect = Rect::new(inner.x, y, inner.width, height);

        let block = Block::default()
            .title(Span::styled(
                format!(" {} ", listing.title()),
                Style::default()
                    .fg(DEFAULT_THEME.function)
                    .add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(DEFAULT_THEME.border_normal));

        let lines: Vec<Line> = if listing.lines.is_empty() {
            vec![Line::from(Span::styled(
                "(empty)",
                Style::default().fg(DEFAULT_THEME.comment),
            ))]
        } else {
            listing
                .lines
                .iter()
                .map(|text| Line::from(styled_record(text)))
                .collect()
        };

        frame.render_widget(Paragraph::new(lines).block(block), rect);
        y += height;
    }
}

/// Color the leading kind word of a record line
fn styled_record(text: &str) -> Vec<Span<'_>> {
    match text.split_once(' ') {
        Some((kind, rest)) => vec![
            Span::styled(kind, Style::default().fg(DEFAULT_THEME.type_name)),
            Span::styled(" ", Style::default()),
            Span::styled(rest, Style::default().fg(DEFAULT_THEME.fg)),
        ],
        None => vec![Span::styled(text, Style::default().fg(DEFAULT_THEME.fg))],
    }
}
