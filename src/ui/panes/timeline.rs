//! Timeline pane: the event log with the current step highlighted

use crate::layout::describe_event;
use crate::projection::EMPTY_TIMELINE_MESSAGE;
use crate::timeline::EventLog;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

/// Render the timeline pane. `step` events have been applied; the last of
/// them is highlighted and kept in view.
pub fn render_timeline_pane(
    frame: &mut Frame,
    area: Rect,
    log: &EventLog,
    step: usize,
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

    let block = Block::default()
        .title(" Timeline ")
        .borders(Borders::ALL)
        .border_style(border_style);

    if !log.has_content() {
        let paragraph = Paragraph::new(EMPTY_TIMELINE_MESSAGE)
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    }

    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    let current = step.checked_sub(1);

    // Keep the current event inside the window
    if let Some(current) = current {
        if current < *scroll_offset {
            *scroll_offset = current;
        } else if current >= *scroll_offset + visible_height {
            *scroll_offset = current + 1 - visible_height;
        }
    }
    *scroll_offset = (*scroll_offset).min(log.len().saturating_sub(visible_height));

    let width = log.len().to_string().len();
    let items: Vec<ListItem> = log
        .iter()
        .enumerate()
        .skip(*scroll_offset)
        .take(visible_height)
        .map(|(i, event)| {
            let is_current = Some(i) == current;
            let applied = i < step;
            let marker = if is_current { "▶ " } else { "  " };
            let text_style = if applied {
                Style::default().fg(DEFAULT_THEME.fg)
            } else {
                Style::default().fg(DEFAULT_THEME.comment)
            };
            let line = Line::from(vec![
                Span::styled(marker, Style::default().fg(DEFAULT_THEME.secondary)),
                Span::styled(
                    format!("{:>width$} ", i + 1, width = width),
                    Style::default().fg(DEFAULT_THEME.comment),
                ),
                Span::styled(describe_event(event), text_style),
            ]);
            let item = ListItem::new(line);
            if is_current {
                item.style(Style::default().bg(DEFAULT_THEME.current_line_bg))
            } else {
                item
            }
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}
