//! Status bar: link state, last pull error, last update, key hints.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tuner_proto::sync::{PushStatus, Source};

use crate::app_state::AppState;
use crate::theme::{C_ACCENT, C_ACTIVE, C_MUTED, C_PENDING, C_SECONDARY, C_SEPARATOR};

fn push_span(status: PushStatus) -> Span<'static> {
    let (glyph, color) = match status {
        PushStatus::Connected => ("●", C_ACTIVE),
        PushStatus::Connecting | PushStatus::Reconnecting { .. } => ("◌", C_PENDING),
        PushStatus::Unavailable => ("○", C_ACCENT),
        PushStatus::Disabled => ("○", C_MUTED),
    };
    Span::styled(
        format!("{glyph} {status}"),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )
}

/// Draw the link line: push state, last update, pull error if any.
pub fn draw_status_bar(frame: &mut Frame, area: Rect, state: &AppState) {
    let mut spans = vec![Span::raw(" "), push_span(state.push)];

    let updated = match state.last_update {
        Some((source, at)) => {
            let via = match source {
                Source::Pull => "pull",
                Source::Push => "push",
            };
            format!("updated {} via {}", at.format("%H:%M:%S"), via)
        }
        None => "waiting for relay…".to_string(),
    };
    spans.push(Span::styled("  │  ", Style::default().fg(C_SEPARATOR)));
    spans.push(Span::styled(updated, Style::default().fg(C_SECONDARY)));

    if let Some(err) = &state.pull_error {
        spans.push(Span::styled("  │  ", Style::default().fg(C_SEPARATOR)));
        spans.push(Span::styled(
            format!("pull failed: {err}"),
            Style::default().fg(C_ACCENT),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Draw the keybindings footer (one row).
pub fn draw_keys_bar(frame: &mut Frame, area: Rect, pane_keys: &str) {
    let line = Line::from(vec![
        Span::styled(format!(" {pane_keys}"), Style::default().fg(C_SECONDARY)),
        Span::styled(
            "  Tab/1-3 panes  F5/R pull  q quit",
            Style::default().fg(C_MUTED),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
