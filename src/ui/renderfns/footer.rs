use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use super::cards::toggle_label;
use crate::portfolio::ProjectView;

/// Status line shown at the bottom of the screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusMessage {
  Info(String),
  Error(String),
}

/// Footer: toggle affordance, match count, then the latest status message
pub fn draw_footer(
  frame: &mut Frame,
  area: Rect,
  view: &ProjectView,
  loading: bool,
  status: Option<&StatusMessage>,
) {
  let mut spans = vec![Span::raw(" ")];

  if let Some(label) = toggle_label(view) {
    spans.push(Span::styled("<t>", Style::default().fg(Color::Cyan)));
    spans.push(Span::styled(format!(" {}", label), Style::default().fg(Color::White).bold()));
    spans.push(Span::styled("  │ ", Style::default().fg(Color::DarkGray)));
  }

  let count = if view.all_fetched {
    format!("{} projects", view.matching)
  } else {
    format!("{}+ projects", view.matching)
  };
  spans.push(Span::styled(count, Style::default().fg(Color::DarkGray)));

  if loading {
    spans.push(Span::styled("  loading...", Style::default().fg(Color::Yellow)));
  }

  let message = match status {
    Some(StatusMessage::Error(text)) => Some((text.as_str(), Color::Red)),
    Some(StatusMessage::Info(text)) => Some((text.as_str(), Color::Green)),
    None => None,
  };
  if let Some((text, color)) = message {
    spans.push(Span::styled("  │ ", Style::default().fg(Color::DarkGray)));
    spans.push(Span::styled(text.to_string(), Style::default().fg(color)));
  }

  let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
  frame.render_widget(paragraph, area);
}
