use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::portfolio::ViewState;
use crate::ui::view::Shortcut;

/// Header: title, admin badge, active search and sort, then key hints
pub fn draw_header(
  frame: &mut Frame,
  area: Rect,
  title: &str,
  view: &ViewState,
  shortcuts: &[Shortcut],
) {
  let separator = || Span::styled("│", Style::default().fg(Color::DarkGray));

  let mut spans = vec![
    Span::styled(format!(" {} ", title), Style::default().fg(Color::Cyan).bold()),
    separator(),
  ];
  if view.is_admin {
    spans.push(Span::styled(
      " ADMIN ",
      Style::default().fg(Color::Black).bg(Color::Yellow).bold(),
    ));
    spans.push(separator());
  }
  spans.push(Span::styled(
    format!(" sort: {} ", view.sort.label()),
    Style::default().fg(Color::White),
  ));
  if view.is_searching() {
    spans.push(separator());
    spans.push(Span::styled(
      format!(" /{} ", view.search.trim()),
      Style::default().fg(Color::Yellow),
    ));
  }
  spans.push(Span::raw("  "));

  for shortcut in shortcuts {
    spans.push(Span::styled(
      format!("<{}>", shortcut.key),
      Style::default().fg(Color::Cyan),
    ));
    spans.push(Span::styled(
      format!(" {}   ", shortcut.label),
      Style::default().fg(Color::DarkGray),
    ));
  }

  let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
  frame.render_widget(paragraph, area);
}
