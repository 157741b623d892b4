use ratatui::prelude::*;
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Wrap};

use super::utils::{display_title, format_display_date, truncate};
use crate::portfolio::{ProjectRecord, ProjectView, Slot};

/// Terminal rows per card
pub const CARD_HEIGHT: u16 = 8;

/// Draw the card grid, scrolled so the selected slot is on screen
pub fn draw_card_grid(
  frame: &mut Frame,
  area: Rect,
  view: &ProjectView,
  columns: usize,
  selected: usize,
  description_limit: usize,
) {
  let columns = columns.max(1);
  let rows_on_screen = (area.height / CARD_HEIGHT).max(1) as usize;
  let selected_row = selected / columns;
  let first_row = selected_row.saturating_sub(rows_on_screen - 1);

  let row_areas = Layout::default()
    .direction(Direction::Vertical)
    .constraints(vec![Constraint::Length(CARD_HEIGHT); rows_on_screen])
    .split(area);

  for (row_index, chunk) in view
    .slots
    .chunks(columns)
    .skip(first_row)
    .take(rows_on_screen)
    .enumerate()
  {
    let cells = Layout::default()
      .direction(Direction::Horizontal)
      .constraints(vec![Constraint::Ratio(1, columns as u32); columns])
      .split(row_areas[row_index]);

    for (col, slot) in chunk.iter().enumerate() {
      let index = (first_row + row_index) * columns + col;
      let focused = index == selected;
      match slot {
        Slot::Project(record) => draw_card(frame, cells[col], record, focused, description_limit),
        Slot::AddProject => draw_add_card(frame, cells[col], focused),
        Slot::Placeholder => {}
      }
    }
  }
}

fn card_block(focused: bool) -> Block<'static> {
  let border = if focused {
    Style::default().fg(Color::Cyan)
  } else {
    Style::default().fg(Color::DarkGray)
  };
  Block::default()
    .borders(Borders::ALL)
    .border_type(BorderType::Rounded)
    .border_style(border)
}

fn draw_card(
  frame: &mut Frame,
  area: Rect,
  record: &ProjectRecord,
  focused: bool,
  description_limit: usize,
) {
  let title_style = if focused {
    Style::default().fg(Color::Cyan).bold()
  } else {
    Style::default().fg(Color::White).bold()
  };
  let block = card_block(focused).title(Span::styled(
    format!(" {} ", display_title(&record.title)),
    title_style,
  ));

  let mut lines = Vec::new();
  let date = format_display_date(record.date.as_deref());
  if !date.is_empty() {
    lines.push(Line::from(Span::styled(date, Style::default().fg(Color::DarkGray))));
  }
  lines.push(Line::from(truncate(&record.description, description_limit)));
  if !record.tech.is_empty() {
    let mut tags = Vec::new();
    for tag in &record.tech {
      tags.push(Span::styled(format!("[{}]", tag), Style::default().fg(Color::Yellow)));
      tags.push(Span::raw(" "));
    }
    lines.push(Line::from(tags));
  }
  if !record.link.is_empty() {
    lines.push(Line::from(Span::styled(
      record.link.clone(),
      Style::default().fg(Color::Blue).underlined(),
    )));
  }

  let paragraph = Paragraph::new(lines)
    .block(block)
    .wrap(Wrap { trim: true });
  frame.render_widget(paragraph, area);
}

fn draw_add_card(frame: &mut Frame, area: Rect, focused: bool) {
  let paragraph = Paragraph::new(vec![
    Line::default(),
    Line::from(Span::styled("+", Style::default().fg(Color::Green).bold())),
    Line::from(Span::styled("Add project", Style::default().fg(Color::Green))),
  ])
  .alignment(Alignment::Center)
  .block(card_block(focused));
  frame.render_widget(paragraph, area);
}

/// "Show more (N)" / "Show less", or nothing when everything fits
pub fn toggle_label(view: &ProjectView) -> Option<String> {
  if !view.shows_toggle() {
    return None;
  }
  if view.expanded {
    Some("Show less".to_string())
  } else {
    Some(format!("Show more ({})", view.hidden_count))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_toggle_label() {
    let mut view = ProjectView {
      hidden_count: 2,
      ..Default::default()
    };
    assert_eq!(toggle_label(&view).as_deref(), Some("Show more (2)"));

    view.hidden_count = 0;
    assert_eq!(toggle_label(&view), None);

    view.expanded = true;
    assert_eq!(toggle_label(&view).as_deref(), Some("Show less"));
  }
}
