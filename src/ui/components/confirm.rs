use super::KeyResult;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmEvent<T> {
  Confirmed(T),
  Declined,
}

/// Yes/no prompt carrying the value it asks about
#[derive(Debug, Clone)]
pub struct Confirm<T> {
  message: String,
  subject: T,
}

impl<T: Clone> Confirm<T> {
  pub fn new(message: impl Into<String>, subject: T) -> Self {
    Self {
      message: message.into(),
      subject,
    }
  }

  pub fn handle_key(&self, key: KeyEvent) -> KeyResult<ConfirmEvent<T>> {
    match key.code {
      KeyCode::Char('y') | KeyCode::Char('Y') => {
        KeyResult::Event(ConfirmEvent::Confirmed(self.subject.clone()))
      }
      KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
        KeyResult::Event(ConfirmEvent::Declined)
      }
      _ => KeyResult::Handled,
    }
  }

  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    let width = (self.message.chars().count() as u16 + 6).clamp(30, 70).min(area.width);
    let height = 5.min(area.height);
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    let overlay_area = Rect::new(x, y, width, height);
    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Red))
      .title(" Confirm ");
    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    let text = vec![
      Line::from(self.message.as_str()),
      Line::from(vec![
        Span::styled("<y>", Style::default().fg(Color::Cyan)),
        Span::styled(" yes  ", Style::default().fg(Color::DarkGray)),
        Span::styled("<n>", Style::default().fg(Color::Cyan)),
        Span::styled(" no", Style::default().fg(Color::DarkGray)),
      ]),
    ];
    frame.render_widget(Paragraph::new(text).wrap(Wrap { trim: true }), inner);
  }
}
