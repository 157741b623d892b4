use super::input::{InputResult, TextInput};
use super::KeyResult;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
  /// Field values in declaration order
  Submitted(Vec<String>),
  Cancelled,
}

#[derive(Debug, Clone)]
struct FormField {
  label: &'static str,
  input: TextInput,
}

/// Modal form of labelled single-line fields.
///
/// Tab/Down and Shift-Tab/Up move between fields, Enter submits, Esc
/// cancels. Validation is the caller's job; a rejected submission is
/// reported back with [`Form::set_error`] and the form stays open.
#[derive(Debug, Clone, Default)]
pub struct Form {
  title: String,
  fields: Vec<FormField>,
  focused: usize,
  error: Option<String>,
}

impl Form {
  pub fn new(title: impl Into<String>) -> Self {
    Self {
      title: title.into(),
      ..Default::default()
    }
  }

  pub fn field(mut self, label: &'static str, value: &str) -> Self {
    self.fields.push(FormField {
      label,
      input: TextInput::with_value(value),
    });
    self
  }

  pub fn title(&self) -> &str {
    &self.title
  }

  pub fn values(&self) -> Vec<String> {
    self.fields.iter().map(|f| f.input.value()).collect()
  }

  pub fn focused_label(&self) -> Option<&'static str> {
    self.fields.get(self.focused).map(|f| f.label)
  }

  pub fn set_error(&mut self, error: impl Into<String>) {
    self.error = Some(error.into());
  }

  pub fn error(&self) -> Option<&str> {
    self.error.as_deref()
  }

  /// Empty every field, keeping the form open
  pub fn reset(&mut self) {
    for field in &mut self.fields {
      field.input.clear();
    }
    self.focused = 0;
    self.error = None;
  }

  fn move_focus(&mut self, forward: bool) {
    if self.fields.is_empty() {
      return;
    }
    let len = self.fields.len();
    self.focused = if forward {
      (self.focused + 1) % len
    } else {
      (self.focused + len - 1) % len
    };
  }

  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<FormEvent> {
    match key.code {
      KeyCode::Tab | KeyCode::Down => {
        self.move_focus(true);
        return KeyResult::Handled;
      }
      KeyCode::BackTab | KeyCode::Up => {
        self.move_focus(false);
        return KeyResult::Handled;
      }
      _ => {}
    }

    let Some(field) = self.fields.get_mut(self.focused) else {
      return match key.code {
        KeyCode::Esc => KeyResult::Event(FormEvent::Cancelled),
        _ => KeyResult::Handled,
      };
    };

    match field.input.handle_key(key) {
      InputResult::Submitted(_) => KeyResult::Event(FormEvent::Submitted(self.values())),
      InputResult::Cancelled => KeyResult::Event(FormEvent::Cancelled),
      InputResult::Consumed => {
        self.error = None;
        KeyResult::Handled
      }
      InputResult::NotHandled => KeyResult::Handled,
    }
  }

  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    let label_width = self.fields.iter().map(|f| f.label.len()).max().unwrap_or(0) as u16;
    let width = (area.width * 70 / 100).clamp(40, 90).min(area.width);
    // One row per field, error line, hint line, borders
    let height = (self.fields.len() as u16 + 4).min(area.height);

    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    let overlay_area = Rect::new(x, y, width, height);
    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Yellow))
      .title(format!(" {} ", self.title));
    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    let mut lines: Vec<Line> = self
      .fields
      .iter()
      .enumerate()
      .map(|(i, field)| {
        let focused = i == self.focused;
        let label_style = if focused {
          Style::default().fg(Color::Cyan).bold()
        } else {
          Style::default().fg(Color::DarkGray)
        };
        let mut spans = vec![Span::styled(
          format!("{:>width$}: ", field.label, width = label_width as usize),
          label_style,
        )];
        if focused {
          let (before, after) = field.input.split_at_cursor();
          spans.push(Span::raw(before));
          spans.push(Span::styled("_", Style::default().fg(Color::Yellow)));
          spans.push(Span::raw(after));
        } else {
          spans.push(Span::raw(field.input.value()));
        }
        Line::from(spans)
      })
      .collect();

    lines.push(match &self.error {
      Some(error) => Line::from(Span::styled(error.clone(), Style::default().fg(Color::Red))),
      None => Line::default(),
    });
    lines.push(Line::from(Span::styled(
      "Tab next  Enter save  Esc cancel",
      Style::default().fg(Color::DarkGray),
    )));

    frame.render_widget(Paragraph::new(lines), inner);
  }
}
