use super::KeyResult;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagPickerEvent {
  Selected(String),
  Cancelled,
}

/// Pick one tech tag of the focused card to filter by
#[derive(Debug, Clone, Default)]
pub struct TagPicker {
  active: bool,
  tags: Vec<String>,
  selected: usize,
}

impl TagPicker {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_active(&self) -> bool {
    self.active
  }

  /// Open with `tags`; does nothing for an empty list
  pub fn show(&mut self, tags: Vec<String>) {
    if tags.is_empty() {
      return;
    }
    self.active = true;
    self.tags = tags;
    self.selected = 0;
  }

  pub fn hide(&mut self) {
    self.active = false;
    self.tags.clear();
    self.selected = 0;
  }

  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<TagPickerEvent> {
    if !self.active {
      return KeyResult::NotHandled;
    }

    match key.code {
      KeyCode::Esc | KeyCode::Char('q') => {
        self.hide();
        KeyResult::Event(TagPickerEvent::Cancelled)
      }
      KeyCode::Enter => {
        let picked = self.tags.get(self.selected).cloned();
        self.hide();
        match picked {
          Some(tag) => KeyResult::Event(TagPickerEvent::Selected(tag)),
          None => KeyResult::Event(TagPickerEvent::Cancelled),
        }
      }
      KeyCode::Char('j') | KeyCode::Down => {
        self.selected = (self.selected + 1) % self.tags.len();
        KeyResult::Handled
      }
      KeyCode::Char('k') | KeyCode::Up => {
        self.selected = (self.selected + self.tags.len() - 1) % self.tags.len();
        KeyResult::Handled
      }
      _ => KeyResult::Handled,
    }
  }

  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    if !self.active {
      return;
    }

    let longest = self.tags.iter().map(|t| t.chars().count()).max().unwrap_or(10) as u16;
    let width = (longest + 6).max(24).min(area.width);
    let height = (self.tags.len() as u16 + 2).min(area.height);
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    let overlay_area = Rect::new(x, y, width, height);
    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Yellow))
      .title(" Filter by tech ");
    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    let items: Vec<ListItem> = self
      .tags
      .iter()
      .map(|tag| ListItem::new(Span::styled(tag.as_str(), Style::default().fg(Color::Cyan))))
      .collect();
    let list =
      List::new(items).highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White));

    let mut state = ListState::default();
    state.select(Some(self.selected));
    frame.render_stateful_widget(list, inner, &mut state);
  }
}
