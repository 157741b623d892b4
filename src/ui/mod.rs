pub mod components;
pub mod forms;
pub mod renderfns;
pub mod view;

use crate::app::{App, Overlay};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;
use renderfns::cards::CARD_HEIGHT;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // Header
      Constraint::Min(CARD_HEIGHT),
      Constraint::Length(1), // Footer
    ])
    .split(frame.area());

  let view = app.view_state();
  renderfns::draw_header(
    frame,
    chunks[0],
    &app.config().title,
    view,
    &view::shortcuts(view.is_admin),
  );

  let rendered = app.rendered();
  if rendered.slots.is_empty() {
    draw_empty(frame, chunks[1], app);
  } else {
    renderfns::draw_card_grid(
      frame,
      chunks[1],
      rendered,
      view.viewport.columns(),
      app.selected(),
      app.config().description_limit,
    );
  }

  renderfns::draw_footer(frame, chunks[2], rendered, app.is_loading(), app.status());

  // Overlays, topmost last
  app.search().render_overlay(frame, chunks[1]);
  app.tag_picker().render_overlay(frame, chunks[1]);
  match app.overlay() {
    Overlay::None => {}
    Overlay::ProjectForm { form, .. } | Overlay::ContactForm(form) => {
      form.render_overlay(frame, chunks[1])
    }
    Overlay::ConfirmDelete(confirm) => confirm.render_overlay(frame, chunks[1]),
  }
}

fn draw_empty(frame: &mut Frame, area: Rect, app: &App) {
  let text = if app.is_loading() {
    "Loading projects..."
  } else if app.view_state().is_searching() {
    "No projects match your search"
  } else {
    "No projects yet"
  };
  let paragraph = Paragraph::new(text)
    .style(Style::default().fg(Color::DarkGray))
    .alignment(Alignment::Center);
  frame.render_widget(paragraph, area);
}
