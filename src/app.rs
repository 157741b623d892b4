use crate::admin::{submit_contact, AdminMode, ContactOutcome, SubscriptionId};
use crate::config::Config;
use crate::debounce::Debouncer;
use crate::event::{Event, EventHandler, Mutation};
use crate::portfolio::{Portfolio, ProjectData, ProjectPatch, ProjectRecord, ProjectView, Slot, ViewState, Viewport};
use crate::render::{RenderSequencer, RenderTicket, RenderTrigger};
use crate::store::{SqliteStore, StoreError};
use crate::ui::components::{
  Confirm, ConfirmEvent, Form, FormEvent, KeyResult, SearchEvent, SearchInput, TagPicker,
  TagPickerEvent,
};
use crate::ui::forms::{contact_form, project_form, read_contact_form, read_project_form};
use crate::ui::renderfns::StatusMessage;
use crate::ui;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::stdout;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Modal layer over the card grid
#[derive(Debug, Default)]
pub enum Overlay {
  #[default]
  None,
  /// `editing` holds the id of the record being edited; `None` adds
  ProjectForm {
    form: Form,
    editing: Option<String>,
  },
  ContactForm(Form),
  ConfirmDelete(Confirm<String>),
}

/// Main application state
pub struct App {
  config: Config,
  portfolio: Portfolio<SqliteStore>,
  store: Arc<SqliteStore>,
  admin: AdminMode,
  admin_subscription: Option<SubscriptionId>,
  sequencer: RenderSequencer,

  /// Inputs for the next render
  view: ViewState,
  /// Last accepted render
  rendered: ProjectView,
  loading: bool,
  /// Index into `rendered.slots`
  selected: usize,

  search: SearchInput,
  tag_picker: TagPicker,
  overlay: Overlay,
  status: Option<StatusMessage>,

  search_debounce: Option<Debouncer<String>>,
  resize_debounce: Option<Debouncer<u16>>,

  /// Event sender for async tasks
  event_tx: mpsc::UnboundedSender<Event>,

  should_quit: bool,
}

impl App {
  pub fn new(config: Config, store: Arc<SqliteStore>, admin: AdminMode) -> Self {
    let portfolio = Portfolio::new(store.clone(), config.window_selector(), config.fetch.batch_size);
    let (tx, _rx) = mpsc::unbounded_channel();

    Self {
      view: ViewState {
        is_admin: admin.is_admin_mode(),
        ..Default::default()
      },
      config,
      portfolio,
      store,
      admin,
      admin_subscription: None,
      sequencer: RenderSequencer::new(),
      rendered: ProjectView::default(),
      loading: true,
      selected: 0,
      search: SearchInput::new(),
      tag_picker: TagPicker::new(),
      overlay: Overlay::None,
      status: None,
      search_debounce: None,
      resize_debounce: None,
      event_tx: tx,
      should_quit: false,
    }
  }

  pub async fn run(&mut self) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut events = EventHandler::new(Duration::from_millis(250));
    self.connect(events.sender());

    let size = terminal.size()?;
    self.view.viewport = Viewport::from_width(size.width, self.config.layout.mobile_breakpoint);
    self.request_render(RenderTrigger::InitialLoad);

    let result = self.event_loop(&mut terminal, &mut events).await;

    if let Some(id) = self.admin_subscription.take() {
      self.admin.unsubscribe(id);
    }

    // Cleanup terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
  }

  async fn event_loop(
    &mut self,
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    events: &mut EventHandler,
  ) -> Result<()> {
    while !self.should_quit {
      terminal.draw(|frame| ui::draw(frame, self))?;

      if let Some(event) = events.next().await {
        self.handle_event(event)?;
      }
    }
    Ok(())
  }

  /// Wire debouncers and the admin-mode subscription to `tx`
  fn connect(&mut self, tx: mpsc::UnboundedSender<Event>) {
    let search_tx = tx.clone();
    self.search_debounce = Some(Debouncer::spawn(self.config.debounce.search(), move |term: String| {
      let _ = search_tx.send(Event::SearchSettled(term));
    }));

    let resize_tx = tx.clone();
    self.resize_debounce = Some(Debouncer::spawn(self.config.debounce.resize(), move |width: u16| {
      let _ = resize_tx.send(Event::ResizeSettled(width));
    }));

    let admin_tx = tx.clone();
    self.admin_subscription = Some(self.admin.on_admin_mode_change(move |enabled| {
      let _ = admin_tx.send(Event::AdminModeChanged(enabled));
    }));

    self.event_tx = tx;
  }

  // Accessors for the draw functions

  pub fn config(&self) -> &Config {
    &self.config
  }

  pub fn view_state(&self) -> &ViewState {
    &self.view
  }

  pub fn rendered(&self) -> &ProjectView {
    &self.rendered
  }

  pub fn is_loading(&self) -> bool {
    self.loading
  }

  pub fn selected(&self) -> usize {
    self.selected
  }

  pub fn status(&self) -> Option<&StatusMessage> {
    self.status.as_ref()
  }

  pub fn search(&self) -> &SearchInput {
    &self.search
  }

  pub fn tag_picker(&self) -> &TagPicker {
    &self.tag_picker
  }

  pub fn overlay(&self) -> &Overlay {
    &self.overlay
  }

  /// Snapshot the view inputs and compute the view in the background.
  ///
  /// Triggers that change what the first page is (startup, admin mode,
  /// explicit reload) reset the cache first.
  fn request_render(&mut self, trigger: RenderTrigger) {
    let ticket = self.sequencer.issue(trigger);
    let sequencer = self.sequencer.clone();
    let portfolio = self.portfolio.clone();
    let view = self.view.clone();
    let tx = self.event_tx.clone();
    self.loading = true;
    debug!(seq = ticket.seq, trigger = trigger.label(), "render requested");

    tokio::spawn(async move {
      if matches!(
        trigger,
        RenderTrigger::InitialLoad | RenderTrigger::AdminModeChanged | RenderTrigger::Reload
      ) {
        if let Err(e) = portfolio.reload(&view).await {
          let _ = tx.send(Event::Rendered(ticket, Err(e)));
          return;
        }
      }
      if sequencer.is_superseded(&ticket) {
        debug!(seq = ticket.seq, "render superseded before computing");
        return;
      }
      let rendered = portfolio.render(&view).await;
      let _ = tx.send(Event::Rendered(ticket, rendered));
    });
  }

  fn handle_event(&mut self, event: Event) -> Result<()> {
    match event {
      Event::Key(key) => self.handle_key(key),
      Event::Tick => {}
      Event::Resize(width) => {
        if let Some(debounce) = &self.resize_debounce {
          debounce.push(width);
        }
      }
      Event::ResizeSettled(width) => {
        let viewport = Viewport::from_width(width, self.config.layout.mobile_breakpoint);
        if viewport != self.view.viewport {
          self.view.viewport = viewport;
          self.request_render(RenderTrigger::Resize);
        }
      }
      Event::SearchSettled(term) => {
        if term != self.view.search {
          self.view.search = term;
          self.selected = 0;
          self.request_render(RenderTrigger::Search);
        }
      }
      Event::AdminModeChanged(enabled) => self.handle_admin_change(enabled),
      Event::Rendered(ticket, view) => self.apply_render(ticket, view),
      Event::Mutated(result) => self.handle_mutation(result),
      Event::ContactSubmitted(result) => self.handle_contact_result(result),
    }
    Ok(())
  }

  /// Show a finished render. A failed one leaves the last good view on
  /// screen and reports the store error in the status line.
  fn apply_render(&mut self, ticket: RenderTicket, result: Result<ProjectView, StoreError>) {
    if !self.sequencer.accept(&ticket) {
      debug!(seq = ticket.seq, trigger = ticket.trigger.label(), "dropping stale render");
      return;
    }
    self.loading = self.sequencer.is_superseded(&ticket);
    match result {
      Ok(view) => {
        self.rendered = view;
        self.selected = self.selected.min(self.navigable().saturating_sub(1));
      }
      Err(e) => {
        warn!(error = %e, trigger = ticket.trigger.label(), "render failed, keeping last view");
        self.status = Some(StatusMessage::Error(format!("Could not load projects: {}", e)));
      }
    }
  }

  fn handle_admin_change(&mut self, enabled: bool) {
    self.view.is_admin = enabled;
    if !enabled && matches!(self.overlay, Overlay::ProjectForm { .. } | Overlay::ConfirmDelete(_)) {
      self.overlay = Overlay::None;
    }
    self.status = Some(StatusMessage::Info(if enabled {
      "Admin mode enabled".to_string()
    } else {
      "Admin mode disabled".to_string()
    }));
    self.request_render(RenderTrigger::AdminModeChanged);
  }

  fn handle_mutation(&mut self, result: Result<Mutation, StoreError>) {
    match result {
      Ok(mutation) => {
        self.status = Some(StatusMessage::Info(match mutation {
          Mutation::Created { title } => format!("Added \"{}\"", title),
          Mutation::Updated { title } => format!("Saved \"{}\"", title),
          Mutation::Deleted => "Project deleted".to_string(),
        }));
        self.request_render(RenderTrigger::Mutation);
      }
      Err(e) => {
        warn!(error = %e, "mutation failed");
        self.status = Some(StatusMessage::Error(e.to_string()));
      }
    }
  }

  fn handle_contact_result(&mut self, result: Result<ContactOutcome, StoreError>) {
    match result {
      Ok(ContactOutcome::Sent) => {
        self.overlay = Overlay::None;
        self.status = Some(StatusMessage::Info("Message sent".to_string()));
      }
      // The status line is updated by the admin-mode event
      Ok(ContactOutcome::AdminEnabled) => self.overlay = Overlay::None,
      Ok(ContactOutcome::InvalidCredentials) => self.contact_error("Invalid admin credentials"),
      Err(e) => self.contact_error(&e.to_string()),
    }
  }

  fn contact_error(&mut self, message: &str) {
    if let Overlay::ContactForm(form) = &mut self.overlay {
      form.set_error(message);
    } else {
      self.status = Some(StatusMessage::Error(message.to_string()));
    }
  }

  fn handle_key(&mut self, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }

    if !matches!(self.overlay, Overlay::None) {
      self.handle_overlay_key(key);
      return;
    }

    match self.tag_picker.handle_key(key) {
      KeyResult::Event(TagPickerEvent::Selected(tag)) => {
        self.set_search(&tag);
        return;
      }
      KeyResult::Event(TagPickerEvent::Cancelled) | KeyResult::Handled => return,
      KeyResult::NotHandled => {}
    }

    match self.search.handle_key(key) {
      KeyResult::Event(SearchEvent::Changed(term)) => {
        if let Some(debounce) = &self.search_debounce {
          debounce.push(term);
        }
        return;
      }
      KeyResult::Event(SearchEvent::Closed) | KeyResult::Handled => return,
      KeyResult::NotHandled => {}
    }

    self.handle_normal_key(key);
  }

  fn handle_normal_key(&mut self, key: KeyEvent) {
    let columns = self.view.viewport.columns() as isize;
    let is_admin = self.view.is_admin;

    match key.code {
      KeyCode::Char('q') => self.should_quit = true,

      // Navigation
      KeyCode::Left | KeyCode::Char('h') => self.move_selection(-1),
      KeyCode::Right | KeyCode::Char('l') => self.move_selection(1),
      KeyCode::Up | KeyCode::Char('k') => self.move_selection(-columns),
      KeyCode::Down | KeyCode::Char('j') => self.move_selection(columns),

      KeyCode::Char('s') => {
        self.view.sort = self.view.sort.next();
        self.request_render(RenderTrigger::Sort);
      }
      KeyCode::Char('t') | KeyCode::Char(' ') => {
        if self.rendered.shows_toggle() {
          self.view.expanded = !self.view.expanded;
          self.request_render(RenderTrigger::Toggle);
        }
      }
      KeyCode::Char('r') => self.request_render(RenderTrigger::Reload),
      KeyCode::Char('f') => {
        if let Some(record) = self.focused_project() {
          let tags = record.tech.clone();
          self.tag_picker.show(tags);
        }
      }
      KeyCode::Char('c') => self.overlay = Overlay::ContactForm(contact_form()),

      // Admin actions
      KeyCode::Enter if is_admin => match self.rendered.slots.get(self.selected) {
        Some(Slot::AddProject) => self.open_project_form(None),
        Some(Slot::Project(record)) => {
          let record = record.clone();
          self.open_project_form(Some(&record));
        }
        _ => {}
      },
      KeyCode::Char('a') if is_admin => self.open_project_form(None),
      KeyCode::Char('e') if is_admin => {
        if let Some(record) = self.focused_project().cloned() {
          self.open_project_form(Some(&record));
        }
      }
      KeyCode::Char('d') if is_admin => {
        if let Some(record) = self.focused_project() {
          let prompt = format!(
            "Delete \"{}\"?",
            ui::renderfns::utils::display_title(&record.title)
          );
          self.overlay = Overlay::ConfirmDelete(Confirm::new(prompt, record.id.clone()));
        }
      }
      KeyCode::Char('x') if is_admin => self.admin.set_admin_mode(false),

      _ => {}
    }
  }

  fn handle_overlay_key(&mut self, key: KeyEvent) {
    match std::mem::take(&mut self.overlay) {
      Overlay::None => {}
      Overlay::ProjectForm { mut form, editing } => match form.handle_key(key) {
        KeyResult::Event(FormEvent::Submitted(values)) => match read_project_form(&values) {
          Ok(data) => self.spawn_save(editing, data),
          Err(message) => {
            form.set_error(message);
            self.overlay = Overlay::ProjectForm { form, editing };
          }
        },
        KeyResult::Event(FormEvent::Cancelled) => {}
        _ => self.overlay = Overlay::ProjectForm { form, editing },
      },
      Overlay::ContactForm(mut form) => match form.handle_key(key) {
        KeyResult::Event(FormEvent::Submitted(values)) => {
          match read_contact_form(&values) {
            Ok((name, email, message)) => self.spawn_contact(name, email, message),
            Err(message) => form.set_error(message),
          }
          // Stays open until the submission comes back
          self.overlay = Overlay::ContactForm(form);
        }
        KeyResult::Event(FormEvent::Cancelled) => {}
        _ => self.overlay = Overlay::ContactForm(form),
      },
      Overlay::ConfirmDelete(confirm) => match confirm.handle_key(key) {
        KeyResult::Event(ConfirmEvent::Confirmed(id)) => self.spawn_delete(id),
        KeyResult::Event(ConfirmEvent::Declined) => {}
        _ => self.overlay = Overlay::ConfirmDelete(confirm),
      },
    }
  }

  /// Search through the same debounced path as typing
  fn set_search(&mut self, term: &str) {
    self.search.set_query(term);
    if let Some(debounce) = &self.search_debounce {
      debounce.push(term.to_string());
    }
  }

  fn open_project_form(&mut self, record: Option<&ProjectRecord>) {
    self.overlay = Overlay::ProjectForm {
      form: project_form(record),
      editing: record.map(|r| r.id.clone()),
    };
  }

  fn spawn_save(&self, editing: Option<String>, data: ProjectData) {
    let portfolio = self.portfolio.clone();
    let tx = self.event_tx.clone();
    tokio::spawn(async move {
      let title = data.title.clone();
      let result = match editing {
        None => portfolio
          .create(data)
          .await
          .map(|_| Mutation::Created { title }),
        Some(id) => portfolio
          .update(&id, ProjectPatch::replace_with(data))
          .await
          .map(|_| Mutation::Updated { title }),
      };
      let _ = tx.send(Event::Mutated(result));
    });
  }

  fn spawn_delete(&self, id: String) {
    let portfolio = self.portfolio.clone();
    let tx = self.event_tx.clone();
    tokio::spawn(async move {
      let result = portfolio.delete(&id).await.map(|_| Mutation::Deleted);
      let _ = tx.send(Event::Mutated(result));
    });
  }

  fn spawn_contact(&self, name: String, email: String, message: String) {
    let store = self.store.clone();
    let admin = self.admin.clone();
    let tx = self.event_tx.clone();
    info!(name = %name.trim(), "contact form submitted");
    tokio::spawn(async move {
      let result = submit_contact(store.as_ref(), &admin, &name, &email, &message).await;
      let _ = tx.send(Event::ContactSubmitted(result));
    });
  }

  /// Slots that can take focus; placeholders only pad the last row
  fn navigable(&self) -> usize {
    self
      .rendered
      .slots
      .iter()
      .filter(|slot| !matches!(slot, Slot::Placeholder))
      .count()
  }

  fn move_selection(&mut self, delta: isize) {
    let count = self.navigable() as isize;
    if count == 0 {
      self.selected = 0;
      return;
    }
    self.selected = (self.selected as isize + delta).clamp(0, count - 1) as usize;
  }

  fn focused_project(&self) -> Option<&ProjectRecord> {
    match self.rendered.slots.get(self.selected) {
      Some(Slot::Project(record)) => Some(record),
      _ => None,
    }
  }
}
