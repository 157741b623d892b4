mod confirm;
mod form;
mod input;
mod search_input;
mod tag_picker;

pub use confirm::{Confirm, ConfirmEvent};
pub use form::{Form, FormEvent};
pub use search_input::{SearchEvent, SearchInput};
pub use tag_picker::{TagPicker, TagPickerEvent};

/// What a component did with a key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyResult<T> {
  /// Consumed, nothing for the parent to do
  Handled,
  /// Consumed, parent should act on the event
  Event(T),
  /// Not consumed; try the next handler
  NotHandled,
}
