/// A key hint for the header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortcut {
  pub key: &'static str,
  pub label: &'static str,
  /// Only offered while admin mode is on
  pub admin_only: bool,
}

impl Shortcut {
  pub const fn new(key: &'static str, label: &'static str) -> Self {
    Self {
      key,
      label,
      admin_only: false,
    }
  }

  pub const fn admin(mut self) -> Self {
    self.admin_only = true;
    self
  }
}

const SHORTCUTS: &[Shortcut] = &[
  Shortcut::new("/", "search"),
  Shortcut::new("s", "sort"),
  Shortcut::new("t", "more/less"),
  Shortcut::new("f", "tech"),
  Shortcut::new("a", "add").admin(),
  Shortcut::new("e", "edit").admin(),
  Shortcut::new("d", "delete").admin(),
  Shortcut::new("x", "exit admin").admin(),
  Shortcut::new("c", "contact"),
  Shortcut::new("q", "quit"),
];

pub fn shortcuts(is_admin: bool) -> Vec<Shortcut> {
  SHORTCUTS
    .iter()
    .filter(|s| is_admin || !s.admin_only)
    .cloned()
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_admin_shortcuts_hidden_for_visitors() {
    let visitor = shortcuts(false);
    assert!(visitor.iter().all(|s| !s.admin_only));
    assert!(visitor.iter().any(|s| s.key == "c"));

    let admin = shortcuts(true);
    assert_eq!(admin.len(), SHORTCUTS.len());
  }
}
