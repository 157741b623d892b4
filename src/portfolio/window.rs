use super::types::{ProjectRecord, Viewport};

/// Cards shown while collapsed, per viewport class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSizes {
  pub desktop: usize,
  pub mobile: usize,
}

impl Default for PageSizes {
  fn default() -> Self {
    Self {
      desktop: 3,
      mobile: 4,
    }
  }
}

/// One cell of the card grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
  Project(ProjectRecord),
  /// "Add project" affordance, admin only
  AddProject,
  /// Empty cell padding the last grid row
  Placeholder,
}

/// Decides which part of the ordered list is on screen
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowSelector {
  sizes: PageSizes,
}

impl WindowSelector {
  pub fn new(sizes: PageSizes) -> Self {
    Self { sizes }
  }

  /// Collapsed page size. Admins lose one slot to the add-project card.
  pub fn page_size(&self, viewport: Viewport, is_admin: bool) -> usize {
    let base = match viewport {
      Viewport::Mobile => self.sizes.mobile,
      Viewport::Desktop => self.sizes.desktop,
    };
    if is_admin {
      base.saturating_sub(1)
    } else {
      base
    }
  }

  /// Split `ordered` into the visible prefix and the number hidden behind
  /// the toggle.
  pub fn select_visible<T: Clone>(
    &self,
    ordered: &[T],
    expanded: bool,
    is_admin: bool,
    viewport: Viewport,
  ) -> (Vec<T>, usize) {
    if expanded {
      return (ordered.to_vec(), 0);
    }
    let page_size = self.page_size(viewport, is_admin);
    let shown = ordered.len().min(page_size);
    (ordered[..shown].to_vec(), ordered.len() - shown)
  }

  /// Whether the cache must grow before the collapsed window is correct.
  ///
  /// One record past the page is needed to know whether the toggle should
  /// be offered at all.
  pub fn needs_more_data(&self, ordered_len: usize, viewport: Viewport, is_admin: bool, all_fetched: bool) -> bool {
    !all_fetched && ordered_len <= self.page_size(viewport, is_admin)
  }
}

/// Lay the visible records out as grid cells: records, then the admin
/// add-project card, then placeholders up to a full row.
pub fn layout_slots(visible: Vec<ProjectRecord>, is_admin: bool, viewport: Viewport) -> Vec<Slot> {
  let mut slots: Vec<Slot> = visible.into_iter().map(Slot::Project).collect();
  if is_admin {
    slots.push(Slot::AddProject);
  }

  let columns = viewport.columns();
  let remainder = slots.len() % columns;
  if remainder != 0 {
    slots.extend(std::iter::repeat(Slot::Placeholder).take(columns - remainder));
  }
  slots
}
