use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::cache::Cacheable;
use crate::store::StoreError;

/// Title shown for records stored without one
pub const UNTITLED: &str = "Untitled Project";

/// A project as held in the local cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRecord {
  pub id: String,
  pub title: String,
  pub description: String,
  pub date: Option<String>,
  pub image: String,
  pub link: String,
  pub tech: Vec<String>,
  pub priority: Option<i64>,
}

impl ProjectRecord {
  /// Build a record from a fetched store document.
  ///
  /// Missing fields fall back to defaults; a `tech` value that is not a
  /// sequence is replaced by an empty one instead of rejecting the record.
  pub fn from_document(id: impl Into<String>, doc: &Value) -> Self {
    let id = id.into();
    let empty = Map::new();
    let fields = match doc.as_object() {
      Some(fields) => fields,
      None => {
        warn!(error = %StoreError::MalformedRecord(format!("{} is not an object", id)), "using defaults");
        &empty
      }
    };

    let text = |key: &str| {
      fields
        .get(key)
        .and_then(Value::as_str)
        .map(String::from)
        .unwrap_or_default()
    };

    let tech = match fields.get("tech") {
      None | Some(Value::Null) => Vec::new(),
      Some(Value::Array(tags)) => tags
        .iter()
        .filter_map(Value::as_str)
        .map(String::from)
        .collect(),
      Some(other) => {
        warn!(
          error = %StoreError::MalformedRecord(format!("{}: tech is {}", id, other)),
          "substituting empty tech list"
        );
        Vec::new()
      }
    };

    let priority = fields.get("priority").and_then(|p| {
      p.as_i64()
        .or_else(|| p.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
    });

    Self {
      title: fields
        .get("title")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .unwrap_or(UNTITLED)
        .to_string(),
      description: text("description"),
      date: fields
        .get("date")
        .and_then(Value::as_str)
        .filter(|d| !d.is_empty())
        .map(String::from),
      image: text("image"),
      link: text("link"),
      tech,
      priority,
      id,
    }
  }

  /// The record the store holds right after inserting `data` as `id`.
  pub fn from_data(id: impl Into<String>, data: ProjectData) -> Self {
    Self {
      id: id.into(),
      title: if data.title.is_empty() {
        UNTITLED.to_string()
      } else {
        data.title
      },
      description: data.description,
      date: data.date,
      image: data.image,
      link: data.link,
      tech: data.tech,
      priority: data.priority,
    }
  }
}

impl Cacheable for ProjectRecord {
  fn cache_key(&self) -> &str {
    &self.id
  }
}

/// Field values for a project that does not exist yet
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectData {
  #[serde(default)]
  pub title: String,
  #[serde(default)]
  pub description: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub date: Option<String>,
  #[serde(default)]
  pub image: String,
  #[serde(default)]
  pub link: String,
  #[serde(default)]
  pub tech: Vec<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub priority: Option<i64>,
}

impl ProjectData {
  pub fn to_document(&self) -> Value {
    serde_json::to_value(self).unwrap_or_else(|_| Value::Object(Map::new()))
  }
}

/// Partial update: only fields that are `Some` are written.
///
/// `date` and `priority` are nullable, so `Some(None)` clears them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectPatch {
  pub title: Option<String>,
  pub description: Option<String>,
  pub date: Option<Option<String>>,
  pub image: Option<String>,
  pub link: Option<String>,
  pub tech: Option<Vec<String>>,
  pub priority: Option<Option<i64>>,
}

impl ProjectPatch {
  /// A patch that overwrites every field with the values from `data`.
  pub fn replace_with(data: ProjectData) -> Self {
    Self {
      title: Some(data.title),
      description: Some(data.description),
      date: Some(data.date),
      image: Some(data.image),
      link: Some(data.link),
      tech: Some(data.tech),
      priority: Some(data.priority),
    }
  }

  /// Shallow-merge into a cached record.
  pub fn apply_to(&self, record: &mut ProjectRecord) {
    if let Some(title) = &self.title {
      record.title = if title.is_empty() {
        UNTITLED.to_string()
      } else {
        title.clone()
      };
    }
    if let Some(description) = &self.description {
      record.description = description.clone();
    }
    if let Some(date) = &self.date {
      record.date = date.clone();
    }
    if let Some(image) = &self.image {
      record.image = image.clone();
    }
    if let Some(link) = &self.link {
      record.link = link.clone();
    }
    if let Some(tech) = &self.tech {
      record.tech = tech.clone();
    }
    if let Some(priority) = self.priority {
      record.priority = priority;
    }
  }

  /// Shallow-merge into a stored document.
  pub fn apply_to_document(&self, doc: &mut Map<String, Value>) {
    let mut set = |key: &str, value: Value| {
      doc.insert(key.to_string(), value);
    };
    if let Some(title) = &self.title {
      set("title", Value::from(title.clone()));
    }
    if let Some(description) = &self.description {
      set("description", Value::from(description.clone()));
    }
    if let Some(date) = &self.date {
      set("date", date.clone().map(Value::from).unwrap_or(Value::Null));
    }
    if let Some(image) = &self.image {
      set("image", Value::from(image.clone()));
    }
    if let Some(link) = &self.link {
      set("link", Value::from(link.clone()));
    }
    if let Some(tech) = &self.tech {
      set("tech", Value::from(tech.clone()));
    }
    if let Some(priority) = self.priority {
      set("priority", priority.map(Value::from).unwrap_or(Value::Null));
    }
  }
}

/// Split comma-separated tech input into trimmed, non-empty tags
pub fn parse_tech_list(input: &str) -> Vec<String> {
  input
    .split(',')
    .map(str::trim)
    .filter(|t| !t.is_empty())
    .map(String::from)
    .collect()
}

/// Sort order selected by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
  /// Store order: priority descending, unprioritized last
  #[default]
  Featured,
  NameAsc,
  NameDesc,
  DateAsc,
  DateDesc,
  /// Unrecognized selector value; input order is kept
  Unordered,
}

impl SortKey {
  pub fn parse(value: &str) -> Self {
    match value {
      "" | "featured" => SortKey::Featured,
      "nameAsc" => SortKey::NameAsc,
      "nameDesc" => SortKey::NameDesc,
      "dateAsc" => SortKey::DateAsc,
      "dateDesc" => SortKey::DateDesc,
      _ => SortKey::Unordered,
    }
  }

  pub fn label(&self) -> &'static str {
    match self {
      SortKey::Featured => "Featured",
      SortKey::NameAsc => "Name A-Z",
      SortKey::NameDesc => "Name Z-A",
      SortKey::DateAsc => "Oldest",
      SortKey::DateDesc => "Newest",
      SortKey::Unordered => "Unsorted",
    }
  }

  /// Next entry in the sort selector
  pub fn next(self) -> Self {
    match self {
      SortKey::Featured => SortKey::NameAsc,
      SortKey::NameAsc => SortKey::NameDesc,
      SortKey::NameDesc => SortKey::DateAsc,
      SortKey::DateAsc => SortKey::DateDesc,
      SortKey::DateDesc | SortKey::Unordered => SortKey::Featured,
    }
  }

  /// Re-ordering a partial page gives wrong results for these keys.
  pub fn requires_full_data(&self) -> bool {
    matches!(
      self,
      SortKey::NameAsc | SortKey::NameDesc | SortKey::DateAsc | SortKey::DateDesc
    )
  }
}

/// Viewport class derived from the terminal width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Viewport {
  Mobile,
  #[default]
  Desktop,
}

impl Viewport {
  pub fn from_width(width: u16, mobile_breakpoint: u16) -> Self {
    if width < mobile_breakpoint {
      Viewport::Mobile
    } else {
      Viewport::Desktop
    }
  }

  /// Cards per grid row
  pub fn columns(&self) -> usize {
    match self {
      Viewport::Mobile => 1,
      Viewport::Desktop => 3,
    }
  }
}

/// Inputs a render is computed from, captured when the trigger fires
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
  pub search: String,
  pub sort: SortKey,
  pub expanded: bool,
  pub viewport: Viewport,
  pub is_admin: bool,
}

impl ViewState {
  pub fn is_searching(&self) -> bool {
    !self.search.trim().is_empty()
  }

  /// Search, expand, and re-sorting must see the whole collection.
  pub fn requires_full_data(&self) -> bool {
    self.is_searching() || self.expanded || self.sort.requires_full_data()
  }
}
