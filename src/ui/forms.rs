//! Project and contact forms built on [`Form`].

use super::components::Form;
use crate::portfolio::{parse_date, parse_tech_list, ProjectData, ProjectRecord};

const PROJECT_FIELDS: [&str; 7] = [
  "Title",
  "Description",
  "Image",
  "Link",
  "Tech",
  "Date",
  "Priority",
];

/// Add form when `record` is `None`, otherwise an edit form prefilled
/// from it.
pub fn project_form(record: Option<&ProjectRecord>) -> Form {
  let values: [String; 7] = match record {
    Some(r) => [
      r.title.clone(),
      r.description.clone(),
      r.image.clone(),
      r.link.clone(),
      r.tech.join(", "),
      r.date.clone().unwrap_or_default(),
      r.priority.map(|p| p.to_string()).unwrap_or_default(),
    ],
    None => Default::default(),
  };
  let title = if record.is_some() {
    "Edit project"
  } else {
    "Add project"
  };

  PROJECT_FIELDS
    .iter()
    .zip(values.iter())
    .fold(Form::new(title), |form, (label, value)| form.field(*label, value))
}

/// Validate submitted project fields. The error is shown in the form.
pub fn read_project_form(values: &[String]) -> Result<ProjectData, String> {
  let field = |i: usize| values.get(i).map(|v| v.trim()).unwrap_or_default();

  let date = match field(5) {
    "" => None,
    date if parse_date(date).is_some() => Some(date.to_string()),
    _ => return Err("Date must look like 2024-03-01".to_string()),
  };
  let priority = match field(6) {
    "" => None,
    value => Some(
      value
        .parse::<i64>()
        .map_err(|_| "Priority must be a whole number".to_string())?,
    ),
  };

  Ok(ProjectData {
    title: field(0).to_string(),
    description: field(1).to_string(),
    image: field(2).to_string(),
    link: field(3).to_string(),
    tech: parse_tech_list(field(4)),
    date,
    priority,
  })
}

pub fn contact_form() -> Form {
  Form::new("Contact")
    .field("Name", "")
    .field("Email", "")
    .field("Message", "")
}

/// Name, email, message. All three are required.
pub fn read_contact_form(values: &[String]) -> Result<(String, String, String), String> {
  match values {
    [name, email, message]
      if !name.trim().is_empty() && !email.trim().is_empty() && !message.trim().is_empty() =>
    {
      Ok((name.clone(), email.clone(), message.clone()))
    }
    _ => Err("Name, email and message are required".to_string()),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn values(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
  }

  #[test]
  fn test_read_project_form() {
    let data = read_project_form(&values(&[
      " Folio ",
      "Terminal portfolio",
      "",
      "https://example.com",
      "Rust, , SQLite ,",
      "2024-03-01",
      "10",
    ]))
    .unwrap();

    assert_eq!(data.title, "Folio");
    assert_eq!(data.tech, vec!["Rust".to_string(), "SQLite".to_string()]);
    assert_eq!(data.date.as_deref(), Some("2024-03-01"));
    assert_eq!(data.priority, Some(10));
  }

  #[test]
  fn test_blank_optional_fields_are_absent() {
    let data = read_project_form(&values(&["X", "", "", "", "", "", ""])).unwrap();
    assert_eq!(data.date, None);
    assert_eq!(data.priority, None);
    assert!(data.tech.is_empty());
  }

  #[test]
  fn test_invalid_priority_and_date_are_rejected() {
    assert!(read_project_form(&values(&["X", "", "", "", "", "", "high"])).is_err());
    assert!(read_project_form(&values(&["X", "", "", "", "", "soon", ""])).is_err());
  }

  #[test]
  fn test_edit_form_round_trips_record() {
    let record = ProjectRecord {
      id: "doc0001".to_string(),
      title: "Folio".to_string(),
      description: "desc".to_string(),
      date: Some("2024-03-01".to_string()),
      image: String::new(),
      link: String::new(),
      tech: vec!["Rust".to_string(), "SQLite".to_string()],
      priority: Some(3),
    };
    let form = project_form(Some(&record));
    assert_eq!(form.title(), "Edit project");

    let data = read_project_form(&form.values()).unwrap();
    assert_eq!(data.tech, record.tech);
    assert_eq!(data.priority, Some(3));
  }

  #[test]
  fn test_contact_form_requires_every_field() {
    assert!(read_contact_form(&values(&["ada", "", "hi"])).is_err());
    assert_eq!(
      read_contact_form(&values(&["ada", "a@b.c", "hi"])),
      Ok(("ada".to_string(), "a@b.c".to_string(), "hi".to_string()))
    );
  }
}
