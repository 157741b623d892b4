use chrono::Datelike;

use crate::portfolio::{parse_date, UNTITLED};

/// Keep the first `limit` characters, adding "..." if anything was cut
pub fn truncate(s: &str, limit: usize) -> String {
  match s.char_indices().nth(limit) {
    Some((end, _)) => format!("{}...", &s[..end]),
    None => s.to_string(),
  }
}

pub fn display_title(title: &str) -> &str {
  if title.trim().is_empty() {
    UNTITLED
  } else {
    title
  }
}

/// "March 3rd, 2024". Absent or unreadable dates show as nothing.
pub fn format_display_date(date: Option<&str>) -> String {
  let Some(date) = date.and_then(parse_date) else {
    return String::new();
  };
  let day = date.day();
  format!(
    "{} {}{}, {}",
    MONTHS[date.month0() as usize],
    day,
    ordinal_suffix(day),
    date.year()
  )
}

const MONTHS: [&str; 12] = [
  "January",
  "February",
  "March",
  "April",
  "May",
  "June",
  "July",
  "August",
  "September",
  "October",
  "November",
  "December",
];

fn ordinal_suffix(day: u32) -> &'static str {
  if (11..=13).contains(&(day % 100)) {
    return "th";
  }
  match day % 10 {
    1 => "st",
    2 => "nd",
    3 => "rd",
    _ => "th",
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_truncate_short_string() {
    assert_eq!(truncate("hello", 10), "hello");
    assert_eq!(truncate("hello", 5), "hello");
  }

  #[test]
  fn test_truncate_long_string() {
    assert_eq!(truncate("hello world", 5), "hello...");
  }

  #[test]
  fn test_truncate_counts_characters() {
    assert_eq!(truncate("żółw żółw", 4), "żółw...");
  }

  #[test]
  fn test_ordinal_suffixes() {
    let suffixes: Vec<&str> = [1, 2, 3, 4, 11, 12, 13, 21, 22, 23, 31]
      .into_iter()
      .map(ordinal_suffix)
      .collect();
    assert_eq!(
      suffixes,
      vec!["st", "nd", "rd", "th", "th", "th", "th", "st", "nd", "rd", "st"]
    );
  }

  #[test]
  fn test_format_display_date() {
    assert_eq!(format_display_date(Some("2024-03-03")), "March 3rd, 2024");
    assert_eq!(
      format_display_date(Some("2023-12-22T10:00:00Z")),
      "December 22nd, 2023"
    );
    assert_eq!(format_display_date(Some("yesterday")), "");
    assert_eq!(format_display_date(None), "");
  }

  #[test]
  fn test_display_title_fallback() {
    assert_eq!(display_title("  "), "Untitled Project");
    assert_eq!(display_title("Folio"), "Folio");
  }
}
