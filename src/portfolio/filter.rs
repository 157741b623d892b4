use chrono::{DateTime, FixedOffset, NaiveDate};
use std::cmp::Ordering;

use super::types::{ProjectRecord, SortKey};
use crate::store::compare_priority_desc;

/// Filter by search term and order by sort key.
///
/// Matching is a case-insensitive substring test against the title and each
/// tech tag. Sorting is stable, so ties keep their input order.
pub fn filter_sort<'a>(
  records: &'a [ProjectRecord],
  search: &str,
  sort: SortKey,
) -> Vec<&'a ProjectRecord> {
  let term = search.trim().to_lowercase();
  let mut result: Vec<&ProjectRecord> = if term.is_empty() {
    records.iter().collect()
  } else {
    records.iter().filter(|r| matches_term(r, &term)).collect()
  };

  match sort {
    SortKey::Featured => result.sort_by(|a, b| compare_priority_desc(a.priority, b.priority)),
    SortKey::NameAsc => result.sort_by(|a, b| compare_titles(&a.title, &b.title)),
    SortKey::NameDesc => result.sort_by(|a, b| compare_titles(&b.title, &a.title)),
    SortKey::DateAsc => result.sort_by_key(|r| date_millis(r.date.as_deref())),
    SortKey::DateDesc => {
      result.sort_by(|a, b| date_millis(b.date.as_deref()).cmp(&date_millis(a.date.as_deref())))
    }
    SortKey::Unordered => {}
  }

  result
}

/// `term` must already be lowercase
fn matches_term(record: &ProjectRecord, term: &str) -> bool {
  record.title.to_lowercase().contains(term)
    || record.tech.iter().any(|t| t.to_lowercase().contains(term))
}

/// Case-insensitive title order with a byte-order tiebreak so the order is
/// total.
pub fn compare_titles(a: &str, b: &str) -> Ordering {
  a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
}

/// Milliseconds since the epoch; absent or unparseable dates are the
/// earliest possible value.
pub fn date_millis(date: Option<&str>) -> i64 {
  date
    .and_then(parse_date)
    .map(|dt| dt.timestamp_millis())
    .unwrap_or(i64::MIN)
}

/// RFC 3339 timestamp or plain `YYYY-MM-DD` (taken as midnight UTC).
pub fn parse_date(date: &str) -> Option<DateTime<FixedOffset>> {
  let date = date.trim();
  if let Ok(dt) = DateTime::parse_from_rfc3339(date) {
    return Some(dt);
  }
  NaiveDate::parse_from_str(date, "%Y-%m-%d")
    .ok()
    .and_then(|d| d.and_hms_opt(0, 0, 0))
    .map(|dt| dt.and_utc().fixed_offset())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn project(id: &str, title: &str, tech: &[&str], date: Option<&str>, priority: Option<i64>) -> ProjectRecord {
    ProjectRecord {
      id: id.to_string(),
      title: title.to_string(),
      description: String::new(),
      date: date.map(String::from),
      image: String::new(),
      link: String::new(),
      tech: tech.iter().map(|t| t.to_string()).collect(),
      priority,
    }
  }

  fn ids(records: &[&ProjectRecord]) -> Vec<String> {
    records.iter().map(|r| r.id.clone()).collect()
  }

  fn sample() -> Vec<ProjectRecord> {
    vec![
      project("1", "Weather App", &["JavaScript", "CSS"], Some("2023-05-01"), Some(10)),
      project("2", "bookshelf", &["Rust"], Some("2021-01-15"), None),
      project("3", "Compiler", &["Rust", "LLVM"], None, Some(20)),
      project("4", "Portfolio", &["HTML"], Some("2024-02-29T10:00:00Z"), Some(5)),
    ]
  }

  #[test]
  fn test_empty_search_keeps_everything() {
    let records = sample();
    assert_eq!(filter_sort(&records, "", SortKey::Unordered).len(), 4);
    assert_eq!(filter_sort(&records, "  ", SortKey::Unordered).len(), 4);
  }

  #[test]
  fn test_search_matches_title_or_tech_case_insensitively() {
    let records = sample();
    assert_eq!(ids(&filter_sort(&records, "rUsT", SortKey::Unordered)), vec!["2", "3"]);
    assert_eq!(ids(&filter_sort(&records, "weather", SortKey::Unordered)), vec!["1"]);
    assert_eq!(ids(&filter_sort(&records, "llv", SortKey::Unordered)), vec!["3"]);
    assert!(filter_sort(&records, "python", SortKey::Unordered).is_empty());
  }

  #[test]
  fn test_filter_matches_iff_title_or_tag_contains_term() {
    let records = sample();
    for term in ["a", "ss", "html", "port", "x", "r"] {
      let found = ids(&filter_sort(&records, term, SortKey::Unordered));
      for record in &records {
        let expected = record.title.to_lowercase().contains(term)
          || record.tech.iter().any(|t| t.to_lowercase().contains(term));
        assert_eq!(found.contains(&record.id), expected, "term {:?} id {}", term, record.id);
      }
    }
  }

  #[test]
  fn test_name_sort_is_case_insensitive() {
    let records = sample();
    assert_eq!(
      ids(&filter_sort(&records, "", SortKey::NameAsc)),
      vec!["2", "3", "4", "1"]
    );
    assert_eq!(
      ids(&filter_sort(&records, "", SortKey::NameDesc)),
      vec!["1", "4", "3", "2"]
    );
  }

  #[test]
  fn test_date_sort_puts_missing_dates_first_ascending() {
    let records = sample();
    assert_eq!(
      ids(&filter_sort(&records, "", SortKey::DateAsc)),
      vec!["3", "2", "1", "4"]
    );
    assert_eq!(
      ids(&filter_sort(&records, "", SortKey::DateDesc)),
      vec!["4", "1", "2", "3"]
    );
  }

  #[test]
  fn test_missing_dates_keep_input_order() {
    let records = vec![
      project("1", "A", &[], None, Some(10)),
      project("2", "B", &[], None, Some(5)),
    ];
    assert_eq!(ids(&filter_sort(&records, "", SortKey::DateAsc)), vec!["1", "2"]);
    assert_eq!(ids(&filter_sort(&records, "", SortKey::DateDesc)), vec!["1", "2"]);
  }

  #[test]
  fn test_unparseable_date_is_earliest() {
    assert_eq!(date_millis(Some("sometime in 2020")), i64::MIN);
    assert_eq!(date_millis(None), i64::MIN);
    assert!(date_millis(Some("1970-01-02")) > 0);
  }

  #[test]
  fn test_featured_sort_orders_by_priority_with_absent_last() {
    let records = vec![
      project("a", "A", &[], None, None),
      project("b", "B", &[], None, Some(1)),
      project("c", "C", &[], None, Some(30)),
      project("d", "D", &[], None, None),
      project("e", "E", &[], None, Some(7)),
    ];
    let sorted = filter_sort(&records, "", SortKey::Featured);
    assert_eq!(ids(&sorted), vec!["c", "e", "b", "a", "d"]);

    let present: Vec<i64> = sorted.iter().filter_map(|r| r.priority).collect();
    assert!(present.windows(2).all(|w| w[0] > w[1]));
  }

  #[test]
  fn test_unknown_sort_preserves_input_order() {
    let records = sample();
    assert_eq!(
      ids(&filter_sort(&records, "", SortKey::parse("popularity"))),
      vec!["1", "2", "3", "4"]
    );
  }
}
