// Free-text and equality filters over record collections
use crate::domain::record::Record;
use std::collections::BTreeMap;

/// Filter value meaning "no constraint on this field"
pub const ALL: &str = "all";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFilter {
    pub query: String,
    pub equals: BTreeMap<String, String>,
}

impl RecordFilter {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            equals: BTreeMap::new(),
        }
    }

    /// Constrain `field` to `value`; empty values and `all` are dropped
    pub fn with(mut self, field: &str, value: Option<&str>) -> Self {
        if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
            self.equals.insert(field.to_string(), value.to_string());
        }
        self
    }

    /// Stable: matching records keep their relative order
    pub fn apply<R: Record>(&self, records: &[R]) -> Vec<R> {
        let predicate = make_predicate::<R>(&self.query, &self.equals);
        records.iter().filter(|r| predicate(*r)).cloned().collect()
    }
}

/// Compose a free-text query and equality filters into one predicate.
///
/// The query matches, case-insensitively, a substring of the record's
/// display name or of its `type`; a blank query matches everything. Each
/// equality filter compares the lowercased field (absent reads as empty)
/// against the lowercased expected value, unless the value is `all`.
pub fn make_predicate<R: Record>(query: &str, equals: &BTreeMap<String, String>) -> impl Fn(&R) -> bool + use<R> {
    let query = query.trim().to_lowercase();
    let constraints: Vec<(String, String)> = equals
        .iter()
        .map(|(field, value)| (field.clone(), value.to_lowercase()))
        .filter(|(_, value)| value != ALL)
        .collect();

    move |record: &R| {
        let kind = record.field("type").unwrap_or_default().to_lowercase();
        let by_text = query.is_empty()
            || record.display_name().to_lowercase().contains(&query)
            || kind.contains(&query);

        by_text
            && constraints.iter().all(|(field, expected)| {
                record.field(field).unwrap_or_default().to_lowercase() == *expected
            })
    }
}
