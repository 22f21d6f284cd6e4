// Aggregations over record collections
use serde::ser::{Serialize, SerializeMap, Serializer};

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Bucket {
    pub key: String,
    pub count: usize,
}

/// Counts keyed by a fixed, ordered set of status keys.
/// The total of all buckets always equals the number of records counted.
/// Serializes as a `key -> count` map in key order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusBuckets {
    buckets: Vec<Bucket>,
}

impl Serialize for StatusBuckets {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.buckets.len()))?;
        for bucket in &self.buckets {
            map.serialize_entry(&bucket.key, &bucket.count)?;
        }
        map.end()
    }
}

impl StatusBuckets {
    pub fn get(&self, key: &str) -> usize {
        self.buckets
            .iter()
            .find(|b| b.key == key)
            .map(|b| b.count)
            .unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.buckets.iter().map(|b| b.count).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bucket> {
        self.buckets.iter()
    }

    /// Buckets with at least one record, in key order
    pub fn non_empty(&self) -> impl Iterator<Item = &Bucket> {
        self.iter().filter(|b| b.count > 0)
    }
}

/// Count records into the `known` buckets, case-insensitively.
///
/// Absent or empty keys, and keys outside `known`, land in `catch_all`.
/// When `catch_all` is not one of the known keys it gets its own bucket
/// after them.
pub fn count_by<R, F>(records: &[R], key_selector: F, known: &[&str], catch_all: &str) -> StatusBuckets
where
    F: Fn(&R) -> Option<&str>,
{
    let mut buckets: Vec<Bucket> = known
        .iter()
        .map(|k| Bucket {
            key: k.to_string(),
            count: 0,
        })
        .collect();
    if !known.contains(&catch_all) {
        buckets.push(Bucket {
            key: catch_all.to_string(),
            count: 0,
        });
    }

    for record in records {
        let key = key_selector(record)
            .map(str::to_lowercase)
            .filter(|k| !k.is_empty())
            .unwrap_or_else(|| catch_all.to_string());

        let idx = buckets
            .iter()
            .position(|b| b.key == key)
            .or_else(|| buckets.iter().position(|b| b.key == catch_all));
        if let Some(idx) = idx {
            buckets[idx].count += 1;
        }
    }

    StatusBuckets { buckets }
}

/// Open-ended grouping by a lowercased key, in first-seen key order.
/// Absent or empty keys count as `missing`.
pub fn group_count<R, F>(records: &[R], key_selector: F, missing: &str) -> Vec<Bucket>
where
    F: Fn(&R) -> Option<&str>,
{
    let mut groups: Vec<Bucket> = Vec::new();

    for record in records {
        let key = key_selector(record)
            .map(str::to_lowercase)
            .filter(|k| !k.is_empty())
            .unwrap_or_else(|| missing.to_string());

        match groups.iter_mut().find(|b| b.key == key) {
            Some(bucket) => bucket.count += 1,
            None => groups.push(Bucket { key, count: 1 }),
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE_KEYS: &[&str] = &["connected", "degraded", "disconnected", "unknown"];

    #[test]
    fn test_count_by_is_case_insensitive() {
        let statuses = [Some("connected"), Some("Connected"), Some("degraded"), None];
        let buckets = count_by(&statuses, |s| *s, SOURCE_KEYS, "unknown");

        assert_eq!(buckets.get("connected"), 2);
        assert_eq!(buckets.get("degraded"), 1);
        assert_eq!(buckets.get("disconnected"), 0);
        assert_eq!(buckets.get("unknown"), 1);
        assert_eq!(buckets.total(), statuses.len());
    }

    #[test]
    fn test_count_by_routes_unrecognized_keys_to_catch_all() {
        let statuses = [Some("done"), Some("pending"), Some(""), Some("FAILED")];
        let buckets = count_by(&statuses, |s| *s, &["done", "queued", "processing", "failed"], "other");

        let keys: Vec<&str> = buckets.iter().map(|b| b.key.as_str()).collect();
        assert_eq!(keys, vec!["done", "queued", "processing", "failed", "other"]);
        assert_eq!(buckets.get("other"), 2);
        assert_eq!(buckets.get("failed"), 1);
        assert_eq!(buckets.total(), 4);

        let non_empty: Vec<&str> = buckets.non_empty().map(|b| b.key.as_str()).collect();
        assert_eq!(non_empty, vec!["done", "failed", "other"]);
    }

    #[test]
    fn test_buckets_serialize_as_key_count_map() {
        let statuses = [Some("queued"), Some("done"), Some("queued")];
        let buckets = count_by(&statuses, |s| *s, &["done", "queued"], "other");

        assert_eq!(
            serde_json::to_string(&buckets).unwrap(),
            r#"{"done":1,"queued":2,"other":0}"#
        );
    }

    #[test]
    fn test_group_count_keeps_first_seen_order() {
        let kinds = [Some("db"), Some("API"), None, Some("api"), Some("db")];
        let groups = group_count(&kinds, |k| *k, "other");

        assert_eq!(
            groups,
            vec![
                Bucket { key: "db".into(), count: 2 },
                Bucket { key: "api".into(), count: 2 },
                Bucket { key: "other".into(), count: 1 },
            ]
        );
    }
}
