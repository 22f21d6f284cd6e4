// Record domain models (data sources and generated reports)
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A row fetched from one of the backend collections.
///
/// Records are replaced wholesale on every reload; nothing here is ever
/// patched in place.
pub trait Record: DeserializeOwned + Serialize + Clone + Send + Sync + 'static {
    /// Payload accepted by the collection's create endpoint
    type Draft: Serialize + Send + Sync;

    /// Collection path relative to the API root, e.g. `/reports/`
    const ENDPOINT: &'static str;

    fn id(&self) -> i64;

    /// Name or title shown in tables and matched by free-text search
    fn display_name(&self) -> &str;

    /// Categorical field lookup by name (`status`, `type`, ...)
    fn field(&self, name: &str) -> Option<&str>;

    fn status(&self) -> Option<&str> {
        self.field("status")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSource {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DataSourceDraft {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub status: String,
}

impl DataSourceDraft {
    /// New sources are registered as connected API sources
    pub fn api(name: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            kind: "api".to_string(),
            status: "connected".to_string(),
        }
    }
}

impl Record for DataSource {
    type Draft = DataSourceDraft;

    const ENDPOINT: &'static str = "/datasources/";

    fn id(&self) -> i64 {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn field(&self, name: &str) -> Option<&str> {
        match name {
            "name" => Some(self.name.as_str()),
            "type" => self.kind.as_deref(),
            "status" => self.status.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportDraft {
    pub title: String,
}

impl Default for ReportDraft {
    fn default() -> Self {
        Self {
            title: "Ad-hoc Revenue Report".to_string(),
        }
    }
}

impl Record for Report {
    type Draft = ReportDraft;

    const ENDPOINT: &'static str = "/reports/";

    fn id(&self) -> i64 {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.title
    }

    fn field(&self, name: &str) -> Option<&str> {
        match name {
            "title" => Some(self.title.as_str()),
            "status" => self.status.as_deref(),
            "url" => self.url.as_deref(),
            _ => None,
        }
    }
}

/// Fixed status keys a page recognizes, plus its catch-all and terminal keys.
#[derive(Debug, Clone, Copy)]
pub struct StatusVocabulary {
    pub known: &'static [&'static str],
    pub catch_all: &'static str,
    pub terminal: &'static str,
    pub colors: &'static [(&'static str, &'static str)],
}

pub const FALLBACK_COLOR: &str = "#A78BFA";

pub const DATASOURCE_STATUSES: StatusVocabulary = StatusVocabulary {
    known: &["connected", "degraded", "disconnected", "unknown"],
    catch_all: "unknown",
    terminal: "connected",
    colors: &[
        ("connected", "#10B981"),
        ("degraded", "#F59E0B"),
        ("disconnected", "#EF4444"),
        ("unknown", "#A78BFA"),
    ],
};

pub const REPORT_STATUSES: StatusVocabulary = StatusVocabulary {
    known: &["done", "queued", "processing", "failed"],
    catch_all: "other",
    terminal: "done",
    colors: &[
        ("done", "#38B2AC"),
        ("queued", "#7C3AED"),
        ("processing", "#60A5FA"),
        ("failed", "#EF4444"),
    ],
};

impl StatusVocabulary {
    pub fn color(&self, key: &str) -> &'static str {
        self.colors
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, c)| *c)
            .unwrap_or(FALLBACK_COLOR)
    }

    pub fn is_terminal(&self, status: Option<&str>) -> bool {
        status.unwrap_or_default().to_lowercase() == self.terminal
    }

    /// True while at least one record has not reached the terminal status
    pub fn has_pending<R: Record>(&self, records: &[R]) -> bool {
        records.iter().any(|r| !self.is_terminal(r.status()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(id: i64, status: Option<&str>) -> Report {
        Report {
            id,
            title: format!("Report {id}"),
            status: status.map(str::to_string),
            url: None,
        }
    }

    #[test]
    fn test_pending_ignores_case_of_terminal_status() {
        let rows = vec![report(1, Some("DONE")), report(2, Some("done"))];
        assert!(!REPORT_STATUSES.has_pending(&rows));

        let rows = vec![report(1, Some("done")), report(2, Some("queued"))];
        assert!(REPORT_STATUSES.has_pending(&rows));
    }

    #[test]
    fn test_missing_status_is_pending() {
        let rows = vec![report(1, None)];
        assert!(REPORT_STATUSES.has_pending(&rows));
        assert!(!REPORT_STATUSES.has_pending::<Report>(&[]));
    }

    #[test]
    fn test_datasource_wire_format() {
        let json = r#"[{"id":1,"name":"Stripe","type":"api","status":"connected"},{"id":2,"name":"Legacy"}]"#;
        let rows: Vec<DataSource> = serde_json::from_str(json).unwrap();
        assert_eq!(rows[0].field("type"), Some("api"));
        assert_eq!(rows[1].status(), None);

        let draft = serde_json::to_value(DataSourceDraft::api("  Warehouse ")).unwrap();
        assert_eq!(draft["name"], "Warehouse");
        assert_eq!(draft["type"], "api");
        assert_eq!(draft["status"], "connected");
    }

    #[test]
    fn test_status_colors() {
        assert_eq!(DATASOURCE_STATUSES.color("degraded"), "#F59E0B");
        assert_eq!(REPORT_STATUSES.color("other"), FALLBACK_COLOR);
    }
}
