// Pre-aggregated analytics payloads
use serde::{Deserialize, Serialize};

/// Headline metrics, computed server-side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kpis {
    #[serde(default)]
    pub revenue_mtd: f64,
    #[serde(default)]
    pub active_users: i64,
    #[serde(default)]
    pub conv_rate: f64,
    #[serde(default)]
    pub tickets_open: i64,
}
