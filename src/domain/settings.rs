// Workspace settings stored by the backend
use serde::{Deserialize, Serialize};

/// Server-side settings. Keys missing from the backend response take the
/// client defaults, so a partial stub still yields a full form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub theme: String,
    pub accent: String,
    pub refresh_seconds: u32,
    pub org_name: String,
    pub logo_url: String,
    pub density: String,
    pub default_range_days: u32,
    pub number_locale: String,
    pub date_locale: String,
    pub slack_webhook: String,
    pub cors_origins: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            accent: "#7C3AED".to_string(),
            refresh_seconds: 60,
            org_name: "Nebula Analytics".to_string(),
            logo_url: String::new(),
            density: "comfortable".to_string(),
            default_range_days: 30,
            number_locale: "en-US".to_string(),
            date_locale: "en-US".to_string(),
            slack_webhook: String::new(),
            cors_origins: "http://localhost:5173".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_response_fills_defaults() {
        let json = r##"{"theme":"light","accent":"#000000","refresh_seconds":15}"##;
        let settings: Settings = serde_json::from_str(json).unwrap();

        assert_eq!(settings.theme, "light");
        assert_eq!(settings.refresh_seconds, 15);
        assert_eq!(settings.org_name, "Nebula Analytics");
        assert_eq!(settings.default_range_days, 30);
        assert_eq!(settings.cors_origins, "http://localhost:5173");
    }
}
