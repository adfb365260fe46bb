use crate::services::job_service::JobService;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Serialize, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// Per-platform API credentials. Any missing credential degrades that
/// platform to empty results instead of failing the whole search.
#[derive(Serialize, Deserialize, Clone, Default)]
pub struct ApiCredentials {
    #[serde(default)]
    pub twitch_client_id: Option<String>,
    #[serde(default)]
    pub twitch_client_secret: Option<String>,
    #[serde(default)]
    pub youtube_api_key: Option<String>,
    #[serde(default)]
    pub rapidapi_key: Option<String>,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub credentials: ApiCredentials,
    /// Directory CSV exports are written to and served from.
    #[serde(default = "default_export_dir")]
    pub export_dir: String,
}

fn default_export_dir() -> String {
    ".".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            credentials: ApiCredentials::default(),
            export_dir: default_export_dir(),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub jobs: Arc<JobService>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_leave_credentials_unset() {
        let settings: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings.server.port, 3000);
        assert_eq!(settings.export_dir, ".");
        assert!(settings.credentials.twitch_client_id.is_none());
        assert!(settings.credentials.youtube_api_key.is_none());
        assert!(settings.credentials.rapidapi_key.is_none());
    }

    #[test]
    fn test_partial_settings_file() {
        let settings: Settings =
            serde_json::from_str(r#"{"credentials": {"youtube_api_key": "abc"}}"#).unwrap();
        assert_eq!(settings.credentials.youtube_api_key.as_deref(), Some("abc"));
        assert!(settings.credentials.twitch_client_secret.is_none());
    }
}
