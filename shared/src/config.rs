//! Explicit app configuration.
//!
//! The shell builds an [`AppConfig`] once at startup (usually from a bundled
//! JSON file) and hands it to the core with `Event::Initialize`. Nothing in
//! the core configures itself as a side effect of being loaded.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capabilities::http::ValidatedUrl;
use crate::geo::MapRegion;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("missing required setting: {0}")]
    Missing(&'static str),

    #[error("initial map region is not a valid coordinate")]
    InvalidRegion,

    #[error("could not parse configuration: {0}")]
    Parse(String),

    #[error("the core is already initialized")]
    AlreadyInitialized,
}

/// Public Firebase project identifiers. They ship inside the app bundle and
/// are forwarded to the shell untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirebaseConfig {
    pub api_key: String,
    pub auth_domain: String,
    pub project_id: String,
    pub storage_bucket: String,
    pub messaging_sender_id: String,
    pub app_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// Collection endpoint serving `GET` and `POST` of reports.
    pub reports_url: ValidatedUrl,
    /// OAuth web client id the Google sign-in SDK must be configured with.
    pub google_web_client_id: String,
    #[serde(default)]
    pub firebase: Option<FirebaseConfig>,
    #[serde(default)]
    pub initial_region: MapRegion,
}

impl AppConfig {
    pub fn new(
        reports_url: impl Into<String>,
        google_web_client_id: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            reports_url: ValidatedUrl::new(reports_url)?,
            google_web_client_id: google_web_client_id.into(),
            firebase: None,
            initial_region: MapRegion::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    #[must_use]
    pub fn with_firebase(mut self, firebase: FirebaseConfig) -> Self {
        self.firebase = Some(firebase);
        self
    }

    #[must_use]
    pub fn with_initial_region(mut self, region: MapRegion) -> Self {
        self.initial_region = region;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.google_web_client_id.trim().is_empty() {
            return Err(ConfigError::Missing("googleWebClientId"));
        }
        if self.initial_region.center().is_none() {
            return Err(ConfigError::InvalidRegion);
        }
        if let Some(firebase) = &self.firebase {
            if firebase.project_id.trim().is_empty() {
                return Err(ConfigError::Missing("firebase.projectId"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLIENT_ID: &str = "1234-abc.apps.googleusercontent.com";

    #[test]
    fn new_validates_url() {
        assert!(AppConfig::new("https://api.example.com/reports", CLIENT_ID).is_ok());
        assert!(matches!(
            AppConfig::new("reports", CLIENT_ID),
            Err(ConfigError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn client_id_is_required() {
        assert_eq!(
            AppConfig::new("https://api.example.com/reports", "  "),
            Err(ConfigError::Missing("googleWebClientId"))
        );
    }

    #[test]
    fn from_json_applies_defaults() {
        let config = AppConfig::from_json(
            r#"{
                "reportsUrl": "https://api.example.com/reports",
                "googleWebClientId": "1234-abc.apps.googleusercontent.com"
            }"#,
        )
        .unwrap();
        assert_eq!(config.reports_url.as_str(), "https://api.example.com/reports");
        assert_eq!(config.initial_region, MapRegion::default());
        assert!(config.firebase.is_none());
    }

    #[test]
    fn from_json_reads_firebase_block() {
        let config = AppConfig::from_json(
            r#"{
                "reportsUrl": "https://api.example.com/reports",
                "googleWebClientId": "1234-abc.apps.googleusercontent.com",
                "firebase": {
                    "apiKey": "key",
                    "authDomain": "presawatch.firebaseapp.com",
                    "projectId": "presawatch",
                    "storageBucket": "presawatch.appspot.com",
                    "messagingSenderId": "1",
                    "appId": "1:1:web:1"
                }
            }"#,
        )
        .unwrap();
        assert_eq!(config.firebase.unwrap().project_id, "presawatch");
    }

    #[test]
    fn from_json_rejects_bad_url() {
        let result = AppConfig::from_json(
            r#"{ "reportsUrl": "ftp://x/reports", "googleWebClientId": "id" }"#,
        );
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn invalid_region_is_rejected() {
        let region = MapRegion {
            latitude: 120.0,
            ..MapRegion::default()
        };
        let config = AppConfig::new("https://api.example.com/reports", CLIENT_ID)
            .unwrap()
            .with_initial_region(region);
        assert_eq!(config.validate(), Err(ConfigError::InvalidRegion));
    }
}
