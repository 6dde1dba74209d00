use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::connection::RetryPolicy;
use crate::error::ConfigError;

const EMBEDDED_CONFIG: &str = include_str!("../../config/client.yaml");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub version: f32,
    pub client_global: String,
    pub connection: ConnectionConfig,
    pub classification: EndpointConfig,
    pub augmentation: EndpointConfig,
    pub ui: UiConfig,
    pub model_info: ModelInfo,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub max_attempts: u32,
    pub interval_ms: u64,
}

/// One hosted endpoint and the routes a page calls on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub space: String,
    pub route: String,
    #[serde(default)]
    pub summary_route: Option<String>,
    /// `None` leaves uploads unconstrained.
    #[serde(default)]
    pub max_upload_bytes: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiConfig {
    pub download_stagger_ms: u64,
    pub notice_timeout_ms: u32,
    pub notice_capacity: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub architecture: String,
    pub input_size: Vec<u32>,
    pub classes: Vec<String>,
}

impl ClientConfig {
    /// Loads the configuration compiled into the binary.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_yaml(EMBEDDED_CONFIG)
    }

    pub fn from_yaml(source: &str) -> Result<Self, ConfigError> {
        let config: ClientConfig = serde_yaml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.client_global.trim().is_empty() {
            return Err(ConfigError::Invalid("client_global must not be empty".into()));
        }
        if self.connection.max_attempts == 0 {
            return Err(ConfigError::Invalid("connection.max_attempts must be at least 1".into()));
        }
        for (name, endpoint) in [
            ("classification", &self.classification),
            ("augmentation", &self.augmentation),
        ] {
            if endpoint.space.trim().is_empty() || endpoint.route.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "{} endpoint needs both a space and a route",
                    name
                )));
            }
        }
        Ok(())
    }

    pub fn download_stagger(&self) -> Duration {
        Duration::from_millis(self.ui.download_stagger_ms)
    }
}

impl ConnectionConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, Duration::from_millis(self.interval_ms))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            version: 1.0,
            client_global: "GradioClient".into(),
            connection: ConnectionConfig {
                max_attempts: 50,
                interval_ms: 100,
            },
            classification: EndpointConfig {
                space: "lungscan/lung-tumor-classification".into(),
                route: "/predict_tumor_json".into(),
                summary_route: Some("/predict_tumor".into()),
                max_upload_bytes: Some(10 * 1024 * 1024),
            },
            augmentation: EndpointConfig {
                space: "lungscan/lung-ct-augmentation".into(),
                route: "/augment_image".into(),
                summary_route: None,
                max_upload_bytes: None,
            },
            ui: UiConfig {
                download_stagger_ms: 200,
                notice_timeout_ms: 5000,
                notice_capacity: 5,
            },
            model_info: ModelInfo {
                architecture: "EfficientNet".into(),
                input_size: vec![299, 299],
                classes: vec![
                    "adenocarcinoma".into(),
                    "large.cell.carcinoma".into(),
                    "normal".into(),
                    "squamous.cell.carcinoma".into(),
                ],
            },
        }
    }
}
