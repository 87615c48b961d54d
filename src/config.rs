use crate::constants::DEFAULT_TIMEOUT_SECS;
use serde::Deserialize;
use std::time::Duration;
use strum_macros::AsRefStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Scheme {
    #[default]
    Http,
    Https,
}

/// Connection settings for one device.
#[derive(Debug, Clone, Deserialize)]
pub struct CameraConfig {
    pub host: String,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub scheme: Scheme,
    #[serde(default = "default_timeout", deserialize_with = "timeout_secs::deserialize")]
    pub timeout: Duration,
}

fn default_timeout() -> Duration {
    Duration::from_secs(DEFAULT_TIMEOUT_SECS)
}

mod timeout_secs {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Ok(Duration::from_secs_f64(secs.max(0.0)))
    }
}

impl CameraConfig {
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            username: username.into(),
            password: password.into(),
            scheme: Scheme::default(),
            timeout: default_timeout(),
        }
    }

    pub fn with_scheme(mut self, scheme: Scheme) -> Self {
        self.scheme = scheme;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> String {
        format!("{}://{}/", self.scheme.as_ref(), self.host)
    }
}
