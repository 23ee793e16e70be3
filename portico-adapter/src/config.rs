//! Gateway configuration and credential validation

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variable prefix used by [`GatewayConfig::load`]
pub const ENV_PREFIX: &str = "PORTICO";

/// Gateway configuration
///
/// Exactly one credential mode is active: a non-empty `secret_api_key`, or
/// the five legacy fields plus `service_uri`. The choice is re-validated by
/// [`GatewayConfig::credentials`] before every dispatch.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Secret API key (its markers select cert / UAT / production)
    pub secret_api_key: Option<String>,
    /// Legacy site id
    pub site_id: Option<String>,
    /// Legacy device id
    pub device_id: Option<String>,
    /// Legacy license id
    pub license_id: Option<String>,
    /// Legacy user name
    pub username: Option<String>,
    /// Legacy password
    pub password: Option<String>,
    /// Service URI used verbatim in legacy mode
    pub service_uri: Option<String>,
    /// Developer id (enables the DeveloperID/VersionNbr/SiteTrace header triple)
    pub developer_id: Option<String>,
    /// Integration version number
    pub version_number: Option<String>,
    /// Site trace
    pub site_trace: Option<String>,
    /// Connect and total response timeout, in seconds
    pub timeout_seconds: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            secret_api_key: None,
            site_id: None,
            device_id: None,
            license_id: None,
            username: None,
            password: None,
            service_uri: None,
            developer_id: None,
            version_number: None,
            site_trace: None,
            timeout_seconds: crate::DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

// Secrets stay out of logs.
impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("secret_api_key", &self.secret_api_key.as_ref().map(|_| "***"))
            .field("site_id", &self.site_id)
            .field("device_id", &self.device_id)
            .field("license_id", &self.license_id)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("service_uri", &self.service_uri)
            .field("developer_id", &self.developer_id)
            .field("version_number", &self.version_number)
            .field("site_trace", &self.site_trace)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

/// Active credential set
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Single secret API key
    SecretKey(String),
    /// Five-part legacy credentials plus explicit service URI
    Legacy {
        /// Site id
        site_id: String,
        /// Device id
        device_id: String,
        /// License id
        license_id: String,
        /// User name
        username: String,
        /// Password
        password: String,
        /// Service URI
        service_uri: String,
    },
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::SecretKey(_) => f.write_str("SecretKey(***)"),
            Credentials::Legacy {
                site_id,
                device_id,
                license_id,
                username,
                service_uri,
                ..
            } => f
                .debug_struct("Legacy")
                .field("site_id", site_id)
                .field("device_id", device_id)
                .field("license_id", license_id)
                .field("username", username)
                .field("service_uri", service_uri)
                .finish_non_exhaustive(),
        }
    }
}

impl GatewayConfig {
    /// Config using a secret API key
    pub fn with_secret_key(secret_api_key: impl Into<String>) -> Self {
        Self {
            secret_api_key: Some(secret_api_key.into()),
            ..Self::default()
        }
    }

    /// Load from an optional file plus `PORTICO_*` environment variables.
    ///
    /// Variables are the upper-cased field name after the prefix, e.g.
    /// `PORTICO_SECRET_API_KEY` or `PORTICO_TIMEOUT_SECONDS`. Values stay
    /// strings until deserialized, so zero-padded ids are kept as given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(false));
        }

        let settings = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Dispatch timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Resolve and validate the active credential mode.
    ///
    /// Fails with [`Error::Validation`] naming the first missing field.
    pub fn credentials(&self) -> Result<Credentials> {
        if let Some(key) = self.secret_api_key.as_deref() {
            let key = key.trim();
            if !key.is_empty() {
                return Ok(Credentials::SecretKey(key.to_string()));
            }
        }

        Ok(Credentials::Legacy {
            site_id: required("site_id", &self.site_id)?,
            device_id: required("device_id", &self.device_id)?,
            license_id: required("license_id", &self.license_id)?,
            username: required("username", &self.username)?,
            password: required("password", &self.password)?,
            service_uri: required("service_uri", &self.service_uri)?,
        })
    }
}

fn required(name: &str, value: &Option<String>) -> Result<String> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(Error::Validation(format!("The {} parameter is required", name))),
    }
}
