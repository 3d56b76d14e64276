//! Runtime configuration read from the environment.

use std::{ops::Deref, sync::Arc, time::Duration};

use thiserror::Error;

use crate::domain::{RecordStore, StoreError};
use crate::infra::{
    memory::{MemoryStore, DEFAULT_LATENCY},
    rest::{RestStore, DEFAULT_TIMEOUT},
};

pub const STORE_URL_VAR: &str = "PARCEL_DESK_STORE_URL";
pub const STORE_KEY_VAR: &str = "PARCEL_DESK_STORE_KEY";
pub const LATENCY_VAR: &str = "PARCEL_DESK_LATENCY_MS";
pub const TIMEOUT_VAR: &str = "PARCEL_DESK_TIMEOUT_SECS";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} is set but {1} is missing")]
    MissingKey(&'static str, &'static str),
    #[error("{var} must be a whole number, got {value:?}")]
    NotANumber { var: &'static str, value: String },
}

#[derive(Clone, Debug, PartialEq)]
pub enum StoreConfig {
    Hosted { url: String, api_key: String },
    Demo,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub demo_latency: Duration,
    pub request_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::Demo,
            demo_latency: DEFAULT_LATENCY,
            request_timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from any variable source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        let store = match read(STORE_URL_VAR) {
            Some(url) => StoreConfig::Hosted {
                url: url.trim().to_string(),
                api_key: read(STORE_KEY_VAR)
                    .ok_or(ConfigError::MissingKey(STORE_URL_VAR, STORE_KEY_VAR))?,
            },
            None => StoreConfig::Demo,
        };
        let demo_latency = read(LATENCY_VAR)
            .map(|value| parse_number(LATENCY_VAR, &value).map(Duration::from_millis))
            .transpose()?
            .unwrap_or(defaults.demo_latency);
        let request_timeout = read(TIMEOUT_VAR)
            .map(|value| parse_number(TIMEOUT_VAR, &value).map(Duration::from_secs))
            .transpose()?
            .unwrap_or(defaults.request_timeout);

        Ok(Self {
            store,
            demo_latency,
            request_timeout,
        })
    }
}

fn parse_number(var: &'static str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::NotANumber {
        var,
        value: value.to_string(),
    })
}

/// Shared handle to the active record store, provided through context.
#[derive(Clone)]
pub struct StoreHandle(Arc<dyn RecordStore>);

impl StoreHandle {
    pub fn new(store: impl RecordStore + 'static) -> Self {
        Self(Arc::new(store))
    }

    pub fn connect(config: &AppConfig) -> Result<Self, StoreError> {
        match &config.store {
            StoreConfig::Hosted { url, api_key } => {
                tracing::info!("[config] using hosted store at {url}");
                let store =
                    RestStore::with_timeout(url, api_key.clone(), config.request_timeout)?;
                Ok(Self::new(store))
            }
            StoreConfig::Demo => {
                tracing::info!("[config] no {STORE_URL_VAR}; using the demo store");
                Ok(Self::new(
                    MemoryStore::seeded().with_latency(config.demo_latency),
                ))
            }
        }
    }
}

impl Deref for StoreHandle {
    type Target = dyn RecordStore;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

impl PartialEq for StoreHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}
