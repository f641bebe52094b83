use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use carehub_core::default_log_level;
use thiserror::Error;

const STORE_FILE_NAME: &str = "carehub_store.sqlite3";
const INDEX_FILE_NAME: &str = "carehub_index.sqlite3";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value `{value}` for {key}: {message}")]
    Invalid {
        key: &'static str,
        value: String,
        message: String,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub store_path: PathBuf,
    pub index_path: PathBuf,
    pub log_level: String,
    /// Absolute directory for rolling log files; `None` logs to stderr.
    pub log_dir: Option<String>,
    /// Keys that fell back to their default, reported once logging is up.
    pub defaults_used: Vec<&'static str>,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut loader = Loader {
            lookup,
            defaults_used: Vec::new(),
        };
        let temp_dir = env::temp_dir();

        let host = loader.try_load("CAREHUB_HOST", "0.0.0.0".to_string())?;
        let port = loader.try_load("CAREHUB_PORT", 8080)?;
        let store_path = loader.try_load("CAREHUB_STORE_PATH", temp_dir.join(STORE_FILE_NAME))?;
        let index_path = loader.try_load("CAREHUB_INDEX_PATH", temp_dir.join(INDEX_FILE_NAME))?;
        let log_level = loader.try_load("CAREHUB_LOG_LEVEL", default_log_level().to_string())?;
        let log_dir = loader.var("CAREHUB_LOG_DIR");

        Ok(Self {
            host,
            port,
            store_path,
            index_path,
            log_level,
            log_dir,
            defaults_used: loader.defaults_used,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

struct Loader<F> {
    lookup: F,
    defaults_used: Vec<&'static str>,
}

impl<F: Fn(&str) -> Option<String>> Loader<F> {
    fn var(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn try_load<T: FromStr>(&mut self, key: &'static str, default: T) -> Result<T, ConfigError>
    where
        T::Err: Display,
    {
        let Some(raw) = self.var(key) else {
            self.defaults_used.push(key);
            return Ok(default);
        };

        raw.parse().map_err(|err: T::Err| ConfigError::Invalid {
            key,
            value: raw.clone(),
            message: err.to_string(),
        })
    }
}
