use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_CONFIG_FILE: &str = "srs.toml";

/// Env vars consulted for the server address, lowest priority first.
pub const SERVER_URL_ENV: [&str; 2] = ["NEXT_PUBLIC_SRS_SERVER", "SRS_SERVER"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid server url `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub server_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    server_url: Option<String>,
}

impl ClientConfig {
    /// Defaults, then the config file, then the environment, then the flag.
    ///
    /// An explicit `config_path` must exist; the default `srs.toml` is
    /// optional.
    pub fn load(
        config_path: Option<&Path>,
        flag_server_url: Option<&str>,
    ) -> Result<Self, ConfigError> {
        Self::load_with_env(config_path, flag_server_url, |key| std::env::var(key).ok())
    }

    pub fn load_with_env(
        config_path: Option<&Path>,
        flag_server_url: Option<&str>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut raw = DEFAULT_SERVER_URL.to_string();

        let file = match config_path {
            Some(path) => Some(read_file_config(path)?),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.exists() {
                    Some(read_file_config(fallback)?)
                } else {
                    None
                }
            }
        };
        if let Some(value) = file.and_then(|file| file.server_url) {
            raw = value;
        }

        for key in SERVER_URL_ENV {
            if let Some(value) = env(key).filter(|value| !value.trim().is_empty()) {
                debug!(key, "server url taken from environment");
                raw = value;
            }
        }

        if let Some(value) = flag_server_url {
            raw = value.to_string();
        }

        Ok(Self {
            server_url: normalize_server_url(&raw)?,
        })
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Requires an http(s) scheme and a host; strips trailing slashes.
pub fn normalize_server_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    let invalid = |reason: &str| ConfigError::InvalidUrl {
        url: trimmed.to_string(),
        reason: reason.to_string(),
    };

    let parsed = Url::parse(trimmed).map_err(|err| invalid(&err.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }
    if parsed.host_str().is_none() {
        return Err(invalid("missing host"));
    }
    if parsed.query().is_some() {
        warn!(url = trimmed, "query string in server url is ignored");
    }

    let mut normalized = parsed;
    normalized.set_query(None);
    normalized.set_fragment(None);
    Ok(normalized.as_str().trim_end_matches('/').to_string())
}
