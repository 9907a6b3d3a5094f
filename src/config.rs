//! # Configuration
//!
//! Connection settings for the WebDAV share holding the station files.
//!
//! Values are resolved in three layers, each overriding the previous one:
//! 1. built-in defaults pointing at the public Sciebo share,
//! 2. an optional TOML secrets file,
//! 3. the environment variables `WEBDAV_BASE`, `WEBDAV_HOST`,
//!    `WEBDAV_FOLDER`, `WEBDAV_TOKEN` and `WEBDAV_PASS`.
//!
//! Missing credentials are not an error here. They surface later as
//! [`crate::RemoteUnavailable::NotConfigured`] when the share is accessed,
//! so the library can always be constructed.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Default location of the secrets file.
pub const DEFAULT_CONFIG_PATH: &str = "gnss-water.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{0}'")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("Invalid config file '{0}'")]
    Parse(PathBuf, #[source] toml::de::Error),
}

/// Settings for reaching the remote folder.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// WebDAV endpoint the folder path is appended to.
    pub webdav_base: String,
    /// Scheme and host that server-relative hrefs are resolved against.
    pub webdav_host: String,
    /// Folder below `webdav_base` holding the station files.
    pub webdav_folder: String,
    /// Share token, sent as the basic-auth user name.
    pub webdav_token: String,
    /// Share password, sent as the basic-auth password.
    pub webdav_pass: String,
    /// Whole-request timeout in seconds.
    pub timeout_secs: u64,
    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Bytes read from each file when only its header is needed.
    pub header_probe_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            webdav_base: "https://uni-bonn.sciebo.de/public.php/webdav/".to_string(),
            webdav_host: "https://uni-bonn.sciebo.de".to_string(),
            webdav_folder: "solutions/".to_string(),
            webdav_token: String::new(),
            webdav_pass: String::new(),
            timeout_secs: 20,
            connect_timeout_secs: 10,
            header_probe_bytes: 4096,
        }
    }
}

impl Config {
    /// Defaults, then [`DEFAULT_CONFIG_PATH`] if present, then the environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path(DEFAULT_CONFIG_PATH)
    }

    /// Defaults, then the file at `path` if it exists, then the environment.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut config = Self::from_file_or_default(path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Reads the TOML file at `path`. A missing file yields the defaults;
    /// an unreadable or malformed one is an error.
    pub fn from_file_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                let config = toml::from_str::<Config>(&contents)
                    .map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
                log::info!("Loaded WebDAV configuration from {}", path.display());
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!(
                    "No config file at {}, using built-in defaults",
                    path.display()
                );
                Ok(Self::default())
            }
            Err(e) => Err(ConfigError::Read(path.to_path_buf(), e)),
        }
    }

    /// Overrides connection fields with values from `lookup` (the process
    /// environment in production). Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let fields: [(&str, &mut String); 5] = [
            ("WEBDAV_BASE", &mut self.webdav_base),
            ("WEBDAV_HOST", &mut self.webdav_host),
            ("WEBDAV_FOLDER", &mut self.webdav_folder),
            ("WEBDAV_TOKEN", &mut self.webdav_token),
            ("WEBDAV_PASS", &mut self.webdav_pass),
        ];
        for (key, field) in fields {
            if let Some(value) = lookup(key).filter(|v| !v.trim().is_empty()) {
                *field = value;
            }
        }
    }

    pub fn has_credentials(&self) -> bool {
        !self.webdav_token.trim().is_empty()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// `webdav_base` joined with `webdav_folder`, always ending in `/`.
    pub fn folder_url(&self) -> String {
        let base = self.webdav_base.trim_end_matches('/');
        let folder = self.webdav_folder.trim_matches('/');
        if folder.is_empty() {
            format!("{base}/")
        } else {
            format!("{base}/{folder}/")
        }
    }

    /// Absolute URL for a listed href. Server-relative hrefs (`/public.php/...`)
    /// are resolved against `webdav_host`, bare names against the folder.
    pub fn file_url(&self, href: &str) -> String {
        if href.starts_with("http://") || href.starts_with("https://") {
            href.to_string()
        } else if href.starts_with('/') {
            format!("{}{}", self.webdav_host.trim_end_matches('/'), href)
        } else {
            format!("{}{}", self.folder_url(), href)
        }
    }
}
