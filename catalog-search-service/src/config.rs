//! Search configuration.
//!
//! Loaded from the `[search]` table of a TOML file. Every field is optional;
//! absence means "use the default".
//!
//! ```toml
//! [search]
//! mode = "remote"
//! endpoint = "http://search.internal:9200/v1/search"
//! index_name = "works"
//! max_limit = 500
//!
//! [search.policy]
//! hold_policy = "hide"
//! fuzzy_blacklist = ["basketball", "football"]
//!
//! [search.policy.weights]
//! title = 5.0
//! ```

use catalog_search_query::SearchPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::backend::RemoteSearchIndex;
use crate::error::ServiceError;
use crate::gateway::GatewayConfig;

pub const DEFAULT_INDEX_NAME: &str = "works";
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// Where searches run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentMode {
    /// In-process [`MemoryIndex`](crate::MemoryIndex).
    #[default]
    Embedded,
    /// A remote index service reached over HTTP.
    Remote,
}

/// Top-level file structure. Other sections are tolerated and ignored.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct SearchFileConfig {
    #[serde(default)]
    pub search: Option<SearchConfig>,
}

/// The `[search]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default)]
    pub mode: DeploymentMode,

    /// Remote service endpoint (required when mode is Remote).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub connect_timeout_ms: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_ms: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_limit: Option<usize>,

    /// `[search.policy]`
    #[serde(default)]
    pub policy: SearchPolicy,
}

/// Errors from config file loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {detail}")]
    Parse { path: PathBuf, detail: String },

    #[error("invalid search config: {0}")]
    Invalid(String),
}

impl From<ConfigError> for ServiceError {
    fn from(err: ConfigError) -> Self {
        ServiceError::Config {
            message: err.to_string(),
        }
    }
}

impl SearchConfig {
    /// Create a remote deployment configuration.
    pub fn remote(endpoint: impl Into<String>) -> Self {
        Self {
            mode: DeploymentMode::Remote,
            endpoint: Some(endpoint.into()),
            ..Default::default()
        }
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn with_index_name(mut self, name: impl Into<String>) -> Self {
        self.index_name = Some(name.into());
        self
    }

    pub fn with_request_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.request_timeout_ms = Some(timeout_ms);
        self
    }

    pub fn with_policy(mut self, policy: SearchPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Load the `[search]` section from a TOML file. A missing section or an
    /// empty file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content).map_err(|detail| ConfigError::Parse {
            path: path.to_path_buf(),
            detail,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Self::parse(content).map_err(|detail| ConfigError::Parse {
            path: PathBuf::from("<string>"),
            detail,
        })
    }

    fn parse(content: &str) -> Result<Self, String> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let file: SearchFileConfig = toml::from_str(content).map_err(|e| e.to_string())?;
        let config = file.search.unwrap_or_default();
        tracing::debug!(
            mode = ?config.mode,
            index = config.index_name(),
            "loaded search config"
        );
        Ok(config)
    }

    pub fn index_name(&self) -> &str {
        self.index_name.as_deref().unwrap_or(DEFAULT_INDEX_NAME)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(
            self.connect_timeout_ms
                .unwrap_or(DEFAULT_CONNECT_TIMEOUT_MS),
        )
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(
            self.request_timeout_ms
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS),
        )
    }

    pub fn max_limit(&self) -> usize {
        self.max_limit
            .unwrap_or(catalog_search_protocol::MAX_LIMIT)
    }

    pub fn policy(&self) -> &SearchPolicy {
        &self.policy
    }

    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            index_name: self.index_name().to_string(),
            max_limit: self.max_limit(),
            default_timeout_ms: self
                .request_timeout_ms
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS),
        }
    }

    /// Build the HTTP backend described by this config.
    pub fn remote_index(&self) -> crate::Result<RemoteSearchIndex> {
        if self.mode != DeploymentMode::Remote {
            return Err(ConfigError::Invalid("search mode is not 'remote'".to_string()).into());
        }
        RemoteSearchIndex::from_config(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_search_query::HoldPolicy;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = SearchConfig::default();
        assert_eq!(config.mode, DeploymentMode::Embedded);
        assert_eq!(config.index_name(), "works");
        assert_eq!(config.connect_timeout(), Duration::from_secs(5));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.max_limit(), 1000);
        assert_eq!(config.policy().hold_policy, HoldPolicy::Allow);
    }

    #[test]
    fn test_parse_full_section() {
        let toml = r#"
            [server]
            listen_addr = "0.0.0.0:8090"

            [search]
            mode = "remote"
            endpoint = "http://localhost:9200/v1/search"
            auth_token = "secret"
            index_name = "works-v2"
            request_timeout_ms = 2500
            max_limit = 50

            [search.policy]
            hold_policy = "hide"
            grade_age_offset = 6
            fuzzy_blacklist = ["hockey"]

            [search.policy.weights]
            title = 6.0
        "#;
        let config = SearchConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.mode, DeploymentMode::Remote);
        assert_eq!(config.index_name(), "works-v2");
        assert_eq!(config.request_timeout(), Duration::from_millis(2500));
        assert_eq!(config.policy.hold_policy, HoldPolicy::Hide);
        assert_eq!(config.policy.grade_age_offset, 6);
        assert_eq!(config.policy.fuzzy_blacklist, vec!["hockey".to_string()]);
        assert_eq!(config.policy.weights.title, 6.0);
        assert_eq!(config.policy.weights.author, 4.0);

        let gateway = config.gateway_config();
        assert_eq!(gateway.index_name, "works-v2");
        assert_eq!(gateway.max_limit, 50);
        assert_eq!(gateway.default_timeout_ms, 2500);
    }

    #[test]
    fn test_missing_section_is_default() {
        let config = SearchConfig::from_toml_str("[server]\nlisten_addr = \"x\"\n").unwrap();
        assert_eq!(config, SearchConfig::default());
        assert_eq!(SearchConfig::from_toml_str("  ").unwrap(), SearchConfig::default());
    }

    #[test]
    fn test_parse_error() {
        let err = SearchConfig::from_toml_str("[search]\nmode = \"sideways\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[search]\nindex_name = \"catalog\"").unwrap();
        let config = SearchConfig::load(file.path()).unwrap();
        assert_eq!(config.index_name(), "catalog");

        let err = SearchConfig::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_remote_index_requires_remote_mode() {
        let err = SearchConfig::default().remote_index().unwrap_err();
        assert!(matches!(err, ServiceError::Config { .. }));

        let index = SearchConfig::remote("http://localhost:9200/v1/search")
            .remote_index()
            .unwrap();
        assert!(format!("{index:?}").contains("localhost:9200"));
    }
}
