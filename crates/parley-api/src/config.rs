use config::{Config as ConfigLoader, ConfigError, Environment, File};
use parley_llm::{AuthStyle, DataSource, UpstreamConfig};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const ENDPOINT_VAR: &str = "AZURE_AI_ENDPOINT";
pub const API_KEY_VAR: &str = "AZURE_AI_API_KEY";
pub const PORT_VAR: &str = "PORT";
pub const SEARCH_ENDPOINT_VAR: &str = "AZURE_SEARCH_ENDPOINT";
pub const SEARCH_INDEX_VAR: &str = "AZURE_SEARCH_INDEX";
pub const SEARCH_API_KEY_VAR: &str = "AZURE_SEARCH_API_KEY";

#[derive(Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub upstream: UpstreamSettings,
    #[serde(default)]
    pub logging: LoggingConfig,

    // Secrets (from ENV only)
    #[serde(default)]
    pub azure_ai_endpoint: String,
    #[serde(default)]
    pub azure_ai_api_key: String,
    #[serde(default)]
    pub search: Option<SearchConfig>,

    /// Problems found while loading that do not prevent startup; logged once
    /// the subscriber is up.
    #[serde(skip)]
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory holding the browser UI
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
    /// Outer bound on a whole request; the upstream timeout is shorter
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
            body_limit_bytes: default_body_limit(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("public")
}

fn default_body_limit() -> usize {
    10 * 1024 * 1024
}

fn default_request_timeout() -> u64 {
    60
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CorsConfig {
    /// When disabled every origin is allowed
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamSettings {
    #[serde(default)]
    pub auth_style: AuthStyle,
    #[serde(default = "default_upstream_timeout")]
    pub timeout_secs: u64,
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            auth_style: AuthStyle::Auto,
            timeout_secs: default_upstream_timeout(),
        }
    }
}

fn default_upstream_timeout() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// `pretty` or `json`
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

/// Azure AI Search index used for retrieval augmentation
#[derive(Clone, Deserialize)]
pub struct SearchConfig {
    pub endpoint: String,
    pub index: String,
    pub api_key: String,
}

impl SearchConfig {
    pub fn data_source(&self) -> DataSource {
        DataSource::azure_search(&self.endpoint, &self.index, &self.api_key)
    }
}

impl std::fmt::Debug for SearchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchConfig")
            .field("endpoint", &self.endpoint)
            .field("index", &self.index)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("server", &self.server)
            .field("cors", &self.cors)
            .field("upstream", &self.upstream)
            .field("logging", &self.logging)
            .field("azure_ai_endpoint", &self.azure_ai_endpoint)
            .field("azure_ai_api_key", &"<redacted>")
            .field("search", &self.search)
            .finish()
    }
}

impl Config {
    /// Load configuration from TOML files and the process environment
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. built-in defaults
    /// 2. config/default.toml
    /// 3. config/{ENV}.toml (if ENV is set)
    /// 4. PARLEY_<SECTION>__<KEY> environment variables
    ///
    /// Upstream credentials, PORT and the search settings are read from
    /// their plain environment names only.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_env(std::env::vars().collect())
    }

    /// Same as [`Config::load`] with an explicit environment (useful for testing)
    pub fn from_env(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        let env = vars.get("ENV").cloned().unwrap_or_else(|| "dev".to_string());

        let builder = ConfigLoader::builder()
            // 1. Load default config
            .add_source(File::with_name("config/default").required(false))
            // 2. Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            // 3. Environment variables override everything
            .add_source(
                Environment::with_prefix("PARLEY")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(Some(vars.clone())),
            );

        let mut cfg: Config = builder.build()?.try_deserialize()?;
        cfg.apply_env(&vars)?;
        Ok(cfg)
    }

    /// Load config from a specific path (useful for testing)
    pub fn from_file(
        path: impl AsRef<Path>,
        vars: HashMap<String, String>,
    ) -> Result<Self, ConfigError> {
        let builder = ConfigLoader::builder().add_source(File::from(path.as_ref()));

        let mut cfg: Config = builder.build()?.try_deserialize()?;
        cfg.apply_env(&vars)?;
        Ok(cfg)
    }

    fn apply_env(&mut self, vars: &HashMap<String, String>) -> Result<(), ConfigError> {
        let lookup = |key: &str| {
            vars.get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let (endpoint, api_key) = match (lookup(ENDPOINT_VAR), lookup(API_KEY_VAR)) {
            (Some(endpoint), Some(api_key)) => (endpoint, api_key),
            _ => {
                return Err(ConfigError::Message(format!(
                    "Missing required environment variables: {} and {}",
                    ENDPOINT_VAR, API_KEY_VAR
                )))
            }
        };
        self.azure_ai_endpoint = endpoint;
        self.azure_ai_api_key = api_key;

        if let Some(port) = lookup(PORT_VAR) {
            self.server.port = port.parse().map_err(|_| {
                ConfigError::Message(format!("{} must be a valid port number, got '{}'", PORT_VAR, port))
            })?;
        }

        if self.upstream.timeout_secs >= self.server.request_timeout_secs {
            return Err(ConfigError::Message(format!(
                "upstream.timeout_secs ({}) must be shorter than server.request_timeout_secs ({})",
                self.upstream.timeout_secs, self.server.request_timeout_secs
            )));
        }

        let search_vars = [
            lookup(SEARCH_ENDPOINT_VAR),
            lookup(SEARCH_INDEX_VAR),
            lookup(SEARCH_API_KEY_VAR),
        ];
        self.search = match search_vars {
            [Some(endpoint), Some(index), Some(api_key)] => Some(SearchConfig {
                endpoint,
                index,
                api_key,
            }),
            [None, None, None] => None,
            _ => {
                self.warnings.push(format!(
                    "Retrieval disabled: {}, {} and {} must all be set",
                    SEARCH_ENDPOINT_VAR, SEARCH_INDEX_VAR, SEARCH_API_KEY_VAR
                ));
                None
            }
        };

        Ok(())
    }

    /// Connection settings for the completion client
    pub fn upstream_config(&self) -> UpstreamConfig {
        UpstreamConfig {
            endpoint: self.azure_ai_endpoint.clone(),
            api_key: self.azure_ai_api_key.clone(),
            auth_style: self.upstream.auth_style,
            timeout_secs: self.upstream.timeout_secs,
        }
    }
}
