//! Support for the interactive `parley-setup` binary, which writes a `.env`
//! file with the variables [`crate::config::Config`] reads.

use thiserror::Error;

use crate::config::{API_KEY_VAR, ENDPOINT_VAR, PORT_VAR, SEARCH_API_KEY_VAR, SEARCH_ENDPOINT_VAR, SEARCH_INDEX_VAR};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SetupError {
    #[error("Endpoint and API key are required")]
    MissingCredentials,

    #[error("Port must be a number between 1 and 65535, got '{0}'")]
    InvalidPort(String),
}

/// Answers collected from the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupAnswers {
    pub endpoint: String,
    pub api_key: String,
    pub port: String,
    pub environment: String,
}

impl SetupAnswers {
    /// Blank port/environment fall back to `3000` and `dev`
    pub fn new(endpoint: &str, api_key: &str, port: &str, environment: &str) -> Result<Self, SetupError> {
        let endpoint = endpoint.trim();
        let api_key = api_key.trim();
        if endpoint.is_empty() || api_key.is_empty() {
            return Err(SetupError::MissingCredentials);
        }

        let port = match port.trim() {
            "" => "3000".to_string(),
            p => match p.parse::<u16>() {
                Ok(n) if n > 0 => p.to_string(),
                _ => return Err(SetupError::InvalidPort(p.to_string())),
            },
        };

        let environment = match environment.trim() {
            "" => "dev".to_string(),
            e => e.to_string(),
        };

        Ok(Self {
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
            port,
            environment,
        })
    }

    /// Non-fatal problems worth telling the user about
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if !self.endpoint.starts_with("https://") {
            warnings.push("Endpoint should start with https://".to_string());
        }
        warnings
    }

    pub fn render_env_file(&self) -> String {
        format!(
            "# Environment Variables\n\
             {ENDPOINT_VAR}={}\n\
             {API_KEY_VAR}={}\n\
             {PORT_VAR}={}\n\
             ENV={}\n\
             \n\
             # Azure AI Search (optional - for knowledge base integration)\n\
             # {SEARCH_ENDPOINT_VAR}=your-search-service-endpoint\n\
             # {SEARCH_INDEX_VAR}=your-index-name\n\
             # {SEARCH_API_KEY_VAR}=your-search-api-key\n",
            self.endpoint, self.api_key, self.port, self.environment,
        )
    }
}

/// `y` / `yes` in any case
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
