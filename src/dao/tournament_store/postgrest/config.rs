use super::error::{PostgrestError, PostgrestResult};

/// Runtime configuration describing how to reach the PostgREST endpoint.
#[derive(Debug, Clone)]
pub struct PostgrestConfig {
    pub base_url: String,
    pub api_key: Option<String>,
}

impl PostgrestConfig {
    /// Construct a configuration targeting an explicit REST endpoint.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
        }
    }

    /// Attach the API key sent as both `apikey` and bearer token.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Build a configuration by reading the expected environment variables.
    pub fn from_env() -> PostgrestResult<Self> {
        let base_url = std::env::var("POSTGREST_URL").map_err(|_| PostgrestError::MissingEnvVar {
            var: "POSTGREST_URL",
        })?;

        let config = Self::new(base_url);
        Ok(match std::env::var("POSTGREST_API_KEY").ok() {
            Some(key) if !key.trim().is_empty() => config.with_api_key(key),
            _ => config,
        })
    }
}
