use anyhow::{ensure, Context, Result};
use dotenvy::dotenv;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Global configuration accessor to keep the rest of the application stateless.
pub static CONFIG: Lazy<AppConfig> = Lazy::new(|| {
    AppConfig::load_from_env().expect("failed to load configuration from environment")
});

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub api_key: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub llm: Option<LlmConfig>,
}

impl AppConfig {
    /// Build configuration from well-known environment variables.
    pub fn load_from_env() -> Result<Self> {
        preload_env_files();

        let llm = match env_var_non_empty("OPENAI_API_KEY") {
            Ok(api_key) => {
                let endpoint =
                    env::var("OPENAI_ENDPOINT").unwrap_or_else(|_| default_endpoint());
                let model = env::var("OPENAI_MODEL").unwrap_or_else(|_| default_model());
                Some(LlmConfig {
                    api_key,
                    endpoint,
                    model,
                })
            }
            Err(_) => None,
        };

        Ok(Self { llm })
    }

    /// Helper that forces the presence of the LLM provider configuration.
    pub fn require_llm_config(&self) -> Result<&LlmConfig> {
        let config = self.llm.as_ref().context(
            "missing LLM configuration: create a .env file (see .env.example) and set OPENAI_API_KEY",
        )?;

        ensure!(
            !config.api_key.trim().is_empty(),
            "OPENAI_API_KEY must not be empty"
        );

        Ok(config)
    }
}

fn env_var_non_empty(key: &str) -> Result<String, env::VarError> {
    let value = env::var(key)?;
    if value.trim().is_empty() {
        return Err(env::VarError::NotPresent);
    }
    Ok(value)
}

fn default_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn preload_env_files() {
    // Load .env from the current directory or any parent, if present.
    let _ = dotenv();

    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let candidate_files = [manifest_dir.join("../../.env")];

    for path in candidate_files {
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}
