use std::net::SocketAddr;

use ::config::{Config, ConfigError as BuilderError, Environment, File};
use serde::Deserialize;
use thiserror::Error;

const DEFAULT_CONFIG_PATH: &str = "config/config.yaml";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: Option<ServerConfig>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid socket address: {0}")]
    InvalidAddr(String),
    #[error("configuration load failed: {0}")]
    Load(#[from] BuilderError),
}

fn default_bind() -> String {
    "0.0.0.0:3001".to_string()
}

impl AppConfig {
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let bind = self
            .server
            .as_ref()
            .map(|server| server.bind.clone())
            .unwrap_or_else(default_bind);

        bind.parse().map_err(|_| ConfigError::InvalidAddr(bind))
    }
}

pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    builder = builder.add_source(File::with_name(DEFAULT_CONFIG_PATH).required(false));

    builder = builder.add_source(Environment::with_prefix("SWAPDESK").separator("__"));

    let config: AppConfig = builder.build()?.try_deserialize()?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bind_addr_uses_port_3001() {
        let config = AppConfig::default();
        assert_eq!(config.bind_addr().unwrap().port(), 3001);
    }

    #[test]
    fn invalid_bind_addr_is_reported() {
        let config = AppConfig {
            server: Some(ServerConfig {
                bind: "not-an-addr".to_string(),
            }),
        };
        assert!(matches!(
            config.bind_addr(),
            Err(ConfigError::InvalidAddr(_))
        ));
    }
}
