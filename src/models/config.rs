//! Configuration model loaded from external sources.

use std::time::Duration;

use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
/// Basic configuration shared across handlers.
pub struct ServerConfig {
    pub domain: String,
    pub address: String,
    pub port: u16,
    pub templates_dir: String,
    /// Signs the session, identity and flash cookies.
    pub secret: String,
    /// Base URL of the REST backend.
    pub api_base_url: String,
    /// Secret the backend signs its access tokens with.
    pub api_jwt_secret: String,
    #[serde(default = "default_timeout_secs")]
    pub api_timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

impl ServerConfig {
    /// Layers `config/default.yaml`, `config/{app_env}.yaml` and `APP_*`
    /// environment variables.
    pub fn load(app_env: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name(&format!("config/{app_env}")).required(false))
            .add_source(config::Environment::with_prefix("APP"))
            .build()?
            .try_deserialize()
    }

    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api_timeout_secs)
    }
}
