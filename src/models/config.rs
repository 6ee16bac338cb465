use serde::Deserialize;

/// Configuration options specific to the places service.
///
/// Loaded from `config/default.yaml` (optional) and then from `APP__*`
/// environment variables, e.g. `APP__DATABASE_URL`.
#[derive(Clone, Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_address")]
    pub address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_database_url")]
    pub database_url: String,
    /// How many times a conflicting scrap/unscrap is re-read and retried.
    #[serde(default = "default_scrap_attempts")]
    pub scrap_attempts: usize,
}

fn default_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_database_url() -> String {
    "places.db".to_string()
}

fn default_scrap_attempts() -> usize {
    crate::services::scraps::DEFAULT_SCRAP_ATTEMPTS
}

impl ServerConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let config: ServerConfig = serde_json::from_value(serde_json::json!({
            "port": 9000
        }))
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.address, "127.0.0.1");
        assert_eq!(config.database_url, "places.db");
        assert_eq!(config.scrap_attempts, 3);
    }
}
