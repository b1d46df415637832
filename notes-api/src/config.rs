use std::sync::OnceLock;

use serde::Deserialize;

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default)]
    pub log_json: bool,

    // build
    #[serde(default = "default_local")]
    pub source: String,
    #[serde(default = "default_local")]
    pub git_commit: String,
    #[serde(default = "default_local")]
    pub pipeline_id: String,
    #[serde(default = "default_local")]
    pub version: String,
}

fn default_host() -> String {
    "127.0.0.1".into()
}

fn default_port() -> u16 {
    4000
}

fn default_database_url() -> String {
    "sqlite.db".into()
}

fn default_local() -> String {
    "local".into()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            database_url: default_database_url(),
            log_json: false,
            source: default_local(),
            git_commit: default_local(),
            pipeline_id: default_local(),
            version: default_local(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env::<Self>()
    }
}

static CONFIG: OnceLock<Config> = OnceLock::new();

/// Loads the configuration from the environment once. Call early in `main` so a
/// malformed variable fails startup instead of silently falling back to defaults.
pub fn init() -> crate::Result<&'static Config> {
    if let Some(config) = CONFIG.get() {
        return Ok(config);
    }
    let config = Config::from_env()?;
    Ok(CONFIG.get_or_init(|| config))
}

pub fn config() -> &'static Config {
    CONFIG.get_or_init(Config::default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.port, 4000);
        assert_eq!(config.database_url, "sqlite.db");
        assert!(!config.log_json);
        assert_eq!(config.version, "local");
    }

    #[test]
    fn deserializes_from_vars() {
        let vars = vec![
            ("PORT".to_string(), "8080".to_string()),
            ("DATABASE_URL".to_string(), ":memory:".to_string()),
            ("LOG_JSON".to_string(), "true".to_string()),
        ];
        let config = envy::from_iter::<_, Config>(vars).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.database_url, ":memory:");
        assert!(config.log_json);
        assert_eq!(config.host, "127.0.0.1");
    }

    #[test]
    fn rejects_malformed_port() {
        let vars = vec![("PORT".to_string(), "not-a-port".to_string())];
        assert!(envy::from_iter::<_, Config>(vars).is_err());
    }
}
