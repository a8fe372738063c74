//! Application configuration.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Organization hierarchy configuration.
    #[serde(default)]
    pub hierarchy: HierarchyConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public URL of this deployment.
    pub url: String,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Seconds to wait when opening or checking out a connection.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

/// Organization hierarchy configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct HierarchyConfig {
    /// Deepest organization level that may exist. Top-level organizations are level 1.
    #[serde(default = "default_max_depth")]
    pub max_depth: i32,
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    20
}

const fn default_min_connections() -> u32 {
    2
}

const fn default_connect_timeout_secs() -> u64 {
    10
}

const fn default_max_depth() -> i32 {
    2
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `.env` (if present, exported into the process environment)
    /// 2. `config/default.toml`
    /// 3. `config/{environment}.toml` (based on `LESSONSPARK_ENV`)
    /// 4. Environment variables with `LESSONSPARK__` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let env =
            std::env::var("LESSONSPARK_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("LESSONSPARK")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_sections() {
        let config: Config = serde_json::from_value(serde_json::json!({
            "server": { "url": "https://lessons.example.com" },
            "database": { "url": "postgres://localhost/lessonspark" }
        }))
        .unwrap_or_else(|e| panic!("config should deserialize: {e}"));

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.database.max_connections, 20);
        assert_eq!(config.database.connect_timeout_secs, 10);
        assert_eq!(config.hierarchy.max_depth, 2);
    }

    #[test]
    fn test_hierarchy_override() {
        let config: Config = serde_json::from_value(serde_json::json!({
            "server": { "url": "https://lessons.example.com", "port": 8080 },
            "database": { "url": "postgres://localhost/lessonspark" },
            "hierarchy": { "max_depth": 3 }
        }))
        .unwrap_or_else(|e| panic!("config should deserialize: {e}"));

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.hierarchy.max_depth, 3);
    }
}
