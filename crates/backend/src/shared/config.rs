use chrono::{FixedOffset, Offset, Utc};
use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory with the built browser UI, served as fallback
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

/// Timezone used to cut calendar days in lists and reports
#[derive(Debug, Deserialize, Clone)]
pub struct DisplayConfig {
    #[serde(default = "default_utc_offset_minutes")]
    pub utc_offset_minutes: i32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    #[serde(default = "default_access_token_hours")]
    pub access_token_hours: i64,
}

fn default_port() -> u16 {
    3000
}

fn default_static_dir() -> String {
    "dist".to_string()
}

fn default_utc_offset_minutes() -> i32 {
    // Europe/Istanbul, no DST
    180
}

fn default_access_token_hours() -> i64 {
    24
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            static_dir: default_static_dir(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: default_utc_offset_minutes(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_token_hours: default_access_token_hours(),
        }
    }
}

impl DisplayConfig {
    /// Display timezone as a fixed offset; out-of-range values fall back to UTC
    pub fn offset(&self) -> FixedOffset {
        match FixedOffset::east_opt(self.utc_offset_minutes * 60) {
            Some(offset) => offset,
            None => {
                tracing::warn!(
                    "display.utc_offset_minutes = {} is out of range, using UTC",
                    self.utc_offset_minutes
                );
                Utc.fix()
            }
        }
    }
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[database]
path = "target/db/garage.db"

[server]
port = 3000
static_dir = "dist"

[display]
utc_offset_minutes = 180

[auth]
access_token_hours = 24
"#;

static CONFIG: OnceCell<Config> = OnceCell::new();

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
pub fn load_config() -> anyhow::Result<Config> {
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                tracing::info!("Loading config from: {}", config_path.display());
                let contents = std::fs::read_to_string(&config_path)?;
                let config: Config = toml::from_str(&contents)?;
                return Ok(config);
            } else {
                tracing::warn!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    tracing::info!("Using default embedded configuration");
    default_config()
}

fn default_config() -> anyhow::Result<Config> {
    Ok(toml::from_str(DEFAULT_CONFIG)?)
}

/// Store the configuration for the rest of the process. Only the first call wins.
pub fn install(config: Config) -> &'static Config {
    CONFIG.get_or_init(|| config)
}

/// Process configuration; built-in defaults when nothing was installed
pub fn current() -> &'static Config {
    CONFIG.get_or_init(|| Config {
        database: DatabaseConfig {
            path: "target/db/garage.db".to_string(),
        },
        server: ServerConfig::default(),
        display: DisplayConfig::default(),
        auth: AuthConfig::default(),
    })
}

/// Get the database file path from configuration
/// Resolves relative paths relative to the executable directory
pub fn get_database_path(config: &Config) -> anyhow::Result<PathBuf> {
    let db_path_str = &config.database.path;
    let db_path = Path::new(db_path_str);

    if db_path.is_absolute() {
        return Ok(db_path.to_path_buf());
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            return Ok(exe_dir.join(db_path));
        }
    }

    Ok(PathBuf::from(db_path_str))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_loads() {
        let config = default_config().unwrap();
        assert_eq!(config.database.path, "target/db/garage.db");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.display.offset().local_minus_utc(), 3 * 3600);
        assert_eq!(config.auth.access_token_hours, 24);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config: Config = toml::from_str("[database]\npath = \"x.db\"\n").unwrap();
        assert_eq!(config.server.static_dir, "dist");
        assert_eq!(config.display.utc_offset_minutes, 180);
    }

    #[test]
    fn test_out_of_range_offset_falls_back() {
        let display = DisplayConfig {
            utc_offset_minutes: 100_000,
        };
        assert_eq!(display.offset().local_minus_utc(), 0);
    }
}
