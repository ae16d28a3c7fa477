//! Application settings, read from `settings.toml` in the working directory.
//!
//! Any key can be overridden from the environment with a `RISTORO__` prefix,
//! e.g. `RISTORO__SERVER__PORT=8080`.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    pub server: Server,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_config(
            Config::builder()
                .add_source(File::with_name("settings").required(false))
                .add_source(
                    Environment::with_prefix("RISTORO")
                        .separator("__")
                        .try_parsing(true),
                ),
        )
    }

    fn from_config(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, ConfigError> {
        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn parse(raw: &str) -> Result<Settings, ConfigError> {
        Settings::from_config(
            Config::builder().add_source(File::from_str(raw, FileFormat::Toml)),
        )
    }

    #[test]
    fn sqlite_database_and_default_level() {
        let settings = parse(
            r#"
            [server]
            port = 3000
            database = { sqlite = "ristoro.db" }
            "#,
        )
        .unwrap();
        assert_eq!(settings.app.level, "info");
        assert_eq!(settings.server.port, 3000);
        assert!(settings.server.bind.is_none());
        assert_eq!(
            settings.server.database,
            Database::Sqlite("ristoro.db".to_string())
        );
    }

    #[test]
    fn memory_database() {
        let settings = parse(
            r#"
            [app]
            level = "debug"

            [server]
            bind = "0.0.0.0"
            port = 8000
            database = "memory"
            "#,
        )
        .unwrap();
        assert_eq!(settings.app.level, "debug");
        assert_eq!(settings.server.database, Database::Memory);
    }

    #[test]
    fn server_section_is_required() {
        assert!(parse("[app]\nlevel = \"warn\"\n").is_err());
    }
}
