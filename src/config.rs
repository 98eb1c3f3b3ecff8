use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub classifier: ClassifierSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierSettings {
    /// Path to the versioned eligibility artifact.
    #[serde(default = "default_artifact_path")]
    pub artifact_path: String,
}

fn default_artifact_path() -> String {
    "artifacts/donor_eligibility_v1.json".to_string()
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatchingSettings {
    /// Server-side cap on the caller's max-distance constraint, if any.
    /// Absent means requests may search unbounded.
    pub max_distance_km: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

impl Settings {
    /// Load configuration from file and environment variables.
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with DONOR_)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g. DONOR_SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("DONOR")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings = override_database_url(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("DONOR")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

/// Let a plain DATABASE_URL env var win over the config file, the way
/// managed platforms inject it.
fn override_database_url(settings: Config) -> Result<Config, ConfigError> {
    let database_url = std::env::var("DATABASE_URL")
        .or_else(|_| std::env::var("DONOR_DATABASE__URL"))
        .ok();

    let mut builder = Config::builder().add_source(settings);
    if let Some(url) = database_url {
        builder = builder.set_override("database.url", url)?;
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_artifact_path_points_at_v1() {
        let settings = ClassifierSettings {
            artifact_path: default_artifact_path(),
        };
        assert_eq!(settings.artifact_path, "artifacts/donor_eligibility_v1.json");
    }

    #[test]
    fn default_logging_is_json_at_info() {
        let logging = LoggingSettings::default();
        assert_eq!(logging.level, "info");
        assert_eq!(logging.format, "json");
    }

    #[test]
    fn load_from_reads_logging_section() {
        let dir = std::env::temp_dir().join("donor-match-config-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("settings.toml");
        std::fs::write(
            &path,
            r#"
[server]
host = "127.0.0.1"
port = 8081

[database]
url = "postgres://localhost/donor_match_test"

[classifier]
artifact_path = "artifacts/donor_eligibility_v1.json"

[logging]
level = "debug"
format = "pretty"
"#,
        )
        .unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.logging.level, "debug");
        assert_eq!(settings.logging.format, "pretty");
    }

    #[test]
    fn matching_defaults_to_unbounded() {
        let matching = MatchingSettings::default();
        assert!(matching.max_distance_km.is_none());
    }
}
