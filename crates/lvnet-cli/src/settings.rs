//! Layered configuration for the `lvnet` binary.
//!
//! Sources, later ones overriding earlier ones:
//! 1. built-in defaults
//! 2. `./lvnet.toml` (optional)
//! 3. the file passed with `--config`
//! 4. `LVNET_*` environment variables, with `__` between key segments
//!    (`LVNET_STUDY__TRANSFORMER_KVA=112.5`, `LVNET_LOGGING__LEVEL=debug`)
//!
//! Command-line flags take precedence over all of these.

use config::{Config, ConfigError, Environment, File};
use lvnet_core::DemandClass;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub study: StudyConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StudyConfig {
    pub transformer_kva: f64,
    pub demand_class: DemandClass,
    /// Catalog file used instead of the built-in tables
    #[serde(default)]
    pub catalog: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            study: StudyConfig {
                transformer_kva: 75.0,
                demand_class: DemandClass::B,
                catalog: None,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}

impl Settings {
    /// Load from the default locations plus an optional explicit file.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(
            explicit,
            Environment::with_prefix("LVNET")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
    }

    fn load_with_env(explicit: Option<&Path>, env: Environment) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("study.transformer_kva", 75.0)?
            .set_default("study.demand_class", "B")?
            .set_default("logging.level", "info")?
            .add_source(File::with_name("lvnet").required(false));

        if let Some(path) = explicit {
            builder = builder.add_source(File::from(path));
        }

        builder
            .add_source(env)
            .build()?
            .try_deserialize::<Settings>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn no_env() -> Environment {
        Environment::with_prefix("LVNET")
            .prefix_separator("_")
            .separator("__")
            .source(Some(config::Map::new()))
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::load_with_env(None, no_env()).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_explicit_file_overrides_defaults() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(
            file,
            "[study]\ntransformer_kva = 112.5\ndemand_class = \"d\"\ncatalog = \"cat.toml\"\n\n[logging]\nlevel = \"debug\""
        )
        .unwrap();

        let settings = Settings::load_with_env(Some(file.path()), no_env()).unwrap();
        assert_eq!(settings.study.transformer_kva, 112.5);
        assert_eq!(settings.study.demand_class, DemandClass::D);
        assert_eq!(settings.study.catalog, Some(PathBuf::from("cat.toml")));
        assert_eq!(settings.logging.level, "debug");
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(file, "[logging]\nlevel = \"warn\"").unwrap();

        let settings = Settings::load_with_env(Some(file.path()), no_env()).unwrap();
        assert_eq!(settings.study.transformer_kva, 75.0);
        assert_eq!(settings.logging.level, "warn");
    }

    #[test]
    fn test_environment_overrides_file() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(file, "[study]\ntransformer_kva = 112.5").unwrap();

        let mut vars = config::Map::new();
        vars.insert("LVNET_STUDY__TRANSFORMER_KVA".to_string(), "150".to_string());
        vars.insert("LVNET_STUDY__DEMAND_CLASS".to_string(), "A".to_string());
        let env = Environment::with_prefix("LVNET")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .source(Some(vars));

        let settings = Settings::load_with_env(Some(file.path()), env).unwrap();
        assert_eq!(settings.study.transformer_kva, 150.0);
        assert_eq!(settings.study.demand_class, DemandClass::A);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let result = Settings::load_with_env(Some(Path::new("/nonexistent/lvnet.toml")), no_env());
        assert!(result.is_err());
    }
}
