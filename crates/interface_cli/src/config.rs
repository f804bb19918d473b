//! CLI configuration

use std::path::PathBuf;

use serde::Deserialize;

use nhia_export::FacilityInfo;

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Application configuration
///
/// Read from an optional `nhis.toml` in the working directory, then from
/// `NHIS_*` environment variables, e.g. `NHIS_FACILITY_CODE`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Facility code assigned by the NHIA
    pub facility_code: String,
    pub facility_name: String,
    pub log_level: String,
    pub log_format: LogFormat,
    /// Directory export files are written to
    pub output_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            facility_code: String::new(),
            facility_name: String::new(),
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            output_dir: PathBuf::from("."),
        }
    }
}

impl AppConfig {
    /// Loads configuration from `nhis.toml` and the environment
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("nhis")
    }

    /// Loads configuration from the named file (extension optional) and the
    /// environment, the environment taking precedence
    pub fn load_from(file: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::with_name(file).required(false))
            .add_source(config::Environment::with_prefix("NHIS"))
            .build()?
            .try_deserialize()
    }

    pub fn facility(&self) -> FacilityInfo {
        FacilityInfo::new(&self.facility_code, &self.facility_name)
    }
}
