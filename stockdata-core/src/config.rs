//! Application configuration — TOML file with per-key defaults.
//!
//! Every key is optional. The password is never read from or written to the
//! file; front-ends take it from a prompt, a flag, or the environment.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Exchange;
use crate::export::{ExportFormat, TableEncoder, DEFAULT_FILE_PREFIX, DEFAULT_SHEET_NAME};

const APP_DIR: &str = "stockdata";
const CONFIG_FILE: &str = "config.toml";

/// Characters Excel refuses in a worksheet name.
const SHEET_NAME_FORBIDDEN: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];
const SHEET_NAME_MAX: usize = 31;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("cannot serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Pre-filled username. `None` leaves the field blank.
    pub username: Option<String>,
    pub exchange: Exchange,
    pub output_dir: PathBuf,
    pub file_prefix: String,
    pub sheet_name: String,
    pub formats: Vec<ExportFormat>,
    /// Network timeout for sign-in and each history request.
    pub timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            username: None,
            exchange: Exchange::Nse,
            output_dir: PathBuf::from("."),
            file_prefix: DEFAULT_FILE_PREFIX.into(),
            sheet_name: DEFAULT_SHEET_NAME.into(),
            formats: vec![ExportFormat::Xlsx, ExportFormat::Csv],
            timeout_secs: 30,
        }
    }
}

impl AppConfig {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// `<config dir>/stockdata/config.toml`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load an explicit file, or the default file if it exists, or defaults.
    ///
    /// An explicit path that does not exist is an error; a missing default
    /// file is not.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match Self::default_path() {
            Some(path) if path.is_file() => {
                tracing::debug!(path = %path.display(), "loading config");
                Self::from_file(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.file_prefix.trim().is_empty() {
            return Err(ConfigError::Invalid("file_prefix must not be empty".into()));
        }
        if self.formats.is_empty() {
            return Err(ConfigError::Invalid(
                "formats must name at least one of xlsx, csv".into(),
            ));
        }
        validate_sheet_name(&self.sheet_name)?;
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeout_secs must be positive".into()));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// One encoder per configured format, in configured order.
    pub fn encoders(&self) -> Vec<Box<dyn TableEncoder>> {
        self.formats
            .iter()
            .map(|f| f.encoder(&self.sheet_name))
            .collect()
    }
}

fn validate_sheet_name(name: &str) -> Result<(), ConfigError> {
    let len = name.chars().count();
    if len == 0 || len > SHEET_NAME_MAX {
        return Err(ConfigError::Invalid(format!(
            "sheet_name must be 1-{SHEET_NAME_MAX} characters, got {len}"
        )));
    }
    if let Some(c) = name.chars().find(|c| SHEET_NAME_FORBIDDEN.contains(c)) {
        return Err(ConfigError::Invalid(format!(
            "sheet_name contains forbidden character '{c}'"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.formats, vec![ExportFormat::Xlsx, ExportFormat::Csv]);
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn partial_file_overrides_keys() {
        let config = AppConfig::from_toml(
            r#"
            username = "trader"
            exchange = "BSE"
            formats = ["csv"]
            output_dir = "exports"
            "#,
        )
        .unwrap();
        assert_eq!(config.username.as_deref(), Some("trader"));
        assert_eq!(config.exchange, Exchange::Bse);
        assert_eq!(config.formats, vec![ExportFormat::Csv]);
        assert_eq!(config.output_dir, PathBuf::from("exports"));
        assert_eq!(config.file_prefix, "StockData");
    }

    #[test]
    fn rejects_bad_values() {
        assert!(AppConfig::from_toml("formats = []").is_err());
        assert!(AppConfig::from_toml("file_prefix = \"  \"").is_err());
        assert!(AppConfig::from_toml("sheet_name = \"a/b\"").is_err());
        assert!(AppConfig::from_toml("sheet_name = \"\"").is_err());
        assert!(AppConfig::from_toml(&format!("sheet_name = \"{}\"", "x".repeat(32))).is_err());
        assert!(AppConfig::from_toml("timeout_secs = 0").is_err());
        assert!(AppConfig::from_toml("exchange = \"NYSE\"").is_err());
    }

    #[test]
    fn toml_roundtrip() {
        let mut config = AppConfig::default();
        config.username = Some("trader".into());
        let text = config.to_toml().unwrap();
        assert_eq!(AppConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppConfig::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "file_prefix = \"Bars\"\ntimeout_secs = 5\n").unwrap();
        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.file_prefix, "Bars");
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn encoders_follow_formats() {
        let config = AppConfig {
            formats: vec![ExportFormat::Csv, ExportFormat::Xlsx],
            ..AppConfig::default()
        };
        let formats: Vec<ExportFormat> = config.encoders().iter().map(|e| e.format()).collect();
        assert_eq!(formats, vec![ExportFormat::Csv, ExportFormat::Xlsx]);
    }
}
