use std::path::PathBuf;

use thiserror::Error;

/// Failure to read or persist `config.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The `.wavecue` folder could not be created.
    #[error("Cannot create settings folder {path}: {source}")]
    CreateDir { path: PathBuf, source: std::io::Error },
    #[error("Cannot read settings from {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    /// Covers the temp file as well as the final rename.
    #[error("Cannot save settings to {path}: {source}")]
    Write { path: PathBuf, source: std::io::Error },
    /// The file exists but is not valid settings TOML.
    #[error("Malformed settings in {path}: {source}")]
    ParseToml {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Cannot encode settings for {path}: {source}")]
    SerializeToml {
        path: PathBuf,
        source: toml::ser::Error,
    },
    /// No OS config directory and no `WAVECUE_CONFIG_HOME` override.
    #[error("Cannot locate a config directory for settings")]
    NoConfigDir,
}
