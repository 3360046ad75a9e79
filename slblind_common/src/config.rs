//! Configuration errors, log level and the TOML loading trait.
//!
//! Every startup failure of the controller is a [`ConfigError`]. They are all
//! fatal: the firmware refuses to bring up networking or drive a motor with
//! a partial configuration.
//!
//! # Usage
//!
//! ```rust,no_run
//! use slblind_common::config::{ConfigError, ConfigLoader};
//! use slblind_common::settings::RawSettings;
//! use std::path::Path;
//!
//! fn main() -> Result<(), ConfigError> {
//!     let raw = RawSettings::load(Path::new("slblind.toml"))?;
//!     println!("{} blind(s) declared", raw.blinds.len());
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize, Serializer};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::pins::Platform;

/// Error type for configuration loading and validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Configuration file not found at specified path.
    #[error("Configuration file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Settings source could not be read or parsed.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Static addressing selected with a malformed or out-of-range address.
    #[error("Invalid address in '{field}': {value}")]
    InvalidAddress { field: String, value: String },

    /// A blind references a pin alias the target board does not have.
    #[error("Unknown pin alias '{alias}' for platform {platform}")]
    UnknownPinAlias { alias: String, platform: Platform },

    /// Two blinds would publish or subscribe on the same MQTT topic.
    ///
    /// A blind whose own topics repeat one another is reported with
    /// `first == second`.
    #[error("Blinds '{first}' and '{second}' collide on MQTT topic '{topic}'")]
    DuplicateTopicNamespace {
        first: String,
        second: String,
        topic: String,
    },

    /// A mandatory field is absent or empty.
    #[error("Missing required field: {0}")]
    MissingRequiredField(String),

    /// Accessor called before a successful `load()`.
    #[error("Configuration registry has not been loaded")]
    NotInitialized,
}

/// Log level for application logging.
///
/// Uses lowercase serde values for TOML compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Most verbose, detailed tracing information.
    Trace,
    /// Debug information useful during installation.
    Debug,
    /// General information about controller operation.
    #[default]
    Info,
    /// Warning messages for potentially problematic situations.
    Warn,
    /// Error messages for serious problems.
    Error,
}

/// Read a settings source into memory.
///
/// A missing file is `ConfigError::FileNotFound`, any other I/O failure
/// `ConfigError::ParseError`.
pub fn read_source(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ConfigError::FileNotFound(path.to_path_buf())
        } else {
            ConfigError::ParseError(e.to_string())
        }
    })
}

/// Trait for loading configuration from TOML files.
///
/// Blanket-implemented for every `serde::de::DeserializeOwned` type.
///
/// # Contract
///
/// - Returns `ConfigError::FileNotFound` if the file does not exist
/// - Returns `ConfigError::ParseError` if the file is unreadable or the TOML is invalid
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    /// Load configuration from a TOML file.
    fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::from_toml(&read_source(path)?)
    }

    /// Parse configuration from an in-memory TOML document.
    fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}

/// Serializer for credential fields: never emit the secret itself.
pub(crate) fn redact<S: Serializer>(value: &str, serializer: S) -> Result<S::Ok, S::Error> {
    if value.is_empty() {
        serializer.serialize_str("")
    } else {
        serializer.serialize_str("***")
    }
}
