//! SLBlind Common Library
//!
//! Startup configuration for the SLBlind motorized cover controller: Wi-Fi
//! and addressing, MQTT broker, per-blind topics and motor pins, validated
//! against the target board's pin map before any collaborator starts.
//!
//! # Module Structure
//!
//! - [`config`] - Error type, log level and TOML loading trait
//! - [`settings`] - Raw settings sources (TOML, key/value pairs, `#define` headers)
//! - [`pins`] - Board platforms and pin maps
//! - [`network`], [`broker`], [`blind`] - Validated configuration types
//! - [`registry`] - The [`ConfigRegistry`](registry::ConfigRegistry)
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use slblind_common::prelude::*;
//!
//! let registry = ConfigRegistry::from_settings(RawSettings::default())?;
//! for blind in registry.blind_devices()? {
//!     println!("{} on {}", blind.alias, blind.gpio());
//! }
//! assert_eq!(registry.resolve_pin("D4")?, 2);
//! # Ok::<(), ConfigError>(())
//! ```

pub mod blind;
pub mod broker;
pub mod config;
pub mod consts;
pub mod network;
pub mod pins;
pub mod prelude;
pub mod registry;
pub mod settings;
