//! Prelude module for common re-exports.
//!
//! ```rust
//! use slblind_common::prelude::*;
//! ```

// ─── Logging ────────────────────────────────────────────────────────
pub use crate::config::LogLevel;

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader};
pub use crate::registry::ConfigRegistry;
pub use crate::settings::{RawBlind, RawMqtt, RawSettings, RawWifi};

// ─── Validated types ────────────────────────────────────────────────
pub use crate::blind::{BlindDeviceConfig, CoverTopics, TopicKind};
pub use crate::broker::BrokerConfig;
pub use crate::network::{Addressing, NetworkConfig, StaticIp};

// ─── Pins ───────────────────────────────────────────────────────────
pub use crate::pins::{GpioPin, PinMap, Platform};
