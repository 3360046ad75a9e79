//! Configuration registry — single source of truth for startup settings.
//!
//! Built once from [`RawSettings`], validated by [`ConfigRegistry::load`],
//! immutable afterwards. Collaborators (network stack, MQTT client, motor
//! driver) receive shared references and never own configuration.
//!
//! Validation order is fixed so that the first reported violation is the
//! same on every boot: network → broker → each blind in declaration order
//! (alias, topics, topic collisions) → pin resolution for each blind.

use std::collections::HashMap;

use static_assertions::assert_impl_all;
use tracing::{debug, info, warn};

use crate::blind::{BlindDeviceConfig, PendingBlind};
use crate::broker::BrokerConfig;
use crate::config::{ConfigError, LogLevel};
use crate::consts::MAX_BLINDS;
use crate::network::NetworkConfig;
use crate::pins::{GpioPin, PinMap, Platform};
use crate::settings::RawSettings;

/// Validated configuration owned by a loaded registry.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Loaded {
    network: NetworkConfig,
    broker: BrokerConfig,
    blinds: Vec<BlindDeviceConfig>,
}

#[derive(Debug, Clone)]
enum RegistryState {
    Unloaded(RawSettings),
    Loaded(Loaded),
}

/// Startup configuration registry.
///
/// Two states: `Unloaded` after [`new`](Self::new), `Loaded` after a
/// successful [`load`](Self::load). Accessors fail with
/// `ConfigError::NotInitialized` until loaded.
#[derive(Debug, Clone)]
pub struct ConfigRegistry {
    pins: PinMap,
    log_level: LogLevel,
    state: RegistryState,
}

assert_impl_all!(ConfigRegistry: Send, Sync);

impl ConfigRegistry {
    /// Unloaded registry for the platform named in `settings`
    /// (reference platform if none).
    pub fn new(settings: RawSettings) -> Self {
        let platform = settings.platform_or_default();
        Self::for_platform(settings, platform)
    }

    /// Unloaded registry targeting `platform`, overriding the settings.
    pub fn for_platform(settings: RawSettings, platform: Platform) -> Self {
        Self {
            pins: PinMap::for_platform(platform),
            log_level: settings.log.level,
            state: RegistryState::Unloaded(settings),
        }
    }

    /// Construct and load in one step.
    pub fn from_settings(settings: RawSettings) -> Result<Self, ConfigError> {
        let mut registry = Self::new(settings);
        registry.load()?;
        Ok(registry)
    }

    /// Validate the settings and enter the `Loaded` state.
    ///
    /// On failure the registry stays `Unloaded`. Loading an already loaded
    /// registry does nothing.
    ///
    /// # Errors
    ///
    /// The first violation found, in validation order:
    /// - `MissingRequiredField` for an empty SSID, broker host, client id,
    ///   blind namespace/topic/pin, an absent static address bundle, or no
    ///   blinds at all
    /// - `InvalidAddress` for a malformed static address
    /// - `ParseError` for more than [`MAX_BLINDS`] blinds
    /// - `DuplicateTopicNamespace` if two blinds share a topic
    /// - `UnknownPinAlias` if a blind's pin label is not on the board
    pub fn load(&mut self) -> Result<(), ConfigError> {
        let loaded = match &self.state {
            RegistryState::Loaded(_) => return Ok(()),
            RegistryState::Unloaded(raw) => validate(raw, &self.pins)?,
        };

        info!(
            "Configuration loaded: {} blind(s) on {}, {} addressing, broker {}:{}",
            loaded.blinds.len(),
            self.pins.platform(),
            if loaded.network.is_static() { "static" } else { "DHCP" },
            loaded.broker.host,
            loaded.broker.port,
        );
        self.state = RegistryState::Loaded(loaded);
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state, RegistryState::Loaded(_))
    }

    /// Target board.
    pub fn platform(&self) -> Platform {
        self.pins.platform()
    }

    /// Log level requested by the settings.
    pub fn log_level(&self) -> LogLevel {
        self.log_level
    }

    /// Settings for the Wi-Fi collaborator.
    pub fn network_config(&self) -> Result<&NetworkConfig, ConfigError> {
        Ok(&self.loaded()?.network)
    }

    /// Settings for the MQTT client.
    pub fn broker_config(&self) -> Result<&BrokerConfig, ConfigError> {
        Ok(&self.loaded()?.broker)
    }

    /// Blinds in declaration order.
    pub fn blind_devices(&self) -> Result<&[BlindDeviceConfig], ConfigError> {
        Ok(&self.loaded()?.blinds)
    }

    /// Translate a silkscreen pin label for the motor driver.
    pub fn resolve_pin(&self, alias: &str) -> Result<GpioPin, ConfigError> {
        self.loaded()?;
        self.pins
            .resolve(alias)
            .ok_or_else(|| ConfigError::UnknownPinAlias {
                alias: alias.trim().to_string(),
                platform: self.pins.platform(),
            })
    }

    fn loaded(&self) -> Result<&Loaded, ConfigError> {
        match &self.state {
            RegistryState::Loaded(loaded) => Ok(loaded),
            RegistryState::Unloaded(_) => Err(ConfigError::NotInitialized),
        }
    }
}

fn validate(raw: &RawSettings, pins: &PinMap) -> Result<Loaded, ConfigError> {
    let network = NetworkConfig::from_raw(&raw.wifi)?;
    let broker = BrokerConfig::from_raw(&raw.mqtt)?;

    if raw.blinds.is_empty() {
        return Err(ConfigError::MissingRequiredField("blind".to_string()));
    }
    if raw.blinds.len() > MAX_BLINDS {
        return Err(ConfigError::ParseError(format!(
            "too many blind devices: {} (maximum {MAX_BLINDS})",
            raw.blinds.len()
        )));
    }

    let mut pending: Vec<PendingBlind> = Vec::with_capacity(raw.blinds.len());
    // Topic → index into `pending` of the blind that claimed it.
    let mut claimed: HashMap<String, usize> = HashMap::new();

    for (index, raw_blind) in raw.blinds.iter().enumerate() {
        let blind = PendingBlind::assemble(index, raw_blind)?;

        for (_, topic) in blind.topics.iter() {
            if let Some(&owner) = claimed.get(topic) {
                let first = pending.get(owner).map_or(&blind.alias, |b| &b.alias);
                return Err(ConfigError::DuplicateTopicNamespace {
                    first: first.clone(),
                    second: blind.alias.clone(),
                    topic: topic.to_string(),
                });
            }
            claimed.insert(topic.to_string(), index);
        }

        pending.push(blind);
    }

    // GPIO line → alias of the first blind driving it.
    let mut lines: HashMap<GpioPin, String> = HashMap::new();
    let mut blinds = Vec::with_capacity(pending.len());
    for blind in pending {
        let index = blind.index();
        let resolved = blind.resolve(pins)?;
        debug!(
            "Blind #{index} '{}': pin {} -> {}, command topic {}",
            resolved.alias, resolved.pin_alias, resolved.gpio, resolved.topics.command
        );
        match lines.get(&resolved.gpio) {
            Some(owner) => warn!(
                "Blinds '{}' and '{}' share motor line {}",
                owner, resolved.alias, resolved.gpio
            ),
            None => {
                lines.insert(resolved.gpio, resolved.alias.clone());
            }
        }
        blinds.push(resolved);
    }

    Ok(Loaded {
        network,
        broker,
        blinds,
    })
}
