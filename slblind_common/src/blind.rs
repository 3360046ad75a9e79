//! Per-blind settings: display alias, MQTT cover topics and motor pin.
//!
//! Topics follow `<root>/<namespace>/cover/<suffix>`. The namespace segment
//! is what keeps several blinds on one broker apart; the suffixes are fixed
//! for compatibility with existing broker deployments.

use core::fmt;
use serde::Serialize;

use crate::config::ConfigError;
use crate::consts::{COVER_SEGMENT, DEFAULT_TOPIC_ROOT};
use crate::pins::{GpioPin, PinMap};
use crate::settings::RawBlind;

// ─── TopicKind ──────────────────────────────────────────────────────

/// The five cover topics of one blind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TopicKind {
    Availability,
    TiltState,
    Command,
    State,
    Tilt,
}

impl TopicKind {
    /// All kinds, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Availability,
        Self::TiltState,
        Self::Command,
        Self::State,
        Self::Tilt,
    ];

    /// Last topic segment.
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Availability => "availability",
            Self::TiltState => "tilt-state",
            Self::Command => "set",
            Self::State => "state",
            Self::Tilt => "tilt",
        }
    }

    /// Name of the explicit override key in a `[[blind]]` table.
    pub fn field_name(&self) -> &'static str {
        match self {
            Self::Availability => "availability_topic",
            Self::TiltState => "tilt_state_topic",
            Self::Command => "command_topic",
            Self::State => "state_topic",
            Self::Tilt => "tilt_topic",
        }
    }
}

impl fmt::Display for TopicKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

// ─── CoverTopics ────────────────────────────────────────────────────

/// Topic strings a blind publishes and subscribes on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CoverTopics {
    pub availability: String,
    pub tilt_state: String,
    pub command: String,
    pub state: String,
    pub tilt: String,
}

impl CoverTopics {
    /// Derive all five topics from a root and namespace segment.
    pub fn derive(root: &str, namespace: &str) -> Self {
        let topic = |kind: TopicKind| format!("{root}/{namespace}/{COVER_SEGMENT}/{}", kind.suffix());
        Self {
            availability: topic(TopicKind::Availability),
            tilt_state: topic(TopicKind::TiltState),
            command: topic(TopicKind::Command),
            state: topic(TopicKind::State),
            tilt: topic(TopicKind::Tilt),
        }
    }

    pub fn get(&self, kind: TopicKind) -> &str {
        match kind {
            TopicKind::Availability => &self.availability,
            TopicKind::TiltState => &self.tilt_state,
            TopicKind::Command => &self.command,
            TopicKind::State => &self.state,
            TopicKind::Tilt => &self.tilt,
        }
    }

    /// `(kind, topic)` pairs, in [`TopicKind::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (TopicKind, &str)> + '_ {
        TopicKind::ALL.into_iter().map(|kind| (kind, self.get(kind)))
    }
}

// ─── BlindDeviceConfig ──────────────────────────────────────────────

/// One validated blind: topics for the MQTT client, pin for the motor driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlindDeviceConfig {
    pub alias: String,
    pub topics: CoverTopics,
    /// Silkscreen label as configured.
    pub pin_alias: String,
    /// Line the label resolves to on the target platform.
    pub gpio: GpioPin,
}

impl BlindDeviceConfig {
    pub fn gpio(&self) -> GpioPin {
        self.gpio
    }
}

/// A blind whose topics are assembled but whose pin is not yet resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PendingBlind {
    pub alias: String,
    pub topics: CoverTopics,
    pub pin_alias: String,
    index: usize,
}

impl PendingBlind {
    /// Assemble alias and topics of the `index`-th `[[blind]]` entry.
    ///
    /// An empty pin label fails here; whether the label exists on the
    /// board is checked by [`resolve`](Self::resolve).
    pub fn assemble(index: usize, raw: &RawBlind) -> Result<Self, ConfigError> {
        let field = |name: &str| format!("blind[{index}].{name}");
        let non_empty = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let namespace = non_empty(&raw.namespace);
        let root = match &raw.root {
            Some(root) if root.trim().is_empty() => {
                return Err(ConfigError::MissingRequiredField(field("root")));
            }
            Some(root) => root.trim().to_string(),
            None => DEFAULT_TOPIC_ROOT.to_string(),
        };
        let derived = namespace
            .as_deref()
            .map(|ns| CoverTopics::derive(&root, ns));

        let topic = |kind: TopicKind| -> Result<String, ConfigError> {
            if let Some(value) = explicit_topic(raw, kind) {
                let value = value.trim();
                if value.is_empty() {
                    return Err(ConfigError::MissingRequiredField(field(kind.field_name())));
                }
                return Ok(value.to_string());
            }
            derived
                .as_ref()
                .map(|topics| topics.get(kind).to_string())
                .ok_or_else(|| ConfigError::MissingRequiredField(field("namespace")))
        };

        let topics = CoverTopics {
            availability: topic(TopicKind::Availability)?,
            tilt_state: topic(TopicKind::TiltState)?,
            command: topic(TopicKind::Command)?,
            state: topic(TopicKind::State)?,
            tilt: topic(TopicKind::Tilt)?,
        };

        for (kind, value) in topics.iter() {
            check_topic(&field(kind.field_name()), value)?;
        }

        let pin_alias = raw.pin.trim().to_string();
        if pin_alias.is_empty() {
            return Err(ConfigError::MissingRequiredField(field("pin")));
        }

        let alias = non_empty(&raw.alias)
            .or(namespace)
            .unwrap_or_else(|| format!("blind-{}", index + 1));

        Ok(Self {
            alias,
            topics,
            pin_alias,
            index,
        })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Bind the pin label to a platform line.
    pub fn resolve(self, pins: &PinMap) -> Result<BlindDeviceConfig, ConfigError> {
        let gpio = pins
            .resolve(&self.pin_alias)
            .ok_or_else(|| ConfigError::UnknownPinAlias {
                alias: self.pin_alias.clone(),
                platform: pins.platform(),
            })?;
        Ok(BlindDeviceConfig {
            alias: self.alias,
            topics: self.topics,
            pin_alias: self.pin_alias,
            gpio,
        })
    }
}

/// Reject topics a broker would treat as filters or that have empty levels.
fn check_topic(field: &str, topic: &str) -> Result<(), ConfigError> {
    if topic.contains(['+', '#']) {
        return Err(ConfigError::ParseError(format!(
            "{field}: wildcard in topic {topic:?}"
        )));
    }
    if topic.split('/').any(str::is_empty) {
        return Err(ConfigError::ParseError(format!(
            "{field}: empty level in topic {topic:?}"
        )));
    }
    Ok(())
}

fn explicit_topic(raw: &RawBlind, kind: TopicKind) -> Option<&str> {
    match kind {
        TopicKind::Availability => raw.availability_topic.as_deref(),
        TopicKind::TiltState => raw.tilt_state_topic.as_deref(),
        TopicKind::Command => raw.command_topic.as_deref(),
        TopicKind::State => raw.state_topic.as_deref(),
        TopicKind::Tilt => raw.tilt_topic.as_deref(),
    }
}
