//! Raw, unvalidated settings.
//!
//! [`RawSettings`] is what a settings source hands to the registry: a TOML
//! file (see [`ConfigLoader`](crate::config::ConfigLoader)), flashed
//! key/value pairs, or `#define` lines of a firmware header. Nothing here is
//! validated; octets stay signed so that out-of-range values reach the
//! registry and are reported as `InvalidAddress` rather than as parse
//! failures.
//!
//! # TOML Example
//!
//! ```toml
//! platform = "nodemcu"
//!
//! [wifi]
//! ssid = "home"
//! password = "secret"
//! static_ip = true
//! address = [192, 168, 1, 100]
//! gateway = [192, 168, 1, 1]
//! subnet = [255, 255, 255, 0]
//!
//! [mqtt]
//! broker = "192.168.1.10"
//! client_id = "slblind-office"
//!
//! [[blind]]
//! alias = "Office Blind"
//! namespace = "office"
//! pin = "D1"
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{ConfigError, LogLevel};
use crate::consts::DEFAULT_MQTT_PORT;
use crate::pins::Platform;

fn default_mqtt_port() -> u16 {
    DEFAULT_MQTT_PORT
}

/// Raw Wi-Fi and addressing settings (`[wifi]`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawWifi {
    #[serde(default)]
    pub ssid: String,
    #[serde(default)]
    pub password: String,
    /// `true` selects static addressing, `false` DHCP.
    #[serde(default)]
    pub static_ip: bool,
    #[serde(default)]
    pub address: Option<Vec<i64>>,
    #[serde(default)]
    pub gateway: Option<Vec<i64>>,
    #[serde(default)]
    pub subnet: Option<Vec<i64>>,
}

/// Raw broker settings (`[mqtt]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawMqtt {
    #[serde(default)]
    pub broker: String,
    #[serde(default = "default_mqtt_port")]
    pub port: u16,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl Default for RawMqtt {
    fn default() -> Self {
        Self {
            broker: String::new(),
            port: DEFAULT_MQTT_PORT,
            client_id: String::new(),
            username: String::new(),
            password: String::new(),
        }
    }
}

/// Raw per-blind settings (`[[blind]]`).
///
/// Topics are derived from `root` and `namespace` unless given explicitly;
/// an explicit topic overrides the derived one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawBlind {
    #[serde(default)]
    pub alias: Option<String>,
    /// First topic segment. Default: `slblind`.
    #[serde(default)]
    pub root: Option<String>,
    /// Per-installation segment keeping blinds apart on a shared broker.
    #[serde(default)]
    pub namespace: Option<String>,
    /// Silkscreen label of the motor pin.
    #[serde(default)]
    pub pin: String,
    #[serde(default)]
    pub availability_topic: Option<String>,
    #[serde(default)]
    pub tilt_state_topic: Option<String>,
    #[serde(default)]
    pub command_topic: Option<String>,
    #[serde(default)]
    pub state_topic: Option<String>,
    #[serde(default)]
    pub tilt_topic: Option<String>,
}

/// Logging section (`[log]`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogSettings {
    #[serde(default)]
    pub level: LogLevel,
}

/// Complete raw settings document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawSettings {
    /// Target board. Default: `nodemcu`.
    #[serde(default)]
    pub platform: Option<Platform>,
    #[serde(default)]
    pub log: LogSettings,
    #[serde(default)]
    pub wifi: RawWifi,
    #[serde(default)]
    pub mqtt: RawMqtt,
    #[serde(default, rename = "blind")]
    pub blinds: Vec<RawBlind>,
}

impl Default for RawSettings {
    /// Compiled-in defaults: one office blind on D1, DHCP addressing.
    fn default() -> Self {
        Self {
            platform: None,
            log: LogSettings::default(),
            wifi: RawWifi {
                ssid: "wifi-network".to_string(),
                password: "wifi-password".to_string(),
                static_ip: false,
                address: Some(vec![192, 168, 1, 100]),
                gateway: Some(vec![192, 168, 1, 1]),
                subnet: Some(vec![255, 255, 255, 0]),
            },
            mqtt: RawMqtt {
                broker: "192.168.1.10".to_string(),
                port: DEFAULT_MQTT_PORT,
                client_id: "slblind-office".to_string(),
                username: "mqtt_username".to_string(),
                password: "mqtt_password".to_string(),
            },
            blinds: vec![RawBlind {
                alias: Some("Office Blind".to_string()),
                namespace: Some("office".to_string()),
                pin: "D1".to_string(),
                ..RawBlind::default()
            }],
        }
    }
}

impl RawSettings {
    /// A document with every field absent.
    pub fn empty() -> Self {
        Self {
            platform: None,
            log: LogSettings::default(),
            wifi: RawWifi::default(),
            mqtt: RawMqtt::default(),
            blinds: Vec::new(),
        }
    }

    /// Build settings for a single blind from flashed key/value pairs.
    ///
    /// Keys follow the firmware header names (`WIFI_SSID`, `MQTT_BROKER`,
    /// `BLIND_PIN`, ...). Unknown keys and malformed numbers or booleans
    /// fail with `ConfigError::ParseError`.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut settings = Self::empty();
        let mut blind = RawBlind::default();

        for (key, value) in pairs {
            let key = key.as_ref().trim();
            let value = value.as_ref().trim();
            let text = || value.to_string();

            match key {
                "PLATFORM" => {
                    settings.platform =
                        Some(value.parse().map_err(ConfigError::ParseError)?);
                }
                "LOG_LEVEL" => {
                    settings.log.level = parse_log_level(value)?;
                }
                "WIFI_SSID" => settings.wifi.ssid = text(),
                "WIFI_PASSWORD" => settings.wifi.password = text(),
                "STATIC_IP" => settings.wifi.static_ip = parse_bool(key, value)?,
                "IP" => settings.wifi.address = parse_octets(key, value)?,
                "GATEWAY" => settings.wifi.gateway = parse_octets(key, value)?,
                "SUBNET" => settings.wifi.subnet = parse_octets(key, value)?,
                "MQTT_BROKER" => settings.mqtt.broker = text(),
                "MQTT_PORT" => {
                    settings.mqtt.port = value.parse().map_err(|_| {
                        ConfigError::ParseError(format!("{key}: invalid port {value:?}"))
                    })?;
                }
                "MQTT_CLIENTID" => settings.mqtt.client_id = text(),
                "MQTT_USERNAME" => settings.mqtt.username = text(),
                "MQTT_PASSWORD" => settings.mqtt.password = text(),
                "BLIND_ALIAS" => blind.alias = Some(text()),
                "BLIND_PIN" => blind.pin = text(),
                "BLIND_ROOT" => blind.root = Some(text()),
                "BLIND_NAMESPACE" => blind.namespace = Some(text()),
                "MQTT_BLIND_AVAILABILITY_TOPIC" => blind.availability_topic = Some(text()),
                "MQTT_BLIND_TILT_STATE_TOPIC" => blind.tilt_state_topic = Some(text()),
                "MQTT_BLIND_COMMAND_TOPIC" => blind.command_topic = Some(text()),
                "MQTT_BLIND_STATE_TOPIC" => blind.state_topic = Some(text()),
                // Older headers spell it TILIT.
                "MQTT_BLIND_TILT_TOPIC" | "MQTT_BLIND_TILIT_TOPIC" => {
                    blind.tilt_topic = Some(text())
                }
                _ => {
                    return Err(ConfigError::ParseError(format!(
                        "unknown setting key {key:?}"
                    )));
                }
            }
        }

        settings.blinds.push(blind);
        Ok(settings)
    }

    /// Parse `#define KEY value` lines of a firmware configuration header.
    ///
    /// String values lose their quotes, `//` and `/* */` comment lines are
    /// skipped. Board label definitions (`#define D1 5`) are ignored: the
    /// platform [`PinMap`](crate::pins::PinMap) is authoritative.
    pub fn from_defines(header: &str) -> Result<Self, ConfigError> {
        let mut pairs = Vec::new();
        let mut in_block_comment = false;

        for line in header.lines() {
            let mut line = line.trim();
            if in_block_comment {
                match line.find("*/") {
                    Some(end) => {
                        in_block_comment = false;
                        line = line[end + 2..].trim();
                    }
                    None => continue,
                }
            }
            if let Some(start) = line.find("/*") {
                if !line[start..].contains("*/") {
                    in_block_comment = true;
                }
                line = line[..start].trim();
            }
            let Some(rest) = line.strip_prefix("#define") else {
                continue;
            };
            let rest = strip_line_comment(rest).trim();
            let (key, value) = match rest.split_once(char::is_whitespace) {
                Some((key, value)) => (key, value.trim()),
                None => (rest, ""),
            };
            if key.is_empty() {
                continue;
            }
            if is_board_label(key) {
                debug!("Ignoring board label definition {key}");
                continue;
            }
            pairs.push((key.to_string(), unquote(value).to_string()));
        }

        Self::from_pairs(pairs)
    }

    /// Platform named in the settings, or the reference platform.
    pub fn platform_or_default(&self) -> Platform {
        self.platform.unwrap_or_default()
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(ConfigError::ParseError(format!(
            "{key}: expected true or false, got {value:?}"
        ))),
    }
}

/// `192,168,1,100` (dots accepted too). Range is checked later; an empty
/// value leaves the bundle unset.
fn parse_octets(key: &str, value: &str) -> Result<Option<Vec<i64>>, ConfigError> {
    if value.is_empty() {
        return Ok(None);
    }
    value
        .split([',', '.'])
        .map(|part| {
            part.trim().parse::<i64>().map_err(|_| {
                ConfigError::ParseError(format!("{key}: invalid octet {:?}", part.trim()))
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

fn parse_log_level(value: &str) -> Result<LogLevel, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "trace" => Ok(LogLevel::Trace),
        "debug" => Ok(LogLevel::Debug),
        "info" => Ok(LogLevel::Info),
        "warn" => Ok(LogLevel::Warn),
        "error" => Ok(LogLevel::Error),
        _ => Err(ConfigError::ParseError(format!(
            "LOG_LEVEL: unknown level {value:?}"
        ))),
    }
}

fn strip_line_comment(text: &str) -> &str {
    match text.find("//") {
        // Ignore `//` inside a quoted string.
        Some(pos) if text[..pos].matches('"').count() % 2 == 0 => &text[..pos],
        _ => text,
    }
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

fn is_board_label(key: &str) -> bool {
    key.len() > 1
        && key.starts_with('D')
        && key[1..].bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigLoader;

    const HEADER: &str = r#"
/*
 * Blind controller
 * User-configurable Parameters
*/

// Wifi Parameters

#define WIFI_SSID "home-net"
#define WIFI_PASSWORD "hunter2"

#define STATIC_IP false
#define IP 192,168,1,100
#define GATEWAY 192,168,1,1
#define SUBNET 255,255,255,0

#define MQTT_BROKER "192.168.1.10"
#define MQTT_CLIENTID "office_blind"
#define MQTT_USERNAME "mqtt_username"
#define MQTT_PASSWORD "mqtt_password"

#define BLIND_ALIAS "Office Blind"
#define MQTT_BLIND_AVAILABILITY_TOPIC "slblind/office/cover/availability"
#define MQTT_BLIND_TILT_STATE_TOPIC "slblind/office/cover/tilt-state"
#define MQTT_BLIND_COMMAND_TOPIC "slblind/office/cover/set"
#define MQTT_BLIND_STATE_TOPIC "slblind/office/cover/state"
#define MQTT_BLIND_TILIT_TOPIC "slblind/office/cover/tilt"

#define BLIND_PIN D1

// Mapping NodeMCU Ports to Arduino GPIO Pins
#define D0 16
#define D1 5
#define D6 12
"#;

    #[test]
    fn parse_header_defines() {
        let settings = RawSettings::from_defines(HEADER).unwrap();
        assert_eq!(settings.wifi.ssid, "home-net");
        assert_eq!(settings.wifi.password, "hunter2");
        assert!(!settings.wifi.static_ip);
        assert_eq!(settings.wifi.address, Some(vec![192, 168, 1, 100]));
        assert_eq!(settings.wifi.subnet, Some(vec![255, 255, 255, 0]));
        assert_eq!(settings.mqtt.broker, "192.168.1.10");
        assert_eq!(settings.mqtt.client_id, "office_blind");
        assert_eq!(settings.mqtt.port, DEFAULT_MQTT_PORT);
        assert_eq!(settings.blinds.len(), 1);

        let blind = &settings.blinds[0];
        assert_eq!(blind.alias.as_deref(), Some("Office Blind"));
        assert_eq!(blind.pin, "D1");
        assert_eq!(
            blind.tilt_topic.as_deref(),
            Some("slblind/office/cover/tilt")
        );
        assert_eq!(
            blind.command_topic.as_deref(),
            Some("slblind/office/cover/set")
        );
    }

    #[test]
    fn pairs_reject_unknown_key() {
        let result = RawSettings::from_pairs([("WIFI_SSID", "x"), ("WIFI_CHANNEL", "6")]);
        assert!(matches!(result, Err(ConfigError::ParseError(msg)) if msg.contains("WIFI_CHANNEL")));
    }

    #[test]
    fn pairs_keep_out_of_range_octets() {
        let settings =
            RawSettings::from_pairs([("STATIC_IP", "true"), ("IP", "192,168,1,256")]).unwrap();
        assert!(settings.wifi.static_ip);
        assert_eq!(settings.wifi.address, Some(vec![192, 168, 1, 256]));

        let settings = RawSettings::from_pairs([("GATEWAY", "10.0.0.-1")]).unwrap();
        assert_eq!(settings.wifi.gateway, Some(vec![10, 0, 0, -1]));
    }

    #[test]
    fn empty_bundle_is_unset() {
        let settings = RawSettings::from_pairs([
            ("STATIC_IP", "false"),
            ("IP", ""),
            ("GATEWAY", " "),
            ("SUBNET", "255,255,255,0"),
        ])
        .unwrap();
        assert_eq!(settings.wifi.address, None);
        assert_eq!(settings.wifi.gateway, None);
        assert_eq!(settings.wifi.subnet, Some(vec![255, 255, 255, 0]));

        let settings = RawSettings::from_defines("#define STATIC_IP false\n#define IP\n").unwrap();
        assert!(!settings.wifi.static_ip);
        assert_eq!(settings.wifi.address, None);
    }

    #[test]
    fn pairs_reject_malformed_values() {
        assert!(matches!(
            RawSettings::from_pairs([("STATIC_IP", "maybe")]),
            Err(ConfigError::ParseError(_))
        ));
        assert!(matches!(
            RawSettings::from_pairs([("IP", "192,168,one,1")]),
            Err(ConfigError::ParseError(_))
        ));
        assert!(matches!(
            RawSettings::from_pairs([("MQTT_PORT", "70000")]),
            Err(ConfigError::ParseError(_))
        ));
        assert!(matches!(
            RawSettings::from_pairs([("PLATFORM", "esp32")]),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn toml_defaults_are_filled() {
        let settings = RawSettings::from_toml(
            r#"
[wifi]
ssid = "home"

[mqtt]
broker = "broker.local"
client_id = "blind-1"

[[blind]]
namespace = "office"
pin = "D1"
"#,
        )
        .unwrap();
        assert_eq!(settings.platform, None);
        assert_eq!(settings.platform_or_default(), Platform::NodeMcu);
        assert_eq!(settings.log.level, LogLevel::Info);
        assert_eq!(settings.mqtt.port, DEFAULT_MQTT_PORT);
        assert!(!settings.wifi.static_ip);
        assert_eq!(settings.blinds[0].root, None);
    }

    #[test]
    fn toml_rejects_unknown_fields() {
        let result = RawSettings::from_toml(
            r#"
[wifi]
ssid = "home"
channel = 6
"#,
        );
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn toml_keeps_negative_octets() {
        let settings = RawSettings::from_toml(
            r#"
[wifi]
static_ip = true
address = [192, 168, 1, -1]
"#,
        )
        .unwrap();
        assert_eq!(settings.wifi.address, Some(vec![192, 168, 1, -1]));
    }

    #[test]
    fn compiled_in_defaults_describe_one_blind() {
        let settings = RawSettings::default();
        assert_eq!(settings.blinds.len(), 1);
        assert_eq!(settings.blinds[0].pin, "D1");
        assert_eq!(settings.blinds[0].namespace.as_deref(), Some("office"));
    }

    #[test]
    fn board_labels() {
        assert!(is_board_label("D1"));
        assert!(is_board_label("D10"));
        assert!(!is_board_label("D"));
        assert!(!is_board_label("DEBUG"));
    }
}
