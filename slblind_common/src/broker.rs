//! Validated MQTT broker settings.

use serde::Serialize;

use crate::config::{redact, ConfigError};
use crate::settings::RawMqtt;

/// Broker connection parameters for the MQTT client.
///
/// `client_id` must be unique among all controllers sharing the broker;
/// that cannot be checked from one process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrokerConfig {
    pub host: String,
    pub port: u16,
    pub client_id: String,
    pub username: String,
    #[serde(serialize_with = "redact")]
    pub password: String,
}

impl BrokerConfig {
    /// Validate raw `[mqtt]` settings. Host is checked before client id.
    pub fn from_raw(raw: &RawMqtt) -> Result<Self, ConfigError> {
        if raw.broker.trim().is_empty() {
            return Err(ConfigError::MissingRequiredField("mqtt.broker".to_string()));
        }
        if raw.client_id.trim().is_empty() {
            return Err(ConfigError::MissingRequiredField(
                "mqtt.client_id".to_string(),
            ));
        }

        Ok(Self {
            host: raw.broker.trim().to_string(),
            port: raw.port,
            client_id: raw.client_id.clone(),
            username: raw.username.clone(),
            password: raw.password.clone(),
        })
    }

    /// Whether the client should authenticate.
    pub fn has_credentials(&self) -> bool {
        !self.username.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw() -> RawMqtt {
        RawMqtt {
            broker: "broker.local".to_string(),
            client_id: "blind-1".to_string(),
            ..RawMqtt::default()
        }
    }

    #[test]
    fn minimal_broker() {
        let broker = BrokerConfig::from_raw(&raw()).unwrap();
        assert_eq!(broker.host, "broker.local");
        assert_eq!(broker.port, 1883);
        assert!(!broker.has_credentials());
    }

    #[test]
    fn host_checked_first() {
        let raw = RawMqtt::default();
        assert_eq!(
            BrokerConfig::from_raw(&raw).unwrap_err(),
            ConfigError::MissingRequiredField("mqtt.broker".to_string())
        );
    }

    #[test]
    fn empty_client_id() {
        let mut raw = raw();
        raw.client_id.clear();
        assert_eq!(
            BrokerConfig::from_raw(&raw).unwrap_err(),
            ConfigError::MissingRequiredField("mqtt.client_id".to_string())
        );
    }

    #[test]
    fn password_never_serialized() {
        let mut raw = raw();
        raw.username = "user".to_string();
        raw.password = "hunter2".to_string();
        let broker = BrokerConfig::from_raw(&raw).unwrap();
        let text = toml::to_string(&broker).unwrap();
        assert!(!text.contains("hunter2"));
        assert!(text.contains("***"));
    }
}
