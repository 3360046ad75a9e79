//! Validated Wi-Fi and IP addressing settings handed to the network stack.

use serde::Serialize;
use std::net::Ipv4Addr;
use tracing::warn;

use crate::config::{redact, ConfigError};
use crate::settings::RawWifi;

/// Fixed IPv4 parameters for static addressing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StaticIp {
    pub address: Ipv4Addr,
    pub gateway: Ipv4Addr,
    pub subnet: Ipv4Addr,
}

/// How the station obtains its address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum Addressing {
    Dhcp,
    Static(StaticIp),
}

/// Wi-Fi station configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkConfig {
    pub ssid: String,
    #[serde(serialize_with = "redact")]
    pub password: String,
    pub addressing: Addressing,
}

impl NetworkConfig {
    /// Validate raw `[wifi]` settings.
    ///
    /// # Errors
    ///
    /// - `MissingRequiredField` if the SSID is empty, or static addressing is
    ///   selected and one of the address bundles is absent
    /// - `InvalidAddress` if static addressing is selected and a bundle does
    ///   not hold exactly four octets in `0..=255`
    pub fn from_raw(raw: &RawWifi) -> Result<Self, ConfigError> {
        if raw.ssid.trim().is_empty() {
            return Err(ConfigError::MissingRequiredField("wifi.ssid".to_string()));
        }

        let addressing = if raw.static_ip {
            Addressing::Static(StaticIp {
                address: parse_bundle("wifi.address", raw.address.as_deref())?,
                gateway: parse_bundle("wifi.gateway", raw.gateway.as_deref())?,
                subnet: parse_bundle("wifi.subnet", raw.subnet.as_deref())?,
            })
        } else {
            if raw.address.is_some() || raw.gateway.is_some() || raw.subnet.is_some() {
                warn!("Static address settings present but static_ip = false; using DHCP");
            }
            Addressing::Dhcp
        };

        Ok(Self {
            ssid: raw.ssid.clone(),
            password: raw.password.clone(),
            addressing,
        })
    }

    pub fn is_static(&self) -> bool {
        matches!(self.addressing, Addressing::Static(_))
    }

    /// Static parameters, `None` under DHCP.
    pub fn static_ip(&self) -> Option<&StaticIp> {
        match &self.addressing {
            Addressing::Static(ip) => Some(ip),
            Addressing::Dhcp => None,
        }
    }
}

fn parse_bundle(field: &str, octets: Option<&[i64]>) -> Result<Ipv4Addr, ConfigError> {
    let octets =
        octets.ok_or_else(|| ConfigError::MissingRequiredField(field.to_string()))?;

    let invalid = || ConfigError::InvalidAddress {
        field: field.to_string(),
        value: octets
            .iter()
            .map(|o| o.to_string())
            .collect::<Vec<_>>()
            .join(","),
    };

    let [a, b, c, d] = <[i64; 4]>::try_from(octets).map_err(|_| invalid())?;
    let mut bytes = [0u8; 4];
    for (byte, octet) in bytes.iter_mut().zip([a, b, c, d]) {
        *byte = u8::try_from(octet).map_err(|_| invalid())?;
    }
    Ok(Ipv4Addr::from(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn static_wifi() -> RawWifi {
        RawWifi {
            ssid: "home".to_string(),
            password: "secret".to_string(),
            static_ip: true,
            address: Some(vec![192, 168, 1, 100]),
            gateway: Some(vec![192, 168, 1, 1]),
            subnet: Some(vec![255, 255, 255, 0]),
        }
    }

    #[test]
    fn static_addressing_parses() {
        let net = NetworkConfig::from_raw(&static_wifi()).unwrap();
        assert!(net.is_static());
        let ip = net.static_ip().unwrap();
        assert_eq!(ip.address, Ipv4Addr::new(192, 168, 1, 100));
        assert_eq!(ip.gateway, Ipv4Addr::new(192, 168, 1, 1));
        assert_eq!(ip.subnet, Ipv4Addr::new(255, 255, 255, 0));
    }

    #[test]
    fn octet_out_of_range() {
        for bad in [256, -1] {
            let mut raw = static_wifi();
            raw.gateway = Some(vec![192, 168, 1, bad]);
            let err = NetworkConfig::from_raw(&raw).unwrap_err();
            assert!(
                matches!(&err, ConfigError::InvalidAddress { field, .. } if field == "wifi.gateway"),
                "{err:?}"
            );
        }
    }

    #[test]
    fn wrong_octet_count() {
        let mut raw = static_wifi();
        raw.subnet = Some(vec![255, 255, 255]);
        assert!(matches!(
            NetworkConfig::from_raw(&raw),
            Err(ConfigError::InvalidAddress { .. })
        ));
    }

    #[test]
    fn missing_bundle_under_static() {
        let mut raw = static_wifi();
        raw.address = None;
        assert_eq!(
            NetworkConfig::from_raw(&raw).unwrap_err(),
            ConfigError::MissingRequiredField("wifi.address".to_string())
        );
    }

    #[test]
    fn dhcp_ignores_bad_bundles() {
        let mut raw = static_wifi();
        raw.static_ip = false;
        raw.address = Some(vec![300, 1, 1, 1]);
        let net = NetworkConfig::from_raw(&raw).unwrap();
        assert_eq!(net.addressing, Addressing::Dhcp);
        assert!(net.static_ip().is_none());
    }

    #[test]
    fn empty_ssid_checked_before_addresses() {
        let mut raw = static_wifi();
        raw.ssid = "  ".to_string();
        raw.address = Some(vec![256, 0, 0, 0]);
        assert_eq!(
            NetworkConfig::from_raw(&raw).unwrap_err(),
            ConfigError::MissingRequiredField("wifi.ssid".to_string())
        );
    }
}
