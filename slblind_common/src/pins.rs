//! Board pin maps.
//!
//! A blind's motor pin is configured by its silkscreen label (`"D1"`), not
//! by GPIO number. [`PinMap`] translates labels into ESP8266 GPIO lines for
//! the board variant the firmware targets. Each table is fixed at compile
//! time; labels outside it do not resolve.

use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};
use static_assertions::const_assert;

// ─── Platform ───────────────────────────────────────────────────────

/// Supported ESP8266 board variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    /// NodeMCU v1.0 (ESP-12E). Reference platform.
    #[default]
    #[serde(rename = "nodemcu")]
    NodeMcu,
    /// WEMOS / LOLIN D1 mini.
    D1Mini,
}

impl Platform {
    /// All known platforms.
    pub const ALL: [Self; 2] = [Self::NodeMcu, Self::D1Mini];

    /// Configuration name of this platform.
    pub fn name(&self) -> &'static str {
        match self {
            Self::NodeMcu => "nodemcu",
            Self::D1Mini => "d1_mini",
        }
    }

    /// Pin map for this platform.
    pub fn pin_map(self) -> PinMap {
        PinMap::for_platform(self)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Platform {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nodemcu" => Ok(Self::NodeMcu),
            "d1_mini" | "d1mini" => Ok(Self::D1Mini),
            _ => Err(format!(
                "unknown platform: {s:?}, expected \"nodemcu\" or \"d1_mini\""
            )),
        }
    }
}

// ─── GpioPin ────────────────────────────────────────────────────────

/// A platform GPIO line number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GpioPin(u8);

impl GpioPin {
    /// Raw line number, as passed to the motor driver.
    #[inline]
    pub const fn number(self) -> u8 {
        self.0
    }
}

impl From<GpioPin> for u8 {
    fn from(pin: GpioPin) -> Self {
        pin.0
    }
}

impl PartialEq<u8> for GpioPin {
    fn eq(&self, other: &u8) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for GpioPin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GPIO{}", self.0)
    }
}

// ─── Tables ─────────────────────────────────────────────────────────

/// Highest GPIO line on the ESP8266.
pub const MAX_GPIO: u8 = 16;

/// NodeMCU v1.0 silkscreen labels.
const NODEMCU_PINS: [(&str, u8); 15] = [
    ("D0", 16),
    ("D1", 5),
    ("D2", 4),
    ("D3", 0),
    ("D4", 2),
    ("D5", 14),
    ("D6", 12),
    ("D7", 13),
    ("D8", 15),
    ("D9", 3),
    ("D10", 1),
    ("RX", 3),
    ("TX", 1),
    ("SD2", 9),
    ("SD3", 10),
];

/// D1 mini silkscreen labels.
const D1_MINI_PINS: [(&str, u8); 11] = [
    ("D0", 16),
    ("D1", 5),
    ("D2", 4),
    ("D3", 0),
    ("D4", 2),
    ("D5", 14),
    ("D6", 12),
    ("D7", 13),
    ("D8", 15),
    ("RX", 3),
    ("TX", 1),
];

const fn lines_in_range(table: &[(&str, u8)]) -> bool {
    let mut i = 0;
    while i < table.len() {
        if table[i].1 > MAX_GPIO {
            return false;
        }
        i += 1;
    }
    true
}

const_assert!(lines_in_range(&NODEMCU_PINS));
const_assert!(lines_in_range(&D1_MINI_PINS));

// ─── PinMap ─────────────────────────────────────────────────────────

/// Immutable silkscreen label → GPIO line table for one platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinMap {
    platform: Platform,
    entries: &'static [(&'static str, u8)],
}

impl PinMap {
    /// The fixed table for `platform`.
    pub fn for_platform(platform: Platform) -> Self {
        let entries: &'static [(&'static str, u8)] = match platform {
            Platform::NodeMcu => &NODEMCU_PINS,
            Platform::D1Mini => &D1_MINI_PINS,
        };
        Self { platform, entries }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Translate a silkscreen label. Surrounding whitespace is ignored,
    /// case is not.
    pub fn resolve(&self, alias: &str) -> Option<GpioPin> {
        let alias = alias.trim();
        self.entries
            .iter()
            .find(|(label, _)| *label == alias)
            .map(|&(_, line)| GpioPin(line))
    }

    /// Known labels, in table order.
    pub fn aliases(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|&(label, _)| label)
    }

    /// `(label, line)` pairs, in table order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, GpioPin)> + '_ {
        self.entries.iter().map(|&(label, line)| (label, GpioPin(line)))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn nodemcu_documented_lines() {
        let map = PinMap::for_platform(Platform::NodeMcu);
        let expected = [
            ("D0", 16),
            ("D1", 5),
            ("D2", 4),
            ("D3", 0),
            ("D4", 2),
            ("D5", 14),
            ("D6", 12),
            ("D7", 13),
            ("D8", 15),
        ];
        for (alias, line) in expected {
            assert_eq!(map.resolve(alias), Some(GpioPin(line)), "alias {alias}");
        }
    }

    #[test]
    fn d1_mini_shares_d_labels_with_nodemcu() {
        let nodemcu = Platform::NodeMcu.pin_map();
        let d1 = Platform::D1Mini.pin_map();
        for (alias, line) in d1.iter().filter(|(a, _)| a.starts_with('D')) {
            assert_eq!(nodemcu.resolve(alias), Some(line));
        }
        assert!(d1.resolve("D9").is_none());
        assert!(d1.resolve("SD2").is_none());
    }

    #[test]
    fn labels_are_unique_per_platform() {
        for platform in Platform::ALL {
            let map = platform.pin_map();
            let unique: HashSet<_> = map.aliases().collect();
            assert_eq!(unique.len(), map.len(), "{platform}");
        }
    }

    #[test]
    fn resolve_trims_but_is_case_sensitive() {
        let map = Platform::NodeMcu.pin_map();
        assert_eq!(map.resolve(" D4 "), Some(GpioPin(2)));
        assert!(map.resolve("d4").is_none());
        assert!(map.resolve("GPIO2").is_none());
        assert!(map.resolve("").is_none());
    }

    #[test]
    fn platform_names_round_trip() {
        for platform in Platform::ALL {
            assert_eq!(platform.name().parse::<Platform>().unwrap(), platform);
        }
        assert_eq!("D1Mini".parse::<Platform>().unwrap(), Platform::D1Mini);
        assert!("esp32".parse::<Platform>().is_err());
    }

    #[test]
    fn platform_serde_names() {
        #[derive(Debug, Deserialize)]
        struct Wrapper {
            platform: Platform,
        }
        let w: Wrapper = toml::from_str("platform = \"d1_mini\"").unwrap();
        assert_eq!(w.platform, Platform::D1Mini);
        let w: Wrapper = toml::from_str("platform = \"nodemcu\"").unwrap();
        assert_eq!(w.platform, Platform::NodeMcu);
    }

    #[test]
    fn gpio_display() {
        assert_eq!(GpioPin(5).to_string(), "GPIO5");
        assert_eq!(u8::from(GpioPin(5)), 5);
    }
}
