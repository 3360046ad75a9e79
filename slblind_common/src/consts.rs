//! Shared constants for the SLBlind workspace.
//!
//! Single source of truth for limits, defaults and topic segments.

/// Default MQTT broker port.
pub const DEFAULT_MQTT_PORT: u16 = 1883;

/// Default first topic segment (installation root).
pub const DEFAULT_TOPIC_ROOT: &str = "slblind";

/// Fixed topic segment between the namespace and the topic suffix.
pub const COVER_SEGMENT: &str = "cover";

/// Maximum number of blinds one controller process drives.
pub const MAX_BLINDS: usize = 16;

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/slblind/slblind.toml";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants_are_consistent() {
        assert!(MAX_BLINDS > 0);
        assert!(!DEFAULT_TOPIC_ROOT.contains('/'));
        assert!(!COVER_SEGMENT.contains('/'));
        assert_eq!(DEFAULT_MQTT_PORT, 1883);
    }
}
