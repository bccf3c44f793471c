//! Starling protocol settings
use crate::error::{Result, StarlingError};
use crate::member::MemberId;

pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// The group's single always-first member. Any node whose own address
/// equals the configured bootstrap skips the join request and starts the
/// group itself.
pub const DEFAULT_BOOTSTRAP: MemberId = MemberId { id: 1, port: 0 };

/// Peers targeted per gossip round.
pub const DEFAULT_FANOUT: usize = 3;

/// Ticks without a heartbeat advance before an entry stops being relayed.
pub const DEFAULT_T_FAIL: u64 = 5;

/// Ticks without a heartbeat advance before an entry is evicted.
pub const DEFAULT_T_REMOVE: u64 = 20;

/// Ticks between join-request retries while stuck joining. Zero disables
/// retries entirely.
pub const DEFAULT_JOIN_RETRY_INTERVAL: u64 = 10;

#[derive(Clone, Debug)]
pub struct ProtocolSettings {
    /// Well-known introducer address for the join handshake.
    pub bootstrap: MemberId,

    /// Number of peers per gossip round.
    pub fanout: usize,

    /// Freshness window: entries staler than this are no longer relayed.
    pub t_fail: u64,

    /// Removal window: entries staler than this are evicted. Must be at
    /// least `t_fail`; an entry first goes quiet, then goes away.
    pub t_remove: u64,

    /// Re-send the join request every this many ticks while joining.
    pub join_retry_interval: u64,
}

impl Default for ProtocolSettings {
    fn default() -> Self {
        Self {
            bootstrap: DEFAULT_BOOTSTRAP,
            fanout: DEFAULT_FANOUT,
            t_fail: DEFAULT_T_FAIL,
            t_remove: DEFAULT_T_REMOVE,
            join_retry_interval: DEFAULT_JOIN_RETRY_INTERVAL,
        }
    }
}

impl ProtocolSettings {
    pub fn validate(&self) -> Result<()> {
        if self.fanout == 0 {
            return Err(StarlingError::Config(
                "fanout must be at least 1".to_string(),
            ));
        }
        if self.t_remove < self.t_fail {
            return Err(StarlingError::Config(format!(
                "t_remove ({}) must be >= t_fail ({})",
                self.t_remove, self.t_fail
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        assert!(ProtocolSettings::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_inverted_windows() {
        let settings = ProtocolSettings {
            t_fail: 30,
            t_remove: 10,
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(StarlingError::Config(_))
        ));
    }

    #[test]
    fn test_validate_rejects_zero_fanout() {
        let settings = ProtocolSettings {
            fanout: 0,
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(StarlingError::Config(_))
        ));
    }
}
