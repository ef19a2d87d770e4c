use lifxlan_transport::TransportConfig;

use crate::rate::MAX_MESSAGES_PER_SECOND;

/// Configuration for a [`Client`](crate::Client).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Identifier stamped into every outbound header. Devices copy it into
    /// their replies. Default: 0.
    pub source: u32,
    /// Transmit ceiling in messages per elapsed second. `0` disables the
    /// limiter. Default: 20.
    pub max_messages_per_second: u32,
    /// Socket settings used by [`Client::bind`](crate::Client::bind).
    pub transport: TransportConfig,
}

impl ClientConfig {
    /// Default configuration with the given source id.
    pub fn with_source(source: u32) -> Self {
        Self {
            source,
            ..Self::default()
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            source: 0,
            max_messages_per_second: MAX_MESSAGES_PER_SECOND,
            transport: TransportConfig::default(),
        }
    }
}
