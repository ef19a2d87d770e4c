use std::net::{Ipv4Addr, SocketAddrV4};

/// UDP port used by LIFX devices for both requests and replies.
pub const LIFX_PORT: u16 = 56700;

/// Socket configuration for [`UdpTransport`](crate::UdpTransport).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// Local interface address to bind. Default: all interfaces.
    pub bind_addr: Ipv4Addr,
    /// Local and remote port. Default: 56700.
    pub port: u16,
    /// Destination for every outbound datagram. Default: 255.255.255.255.
    ///
    /// A subnet broadcast address (e.g. `192.168.1.255`) may be used on
    /// hosts with several interfaces.
    pub broadcast_addr: Ipv4Addr,
    /// Set `SO_REUSEADDR` before binding. Default: true.
    pub reuse_address: bool,
}

impl TransportConfig {
    /// Local address the socket binds to.
    pub fn local_addr(&self) -> SocketAddrV4 {
        SocketAddrV4::new(self.bind_addr, self.port)
    }

    /// Remote address every datagram is sent to.
    pub fn broadcast_target(&self) -> SocketAddrV4 {
        SocketAddrV4::new(self.broadcast_addr, self.port)
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            bind_addr: Ipv4Addr::UNSPECIFIED,
            port: LIFX_PORT,
            broadcast_addr: Ipv4Addr::BROADCAST,
            reuse_address: true,
        }
    }
}
