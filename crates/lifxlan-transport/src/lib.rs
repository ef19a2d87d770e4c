//! Datagram transport abstraction for the LIFX LAN protocol.
//!
//! Provides a unified interface over the ways frames can reach devices:
//! - UDP broadcast on port 56700 (Linux/macOS)
//! - An in-memory transport for tests and embedding
//!
//! This is the lowest layer of lifxlan. The client engine only ever talks
//! to the [`Transport`] trait defined here.

pub mod config;
pub mod error;
pub mod memory;
pub mod traits;

#[cfg(unix)]
pub mod udp;

pub use config::{TransportConfig, LIFX_PORT};
pub use error::{Result, TransportError};
pub use memory::MemoryTransport;
pub use traits::Transport;

#[cfg(unix)]
pub use udp::UdpTransport;
