//! LIFX LAN protocol client.
//!
//! lifxlan speaks the binary UDP protocol used to discover and control LIFX
//! lights on a local network. It moves typed messages across the wire; what
//! a light is doing is left to the application.
//!
//! # Crate Structure
//!
//! - [`transport`] — Datagram transport abstraction (UDP broadcast, in-memory)
//! - [`frame`] — Bit-exact 36-byte frame header codec
//! - [`message`] — Typed catalog of device and light messages
//! - [`client`] — Single-threaded engine: send queue, rate limiting, dispatch

/// Re-export transport types.
pub mod transport {
    pub use lifxlan_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use lifxlan_frame::*;
}

/// Re-export message types.
pub mod message {
    pub use lifxlan_message::*;
}

/// Re-export client types.
pub mod client {
    pub use lifxlan_client::*;
}

pub use lifxlan_client::{Client, ClientConfig, ClientError, RunResult};
