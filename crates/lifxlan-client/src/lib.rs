//! Single-threaded LIFX LAN client engine.
//!
//! The engine owns a [`Transport`](lifxlan_transport::Transport), a send
//! queue keyed by sequence number, a dispatch registry keyed by message
//! type and a rate limiter. Callers enqueue with [`Client::send`] or
//! [`Client::broadcast`] and drive all I/O with [`Client::run_once`].

pub mod client;
pub mod config;
pub mod error;
pub mod queue;
pub mod rate;
pub mod registry;

pub use client::{Client, RunResult};
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use queue::{SendQueue, MAX_PENDING};
pub use rate::{RateLimiter, MAX_MESSAGES_PER_SECOND};
pub use registry::Registry;
