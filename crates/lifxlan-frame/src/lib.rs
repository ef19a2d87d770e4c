//! Bit-exact frame header codec for the LIFX LAN protocol.
//!
//! Every datagram starts with a fixed 36-byte header made of three parts:
//! - Frame (8 bytes): size, protocol, addressing flags, source id
//! - Frame address (16 bytes): target device, response flags, sequence
//! - Protocol header (12 bytes): timestamp and message type
//!
//! The header is packed with explicit shifts and masks, so the wire bytes
//! never depend on how the compiler lays out a struct.

pub mod codec;
pub mod error;
pub mod packet;

pub use codec::{
    decode_header, encode_header, header_bytes, Header, Target, BROADCAST_TARGET, HEADER_SIZE,
    MAX_PACKET_SIZE, PROTOCOL, SERVICE_UDP,
};
pub use error::{FrameError, Result};
pub use packet::{encode_packet, split_datagram};
