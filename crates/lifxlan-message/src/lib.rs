//! Typed LIFX LAN message catalog.
//!
//! Each message is a plain struct with a fixed little-endian layout and a
//! [`Message`] impl carrying its type id, payload size and whether it
//! expects a reply. Messages are grouped by family:
//! - [`device`]: discovery, power, labels, firmware and diagnostics
//! - [`light`]: colour state and light power
//!
//! ```
//! use lifxlan_message::{light::SetColor, Hsbk, Message};
//!
//! let msg = SetColor {
//!     color: Hsbk { hue: 21845, saturation: 65535, brightness: 65535, kelvin: 3500 },
//!     duration: 1024,
//!     ..Default::default()
//! };
//! assert_eq!(msg.to_payload().len(), SetColor::SIZE);
//! ```

pub mod catalog;
pub mod device;
pub mod field;
pub mod light;
pub mod message;

pub use catalog::{catalog, lookup};
pub use field::{Hsbk, Label, Reserved, WireField, LABEL_SIZE};
pub use message::{CatalogEntry, Family, Message};
