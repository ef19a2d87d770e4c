use std::borrow::Cow;
use std::fmt;

use bytes::{Buf, BufMut};

/// A fixed-width, little-endian payload field.
///
/// `get` may assume at least `WIDTH` bytes remain in `src`.
pub trait WireField: Sized {
    /// Encoded width in bytes.
    const WIDTH: usize;

    /// Append the encoded field to `dst`.
    fn put(&self, dst: &mut impl BufMut);

    /// Read the field from the front of `src`.
    fn get(src: &mut impl Buf) -> Self;
}

macro_rules! le_field {
    ($($ty:ty => $put:ident, $get:ident;)*) => {
        $(
            impl WireField for $ty {
                const WIDTH: usize = std::mem::size_of::<$ty>();

                fn put(&self, dst: &mut impl BufMut) {
                    dst.$put(*self);
                }

                fn get(src: &mut impl Buf) -> Self {
                    src.$get()
                }
            }
        )*
    };
}

le_field! {
    u8 => put_u8, get_u8;
    u16 => put_u16_le, get_u16_le;
    i16 => put_i16_le, get_i16_le;
    u32 => put_u32_le, get_u32_le;
    u64 => put_u64_le, get_u64_le;
    f32 => put_f32_le, get_f32_le;
}

impl<const N: usize> WireField for [u8; N] {
    const WIDTH: usize = N;

    fn put(&self, dst: &mut impl BufMut) {
        dst.put_slice(self);
    }

    fn get(src: &mut impl Buf) -> Self {
        let mut out = [0u8; N];
        src.copy_to_slice(&mut out);
        out
    }
}

/// Padding that is written as zeros and skipped when read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Reserved<const N: usize>;

impl<const N: usize> WireField for Reserved<N> {
    const WIDTH: usize = N;

    fn put(&self, dst: &mut impl BufMut) {
        dst.put_bytes(0, N);
    }

    fn get(src: &mut impl Buf) -> Self {
        src.advance(N);
        Reserved
    }
}

/// Width of a [`Label`] on the wire.
pub const LABEL_SIZE: usize = 32;

/// Fixed 32-byte, zero-padded text field (not NUL-terminated when full).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Label([u8; LABEL_SIZE]);

impl Label {
    /// Build a label, truncating to 32 bytes on a character boundary.
    pub fn new(text: &str) -> Self {
        let mut end = text.len().min(LABEL_SIZE);
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        let mut bytes = [0u8; LABEL_SIZE];
        bytes[..end].copy_from_slice(&text.as_bytes()[..end]);
        Self(bytes)
    }

    /// Wrap raw wire bytes.
    pub fn from_bytes(bytes: [u8; LABEL_SIZE]) -> Self {
        Self(bytes)
    }

    /// Raw wire bytes, padding included.
    pub fn as_bytes(&self) -> &[u8; LABEL_SIZE] {
        &self.0
    }

    /// Text up to the first NUL; invalid UTF-8 is replaced.
    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        let end = self.0.iter().position(|b| *b == 0).unwrap_or(LABEL_SIZE);
        String::from_utf8_lossy(&self.0[..end])
    }

    /// Whether the label holds no text.
    pub fn is_empty(&self) -> bool {
        self.0[0] == 0
    }
}

impl Default for Label {
    fn default() -> Self {
        Self([0; LABEL_SIZE])
    }
}

impl From<&str> for Label {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

impl fmt::Debug for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Label").field(&self.to_string_lossy()).finish()
    }
}

impl WireField for Label {
    const WIDTH: usize = LABEL_SIZE;

    fn put(&self, dst: &mut impl BufMut) {
        dst.put_slice(&self.0);
    }

    fn get(src: &mut impl Buf) -> Self {
        Self(<[u8; LABEL_SIZE]>::get(src))
    }
}

/// Hue, saturation, brightness and colour temperature.
///
/// Hue, saturation and brightness span the full `u16` range; kelvin is
/// in degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Hsbk {
    pub hue: u16,
    pub saturation: u16,
    pub brightness: u16,
    pub kelvin: u16,
}

impl WireField for Hsbk {
    const WIDTH: usize = 8;

    fn put(&self, dst: &mut impl BufMut) {
        dst.put_u16_le(self.hue);
        dst.put_u16_le(self.saturation);
        dst.put_u16_le(self.brightness);
        dst.put_u16_le(self.kelvin);
    }

    fn get(src: &mut impl Buf) -> Self {
        Self {
            hue: src.get_u16_le(),
            saturation: src.get_u16_le(),
            brightness: src.get_u16_le(),
            kelvin: src.get_u16_le(),
        }
    }
}
