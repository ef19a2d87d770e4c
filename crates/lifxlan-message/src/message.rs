use bytes::{Buf, BufMut};

/// A fixed-size payload tagged with its protocol type id.
///
/// Implementations are generated by the catalog; the client engine only
/// relies on the constants and the two codec functions, so adding a
/// message never touches dispatch or send logic.
pub trait Message: Sized {
    /// Numeric message type carried in the frame header.
    const TYPE: u16;
    /// Whether sending this message asks the device for a reply.
    const HAS_RESPONSE: bool;
    /// Encoded payload size in bytes.
    const SIZE: usize;
    /// Message name as documented by the protocol.
    const NAME: &'static str;

    /// Append exactly `SIZE` bytes to `dst`.
    fn encode(&self, dst: &mut impl BufMut);

    /// Read the payload from `src`, which holds at least `SIZE` bytes.
    fn decode(src: &mut impl Buf) -> Self;

    /// Encode into a freshly allocated buffer.
    fn to_payload(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::SIZE);
        self.encode(&mut out);
        out
    }

    /// Decode from a raw payload, or `None` if it is too short.
    ///
    /// Trailing bytes beyond `SIZE` are ignored.
    fn from_payload(payload: &[u8]) -> Option<Self> {
        let mut src = payload.get(..Self::SIZE)?;
        Some(Self::decode(&mut src))
    }
}

/// Which part of the protocol a message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    /// Messages every device understands.
    Device,
    /// Messages specific to lights.
    Light,
}

impl Family {
    /// Lowercase family name.
    pub fn as_str(self) -> &'static str {
        match self {
            Family::Device => "device",
            Family::Light => "light",
        }
    }
}

/// Runtime description of one catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub type_id: u16,
    pub name: &'static str,
    pub family: Family,
    pub size: usize,
    pub has_response: bool,
}

impl CatalogEntry {
    /// Describe message `M`.
    pub const fn of<M: Message>(family: Family) -> Self {
        Self {
            type_id: M::TYPE,
            name: M::NAME,
            family,
            size: M::SIZE,
            has_response: M::HAS_RESPONSE,
        }
    }
}

impl std::fmt::Display for CatalogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}::{}", self.family.as_str(), self.name)
    }
}

/// Declare a family of messages: one struct, one `Message` impl and one
/// catalog entry per line, plus a compile-time packet size check.
macro_rules! define_messages {
    (
        family: $family:expr;
        $(
            $(#[$meta:meta])*
            $name:ident = $type_id:literal, response: $resp:literal {
                $( $(#[$fmeta:meta])* $field:ident : $fty:ty ),* $(,)?
            }
        )*
    ) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, Default, PartialEq)]
            pub struct $name {
                $( $(#[$fmeta])* pub $field: $fty, )*
            }

            impl $crate::Message for $name {
                const TYPE: u16 = $type_id;
                const HAS_RESPONSE: bool = $resp;
                const SIZE: usize = 0 $( + <$fty as $crate::WireField>::WIDTH )*;
                const NAME: &'static str = stringify!($name);

                #[allow(unused_variables)]
                fn encode(&self, dst: &mut impl ::bytes::BufMut) {
                    $( $crate::WireField::put(&self.$field, dst); )*
                }

                #[allow(unused_variables)]
                fn decode(src: &mut impl ::bytes::Buf) -> Self {
                    Self {
                        $( $field: <$fty as $crate::WireField>::get(src), )*
                    }
                }
            }

            const _: () = assert!(
                <$name as $crate::Message>::SIZE + ::lifxlan_frame::HEADER_SIZE
                    <= ::lifxlan_frame::MAX_PACKET_SIZE
            );
        )*

        /// Catalog entries for this family, in declaration order.
        pub const ENTRIES: &[$crate::CatalogEntry] = &[
            $( $crate::CatalogEntry::of::<$name>($family), )*
        ];
    };
}

pub(crate) use define_messages;
