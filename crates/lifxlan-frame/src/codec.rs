use bytes::{Buf, BufMut};

/// Fixed header: frame (8) + frame address (16) + protocol header (12) = 36 bytes.
pub const HEADER_SIZE: usize = 36;

/// Largest datagram the protocol produces or accepts.
pub const MAX_PACKET_SIZE: usize = 512;

/// Protocol number carried in every frame.
pub const PROTOCOL: u16 = 1024;

/// Service id advertised by devices reachable over UDP.
pub const SERVICE_UDP: u8 = 1;

/// 8-byte device address carried inside the frame.
pub type Target = [u8; 8];

/// All-zero target: the frame is not addressed to a specific device.
pub const BROADCAST_TARGET: Target = [0; 8];

// Frame word: size:16 protocol:12 addressable:1 tagged:1 origin:2 source:32
const SIZE_MASK: u64 = 0xFFFF;
const PROTOCOL_SHIFT: u32 = 16;
const PROTOCOL_MASK: u64 = 0x0FFF;
const ADDRESSABLE_SHIFT: u32 = 28;
const TAGGED_SHIFT: u32 = 29;
const ORIGIN_SHIFT: u32 = 30;
const ORIGIN_MASK: u64 = 0x3;
const SOURCE_SHIFT: u32 = 32;

// Frame address word (after target): site:48 ack:1 res:1 reserved:6 sequence:8
const SITE_MASK: u64 = 0xFFFF_FFFF_FFFF;
const ACK_REQUIRED_SHIFT: u32 = 48;
const RES_REQUIRED_SHIFT: u32 = 49;
const SEQUENCE_SHIFT: u32 = 56;

/// Logical view of the 36-byte frame header.
///
/// Narrow fields (`protocol`, `origin`) are truncated to their wire width
/// on encode; nothing else is validated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Header {
    /// Total length of header plus payload in bytes.
    pub size: u16,
    /// Protocol number (12 bits). Always [`PROTOCOL`] for frames we build.
    pub protocol: u16,
    /// The frame carries a target address. Always set for frames we build.
    pub addressable: bool,
    /// The frame is untargeted (discovery).
    pub tagged: bool,
    /// Reserved origin indicator (2 bits).
    pub origin: u8,
    /// Client identifier echoed back by devices in their replies.
    pub source: u32,
    /// Device address, or [`BROADCAST_TARGET`].
    pub target: Target,
    /// Reserved, zero-filled.
    pub site: [u8; 6],
    /// Ask the device for an acknowledgement message.
    pub ack_required: bool,
    /// Ask the device for a response message.
    pub res_required: bool,
    /// Per-send correlation id.
    pub sequence: u8,
    /// Reserved timestamp, zero-filled.
    pub at_time: u64,
    /// Message type identifier of the payload.
    pub msg_type: u16,
}

impl Header {
    /// Whether the frame addresses every device rather than one target.
    pub fn is_broadcast(&self) -> bool {
        self.target == BROADCAST_TARGET
    }

    /// Payload length implied by `size`.
    pub fn payload_len(&self) -> usize {
        usize::from(self.size).saturating_sub(HEADER_SIZE)
    }
}

/// The header packed into its little-endian wire words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct WireWords {
    frame: u64,
    target: u64,
    frame_address: u64,
    at_time: u64,
    msg_type: u16,
}

impl WireWords {
    fn pack(h: &Header) -> Self {
        let frame = (u64::from(h.size) & SIZE_MASK)
            | ((u64::from(h.protocol) & PROTOCOL_MASK) << PROTOCOL_SHIFT)
            | (u64::from(h.addressable) << ADDRESSABLE_SHIFT)
            | (u64::from(h.tagged) << TAGGED_SHIFT)
            | ((u64::from(h.origin) & ORIGIN_MASK) << ORIGIN_SHIFT)
            | (u64::from(h.source) << SOURCE_SHIFT);

        let mut site = [0u8; 8];
        site[..6].copy_from_slice(&h.site);
        let frame_address = (u64::from_le_bytes(site) & SITE_MASK)
            | (u64::from(h.ack_required) << ACK_REQUIRED_SHIFT)
            | (u64::from(h.res_required) << RES_REQUIRED_SHIFT)
            | (u64::from(h.sequence) << SEQUENCE_SHIFT);

        Self {
            frame,
            target: u64::from_le_bytes(h.target),
            frame_address,
            at_time: h.at_time,
            msg_type: h.msg_type,
        }
    }

    fn unpack(self) -> Header {
        let mut site = [0u8; 6];
        site.copy_from_slice(&(self.frame_address & SITE_MASK).to_le_bytes()[..6]);

        Header {
            size: (self.frame & SIZE_MASK) as u16,
            protocol: ((self.frame >> PROTOCOL_SHIFT) & PROTOCOL_MASK) as u16,
            addressable: (self.frame >> ADDRESSABLE_SHIFT) & 1 == 1,
            tagged: (self.frame >> TAGGED_SHIFT) & 1 == 1,
            origin: ((self.frame >> ORIGIN_SHIFT) & ORIGIN_MASK) as u8,
            source: (self.frame >> SOURCE_SHIFT) as u32,
            target: self.target.to_le_bytes(),
            site,
            ack_required: (self.frame_address >> ACK_REQUIRED_SHIFT) & 1 == 1,
            res_required: (self.frame_address >> RES_REQUIRED_SHIFT) & 1 == 1,
            sequence: (self.frame_address >> SEQUENCE_SHIFT) as u8,
            at_time: self.at_time,
            msg_type: self.msg_type,
        }
    }
}

/// Encode a header into its 36-byte wire form.
///
/// Wire format (all fields little-endian):
/// ```text
/// ┌────────────────────────────── frame (8B) ───────────────────────────────┐
/// │ size:16 │ protocol:12 addressable:1 tagged:1 origin:2 │ source:32       │
/// ├────────────────────────── frame address (16B) ──────────────────────────┤
/// │ target:64 │ site:48 │ ack:1 res:1 reserved:6 │ sequence:8               │
/// ├───────────────────────── protocol header (12B) ─────────────────────────┤
/// │ at_time:64 │ type:16 │ reserved:16                                      │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn encode_header(header: &Header, dst: &mut impl BufMut) {
    let words = WireWords::pack(header);
    dst.put_u64_le(words.frame);
    dst.put_u64_le(words.target);
    dst.put_u64_le(words.frame_address);
    dst.put_u64_le(words.at_time);
    dst.put_u16_le(words.msg_type);
    dst.put_u16_le(0);
}

/// Encode a header into a fixed array.
pub fn header_bytes(header: &Header) -> [u8; HEADER_SIZE] {
    let mut out = [0u8; HEADER_SIZE];
    encode_header(header, &mut &mut out[..]);
    out
}

/// Decode a header from its 36-byte wire form.
///
/// Reserved bits are ignored.
pub fn decode_header(src: &[u8; HEADER_SIZE]) -> Header {
    let mut src = &src[..];
    WireWords {
        frame: src.get_u64_le(),
        target: src.get_u64_le(),
        frame_address: src.get_u64_le(),
        at_time: src.get_u64_le(),
        msg_type: src.get_u16_le(),
    }
    .unpack()
}
