use bytes::{BufMut, BytesMut};

use crate::codec::{decode_header, encode_header, Header, HEADER_SIZE, MAX_PACKET_SIZE};
use crate::error::{FrameError, Result};

/// Append a complete packet (header followed by payload) to `dst`.
///
/// The header is written as given; callers are responsible for setting
/// `size` to `HEADER_SIZE + payload.len()`.
pub fn encode_packet(header: &Header, payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    let size = HEADER_SIZE + payload.len();
    if size > MAX_PACKET_SIZE {
        return Err(FrameError::PacketTooLarge {
            size,
            max: MAX_PACKET_SIZE,
        });
    }
    dst.reserve(size);
    encode_header(header, dst);
    dst.put_slice(payload);
    Ok(())
}

/// Split a received datagram into its decoded header and raw payload.
///
/// The payload is everything after the header; its length is not checked
/// against `header.size`, since devices are known to pad or truncate.
pub fn split_datagram(datagram: &[u8]) -> Result<(Header, &[u8])> {
    let Some((head, payload)) = datagram.split_first_chunk::<HEADER_SIZE>() else {
        return Err(FrameError::Truncated {
            len: datagram.len(),
            min: HEADER_SIZE,
        });
    };
    Ok((decode_header(head), payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::PROTOCOL;

    fn echo_header(payload_len: usize) -> Header {
        Header {
            size: (HEADER_SIZE + payload_len) as u16,
            protocol: PROTOCOL,
            addressable: true,
            source: 123,
            sequence: 9,
            msg_type: 58,
            ..Header::default()
        }
    }

    #[test]
    fn packet_is_header_then_payload() {
        let payload = 123_456u64.to_le_bytes();
        let mut buf = BytesMut::new();
        encode_packet(&echo_header(payload.len()), &payload, &mut buf).unwrap();

        assert_eq!(buf.len(), HEADER_SIZE + 8);
        assert_eq!(&buf[HEADER_SIZE..], &payload);
    }

    #[test]
    fn split_recovers_header_and_payload() {
        let payload = [1u8, 2, 3, 4];
        let header = echo_header(payload.len());
        let mut buf = BytesMut::new();
        encode_packet(&header, &payload, &mut buf).unwrap();

        let (decoded, rest) = split_datagram(&buf).unwrap();
        assert_eq!(decoded, header);
        assert_eq!(rest, &payload);
    }

    #[test]
    fn split_accepts_header_only_datagram() {
        let mut buf = BytesMut::new();
        encode_packet(&echo_header(0), &[], &mut buf).unwrap();

        let (decoded, rest) = split_datagram(&buf).unwrap();
        assert_eq!(decoded.msg_type, 58);
        assert!(rest.is_empty());
    }

    #[test]
    fn split_rejects_short_datagram() {
        let err = split_datagram(&[0u8; HEADER_SIZE - 1]).unwrap_err();
        assert_eq!(
            err,
            FrameError::Truncated {
                len: HEADER_SIZE - 1,
                min: HEADER_SIZE
            }
        );
    }

    #[test]
    fn oversized_packet_is_rejected() {
        let payload = vec![0u8; MAX_PACKET_SIZE - HEADER_SIZE + 1];
        let mut buf = BytesMut::new();
        let err = encode_packet(&echo_header(0), &payload, &mut buf).unwrap_err();

        assert!(matches!(err, FrameError::PacketTooLarge { size, .. } if size == MAX_PACKET_SIZE + 1));
        assert!(buf.is_empty());
    }
}
