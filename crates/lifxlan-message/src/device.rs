//! Messages understood by every LIFX device.

use crate::field::{Label, Reserved};
use crate::message::define_messages;
use crate::Family;

define_messages! {
    family: Family::Device;

    /// Discovery request; broadcast tagged to find devices.
    GetService = 2, response: true {}

    /// Discovery reply advertising a service and its port.
    StateService = 3, response: false {
        /// Service id; `1` is UDP.
        service: u8,
        port: u32,
    }

    GetHostInfo = 12, response: true {}

    /// Host MCU radio statistics.
    StateHostInfo = 13, response: false {
        /// Signal strength in milliwatts.
        signal: f32,
        /// Bytes transmitted since power on.
        tx: u32,
        /// Bytes received since power on.
        rx: u32,
        reserved: Reserved<2>,
    }

    GetHostFirmware = 14, response: true {}

    StateHostFirmware = 15, response: false {
        /// Firmware build time (ns since epoch).
        build: u64,
        reserved: Reserved<8>,
        version: u32,
    }

    GetWifiInfo = 16, response: true {}

    StateWifiInfo = 17, response: false {
        signal: f32,
        tx: u32,
        rx: u32,
        reserved: Reserved<2>,
    }

    GetWifiFirmware = 18, response: true {}

    StateWifiFirmware = 19, response: false {
        build: u64,
        reserved: Reserved<8>,
        version: u32,
    }

    GetPower = 20, response: true {}

    /// Set device power; `0` is off, `65535` is on.
    SetPower = 21, response: false {
        level: u16,
    }

    StatePower = 22, response: false {
        level: u16,
    }

    GetLabel = 23, response: true {}

    SetLabel = 24, response: false {
        label: Label,
    }

    StateLabel = 25, response: false {
        label: Label,
    }

    GetVersion = 32, response: true {}

    /// Hardware vendor, product and version ids.
    StateVersion = 33, response: false {
        vendor: u32,
        product: u32,
        version: u32,
    }

    GetInfo = 34, response: true {}

    /// Clock and runtime counters, all in nanoseconds.
    StateInfo = 35, response: false {
        time: u64,
        uptime: u64,
        downtime: u64,
    }

    /// Sent by a device when `ack_required` was set on a request.
    Acknowledgement = 45, response: false {}

    GetLocation = 48, response: true {}

    StateLocation = 50, response: false {
        location: [u8; 16],
        label: Label,
        updated_at: u64,
    }

    GetGroup = 51, response: true {}

    StateGroup = 53, response: false {
        group: [u8; 16],
        label: Label,
        updated_at: u64,
    }

    /// Ask a device to echo `payload` back.
    EchoRequest = 58, response: true {
        payload: u64,
    }

    EchoResponse = 59, response: false {
        payload: u64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Message;

    #[test]
    fn state_service_layout() {
        let msg = StateService {
            service: 1,
            port: 56700,
        };
        let payload = msg.to_payload();
        assert_eq!(payload, vec![1, 0x7C, 0xDD, 0x00, 0x00]);
        assert_eq!(StateService::from_payload(&payload), Some(msg));
    }

    #[test]
    fn state_host_firmware_skips_reserved_gap() {
        let mut raw = Vec::new();
        raw.extend_from_slice(&1_500_000_000u64.to_le_bytes());
        raw.extend_from_slice(&[0xFF; 8]);
        raw.extend_from_slice(&0x0002_0050u32.to_le_bytes());

        let msg = StateHostFirmware::from_payload(&raw).expect("payload is long enough");
        assert_eq!(msg.build, 1_500_000_000);
        assert_eq!(msg.version, 0x0002_0050);

        let reencoded = msg.to_payload();
        assert_eq!(&reencoded[8..16], &[0; 8]);
    }

    #[test]
    fn state_location_carries_label() {
        let msg = StateLocation {
            location: [7; 16],
            label: Label::new("Home"),
            updated_at: 42,
        };
        let payload = msg.to_payload();
        assert_eq!(payload.len(), 56);
        assert_eq!(&payload[16..20], b"Home");

        let decoded = StateLocation::from_payload(&payload).unwrap();
        assert_eq!(decoded.label.to_string(), "Home");
        assert_eq!(decoded.updated_at, 42);
    }

    #[test]
    fn echo_request_roundtrip() {
        let msg = EchoRequest { payload: 123_456 };
        assert_eq!(msg.to_payload(), 123_456u64.to_le_bytes().to_vec());
        assert_eq!(EchoRequest::from_payload(&msg.to_payload()), Some(msg));
    }

    #[test]
    fn short_payload_does_not_decode() {
        assert_eq!(EchoResponse::from_payload(&[0u8; 7]), None);
        assert_eq!(GetService::from_payload(&[]), Some(GetService {}));
    }

    #[test]
    fn trailing_bytes_are_ignored() {
        let mut raw = 5u16.to_le_bytes().to_vec();
        raw.extend_from_slice(&[1, 2, 3]);
        assert_eq!(StatePower::from_payload(&raw), Some(StatePower { level: 5 }));
    }
}
