use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;
use std::time::Duration;

use bytes::BytesMut;
use lifxlan_client::{Client, ClientConfig, RunResult};
use lifxlan_frame::{encode_packet, split_datagram, Header, HEADER_SIZE, PROTOCOL};
use lifxlan_message::device::{EchoRequest, EchoResponse, GetService, StateService};
use lifxlan_message::Message;
use lifxlan_transport::MemoryTransport;

fn reply<M: Message>(message: &M, request: &Header, target: [u8; 8]) -> Vec<u8> {
    let header = Header {
        size: (HEADER_SIZE + M::SIZE) as u16,
        protocol: PROTOCOL,
        addressable: true,
        source: request.source,
        target,
        sequence: request.sequence,
        msg_type: M::TYPE,
        ..Header::default()
    };
    let mut buf = BytesMut::new();
    encode_packet(&header, &message.to_payload(), &mut buf).expect("reply fits in a packet");
    buf.to_vec()
}

fn drive(client: &mut Client<MemoryTransport>) {
    while client.run_once(Duration::ZERO) != RunResult::Waiting {}
}

#[test]
fn echo_request_is_queued_with_source_and_payload() {
    let mut client = Client::with_transport(MemoryTransport::new(), ClientConfig::with_source(123));
    assert!(!client.has_pending_sends());

    let sequence = client
        .send(&EchoRequest { payload: 123_456 }, None)
        .expect("sequence available");
    assert!(client.has_pending_sends());

    let datagram = client.pending_send(sequence).expect("send is pending");
    let (header, payload) = split_datagram(datagram).expect("full header");
    assert_eq!(header.source, 123);
    assert_eq!(header.msg_type, EchoRequest::TYPE);
    assert_eq!(header.target, [0; 8]);
    assert_eq!(header.sequence, sequence);
    assert!(header.res_required);
    assert!(!header.tagged);

    let echoed = EchoRequest::from_payload(payload).expect("payload decodes");
    assert_eq!(echoed.payload, 123_456);

    drive(&mut client);
    assert!(!client.has_pending_sends());
    assert_eq!(client.transport().sent().len(), 1);
}

#[test]
fn echo_round_trip_through_callback() {
    let replies = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&replies);

    let mut client = Client::with_transport(MemoryTransport::new(), ClientConfig::with_source(9));
    client.register_callback(move |header: &Header, msg: &EchoResponse| {
        sink.borrow_mut().push((header.sequence, msg.payload));
    });

    let sequence = client.broadcast(&EchoRequest { payload: 77 }).expect("queued");
    drive(&mut client);

    let sent = client.transport_mut().take_sent();
    let (request, payload) = split_datagram(&sent[0]).expect("sent frame has header");
    let echoed = EchoRequest::from_payload(payload).expect("echo payload");
    let response = reply(&EchoResponse { payload: echoed.payload }, &request, [1; 8]);
    client.transport_mut().push_inbound(response);

    assert_eq!(client.run_once(Duration::ZERO), RunResult::ReceivedData);
    assert_eq!(*replies.borrow(), vec![(sequence, 77)]);
}

#[test]
fn discovery_collects_every_reply() {
    let devices = Rc::new(RefCell::new(HashSet::new()));
    let sink = Rc::clone(&devices);

    let mut client = Client::with_transport(MemoryTransport::new(), ClientConfig::with_source(55));
    client.register_callback(move |header: &Header, service: &StateService| {
        if service.service == lifxlan_frame::SERVICE_UDP {
            sink.borrow_mut().insert(header.target);
        }
    });

    client.broadcast(&GetService {}).expect("queued");
    drive(&mut client);
    let sent = client.transport_mut().take_sent();
    let (request, _) = split_datagram(&sent[0]).expect("header");
    assert!(request.tagged);

    for id in 1..=3u8 {
        let target = [0xD0, 0x73, 0xD5, 0, 0, id, 0, 0];
        let service = StateService { service: 1, port: 56700 };
        client.transport_mut().push_inbound(reply(&service, &request, target));
    }
    // A reply for some other service is ignored by the callback.
    let other = StateService { service: 5, port: 56700 };
    client.transport_mut().push_inbound(reply(&other, &request, [9; 8]));

    drive(&mut client);
    assert_eq!(devices.borrow().len(), 3);
    assert_eq!(client.transport().inbound_len(), 0);
}
