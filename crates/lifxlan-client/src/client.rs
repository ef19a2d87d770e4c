use std::time::{Duration, Instant};

use bytes::BytesMut;
use lifxlan_frame::{
    encode_header, split_datagram, Header, Target, BROADCAST_TARGET, HEADER_SIZE, MAX_PACKET_SIZE,
    PROTOCOL,
};
use lifxlan_message::device::GetService;
use lifxlan_message::Message;
use lifxlan_transport::{Transport, TransportError};
#[cfg(unix)]
use lifxlan_transport::UdpTransport;
use rand::rngs::StdRng;
use tracing::{debug, trace, warn};

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::queue::SendQueue;
use crate::rate::RateLimiter;
use crate::registry::Registry;

/// Outcome of one [`Client::run_once`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunResult {
    /// Nothing was received and nothing is queued.
    Waiting,
    /// Waiting for the transport to become readable failed.
    Error,
    /// One datagram was received and dispatched (or dropped).
    ReceivedData,
    /// One queued datagram was transmitted.
    SentData,
    /// Sends are queued but the transmit ceiling has been reached.
    SentLimit,
}

/// Single-threaded LIFX LAN client.
///
/// `send` and `broadcast` only enqueue; `run_once` performs at most one
/// receive or one transmit per call and must be driven in a loop.
///
/// ```no_run
/// use std::time::Duration;
///
/// use lifxlan_client::{Client, ClientConfig, RunResult};
/// use lifxlan_message::device::{GetService, StateService};
///
/// let mut client = Client::bind(ClientConfig::with_source(42))?;
/// client.register_callback(|header, reply: &StateService| {
///     println!("{:02x?} serves port {}", header.target, reply.port);
/// });
/// client.broadcast(&GetService {})?;
/// while client.run_once(Duration::from_millis(100)) != RunResult::Waiting {}
/// # Ok::<(), lifxlan_client::ClientError>(())
/// ```
pub struct Client<T: Transport> {
    transport: T,
    source: u32,
    queue: SendQueue,
    registry: Registry,
    limiter: RateLimiter,
    recv_buf: Box<[u8; MAX_PACKET_SIZE]>,
}

#[cfg(unix)]
impl Client<UdpTransport> {
    /// Bind a UDP broadcast socket as described by `config.transport`.
    pub fn bind(config: ClientConfig) -> Result<Self> {
        let transport = UdpTransport::bind(&config.transport)?;
        Ok(Self::with_transport(transport, config))
    }
}

impl<T: Transport> Client<T> {
    /// Build a client over any transport.
    pub fn with_transport(transport: T, config: ClientConfig) -> Self {
        Self::from_parts(transport, config, SendQueue::new())
    }

    /// Build a client whose sequence numbers come from `rng`.
    pub fn with_rng(transport: T, config: ClientConfig, rng: StdRng) -> Self {
        Self::from_parts(transport, config, SendQueue::with_rng(rng))
    }

    fn from_parts(transport: T, config: ClientConfig, queue: SendQueue) -> Self {
        Self {
            transport,
            source: config.source,
            queue,
            registry: Registry::new(),
            limiter: RateLimiter::new(config.max_messages_per_second),
            recv_buf: Box::new([0; MAX_PACKET_SIZE]),
        }
    }

    /// Replace the rate limiter, e.g. to start its window at a known instant.
    pub fn set_rate_limiter(&mut self, limiter: RateLimiter) {
        self.limiter = limiter;
    }

    /// Queue `message` for `target`, or for every device when `target` is
    /// `None`. Returns the sequence number identifying the pending send.
    pub fn send<M: Message>(&mut self, message: &M, target: Option<Target>) -> Result<u8> {
        let sequence = self.queue.allocate().ok_or(ClientError::SequenceExhausted)?;
        let header = self.header_for::<M>(target.unwrap_or(BROADCAST_TARGET), sequence);

        let mut datagram = BytesMut::with_capacity(usize::from(header.size));
        encode_header(&header, &mut datagram);
        message.encode(&mut datagram);

        debug!(
            sequence,
            msg_type = M::TYPE,
            name = M::NAME,
            size = datagram.len(),
            "queued message"
        );
        self.queue.insert(sequence, datagram.freeze());
        Ok(sequence)
    }

    /// Queue `message` for every device.
    pub fn broadcast<M: Message>(&mut self, message: &M) -> Result<u8> {
        self.send(message, None)
    }

    /// Call `handler` for every received message of type `M`, replacing
    /// any earlier handler for that type.
    pub fn register_callback<M, F>(&mut self, handler: F)
    where
        M: Message + 'static,
        F: FnMut(&Header, &M) + 'static,
    {
        self.registry.register(handler);
    }

    /// Do one unit of work: receive one datagram, else transmit one
    /// queued datagram, else report idle.
    ///
    /// Waits up to `timeout` for a datagram; a zero timeout never blocks.
    /// Only a failed readability poll yields [`RunResult::Error`]; a failed
    /// read or transmit is logged and still counts as the unit of work.
    pub fn run_once(&mut self, timeout: Duration) -> RunResult {
        match self.transport.poll_recv(&mut self.recv_buf[..], timeout) {
            Ok(Some(len)) => {
                self.handle_datagram(len);
                return RunResult::ReceivedData;
            }
            Ok(None) => {}
            Err(TransportError::Recv(err)) => {
                warn!(error = %err, "readable socket failed to deliver a datagram");
                return RunResult::ReceivedData;
            }
            Err(err) => {
                warn!(error = %err, "receive poll failed");
                return RunResult::Error;
            }
        }
        self.transmit_one(Instant::now())
    }

    /// Whether any message is waiting to be transmitted.
    pub fn has_pending_sends(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Serialized datagram still queued under `sequence`.
    pub fn pending_send(&self, sequence: u8) -> Option<&[u8]> {
        self.queue.get(sequence).map(|datagram| &datagram[..])
    }

    /// Number of queued datagrams.
    pub fn pending_count(&self) -> usize {
        self.queue.len()
    }

    /// Source id stamped into every outbound header.
    pub fn source(&self) -> u32 {
        self.source
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    fn header_for<M: Message>(&self, target: Target, sequence: u8) -> Header {
        Header {
            size: (HEADER_SIZE + M::SIZE) as u16,
            protocol: PROTOCOL,
            addressable: true,
            tagged: M::TYPE == GetService::TYPE,
            origin: 0,
            source: self.source,
            target,
            site: [0; 6],
            ack_required: false,
            res_required: M::HAS_RESPONSE,
            sequence,
            at_time: 0,
            msg_type: M::TYPE,
        }
    }

    fn handle_datagram(&mut self, len: usize) {
        let datagram = &self.recv_buf[..len];
        match split_datagram(datagram) {
            Ok((header, payload)) => {
                if payload.len() != header.payload_len() {
                    trace!(
                        declared = header.payload_len(),
                        actual = payload.len(),
                        "size field disagrees with datagram length"
                    );
                }
                let handled = self.registry.dispatch(&header, payload);
                debug!(
                    sequence = header.sequence,
                    msg_type = header.msg_type,
                    size = len,
                    handled,
                    "received message"
                );
            }
            Err(err) => trace!(error = %err, size = len, "dropped datagram"),
        }
    }

    fn transmit_one(&mut self, now: Instant) -> RunResult {
        if self.queue.is_empty() {
            return RunResult::Waiting;
        }
        if !self.limiter.permits(now) {
            trace!(pending = self.queue.len(), "transmit rate ceiling reached");
            return RunResult::SentLimit;
        }
        let Some((sequence, datagram)) = self.queue.pop_any() else {
            return RunResult::Waiting;
        };

        self.limiter.record(now);
        match self.transport.send_broadcast(&datagram) {
            Ok(written) => debug!(sequence, size = written, "transmitted message"),
            Err(err) => warn!(sequence, error = %err, "transmit failed, message dropped"),
        }
        RunResult::SentData
    }
}

impl<T: Transport> std::fmt::Debug for Client<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("source", &self.source)
            .field("pending", &self.queue.len())
            .field("registry", &self.registry)
            .field("limiter", &self.limiter)
            .finish_non_exhaustive()
    }
}
