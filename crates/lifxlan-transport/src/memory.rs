use std::collections::VecDeque;
use std::time::Duration;

use crate::error::{Result, TransportError};
use crate::traits::Transport;

/// In-memory transport for tests and for embedding the engine behind
/// another I/O layer.
///
/// Inbound datagrams are queued with [`push_inbound`](Self::push_inbound)
/// and handed out one per `poll_recv` call. Outbound datagrams are
/// recorded in order. Polling never blocks.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    inbound: VecDeque<Vec<u8>>,
    sent: Vec<Vec<u8>>,
    fail_next_poll: bool,
    fail_next_recv: bool,
    fail_next_send: bool,
}

impl MemoryTransport {
    /// Create an empty transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a datagram to be returned by a later `poll_recv`.
    pub fn push_inbound(&mut self, datagram: impl Into<Vec<u8>>) {
        self.inbound.push_back(datagram.into());
    }

    /// Datagrams transmitted so far, oldest first.
    pub fn sent(&self) -> &[Vec<u8>] {
        &self.sent
    }

    /// Remove and return every transmitted datagram.
    pub fn take_sent(&mut self) -> Vec<Vec<u8>> {
        std::mem::take(&mut self.sent)
    }

    /// Number of inbound datagrams not yet received.
    pub fn inbound_len(&self) -> usize {
        self.inbound.len()
    }

    /// Make the next `poll_recv` fail with a poll error.
    pub fn fail_next_poll(&mut self) {
        self.fail_next_poll = true;
    }

    /// Make the next `poll_recv` report readability but fail the read,
    /// consuming no datagram.
    pub fn fail_next_recv(&mut self) {
        self.fail_next_recv = true;
    }

    /// Make the next `send_broadcast` fail with a send error.
    pub fn fail_next_send(&mut self) {
        self.fail_next_send = true;
    }
}

impl Transport for MemoryTransport {
    fn send_broadcast(&mut self, datagram: &[u8]) -> Result<usize> {
        if std::mem::take(&mut self.fail_next_send) {
            return Err(TransportError::Io(std::io::Error::new(
                std::io::ErrorKind::NetworkUnreachable,
                "injected send failure",
            )));
        }
        self.sent.push(datagram.to_vec());
        Ok(datagram.len())
    }

    fn poll_recv(&mut self, buf: &mut [u8], _timeout: Duration) -> Result<Option<usize>> {
        if std::mem::take(&mut self.fail_next_poll) {
            return Err(TransportError::Poll(std::io::Error::new(
                std::io::ErrorKind::Interrupted,
                "injected poll failure",
            )));
        }
        if std::mem::take(&mut self.fail_next_recv) {
            return Err(TransportError::Recv(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "injected receive failure",
            )));
        }

        let Some(datagram) = self.inbound.pop_front() else {
            return Ok(None);
        };
        let len = datagram.len().min(buf.len());
        buf[..len].copy_from_slice(&datagram[..len]);
        Ok(Some(len))
    }
}
