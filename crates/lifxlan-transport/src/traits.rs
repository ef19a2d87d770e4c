use std::time::Duration;

use crate::error::Result;

/// A datagram transport that can broadcast frames and wait for replies.
///
/// This is the seam between the protocol engine and the network. The
/// engine never touches a socket directly; it drives whatever implements
/// this trait, which keeps the engine testable without a real network.
pub trait Transport {
    /// Transmit one datagram to the broadcast destination.
    ///
    /// Returns the number of bytes written.
    fn send_broadcast(&mut self, datagram: &[u8]) -> Result<usize>;

    /// Wait up to `timeout` for one datagram and copy it into `buf`.
    ///
    /// Returns `Ok(None)` when nothing became readable in time. A zero
    /// timeout makes this a non-blocking check. At most one datagram is
    /// consumed per call; anything longer than `buf` is truncated.
    fn poll_recv(&mut self, buf: &mut [u8], timeout: Duration) -> Result<Option<usize>>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send_broadcast(&mut self, datagram: &[u8]) -> Result<usize> {
        (**self).send_broadcast(datagram)
    }

    fn poll_recv(&mut self, buf: &mut [u8], timeout: Duration) -> Result<Option<usize>> {
        (**self).poll_recv(buf, timeout)
    }
}
