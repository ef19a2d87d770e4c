use std::io;
use std::net::{SocketAddr, SocketAddrV4, UdpSocket};
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};
use std::time::Duration;

use tracing::{info, trace};

use crate::config::TransportConfig;
use crate::error::{Result, TransportError};
use crate::traits::Transport;

/// IPv4 UDP transport that broadcasts every datagram.
///
/// The socket is bound to `bind_addr:port` so replies and unsolicited
/// discovery answers from devices arrive on the same socket. Outbound
/// datagrams always go to the configured broadcast address; devices pick
/// out frames meant for them by the target field inside the frame.
pub struct UdpTransport {
    socket: UdpSocket,
    broadcast: SocketAddrV4,
}

impl UdpTransport {
    /// Create, configure and bind the socket described by `config`.
    pub fn bind(config: &TransportConfig) -> Result<Self> {
        let fd = open_socket()?;
        if config.reuse_address {
            set_flag(&fd, libc::SO_REUSEADDR, "SO_REUSEADDR")?;
        }
        set_flag(&fd, libc::SO_BROADCAST, "SO_BROADCAST")?;

        let local = config.local_addr();
        bind_fd(&fd, local).map_err(|source| TransportError::Bind {
            addr: local,
            source,
        })?;

        let socket = UdpSocket::from(fd);
        let broadcast = config.broadcast_target();
        info!(addr = %local, broadcast = %broadcast, "bound udp transport");

        Ok(Self { socket, broadcast })
    }

    /// Address the socket is actually bound to.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.socket.local_addr().map_err(Into::into)
    }

    /// Destination of every outbound datagram.
    pub fn broadcast_addr(&self) -> SocketAddrV4 {
        self.broadcast
    }

    /// Transport name for diagnostics.
    pub fn transport_name(&self) -> &'static str {
        "udp-broadcast"
    }

    fn wait_readable(&self, timeout: Duration) -> io::Result<bool> {
        let mut pfd = libc::pollfd {
            fd: self.socket.as_raw_fd(),
            events: libc::POLLIN,
            revents: 0,
        };

        // SAFETY: `pfd` is a single valid, writable pollfd and the count passed is 1.
        let rc = unsafe { libc::poll(&mut pfd, 1, poll_timeout_ms(timeout)) };
        if rc < 0 {
            return Err(io::Error::last_os_error());
        }

        // POLLERR is reported as readable so the pending error surfaces from recv.
        Ok(rc > 0 && pfd.revents & (libc::POLLIN | libc::POLLERR) != 0)
    }
}

impl Transport for UdpTransport {
    fn send_broadcast(&mut self, datagram: &[u8]) -> Result<usize> {
        self.socket
            .send_to(datagram, self.broadcast)
            .map_err(|source| TransportError::Send {
                addr: self.broadcast,
                source,
            })
    }

    fn poll_recv(&mut self, buf: &mut [u8], timeout: Duration) -> Result<Option<usize>> {
        if !self.wait_readable(timeout).map_err(TransportError::Poll)? {
            return Ok(None);
        }

        let (read, peer) = self.socket.recv_from(buf).map_err(TransportError::Recv)?;
        trace!(%peer, size = read, "received datagram");
        Ok(Some(read))
    }
}

impl std::fmt::Debug for UdpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UdpTransport")
            .field("local", &self.socket.local_addr().ok())
            .field("broadcast", &self.broadcast)
            .finish()
    }
}

/// Convert a wait bound to poll(2) milliseconds, rounding partial
/// milliseconds up so a non-zero timeout never degrades to a busy poll.
fn poll_timeout_ms(timeout: Duration) -> libc::c_int {
    let millis = timeout.as_micros().div_ceil(1000);
    libc::c_int::try_from(millis).unwrap_or(libc::c_int::MAX)
}

fn open_socket() -> Result<OwnedFd> {
    // SAFETY: socket(2) with constant arguments; the result is checked before use.
    let fd = unsafe { libc::socket(libc::AF_INET, libc::SOCK_DGRAM, libc::IPPROTO_UDP) };
    if fd < 0 {
        return Err(TransportError::Socket(io::Error::last_os_error()));
    }

    // SAFETY: `fd` was just returned by socket(2) and has no other owner.
    Ok(unsafe { OwnedFd::from_raw_fd(fd) })
}

fn set_flag(fd: &OwnedFd, option: libc::c_int, name: &'static str) -> Result<()> {
    let enabled: libc::c_int = 1;

    // SAFETY: `enabled` outlives the call and the length matches its type.
    let rc = unsafe {
        libc::setsockopt(
            fd.as_raw_fd(),
            libc::SOL_SOCKET,
            option,
            (&enabled as *const libc::c_int).cast::<libc::c_void>(),
            std::mem::size_of::<libc::c_int>() as libc::socklen_t,
        )
    };

    if rc != 0 {
        return Err(TransportError::SocketOption {
            option: name,
            source: io::Error::last_os_error(),
        });
    }
    Ok(())
}

fn bind_fd(fd: &OwnedFd, addr: SocketAddrV4) -> io::Result<()> {
    // SAFETY: sockaddr_in is plain old data; all-zero is a valid value.
    let mut raw: libc::sockaddr_in = unsafe { std::mem::zeroed() };
    raw.sin_family = libc::AF_INET as libc::sa_family_t;
    raw.sin_port = addr.port().to_be();
    raw.sin_addr = libc::in_addr {
        s_addr: u32::from(*addr.ip()).to_be(),
    };
    #[cfg(any(
        target_os = "macos",
        target_os = "ios",
        target_os = "freebsd",
        target_os = "openbsd",
        target_os = "netbsd",
        target_os = "dragonfly"
    ))]
    {
        raw.sin_len = std::mem::size_of::<libc::sockaddr_in>() as u8;
    }

    // SAFETY: `raw` is a fully initialised sockaddr_in and the length matches it.
    let rc = unsafe {
        libc::bind(
            fd.as_raw_fd(),
            (&raw as *const libc::sockaddr_in).cast::<libc::sockaddr>(),
            std::mem::size_of::<libc::sockaddr_in>() as libc::socklen_t,
        )
    };

    if rc != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;

    fn free_loopback_port() -> u16 {
        let probe = UdpSocket::bind("127.0.0.1:0").expect("probe socket should bind");
        probe
            .local_addr()
            .expect("probe socket should have an address")
            .port()
    }

    fn loopback_config() -> TransportConfig {
        TransportConfig {
            bind_addr: Ipv4Addr::LOCALHOST,
            port: free_loopback_port(),
            broadcast_addr: Ipv4Addr::LOCALHOST,
            reuse_address: true,
        }
    }

    #[test]
    fn poll_timeout_rounds_partial_millis_up() {
        assert_eq!(poll_timeout_ms(Duration::ZERO), 0);
        assert_eq!(poll_timeout_ms(Duration::from_micros(1)), 1);
        assert_eq!(poll_timeout_ms(Duration::from_millis(250)), 250);
        assert_eq!(poll_timeout_ms(Duration::from_secs(u64::MAX)), libc::c_int::MAX);
    }

    #[test]
    fn binds_requested_address() {
        let config = loopback_config();
        let transport = UdpTransport::bind(&config).expect("transport should bind");

        let local = transport.local_addr().expect("local addr should resolve");
        assert_eq!(local, SocketAddr::V4(config.local_addr()));
        assert_eq!(transport.broadcast_addr(), config.broadcast_target());
    }

    #[test]
    fn zero_timeout_poll_returns_none_when_idle() {
        let mut transport = UdpTransport::bind(&loopback_config()).expect("transport should bind");
        let mut buf = [0u8; 64];
        let received = transport
            .poll_recv(&mut buf, Duration::ZERO)
            .expect("poll should succeed");
        assert_eq!(received, None);
    }

    #[test]
    fn sent_datagram_loops_back_on_same_port() {
        let mut transport = UdpTransport::bind(&loopback_config()).expect("transport should bind");

        let sent = transport
            .send_broadcast(b"lifx-loopback")
            .expect("send should succeed");
        assert_eq!(sent, 13);

        let mut buf = [0u8; 64];
        let received = transport
            .poll_recv(&mut buf, Duration::from_secs(2))
            .expect("poll should succeed")
            .expect("datagram should arrive");
        assert_eq!(&buf[..received], b"lifx-loopback");
    }

    #[test]
    fn bind_conflict_without_reuse_reports_address() {
        let mut config = loopback_config();
        config.reuse_address = false;
        let _first = UdpTransport::bind(&config).expect("first bind should succeed");

        let err = UdpTransport::bind(&config).expect_err("second bind should fail");
        assert!(matches!(err, TransportError::Bind { addr, .. } if addr == config.local_addr()));
    }
}
