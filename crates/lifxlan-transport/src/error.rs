use std::net::SocketAddrV4;

/// Errors that can occur in datagram transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to create the underlying socket.
    #[error("failed to create udp socket: {0}")]
    Socket(std::io::Error),

    /// Failed to apply a socket option.
    #[error("failed to set socket option {option}: {source}")]
    SocketOption {
        option: &'static str,
        source: std::io::Error,
    },

    /// Failed to bind to the specified address.
    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: SocketAddrV4,
        source: std::io::Error,
    },

    /// Waiting for readability failed.
    #[error("failed to poll socket: {0}")]
    Poll(std::io::Error),

    /// Failed to transmit a datagram.
    #[error("failed to send datagram to {addr}: {source}")]
    Send {
        addr: SocketAddrV4,
        source: std::io::Error,
    },

    /// Failed to read a datagram that was reported readable.
    #[error("failed to receive datagram: {0}")]
    Recv(std::io::Error),

    /// Any other I/O error on the transport.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TransportError>;
