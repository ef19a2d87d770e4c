/// Errors that can occur in client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level error (socket setup, poll, send or receive).
    #[error("transport error: {0}")]
    Transport(#[from] lifxlan_transport::TransportError),

    /// Every non-zero sequence number is held by a pending send.
    #[error("all 255 sequence numbers are pending")]
    SequenceExhausted,
}

pub type Result<T> = std::result::Result<T, ClientError>;
