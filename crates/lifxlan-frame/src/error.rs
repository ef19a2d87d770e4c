/// Errors that can occur while splitting a datagram into header and payload.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FrameError {
    /// The datagram is shorter than the fixed frame header.
    #[error("datagram too short for frame header ({len} bytes, need {min})")]
    Truncated { len: usize, min: usize },

    /// Header plus payload would exceed the maximum packet size.
    #[error("packet too large ({size} bytes, max {max})")]
    PacketTooLarge { size: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, FrameError>;
