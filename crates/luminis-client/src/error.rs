use luminis_game::WireError;
use thiserror::Error;

/// Errors that end a session. Decision-routine failures and timeouts never surface here.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("connection error: {0}")]
    Connection(#[from] std::io::Error),

    #[error("unrecognized signal received from server: {token:?}")]
    Protocol { token: String },

    #[error("{token} received before the game was set up")]
    OutOfOrder { token: String },

    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    #[error("failed to decode server payload: {0}")]
    Decode(#[from] WireError),

    #[error("server closed the connection")]
    Closed,
}
