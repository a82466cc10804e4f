use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

/// Failures seen by the sender and viewer clients.
#[derive(Debug)]
pub enum ClientError {
    Connect(tokio_tungstenite::tungstenite::Error),
    Socket(tokio_tungstenite::tungstenite::Error),
    Decode(serde_json::Error),
    Utf8(std::str::Utf8Error),
}

impl Display for ClientError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::Connect(e) => write!(f, "Unable to connect to relay: {}", e),
            ClientError::Socket(e) => write!(f, "WebSocket error: {}", e),
            ClientError::Decode(e) => write!(f, "Error parsing WebSocket message: {}", e),
            ClientError::Utf8(e) => write!(f, "Binary message is not valid UTF-8: {}", e),
        }
    }
}

impl Error for ClientError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ClientError::Connect(e) | ClientError::Socket(e) => Some(e),
            ClientError::Decode(e) => Some(e),
            ClientError::Utf8(e) => Some(e),
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::Decode(e)
    }
}

impl From<std::str::Utf8Error> for ClientError {
    fn from(e: std::str::Utf8Error) -> Self {
        ClientError::Utf8(e)
    }
}

/// Reasons a position source could not produce a fix.
#[derive(Debug, Clone, PartialEq)]
pub enum PositionError {
    PermissionDenied,
    Unavailable(String),
    Unsupported,
}

impl Display for PositionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PositionError::PermissionDenied => write!(f, "permission denied"),
            PositionError::Unavailable(reason) => write!(f, "position unavailable: {}", reason),
            PositionError::Unsupported => write!(f, "position source not supported"),
        }
    }
}

impl Error for PositionError {}
