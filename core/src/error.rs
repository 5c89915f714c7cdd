//! Error Taxonomy
//!
//! Agent-side failures are always surfaced to the specific caller that
//! issued the failing call; they never silently vanish. Renderer-side
//! decode/render failures degrade to error events and never terminate the
//! dispatch loop - that policy lives in the renderer crate.

use std::time::Duration;

use crate::messages::MessageId;

/// Why a `request` or `send` call failed.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum RequestError {
    /// No reply arrived within the caller's deadline. The pending entry is
    /// removed before this surfaces, so a late reply is dropped.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The renderer subprocess exited or its pipe broke while the call was
    /// outstanding.
    #[error("transport closed: {0}")]
    TransportClosed(String),

    /// The restart budget is exhausted; the bridge will not recover.
    #[error("transport unavailable: {0}")]
    TransportUnavailable(String),

    /// The message could not be serialized; nothing reached the wire.
    #[error("failed to encode message: {0}")]
    Encoding(String),

    /// The renderer answered this request with an error event.
    #[error("renderer error: {0}")]
    Renderer(String),

    /// The reply payload did not have the shape the caller expected.
    #[error("unexpected reply payload: {0}")]
    BadReply(String),

    /// The correlation protocol was violated while issuing this request.
    #[error("protocol violation: {0}")]
    Protocol(String),
}

/// Violations of the correlation protocol. Logged, fatal only to the
/// affected request, never to the process.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ProtocolError {
    /// An id was registered while a request with the same id was still
    /// outstanding.
    #[error("duplicate request id {0}")]
    DuplicateId(MessageId),
}
