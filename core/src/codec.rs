//! Line Codec
//!
//! Wire format for agent-renderer messages: one JSON object per line of
//! UTF-8 text, newline-terminated. Compact JSON encoding escapes every
//! control character, so an encoded message can never span lines, and
//! decoding one line never has to wait for more input.
//!
//! Decoding is total over arbitrary input - a malformed line is a
//! [`CodecError::Decode`], never a panic. Unknown payload fields are
//! ignored for forward compatibility; an unknown `kind` or a missing
//! required field fails the decode.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::messages::MessageId;

/// Errors from the line codec.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The value could not be represented as a JSON line.
    #[error("failed to encode message: {0}")]
    Encode(#[source] serde_json::Error),

    /// The line is not a well-formed message of the expected type.
    #[error("failed to decode line: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Encode a message to a single line of compact JSON (no trailing newline;
/// the writer appends the terminator).
pub fn encode_line<T: Serialize>(msg: &T) -> Result<String, CodecError> {
    let line = serde_json::to_string(msg).map_err(CodecError::Encode)?;
    debug_assert!(!line.contains('\n'));
    Ok(line)
}

/// Decode one line into a message.
pub fn decode_line<T: DeserializeOwned>(line: &str) -> Result<T, CodecError> {
    serde_json::from_str(line.trim_end_matches(['\r', '\n'])).map_err(CodecError::Decode)
}

/// Pull the envelope `id` out of a line that failed full decoding, so an
/// error event can still be tagged with the request it answers.
pub fn recover_id(line: &str) -> Option<MessageId> {
    let value: serde_json::Value = serde_json::from_str(line).ok()?;
    value
        .get("id")
        .and_then(|id| id.as_str())
        .map(|id| MessageId(id.to_string()))
}
