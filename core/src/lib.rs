//! Limelight Core - Agent-Side Generative-UI Protocol
//!
//! This crate is the agent ("brain") half of Limelight: it owns the wire
//! protocol, the request/reply correlation machinery, and the bridge that
//! launches and supervises the terminal renderer. It has **zero**
//! dependencies on ratatui, crossterm, or any other UI framework - the
//! renderer is a separate process, and this side only ever sees bytes.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      Agent process                        │
//! │   callers ──► RendererBridge ──► line codec ──► stdin ───┼──► renderer
//! │   callers ◄── CorrelationTable ◄── line codec ◄── stdout ┼──◄ renderer
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! One JSON object per line flows each way. A message that expects a reply
//! carries an id; the reply carries the same id; the correlation table
//! delivers it to the caller that is awaiting it. Everything else is
//! fire-and-forget.
//!
//! # Quick Start
//!
//! ```ignore
//! use limelight_core::{BridgeConfig, RendererBridge};
//!
//! #[tokio::main]
//! async fn main() {
//!     let bridge = RendererBridge::spawn(BridgeConfig::from_env());
//!
//!     bridge.send_text("Hello from the agent!").await.unwrap();
//!
//!     let answer = bridge.request_confirm("Delete everything?").await.unwrap();
//!     if answer.confirmed {
//!         // ...
//!     }
//!
//!     bridge.quit(Some("Bye!".into())).await.unwrap();
//!     bridge.shutdown().await;
//! }
//! ```
//!
//! # Module Overview
//!
//! - [`messages`]: agent-to-renderer message kinds and payloads
//! - [`events`]: renderer-to-agent replies and errors
//! - [`codec`]: the one-JSON-object-per-line wire codec
//! - [`correlation`]: pending-request table with atomic completion
//! - [`bridge`]: subprocess supervision and the `send`/`request` API
//! - [`error`]: the failure taxonomy surfaced to callers

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod bridge;
pub mod codec;
pub mod correlation;
pub mod error;
pub mod events;
pub mod messages;

pub use bridge::{BridgeConfig, BridgeState, RendererBridge};
pub use codec::{decode_line, encode_line, recover_id, CodecError};
pub use correlation::{CompletionHandle, CompletionResult, CorrelationTable};
pub use error::{ProtocolError, RequestError};
pub use events::{
    ConfirmReply, ErrorPayload, EventBody, FormReply, InputReply, RendererEvent, SelectReply,
};
pub use messages::{
    AlertLevel, AlertPayload, CodePayload, ConfirmPayload, FieldKind, FormField, FormPayload,
    InputPayload, MarkdownPayload, MessageId, ProgressPayload, QuitPayload, SelectOption,
    SelectPayload, SpinnerPayload, TablePayload, TextPayload, UiBody, UiMessage,
};
