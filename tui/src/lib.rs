//! Limelight TUI - Terminal Renderer
//!
//! The renderer half of Limelight: a pure display surface driven entirely
//! by an agent process over stdin/stdout. It contains no decision logic -
//! it renders the messages it is told to render and reports what the user
//! did.
//!
//! # Two entry points
//!
//! - **Interactive** ([`app::App`]): the full dispatch loop - protocol
//!   messages, keyboard, and animation ticks multiplexed into a single
//!   state-owning task, painting with ratatui on `/dev/tty` while protocol
//!   replies flow back over stdout.
//! - **Headless** ([`headless`]): one message in, one rendered fragment
//!   out, then exit. Used to verify rendering without a terminal; output
//!   is byte-identical to the interactive render of the same message
//!   against a fresh state.
//!
//! # Module Overview
//!
//! - [`state`]: render state and the pure transform function
//! - [`views`]: one handler per UI primitive
//! - [`animation`]: spring physics driving transitions
//! - [`theme`]: palette registry and JSON theme files
//! - [`app`]: the interactive dispatch loop
//! - [`headless`]: the one-shot executor

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod animation;
pub mod app;
pub mod headless;
pub mod state;
pub mod theme;
pub mod views;

pub use animation::{Spring, SpringProfile};
pub use app::App;
pub use state::{render_fragment, transform, Block, Input, Modal, RenderState};
pub use theme::{Theme, ThemeRegistry};
