//! Headless Executor
//!
//! The non-interactive entry point: read exactly one message from stdin,
//! run one transform against a fresh state, print the rendered fragment to
//! stdout, exit. No tick loop, no terminal, no interactivity.
//!
//! The output is byte-identical to the fragment the interactive loop would
//! render for the same message against a fresh state, because both paths
//! share [`crate::state::render_fragment`]. That parity is what makes this
//! mode usable for automated verification of rendering.

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use limelight_core::{codec, UiMessage};

use crate::state::{render_fragment, transform, Input, RenderState};
use crate::theme::Theme;
use crate::views::line_text;

/// Errors that fail a headless run (and the process exit status).
#[derive(Debug, thiserror::Error)]
pub enum HeadlessError {
    /// Standard input closed before a message arrived.
    #[error("no input message")]
    NoInput,

    /// The input line was not a well-formed message.
    #[error(transparent)]
    Decode(#[from] codec::CodecError),

    /// Reading stdin or writing stdout failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Render one message from `stdin` to `stdout`.
pub async fn run(theme: &Theme, width: u16) -> Result<(), HeadlessError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let line = lines.next_line().await?.ok_or(HeadlessError::NoInput)?;

    let output = render_message(&line, theme, width)?;

    let mut stdout = tokio::io::stdout();
    stdout.write_all(output.as_bytes()).await?;
    stdout.flush().await?;
    Ok(())
}

/// Decode one line and render its fragment to text, one line per row with
/// a trailing newline.
pub fn render_message(line: &str, theme: &Theme, width: u16) -> Result<String, HeadlessError> {
    let msg: UiMessage = codec::decode_line(line)?;
    let (state, _events) = transform(RenderState::new(), Input::Message(msg));
    Ok(fragment_text(&state, theme, width))
}

/// Flatten a state's fragment to plain text.
pub fn fragment_text(state: &RenderState, theme: &Theme, width: u16) -> String {
    let mut out = String::new();
    for line in render_fragment(state, theme, width) {
        out.push_str(&line_text(&line));
        out.push('\n');
    }
    out
}
