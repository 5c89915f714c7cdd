//! UI Messages
//!
//! Messages sent from the agent ("brain") process to the renderer. These
//! represent everything the agent can ask a terminal surface to display or
//! collect. The renderer has no business logic of its own - it renders what
//! it is told and reports back what the user did.
//!
//! # Wire shape
//!
//! One JSON object per line:
//!
//! ```json
//! {"kind": "confirm", "id": "req_...", "payload": {"message": "Delete?"}}
//! ```
//!
//! `id` is present iff the message expects a reply. Display-only kinds never
//! carry one. Unknown payload fields are ignored on decode so older renderers
//! keep working against newer agents.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier correlating a request with its eventual reply.
///
/// Ids are opaque strings; the bridge mints them from UUIDv4 so an id is
/// never reused while its request is outstanding.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl MessageId {
    /// Mint a fresh, globally unique id.
    pub fn new() -> Self {
        Self(format!("req_{}", uuid::Uuid::new_v4().simple()))
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One complete agent-to-renderer message: optional correlation id plus a
/// kind-tagged payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UiMessage {
    /// Correlation id; present iff this message expects a reply.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<MessageId>,
    /// The kind-tagged payload.
    #[serde(flatten)]
    pub body: UiBody,
}

impl UiMessage {
    /// A display-only message (no reply expected).
    pub fn display(body: UiBody) -> Self {
        Self { id: None, body }
    }

    /// A request message carrying a fresh id.
    pub fn request(body: UiBody) -> Self {
        Self {
            id: Some(MessageId::new()),
            body,
        }
    }
}

/// Every message kind the renderer understands.
///
/// Display kinds are fire-and-forget; interactive kinds
/// ([`UiBody::is_request`]) expect exactly one reply carrying the request id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum UiBody {
    /// Plain paragraph of text.
    Text(TextPayload),
    /// Markdown-flavored text (headings, bullets, inline code).
    Markdown(MarkdownPayload),
    /// Bordered, level-colored callout.
    Alert(AlertPayload),
    /// Progress bar; `total == 0` means indeterminate.
    Progress(ProgressPayload),
    /// Indeterminate activity spinner.
    Spinner(SpinnerPayload),
    /// Column-aligned data table.
    Table(TablePayload),
    /// Source listing in a bordered box.
    Code(CodePayload),
    /// Multi-field form (request/reply).
    Form(FormPayload),
    /// Yes/no confirmation (request/reply).
    Confirm(ConfirmPayload),
    /// Pick one or many options (request/reply).
    Select(SelectPayload),
    /// Single-line free text prompt (request/reply).
    Input(InputPayload),
    /// Tell the renderer to shut down.
    Quit(QuitPayload),
}

impl UiBody {
    /// Whether this kind expects a reply.
    pub fn is_request(&self) -> bool {
        matches!(
            self,
            Self::Form(_) | Self::Confirm(_) | Self::Select(_) | Self::Input(_)
        )
    }

    /// Stable kind name, as it appears on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Markdown(_) => "markdown",
            Self::Alert(_) => "alert",
            Self::Progress(_) => "progress",
            Self::Spinner(_) => "spinner",
            Self::Table(_) => "table",
            Self::Code(_) => "code",
            Self::Form(_) => "form",
            Self::Confirm(_) => "confirm",
            Self::Select(_) => "select",
            Self::Input(_) => "input",
            Self::Quit(_) => "quit",
        }
    }
}

/// Payload for [`UiBody::Text`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextPayload {
    /// The text to display.
    pub content: String,
}

/// Payload for [`UiBody::Markdown`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarkdownPayload {
    /// Markdown source.
    pub content: String,
}

/// Severity of an [`UiBody::Alert`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    /// Neutral information.
    #[default]
    Info,
    /// Something completed well.
    Success,
    /// Needs attention, not fatal.
    Warning,
    /// Something failed.
    Error,
}

/// Payload for [`UiBody::Alert`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AlertPayload {
    /// Severity, drives the border color.
    #[serde(default)]
    pub level: AlertLevel,
    /// Optional heading inside the border.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// The alert body.
    pub message: String,
}

/// Payload for [`UiBody::Progress`].
///
/// `current` is clamped to `[0, total]` at render time. A `total` of zero
/// means the work is unbounded and the renderer shows indeterminate activity
/// instead of a percentage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProgressPayload {
    /// Label above the bar; also keys replacement of an earlier bar.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Work completed so far.
    pub current: f64,
    /// Total work, or 0 for indeterminate.
    pub total: f64,
}

/// Payload for [`UiBody::Spinner`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpinnerPayload {
    /// Text shown next to the spinner glyph.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Payload for [`UiBody::Table`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TablePayload {
    /// Optional caption above the table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Header labels, one per column.
    pub columns: Vec<String>,
    /// Data rows; short rows render with empty trailing cells.
    pub rows: Vec<Vec<String>>,
}

/// Payload for [`UiBody::Code`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CodePayload {
    /// Optional title shown in the border.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Language tag, shown next to the title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// The source text, rendered verbatim (no re-wrapping).
    pub content: String,
}

/// Kind of a [`FormField`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Free-text entry.
    #[default]
    Text,
    /// Boolean toggle.
    Checkbox,
}

/// One field of a [`UiBody::Form`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FormField {
    /// Key under which the value is reported.
    pub name: String,
    /// Label shown to the user.
    pub label: String,
    /// Field kind.
    #[serde(default)]
    pub kind: FieldKind,
    /// Whether a text field must be non-empty to submit.
    #[serde(default)]
    pub required: bool,
    /// Hint shown while a text field is empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// Initial value: a string for text fields, a bool for checkboxes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
}

/// Payload for [`UiBody::Form`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FormPayload {
    /// Form heading.
    pub title: String,
    /// Optional prose under the heading.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// The fields, in display order.
    pub fields: Vec<FormField>,
    /// Submit button label (default "Submit").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submit_label: Option<String>,
    /// Cancel button label (default "Cancel").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel_label: Option<String>,
}

/// Payload for [`UiBody::Confirm`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConfirmPayload {
    /// The question to answer.
    pub message: String,
    /// Affirmative button label (default "Yes").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yes_label: Option<String>,
    /// Negative button label (default "No").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_label: Option<String>,
}

/// One choice in a [`UiBody::Select`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    /// Value reported back when chosen.
    pub value: String,
    /// Label shown to the user.
    pub label: String,
}

/// Payload for [`UiBody::Select`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SelectPayload {
    /// Optional heading above the list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// The choices, in display order.
    pub options: Vec<SelectOption>,
    /// Allow marking several options before submitting.
    #[serde(default)]
    pub multi: bool,
}

/// Payload for [`UiBody::Input`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InputPayload {
    /// Prompt shown above the entry line.
    pub prompt: String,
    /// Hint shown while the entry is empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// Mask the entered characters (passwords, tokens).
    #[serde(default)]
    pub secret: bool,
}

/// Payload for [`UiBody::Quit`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
pub struct QuitPayload {
    /// Optional goodbye line to show before exiting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
