//! Renderer Events
//!
//! Events sent from the renderer back to the agent. The renderer reports
//! what happened - a reply to an outstanding request, or an error - and the
//! agent decides what it means.
//!
//! Reply payloads are kind-specific objects; the typed views here
//! ([`ConfirmReply`], [`FormReply`], [`SelectReply`], [`InputReply`]) parse
//! the raw payload a [`crate::bridge::RendererBridge::request`] call returns.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::messages::MessageId;

/// One complete renderer-to-agent event: optional correlation id plus a
/// kind-tagged payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RendererEvent {
    /// Id of the request this event answers, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<MessageId>,
    /// The kind-tagged payload.
    #[serde(flatten)]
    pub body: EventBody,
}

impl RendererEvent {
    /// A reply to the request identified by `id`.
    pub fn reply(id: MessageId, payload: serde_json::Value) -> Self {
        Self {
            id: Some(id),
            body: EventBody::Reply(payload),
        }
    }

    /// An error event, tagged with the offending request's id when known.
    pub fn error(id: Option<MessageId>, message: impl Into<String>) -> Self {
        Self {
            id,
            body: EventBody::Error(ErrorPayload {
                message: message.into(),
            }),
        }
    }
}

/// Every event kind the agent understands.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum EventBody {
    /// Reply to a request; the object shape depends on the request kind.
    Reply(serde_json::Value),
    /// The renderer could not process a message.
    Error(ErrorPayload),
}

/// Payload for [`EventBody::Error`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorPayload {
    /// Human-readable description of what went wrong.
    pub message: String,
}

/// Reply payload for a `confirm` request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConfirmReply {
    /// Whether the user chose the affirmative option.
    pub confirmed: bool,
}

/// Reply payload for a `form` request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
pub struct FormReply {
    /// Field name to submitted value (string for text, bool for checkbox).
    #[serde(default)]
    pub values: BTreeMap<String, serde_json::Value>,
    /// Whether the user cancelled instead of submitting.
    #[serde(default)]
    pub cancelled: bool,
}

/// Reply payload for a `select` request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
pub struct SelectReply {
    /// Chosen option values; one entry unless the request was multi.
    #[serde(default)]
    pub selected: Vec<String>,
    /// Whether the user dismissed without choosing.
    #[serde(default)]
    pub cancelled: bool,
}

/// Reply payload for an `input` request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
pub struct InputReply {
    /// The entered text; empty when cancelled.
    #[serde(default)]
    pub value: String,
    /// Whether the user dismissed without entering anything.
    #[serde(default)]
    pub cancelled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn reply_envelope_carries_id_and_payload() {
        let ev = RendererEvent::reply(MessageId("r1".into()), json!({"confirmed": true}));
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["kind"], "reply");
        assert_eq!(json["id"], "r1");
        assert_eq!(json["payload"]["confirmed"], true);
    }

    #[test]
    fn error_without_id_omits_the_field() {
        let ev = RendererEvent::error(None, "bad line");
        let json = serde_json::to_string(&ev).unwrap();
        assert!(!json.contains("\"id\""));
        assert!(json.contains("bad line"));
    }

    #[test]
    fn typed_replies_parse_from_raw_payloads() {
        let confirm: ConfirmReply = serde_json::from_value(json!({"confirmed": false})).unwrap();
        assert!(!confirm.confirmed);

        let form: FormReply = serde_json::from_value(json!({
            "values": {"name": "Ada", "subscribe": true},
            "cancelled": false
        }))
        .unwrap();
        assert_eq!(form.values["name"], "Ada");
        assert_eq!(form.values["subscribe"], true);

        let select: SelectReply =
            serde_json::from_value(json!({"selected": ["a", "b"]})).unwrap();
        assert_eq!(select.selected, vec!["a".to_string(), "b".to_string()]);
        assert!(!select.cancelled);
    }
}
