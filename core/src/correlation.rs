//! Correlation Table
//!
//! Maps outstanding request ids to the completion handle of the caller
//! awaiting the reply. Owned exclusively by the bridge: the send path
//! registers entries, the read path completes them, and removal is atomic
//! with lookup so only one side can ever resolve a given request.
//!
//! A reply for an id that is no longer registered is the normal aftermath
//! of a client-side timeout; it is logged at debug level and dropped.

use dashmap::DashMap;
use tokio::sync::oneshot;

use crate::error::{ProtocolError, RequestError};
use crate::messages::MessageId;

/// What a pending request eventually resolves to.
pub type CompletionResult = Result<serde_json::Value, RequestError>;

/// Receives the completion of one registered request.
pub type CompletionHandle = oneshot::Receiver<CompletionResult>;

/// The table of outstanding requests.
#[derive(Debug, Default)]
pub struct CorrelationTable {
    entries: DashMap<MessageId, oneshot::Sender<CompletionResult>>,
}

impl CorrelationTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an outstanding request and return the handle its caller
    /// awaits. Fails if the id is already registered - a protocol violation
    /// fatal to this request only.
    pub fn register(&self, id: &MessageId) -> Result<CompletionHandle, ProtocolError> {
        match self.entries.entry(id.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                Err(ProtocolError::DuplicateId(id.clone()))
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                let (tx, rx) = oneshot::channel();
                slot.insert(tx);
                Ok(rx)
            }
        }
    }

    /// Resolve and remove the matching entry. Returns false (after a debug
    /// log) when the id is unknown, which happens when a reply lands after
    /// its caller already timed out.
    pub fn complete(&self, id: &MessageId, result: CompletionResult) -> bool {
        match self.entries.remove(id) {
            Some((_, tx)) => {
                if tx.send(result).is_err() {
                    tracing::debug!(id = %id, "completion receiver dropped before delivery");
                }
                true
            }
            None => {
                tracing::debug!(id = %id, "dropping reply for unknown id");
                false
            }
        }
    }

    /// Remove an entry without completing it. Used by the timeout path so a
    /// late reply finds nothing.
    pub fn remove(&self, id: &MessageId) -> bool {
        self.entries.remove(id).is_some()
    }

    /// Complete every outstanding entry with a transport-closed error.
    pub fn cancel_all(&self, reason: &str) {
        let ids: Vec<MessageId> = self.entries.iter().map(|e| e.key().clone()).collect();
        for id in ids {
            if let Some((_, tx)) = self.entries.remove(&id) {
                let _ = tx.send(Err(RequestError::TransportClosed(reason.to_string())));
            }
        }
    }

    /// Number of outstanding requests.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no requests are outstanding.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[tokio::test]
    async fn complete_resolves_the_registered_caller() {
        let table = CorrelationTable::new();
        let id = MessageId("r1".into());
        let rx = table.register(&id).unwrap();

        assert!(table.complete(&id, Ok(json!({"confirmed": true}))));
        let result = rx.await.unwrap().unwrap();
        assert_eq!(result, json!({"confirmed": true}));
        assert!(table.is_empty());
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let table = CorrelationTable::new();
        let id = MessageId("r1".into());
        let _rx = table.register(&id).unwrap();

        let err = table.register(&id).unwrap_err();
        assert_eq!(err, ProtocolError::DuplicateId(id.clone()));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn completing_an_unknown_id_is_a_quiet_no_op() {
        let table = CorrelationTable::new();
        assert!(!table.complete(&MessageId("ghost".into()), Ok(json!({}))));
    }

    #[tokio::test]
    async fn cancel_all_fails_every_pending_entry() {
        let table = CorrelationTable::new();
        let rx1 = table.register(&MessageId("r1".into())).unwrap();
        let rx2 = table.register(&MessageId("r2".into())).unwrap();

        table.cancel_all("transport closed");
        for rx in [rx1, rx2] {
            match rx.await.unwrap() {
                Err(RequestError::TransportClosed(reason)) => {
                    assert_eq!(reason, "transport closed");
                }
                other => panic!("expected TransportClosed, got {other:?}"),
            }
        }
        assert!(table.is_empty());
    }

    #[test]
    fn remove_then_complete_drops_the_late_reply() {
        let table = CorrelationTable::new();
        let id = MessageId("r1".into());
        let _rx = table.register(&id).unwrap();

        assert!(table.remove(&id));
        assert!(!table.complete(&id, Ok(json!({"confirmed": true}))));
        assert!(table.is_empty());
    }
}
