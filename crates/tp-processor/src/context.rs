//! # Transaction Context
//!
//! A per-execution facade over the validator's state: reads, writes,
//! deletes, and events, each implemented as one correlated round trip
//! through the router.
//!
//! A context is bound to one `context_id` for the lifetime of one handler
//! invocation; every operation it issues is tagged with that id so the
//! validator scopes access to the declared inputs/outputs.

use crate::errors::ContextError;
use shared_types::{
    ipc, Envelope, Event, EventAddRequest, EventAddResponse, MessageType, StateDeleteRequest,
    StateDeleteResponse, StateEntry, StateGetRequest, StateGetResponse, StateSetRequest,
    StateSetResponse, StateStatus,
};
use std::collections::HashMap;
use std::sync::Arc;
use tp_messaging::CorrelationRouter;
use tracing::debug;

/// State access scoped to one transaction execution.
///
/// Cheap to clone conceptually but deliberately not `Clone`: one context
/// belongs to one handler invocation. Concurrent calls on the same context
/// are independent exchanges and may resolve in any order.
pub struct TransactionContext {
    router: Arc<CorrelationRouter>,
    context_id: String,
}

impl TransactionContext {
    /// Bind a context to the router and the validator-issued context id.
    #[must_use]
    pub fn new(router: Arc<CorrelationRouter>, context_id: impl Into<String>) -> Self {
        Self {
            router,
            context_id: context_id.into(),
        }
    }

    /// The validator-issued id scoping this context's operations.
    #[must_use]
    pub fn context_id(&self) -> &str {
        &self.context_id
    }

    /// Read the entries at the given addresses.
    ///
    /// Addresses with no entry in the ledger are omitted from the result;
    /// the omission is not an error.
    pub async fn get_state(
        &self,
        addresses: &[String],
    ) -> Result<HashMap<String, Vec<u8>>, ContextError> {
        let request = StateGetRequest {
            context_id: self.context_id.clone(),
            addresses: addresses.to_vec(),
        };

        let reply = self
            .round_trip(MessageType::StateGetRequest, ipc::encode(&request)?)
            .await?;
        let response: StateGetResponse = ipc::decode(&reply.content)?;
        check_status(response.status)?;

        debug!(
            context_id = %self.context_id,
            requested = addresses.len(),
            found = response.entries.len(),
            "State read complete"
        );

        Ok(response
            .entries
            .into_iter()
            .map(|entry| (entry.address, entry.data))
            .collect())
    }

    /// Write the given entries.
    pub async fn set_state(&self, entries: Vec<StateEntry>) -> Result<(), ContextError> {
        let request = StateSetRequest {
            context_id: self.context_id.clone(),
            entries,
        };

        let reply = self
            .round_trip(MessageType::StateSetRequest, ipc::encode(&request)?)
            .await?;
        let response: StateSetResponse = ipc::decode(&reply.content)?;
        check_status(response.status)
    }

    /// Delete the entries at the given addresses.
    pub async fn delete_state(&self, addresses: &[String]) -> Result<(), ContextError> {
        let request = StateDeleteRequest {
            context_id: self.context_id.clone(),
            addresses: addresses.to_vec(),
        };

        let reply = self
            .round_trip(MessageType::StateDeleteRequest, ipc::encode(&request)?)
            .await?;
        let response: StateDeleteResponse = ipc::decode(&reply.content)?;
        check_status(response.status)
    }

    /// Append an execution event to the transaction receipt.
    pub async fn add_event(&self, event: Event) -> Result<(), ContextError> {
        let request = EventAddRequest {
            context_id: self.context_id.clone(),
            event,
        };

        let reply = self
            .round_trip(MessageType::EventAddRequest, ipc::encode(&request)?)
            .await?;
        let response: EventAddResponse = ipc::decode(&reply.content)?;
        check_status(response.status)
    }

    /// One send/await-reply exchange, with the reply type validated against
    /// the request type's expected pairing.
    async fn round_trip(
        &self,
        message_type: MessageType,
        content: Vec<u8>,
    ) -> Result<Envelope, ContextError> {
        let reply = self.router.send(message_type, content).await?;

        let expected = message_type
            .response_type()
            .unwrap_or(message_type);
        if reply.message_type != expected {
            return Err(ContextError::UnexpectedReply {
                expected,
                actual: reply.message_type,
            });
        }

        Ok(reply)
    }
}

/// Map a non-`Ok` remote status to the error surfaced to the caller.
fn check_status(status: StateStatus) -> Result<(), ContextError> {
    match status {
        StateStatus::Ok => Ok(()),
        other => Err(ContextError::StateAccess { status: other }),
    }
}
