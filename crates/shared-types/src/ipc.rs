//! # Channel Message Payloads
//!
//! Schemas for every request/response payload carried in an [`crate::Envelope`].
//!
//! ## Design Rules
//!
//! - Payloads never carry correlation ids; the envelope is authoritative.
//! - Every state operation is scoped by the `context_id` of the handler
//!   invocation that issued it.
//! - Addresses absent from a `StateGetResponse` were simply not set; the
//!   omission is not an error.

use crate::errors::CodecError;
use serde::{Deserialize, Serialize};

/// Encode a payload for embedding in an envelope.
pub fn encode<T: Serialize>(payload: &T) -> Result<Vec<u8>, CodecError> {
    bincode::serialize(payload).map_err(|e| CodecError::Encode(e.to_string()))
}

/// Decode a payload from envelope content.
pub fn decode<'a, T: Deserialize<'a>>(content: &'a [u8]) -> Result<T, CodecError> {
    bincode::deserialize(content).map_err(|e| CodecError::Decode(e.to_string()))
}

// =============================================================================
// STATE ACCESS
// =============================================================================

/// Outcome of a state operation, as reported by the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateStatus {
    /// The operation succeeded.
    Ok,
    /// An address was outside the requester's declared inputs/outputs.
    AuthorizationError,
    /// An address was structurally invalid.
    InvalidAddress,
}

/// One address/value pair in the global state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateEntry {
    /// The state address.
    pub address: String,
    /// The stored value. May be empty.
    pub data: Vec<u8>,
}

/// Reads state entries for a set of addresses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateGetRequest {
    /// Scopes the read to one handler invocation.
    pub context_id: String,
    /// Addresses to read, in request order.
    pub addresses: Vec<String>,
}

/// Entries found for a [`StateGetRequest`]. Unset addresses are omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateGetResponse {
    /// Operation outcome.
    pub status: StateStatus,
    /// The entries that exist.
    pub entries: Vec<StateEntry>,
}

/// Writes state entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSetRequest {
    /// Scopes the write to one handler invocation.
    pub context_id: String,
    /// Entries to write.
    pub entries: Vec<StateEntry>,
}

/// Acknowledges a [`StateSetRequest`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSetResponse {
    /// Operation outcome.
    pub status: StateStatus,
}

/// Deletes state entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateDeleteRequest {
    /// Scopes the delete to one handler invocation.
    pub context_id: String,
    /// Addresses to delete.
    pub addresses: Vec<String>,
}

/// Acknowledges a [`StateDeleteRequest`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateDeleteResponse {
    /// Operation outcome.
    pub status: StateStatus,
}

// =============================================================================
// EXECUTION EVENTS
// =============================================================================

/// An application event emitted during transaction execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Family-defined event type.
    pub event_type: String,
    /// Key/value attributes for subscription filtering.
    pub attributes: Vec<(String, String)>,
    /// Opaque event data.
    pub data: Vec<u8>,
}

/// Appends an event to the execution result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventAddRequest {
    /// Scopes the event to one handler invocation.
    pub context_id: String,
    /// The event to record.
    pub event: Event,
}

/// Acknowledges an [`EventAddRequest`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventAddResponse {
    /// Operation outcome.
    pub status: StateStatus,
}

// =============================================================================
// TRANSACTION PROCESSING
// =============================================================================

/// Transaction metadata accompanying a process request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionHeader {
    /// Transaction family name.
    pub family_name: String,
    /// Transaction family version.
    pub family_version: String,
    /// Hex-encoded public key of the transaction signer.
    pub signer_public_key: String,
    /// State addresses this transaction may read.
    pub inputs: Vec<String>,
    /// State addresses this transaction may write.
    pub outputs: Vec<String>,
}

/// Asks the processor to execute one transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessRequest {
    /// Transaction metadata.
    pub header: TransactionHeader,
    /// Family-defined transaction payload.
    pub payload: Vec<u8>,
    /// Hex-encoded signature over the transaction.
    pub signature: String,
    /// The state context created by the validator for this execution.
    pub context_id: String,
}

/// Execution outcome classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessStatus {
    /// The transaction was applied.
    Ok,
    /// The handler judged the transaction invalid. Non-fatal.
    InvalidTransaction,
    /// The handler failed unexpectedly.
    InternalError,
}

/// Reports the outcome of a [`ProcessRequest`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessResponse {
    /// Execution outcome.
    pub status: ProcessStatus,
    /// Human-readable detail; empty on success.
    pub message: String,
}

// =============================================================================
// PROCESSOR LIFECYCLE
// =============================================================================

/// Announces a transaction family/version this processor handles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    /// Transaction family name.
    pub family: String,
    /// Transaction family version.
    pub version: String,
    /// Address namespaces the family operates under.
    pub namespaces: Vec<String>,
}

/// Registration outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistrationStatus {
    /// The registration was accepted.
    Ok,
    /// The validator rejected the registration.
    Error,
}

/// Acknowledges a [`RegisterRequest`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    /// Registration outcome.
    pub status: RegistrationStatus,
}

/// Withdraws all of this processor's registrations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnregisterRequest {}

/// Acknowledges an [`UnregisterRequest`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnregisterResponse {
    /// Unregistration outcome.
    pub status: RegistrationStatus,
}

/// Keepalive probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PingRequest {}

/// Keepalive acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PingResponse {}
