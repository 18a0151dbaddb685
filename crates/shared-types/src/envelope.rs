//! # Message Envelope
//!
//! The universal wrapper for all validator-channel traffic.
//!
//! ## Correlation Properties
//!
//! - **Requests** generate a fresh v4 UUID as `correlation_id`.
//! - **Responses** echo the `correlation_id` of the request they answer.
//! - At most one pending request exists per id at any time; ids are never
//!   reused while outstanding.

use crate::errors::CodecError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Registry of every message type carried over the validator channel.
///
/// Request/response pairing is data-driven: a request type maps to exactly
/// one response type via [`MessageType::response_type`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageType {
    /// Keepalive probe sent by the validator.
    PingRequest,
    /// Keepalive acknowledgement.
    PingResponse,
    /// Announces a transaction family/version this processor handles.
    RegisterRequest,
    /// Registration acknowledgement.
    RegisterResponse,
    /// Withdraws all registrations before shutdown.
    UnregisterRequest,
    /// Unregistration acknowledgement.
    UnregisterResponse,
    /// Asks the processor to execute one transaction.
    ProcessRequest,
    /// Reports the execution outcome.
    ProcessResponse,
    /// Reads state entries for a set of addresses.
    StateGetRequest,
    /// Returns the entries found.
    StateGetResponse,
    /// Writes state entries.
    StateSetRequest,
    /// Write acknowledgement.
    StateSetResponse,
    /// Deletes state entries.
    StateDeleteRequest,
    /// Delete acknowledgement.
    StateDeleteResponse,
    /// Appends an execution event.
    EventAddRequest,
    /// Event acknowledgement.
    EventAddResponse,
}

impl MessageType {
    /// Returns true if this type answers a prior request.
    ///
    /// Used by the router to distinguish a late/duplicate reply (anomaly)
    /// from an unsolicited inbound request (handler dispatch).
    #[must_use]
    pub fn is_response(self) -> bool {
        matches!(
            self,
            Self::PingResponse
                | Self::RegisterResponse
                | Self::UnregisterResponse
                | Self::ProcessResponse
                | Self::StateGetResponse
                | Self::StateSetResponse
                | Self::StateDeleteResponse
                | Self::EventAddResponse
        )
    }

    /// The response type expected for this request type, or `None` if this
    /// type is itself a response.
    #[must_use]
    pub fn response_type(self) -> Option<MessageType> {
        match self {
            Self::PingRequest => Some(Self::PingResponse),
            Self::RegisterRequest => Some(Self::RegisterResponse),
            Self::UnregisterRequest => Some(Self::UnregisterResponse),
            Self::ProcessRequest => Some(Self::ProcessResponse),
            Self::StateGetRequest => Some(Self::StateGetResponse),
            Self::StateSetRequest => Some(Self::StateSetResponse),
            Self::StateDeleteRequest => Some(Self::StateDeleteResponse),
            Self::EventAddRequest => Some(Self::EventAddResponse),
            _ => None,
        }
    }
}

/// One framed message on the validator channel.
///
/// The `content` is an opaque bincode-encoded payload; its schema is
/// determined by `message_type` (see [`crate::ipc`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Discriminates the payload schema and routing class.
    pub message_type: MessageType,

    /// Pairs a request with its single eventual reply.
    pub correlation_id: Uuid,

    /// Bincode-encoded payload.
    pub content: Vec<u8>,
}

impl Envelope {
    /// Build a request envelope with a freshly generated correlation id.
    #[must_use]
    pub fn request(message_type: MessageType, content: Vec<u8>) -> Self {
        Self {
            message_type,
            correlation_id: Uuid::new_v4(),
            content,
        }
    }

    /// Build a reply envelope reusing this envelope's correlation id.
    #[must_use]
    pub fn wrap(&self, message_type: MessageType, content: Vec<u8>) -> Self {
        Self {
            message_type,
            correlation_id: self.correlation_id,
            content,
        }
    }

    /// Encode to a channel frame.
    pub fn to_bytes(&self) -> Result<Vec<u8>, CodecError> {
        bincode::serialize(self).map_err(|e| CodecError::Encode(e.to_string()))
    }

    /// Decode from a channel frame.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        bincode::deserialize(bytes).map_err(|e| CodecError::Decode(e.to_string()))
    }
}
