//! Processor error types.

use shared_types::{CodecError, MessageType, StateStatus};
use thiserror::Error;
use tp_messaging::RoutingError;

/// A handler's verdict on one transaction.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApplyError {
    /// The transaction is invalid under family rules. Non-fatal: reported
    /// to the validator as a rejection and the processor carries on.
    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),

    /// The handler failed for reasons unrelated to transaction validity.
    #[error("Internal handler error: {0}")]
    Internal(String),
}

/// Errors surfaced to a context state operation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ContextError {
    /// The validator explicitly rejected the state operation.
    #[error("State operation rejected: {status:?}")]
    StateAccess {
        /// The remote-reported reason.
        status: StateStatus,
    },

    /// The exchange failed at the messaging layer (timeout, closed channel).
    #[error(transparent)]
    Routing(#[from] RoutingError),

    /// A payload failed to encode or decode.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// The reply carried a different message type than the request expects.
    #[error("Unexpected reply type: expected {expected:?}, got {actual:?}")]
    UnexpectedReply {
        /// The response type paired with the request.
        expected: MessageType,
        /// The type actually received.
        actual: MessageType,
    },
}

/// Errors from processor lifecycle operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProcessorError {
    /// The validator rejected a family registration.
    #[error("Registration rejected for family {family} version {version}")]
    RegistrationRejected {
        /// The rejected family name.
        family: String,
        /// The rejected family version.
        version: String,
    },

    /// A lifecycle exchange failed at the messaging layer.
    #[error(transparent)]
    Routing(#[from] RoutingError),

    /// A lifecycle payload failed to encode or decode.
    #[error(transparent)]
    Codec(#[from] CodecError),
}
