//! Routing error types.

use shared_types::CodecError;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced to a caller awaiting a correlated reply.
///
/// Protocol anomalies (duplicate/late/unmatched replies) are deliberately
/// not represented here: they belong to no specific caller and are only
/// logged and counted by the router.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RoutingError {
    /// No reply arrived within the configured bound.
    #[error("No reply for correlation {correlation_id} within {after:?}")]
    Timeout {
        /// The correlation id of the abandoned exchange.
        correlation_id: Uuid,
        /// The bound that elapsed.
        after: Duration,
    },

    /// The transport was closed before or during the exchange.
    #[error("Validator channel closed")]
    ChannelClosed,

    /// An envelope or payload failed to encode.
    #[error("Wire codec failure: {0}")]
    Codec(#[from] CodecError),
}
