//! # Inbound Dispatch
//!
//! Data-driven dispatch for unsolicited inbound requests: the router maps a
//! message type to the dispatcher registered for it, rather than any
//! subclassing scheme, keeping dispatch testable in isolation.

use crate::router::CorrelationRouter;
use async_trait::async_trait;
use shared_types::Envelope;
use std::sync::Arc;

/// Receives unsolicited inbound envelopes of one registered message type.
///
/// Dispatch runs on its own spawned task; implementations may take as long
/// as they like without affecting the receive loop. The router handle is
/// passed in so implementations can issue their own correlated exchanges
/// and transmit replies.
#[async_trait]
pub trait InboundDispatcher: Send + Sync {
    /// Handle one inbound envelope.
    async fn dispatch(&self, router: Arc<CorrelationRouter>, envelope: Envelope);
}
