//! # Correlation Router
//!
//! Owns the send half of the validator channel and the table of pending
//! request/response exchanges.
//!
//! ## Lifecycle of an Exchange
//!
//! 1. `send` generates a fresh correlation id, registers a single-resolution
//!    slot, and transmits the frame.
//! 2. The caller suspends on the slot under a bounded timeout; only that
//!    caller suspends, never the receive path.
//! 3. `route` resolves the slot exactly once on the matching reply and
//!    removes it. A timeout removes it first; whichever side loses the race
//!    finds the slot gone and the reply is absorbed as an anomaly or a
//!    silent discard.

use crate::dispatch::InboundDispatcher;
use crate::errors::RoutingError;
use crate::DEFAULT_REPLY_TIMEOUT;
use shared_types::{Envelope, MessageType};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock, Weak};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

/// Demultiplexes inbound envelopes to pending callers and registered
/// dispatchers, and manages the outbound send + await-reply lifecycle.
pub struct CorrelationRouter {
    /// Send half of the validator channel. Exclusively router-owned.
    outbound: mpsc::Sender<Vec<u8>>,

    /// Pending exchanges: correlation id to its single-resolution slot.
    pending: Mutex<HashMap<uuid::Uuid, oneshot::Sender<Envelope>>>,

    /// Dispatchers for unsolicited inbound requests, by message type.
    dispatchers: RwLock<HashMap<MessageType, Arc<dyn InboundDispatcher>>>,

    /// Bound on how long `send` waits for a reply.
    reply_timeout: Duration,

    /// Count of duplicate/late/unmatched/undecodable inbound traffic.
    anomalies: AtomicU64,

    /// Self-handle passed to spawned dispatchers.
    weak_self: Weak<CorrelationRouter>,
}

impl CorrelationRouter {
    /// Create a router over the given outbound frame stream with the
    /// default reply timeout.
    #[must_use]
    pub fn new(outbound: mpsc::Sender<Vec<u8>>) -> Arc<Self> {
        Self::with_reply_timeout(outbound, DEFAULT_REPLY_TIMEOUT)
    }

    /// Create a router with a custom reply timeout.
    #[must_use]
    pub fn with_reply_timeout(
        outbound: mpsc::Sender<Vec<u8>>,
        reply_timeout: Duration,
    ) -> Arc<Self> {
        Arc::new_cyclic(|weak_self| Self {
            outbound,
            pending: Mutex::new(HashMap::new()),
            dispatchers: RwLock::new(HashMap::new()),
            reply_timeout,
            anomalies: AtomicU64::new(0),
            weak_self: weak_self.clone(),
        })
    }

    /// Register the dispatcher for one unsolicited message type.
    ///
    /// Re-registering a type replaces the previous dispatcher.
    pub fn register_dispatcher(
        &self,
        message_type: MessageType,
        dispatcher: Arc<dyn InboundDispatcher>,
    ) {
        self.dispatchers
            .write()
            .unwrap()
            .insert(message_type, dispatcher);
    }

    /// Send a request and await its single matching reply.
    ///
    /// A fresh correlation id is generated and registered before
    /// transmission, so the reply cannot race the registration. Fails with
    /// [`RoutingError::Timeout`] if no reply arrives within the bound; the
    /// pending entry is removed so a late reply is absorbed as an anomaly.
    pub async fn send(
        &self,
        message_type: MessageType,
        content: Vec<u8>,
    ) -> Result<Envelope, RoutingError> {
        let envelope = Envelope::request(message_type, content);
        let correlation_id = envelope.correlation_id;
        let frame = envelope.to_bytes()?;

        let (slot, reply) = oneshot::channel();
        self.pending.lock().unwrap().insert(correlation_id, slot);

        if self.outbound.send(frame).await.is_err() {
            self.pending.lock().unwrap().remove(&correlation_id);
            return Err(RoutingError::ChannelClosed);
        }

        debug!(%correlation_id, ?message_type, "Request sent");

        match tokio::time::timeout(self.reply_timeout, reply).await {
            Ok(Ok(envelope)) => Ok(envelope),
            // The router (and its pending table) was dropped mid-exchange.
            Ok(Err(_)) => Err(RoutingError::ChannelClosed),
            Err(_) => {
                self.pending.lock().unwrap().remove(&correlation_id);
                debug!(%correlation_id, "Reply timed out, pending entry removed");
                Err(RoutingError::Timeout {
                    correlation_id,
                    after: self.reply_timeout,
                })
            }
        }
    }

    /// Transmit a reply to an inbound request, reusing its correlation id.
    ///
    /// No pending entry is registered; replies expect no answer.
    pub async fn reply(
        &self,
        original: &Envelope,
        message_type: MessageType,
        content: Vec<u8>,
    ) -> Result<(), RoutingError> {
        let envelope = original.wrap(message_type, content);
        let frame = envelope.to_bytes()?;

        self.outbound
            .send(frame)
            .await
            .map_err(|_| RoutingError::ChannelClosed)
    }

    /// Decode one inbound frame and route the envelope.
    ///
    /// An undecodable frame is an anomaly, not a failure: the receive loop
    /// carries on.
    pub fn route_frame(&self, frame: &[u8]) {
        match Envelope::from_bytes(frame) {
            Ok(envelope) => self.route(envelope),
            Err(error) => {
                self.anomalies.fetch_add(1, Ordering::Relaxed);
                warn!(%error, frame_len = frame.len(), "Undecodable inbound frame discarded");
            }
        }
    }

    /// Route one inbound envelope to exactly one destination.
    ///
    /// Never blocks: resolving a pending caller is a oneshot send, and
    /// dispatching an unsolicited request is a fire-and-forget spawn.
    pub fn route(&self, envelope: Envelope) {
        let resolved = self
            .pending
            .lock()
            .unwrap()
            .remove(&envelope.correlation_id);

        if let Some(slot) = resolved {
            // The slot is consumed exactly once. If the caller abandoned
            // its await without timing out, the send fails and the reply
            // is discarded without error.
            if let Err(unclaimed) = slot.send(envelope) {
                debug!(
                    correlation_id = %unclaimed.correlation_id,
                    "Reply for abandoned exchange discarded"
                );
            }
            return;
        }

        if envelope.message_type.is_response() {
            // Duplicate reply, or a reply that lost the race against its
            // caller's timeout. Belongs to nobody.
            self.anomalies.fetch_add(1, Ordering::Relaxed);
            warn!(
                correlation_id = %envelope.correlation_id,
                message_type = ?envelope.message_type,
                "Unmatched reply discarded"
            );
            return;
        }

        let dispatcher = self
            .dispatchers
            .read()
            .unwrap()
            .get(&envelope.message_type)
            .cloned();

        match dispatcher {
            Some(dispatcher) => {
                // route is only reachable through a live Arc, so the
                // upgrade cannot fail.
                let Some(router) = self.weak_self.upgrade() else {
                    return;
                };
                tokio::spawn(async move {
                    dispatcher.dispatch(router, envelope).await;
                });
            }
            None => {
                self.anomalies.fetch_add(1, Ordering::Relaxed);
                warn!(
                    correlation_id = %envelope.correlation_id,
                    message_type = ?envelope.message_type,
                    "No dispatcher registered for inbound request"
                );
            }
        }
    }

    /// Number of protocol anomalies observed since construction.
    #[must_use]
    pub fn anomaly_count(&self) -> u64 {
        self.anomalies.load(Ordering::Relaxed)
    }

    /// Number of exchanges currently awaiting a reply.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.lock().unwrap().len()
    }
}
