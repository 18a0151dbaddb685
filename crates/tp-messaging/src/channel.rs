//! # In-Memory Duplex Channel
//!
//! The transport model this crate routes over: two directed streams of
//! framed binary messages. Production deployments substitute a socket-backed
//! pair with the same shape; tests hold the far side directly and play the
//! validator.

use crate::DEFAULT_CHANNEL_CAPACITY;
use tokio::sync::mpsc;

/// One side of a bidirectional framed-message channel.
///
/// The send half is owned exclusively by the [`crate::CorrelationRouter`];
/// the receive half by the processor's receive loop. Neither is ever handed
/// to contexts or handlers.
pub struct Duplex {
    /// Frames travelling to the far side.
    pub outbound: mpsc::Sender<Vec<u8>>,
    /// Frames arriving from the far side.
    pub inbound: mpsc::Receiver<Vec<u8>>,
}

impl Duplex {
    /// Create a connected pair with the default capacity.
    #[must_use]
    pub fn pair() -> (Self, Self) {
        Self::pair_with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a connected pair buffering up to `capacity` frames per
    /// direction.
    #[must_use]
    pub fn pair_with_capacity(capacity: usize) -> (Self, Self) {
        let (near_tx, far_rx) = mpsc::channel(capacity);
        let (far_tx, near_rx) = mpsc::channel(capacity);

        (
            Self {
                outbound: near_tx,
                inbound: near_rx,
            },
            Self {
                outbound: far_tx,
                inbound: far_rx,
            },
        )
    }
}
