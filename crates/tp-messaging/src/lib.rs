//! # Correlation Messaging Layer
//!
//! Multiplexes many concurrent logical request/response exchanges over one
//! physical, asynchronous, bidirectional channel.
//!
//! ## Routing Rules
//!
//! - Each inbound envelope goes to exactly one of: a waiting caller
//!   (matched by correlation id) or a registered dispatcher (matched by
//!   message type).
//! - The receive path never blocks on a caller or a handler: resolution is
//!   a oneshot send, dispatch is a spawned task.
//! - Duplicate, late, and unmatched replies are protocol anomalies: logged
//!   and counted, never raised, never delivered.

use std::time::Duration;

pub mod channel;
pub mod dispatch;
pub mod errors;
pub mod router;

// Re-export main types
pub use channel::Duplex;
pub use dispatch::InboundDispatcher;
pub use errors::RoutingError;
pub use router::CorrelationRouter;

/// Bound on how long a sent request waits for its reply.
pub const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_secs(30);

/// Frames buffered per channel direction before backpressure.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
