//! # Transaction Processor
//!
//! The processing side of the validator channel: a single receive loop, a
//! family/version handler registry, and a per-execution state context.
//!
//! ## Execution Model
//!
//! - One receive loop is the only reader of the channel; it hands every
//!   frame to the correlation router and nothing else.
//! - Handlers run as independently scheduled tasks and may run concurrently
//!   with each other and with the loop.
//! - A handler's [`TransactionContext`] calls are independent send/await
//!   exchanges that suspend only that handler.
//! - Failures local to one handler invocation are reported to the validator
//!   and never escalate to the loop or to unrelated in-flight work.

pub mod context;
pub mod errors;
pub mod handler;
pub mod processor;

pub use context::TransactionContext;
pub use errors::{ApplyError, ContextError, ProcessorError};
pub use handler::TransactionHandler;
pub use processor::{ProcessorHandle, TransactionProcessor};
