//! # Shared Types Crate
//!
//! Wire-level types shared between the messaging and processor crates.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: every type that crosses the validator
//!   channel is defined here.
//! - **Envelope-Only Correlation**: the `Envelope` is the sole wrapper for
//!   channel traffic; payloads never carry their own correlation ids.
//! - **No I/O**: this crate is pure data. Transport and routing live in
//!   `tp-messaging`.

pub mod envelope;
pub mod errors;
pub mod ipc;

pub use envelope::{Envelope, MessageType};
pub use errors::CodecError;
pub use ipc::*;
