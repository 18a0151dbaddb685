//! # Transaction-Processor Signing Identity
//!
//! secp256k1 key management, deterministic ECDSA signing, and strict
//! signature verification for transaction processors and clients.
//!
//! ## Security Properties
//!
//! - **RFC 6979 deterministic nonces**: signing never consumes external
//!   randomness, removing the nonce-reuse key-leak class entirely.
//! - **Low-S canonical output**: every produced signature satisfies
//!   S <= n/2, eliminating the two-valid-encodings malleability class.
//! - **Strict verification**: high-S signatures are rejected even though
//!   their twin is mathematically valid.
//! - **No mutable state**: a [`Signer`] is a pure function of its key and
//!   inputs; one instance is safely shared across concurrent callers.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ecdsa;
pub mod errors;

pub use ecdsa::{verify, Signer, PRIVATE_KEY_LEN, PUBLIC_KEY_LEN, SIGNATURE_LEN};
pub use errors::SigningError;
