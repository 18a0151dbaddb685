//! Signing error types.

use thiserror::Error;

/// Errors from structurally invalid inputs at the signing API boundary.
///
/// Cryptographic invalidity (bad signatures, off-curve points, out-of-range
/// scalars) never produces an error: [`crate::verify`] reports it as `false`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SigningError {
    /// Digest is not exactly 32 bytes.
    #[error("Invalid digest length: expected {expected}, got {actual}")]
    InvalidDigestLength {
        /// Expected digest length in bytes.
        expected: usize,
        /// Actual digest length in bytes.
        actual: usize,
    },

    /// Signature is not exactly 64 bytes.
    #[error("Invalid signature length: expected {expected}, got {actual}")]
    InvalidSignatureLength {
        /// Expected signature length in bytes.
        expected: usize,
        /// Actual signature length in bytes.
        actual: usize,
    },

    /// Public key is neither 33-byte compressed nor 65-byte uncompressed.
    #[error("Invalid public key length: got {actual}, expected 33 or 65")]
    InvalidPublicKeyLength {
        /// Actual public key length in bytes.
        actual: usize,
    },

    /// Private key is not a scalar in [1, n-1].
    #[error("Invalid private key")]
    InvalidPrivateKey,

    /// Private key is not exactly 32 bytes.
    #[error("Invalid private key length: expected {expected}, got {actual}")]
    InvalidPrivateKeyLength {
        /// Expected private key length in bytes.
        expected: usize,
        /// Actual private key length in bytes.
        actual: usize,
    },
}
