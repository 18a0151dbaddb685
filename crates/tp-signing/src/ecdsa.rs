//! # ECDSA Signing Identity (secp256k1)
//!
//! The [`Signer`] owns one private scalar and produces deterministic
//! (RFC 6979) signatures over caller-supplied 32-byte digests. The identity
//! never hashes messages itself.
//!
//! ## Security Notes
//!
//! - **Low-S Output**: produced S values satisfy S <= n/2.
//! - **Strict Verification**: S > n/2 is rejected during verification even
//!   though the high-S twin is mathematically valid.
//! - **Scalar Range Validation**: R and S must be in [1, n-1].
//! - **Constant-Time Comparisons**: range and low-S checks use the `subtle`
//!   crate.

use crate::errors::SigningError;
use k256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use k256::ecdsa::{Signature, SigningKey, VerifyingKey};
use subtle::{Choice, ConstantTimeEq};
use zeroize::Zeroize;

/// Digest and private-key length in bytes.
pub const PRIVATE_KEY_LEN: usize = 32;

/// Signature wire length in bytes: 32-byte big-endian R, then S.
pub const SIGNATURE_LEN: usize = 64;

/// Uncompressed SEC1 public-key length in bytes: 0x04 prefix, X, Y.
pub const PUBLIC_KEY_LEN: usize = 65;

/// Compressed SEC1 public-key length in bytes: parity prefix, X.
const COMPRESSED_PUBLIC_KEY_LEN: usize = 33;

/// Digest length accepted by [`Signer::sign`] and [`verify`].
const DIGEST_LEN: usize = 32;

/// secp256k1 curve order n.
/// n = 0xFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141
const SECP256K1_ORDER: [u8; 32] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE,
    0xBA, 0xAE, 0xDC, 0xE6, 0xAF, 0x48, 0xA0, 0x3B, 0xBF, 0xD2, 0x5E, 0x8C, 0xD0, 0x36, 0x41, 0x41,
];

/// Half of the secp256k1 curve order, the canonical S ceiling.
const SECP256K1_HALF_ORDER: [u8; 32] = [
    0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0x5D, 0x57, 0x6E, 0x73, 0x57, 0xA4, 0x50, 0x1D, 0xDF, 0xE9, 0x2F, 0x46, 0x68, 0x1B, 0x20, 0xA0,
];

// =============================================================================
// SIGNER
// =============================================================================

/// A secp256k1 signing identity.
///
/// Holds no mutable state beyond the immutable key material, so one
/// instance is safely usable by multiple concurrent callers.
pub struct Signer {
    signing_key: SigningKey,
}

impl Signer {
    /// Create a signer with a freshly generated private key.
    #[must_use]
    pub fn new() -> Self {
        Self {
            signing_key: SigningKey::random(&mut rand::thread_rng()),
        }
    }

    /// Create a signer from a raw 32-byte private scalar.
    ///
    /// Rejects scalars outside [1, n-1].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SigningError> {
        if bytes.len() != PRIVATE_KEY_LEN {
            return Err(SigningError::InvalidPrivateKeyLength {
                expected: PRIVATE_KEY_LEN,
                actual: bytes.len(),
            });
        }

        let mut key = [0u8; PRIVATE_KEY_LEN];
        key.copy_from_slice(bytes);

        let signing_key =
            SigningKey::from_bytes((&key).into()).map_err(|_| SigningError::InvalidPrivateKey);
        key.zeroize();

        Ok(Self {
            signing_key: signing_key?,
        })
    }

    /// Generate a uniformly random private scalar in [1, n-1].
    #[must_use]
    pub fn generate_private_key() -> [u8; PRIVATE_KEY_LEN] {
        SigningKey::random(&mut rand::thread_rng()).to_bytes().into()
    }

    /// Sign a pre-hashed 32-byte digest.
    ///
    /// The nonce is derived deterministically from the private key and the
    /// digest (RFC 6979); identical inputs yield byte-identical signatures.
    /// Output is R || S, each a 32-byte unsigned big-endian integer, with S
    /// canonicalized to the low half of the curve order.
    pub fn sign(&self, digest: &[u8]) -> Result<[u8; SIGNATURE_LEN], SigningError> {
        if digest.len() != DIGEST_LEN {
            return Err(SigningError::InvalidDigestLength {
                expected: DIGEST_LEN,
                actual: digest.len(),
            });
        }

        let signature: Signature =
            self.signing_key
                .sign_prehash(digest)
                .map_err(|_| SigningError::InvalidDigestLength {
                    expected: DIGEST_LEN,
                    actual: digest.len(),
                })?;

        // k256 normalizes during signing; make the invariant explicit.
        let signature = signature.normalize_s().unwrap_or(signature);

        Ok(signature.to_bytes().into())
    }

    /// The public key Q = privateKey * G, SEC1 uncompressed (0x04 || X || Y).
    ///
    /// # Panics
    ///
    /// Does not panic: the uncompressed SEC1 encoding of a secp256k1 point
    /// is always exactly 65 bytes.
    #[must_use]
    pub fn public_key(&self) -> [u8; PUBLIC_KEY_LEN] {
        let encoded = self.signing_key.verifying_key().to_encoded_point(false);
        let mut bytes = [0u8; PUBLIC_KEY_LEN];
        bytes.copy_from_slice(encoded.as_bytes());
        bytes
    }

    /// The raw 32-byte private scalar.
    #[must_use]
    pub fn private_key(&self) -> [u8; PRIVATE_KEY_LEN] {
        self.signing_key.to_bytes().into()
    }
}

impl Default for Signer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Signer {
    fn drop(&mut self) {
        // Zeroize secret key material
        let mut bytes: [u8; PRIVATE_KEY_LEN] = self.signing_key.to_bytes().into();
        bytes.zeroize();
    }
}

// =============================================================================
// VERIFICATION
// =============================================================================

/// Verify a 64-byte R || S signature over a 32-byte digest.
///
/// Only structurally invalid lengths produce an error; every cryptographic
/// invalidity yields `Ok(false)`:
///
/// - R or S equal to zero or >= the curve order n
/// - S > n/2 (non-canonical high-S twin)
/// - public key bytes that do not decode to a point on the curve
/// - failure of the ECDSA verification equation
///
/// The public key may be SEC1 uncompressed (65 bytes) or compressed
/// (33 bytes); [`Signer::public_key`] emits the uncompressed form.
pub fn verify(digest: &[u8], signature: &[u8], public_key: &[u8]) -> Result<bool, SigningError> {
    if digest.len() != DIGEST_LEN {
        return Err(SigningError::InvalidDigestLength {
            expected: DIGEST_LEN,
            actual: digest.len(),
        });
    }
    if signature.len() != SIGNATURE_LEN {
        return Err(SigningError::InvalidSignatureLength {
            expected: SIGNATURE_LEN,
            actual: signature.len(),
        });
    }
    if public_key.len() != PUBLIC_KEY_LEN && public_key.len() != COMPRESSED_PUBLIC_KEY_LEN {
        return Err(SigningError::InvalidPublicKeyLength {
            actual: public_key.len(),
        });
    }

    let mut r = [0u8; 32];
    let mut s = [0u8; 32];
    r.copy_from_slice(&signature[..32]);
    s.copy_from_slice(&signature[32..]);

    // R and S must be in [1, n-1].
    if !is_valid_scalar(&r) || !is_valid_scalar(&s) {
        return Ok(false);
    }

    // Reject the malleable high-S twin outright.
    if !is_low_s(&s) {
        return Ok(false);
    }

    let verifying_key = match VerifyingKey::from_sec1_bytes(public_key) {
        Ok(key) => key,
        Err(_) => return Ok(false),
    };

    let parsed = match Signature::from_slice(signature) {
        Ok(sig) => sig,
        Err(_) => return Ok(false),
    };

    Ok(verifying_key.verify_prehash(digest, &parsed).is_ok())
}

// =============================================================================
// SCALAR HELPERS
// =============================================================================

/// Check that S is canonical: S <= n/2.
///
/// Constant-time: the comparison runs in fixed time regardless of input.
fn is_low_s(s: &[u8; 32]) -> bool {
    let mut less = Choice::from(0u8);
    let mut greater = Choice::from(0u8);

    for i in 0..32 {
        let not_decided = !(less | greater);
        let byte_less = Choice::from((s[i] < SECP256K1_HALF_ORDER[i]) as u8);
        let byte_greater = Choice::from((s[i] > SECP256K1_HALF_ORDER[i]) as u8);

        less |= not_decided & byte_less;
        greater |= not_decided & byte_greater;
    }

    // S equal to n/2 is still canonical.
    (!greater).into()
}

/// Check that a scalar is in the valid ECDSA range [1, n-1].
///
/// Constant-time: no early returns on byte values.
fn is_valid_scalar(scalar: &[u8; 32]) -> bool {
    let mut is_zero = Choice::from(1u8);
    for &byte in scalar {
        is_zero &= byte.ct_eq(&0u8);
    }

    let mut less = Choice::from(0u8);
    let mut greater = Choice::from(0u8);

    for i in 0..32 {
        let not_decided = !(less | greater);
        let byte_less = Choice::from((scalar[i] < SECP256K1_ORDER[i]) as u8);
        let byte_greater = Choice::from((scalar[i] > SECP256K1_ORDER[i]) as u8);

        less |= not_decided & byte_less;
        greater |= not_decided & byte_greater;
    }

    (!is_zero & less).into()
}

/// Compute the high-S twin: s' = n - s.
///
/// Exists so tests can construct the malleable counterpart of a canonical
/// signature.
#[must_use]
pub fn invert_s(s: &[u8; 32]) -> [u8; 32] {
    let mut result = [0u8; 32];
    let mut borrow: i32 = 0;

    for i in (0..32).rev() {
        let diff = i32::from(SECP256K1_ORDER[i]) - i32::from(s[i]) - borrow;
        if diff < 0 {
            result[i] = (diff + 256) as u8;
            borrow = 1;
        } else {
            result[i] = diff as u8;
            borrow = 0;
        }
    }

    result
}

// =============================================================================
// UNIT TESTS
// =============================================================================
