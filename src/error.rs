//! Error types for the public API. Kept intentionally thin: AEZ has exactly
//! one failure mode a caller can observe (authentication failure), and the
//! error carries no plaintext, key, or tag material.

use thiserror::Error;

/// Returned by [`crate::decrypt`] when the ciphertext does not authenticate,
/// or when the ciphertext is shorter than the tag length.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum AezError {
    #[error("ciphertext failed authentication")]
    Forgery,
}
