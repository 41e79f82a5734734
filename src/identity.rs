//! Content fingerprints used as resource identities.
//!
//! A resource's identity is the SHA-256 digest of its final `rendered` value, encoded as
//! 64 lowercase hexadecimal characters. Because the digest is a pure function of the
//! rendered text, two provisioning runs with the same template and variables always
//! resolve to the same identity, and any change in rendered content changes it.
//!
//! # Examples
//!
//! ```rust
//! use cloudconfig::identity::{compute_identity, verify_identity};
//!
//! let id = compute_identity("hello world");
//! assert_eq!(id, "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9");
//! assert!(verify_identity("hello world", &id));
//! ```

use sha2::{Digest, Sha256};

/// Length of an identity string: 256 bits as hex.
pub const IDENTITY_LEN: usize = 64;

/// Compute the identity of a rendered document.
///
/// Hashes the UTF-8 bytes of `text` with SHA-256 and returns the lowercase hex digest.
/// Unlike lockfile checksums, no algorithm prefix is added: the identity is persisted
/// verbatim as the resource ID.
#[must_use]
pub fn compute_identity(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

/// Verify that `text` still hashes to the recorded identity.
///
/// An empty recorded identity never matches, so a deleted resource is never
/// considered up to date.
#[must_use]
pub fn verify_identity(text: &str, expected: &str) -> bool {
    !expected.is_empty() && compute_identity(text) == expected
}
