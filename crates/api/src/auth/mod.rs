//! Authentication primitives.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`token`] -- the scoped token authority (issue, verify, check scope).

pub mod password;
pub mod token;
