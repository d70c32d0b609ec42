//! Operator authentication primitives.
//!
//! - [`password`] -- Argon2id hashing and the password length rule.
//! - [`tokens`] -- session-bound access tokens and refresh-token digests.

pub mod password;
pub mod tokens;
