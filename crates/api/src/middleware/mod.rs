//! Request extractors shared by the admin handlers.
//!
//! - [`admin::Admin`] -- the operator behind a live, session-bound access token.

pub mod admin;
