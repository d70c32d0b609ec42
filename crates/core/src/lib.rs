//! Domain primitives shared by the storage and HTTP layers.
//!
//! Nothing in this crate performs I/O; it holds identifier types, the
//! domain error enum, relation planning, and input-normalization helpers.

pub mod error;
pub mod pagination;
pub mod relations;
pub mod search;
pub mod types;
pub mod upload;
