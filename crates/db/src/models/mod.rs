//! Domain model structs and DTOs.
//!
//! Each entity submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches
//!
//! [`illustration`] holds the read-model aggregates assembled from several
//! tables; they are never persisted as such.

pub mod category;
pub mod character;
pub mod illustration;
pub mod image;
pub mod operator;
pub mod relation;
pub mod session;
