//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async SQL methods that
//! accept `&mut PgConnection` as the first argument, so the same call runs on
//! a pooled connection or inside an open transaction.

pub mod character_repo;
pub mod child_category_repo;
pub mod image_relation_repo;
pub mod image_repo;
pub mod operator_repo;
pub mod parent_category_repo;
pub mod session_repo;
pub mod stored_file_repo;

pub use character_repo::CharacterRepo;
pub use child_category_repo::ChildCategoryRepo;
pub use image_relation_repo::ImageRelationRepo;
pub use image_repo::ImageRepo;
pub use operator_repo::OperatorRepo;
pub use parent_category_repo::ParentCategoryRepo;
pub use session_repo::SessionRepo;
pub use stored_file_repo::StoredFileRepo;
