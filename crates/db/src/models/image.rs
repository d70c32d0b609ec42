//! Image entity model and DTOs.

use illustra_core::types::{DbId, Timestamp};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// An image row from the `images` table.
///
/// `simple_src` points at the text-free variant of the illustration, when
/// one has been uploaded.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Image {
    pub id: DbId,
    pub title: String,
    pub original_src: String,
    pub simple_src: Option<String>,
    pub original_filename: Option<String>,
    pub simple_filename: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Image {
    /// Stored object filenames referenced by this image.
    pub fn stored_filenames(&self) -> Vec<&str> {
        [&self.original_filename, &self.simple_filename]
            .into_iter()
            .filter_map(|f| f.as_deref())
            .collect()
    }
}

/// DTO for creating a new image.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateImage {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(min = 1))]
    pub original_src: String,
    pub simple_src: Option<String>,
    pub original_filename: Option<String>,
    pub simple_filename: Option<String>,
}

/// DTO for updating an existing image. All fields are optional.
///
/// The text-free variant can be removed: `"simple_src": null` clears the
/// column, while leaving the key out keeps the stored value.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateImage {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub original_src: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub simple_src: Option<Option<String>>,
    pub original_filename: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub simple_filename: Option<Option<String>>,
}

/// Maps a key that is present in the payload to `Some`, including `null`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn update_distinguishes_null_from_missing_simple_variant() {
        let clear: UpdateImage =
            serde_json::from_value(json!({ "simple_src": null, "simple_filename": null }))
                .unwrap();
        assert_eq!(clear.simple_src, Some(None));
        assert_eq!(clear.simple_filename, Some(None));

        let keep: UpdateImage = serde_json::from_value(json!({ "title": "Dusk" })).unwrap();
        assert_eq!(keep.simple_src, None);
        assert_eq!(keep.simple_filename, None);

        let set: UpdateImage =
            serde_json::from_value(json!({ "simple_src": "/static/images/a.png" })).unwrap();
        assert_eq!(set.simple_src, Some(Some("/static/images/a.png".to_string())));
    }
}
