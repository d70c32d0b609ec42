//! Naming and validation rules for uploaded image files.

use crate::error::CoreError;

/// Accepted image file extensions (lowercase).
pub const SUPPORTED_IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "gif"];

/// Extract and validate the extension of an uploaded filename.
///
/// Returns the lowercase extension, or a validation error naming the
/// supported formats.
pub fn image_extension(filename: &str) -> Result<String, CoreError> {
    let ext = match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext.to_lowercase(),
        _ => String::new(),
    };

    if SUPPORTED_IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(CoreError::Validation(format!(
            "Unsupported image format '{filename}'. Supported: {}",
            SUPPORTED_IMAGE_EXTENSIONS.join(", ")
        )))
    }
}

/// Generate the storage filename for an upload: `<uuid>.<ext>`.
///
/// The client-supplied name only contributes its extension, so stored
/// names never collide and never carry path components.
pub fn storage_filename(original: &str) -> Result<String, CoreError> {
    let ext = image_extension(original)?;
    Ok(format!("{}.{ext}", uuid::Uuid::new_v4()))
}

/// Join a public base URL and a stored filename into an image `src`.
pub fn public_src(base_url: &str, filename: &str) -> String {
    format!("{}/{filename}", base_url.trim_end_matches('/'))
}
