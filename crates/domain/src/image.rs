use std::path::Path;

/// File extensions that count as annotatable images, compared
/// case-insensitively.
pub const ALLOWED_IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp"];

pub fn is_image_file(path: &Path) -> bool {
    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
        return false;
    };
    let lowered = ext.to_ascii_lowercase();
    ALLOWED_IMAGE_EXTENSIONS
        .iter()
        .any(|allowed| *allowed == lowered)
}
