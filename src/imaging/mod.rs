//! Image handling
//!
//! - `transcode`: server-side re-encode of any accepted raster format to JPEG
//! - `compress`: pre-upload downsizing with progress reporting

mod compress;
mod transcode;

pub use compress::{CompressOptions, CompressedImage, Compressor};
pub use transcode::{DEFAULT_JPEG_QUALITY, transcode_to_jpeg, transcode_to_jpeg_blocking};

/// MIME types accepted for upload
pub const ALLOWED_IMAGE_TYPES: [&str; 7] = [
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/bmp",
    "image/tiff",
];

/// Content type of everything written to storage
pub const JPEG_CONTENT_TYPE: &str = "image/jpeg";

/// Whether `content_type` is an accepted image type.
///
/// Parameters (`; charset=...`) and case are ignored.
pub fn is_allowed_image_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    ALLOWED_IMAGE_TYPES.contains(&essence.as_str())
}

/// A file picked for upload, before compression
#[derive(Debug, Clone)]
pub struct SelectedFile {
    /// Original filename; becomes the storage key
    pub name: String,
    /// Declared MIME type
    pub content_type: String,
    pub data: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            data,
        }
    }
}
