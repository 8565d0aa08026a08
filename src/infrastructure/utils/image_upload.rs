use std::{io, path::{Path, PathBuf}};

use derive_more::Display;
use uuid::Uuid;

use crate::errors::AppError;

/// Relative to the web root; doubles as the public URL prefix.
pub const PROJECT_IMAGE_DIR: &str = "images/projects";

const ALLOWED_IMAGE_TYPES: [&str; 5] = [
    "image/png",
    "image/jpeg",
    "image/gif",
    "image/webp",
    "image/avif",
];

#[derive(Debug, Display)]
pub enum ImageUploadError {
    #[display("Uploaded file is empty")]
    Empty,

    #[display("Image exceeds the maximum size of {_0} bytes")]
    TooLarge(usize),

    #[display("Unsupported image type: {_0}")]
    UnsupportedType(String),

    #[display("Failed to store image: {_0}")]
    Io(io::Error),
}

impl From<io::Error> for ImageUploadError {
    fn from(err: io::Error) -> Self {
        ImageUploadError::Io(err)
    }
}

impl From<ImageUploadError> for AppError {
    fn from(err: ImageUploadError) -> Self {
        match err {
            ImageUploadError::Empty => AppError::field("image", "Uploaded file is empty"),
            ImageUploadError::TooLarge(_) => AppError::PayloadTooLarge(err.to_string()),
            ImageUploadError::UnsupportedType(_) => AppError::UnsupportedMediaType(err.to_string()),
            ImageUploadError::Io(e) => AppError::from(e),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredImage {
    pub public_url: String,
    pub path: PathBuf,
    pub mime_type: String,
}

/// Sniffs the image type from its bytes; the client's content type and file name are ignored.
pub fn detect_image_type(bytes: &[u8]) -> Result<infer::Type, ImageUploadError> {
    match infer::get(bytes) {
        Some(kind) if ALLOWED_IMAGE_TYPES.contains(&kind.mime_type()) => Ok(kind),
        Some(kind) => Err(ImageUploadError::UnsupportedType(kind.mime_type().to_string())),
        None => Err(ImageUploadError::UnsupportedType("unknown".to_string())),
    }
}

/// Copies an uploaded temp file to `{web_root}/images/projects/{uuid}.{ext}`.
pub async fn store_project_image(
    web_root: &Path,
    source: &Path,
    max_bytes: usize,
) -> Result<StoredImage, ImageUploadError> {
    let size = tokio::fs::metadata(source).await?.len() as usize;
    if size == 0 {
        return Err(ImageUploadError::Empty);
    }
    if size > max_bytes {
        return Err(ImageUploadError::TooLarge(max_bytes));
    }

    let bytes = tokio::fs::read(source).await?;
    let kind = detect_image_type(&bytes)?;

    let directory = web_root.join(PROJECT_IMAGE_DIR);
    tokio::fs::create_dir_all(&directory).await?;

    let file_name = format!("{}.{}", Uuid::new_v4(), kind.extension());
    let path = directory.join(&file_name);
    tokio::fs::write(&path, &bytes).await?;

    tracing::info!(path = %path.display(), size, mime = kind.mime_type(), "Stored project image");

    Ok(StoredImage {
        public_url: format!("/{}/{}", PROJECT_IMAGE_DIR, file_name),
        path,
        mime_type: kind.mime_type().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: [u8; 16] = [
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A,
        0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
    ];

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("portfolio-{}-{}", name, Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn png_bytes_are_detected() {
        let kind = detect_image_type(&PNG_HEADER).unwrap();
        assert_eq!(kind.extension(), "png");
    }

    #[test]
    fn text_is_rejected() {
        assert!(matches!(
            detect_image_type(b"just some text"),
            Err(ImageUploadError::UnsupportedType(_))
        ));
    }

    #[tokio::test]
    async fn stores_under_project_image_dir() {
        let root = scratch_dir("root");
        let source = root.join("upload.tmp");
        std::fs::write(&source, PNG_HEADER).unwrap();

        let stored = store_project_image(&root, &source, 1024).await.unwrap();
        assert!(stored.public_url.starts_with("/images/projects/"));
        assert!(stored.public_url.ends_with(".png"));
        assert!(stored.path.exists());

        std::fs::remove_dir_all(root).ok();
    }

    #[tokio::test]
    async fn oversized_upload_is_rejected() {
        let root = scratch_dir("big");
        let source = root.join("upload.tmp");
        std::fs::write(&source, PNG_HEADER).unwrap();

        let err = store_project_image(&root, &source, 4).await.unwrap_err();
        assert!(matches!(err, ImageUploadError::TooLarge(4)));

        std::fs::remove_dir_all(root).ok();
    }
}
