//! Loading the source portrait from disk or an inline data URL.

use std::path::{Path, PathBuf};

use chronos_harness::ImagePayload;

#[derive(Debug, thiserror::Error)]
pub enum PickerError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("{}: not an image ({mime_type})", .path.display())]
    NotAnImage { path: PathBuf, mime_type: String },
    #[error("{}: file is empty", .path.display())]
    Empty { path: PathBuf },
    #[error("{}: {message}", .path.display())]
    Io { path: PathBuf, message: String },
    #[error("invalid data URL: {0}")]
    InvalidDataUrl(String),
}

/// MIME type guessed from the file extension.
pub fn guess_mime_type(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .to_string()
}

/// Reads an image file, accepting only `image/*` types.
pub async fn image_from_path(path: &Path) -> Result<ImagePayload, PickerError> {
    let mime_type = guess_mime_type(path);
    if !mime_type.starts_with("image/") {
        return Err(PickerError::NotAnImage {
            path: path.to_path_buf(),
            mime_type,
        });
    }
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(PickerError::NotFound(path.to_path_buf()));
        }
        Err(e) => {
            return Err(PickerError::Io {
                path: path.to_path_buf(),
                message: e.to_string(),
            });
        }
    };
    if bytes.is_empty() {
        return Err(PickerError::Empty {
            path: path.to_path_buf(),
        });
    }
    Ok(ImagePayload::new(mime_type, bytes))
}

/// Loads a portrait given either as a file path or as a base64 `data:` URL.
pub async fn load_source(source: &str) -> Result<ImagePayload, PickerError> {
    if !source.starts_with("data:") {
        return image_from_path(Path::new(source)).await;
    }
    let image =
        ImagePayload::from_data_url(source).map_err(|e| PickerError::InvalidDataUrl(e.to_string()))?;
    let path = PathBuf::from("<data URL>");
    if !image.mime_type().starts_with("image/") {
        return Err(PickerError::NotAnImage {
            path,
            mime_type: image.mime_type().to_string(),
        });
    }
    if image.is_empty() {
        return Err(PickerError::Empty { path });
    }
    Ok(image)
}
