use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use bytes::Bytes;

use crate::errors::HarnessError;

/// Mime type assumed when an image arrives without one.
pub const DEFAULT_IMAGE_MIME: &str = "image/png";

/// Raw image bytes plus their mime type.
///
/// Cloning is cheap: the bytes are reference counted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImagePayload {
    mime_type: String,
    data: Bytes,
}

impl ImagePayload {
    /// Wraps raw bytes. An empty mime type falls back to [`DEFAULT_IMAGE_MIME`].
    pub fn new(mime_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        let mime_type = mime_type.into();
        let mime_type = if mime_type.trim().is_empty() {
            DEFAULT_IMAGE_MIME.to_string()
        } else {
            mime_type
        };
        Self {
            mime_type,
            data: data.into(),
        }
    }

    /// Decodes standard base64 text.
    pub fn from_base64(mime_type: impl Into<String>, encoded: &str) -> Result<Self, HarnessError> {
        let data = BASE64_STANDARD
            .decode(encoded.trim())
            .map_err(|e| HarnessError::Validation(format!("invalid base64 image data: {e}")))?;
        Ok(Self::new(mime_type, data))
    }

    /// Parses `data:<mime>;base64,<data>`. Text without a data-URL prefix is
    /// treated as bare base64 with the default mime type.
    pub fn from_data_url(value: &str) -> Result<Self, HarnessError> {
        let Some(rest) = value.strip_prefix("data:") else {
            return Self::from_base64(DEFAULT_IMAGE_MIME, value);
        };
        let (header, encoded) = rest.split_once(',').ok_or_else(|| {
            HarnessError::Validation("data URL is missing the ',' separator".into())
        })?;
        let Some(mime_type) = header.strip_suffix(";base64") else {
            return Err(HarnessError::Validation(
                "only base64 data URLs are supported".into(),
            ));
        };
        Self::from_base64(mime_type, encoded)
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Standard base64 of the raw bytes, without any prefix.
    pub fn to_base64(&self) -> String {
        BASE64_STANDARD.encode(&self.data)
    }
}

/// Image produced by a provider for a single transformation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedImage {
    pub image: ImagePayload,
    /// Text the model returned alongside the image, if any.
    pub commentary: Option<String>,
    /// Vendor-specific finish reason when available (for example `STOP`).
    pub finish_reason: Option<String>,
}
