use serde_json::Value;

use crate::error::UploadError;

/// A validated upload request.
///
/// `data` is sent by the browser as a plain JSON array of byte values.
/// `tags` are kept exactly as received so they can be echoed back; their
/// name/value shape is only checked when they are handed to the uploader.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub data: Vec<u8>,
    pub tags: Vec<Value>,
}

impl UploadRequest {
    /// Check that `data` and `tags` are present and are arrays, then rebuild
    /// the byte buffer in order.
    ///
    /// `data` is checked first, so a request with both fields broken reports
    /// `InvalidDataFormat`.
    pub fn from_json(body: &Value) -> Result<Self, UploadError> {
        let data = body
            .get("data")
            .and_then(Value::as_array)
            .ok_or(UploadError::InvalidDataFormat)?;

        let tags = body
            .get("tags")
            .and_then(Value::as_array)
            .ok_or(UploadError::InvalidTagsFormat)?;

        let data = data
            .iter()
            .map(to_byte)
            .collect::<Option<Vec<u8>>>()
            .ok_or(UploadError::InvalidDataFormat)?;

        Ok(Self {
            data,
            tags: tags.clone(),
        })
    }
}

/// A JSON number that is an integer in 0..=255.
fn to_byte(value: &Value) -> Option<u8> {
    if let Some(n) = value.as_u64() {
        return u8::try_from(n).ok();
    }
    // 72.0 is a valid way for some serializers to write 72
    let f = value.as_f64()?;
    if f.fract() == 0.0 && (0.0..=255.0).contains(&f) {
        Some(f as u8)
    } else {
        None
    }
}

/// Format a byte count as KiB with two decimals, e.g. `1536` -> `"1.50"`.
pub fn format_kib(bytes: usize) -> String {
    format!("{:.2}", bytes as f64 / 1024.0)
}

/// Format a configured limit in KiB, dropping decimals for whole values.
pub fn format_limit_kib(bytes: usize) -> String {
    if bytes % 1024 == 0 {
        (bytes / 1024).to_string()
    } else {
        format_kib(bytes)
    }
}
