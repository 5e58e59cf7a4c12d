//! Upload entry point: accept only handwriting images
//!
//! A file is accepted when its extension, its declared MIME type (if any) and its
//! sniffed content type (if recognisable) all fall inside the image allow-list.
//! Rejection happens here, before any capability call.

use std::path::Path;
use std::sync::Arc;

use super::ValidationError;
use crate::capability::ImagePayload;

pub const ALLOWED_MIME_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/gif", "image/bmp"];

/// A file handed to the upload zone
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadedImage {
    pub fn new(file_name: impl Into<String>, content_type: Option<&str>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.map(String::from),
            bytes,
        }
    }
}

fn mime_for_extension(ext: &str) -> Option<&'static str> {
    match ext {
        "jpeg" | "jpg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "bmp" => Some("image/bmp"),
        _ => None,
    }
}

fn normalize_mime(mime: &str) -> String {
    let base = mime.split(';').next().unwrap_or(mime).trim().to_ascii_lowercase();
    // Some clients send the non-standard jpg subtype
    if base == "image/jpg" {
        "image/jpeg".to_string()
    } else {
        base
    }
}

/// Validate one file and turn it into a transcription payload
pub fn validate_image(upload: UploadedImage) -> Result<ImagePayload, ValidationError> {
    let reject = || ValidationError::UnsupportedFileType {
        file_name: upload.file_name.clone(),
    };

    let extension = Path::new(&upload.file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .ok_or_else(reject)?;
    let extension_mime = mime_for_extension(&extension).ok_or_else(reject)?;

    let declared = upload.content_type.as_deref().map(normalize_mime);
    if let Some(declared) = &declared {
        if !ALLOWED_MIME_TYPES.contains(&declared.as_str()) {
            return Err(reject());
        }
    }

    let sniffed = infer::get(&upload.bytes).map(|kind| kind.mime_type());
    if let Some(sniffed) = sniffed {
        if !ALLOWED_MIME_TYPES.contains(&sniffed) {
            tracing::debug!(file_name = %upload.file_name, sniffed, "Content is not an allowed image");
            return Err(reject());
        }
    }

    let mime_type = sniffed
        .map(String::from)
        .or(declared)
        .unwrap_or_else(|| extension_mime.to_string());

    Ok(ImagePayload {
        file_name: upload.file_name,
        mime_type,
        bytes: Arc::from(upload.bytes),
    })
}

/// Validate a whole batch; one bad file rejects the batch
pub fn validate_batch(uploads: Vec<UploadedImage>) -> Result<Vec<ImagePayload>, ValidationError> {
    uploads.into_iter().map(validate_image).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    const PDF_MAGIC: &[u8] = b"%PDF-1.7\n";

    #[test]
    fn test_accepts_allowed_extensions_case_insensitively() {
        for name in ["a.jpeg", "b.JPG", "c.png", "d.Gif", "e.bmp"] {
            let payload = validate_image(UploadedImage::new(name, None, vec![0, 1, 2])).unwrap();
            assert!(payload.mime_type.starts_with("image/"), "{}", name);
        }
    }

    #[test]
    fn test_rejects_unknown_or_missing_extension() {
        for name in ["notes.pdf", "notes.txt", "notes", "image.webp"] {
            let err = validate_image(UploadedImage::new(name, None, vec![])).unwrap_err();
            assert_eq!(
                err,
                ValidationError::UnsupportedFileType { file_name: name.to_string() }
            );
        }
    }

    #[test]
    fn test_rejects_declared_non_image_mime() {
        let upload = UploadedImage::new("scan.png", Some("application/pdf"), vec![]);
        assert!(validate_image(upload).is_err());
    }

    #[test]
    fn test_accepts_image_jpg_alias_and_parameters() {
        let upload = UploadedImage::new("scan.jpg", Some("image/jpg; charset=binary"), vec![]);
        assert_eq!(validate_image(upload).unwrap().mime_type, "image/jpeg");
    }

    #[test]
    fn test_sniffed_content_overrides_extension() {
        let upload = UploadedImage::new("scan.jpg", None, PNG_MAGIC.to_vec());
        assert_eq!(validate_image(upload).unwrap().mime_type, "image/png");
    }

    #[test]
    fn test_rejects_disguised_document() {
        let upload = UploadedImage::new("scan.png", Some("image/png"), PDF_MAGIC.to_vec());
        assert!(validate_image(upload).is_err());
    }

    #[test]
    fn test_batch_rejected_as_a_whole() {
        let batch = vec![
            UploadedImage::new("ok.png", None, vec![]),
            UploadedImage::new("bad.doc", None, vec![]),
        ];
        assert!(matches!(
            validate_batch(batch),
            Err(ValidationError::UnsupportedFileType { file_name }) if file_name == "bad.doc"
        ));
    }
}
