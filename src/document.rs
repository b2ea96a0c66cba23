//! Uploaded-document handling: load a paper from disk and classify its type.
//!
//! The provider does all document understanding — we never parse PDF or
//! image content locally. The only local obligations are declaring an
//! accurate MIME type (the provider routes on it) and refusing inputs the
//! provider would reject anyway: unsupported formats and, for PDFs, files
//! whose magic bytes say they are not PDFs at all.

use crate::error::ExamPrepError;
use std::path::Path;
use tracing::debug;

/// MIME types the upload surface accepts.
pub const ACCEPTED_MIME_TYPES: [&str; 3] = ["application/pdf", "image/png", "image/jpeg"];

/// One uploaded exam paper: raw bytes plus declared type and original name.
///
/// Immutable after construction; encoding derives an
/// [`crate::pipeline::encode::EncodedPart`] from it per generation request.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    /// Original filename, used in user-facing validation messages.
    pub name: String,
    /// Declared MIME type, one of [`ACCEPTED_MIME_TYPES`].
    pub mime_type: String,
    /// Full binary content.
    pub bytes: Vec<u8>,
}

impl UploadedDocument {
    /// Construct from in-memory bytes with a caller-declared MIME type.
    pub fn new(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<Self, ExamPrepError> {
        let name = name.into();
        let mime_type = mime_type.into();
        if !ACCEPTED_MIME_TYPES.contains(&mime_type.as_str()) {
            return Err(ExamPrepError::UnsupportedFileType { path: name.into() });
        }
        Ok(Self {
            name,
            mime_type,
            bytes,
        })
    }

    /// Load a paper from disk, inferring the MIME type from the extension.
    ///
    /// For PDFs the `%PDF` magic bytes are checked so a renamed file fails
    /// here with a meaningful error rather than confusing the provider.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, ExamPrepError> {
        let path = path.as_ref();

        let mime_type = mime_from_extension(path)
            .ok_or_else(|| ExamPrepError::UnsupportedFileType {
                path: path.to_path_buf(),
            })?
            .to_string();

        let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ExamPrepError::FileNotFound {
                path: path.to_path_buf(),
            },
            std::io::ErrorKind::PermissionDenied => ExamPrepError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => ExamPrepError::EncodingFailed {
                name: path.display().to_string(),
                detail: e.to_string(),
            },
        })?;

        if mime_type == "application/pdf" && !bytes.starts_with(b"%PDF") {
            return Err(ExamPrepError::UnsupportedFileType {
                path: path.to_path_buf(),
            });
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        debug!("Loaded {} ({}, {} bytes)", name, mime_type, bytes.len());

        Ok(Self {
            name,
            mime_type,
            bytes,
        })
    }

    /// Size of the document in bytes.
    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Map a file extension to an accepted MIME type, or None if unsupported.
fn mime_from_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "pdf" => Some("application/pdf"),
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        _ => None,
    }
}
