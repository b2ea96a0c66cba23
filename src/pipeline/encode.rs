//! Document encoding: raw bytes → base64 `EncodedPart`.
//!
//! Generation APIs accept attachments as base64 payloads embedded in the
//! JSON request body, each tagged with its MIME type so the provider knows
//! whether it is looking at a PDF or a scanned image. Parts are computed per
//! generation request and never cached — documents may be added or removed
//! between attempts.

use crate::document::UploadedDocument;
use crate::error::ExamPrepError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use futures::future::try_join_all;
use tracing::debug;

/// One document ready for transmission: base64 payload plus declared type.
///
/// Derived one-to-one from an [`UploadedDocument`]. The name travels along
/// for the relay transport shape, which identifies files by name.
#[derive(Debug, Clone)]
pub struct EncodedPart {
    pub name: String,
    pub mime_type: String,
    /// Standard-alphabet base64 of the document's full binary content.
    pub data: String,
}

/// Encode a single document.
pub fn encode_document(doc: &UploadedDocument) -> Result<EncodedPart, ExamPrepError> {
    let data = STANDARD.encode(&doc.bytes);
    debug!("Encoded {} → {} bytes base64", doc.name, data.len());

    Ok(EncodedPart {
        name: doc.name.clone(),
        mime_type: doc.mime_type.clone(),
        data,
    })
}

/// Encode every pending document, fanning out and waiting for all to finish
/// before the caller makes its single network call.
///
/// Fails on the first unreadable document; no network call happens in that
/// case.
pub async fn encode_all(docs: &[UploadedDocument]) -> Result<Vec<EncodedPart>, ExamPrepError> {
    try_join_all(docs.iter().map(|doc| async move { encode_document(doc) })).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(name: &str, bytes: &[u8]) -> UploadedDocument {
        UploadedDocument::new(name, "application/pdf", bytes.to_vec()).unwrap()
    }

    #[test]
    fn encode_round_trips_the_original_bytes() {
        let original = b"%PDF-1.7 exam paper content \x00\x01\xff";
        let part = encode_document(&doc("paper.pdf", original)).unwrap();

        assert_eq!(part.mime_type, "application/pdf");
        let decoded = STANDARD.decode(&part.data).expect("valid base64");
        assert_eq!(decoded, original);
    }

    #[tokio::test]
    async fn encode_all_preserves_order() {
        let docs = vec![doc("a.pdf", b"%PDF a"), doc("b.pdf", b"%PDF b")];
        let parts = encode_all(&docs).await.unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].name, "a.pdf");
        assert_eq!(parts[1].name, "b.pdf");
    }
}
