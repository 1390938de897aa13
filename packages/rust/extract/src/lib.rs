//! Document text extraction and upload handling.
//!
//! Turns uploaded PDF files into the single flat string the rest of
//! docbrief works with, and keeps a raw copy of each upload on disk.
//! Unreadable files degrade to empty text instead of failing the batch.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use docbrief_shared::{DocBriefError, Result};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// A raw uploaded file: its display name and its bytes.
#[derive(Clone)]
pub struct UploadedDocument {
    /// Original file name as supplied by the uploader.
    pub name: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for UploadedDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadedDocument")
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl UploadedDocument {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Read a file from disk, naming it after its final path component.
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| DocBriefError::io(path, e))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                DocBriefError::validation(format!("{} has no file name", path.display()))
            })?;
        Ok(Self { name, bytes })
    }
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Extract and concatenate the text of every document, in upload order.
///
/// Pages keep their order within each file. No separator is inserted
/// between files, so per-document boundaries are not recoverable from the
/// result. A file that cannot be parsed contributes nothing.
#[instrument(skip_all, fields(documents = docs.len()))]
pub fn extract_text(docs: &[UploadedDocument]) -> String {
    let text = concat_with(docs, extract_pdf_text);
    info!(chars = text.len(), "extraction complete");
    text
}

/// Text of a single PDF, or an empty string if it cannot be read.
pub fn extract_pdf_text(doc: &UploadedDocument) -> String {
    // pdf-extract panics on some malformed inputs.
    let bytes = doc.bytes.as_slice();
    match std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes)) {
        Ok(Ok(text)) => {
            debug!(name = %doc.name, chars = text.len(), "extracted pdf text");
            text
        }
        Ok(Err(e)) => {
            warn!(name = %doc.name, error = %e, "pdf extraction failed, skipping document text");
            String::new()
        }
        Err(_) => {
            warn!(name = %doc.name, "pdf parser panicked, skipping document text");
            String::new()
        }
    }
}

fn concat_with<F>(docs: &[UploadedDocument], mut extract: F) -> String
where
    F: FnMut(&UploadedDocument) -> String,
{
    let mut text = String::new();
    for doc in docs {
        text.push_str(&extract(doc));
    }
    text
}

// ---------------------------------------------------------------------------
// Upload persistence
// ---------------------------------------------------------------------------

/// Write a raw copy of each upload to `data_dir/<file name>`.
///
/// Creates `data_dir` if needed. Only the last path component of each name
/// is used, so names cannot escape the directory. Existing files with the
/// same name are overwritten.
#[instrument(skip(docs), fields(documents = docs.len()))]
pub fn save_uploads(data_dir: &Path, docs: &[UploadedDocument]) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(data_dir).map_err(|e| DocBriefError::io(data_dir, e))?;

    let mut saved = Vec::with_capacity(docs.len());
    for doc in docs {
        let file_name = Path::new(&doc.name)
            .file_name()
            .ok_or_else(|| DocBriefError::validation(format!("invalid upload name '{}'", doc.name)))?;

        let path = data_dir.join(file_name);
        std::fs::write(&path, &doc.bytes).map_err(|e| DocBriefError::io(&path, e))?;
        debug!(?path, bytes = doc.bytes.len(), "saved upload");
        saved.push(path);
    }

    info!(count = saved.len(), dir = %data_dir.display(), "uploads saved");
    Ok(saved)
}
