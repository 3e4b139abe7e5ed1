//! Document selection and local upload validation.
//!
//! A [`DocumentFile`] is what the user picked for upload. Before any network
//! call is made it has to pass [`DocumentFile::validate`]: a size ceiling and
//! an accepted-type allow-list.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Largest accepted upload, in bytes (10 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Document types the ingestion endpoint accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Pdf,
    PlainText,
    /// Legacy binary Word (`.doc`).
    Word,
    /// OOXML Word (`.docx`).
    WordOpenXml,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 4] = [
        DocumentKind::Pdf,
        DocumentKind::PlainText,
        DocumentKind::Word,
        DocumentKind::WordOpenXml,
    ];

    pub fn mime_type(self) -> &'static str {
        match self {
            DocumentKind::Pdf => "application/pdf",
            DocumentKind::PlainText => "text/plain",
            DocumentKind::Word => "application/msword",
            DocumentKind::WordOpenXml => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    /// Matches a MIME type against the allow-list, ignoring parameters and case.
    pub fn from_mime_type(mime: &str) -> Option<Self> {
        let essence = mime
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        Self::ALL.into_iter().find(|kind| kind.mime_type() == essence)
    }
}

/// Why a file was refused before upload.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    #[error("File too large! Maximum size is {} MB.", .limit / (1024 * 1024))]
    TooLarge { size: u64, limit: u64 },

    #[error("Invalid file type! Please upload a PDF, TXT, DOC or DOCX file.")]
    UnsupportedType { content_type: String },
}

/// A file selected for upload.
#[derive(Clone, PartialEq, Eq)]
pub struct DocumentFile {
    file_name: String,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

impl DocumentFile {
    /// Creates a document with no declared MIME type; the type is inferred
    /// from the file name.
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            bytes,
        }
    }

    /// Sets the MIME type declared by the picker.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Reads a document from disk.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(file_name, bytes))
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// The declared MIME type, or one inferred from the file name extension.
    pub fn content_type(&self) -> String {
        match &self.content_type {
            Some(declared) => declared.clone(),
            None => mime_guess::from_path(&self.file_name)
                .first_or_octet_stream()
                .to_string(),
        }
    }

    /// Checks the size ceiling and the accepted-type allow-list.
    pub fn validate(&self) -> std::result::Result<DocumentKind, RejectReason> {
        let content_type = self.content_type();
        let kind = DocumentKind::from_mime_type(&content_type)
            .ok_or(RejectReason::UnsupportedType { content_type })?;

        if self.size() > MAX_UPLOAD_BYTES {
            return Err(RejectReason::TooLarge {
                size: self.size(),
                limit: MAX_UPLOAD_BYTES,
            });
        }

        Ok(kind)
    }
}

impl fmt::Debug for DocumentFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}
