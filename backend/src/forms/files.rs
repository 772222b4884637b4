//! # File Store Adapter
//!
//! Writes uploaded attachments under a fixed set of category directories.
//! Saving checks the extension against a per-category allow list, sanitizes
//! the client-supplied name, prefixes it with a UUID token so concurrent
//! uploads can never collide on a path, and returns the relative
//! `category/filename` path that gets persisted inside the submission
//! document.
//!
//! Every failure is a value ([`FileSaveError`]) so callers can aggregate it
//! with the rest of the validation errors. Files that were saved before a
//! later validation step rejected the overall submission are left on disk;
//! nothing here ever deletes.

use log::info;
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

const IMAGE_OR_PDF: &[&str] = &["png", "jpg", "jpeg", "pdf"];
const PDF_OR_WORD: &[&str] = &["pdf", "docx"];

/// Fixed classification of an uploaded attachment, controlling its storage
/// subdirectory and allowed formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileCategory {
    Documents,
    Education,
    Experience,
    Insurance,
    SignedDocs,
}

impl FileCategory {
    pub const ALL: [FileCategory; 5] = [
        FileCategory::Documents,
        FileCategory::Education,
        FileCategory::Experience,
        FileCategory::Insurance,
        FileCategory::SignedDocs,
    ];

    /// The storage subdirectory of this category.
    pub fn dir(&self) -> &'static str {
        match self {
            FileCategory::Documents => "documents",
            FileCategory::Education => "education",
            FileCategory::Experience => "experience",
            FileCategory::Insurance => "insurance",
            FileCategory::SignedDocs => "signed_docs",
        }
    }

    /// Maps a form section or top-level field name onto a category.
    /// Unknown sections land in `documents`.
    pub fn from_section(name: &str) -> FileCategory {
        match name {
            "education" => FileCategory::Education,
            "experience" => FileCategory::Experience,
            "insurance" => FileCategory::Insurance,
            "signedDocument" => FileCategory::SignedDocs,
            _ => FileCategory::Documents,
        }
    }

    /// Reverse lookup from a storage subdirectory, used by the download route.
    pub fn from_dir(dir: &str) -> Option<FileCategory> {
        FileCategory::ALL.into_iter().find(|c| c.dir() == dir)
    }

    fn allowed_extensions(&self, field_hint: &str) -> &'static [&'static str] {
        match self {
            FileCategory::Documents if field_hint == "resume" => PDF_OR_WORD,
            _ => IMAGE_OR_PDF,
        }
    }
}

#[derive(Debug, Error)]
pub enum FileSaveError {
    #[error("file has no name")]
    MissingName,
    #[error("file type '.{extension}' is not allowed for '{field}'")]
    DisallowedType { field: String, extension: String },
    #[error("could not save file: {0}")]
    Io(#[from] std::io::Error),
}

/// Handle on the upload directory tree, injected into handlers as
/// `web::Data<FileStore>`.
#[derive(Clone)]
pub struct FileStore {
    base: PathBuf,
}

impl FileStore {
    pub fn new(base: impl Into<PathBuf>) -> FileStore {
        FileStore { base: base.into() }
    }

    /// Creates the base directory and every category subdirectory.
    /// Run once at startup; failure aborts the process.
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        for category in FileCategory::ALL {
            std::fs::create_dir_all(self.base.join(category.dir()))?;
        }
        Ok(())
    }

    /// Resolves a stored filename for serving. Rejects anything that could
    /// escape the category directory.
    pub fn resolve(&self, category: FileCategory, filename: &str) -> Option<PathBuf> {
        if filename.is_empty()
            || filename.contains('/')
            || filename.contains('\\')
            || filename.contains("..")
        {
            return None;
        }
        Some(self.base.join(category.dir()).join(filename))
    }

    /// Saves one uploaded attachment and returns its relative path.
    ///
    /// The extension check happens before any disk access, so a rejected
    /// file leaves no artifact behind.
    pub fn save(
        &self,
        original_name: &str,
        bytes: &[u8],
        category: FileCategory,
        field_hint: &str,
    ) -> Result<String, FileSaveError> {
        if original_name.is_empty() {
            return Err(FileSaveError::MissingName);
        }
        let extension = extension_of(original_name).unwrap_or_default();
        if !category
            .allowed_extensions(field_hint)
            .contains(&extension.as_str())
        {
            return Err(FileSaveError::DisallowedType {
                field: field_hint.to_string(),
                extension,
            });
        }

        let safe_name = sanitize_filename(original_name);
        let unique_name = format!("{}_{}", Uuid::new_v4().simple(), safe_name);
        std::fs::write(self.base.join(category.dir()).join(&unique_name), bytes)?;

        let relative = format!("{}/{}", category.dir(), unique_name);
        info!(
            "Saved file '{}' as '{}' (field: {})",
            original_name, relative, field_hint
        );
        Ok(relative)
    }
}

fn extension_of(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
}

/// Strips directory components and anything outside a conservative character
/// set from a client-supplied filename.
fn sanitize_filename(name: &str) -> String {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_matches('.').to_string();
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}
