//! Buffers one multipart/form-data payload into the flat field and file
//! mappings the parser consumes, enforcing the configured size cap while
//! draining.

use super::parser::{RawForm, UploadedFile};
use actix_multipart::{Multipart, MultipartError};
use futures_util::StreamExt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReadFormError {
    /// The summed part bodies exceeded the configured byte limit.
    #[error("multipart payload exceeds the {0}-byte limit")]
    TooLarge(usize),
    #[error(transparent)]
    Multipart(#[from] MultipartError),
}

/// Drains the multipart stream. Parts with a filename in their content
/// disposition become [`UploadedFile`]s; everything else is decoded as text.
/// Unnamed parts are skipped.
///
/// `limit` bounds the total bytes buffered across all parts; crossing it
/// aborts the read, since the raw `Multipart` extractor does not consult
/// `PayloadConfig`.
pub async fn read_form(
    mut payload: Multipart,
    limit: usize,
) -> Result<(RawForm, Vec<UploadedFile>), ReadFormError> {
    let mut form = RawForm::new();
    let mut files = Vec::new();
    let mut total = 0usize;

    while let Some(item) = payload.next().await {
        let mut field = item?;
        let name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()));
        let Some(name) = name else {
            continue;
        };
        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename().map(|f| f.to_string()));

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk?;
            total = total.saturating_add(chunk.len());
            if total > limit {
                return Err(ReadFormError::TooLarge(limit));
            }
            bytes.extend_from_slice(&chunk);
        }

        match filename {
            Some(original_name) => files.push(UploadedFile {
                field: name,
                original_name,
                bytes,
            }),
            None => form.push(name, String::from_utf8_lossy(&bytes).into_owned()),
        }
    }

    Ok((form, files))
}
