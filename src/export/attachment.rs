//! Save retrieved attachments to disk.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{Result, TrideskError};
use crate::model::message::AttachmentRef;
use crate::parser::body::decode_transport;
use crate::store::{AttachmentFetcher, FetchedAttachment};

/// Longest file name component written, in characters.
const MAX_FILENAME_LEN: usize = 150;

/// Decode a fetched attachment and write it under `output_dir`.
///
/// The name is sanitized and never overwrites an existing file: a counter is
/// appended instead. Returns the path written.
pub fn save_attachment(
    fetched: &FetchedAttachment,
    filename: &str,
    output_dir: &Path,
) -> Result<PathBuf> {
    let data = decode_transport(&fetched.data)?;

    std::fs::create_dir_all(output_dir).map_err(|e| TrideskError::io(output_dir, e))?;
    let path = unique_path(&output_dir.join(sanitize_filename_part(filename, MAX_FILENAME_LEN)));
    std::fs::write(&path, &data).map_err(|e| TrideskError::io(&path, e))?;

    info!(path = %path.display(), bytes = data.len(), "Saved attachment");
    Ok(path)
}

/// Fetch one attachment of a normalized message and save it.
pub async fn download_attachment<F>(
    fetcher: &F,
    message_id: &str,
    attachment: &AttachmentRef,
    credential: &str,
    output_dir: &Path,
) -> Result<PathBuf>
where
    F: AttachmentFetcher + ?Sized,
{
    let fetched = fetcher
        .fetch_attachment(message_id, &attachment.attachment_id, credential)
        .await?;
    save_attachment(&fetched, &attachment.filename, output_dir)
}

/// Replace anything outside `[A-Za-z0-9._@-]` (Unicode letters and digits
/// included) with `_`, truncate, and refuse names that are only dots.
pub fn sanitize_filename_part(s: &str, max_len: usize) -> String {
    let sanitized: String = s
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '.' || c == '_' || c == '@' {
                c
            } else {
                '_'
            }
        })
        .take(max_len)
        .collect();
    let sanitized = sanitized.trim_start_matches('.');

    if sanitized.is_empty() {
        "unknown".to_string()
    } else {
        sanitized.to_string()
    }
}

/// If `path` already exists, append a counter to make it unique.
fn unique_path(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }

    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("file");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let parent = path.parent().unwrap_or(Path::new("."));

    for i in 1..1000 {
        let candidate = if ext.is_empty() {
            parent.join(format!("{stem}_{i}"))
        } else {
            parent.join(format!("{stem}_{i}.{ext}"))
        };
        if !candidate.exists() {
            return candidate;
        }
    }

    parent.join(format!("{stem}_dup.{ext}"))
}
