//! Transient on-disk copy of an uploaded resume.
//!
//! The file lives only while a `ScratchFile` value is alive: dropping it removes
//! the file, so every exit path of the estimate pipeline (success, error, or a
//! cancelled request future) cleans up.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use bytes::Bytes;
use tempfile::NamedTempFile;
use tracing::{debug, warn};
use uuid::Uuid;

const MAX_NAME_LEN: usize = 100;
const MAX_EXTENSION_LEN: usize = 16;
const FALLBACK_NAME: &str = "upload";

pub struct ScratchFile {
    path: PathBuf,
    file: Option<NamedTempFile>,
}

impl ScratchFile {
    /// Writes `bytes` to `<dir>/<request_id>-<sanitized file name>`.
    pub async fn persist(
        dir: &Path,
        request_id: Uuid,
        file_name: &str,
        bytes: Bytes,
    ) -> io::Result<Self> {
        let dir = dir.to_path_buf();
        let prefix = format!("{request_id}-");
        let suffix = sanitize_file_name(file_name);

        let file = tokio::task::spawn_blocking(move || -> io::Result<NamedTempFile> {
            let mut file = tempfile::Builder::new()
                .prefix(&prefix)
                .suffix(&suffix)
                .rand_bytes(0)
                .tempfile_in(&dir)?;
            file.write_all(&bytes)?;
            file.flush()?;
            Ok(file)
        })
        .await
        .map_err(io::Error::other)??;

        let path = file.path().to_path_buf();
        debug!("Staged scratch file {}", path.display());
        Ok(Self {
            path,
            file: Some(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            match file.close() {
                Ok(()) => debug!("Removed scratch file {}", self.path.display()),
                Err(e) => warn!("Failed to remove scratch file {}: {e}", self.path.display()),
            }
        }
    }
}

/// Reduces a client-supplied file name to a safe single path component.
fn sanitize_file_name(file_name: &str) -> String {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    // Every char maps to one ASCII char, so byte offsets below are char boundaries.
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.trim_matches('.').is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        truncate_keeping_extension(cleaned)
    }
}

/// Shortens the stem so the name fits `MAX_NAME_LEN` with its extension intact.
fn truncate_keeping_extension(name: String) -> String {
    if name.len() <= MAX_NAME_LEN {
        return name;
    }
    match name.rfind('.') {
        Some(dot) if dot > 0 && name.len() - dot <= MAX_EXTENSION_LEN => {
            let extension = &name[dot..];
            format!("{}{extension}", &name[..MAX_NAME_LEN - extension.len()])
        }
        _ => name[..MAX_NAME_LEN].to_string(),
    }
}
