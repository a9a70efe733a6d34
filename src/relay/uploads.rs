use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use std::io;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

use crate::error::{RelayError, RelayResult};

pub const UNREADABLE_UPLOAD: &str = "No se pudo leer el archivo enviado";

/// An uploaded file written to the upload directory for the lifetime of one request.
///
/// Call [`StagedUpload::discard`] once the provider call has finished; dropping
/// the value without discarding removes the file synchronously instead.
#[derive(Debug)]
pub struct StagedUpload {
    path: PathBuf,
    file_name: String,
    content_type: Option<String>,
    len: u64,
    removed: bool,
}

impl StagedUpload {
    pub(crate) async fn create(
        dir: &Path,
        file_name: &str,
        content_type: Option<&str>,
    ) -> io::Result<(Self, tokio::fs::File)> {
        tokio::fs::create_dir_all(dir).await?;

        let path = dir.join(format!("{}{}", uuid::Uuid::new_v4(), extension_of(file_name)));
        let file = tokio::fs::File::create(&path).await?;

        let upload = Self {
            path,
            file_name: file_name.to_string(),
            content_type: content_type.map(str::to_string),
            len: 0,
            removed: false,
        };
        Ok((upload, file))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Remove the staged file. Already-missing files are not an error.
    pub async fn discard(mut self) {
        self.removed = true;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => log::debug!("Removed staged upload {}", self.path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => log::warn!(
                "Could not remove staged upload {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}

impl Drop for StagedUpload {
    fn drop(&mut self) {
        if !self.removed {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

/// Keep only a short alphanumeric extension from the client's file name.
fn extension_of(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default()
}

/// Stage the first non-empty file part of a multipart body.
///
/// Parts without a file name (plain form fields) and empty files are skipped,
/// so a form submitted with no file selected yields `Ok(None)`.
pub async fn stage_first_file(
    dir: &Path,
    multipart: &mut Multipart,
) -> RelayResult<Option<StagedUpload>> {
    while let Some(mut field) = multipart.next_field().await.map_err(unreadable)? {
        let file_name = match field.file_name() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => continue,
        };
        let content_type = field.content_type().map(str::to_string);

        let (mut upload, mut file) =
            StagedUpload::create(dir, &file_name, content_type.as_deref()).await?;

        while let Some(chunk) = field.chunk().await.map_err(unreadable)? {
            file.write_all(&chunk).await?;
            upload.len += chunk.len() as u64;
        }
        file.flush().await?;
        drop(file);

        if upload.is_empty() {
            upload.discard().await;
            continue;
        }

        log::debug!(
            "Staged upload {:?} ({} bytes) at {}",
            upload.file_name,
            upload.len,
            upload.path.display()
        );
        return Ok(Some(upload));
    }

    Ok(None)
}

fn unreadable(error: MultipartError) -> RelayError {
    log::warn!("Unreadable multipart body ({}): {}", error.status(), error);
    RelayError::validation(UNREADABLE_UPLOAD)
}
