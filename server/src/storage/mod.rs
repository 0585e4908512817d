//! Event attachments on the local filesystem.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use axum::body::Bytes;
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info};
use uuid::Uuid;

pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "png", "jpg", "jpeg"];

#[derive(Debug, Error)]
pub enum AttachmentError {
    #[error("Only images and PDF files are allowed (got '{0}')")]
    DisallowedType(String),

    #[error("Attachment exceeds the limit of {0} bytes")]
    TooLarge(usize),

    #[error("Attachment storage failed: {0}")]
    Io(#[from] std::io::Error),
}

/// A file received with an event form.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Bytes,
}

#[derive(Debug, Clone)]
pub struct AttachmentStore {
    root: PathBuf,
    max_bytes: usize,
}

impl AttachmentStore {
    pub fn new(root: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            root: root.into(),
            max_bytes,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    pub async fn ensure_root(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.root).await
    }

    /// Type and size checks, run before anything touches the disk.
    pub fn check(&self, upload: &Upload) -> Result<(), AttachmentError> {
        let extension = extension(&upload.file_name).unwrap_or_default();
        if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(AttachmentError::DisallowedType(upload.file_name.clone()));
        }
        if upload.bytes.len() > self.max_bytes {
            return Err(AttachmentError::TooLarge(self.max_bytes));
        }
        Ok(())
    }

    /// Stores the upload and returns its name relative to the root.
    pub async fn save(&self, upload: &Upload) -> Result<String, AttachmentError> {
        self.check(upload)?;

        let name = format!(
            "{}_{}",
            Uuid::new_v4().simple(),
            sanitize_filename(&upload.file_name)
        );
        fs::write(self.root.join(&name), &upload.bytes).await?;

        info!(file = %name, bytes = upload.bytes.len(), "Stored attachment");
        Ok(name)
    }

    /// Deletes a stored attachment. A file that is already gone is fine.
    pub async fn remove(&self, name: &str) -> Result<(), AttachmentError> {
        let Some(path) = self.path_for(name) else {
            debug!(file = %name, "Ignoring attachment name outside the upload root");
            return Ok(());
        };

        match fs::remove_file(&path).await {
            Ok(()) => {
                info!(file = %name, "Removed attachment");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(file = %name, "Attachment already absent");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn path_for(&self, name: &str) -> Option<PathBuf> {
        let file_name = Path::new(name).file_name()?;
        (file_name == name).then(|| self.root.join(file_name))
    }
}

/// Reduces a client supplied file name to a safe single path component.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();

    let cleaned: String = base
        .chars()
        .filter_map(|c| match c {
            c if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') => Some(c),
            c if c.is_whitespace() => Some('_'),
            _ => None,
        })
        .collect();
    let cleaned = cleaned.trim_start_matches(['.', '_']);

    if cleaned.is_empty() {
        "attachment".to_string()
    } else {
        cleaned.to_string()
    }
}

fn extension(name: &str) -> Option<String> {
    let (_, ext) = name.rsplit_once('.')?;
    Some(ext.to_ascii_lowercase())
}
