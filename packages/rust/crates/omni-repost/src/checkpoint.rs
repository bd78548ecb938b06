//! Durable cursor of the last delivered post.

use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
    #[error("checkpoint file {path} does not exist; create it with the id of the last post already in the channel")]
    Missing { path: PathBuf },
    #[error("checkpoint file {path} holds {content:?}, expected a decimal post id")]
    Invalid { path: PathBuf, content: String },
    #[error("checkpoint I/O on {path} failed: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// `last_id.txt` plus the `last_check.txt` timestamp companion.
#[derive(Debug, Clone)]
pub struct FileCheckpoint {
    id_path: PathBuf,
    last_check_path: PathBuf,
}

impl FileCheckpoint {
    pub fn new(id_path: impl Into<PathBuf>, last_check_path: impl Into<PathBuf>) -> Self {
        Self {
            id_path: id_path.into(),
            last_check_path: last_check_path.into(),
        }
    }

    pub fn id_path(&self) -> &Path {
        &self.id_path
    }

    pub async fn load(&self) -> Result<i64, CheckpointError> {
        let raw = match tokio::fs::read_to_string(&self.id_path).await {
            Ok(raw) => raw,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                return Err(CheckpointError::Missing {
                    path: self.id_path.clone(),
                });
            }
            Err(source) => {
                return Err(CheckpointError::Io {
                    path: self.id_path.clone(),
                    source,
                });
            }
        };
        raw.trim()
            .parse::<i64>()
            .map_err(|_| CheckpointError::Invalid {
                path: self.id_path.clone(),
                content: raw.trim().to_string(),
            })
    }

    /// Replace the stored id. Written to a sibling file then renamed, so a
    /// crash never leaves a truncated id behind.
    pub async fn store(&self, post_id: i64) -> Result<(), CheckpointError> {
        write_replacing(&self.id_path, &post_id.to_string()).await?;
        tracing::info!(post_id, path = %self.id_path.display(), "checkpoint advanced");
        Ok(())
    }

    /// Record when the last poll cycle completed (RFC 3339, local time).
    pub async fn touch_last_check(&self) -> Result<(), CheckpointError> {
        let now = chrono::Local::now().to_rfc3339();
        write_replacing(&self.last_check_path, &now).await?;
        tracing::debug!(at = %now, path = %self.last_check_path.display(), "last check recorded");
        Ok(())
    }
}

async fn write_replacing(path: &Path, content: &str) -> Result<(), CheckpointError> {
    let io_error = |source| CheckpointError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(io_error)?;
    }
    let mut staging = path.as_os_str().to_owned();
    staging.push(".tmp");
    let staging = PathBuf::from(staging);
    tokio::fs::write(&staging, content).await.map_err(io_error)?;
    tokio::fs::rename(&staging, path).await.map_err(io_error)
}
