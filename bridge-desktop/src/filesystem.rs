//! File System Access Implementation using Tokio

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    storage::{FileMetadata, FileSystemAccess},
};
use bytes::Bytes;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// Suffix of the scratch file written next to a download target
const TEMP_SUFFIX: &str = ".gpsync-part";

/// Tokio-based file system implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFileSystem;

impl TokioFileSystem {
    pub fn new() -> Self {
        Self
    }

    /// Convert std::io::Error to BridgeError
    fn map_io_error(e: std::io::Error) -> BridgeError {
        BridgeError::Io(e)
    }

    fn unix_secs(time: std::io::Result<SystemTime>) -> Option<i64> {
        time.ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs() as i64)
    }

    #[cfg(unix)]
    fn changed_at(metadata: &std::fs::Metadata) -> Option<i64> {
        use std::os::unix::fs::MetadataExt;
        Some(metadata.ctime())
    }

    #[cfg(not(unix))]
    fn changed_at(metadata: &std::fs::Metadata) -> Option<i64> {
        Self::unix_secs(metadata.created())
    }

    fn temp_path_for(path: &Path) -> Result<PathBuf> {
        let file_name = path.file_name().ok_or_else(|| {
            BridgeError::OperationFailed(format!("Not a file path: {}", path.display()))
        })?;
        let mut temp_name = std::ffi::OsString::from(".");
        temp_name.push(file_name);
        temp_name.push(TEMP_SUFFIX);
        Ok(path.with_file_name(temp_name))
    }

    async fn write_then_rename(temp: &Path, path: &Path, data: &[u8]) -> std::io::Result<()> {
        let mut file = fs::File::create(temp).await?;
        file.write_all(data).await?;
        file.flush().await?;
        file.sync_all().await?;
        drop(file);
        fs::rename(temp, path).await
    }
}

#[async_trait]
impl FileSystemAccess for TokioFileSystem {
    async fn exists(&self, path: &Path) -> Result<bool> {
        fs::try_exists(path).await.map_err(Self::map_io_error)
    }

    async fn metadata(&self, path: &Path) -> Result<FileMetadata> {
        let link_metadata = fs::symlink_metadata(path)
            .await
            .map_err(Self::map_io_error)?;
        let is_symlink = link_metadata.file_type().is_symlink();
        let metadata = if is_symlink {
            fs::metadata(path).await.unwrap_or(link_metadata)
        } else {
            link_metadata
        };

        Ok(FileMetadata {
            size: metadata.len(),
            changed_at: Self::changed_at(&metadata),
            modified_at: Self::unix_secs(metadata.modified()),
            is_directory: metadata.is_dir(),
            is_file: metadata.is_file(),
            is_symlink,
        })
    }

    async fn create_dir_all(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path)
            .await
            .map_err(Self::map_io_error)?;
        debug!(path = ?path, "Created directory");
        Ok(())
    }

    async fn write_file_atomic(&self, path: &Path, data: Bytes) -> Result<()> {
        let temp = Self::temp_path_for(path)?;

        if let Err(e) = Self::write_then_rename(&temp, path, data.as_ref()).await {
            if let Err(cleanup) = fs::remove_file(&temp).await {
                if cleanup.kind() != std::io::ErrorKind::NotFound {
                    warn!(path = ?temp, error = %cleanup, "Failed to remove partial file");
                }
            }
            return Err(Self::map_io_error(e));
        }

        debug!(path = ?path, size = data.len(), "Wrote file");
        Ok(())
    }

    async fn delete_file(&self, path: &Path) -> Result<()> {
        fs::remove_file(path).await.map_err(Self::map_io_error)?;
        debug!(path = ?path, "Deleted file");
        Ok(())
    }

    async fn delete_dir(&self, path: &Path) -> Result<()> {
        fs::remove_dir(path).await.map_err(Self::map_io_error)?;
        debug!(path = ?path, "Deleted directory");
        Ok(())
    }

    async fn list_directory(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let mut entries = Vec::new();
        let mut read_dir = fs::read_dir(path).await.map_err(Self::map_io_error)?;

        while let Some(entry) = read_dir
            .next_entry()
            .await
            .map_err(Self::map_io_error)?
        {
            entries.push(entry.path());
        }

        debug!(path = ?path, count = entries.len(), "Listed directory");
        Ok(entries)
    }
}
