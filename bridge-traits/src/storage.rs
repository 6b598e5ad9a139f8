//! Local File System Abstraction
//!
//! The sync engine never touches `std::fs` directly; every read, write and
//! delete against the mirror tree goes through [`FileSystemAccess`] so the
//! engine can be exercised against a scratch directory or a fake.

use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// File metadata information
#[derive(Debug, Clone)]
pub struct FileMetadata {
    pub size: u64,
    /// Metadata-change time (`st_ctime`) in Unix seconds. Platforms without
    /// a change time report the creation time instead.
    pub changed_at: Option<i64>,
    pub modified_at: Option<i64>,
    pub is_directory: bool,
    pub is_file: bool,
    /// The path itself is a symbolic link; `is_directory`/`is_file`
    /// describe its target.
    pub is_symlink: bool,
}

/// File system access trait
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::FileSystemAccess;
///
/// async fn store(fs: &dyn FileSystemAccess, dir: &Path, data: Bytes) -> Result<()> {
///     fs.create_dir_all(dir).await?;
///     fs.write_file_atomic(&dir.join("photo.jpg"), data).await
/// }
/// ```
#[async_trait]
pub trait FileSystemAccess: Send + Sync {
    /// Check if a file or directory exists
    async fn exists(&self, path: &Path) -> Result<bool>;

    /// Get metadata for a file or directory
    async fn metadata(&self, path: &Path) -> Result<FileMetadata>;

    /// Create a directory and all parent directories if they don't exist
    async fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Replace the contents of `path` with `data`.
    ///
    /// The bytes are written to a sibling temporary file which is then
    /// renamed over `path`, so a failed write never leaves a truncated file
    /// behind under the final name.
    async fn write_file_atomic(&self, path: &Path, data: Bytes) -> Result<()>;

    /// Delete a file
    async fn delete_file(&self, path: &Path) -> Result<()>;

    /// Delete an empty directory
    async fn delete_dir(&self, path: &Path) -> Result<()>;

    /// List the immediate entries of a directory
    async fn list_directory(&self, path: &Path) -> Result<Vec<PathBuf>>;
}
