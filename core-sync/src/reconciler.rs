//! # Reconciliation
//!
//! Deletes local content that the remote side no longer has.
//!
//! - **File level**: regular files in a scope directory whose names were not
//!   observed. Subdirectories are never touched.
//! - **Directory level**: subdirectories of the target root whose names are
//!   not in the kept collection set, removed recursively. Loose files in the
//!   root are never touched.
//!
//! Every deletion failure is classified and recorded; none is fatal.

use bridge_traits::error::BridgeError;
use bridge_traits::storage::FileSystemAccess;
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::DeleteFailure;
use crate::planner::ObservedNameSet;
use crate::report::{FailureKind, SyncAction, SyncReport};

pub struct Reconciler {
    fs: Arc<dyn FileSystemAccess>,
    dry_run: bool,
    quiet: bool,
}

impl Reconciler {
    pub fn new(fs: Arc<dyn FileSystemAccess>, dry_run: bool, quiet: bool) -> Self {
        Self { fs, dry_run, quiet }
    }

    /// Delete files in `dir` that are not in `observed`
    pub async fn reconcile_files(
        &self,
        dir: &Path,
        observed: &ObservedNameSet,
        report: &mut SyncReport,
    ) {
        let entries = match self.list(dir, report).await {
            Some(entries) => entries,
            None => return,
        };

        for path in entries {
            let Some(name) = Self::utf8_name(&path) else {
                continue;
            };
            if observed.contains(name) {
                continue;
            }

            match self.fs.metadata(&path).await {
                Ok(metadata) if metadata.is_file => {}
                Ok(_) => continue,
                Err(e) if e.io_kind() == Some(io::ErrorKind::NotFound) => continue,
                Err(e) => {
                    warn!(path = ?path, error = %e, "Cannot inspect entry");
                    report.fail(path, FailureKind::Metadata(e.to_string()));
                    continue;
                }
            }

            if self.dry_run {
                if !self.quiet {
                    info!(path = ?path, "Would delete file");
                }
                report.record(SyncAction::DeleteFile { path });
                continue;
            }

            match self.fs.delete_file(&path).await {
                Ok(()) => {
                    if !self.quiet {
                        info!(path = ?path, "Deleted file");
                    }
                    report.record(SyncAction::DeleteFile { path });
                }
                Err(e) => {
                    let reason = DeleteFailure::from(&e);
                    warn!(path = ?path, %reason, "Cannot delete file");
                    report.fail(path, FailureKind::Delete(reason));
                }
            }
        }
    }

    /// Recursively delete subdirectories of `root` whose names are not kept
    pub async fn reconcile_directories(
        &self,
        root: &Path,
        kept: &HashSet<String>,
        report: &mut SyncReport,
    ) {
        let entries = match self.list(root, report).await {
            Some(entries) => entries,
            None => return,
        };

        for path in entries {
            let Some(name) = Self::utf8_name(&path) else {
                continue;
            };
            if kept.contains(name) {
                continue;
            }

            match self.fs.metadata(&path).await {
                Ok(metadata) if metadata.is_directory && metadata.is_symlink => {
                    warn!(path = ?path, "Not following symlinked directory");
                    continue;
                }
                Ok(metadata) if metadata.is_directory => {}
                Ok(_) => continue,
                Err(e) if e.io_kind() == Some(io::ErrorKind::NotFound) => continue,
                Err(e) => {
                    warn!(path = ?path, error = %e, "Cannot inspect entry");
                    report.fail(path, FailureKind::Metadata(e.to_string()));
                    continue;
                }
            }

            if self.dry_run {
                if !self.quiet {
                    info!(path = ?path, "Would delete directory");
                }
                report.record(SyncAction::DeleteDirectory { path });
                continue;
            }

            match self.remove_tree(&path).await {
                Ok(0) => {
                    if !self.quiet {
                        info!(path = ?path, "Deleted directory");
                    }
                    report.record(SyncAction::DeleteDirectory { path });
                }
                Ok(ignored) => {
                    warn!(path = ?path, ignored, "Deleted directory, some entries could not be removed");
                    report.record(SyncAction::DeleteDirectory { path });
                }
                Err(e) => {
                    let reason = DeleteFailure::from(&e);
                    warn!(path = ?path, %reason, "Cannot delete directory");
                    report.fail(path, FailureKind::Delete(reason));
                }
            }
        }
    }

    /// Post-order removal of `root` that never follows symlinks.
    ///
    /// Errors inside the tree are skipped and counted. Only failing to remove
    /// `root` itself is returned as an error.
    async fn remove_tree(&self, root: &Path) -> Result<usize, BridgeError> {
        let mut ignored = 0;
        let mut stack: Vec<(PathBuf, bool)> = vec![(root.to_path_buf(), false)];

        while let Some((dir, children_done)) = stack.pop() {
            if children_done {
                if let Err(e) = self.fs.delete_dir(&dir).await {
                    if dir == root {
                        return Err(e);
                    }
                    debug!(path = ?dir, error = %e, "Ignoring directory removal error");
                    ignored += 1;
                }
                continue;
            }

            let entries = match self.fs.list_directory(&dir).await {
                Ok(entries) => entries,
                Err(e) if dir == root => return Err(e),
                Err(e) => {
                    debug!(path = ?dir, error = %e, "Ignoring listing error");
                    ignored += 1;
                    continue;
                }
            };
            stack.push((dir, true));

            for entry in entries {
                let descend = match self.fs.metadata(&entry).await {
                    Ok(metadata) => metadata.is_directory && !metadata.is_symlink,
                    Err(_) => false,
                };

                if descend {
                    stack.push((entry, false));
                } else if let Err(e) = self.fs.delete_file(&entry).await {
                    debug!(path = ?entry, error = %e, "Ignoring file removal error");
                    ignored += 1;
                }
            }
        }

        Ok(ignored)
    }

    /// Directory listing where a missing directory reads as empty
    async fn list(&self, dir: &Path, report: &mut SyncReport) -> Option<Vec<PathBuf>> {
        match self.fs.list_directory(dir).await {
            Ok(entries) => Some(entries),
            Err(e) if e.io_kind() == Some(io::ErrorKind::NotFound) => {
                debug!(path = ?dir, "Nothing to reconcile, directory is missing");
                None
            }
            Err(e) => {
                warn!(path = ?dir, error = %e, "Cannot list directory for reconciliation");
                report.fail(dir, FailureKind::Listing(e.to_string()));
                None
            }
        }
    }

    fn utf8_name(path: &Path) -> Option<&str> {
        let name = path.file_name()?;
        let name = name.to_str();
        if name.is_none() {
            warn!(path = ?path, "Skipping entry with a non UTF-8 name");
        }
        name
    }
}
