//! Run outcome: every decision taken and every non-fatal failure.

use bridge_traits::library::SizeDirective;
use std::fmt;
use std::path::PathBuf;

use crate::error::DeleteFailure;

/// A filesystem change the engine made, or would make in a dry run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncAction {
    CreateDirectory {
        path: PathBuf,
    },
    /// `directive` is `None` when the size selector says not to fetch bytes
    Materialize {
        path: PathBuf,
        directive: Option<SizeDirective>,
    },
    DeleteFile {
        path: PathBuf,
    },
    DeleteDirectory {
        path: PathBuf,
    },
}

impl SyncAction {
    pub fn path(&self) -> &PathBuf {
        match self {
            SyncAction::CreateDirectory { path }
            | SyncAction::Materialize { path, .. }
            | SyncAction::DeleteFile { path }
            | SyncAction::DeleteDirectory { path } => path,
        }
    }
}

/// What went wrong for one entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    Timestamp(String),
    Metadata(String),
    Fetch(String),
    Write(String),
    Delete(DeleteFailure),
    Listing(String),
    CreateDirectory(String),
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Timestamp(msg) => write!(f, "bad timestamp: {}", msg),
            FailureKind::Metadata(msg) => write!(f, "cannot inspect: {}", msg),
            FailureKind::Fetch(msg) => write!(f, "fetch failed: {}", msg),
            FailureKind::Write(msg) => write!(f, "write failed: {}", msg),
            FailureKind::Delete(reason) => write!(f, "delete failed: {}", reason),
            FailureKind::Listing(msg) => write!(f, "listing failed: {}", msg),
            FailureKind::CreateDirectory(msg) => write!(f, "mkdir failed: {}", msg),
        }
    }
}

/// A non-fatal failure tied to a local path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncFailure {
    pub path: PathBuf,
    pub kind: FailureKind,
}

/// Counters for one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncStats {
    pub items_listed: u64,
    pub items_excluded: u64,
    pub collections_listed: u64,
    pub collections_excluded: u64,
    /// Entries whose local copy was already current
    pub up_to_date: u64,
    pub downloaded: u64,
    /// Downloads that a dry run would have performed
    pub planned_downloads: u64,
    /// Stale entries left alone because the size selector is `Skip`
    pub skipped_downloads: u64,
    pub files_deleted: u64,
    pub directories_deleted: u64,
}

/// Everything a run decided
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    pub dry_run: bool,
    pub stats: SyncStats,
    pub actions: Vec<SyncAction>,
    pub failures: Vec<SyncFailure>,
}

impl SyncReport {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Default::default()
        }
    }

    pub fn record(&mut self, action: SyncAction) {
        match &action {
            SyncAction::Materialize { directive: Some(_), .. } => {
                if self.dry_run {
                    self.stats.planned_downloads += 1;
                } else {
                    self.stats.downloaded += 1;
                }
            }
            SyncAction::Materialize { directive: None, .. } => {
                self.stats.skipped_downloads += 1;
            }
            SyncAction::DeleteFile { .. } => self.stats.files_deleted += 1,
            SyncAction::DeleteDirectory { .. } => self.stats.directories_deleted += 1,
            SyncAction::CreateDirectory { .. } => {}
        }
        self.actions.push(action);
    }

    pub fn fail(&mut self, path: impl Into<PathBuf>, kind: FailureKind) {
        self.failures.push(SyncFailure {
            path: path.into(),
            kind,
        });
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Paths of the files deleted (or to be deleted)
    pub fn deleted_files(&self) -> impl Iterator<Item = &PathBuf> {
        self.actions.iter().filter_map(|action| match action {
            SyncAction::DeleteFile { path } => Some(path),
            _ => None,
        })
    }

    /// Paths of the directories deleted (or to be deleted)
    pub fn deleted_directories(&self) -> impl Iterator<Item = &PathBuf> {
        self.actions.iter().filter_map(|action| match action {
            SyncAction::DeleteDirectory { path } => Some(path),
            _ => None,
        })
    }

    /// Paths materialized (or to be materialized) with a fetch
    pub fn materialized(&self) -> impl Iterator<Item = &PathBuf> {
        self.actions.iter().filter_map(|action| match action {
            SyncAction::Materialize {
                path,
                directive: Some(_),
            } => Some(path),
            _ => None,
        })
    }
}
