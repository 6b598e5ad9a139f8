//! # Sync Planning
//!
//! Walks one [`SyncScope`] (a target directory plus a lazy listing of remote
//! entries) and materializes every entry whose local copy is missing or
//! stale.
//!
//! ## Per entry
//! 1. Skip it entirely if the exclusion filter matches its filename
//! 2. Evaluate staleness against `target_dir/filename`
//! 3. When stale: fetch with the directive for its kind and size, then write
//!    it atomically (dry runs only record the intent)
//! 4. When file reconciliation is on, note the name as observed, whether or
//!    not anything was downloaded
//!
//! A failure on one entry is recorded in the [`SyncReport`] and the walk
//! moves on. Only a listing failure ends the scope early.

use bridge_traits::library::{MediaKind, MediaLibrary, RemoteEntry, SizeDirective};
use bridge_traits::storage::FileSystemAccess;
use core_runtime::config::{MirrorConfig, SizeSelector};
use std::borrow::Cow;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::error::{Result, SyncError};
use crate::filter::NameFilter;
use crate::pager::Pager;
use crate::report::{FailureKind, SyncAction, SyncReport};
use crate::staleness::StalenessEvaluator;

/// Map a remote filename or title to a single safe path component.
///
/// Separators become `_`, and names that would resolve to the directory
/// itself or its parent are replaced outright.
pub fn local_name(name: &str) -> Cow<'_, str> {
    match name {
        "" | "." | ".." => Cow::Owned("_".repeat(name.len().max(1))),
        _ if name.contains(['/', '\\']) => Cow::Owned(name.replace(['/', '\\'], "_")),
        _ => Cow::Borrowed(name),
    }
}

/// Directive sent to the fetch service, or `None` when nothing is fetched
pub fn directive_for(kind: MediaKind, size: SizeSelector) -> Option<SizeDirective> {
    match (size, kind) {
        (SizeSelector::Skip, _) => None,
        (_, MediaKind::Video) => Some(SizeDirective::Motion),
        (SizeSelector::Full, MediaKind::Photo) => Some(SizeDirective::Full),
        (SizeSelector::Bounded { width, height }, MediaKind::Photo) => {
            Some(SizeDirective::Bounded { width, height })
        }
    }
}

/// Local names seen in a scope that must survive file reconciliation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObservedNameSet {
    names: HashSet<String>,
}

impl ObservedNameSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        self.names.insert(name.into())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for ObservedNameSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// One directory's worth of work
pub struct SyncScope {
    pub target_dir: PathBuf,
    pub entries: Pager<RemoteEntry>,
}

impl SyncScope {
    pub fn new(target_dir: impl Into<PathBuf>, entries: Pager<RemoteEntry>) -> Self {
        Self {
            target_dir: target_dir.into(),
            entries,
        }
    }
}

pub struct SyncPlanner {
    config: Arc<MirrorConfig>,
    library: Arc<dyn MediaLibrary>,
    fs: Arc<dyn FileSystemAccess>,
    filter: Arc<NameFilter>,
    staleness: StalenessEvaluator,
}

impl SyncPlanner {
    pub fn new(
        config: Arc<MirrorConfig>,
        library: Arc<dyn MediaLibrary>,
        fs: Arc<dyn FileSystemAccess>,
        filter: Arc<NameFilter>,
        staleness: StalenessEvaluator,
    ) -> Self {
        Self {
            config,
            library,
            fs,
            filter,
            staleness,
        }
    }

    /// Process every entry of `scope`, returning the names observed.
    ///
    /// The set stays empty unless file reconciliation is enabled.
    #[instrument(skip_all, fields(dir = %scope.target_dir.display(), listing = %scope.entries.context()))]
    pub async fn run(&self, scope: SyncScope, report: &mut SyncReport) -> Result<ObservedNameSet> {
        let SyncScope {
            target_dir,
            mut entries,
        } = scope;
        let mut observed = ObservedNameSet::new();

        while let Some(entry) = entries.next().await? {
            report.stats.items_listed += 1;

            if self.filter.is_excluded(&entry.filename) {
                report.stats.items_excluded += 1;
                debug!(filename = %entry.filename, "Excluded by pattern");
                continue;
            }

            let name = local_name(&entry.filename);
            let path = target_dir.join(name.as_ref());

            match self.staleness.is_required(&entry.creation_time, &path).await {
                Ok(true) => self.materialize(&entry, path, report).await,
                Ok(false) => {
                    report.stats.up_to_date += 1;
                    debug!(path = ?path, "Up to date");
                }
                Err(e) => {
                    warn!(path = ?path, error = %e, "Cannot evaluate entry");
                    let kind = match &e {
                        SyncError::InvalidTimestamp { .. } => FailureKind::Timestamp(e.to_string()),
                        _ => FailureKind::Metadata(e.to_string()),
                    };
                    report.fail(path, kind);
                }
            }

            if self.config.delete_files {
                observed.insert(name.into_owned());
            }
        }

        debug!(
            pages = entries.pages_fetched(),
            observed = observed.len(),
            "Scope finished"
        );
        Ok(observed)
    }

    async fn materialize(&self, entry: &RemoteEntry, path: PathBuf, report: &mut SyncReport) {
        let directive = match directive_for(entry.kind, self.config.size) {
            Some(directive) => directive,
            None => {
                debug!(path = ?path, "Stale, but downloads are disabled");
                report.record(SyncAction::Materialize {
                    path,
                    directive: None,
                });
                return;
            }
        };

        if self.config.dry_run {
            if !self.config.quiet {
                info!(path = ?path, ?directive, "Would download");
            }
            report.record(SyncAction::Materialize {
                path,
                directive: Some(directive),
            });
            return;
        }

        if let Err(kind) = self.download(entry, &path, directive).await {
            warn!(path = ?path, error = %kind, "Download failed");
            report.fail(path, kind);
            return;
        }

        if !self.config.quiet {
            info!(path = ?path, "Downloaded");
        }
        report.record(SyncAction::Materialize {
            path,
            directive: Some(directive),
        });
    }

    async fn download(
        &self,
        entry: &RemoteEntry,
        path: &Path,
        directive: SizeDirective,
    ) -> std::result::Result<(), FailureKind> {
        let data = self
            .library
            .fetch(&entry.base_url, directive)
            .await
            .map_err(|e| FailureKind::Fetch(e.to_string()))?;

        self.fs
            .write_file_atomic(path, data)
            .await
            .map_err(|e| FailureKind::Write(e.to_string()))
    }
}
