//! # Mirror Drivers
//!
//! [`MirrorCoordinator`] is the entry point of a run. It prepares the target
//! root and dispatches on the configured mode:
//!
//! - **Items**: one flat scope over every media item, written into the root,
//!   followed by file reconciliation of the root.
//! - **Albums / shared albums**: a [`CollectionDriver`] walk, one scope and
//!   one subdirectory per collection, followed by directory reconciliation of
//!   the root.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use core_sync::MirrorCoordinator;
//!
//! let coordinator = MirrorCoordinator::new(config, library, fs, zone);
//! let report = coordinator.run().await?;
//! println!("{} downloaded", report.stats.downloaded);
//! ```

use bridge_traits::library::{CollectionKind, MediaLibrary, RemoteCollection};
use bridge_traits::storage::FileSystemAccess;
use bridge_traits::time::LocalZone;
use core_runtime::config::{MirrorConfig, SyncMode};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

use crate::error::{Result, SyncError};
use crate::filter::NameFilter;
use crate::pager::Pager;
use crate::planner::{local_name, SyncPlanner, SyncScope};
use crate::reconciler::Reconciler;
use crate::report::{FailureKind, SyncAction, SyncReport};
use crate::staleness::StalenessEvaluator;

/// Walks one collection listing and mirrors each collection into its own
/// subdirectory of the target root.
pub struct CollectionDriver<'a> {
    config: &'a MirrorConfig,
    library: Arc<dyn MediaLibrary>,
    fs: &'a dyn FileSystemAccess,
    filter: &'a NameFilter,
    planner: &'a SyncPlanner,
    reconciler: &'a Reconciler,
    next_untitled: u32,
    kept: HashSet<String>,
}

impl<'a> CollectionDriver<'a> {
    pub fn new(
        config: &'a MirrorConfig,
        library: Arc<dyn MediaLibrary>,
        fs: &'a dyn FileSystemAccess,
        filter: &'a NameFilter,
        planner: &'a SyncPlanner,
        reconciler: &'a Reconciler,
    ) -> Self {
        Self {
            config,
            library,
            fs,
            filter,
            planner,
            reconciler,
            next_untitled: 1,
            kept: HashSet::new(),
        }
    }

    /// The collection's title, or the next `Untitled <n>` placeholder
    pub fn resolve_title(&mut self, collection: &RemoteCollection) -> String {
        match collection.title.as_deref() {
            Some(title) if !title.is_empty() => title.to_string(),
            _ => {
                let title = format!("Untitled {}", self.next_untitled);
                self.next_untitled += 1;
                title
            }
        }
    }

    /// Directory names protected from directory reconciliation
    pub fn kept(&self) -> &HashSet<String> {
        &self.kept
    }

    #[instrument(skip(self, report))]
    pub async fn run(&mut self, kind: CollectionKind, report: &mut SyncReport) -> Result<()> {
        let config = self.config;
        let root = config.target_root();
        let mut collections = Pager::collections(Arc::clone(&self.library), kind);

        while let Some(collection) = collections.next().await? {
            report.stats.collections_listed += 1;
            let title = self.resolve_title(&collection);

            if self.filter.is_excluded(&title) {
                report.stats.collections_excluded += 1;
                if !config.quiet {
                    info!(title = %title, "Skipping excluded collection");
                }
                continue;
            }

            let dir_name = local_name(&title).into_owned();
            let dir = root.join(&dir_name);
            if !config.quiet {
                info!(title = %title, dir = ?dir, "Syncing collection");
            }

            if let Err(e) = ensure_directory(self.fs, &dir, config.dry_run, report).await {
                error!(dir = ?dir, error = %e, "Cannot create collection directory");
                report.fail(&dir, FailureKind::CreateDirectory(e.to_string()));
                self.kept.insert(dir_name);
                continue;
            }

            let scope = SyncScope::new(
                &dir,
                Pager::collection_items(Arc::clone(&self.library), &collection.id),
            );
            match self.planner.run(scope, report).await {
                Ok(observed) => {
                    if config.delete_files {
                        self.reconciler.reconcile_files(&dir, &observed, report).await;
                    }
                }
                Err(e) if e.is_auth() => {
                    error!(title = %title, error = %e, "Credentials rejected, aborting run");
                    return Err(e);
                }
                Err(e) => {
                    error!(title = %title, error = %e, "Collection listing failed, moving on");
                    report.fail(&dir, FailureKind::Listing(e.to_string()));
                }
            }

            self.kept.insert(dir_name);
        }

        if config.delete_directories {
            self.reconciler
                .reconcile_directories(root, &self.kept, report)
                .await;
        }

        Ok(())
    }
}

/// Create `dir` unless it exists. Dry runs only record the intent.
async fn ensure_directory(
    fs: &dyn FileSystemAccess,
    dir: &Path,
    dry_run: bool,
    report: &mut SyncReport,
) -> Result<()> {
    let exists = fs
        .exists(dir)
        .await
        .map_err(|e| SyncError::filesystem(dir, e))?;
    if exists {
        return Ok(());
    }

    if !dry_run {
        fs.create_dir_all(dir)
            .await
            .map_err(|e| SyncError::filesystem(dir, e))?;
    }
    report.record(SyncAction::CreateDirectory {
        path: dir.to_path_buf(),
    });
    Ok(())
}

/// Entry point of a mirror run
pub struct MirrorCoordinator {
    config: Arc<MirrorConfig>,
    library: Arc<dyn MediaLibrary>,
    fs: Arc<dyn FileSystemAccess>,
    filter: Arc<NameFilter>,
    planner: SyncPlanner,
    reconciler: Reconciler,
}

impl MirrorCoordinator {
    pub fn new(
        config: MirrorConfig,
        library: Arc<dyn MediaLibrary>,
        fs: Arc<dyn FileSystemAccess>,
        zone: Arc<dyn LocalZone>,
    ) -> Self {
        let config = Arc::new(config);
        let filter = Arc::new(NameFilter::from_config(&config));
        let staleness = StalenessEvaluator::new(Arc::clone(&fs), zone);
        let planner = SyncPlanner::new(
            Arc::clone(&config),
            Arc::clone(&library),
            Arc::clone(&fs),
            Arc::clone(&filter),
            staleness,
        );
        let reconciler = Reconciler::new(Arc::clone(&fs), config.dry_run, config.quiet);

        Self {
            config,
            library,
            fs,
            filter,
            planner,
            reconciler,
        }
    }

    pub fn config(&self) -> &MirrorConfig {
        &self.config
    }

    /// Run one full mirror pass.
    ///
    /// Returns an error only for fatal conditions: the target root cannot be
    /// prepared, a top-level listing fails, or the service rejects the
    /// credentials during any listing. Everything else is recorded in
    /// the returned report.
    #[instrument(skip(self), fields(mode = %self.config.mode, root = %self.config.target_root().display()))]
    pub async fn run(&self) -> Result<SyncReport> {
        let mut report = SyncReport::new(self.config.dry_run);
        if self.config.dry_run {
            warn!("Dry run: no files will be written or deleted");
        }

        ensure_directory(
            self.fs.as_ref(),
            self.config.target_root(),
            self.config.dry_run,
            &mut report,
        )
        .await?;

        match self.config.mode {
            SyncMode::Items => self.run_flat(&mut report).await?,
            SyncMode::Albums => self.run_collections(CollectionKind::Owned, &mut report).await?,
            SyncMode::SharedAlbums => {
                self.run_collections(CollectionKind::Shared, &mut report)
                    .await?
            }
        }

        let stats = &report.stats;
        if !self.config.quiet {
            info!(
                listed = stats.items_listed,
                excluded = stats.items_excluded,
                up_to_date = stats.up_to_date,
                downloaded = stats.downloaded,
                planned = stats.planned_downloads,
                files_deleted = stats.files_deleted,
                directories_deleted = stats.directories_deleted,
                failures = report.failures.len(),
                "Mirror run finished"
            );
        }
        if report.has_failures() {
            warn!(failures = report.failures.len(), "Some entries failed");
        }

        Ok(report)
    }

    async fn run_flat(&self, report: &mut SyncReport) -> Result<()> {
        let root = self.config.target_root();
        let scope = SyncScope::new(root, Pager::media_items(Arc::clone(&self.library)));
        let observed = self.planner.run(scope, report).await?;

        if self.config.delete_files {
            self.reconciler.reconcile_files(root, &observed, report).await;
        }
        Ok(())
    }

    async fn run_collections(&self, kind: CollectionKind, report: &mut SyncReport) -> Result<()> {
        let mut driver = CollectionDriver::new(
            &self.config,
            Arc::clone(&self.library),
            self.fs.as_ref(),
            &self.filter,
            &self.planner,
            &self.reconciler,
        );
        driver.run(kind, report).await?;
        debug!(kept = driver.kept().len(), "Collections processed");
        Ok(())
    }
}
