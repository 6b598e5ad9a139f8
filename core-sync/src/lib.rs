//! # Mirror Sync Engine
//!
//! Decides what to download and what to delete when mirroring a remote photo
//! library into a local directory tree. All I/O goes through the bridge
//! traits, so the engine runs unchanged against the real service, a fake
//! library or a scratch directory.
//!
//! ## Components
//!
//! - **Pager** (`pager`): lazy walk over token-paginated listings
//! - **Staleness Evaluator** (`staleness`): remote creation time vs. local change time
//! - **Name Filter** (`filter`): optional glob excluding filenames and titles
//! - **Sync Planner** (`planner`): materializes the stale entries of one directory
//! - **Reconciler** (`reconciler`): deletes what the remote side no longer has
//! - **Drivers** (`driver`): flat items mode and per-collection mode
//!
//! Every run returns a [`SyncReport`]. Per-entry problems end up in its
//! failure list; only fatal conditions surface as [`SyncError`].

pub mod driver;
pub mod error;
pub mod filter;
pub mod pager;
pub mod planner;
pub mod reconciler;
pub mod report;
pub mod staleness;

pub use driver::{CollectionDriver, MirrorCoordinator};
pub use error::{DeleteFailure, Result, SyncError};
pub use filter::NameFilter;
pub use pager::Pager;
pub use planner::{local_name, ObservedNameSet, SyncPlanner, SyncScope};
pub use reconciler::Reconciler;
pub use report::{FailureKind, SyncAction, SyncFailure, SyncReport, SyncStats};
pub use staleness::{parse_remote_timestamp, StalenessEvaluator};
