//! # Mirror Configuration
//!
//! The settings of one mirror run, built once at start-up and passed
//! explicitly to every component of the sync engine.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::{MirrorConfig, SizeSelector, SyncMode};
//!
//! let config = MirrorConfig::builder()
//!     .mode(SyncMode::Albums)
//!     .target_root("/srv/photos")
//!     .size(SizeSelector::Bounded { width: 2048, height: 2048 })
//!     .delete_files(true)
//!     .exclude("priv*")
//!     .build()?;
//! ```
//!
//! ## Validation
//!
//! `build()` fails fast with an actionable message when:
//! - no mode was chosen, or the target root is empty
//! - `delete_directories` is combined with the flat items mode
//! - a bounded size has a zero edge
//! - the exclusion pattern is not a valid glob

use crate::error::{Error, Result};
use glob::Pattern;
use std::fmt;
use std::path::{Path, PathBuf};

/// What part of the remote library is mirrored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// Every media item, flat into the target root
    Items,
    /// One subdirectory per owned album
    Albums,
    /// One subdirectory per album shared with the account
    SharedAlbums,
}

impl SyncMode {
    pub fn is_collection_mode(&self) -> bool {
        !matches!(self, SyncMode::Items)
    }
}

impl fmt::Display for SyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncMode::Items => write!(f, "items"),
            SyncMode::Albums => write!(f, "albums"),
            SyncMode::SharedAlbums => write!(f, "shared albums"),
        }
    }
}

/// Requested download size for still images
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SizeSelector {
    /// Original size
    #[default]
    Full,
    /// Fetch nothing. Staleness checks and reconciliation still run.
    Skip,
    /// Fit within `width` x `height`, preserving aspect ratio
    Bounded { width: u32, height: u32 },
}

impl SizeSelector {
    /// Map a `--size W H` pair: a zero width means "do not download".
    pub fn from_dimensions(width: u32, height: u32) -> Self {
        if width == 0 {
            SizeSelector::Skip
        } else {
            SizeSelector::Bounded { width, height }
        }
    }
}

/// Configuration for one mirror run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorConfig {
    pub mode: SyncMode,
    /// Local directory the remote library is mirrored into
    pub target_root: PathBuf,
    pub size: SizeSelector,
    /// Compute and report every decision without touching the filesystem
    pub dry_run: bool,
    /// Delete local files that were not observed remotely
    pub delete_files: bool,
    /// Delete album directories that were not observed remotely
    pub delete_directories: bool,
    /// Glob applied to album titles and item filenames. Matches are skipped,
    /// and are therefore not protected from deletion. Compiled once by
    /// [`MirrorConfigBuilder::build`].
    pub exclude: Option<Pattern>,
    /// Suppress progress reporting; failures are always reported
    pub quiet: bool,
}

impl MirrorConfig {
    pub fn builder() -> MirrorConfigBuilder {
        MirrorConfigBuilder::default()
    }

    pub fn target_root(&self) -> &Path {
        &self.target_root
    }

    /// Source text of the exclusion glob
    pub fn exclude_str(&self) -> Option<&str> {
        self.exclude.as_ref().map(Pattern::as_str)
    }
}

/// Builder for [`MirrorConfig`]
#[derive(Debug, Clone, Default)]
pub struct MirrorConfigBuilder {
    mode: Option<SyncMode>,
    target_root: Option<PathBuf>,
    size: SizeSelector,
    dry_run: bool,
    delete_files: bool,
    delete_directories: bool,
    exclude: Option<String>,
    quiet: bool,
}

impl MirrorConfigBuilder {
    pub fn mode(mut self, mode: SyncMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn target_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.target_root = Some(path.into());
        self
    }

    pub fn size(mut self, size: SizeSelector) -> Self {
        self.size = size;
        self
    }

    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    pub fn delete_files(mut self, enabled: bool) -> Self {
        self.delete_files = enabled;
        self
    }

    pub fn delete_directories(mut self, enabled: bool) -> Self {
        self.delete_directories = enabled;
        self
    }

    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude = Some(pattern.into());
        self
    }

    pub fn exclude_opt(mut self, pattern: Option<String>) -> Self {
        self.exclude = pattern;
        self
    }

    pub fn quiet(mut self, enabled: bool) -> Self {
        self.quiet = enabled;
        self
    }

    pub fn build(self) -> Result<MirrorConfig> {
        let mode = self.mode.ok_or_else(|| {
            Error::Config(
                "No sync mode selected. Choose one of items, albums or shared albums.".to_string(),
            )
        })?;

        let target_root = self.target_root.unwrap_or_else(|| PathBuf::from("."));
        if target_root.as_os_str().is_empty() {
            return Err(Error::Config("Target root must not be empty".to_string()));
        }

        if self.delete_directories && !mode.is_collection_mode() {
            return Err(Error::Config(
                "Deleting directories requires an album mode; items are mirrored flat".to_string(),
            ));
        }

        if let SizeSelector::Bounded { width, height } = self.size {
            if width == 0 || height == 0 {
                return Err(Error::Config(format!(
                    "Invalid size {}x{}: both edges must be positive",
                    width, height
                )));
            }
        }

        let exclude = self
            .exclude
            .map(|pattern| {
                Pattern::new(&pattern).map_err(|e| Error::InvalidPattern {
                    message: e.msg.to_string(),
                    pattern,
                })
            })
            .transpose()?;

        Ok(MirrorConfig {
            mode,
            target_root,
            size: self.size,
            dry_run: self.dry_run,
            delete_files: self.delete_files,
            delete_directories: self.delete_directories,
            exclude,
            quiet: self.quiet,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = MirrorConfig::builder()
            .mode(SyncMode::Items)
            .build()
            .unwrap();

        assert_eq!(config.target_root, PathBuf::from("."));
        assert_eq!(config.size, SizeSelector::Full);
        assert!(!config.dry_run);
        assert!(!config.delete_files);
        assert!(!config.delete_directories);
        assert!(config.exclude.is_none());
    }

    #[test]
    fn test_missing_mode_fails() {
        let result = MirrorConfig::builder().target_root("/tmp").build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_delete_directories_requires_album_mode() {
        let result = MirrorConfig::builder()
            .mode(SyncMode::Items)
            .delete_directories(true)
            .build();
        assert!(matches!(result, Err(Error::Config(_))));

        let config = MirrorConfig::builder()
            .mode(SyncMode::SharedAlbums)
            .delete_directories(true)
            .build()
            .unwrap();
        assert!(config.delete_directories);
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let result = MirrorConfig::builder()
            .mode(SyncMode::Albums)
            .exclude("[unclosed")
            .build();
        assert!(matches!(result, Err(Error::InvalidPattern { .. })));
    }

    #[test]
    fn test_valid_pattern_is_compiled() {
        let config = MirrorConfig::builder()
            .mode(SyncMode::Albums)
            .exclude("IMG_[0-9]*")
            .build()
            .unwrap();
        assert_eq!(config.exclude_str(), Some("IMG_[0-9]*"));
        assert!(config.exclude.as_ref().is_some_and(|p| p.matches("IMG_42.jpg")));
    }

    #[test]
    fn test_zero_height_is_rejected() {
        let result = MirrorConfig::builder()
            .mode(SyncMode::Albums)
            .size(SizeSelector::Bounded {
                width: 640,
                height: 0,
            })
            .build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_size_from_dimensions() {
        assert_eq!(SizeSelector::from_dimensions(0, 0), SizeSelector::Skip);
        assert_eq!(
            SizeSelector::from_dimensions(800, 600),
            SizeSelector::Bounded {
                width: 800,
                height: 600
            }
        );
    }

    #[test]
    fn test_mode_display() {
        assert_eq!(SyncMode::SharedAlbums.to_string(), "shared albums");
        assert!(SyncMode::Albums.is_collection_mode());
        assert!(!SyncMode::Items.is_collection_mode());
    }
}
