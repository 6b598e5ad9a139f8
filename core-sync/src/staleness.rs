//! # Staleness Evaluation
//!
//! Decides whether a remote entry must be (re)materialized by comparing its
//! creation time against the local file's metadata-change time.
//!
//! The remote UTC time is shifted by the host's standard offset (hours west
//! of UTC), less one hour while DST is in effect *now*, and then compared to
//! the local change time as naive wall-clock values. A file is stale only
//! when the adjusted remote time is strictly later.

use bridge_traits::storage::FileSystemAccess;
use bridge_traits::time::LocalZone;
use chrono::{DateTime, Duration, NaiveDateTime};
use std::path::Path;
use std::sync::Arc;
use tracing::trace;

use crate::error::{Result, SyncError};

/// Wire format of remote creation timestamps
pub const REMOTE_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Parse a remote creation timestamp as naive UTC.
///
/// Fractional seconds and explicit offsets are accepted through an RFC 3339
/// fallback.
pub fn parse_remote_timestamp(value: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, REMOTE_TIMESTAMP_FORMAT)
        .or_else(|_| DateTime::parse_from_rfc3339(value).map(|dt| dt.naive_utc()))
        .map_err(|e| SyncError::InvalidTimestamp {
            value: value.to_string(),
            message: e.to_string(),
        })
}

pub struct StalenessEvaluator {
    fs: Arc<dyn FileSystemAccess>,
    zone: Arc<dyn LocalZone>,
}

impl StalenessEvaluator {
    pub fn new(fs: Arc<dyn FileSystemAccess>, zone: Arc<dyn LocalZone>) -> Self {
        Self { fs, zone }
    }

    /// Remote UTC time shifted into the comparison frame
    pub fn adjusted_remote_time(&self, remote_utc: NaiveDateTime) -> NaiveDateTime {
        remote_utc + Duration::seconds(self.zone.comparison_offset_secs())
    }

    /// Whether the entry created at `creation_time` must be written to `path`
    pub async fn is_required(&self, creation_time: &str, path: &Path) -> Result<bool> {
        let exists = self
            .fs
            .exists(path)
            .await
            .map_err(|e| SyncError::filesystem(path, e))?;
        if !exists {
            return Ok(true);
        }

        let adjusted = self.adjusted_remote_time(parse_remote_timestamp(creation_time)?);

        let metadata = self
            .fs
            .metadata(path)
            .await
            .map_err(|e| SyncError::filesystem(path, e))?;

        let local = match metadata.changed_at.and_then(|secs| self.zone.to_local(secs)) {
            Some(local) => local,
            None => return Ok(true),
        };

        trace!(path = ?path, remote = %adjusted, local = %local, "Compared timestamps");
        Ok(adjusted > local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::BridgeError;
    use bridge_traits::storage::FileMetadata;
    use bridge_traits::time::FixedZone;
    use bytes::Bytes;
    use chrono::NaiveDate;
    use mockall::mock;
    use std::path::PathBuf;

    mock! {
        Fs {}

        #[async_trait]
        impl FileSystemAccess for Fs {
            async fn exists(&self, path: &Path) -> bridge_traits::error::Result<bool>;
            async fn metadata(&self, path: &Path) -> bridge_traits::error::Result<FileMetadata>;
            async fn create_dir_all(&self, path: &Path) -> bridge_traits::error::Result<()>;
            async fn write_file_atomic(&self, path: &Path, data: Bytes) -> bridge_traits::error::Result<()>;
            async fn delete_file(&self, path: &Path) -> bridge_traits::error::Result<()>;
            async fn delete_dir(&self, path: &Path) -> bridge_traits::error::Result<()>;
            async fn list_directory(&self, path: &Path) -> bridge_traits::error::Result<Vec<PathBuf>>;
        }
    }

    fn file_changed_at(secs: i64) -> FileMetadata {
        FileMetadata {
            size: 10,
            changed_at: Some(secs),
            modified_at: Some(secs),
            is_directory: false,
            is_file: true,
            is_symlink: false,
        }
    }

    fn evaluator(fs: MockFs, zone: FixedZone) -> StalenessEvaluator {
        StalenessEvaluator::new(Arc::new(fs), Arc::new(zone))
    }

    // 2023-06-01T10:00:00Z
    const JUNE_FIRST_10AM: i64 = 1_685_613_600;

    #[test]
    fn test_parse_remote_timestamp() {
        let parsed = parse_remote_timestamp("2023-06-01T10:00:00Z").unwrap();
        let expected = NaiveDate::from_ymd_opt(2023, 6, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        assert_eq!(parsed, expected);

        let fractional = parse_remote_timestamp("2023-06-01T10:00:00.250Z").unwrap();
        assert_eq!(fractional.and_utc().timestamp(), JUNE_FIRST_10AM);

        assert!(matches!(
            parse_remote_timestamp("yesterday"),
            Err(SyncError::InvalidTimestamp { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_file_is_required() {
        let mut fs = MockFs::new();
        fs.expect_exists().returning(|_| Ok(false));
        fs.expect_metadata().never();

        let evaluator = evaluator(fs, FixedZone::utc());
        // Not even parsed when the file is absent
        assert!(evaluator
            .is_required("garbage", Path::new("/p/a.jpg"))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_equal_times_are_not_stale() {
        let mut fs = MockFs::new();
        fs.expect_exists().returning(|_| Ok(true));
        fs.expect_metadata()
            .returning(|_| Ok(file_changed_at(JUNE_FIRST_10AM)));

        let evaluator = evaluator(fs, FixedZone::utc());
        assert!(!evaluator
            .is_required("2023-06-01T10:00:00Z", Path::new("/p/a.jpg"))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_newer_remote_is_stale() {
        let mut fs = MockFs::new();
        fs.expect_exists().returning(|_| Ok(true));
        fs.expect_metadata()
            .returning(|_| Ok(file_changed_at(JUNE_FIRST_10AM - 1)));

        let evaluator = evaluator(fs, FixedZone::utc());
        assert!(evaluator
            .is_required("2023-06-01T10:00:00Z", Path::new("/p/a.jpg"))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_offset_shifts_remote_time() {
        // Five hours west of UTC, no DST: remote moves forward 5h while the
        // local change time moves back 5h.
        let zone = FixedZone {
            offset_west_secs: 5 * 3600,
            dst: false,
        };
        let mut fs = MockFs::new();
        fs.expect_exists().returning(|_| Ok(true));
        fs.expect_metadata()
            .returning(|_| Ok(file_changed_at(JUNE_FIRST_10AM + 9 * 3600)));

        let evaluator = evaluator(fs, zone);
        let remote = parse_remote_timestamp("2023-06-01T10:00:00Z").unwrap();
        assert_eq!(
            evaluator.adjusted_remote_time(remote),
            remote + Duration::hours(5)
        );
        // local = 19:00Z - 5h = 14:00, adjusted remote = 15:00
        assert!(evaluator
            .is_required("2023-06-01T10:00:00Z", Path::new("/p/a.jpg"))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_missing_change_time_is_required() {
        let mut fs = MockFs::new();
        fs.expect_exists().returning(|_| Ok(true));
        fs.expect_metadata().returning(|_| {
            Ok(FileMetadata {
                changed_at: None,
                ..file_changed_at(0)
            })
        });

        let evaluator = evaluator(fs, FixedZone::utc());
        assert!(evaluator
            .is_required("2023-06-01T10:00:00Z", Path::new("/p/a.jpg"))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_bad_timestamp_on_existing_file_fails() {
        let mut fs = MockFs::new();
        fs.expect_exists().returning(|_| Ok(true));

        let evaluator = evaluator(fs, FixedZone::utc());
        let result = evaluator
            .is_required("not-a-time", Path::new("/p/a.jpg"))
            .await;
        assert!(matches!(result, Err(SyncError::InvalidTimestamp { .. })));
    }

    #[tokio::test]
    async fn test_metadata_error_is_reported() {
        let mut fs = MockFs::new();
        fs.expect_exists().returning(|_| Ok(true));
        fs.expect_metadata()
            .returning(|_| Err(BridgeError::OperationFailed("stat failed".into())));

        let evaluator = evaluator(fs, FixedZone::utc());
        let result = evaluator
            .is_required("2023-06-01T10:00:00Z", Path::new("/p/a.jpg"))
            .await;
        assert!(matches!(result, Err(SyncError::Filesystem { .. })));
    }
}
