//! Integration tests for run configuration and logging setup

use bridge_traits::time::LogLevel;
use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
use core_runtime::{Error, MirrorConfig, SizeSelector, SyncMode};

#[test]
fn test_full_album_configuration() {
    let config = MirrorConfig::builder()
        .mode(SyncMode::Albums)
        .target_root("/srv/photos")
        .size(SizeSelector::from_dimensions(1920, 1080))
        .dry_run(true)
        .delete_files(true)
        .delete_directories(true)
        .exclude("priv*")
        .quiet(true)
        .build()
        .unwrap();

    assert_eq!(config.target_root().to_str(), Some("/srv/photos"));
    assert_eq!(
        config.size,
        SizeSelector::Bounded {
            width: 1920,
            height: 1080
        }
    );
    assert!(config.dry_run);
    assert!(config.delete_files);
    assert!(config.delete_directories);
    assert_eq!(config.exclude_str(), Some("priv*"));
    assert!(config.quiet);
}

#[test]
fn test_error_messages_are_actionable() {
    let error = MirrorConfig::builder()
        .mode(SyncMode::Items)
        .delete_directories(true)
        .build()
        .unwrap_err();
    assert!(error.to_string().contains("album mode"));

    let error = MirrorConfig::builder()
        .mode(SyncMode::Albums)
        .exclude_opt(Some("[a-".to_string()))
        .build()
        .unwrap_err();
    match error {
        Error::InvalidPattern { pattern, .. } => assert_eq!(pattern, "[a-"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_logging_initializes_once() {
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Debug)
        .with_env_override(false);

    assert!(init_logging(config.clone()).is_ok());
    assert!(matches!(init_logging(config), Err(Error::Logging(_))));
}
