//! # Host Bridge Traits
//!
//! Platform abstraction traits that sit between the sync engine and the
//! outside world.
//!
//! ## Overview
//!
//! The engine in `core-sync` decides what to download and what to delete, but
//! never performs I/O itself. Each trait here represents a capability it needs
//! from its host:
//!
//! - [`HttpClient`](http::HttpClient) - Async HTTP transport for providers
//! - [`MediaLibrary`](library::MediaLibrary) - Paginated remote listings and content fetch
//! - [`FileSystemAccess`](storage::FileSystemAccess) - The local mirror tree
//! - [`LocalZone`](time::LocalZone) - Host time zone state for timestamp comparison
//!
//! ## Implementations
//!
//! | Capability | Crate |
//! |------------|-------|
//! | `HttpClient`, `FileSystemAccess`, `LocalZone` | `bridge-desktop` |
//! | `MediaLibrary` | `provider-google-photos` |
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Filesystem
//! implementations keep the original `std::io::Error` so callers can tell a
//! permission failure from a vanished entry.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so they can be shared behind `Arc`.

pub mod error;
pub mod http;
pub mod library;
pub mod storage;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
pub use library::{
    CollectionKind, ListingPage, MediaKind, MediaLibrary, RemoteCollection, RemoteEntry,
    SizeDirective,
};
pub use storage::{FileMetadata, FileSystemAccess};
pub use time::{FixedZone, LocalZone, LogLevel};
