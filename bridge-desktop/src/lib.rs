//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux):
//! - `HttpClient` using `reqwest`
//! - `FileSystemAccess` using `tokio::fs`, with temp-file-then-rename writes
//! - `LocalZone` using `chrono::Local`
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{ReqwestHttpClient, SystemZone, TokioFileSystem};
//! use std::sync::Arc;
//!
//! let http_client = Arc::new(ReqwestHttpClient::new()?);
//! let fs = Arc::new(TokioFileSystem::new());
//! let zone = Arc::new(SystemZone::new());
//! ```

mod filesystem;
mod http;
mod zone;

pub use filesystem::TokioFileSystem;
pub use http::ReqwestHttpClient;
pub use zone::SystemZone;
