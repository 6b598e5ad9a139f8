//! # Google Photos Provider
//!
//! Implements the `MediaLibrary` trait for the Google Photos Library API v1.
//!
//! ## Overview
//!
//! This module provides:
//! - Paginated listing of all media items, album contents, owned albums and
//!   shared albums
//! - Content download from media item base URLs with size/variant suffixes
//! - Bounded retry with exponential backoff for rate limiting and 5xx errors
//!
//! Authentication is not handled here: the connector is given a ready
//! bearer token with the `photoslibrary.readonly` scope.

pub mod connector;
pub mod error;
pub mod types;

pub use connector::GooglePhotosConnector;
pub use error::{GooglePhotosError, Result};
