//! Remote Media Library Abstraction
//!
//! Contract for a remote photo library: paginated listings of media items and
//! collections (albums), plus a content fetch keyed by an opaque locator.
//!
//! Listing calls return a single [`ListingPage`]; walking the continuation
//! tokens is the caller's job.

use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;

use crate::error::Result;

/// Whether an item is a still image or a motion/video item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Photo,
    Video,
}

/// A remote media item as listed by the library
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEntry {
    /// Stable remote identifier
    pub id: String,
    /// Display filename, used as the local file name
    pub filename: String,
    /// Creation timestamp, `YYYY-MM-DDTHH:MM:SSZ` (UTC)
    pub creation_time: String,
    pub kind: MediaKind,
    /// Opaque content locator handed back to [`MediaLibrary::fetch`]
    pub base_url: String,
}

/// A named grouping of remote items (an album)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCollection {
    pub id: String,
    pub title: Option<String>,
}

/// Which collection listing to walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    /// Albums owned by the account
    Owned,
    /// Albums shared with the account
    Shared,
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectionKind::Owned => write!(f, "albums"),
            CollectionKind::Shared => write!(f, "shared albums"),
        }
    }
}

/// Size/variant requested from the content fetch service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeDirective {
    /// Original bytes, no resizing
    Full,
    /// Resized to fit within the box, aspect ratio preserved
    Bounded { width: u32, height: u32 },
    /// The playable video stream of a motion item
    Motion,
}

/// One page of a remote listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingPage<T> {
    /// The service answered with an entirely empty document. Treated as the
    /// end of the listing regardless of any earlier tokens.
    Blank,
    Items {
        items: Vec<T>,
        next_page_token: Option<String>,
    },
}

impl<T> ListingPage<T> {
    pub fn last(items: Vec<T>) -> Self {
        ListingPage::Items {
            items,
            next_page_token: None,
        }
    }

    pub fn with_token(items: Vec<T>, token: impl Into<String>) -> Self {
        ListingPage::Items {
            items,
            next_page_token: Some(token.into()),
        }
    }
}

/// Remote media library trait
///
/// # Example
///
/// ```ignore
/// use bridge_traits::library::{ListingPage, MediaLibrary, SizeDirective};
///
/// async fn first_item(library: &dyn MediaLibrary) -> Result<Option<Bytes>> {
///     if let ListingPage::Items { items, .. } = library.list_media_items(None).await? {
///         if let Some(entry) = items.first() {
///             return Ok(Some(library.fetch(&entry.base_url, SizeDirective::Full).await?));
///         }
///     }
///     Ok(None)
/// }
/// ```
#[async_trait]
pub trait MediaLibrary: Send + Sync {
    /// List every media item in the library
    async fn list_media_items(&self, page_token: Option<String>)
        -> Result<ListingPage<RemoteEntry>>;

    /// List the media items of one collection
    async fn search_collection_items(
        &self,
        collection_id: &str,
        page_token: Option<String>,
    ) -> Result<ListingPage<RemoteEntry>>;

    /// List owned or shared collections
    async fn list_collections(
        &self,
        kind: CollectionKind,
        page_token: Option<String>,
    ) -> Result<ListingPage<RemoteCollection>>;

    /// Fetch the bytes behind a content locator
    async fn fetch(&self, locator: &str, directive: SizeDirective) -> Result<Bytes>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_page_constructors() {
        let page = ListingPage::with_token(vec![1, 2], "next");
        assert_eq!(
            page,
            ListingPage::Items {
                items: vec![1, 2],
                next_page_token: Some("next".to_string()),
            }
        );

        let page: ListingPage<u8> = ListingPage::last(vec![]);
        assert!(matches!(
            page,
            ListingPage::Items {
                next_page_token: None,
                ..
            }
        ));
    }

    #[test]
    fn test_collection_kind_display() {
        assert_eq!(CollectionKind::Owned.to_string(), "albums");
        assert_eq!(CollectionKind::Shared.to_string(), "shared albums");
    }
}
