//! Google Photos Library API response types
//!
//! Data structures for deserializing Photos Library API v1 responses.

use serde::{Deserialize, Serialize};

/// Media item resource
///
/// See: https://developers.google.com/photos/library/reference/rest/v1/mediaItems
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    pub id: String,

    /// Base URL; append a size/variant suffix to download bytes
    pub base_url: String,

    pub filename: String,

    #[serde(default)]
    pub mime_type: Option<String>,

    pub media_metadata: MediaMetadata,
}

/// Metadata block of a media item
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaMetadata {
    /// Creation time (RFC 3339, UTC)
    pub creation_time: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,

    /// Present only for motion items; its contents are not needed here
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<serde_json::Value>,
}

/// Album resource (owned or shared)
///
/// See: https://developers.google.com/photos/library/reference/rest/v1/albums
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub id: String,

    #[serde(default)]
    pub title: Option<String>,
}

/// mediaItems.list and mediaItems.search response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItemsResponse {
    #[serde(default)]
    pub media_items: Vec<MediaItem>,

    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// albums.list and sharedAlbums.list response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumsResponse {
    #[serde(default, alias = "sharedAlbums")]
    pub albums: Vec<Album>,

    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// mediaItems.search request body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest<'a> {
    pub album_id: &'a str,

    pub page_size: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,
}
