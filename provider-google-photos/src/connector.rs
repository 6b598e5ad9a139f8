//! Google Photos API connector implementation
//!
//! Implements the `MediaLibrary` trait for the Photos Library API v1.

use async_trait::async_trait;
use bridge_traits::error::Result;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
use bridge_traits::library::{
    CollectionKind, ListingPage, MediaKind, MediaLibrary, RemoteCollection, RemoteEntry,
    SizeDirective,
};
use bytes::Bytes;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::error::GooglePhotosError;
use crate::types::{Album, AlbumsResponse, MediaItem, MediaItemsResponse, SearchRequest};

/// Photos Library API base URL
const PHOTOS_API_BASE: &str = "https://photoslibrary.googleapis.com/v1";

/// Maximum media items per page (API limit)
const MEDIA_PAGE_SIZE: u32 = 100;

/// Maximum albums per page (API limit)
const ALBUM_PAGE_SIZE: u32 = 50;

/// Google Photos API connector
///
/// # Example
///
/// ```ignore
/// use provider_google_photos::GooglePhotosConnector;
/// use bridge_traits::library::MediaLibrary;
///
/// let connector = GooglePhotosConnector::new(http_client, access_token);
/// let page = connector.list_media_items(None).await?;
/// ```
pub struct GooglePhotosConnector {
    /// HTTP client for API requests
    http_client: Arc<dyn HttpClient>,

    /// OAuth 2.0 access token
    access_token: String,

    retry_policy: RetryPolicy,
}

impl GooglePhotosConnector {
    /// Create a new Google Photos connector
    ///
    /// # Arguments
    ///
    /// * `http_client` - HTTP client implementation
    /// * `access_token` - OAuth 2.0 access token with `photoslibrary.readonly` scope
    pub fn new(http_client: Arc<dyn HttpClient>, access_token: String) -> Self {
        Self {
            http_client,
            access_token,
            retry_policy: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// URL suffix selecting the variant served from a base URL
    fn directive_suffix(directive: SizeDirective) -> String {
        match directive {
            SizeDirective::Full => "=d".to_string(),
            SizeDirective::Bounded { width, height } => format!("=w{}-h{}", width, height),
            SizeDirective::Motion => "=dv".to_string(),
        }
    }

    fn convert_item(item: MediaItem) -> RemoteEntry {
        let kind = if item.media_metadata.video.is_some() {
            MediaKind::Video
        } else {
            MediaKind::Photo
        };

        RemoteEntry {
            id: item.id,
            filename: item.filename,
            creation_time: item.media_metadata.creation_time,
            kind,
            base_url: item.base_url,
        }
    }

    fn convert_album(album: Album) -> RemoteCollection {
        RemoteCollection {
            id: album.id,
            title: album.title,
        }
    }

    /// Parse a listing body.
    ///
    /// Returns `None` for a document with no fields at all, which the API
    /// sends once a listing is exhausted.
    fn parse_listing<T: DeserializeOwned>(body: &[u8]) -> Result<Option<T>> {
        let value: serde_json::Value = serde_json::from_slice(body).map_err(|e| {
            GooglePhotosError::ParseError(format!("Failed to parse listing response: {}", e))
        })?;

        if value.as_object().is_some_and(|fields| fields.is_empty()) {
            return Ok(None);
        }

        serde_json::from_value(value).map(Some).map_err(|e| {
            GooglePhotosError::ParseError(format!("Unexpected listing shape: {}", e)).into()
        })
    }

    fn media_page(body: &[u8]) -> Result<ListingPage<RemoteEntry>> {
        Ok(match Self::parse_listing::<MediaItemsResponse>(body)? {
            None => ListingPage::Blank,
            Some(response) => ListingPage::Items {
                items: response
                    .media_items
                    .into_iter()
                    .map(Self::convert_item)
                    .collect(),
                next_page_token: response.next_page_token,
            },
        })
    }

    fn album_page(body: &[u8]) -> Result<ListingPage<RemoteCollection>> {
        Ok(match Self::parse_listing::<AlbumsResponse>(body)? {
            None => ListingPage::Blank,
            Some(response) => ListingPage::Items {
                items: response
                    .albums
                    .into_iter()
                    .map(Self::convert_album)
                    .collect(),
                next_page_token: response.next_page_token,
            },
        })
    }

    fn paged_url(path: &str, page_size: u32, page_token: Option<&str>) -> String {
        let mut url = format!("{}/{}?pageSize={}", PHOTOS_API_BASE, path, page_size);
        if let Some(token) = page_token {
            url.push_str(&format!("&pageToken={}", urlencoding::encode(token)));
        }
        url
    }

    /// Execute a request with retry logic
    ///
    /// Rate limiting, server errors and transport failures are retried with
    /// exponential backoff; any other non-2xx status fails immediately.
    #[instrument(skip(self, request), fields(url = %request.url))]
    async fn execute_with_retry(&self, request: HttpRequest) -> Result<HttpResponse> {
        let max_attempts = self.retry_policy.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;

            match self.http_client.execute(request.clone()).await {
                Ok(response) if response.is_success() => {
                    debug!(status = response.status, "API request succeeded");
                    return Ok(response);
                }
                Ok(response) if response.status == 401 || response.status == 403 => {
                    warn!(status = response.status, "API request rejected");
                    return Err(GooglePhotosError::AuthenticationFailed(
                        String::from_utf8_lossy(&response.body).to_string(),
                    )
                    .into());
                }
                Ok(response) if response.is_retryable() && attempt < max_attempts => {
                    let delay = response
                        .retry_after()
                        .unwrap_or_else(|| self.retry_policy.backoff(attempt))
                        .min(self.retry_policy.max_delay);
                    warn!(
                        "API request failed (attempt {}/{}): status={}, retrying in {}ms",
                        attempt,
                        max_attempts,
                        response.status,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
                Ok(response) => {
                    warn!(status = response.status, attempt, "API request failed");
                    return Err(GooglePhotosError::ApiError {
                        status_code: response.status,
                        message: String::from_utf8_lossy(&response.body).to_string(),
                    }
                    .into());
                }
                Err(e) if attempt < max_attempts => {
                    let delay = self.retry_policy.backoff(attempt);
                    warn!(
                        "API request failed (attempt {}/{}): {}, retrying in {}ms",
                        attempt,
                        max_attempts,
                        e,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    warn!("API request failed after {} attempts: {}", max_attempts, e);
                    return Err(e);
                }
            }
        }
    }

    fn api_get(&self, url: String) -> HttpRequest {
        HttpRequest::new(HttpMethod::Get, url)
            .bearer_token(&self.access_token)
            .header("Accept", "application/json")
            .timeout(Duration::from_secs(30))
    }
}

#[async_trait]
impl MediaLibrary for GooglePhotosConnector {
    #[instrument(skip(self))]
    async fn list_media_items(
        &self,
        page_token: Option<String>,
    ) -> Result<ListingPage<RemoteEntry>> {
        let url = Self::paged_url("mediaItems", MEDIA_PAGE_SIZE, page_token.as_deref());
        let response = self.execute_with_retry(self.api_get(url)).await?;

        let page = Self::media_page(&response.body)?;
        if let ListingPage::Items { items, .. } = &page {
            debug!("Listed {} media items", items.len());
        }
        Ok(page)
    }

    #[instrument(skip(self))]
    async fn search_collection_items(
        &self,
        collection_id: &str,
        page_token: Option<String>,
    ) -> Result<ListingPage<RemoteEntry>> {
        let body = SearchRequest {
            album_id: collection_id,
            page_size: MEDIA_PAGE_SIZE,
            page_token,
        };
        let request = HttpRequest::new(
            HttpMethod::Post,
            format!("{}/mediaItems:search", PHOTOS_API_BASE),
        )
        .bearer_token(&self.access_token)
        .header("Accept", "application/json")
        .timeout(Duration::from_secs(30))
        .json(&body)?;

        let response = self.execute_with_retry(request).await?;

        let page = Self::media_page(&response.body)?;
        if let ListingPage::Items { items, .. } = &page {
            debug!("Listed {} items of album {}", items.len(), collection_id);
        }
        Ok(page)
    }

    #[instrument(skip(self))]
    async fn list_collections(
        &self,
        kind: CollectionKind,
        page_token: Option<String>,
    ) -> Result<ListingPage<RemoteCollection>> {
        let path = match kind {
            CollectionKind::Owned => "albums",
            CollectionKind::Shared => "sharedAlbums",
        };
        let url = Self::paged_url(path, ALBUM_PAGE_SIZE, page_token.as_deref());
        let response = self.execute_with_retry(self.api_get(url)).await?;

        let page = Self::album_page(&response.body)?;
        if let ListingPage::Items { items, .. } = &page {
            debug!("Listed {} {}", items.len(), kind);
        }
        Ok(page)
    }

    #[instrument(skip(self, locator))]
    async fn fetch(&self, locator: &str, directive: SizeDirective) -> Result<Bytes> {
        let url = format!("{}{}", locator, Self::directive_suffix(directive));
        let request = HttpRequest::new(HttpMethod::Get, url).timeout(Duration::from_secs(300));

        let response = self.execute_with_retry(request).await?;

        debug!("Downloaded {} bytes", response.body.len());
        Ok(response.body)
    }
}
