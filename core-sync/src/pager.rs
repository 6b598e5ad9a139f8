//! # Paginated Enumeration
//!
//! [`Pager`] turns a token-paginated listing call into a lazy, one-item-at-a-
//! time sequence. Pages are requested only when the previous page's items
//! have been consumed.
//!
//! The walk ends when:
//! - a page carries no continuation token (after its items are yielded)
//! - the service answers with a blank document ([`ListingPage::Blank`])
//! - the service hands back a continuation token the walk already sent

use bridge_traits::error::BridgeError;
use bridge_traits::library::{
    CollectionKind, ListingPage, MediaLibrary, RemoteCollection, RemoteEntry,
};
use futures::future::{BoxFuture, FutureExt};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{Result, SyncError};

type PageFuture<T> = BoxFuture<'static, std::result::Result<ListingPage<T>, BridgeError>>;
type PageFetch<T> = Box<dyn FnMut(Option<String>) -> PageFuture<T> + Send>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum PagerState {
    Start,
    Continue(String),
    Done,
}

/// Lazy walk over a paginated listing
pub struct Pager<T> {
    fetch: PageFetch<T>,
    buffer: VecDeque<T>,
    state: PagerState,
    context: String,
    pages_fetched: usize,
    sent_tokens: HashSet<String>,
}

impl<T: Send + 'static> Pager<T> {
    /// Wrap a listing call. `context` names the listing in logs and errors.
    pub fn new<F>(context: impl Into<String>, fetch: F) -> Self
    where
        F: FnMut(Option<String>) -> PageFuture<T> + Send + 'static,
    {
        Self {
            fetch: Box::new(fetch),
            buffer: VecDeque::new(),
            state: PagerState::Start,
            context: context.into(),
            pages_fetched: 0,
            sent_tokens: HashSet::new(),
        }
    }

    /// Next item, fetching the following page when the buffer runs dry
    pub async fn next(&mut self) -> Result<Option<T>> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Ok(Some(item));
            }

            let token = match std::mem::replace(&mut self.state, PagerState::Done) {
                PagerState::Done => return Ok(None),
                PagerState::Start => None,
                PagerState::Continue(token) => {
                    self.sent_tokens.insert(token.clone());
                    Some(token)
                }
            };

            self.pages_fetched += 1;
            debug!(
                listing = %self.context,
                page = self.pages_fetched,
                "Fetching page"
            );

            let page = (self.fetch)(token)
                .await
                .map_err(|source| SyncError::Listing {
                    context: self.context.clone(),
                    source,
                })?;

            match page {
                ListingPage::Blank => {
                    debug!(listing = %self.context, "Blank page, listing finished");
                    return Ok(None);
                }
                ListingPage::Items {
                    items,
                    next_page_token,
                } => {
                    self.buffer.extend(items);
                    self.state = match next_page_token {
                        Some(next) if next.is_empty() => PagerState::Done,
                        Some(next) if self.sent_tokens.contains(&next) => {
                            warn!(
                                listing = %self.context,
                                token = %next,
                                "Service returned an already visited continuation token, stopping"
                            );
                            PagerState::Done
                        }
                        Some(next) => PagerState::Continue(next),
                        None => PagerState::Done,
                    };
                }
            }
        }
    }

    /// Drain the remaining items into a vector
    pub async fn try_collect(mut self) -> Result<Vec<T>> {
        let mut items = Vec::new();
        while let Some(item) = self.next().await? {
            items.push(item);
        }
        Ok(items)
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }
}

impl Pager<RemoteEntry> {
    /// Every media item in the library
    pub fn media_items(library: Arc<dyn MediaLibrary>) -> Self {
        Self::new("media items", move |token| {
            let library = Arc::clone(&library);
            async move { library.list_media_items(token).await }.boxed()
        })
    }

    /// The media items of one collection
    pub fn collection_items(library: Arc<dyn MediaLibrary>, collection_id: &str) -> Self {
        let id = collection_id.to_string();
        Self::new(format!("items of collection {}", collection_id), move |token| {
            let library = Arc::clone(&library);
            let id = id.clone();
            async move { library.search_collection_items(&id, token).await }.boxed()
        })
    }
}

impl Pager<RemoteCollection> {
    /// Owned or shared collections
    pub fn collections(library: Arc<dyn MediaLibrary>, kind: CollectionKind) -> Self {
        Self::new(kind.to_string(), move |token| {
            let library = Arc::clone(&library);
            async move { library.list_collections(kind, token).await }.boxed()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Serves canned pages and records the tokens it was called with
    fn scripted(
        pages: Vec<std::result::Result<ListingPage<u32>, BridgeError>>,
    ) -> (Pager<u32>, Arc<Mutex<Vec<Option<String>>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&calls);
        let mut pages = VecDeque::from(pages);
        let pager = Pager::new("numbers", move |token| {
            recorded.lock().unwrap().push(token);
            let page = pages
                .pop_front()
                .unwrap_or_else(|| Err(BridgeError::OperationFailed("no more pages".into())));
            async move { page }.boxed()
        });
        (pager, calls)
    }

    #[tokio::test]
    async fn test_walks_tokens_until_last_page() {
        let (pager, calls) = scripted(vec![
            Ok(ListingPage::with_token(vec![1, 2], "t1")),
            Ok(ListingPage::with_token(vec![3], "t2")),
            Ok(ListingPage::last(vec![4])),
        ]);

        let items = pager.try_collect().await.unwrap();

        assert_eq!(items, vec![1, 2, 3, 4]);
        assert_eq!(
            *calls.lock().unwrap(),
            vec![None, Some("t1".to_string()), Some("t2".to_string())]
        );
    }

    #[tokio::test]
    async fn test_pages_are_fetched_lazily() {
        let (mut pager, calls) = scripted(vec![
            Ok(ListingPage::with_token(vec![1, 2], "t1")),
            Ok(ListingPage::last(vec![3])),
        ]);

        assert_eq!(pager.next().await.unwrap(), Some(1));
        assert_eq!(pager.next().await.unwrap(), Some(2));
        assert_eq!(calls.lock().unwrap().len(), 1);

        assert_eq!(pager.next().await.unwrap(), Some(3));
        assert_eq!(pager.pages_fetched(), 2);
        assert_eq!(pager.next().await.unwrap(), None);
        assert_eq!(pager.next().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_blank_page_ends_walk() {
        let (pager, calls) = scripted(vec![
            Ok(ListingPage::with_token(vec![1], "t1")),
            Ok(ListingPage::Blank),
            Ok(ListingPage::last(vec![99])),
        ]);

        assert_eq!(pager.try_collect().await.unwrap(), vec![1]);
        assert_eq!(calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_page_with_token_keeps_walking() {
        let (pager, _) = scripted(vec![
            Ok(ListingPage::with_token(vec![], "t1")),
            Ok(ListingPage::last(vec![7])),
        ]);

        assert_eq!(pager.try_collect().await.unwrap(), vec![7]);
    }

    #[tokio::test]
    async fn test_repeated_token_stops_walk() {
        let (pager, calls) = scripted(vec![
            Ok(ListingPage::with_token(vec![1], "same")),
            Ok(ListingPage::with_token(vec![2], "same")),
            Ok(ListingPage::last(vec![3])),
        ]);

        assert_eq!(pager.try_collect().await.unwrap(), vec![1, 2]);
        assert_eq!(calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_cycling_tokens_stop_walk() {
        let (pager, calls) = scripted(vec![
            Ok(ListingPage::with_token(vec![1], "A")),
            Ok(ListingPage::with_token(vec![2], "B")),
            Ok(ListingPage::with_token(vec![3], "A")),
            Ok(ListingPage::last(vec![4])),
        ]);

        assert_eq!(pager.try_collect().await.unwrap(), vec![1, 2, 3]);
        assert_eq!(
            *calls.lock().unwrap(),
            vec![None, Some("A".to_string()), Some("B".to_string())]
        );
    }

    #[tokio::test]
    async fn test_listing_error_carries_context() {
        let (mut pager, _) = scripted(vec![
            Ok(ListingPage::with_token(vec![1], "t1")),
            Err(BridgeError::OperationFailed("HTTP 500".into())),
        ]);

        assert_eq!(pager.next().await.unwrap(), Some(1));
        let error = pager.next().await.unwrap_err();
        assert!(matches!(error, SyncError::Listing { ref context, .. } if context == "numbers"));
        assert_eq!(pager.next().await.unwrap(), None);
    }
}
