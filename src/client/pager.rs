// src/client/pager.rs

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::stream::{self, BoxStream, Stream, StreamExt, TryStreamExt};

use crate::error::{GSError, Result};

/// One page of query results.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedPage<T> {
    /// Items in service order.
    pub items: Vec<T>,
    /// Token for the next page; `None` on the last page.
    pub continuation: Option<String>,
}

impl<T> FeedPage<T> {
    pub fn new(items: Vec<T>, continuation: Option<String>) -> Self {
        Self { items, continuation }
    }

    /// Whether this is the final page of the feed.
    pub fn is_last(&self) -> bool {
        self.continuation.is_none()
    }

    /// Converts every item, failing on the first conversion error.
    pub fn try_map<U, F>(self, f: F) -> Result<FeedPage<U>>
    where
        F: FnMut(T) -> Result<U>,
    {
        let items = self.items.into_iter().map(f).collect::<Result<Vec<_>>>()?;
        Ok(FeedPage {
            items,
            continuation: self.continuation,
        })
    }
}

/// Lazily paged query results.
///
/// Yields items one at a time. The next page is requested only when the
/// buffered page is used up, using the continuation token of the previous
/// page. The feed ends after the page without a continuation token, or right
/// after the first error. It can be consumed once.
pub struct FeedPager<'a, T> {
    pages: BoxStream<'a, Result<FeedPage<T>>>,
    buffered: VecDeque<T>,
    pages_fetched: usize,
    done: bool,
}

impl<'a, T: Send + 'a> FeedPager<'a, T> {
    /// Builds a pager from a page fetcher. `fetch` is called with `None` for
    /// the first page and with the previous page's token afterwards.
    pub fn new<F, Fut>(fetch: F) -> Self
    where
        F: FnMut(Option<String>) -> Fut + Send + 'a,
        Fut: Future<Output = Result<FeedPage<T>>> + Send + 'a,
    {
        let pages = stream::try_unfold((fetch, Some(None)), |(mut fetch, next)| async move {
            let token: Option<String> = match next {
                Some(token) => token,
                None => return Ok(None),
            };
            let page = fetch(token).await?;
            let following = page.continuation.clone().map(Some);
            Ok::<_, GSError>(Some((page, (fetch, following))))
        });
        Self::from_pages(pages)
    }

    /// Wraps a stream that already yields whole pages, such as an SDK pager
    /// that tracks its own continuation tokens.
    pub fn from_pages<S>(pages: S) -> Self
    where
        S: Stream<Item = Result<FeedPage<T>>> + Send + 'a,
    {
        Self {
            pages: pages.boxed(),
            buffered: VecDeque::new(),
            pages_fetched: 0,
            done: false,
        }
    }

    /// Drains the feed into a vector.
    pub async fn collect_all(self) -> Result<Vec<T>> {
        self.try_collect().await
    }
}

impl<T> FeedPager<'_, T> {
    /// Number of pages requested so far.
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }
}

// Nothing is pinned structurally; the page stream is boxed.
impl<T> Unpin for FeedPager<'_, T> {}

impl<T> Stream for FeedPager<'_, T> {
    type Item = Result<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            if let Some(item) = this.buffered.pop_front() {
                return Poll::Ready(Some(Ok(item)));
            }
            if this.done {
                return Poll::Ready(None);
            }
            match futures::ready!(this.pages.poll_next_unpin(cx)) {
                Some(Ok(page)) => {
                    this.pages_fetched += 1;
                    log::trace!(
                        "Fetched page {} with {} items (more: {})",
                        this.pages_fetched,
                        page.items.len(),
                        !page.is_last()
                    );
                    this.buffered.extend(page.items);
                }
                Some(Err(err)) => {
                    this.done = true;
                    return Poll::Ready(Some(Err(err)));
                }
                None => this.done = true,
            }
        }
    }
}
