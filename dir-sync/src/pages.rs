//! Generic page-following over token-paginated list endpoints.

use crate::error::DirSyncResult;
use futures_util::stream::{self, Stream};
use std::future::Future;

/// One page of a paginated listing: how to pull the continuation token and
/// the item collection out of a response body.
pub trait Page {
    type Item;

    fn next_page_token(&self) -> Option<String>;

    fn into_items(self) -> Vec<Self::Item>;
}

struct PagerState<F, I> {
    fetch: F,
    pending: std::vec::IntoIter<I>,
    next_token: Option<String>,
    started: bool
}

/// Lazily follow a paginated listing to exhaustion.
///
/// `fetch` attaches the continuation token (`None` on the initial request)
/// and returns the next page. Items are yielded in arrival order; pages are
/// fetched strictly sequentially, one buffered at a time, and only as the
/// stream is consumed. An absent or empty token ends the stream. The
/// provider's token semantics are trusted as-is: no de-duplication, and a
/// failed fetch propagates through the stream unchanged.
pub fn page_stream<P, F, Fut>(fetch: F) -> impl Stream<Item = DirSyncResult<P::Item>>
where
    P: Page,
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = DirSyncResult<P>>
{
    let state: PagerState<F, P::Item> = PagerState {
        fetch,
        pending: Vec::new().into_iter(),
        next_token: None,
        started: false
    };

    stream::try_unfold(state, |mut state| async move {
        loop {
            if let Some(item) = state.pending.next() {
                return Ok(Some((item, state)));
            }
            if state.started && state.next_token.is_none() {
                return Ok(None);
            }

            let page = (state.fetch)(state.next_token.take()).await?;
            state.started = true;
            state.next_token = page.next_page_token().filter(|token| !token.is_empty());
            state.pending = page.into_items().into_iter();
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DirSyncError;
    use futures_util::{TryStreamExt, pin_mut};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone)]
    struct TestPage {
        items: Vec<u32>,
        token: Option<String>
    }

    impl Page for TestPage {
        type Item = u32;

        fn next_page_token(&self) -> Option<String> {
            self.token.clone()
        }

        fn into_items(self) -> Vec<u32> {
            self.items
        }
    }

    fn indexed_fetch(
        pages: Vec<TestPage>
    ) -> (
        impl FnMut(Option<String>) -> std::pin::Pin<Box<dyn Future<Output = DirSyncResult<TestPage>>>>,
        Arc<AtomicUsize>
    ) {
        let pages = Arc::new(pages);
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_out = calls.clone();
        let fetch = move |token: Option<String>| {
            let pages = pages.clone();
            let calls = calls.clone();
            Box::pin(async move {
                calls.fetch_add(1, Ordering::SeqCst);
                let index = match token.as_deref() {
                    None => 0,
                    Some(t) => t.parse::<usize>().unwrap()
                };
                Ok::<TestPage, DirSyncError>(pages[index].clone())
            }) as std::pin::Pin<Box<dyn Future<Output = DirSyncResult<TestPage>>>>
        };
        (fetch, calls_out)
    }

    #[tokio::test]
    async fn test_yields_every_item_across_pages_in_order() {
        let (fetch, calls) = indexed_fetch(vec![
            TestPage {
                items: vec![1, 2, 3],
                token: Some("1".to_string())
            },
            TestPage {
                items: vec![4, 5, 6],
                token: Some("2".to_string())
            },
            TestPage {
                items: vec![7],
                token: None
            }
        ]);

        let items: Vec<u32> = page_stream(fetch).try_collect().await.unwrap();
        assert_eq!(items, vec![1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_single_page_without_token() {
        let (fetch, calls) = indexed_fetch(vec![TestPage {
            items: vec![10, 20],
            token: None
        }]);

        let items: Vec<u32> = page_stream(fetch).try_collect().await.unwrap();
        assert_eq!(items, vec![10, 20]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_token_terminates() {
        let (fetch, calls) = indexed_fetch(vec![TestPage {
            items: vec![1],
            token: Some(String::new())
        }]);

        let items: Vec<u32> = page_stream(fetch).try_collect().await.unwrap();
        assert_eq!(items, vec![1]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_page_with_token_continues() {
        let (fetch, _) = indexed_fetch(vec![
            TestPage {
                items: vec![],
                token: Some("1".to_string())
            },
            TestPage {
                items: vec![42],
                token: None
            }
        ]);

        let items: Vec<u32> = page_stream(fetch).try_collect().await.unwrap();
        assert_eq!(items, vec![42]);
    }

    #[tokio::test]
    async fn test_fetch_failure_propagates_after_earlier_items() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_in = calls.clone();
        let fetch = move |token: Option<String>| {
            let calls = calls_in.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                match token {
                    None => Ok(TestPage {
                        items: vec![1, 2],
                        token: Some("next".to_string())
                    }),
                    Some(_) => Err(DirSyncError::Api {
                        status: 500,
                        message: "backend error".to_string()
                    })
                }
            }
        };

        let stream = page_stream(fetch);
        pin_mut!(stream);

        assert_eq!(stream.try_next().await.unwrap(), Some(1));
        assert_eq!(stream.try_next().await.unwrap(), Some(2));
        let err = stream.try_next().await.unwrap_err();
        assert!(matches!(err, DirSyncError::Api { status: 500, .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
