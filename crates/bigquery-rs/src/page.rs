//! Cursor driven pagination over list style calls.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::{Stream, TryStreamExt, stream};

/// Fetches the page following the one it was created for. Implementations
/// capture everything the request needs (scope, options with the page token
/// already set), so fetching the same page twice issues the same request.
pub trait NextPageFetcher<T>: Send + Sync + fmt::Debug {
    fn fetch_next_page(&self) -> BoxFuture<'_, crate::Result<Page<T>>>;
}

/// A single page of results, plus what's needed to fetch the next one.
///
/// A page without a cursor (or with an empty one) is the last page.
#[derive(Debug, Clone)]
pub struct Page<T> {
    cursor: Option<Box<str>>,
    values: Vec<T>,
    fetcher: Option<Arc<dyn NextPageFetcher<T>>>,
}

impl<T> Page<T> {
    /// A page with nothing after it.
    pub fn single(values: Vec<T>) -> Self {
        Self {
            cursor: None,
            values,
            fetcher: None,
        }
    }

    pub fn empty() -> Self {
        Self::single(Vec::new())
    }

    /// Builds a page, only calling `make_fetcher` if `cursor` points at another
    /// page.
    pub fn with_fetcher<F>(cursor: Option<Box<str>>, values: Vec<T>, make_fetcher: F) -> Self
    where
        F: FnOnce(&str) -> Arc<dyn NextPageFetcher<T>>,
    {
        match cursor.filter(|cursor| !cursor.is_empty()) {
            Some(cursor) => {
                let fetcher = make_fetcher(&cursor);
                Self {
                    cursor: Some(cursor),
                    values,
                    fetcher: Some(fetcher),
                }
            }
            None => Self::single(values),
        }
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn into_values(self) -> Vec<T> {
        self.values
    }

    /// The token of the next page.
    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    pub fn has_next_page(&self) -> bool {
        self.fetcher.is_some()
    }

    /// Fetches the next page, or `None` if this is the last one.
    pub async fn next_page(&self) -> crate::Result<Option<Page<T>>> {
        match self.fetcher {
            Some(ref fetcher) => fetcher.fetch_next_page().await.map(Some),
            None => Ok(None),
        }
    }

    /// Every value from this page onward. Later pages are only requested once the
    /// stream is polled past the values already fetched.
    pub fn into_stream(self) -> impl Stream<Item = crate::Result<T>> + Send + 'static
    where
        T: Send + 'static,
    {
        enum State<T> {
            Page(Page<T>),
            Next(Arc<dyn NextPageFetcher<T>>),
            Done,
        }

        fn split<T>(page: Page<T>) -> (Vec<T>, State<T>) {
            let next = match page.fetcher {
                Some(fetcher) => State::Next(fetcher),
                None => State::Done,
            };
            (page.values, next)
        }

        stream::try_unfold(State::Page(self), |state| async move {
            let (values, next) = match state {
                State::Done => return Ok(None),
                State::Page(page) => split(page),
                State::Next(fetcher) => split(fetcher.fetch_next_page().await?),
            };

            let values = values.into_iter().map(Ok::<T, crate::Error>);
            Ok::<_, crate::Error>(Some((stream::iter(values), next)))
        })
        .try_flatten()
    }
}

// The fetcher is not part of a page's identity, only the cursor and values are.
impl<T: PartialEq> PartialEq for Page<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cursor == other.cursor && self.values == other.values
    }
}

impl<T: Eq> Eq for Page<T> {}

impl<T: Hash> Hash for Page<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.cursor.hash(state);
        self.values.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use futures::{FutureExt, TryStreamExt};

    use super::*;

    /// Serves `remaining` one page at a time, counting the requests made.
    #[derive(Debug)]
    struct VecFetcher {
        remaining: Vec<Vec<u32>>,
        fetches: Arc<AtomicUsize>,
    }

    fn page_of(mut remaining: Vec<Vec<u32>>, fetches: &Arc<AtomicUsize>) -> Page<u32> {
        let values = remaining.remove(0);
        let cursor = (!remaining.is_empty()).then(|| format!("page-{}", remaining.len()).into());
        let fetches = Arc::clone(fetches);

        Page::with_fetcher(cursor, values, move |_| {
            Arc::new(VecFetcher {
                remaining,
                fetches,
            })
        })
    }

    impl NextPageFetcher<u32> for VecFetcher {
        fn fetch_next_page(&self) -> BoxFuture<'_, crate::Result<Page<u32>>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            let page = page_of(self.remaining.clone(), &self.fetches);
            async move { Ok(page) }.boxed()
        }
    }

    #[test]
    fn test_empty_cursor_is_terminal() {
        let page = Page::with_fetcher(Some("".into()), vec![1, 2], |_| {
            panic!("no fetcher should be built for an empty cursor")
        });

        assert!(!page.has_next_page());
        assert_eq!(page.cursor(), None);
        assert_eq!(page.values(), &[1, 2]);
    }

    #[test]
    fn test_equality_ignores_fetcher() {
        use std::hash::{BuildHasher, RandomState};

        let fetches = Arc::new(AtomicUsize::new(0));
        let a = page_of(vec![vec![1, 2], vec![3]], &fetches);
        let b = page_of(vec![vec![1, 2], vec![4, 5]], &fetches);
        assert_eq!(a, b);

        let state = RandomState::new();
        assert_eq!(state.hash_one(&a), state.hash_one(&b));
        assert_ne!(a, Page::single(vec![1, 2]));
    }

    #[tokio::test]
    async fn test_next_page() {
        let fetches = Arc::new(AtomicUsize::new(0));
        let first = page_of(vec![vec![1, 2], vec![3], vec![]], &fetches);
        assert_eq!(first.cursor(), Some("page-2"));

        let second = first.next_page().await.unwrap().unwrap();
        assert_eq!(second.values(), &[3]);
        assert!(second.has_next_page());

        let third = second.next_page().await.unwrap().unwrap();
        assert!(third.values().is_empty());
        assert!(!third.has_next_page());
        assert!(third.next_page().await.unwrap().is_none());

        assert_eq!(fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_into_stream_is_lazy() {
        let fetches = Arc::new(AtomicUsize::new(0));
        let first = page_of(vec![vec![1, 2], vec![3, 4], vec![5]], &fetches);

        let mut stream = std::pin::pin!(first.into_stream());
        assert_eq!(stream.try_next().await.unwrap(), Some(1));
        assert_eq!(stream.try_next().await.unwrap(), Some(2));
        assert_eq!(fetches.load(Ordering::SeqCst), 0);

        let rest: Vec<u32> = stream.try_collect().await.unwrap();
        assert_eq!(rest, vec![3, 4, 5]);
        assert_eq!(fetches.load(Ordering::SeqCst), 2);
    }
}
