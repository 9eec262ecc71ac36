#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Classify {
    Retry,
    DontRetry,
}

/// Decides whether a failed attempt should be retried.
pub trait RetryClassify<E> {
    fn classify(&self, error: &E) -> Classify;
}

impl<E, F> RetryClassify<E> for F
where
    F: Fn(&E) -> Classify,
{
    #[inline]
    fn classify(&self, error: &E) -> Classify {
        (self)(error)
    }
}

/// Classifier that retries every failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AlwaysRetry;

impl<E> RetryClassify<E> for AlwaysRetry {
    #[inline]
    fn classify(&self, _error: &E) -> Classify {
        Classify::Retry
    }
}

/// Classifier that never retries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NeverRetry;

impl<E> RetryClassify<E> for NeverRetry {
    #[inline]
    fn classify(&self, _error: &E) -> Classify {
        Classify::DontRetry
    }
}
