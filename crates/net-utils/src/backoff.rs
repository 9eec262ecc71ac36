//! A universal exponential backoff mechanism.

use std::time::Duration;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Default base delay of 100 milliseconds.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(100);

/// Default maximum delay between attempts, 10 seconds.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(10);

/// A default number of retries, 5.
pub const DEFAULT_RETRIES: u32 = 5;

/// Lower bound for both delays, anything smaller is bumped up to this.
const MIN_DELAY_MS: u32 = 25;

pub use builder::BackoffBuilder;

/// Config for a [Backoff]. This doubles as the retry policy handed to
/// [`run_with_retries`](crate::retry::run_with_retries).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffConfig {
    max_retries: u32,
    // opting to have these be u32s, rather than full on [`Duration`]s.
    // their added complexity isn't needed for millisecond scale delays.
    base_delay_ms: u32,
    max_delay_ms: u32,
    total_timeout: Option<Duration>,
}

impl BackoffConfig {
    pub const fn new(max_retries: u32, base_delay: Duration, max_delay: Duration) -> Self {
        const fn clamp_ms(dur: Duration) -> u32 {
            let ms = dur.as_millis();

            if ms > u32::MAX as u128 {
                u32::MAX
            } else if (ms as u32) < MIN_DELAY_MS {
                MIN_DELAY_MS
            } else {
                ms as u32
            }
        }

        let base_delay_ms = clamp_ms(base_delay);
        let max_delay_ms = clamp_ms(max_delay);

        Self {
            max_retries,
            base_delay_ms,
            max_delay_ms: if max_delay_ms < base_delay_ms {
                base_delay_ms
            } else {
                max_delay_ms
            },
            total_timeout: None,
        }
    }

    /// A config that never retries, the operation gets exactly one attempt.
    pub const fn no_retries() -> Self {
        Self::new(0, DEFAULT_BASE_DELAY, DEFAULT_MAX_DELAY)
    }

    /// Caps the total time spent across all attempts. A retry whose sleep would
    /// push past this is not taken.
    pub const fn with_total_timeout(mut self, total_timeout: Duration) -> Self {
        self.total_timeout = Some(total_timeout);
        self
    }

    #[inline]
    pub const fn max_retries(&self) -> u32 {
        self.max_retries
    }

    #[inline]
    pub const fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    #[inline]
    pub const fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms as u64)
    }

    #[inline]
    pub const fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms as u64)
    }

    #[inline]
    pub const fn total_timeout(&self) -> Option<Duration> {
        self.total_timeout
    }

    #[inline]
    fn compute_backoff<R>(&self, retries: u32, rng: &mut R) -> Duration
    where
        R: Rng + ?Sized,
    {
        let slots = 2_u32.saturating_pow(retries);
        let full_delay_ms = slots
            .saturating_mul(self.base_delay_ms)
            .min(self.max_delay_ms);

        let sleep_ms = rng.random_range(self.base_delay_ms..=full_delay_ms);

        Duration::from_millis(sleep_ms as u64)
    }

    #[inline]
    const fn is_spent(&self, retries: u32) -> bool {
        retries > self.max_retries
    }

    pub fn make_backoff(&self) -> Backoff {
        Backoff {
            config: *self,
            rng: SmallRng::from_os_rng(),
            retries: 0,
        }
    }
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self::new(DEFAULT_RETRIES, DEFAULT_BASE_DELAY, DEFAULT_MAX_DELAY)
    }
}

/// Stateful backoff, tracking how many retries have been handed out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backoff<R = SmallRng> {
    retries: u32,
    rng: R,
    config: BackoffConfig,
}

/// A single step of a [Backoff], describing how long to wait before the next attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BackoffOnce {
    max_retries: u32,
    on_retry: u32,
    waiting: Duration,
}

impl BackoffOnce {
    pub const fn on_retry(&self) -> u32 {
        self.on_retry
    }

    pub const fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub const fn waiting(&self) -> Duration {
        self.waiting
    }
}

impl Default for Backoff {
    #[inline]
    fn default() -> Self {
        BackoffConfig::default().make_backoff()
    }
}

impl Backoff {
    #[inline]
    pub fn new(max_retries: u32, base_delay: Duration, max_delay: Duration) -> Self {
        BackoffConfig::new(max_retries, base_delay, max_delay).make_backoff()
    }

    pub const fn builder() -> BackoffBuilder {
        BackoffBuilder::new()
    }
}

impl<R: Rng> Backoff<R> {
    /// Builds a backoff with a caller supplied rng, mainly so tests can seed it.
    pub const fn with_rng(config: BackoffConfig, rng: R) -> Self {
        Self {
            retries: 0,
            rng,
            config,
        }
    }

    #[inline]
    pub const fn retries(&self) -> u32 {
        self.retries
    }

    #[inline]
    pub const fn config(&self) -> BackoffConfig {
        self.config
    }

    pub const fn reset(&mut self) {
        self.retries = 0;
    }

    /// Returns the next step, or [`None`] once every retry has been handed out.
    pub fn backoff_once(&mut self) -> Option<BackoffOnce> {
        self.retries = self.retries.saturating_add(1);

        if self.config.is_spent(self.retries) {
            None
        } else {
            Some(BackoffOnce {
                on_retry: self.retries,
                max_retries: self.config.max_retries,
                waiting: self.config.compute_backoff(self.retries, &mut self.rng),
            })
        }
    }
}

mod builder {
    use std::time::Duration;

    use super::BackoffConfig;

    pub struct BackoffBuilder {
        max_retries: u32,
        base_delay: Duration,
        max_delay: Duration,
        total_timeout: Option<Duration>,
    }

    impl BackoffBuilder {
        pub const fn new() -> Self {
            Self {
                max_retries: super::DEFAULT_RETRIES,
                max_delay: super::DEFAULT_MAX_DELAY,
                base_delay: super::DEFAULT_BASE_DELAY,
                total_timeout: None,
            }
        }

        pub const fn max_retries(&mut self, max_retries: u32) -> &mut Self {
            self.max_retries = max_retries;
            self
        }

        pub const fn max_delay(&mut self, max_delay: Duration) -> &mut Self {
            self.max_delay = max_delay;
            self
        }

        pub const fn base_delay(&mut self, base_delay: Duration) -> &mut Self {
            self.base_delay = base_delay;
            self
        }

        pub const fn total_timeout(&mut self, total_timeout: Duration) -> &mut Self {
            self.total_timeout = Some(total_timeout);
            self
        }

        pub const fn build_config(&self) -> BackoffConfig {
            let config = BackoffConfig::new(self.max_retries, self.base_delay, self.max_delay);

            match self.total_timeout {
                Some(timeout) => config.with_total_timeout(timeout),
                None => config,
            }
        }

        pub fn build(&self) -> super::Backoff {
            self.build_config().make_backoff()
        }
    }

    impl Default for BackoffBuilder {
        fn default() -> Self {
            Self::new()
        }
    }
}
