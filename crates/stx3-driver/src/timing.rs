//! Delays, deadlines and cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{Result, Stx3Error};

/// Source of the settle and reset waits.
pub trait Delay {
    /// Block for `duration`.
    fn delay(&mut self, duration: Duration);
}

/// Sleeps the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadDelay;

impl Delay for ThreadDelay {
    fn delay(&mut self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

impl<T: Delay + ?Sized> Delay for &mut T {
    fn delay(&mut self, duration: Duration) {
        (**self).delay(duration)
    }
}

impl<T: Delay + ?Sized> Delay for Box<T> {
    fn delay(&mut self, duration: Duration) {
        (**self).delay(duration)
    }
}

/// Shared flag that asks a running operation to stop.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Every clone observes it.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Longest single sleep while a cancel token is attached.
pub const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Bound on how long an operation may keep retrying.
///
/// Checked between attempts and during waits; a blocking read already in
/// progress is bounded by the transport timeout.
#[derive(Debug, Clone, Default)]
pub struct Deadline {
    at: Option<Instant>,
    cancel: Option<CancelToken>,
}

impl Deadline {
    /// No time limit and no cancellation.
    pub fn none() -> Self {
        Self::default()
    }

    /// Expires `timeout` from now.
    pub fn after(timeout: Duration) -> Self {
        Self::at(Instant::now() + timeout)
    }

    /// Expires at `instant`.
    pub fn at(instant: Instant) -> Self {
        Deadline {
            at: Some(instant),
            cancel: None,
        }
    }

    /// Also stop when `token` is cancelled.
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Fail with `Cancelled` or `DeadlineExceeded` if the operation must stop.
    pub fn check(&self) -> Result<()> {
        if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
            return Err(Stx3Error::Cancelled);
        }
        match self.at {
            Some(at) if Instant::now() >= at => Err(Stx3Error::DeadlineExceeded),
            _ => Ok(()),
        }
    }

    /// Time left, `None` when unbounded.
    pub fn remaining(&self) -> Option<Duration> {
        self.at.map(|at| at.saturating_duration_since(Instant::now()))
    }

    /// Wait `duration` on `delay`, stopping early when the deadline passes
    /// or the token is cancelled.
    ///
    /// Each sleep is clamped to the time left, and to
    /// [`CANCEL_POLL_INTERVAL`] while a cancel token is attached.
    pub fn wait<D: Delay + ?Sized>(&self, delay: &mut D, duration: Duration) -> Result<()> {
        let mut left = duration;
        loop {
            self.check()?;
            if left.is_zero() {
                return Ok(());
            }
            let mut step = left;
            if let Some(remaining) = self.remaining() {
                step = step.min(remaining);
            }
            if self.cancel.is_some() {
                step = step.min(CANCEL_POLL_INTERVAL);
            }
            delay.delay(step);
            left -= step;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_never_expires() {
        let deadline = Deadline::none();
        assert!(deadline.check().is_ok());
        assert_eq!(deadline.remaining(), None);
    }

    #[test]
    fn test_expired_deadline() {
        let deadline = Deadline::at(Instant::now() - Duration::from_millis(1));
        assert!(matches!(deadline.check(), Err(Stx3Error::DeadlineExceeded)));
        assert_eq!(deadline.remaining(), Some(Duration::ZERO));

        let deadline = Deadline::after(Duration::from_secs(3600));
        assert!(deadline.check().is_ok());
    }

    #[test]
    fn test_cancel_wins_over_expiry() {
        let token = CancelToken::new();
        let deadline = Deadline::after(Duration::ZERO).with_cancel(token.clone());
        token.cancel();
        assert!(matches!(deadline.check(), Err(Stx3Error::Cancelled)));
    }

    #[test]
    fn test_cancel_is_shared_between_clones() {
        let token = CancelToken::new();
        let deadline = Deadline::none().with_cancel(token.clone());
        assert!(deadline.check().is_ok());
        token.clone().cancel();
        assert!(token.is_cancelled());
        assert!(matches!(deadline.check(), Err(Stx3Error::Cancelled)));
    }

    #[derive(Default)]
    struct Recorded(Vec<Duration>);

    impl Delay for Recorded {
        fn delay(&mut self, duration: Duration) {
            self.0.push(duration);
        }
    }

    #[test]
    fn test_wait_unbounded_is_one_sleep() {
        let mut delay = Recorded::default();
        Deadline::none()
            .wait(&mut delay, Duration::from_millis(1425))
            .unwrap();
        assert_eq!(delay.0, vec![Duration::from_millis(1425)]);

        let mut delay = Recorded::default();
        Deadline::none().wait(&mut delay, Duration::ZERO).unwrap();
        assert!(delay.0.is_empty());
    }

    #[test]
    fn test_wait_with_cancel_sleeps_in_slices() {
        let mut delay = Recorded::default();
        Deadline::none()
            .with_cancel(CancelToken::new())
            .wait(&mut delay, Duration::from_millis(125))
            .unwrap();
        assert_eq!(
            delay.0,
            vec![
                Duration::from_millis(50),
                Duration::from_millis(50),
                Duration::from_millis(25)
            ]
        );
    }

    #[test]
    fn test_wait_is_clamped_to_deadline() {
        let mut delay = Recorded::default();
        let deadline = Deadline::after(Duration::from_millis(50));
        let _ = deadline.wait(&mut delay, Duration::from_millis(1425));
        assert!(!delay.0.is_empty());
        assert!(delay.0.iter().all(|d| *d <= Duration::from_millis(50)));
    }

    #[test]
    fn test_wait_stops_when_cancelled() {
        struct Cancelling(CancelToken, u32);
        impl Delay for Cancelling {
            fn delay(&mut self, _: Duration) {
                self.1 += 1;
                self.0.cancel();
            }
        }

        let token = CancelToken::new();
        let mut delay = Cancelling(token.clone(), 0);
        let err = Deadline::none()
            .with_cancel(token)
            .wait(&mut delay, Duration::from_secs(2))
            .unwrap_err();
        assert!(matches!(err, Stx3Error::Cancelled));
        assert_eq!(delay.1, 1);
    }

    #[test]
    fn test_thread_wait_returns_at_deadline() {
        let started = Instant::now();
        let err = Deadline::after(Duration::from_millis(50))
            .wait(&mut ThreadDelay, Duration::from_millis(1425))
            .unwrap_err();
        assert!(matches!(err, Stx3Error::DeadlineExceeded));
        assert!(started.elapsed() < Duration::from_millis(1000));
    }
}
