use std::future::Future;
use std::time::Duration;

use configs::PaymentConfig;
use tokio::time::sleep;
use tracing::{debug, warn};

use super::gateway::GatewayError;

/// Exponential backoff for gateway calls. Only transient errors are retried.
#[derive(Clone, Debug)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff_base: Duration,
    backoff_max: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff_base: Duration, backoff_max: Duration) -> Self {
        Self { max_attempts: max_attempts.max(1), backoff_base, backoff_max }
    }

    pub fn from_config(cfg: &PaymentConfig) -> Self {
        Self::new(
            cfg.retry_max_attempts,
            Duration::from_millis(cfg.retry_backoff_base_ms),
            Duration::from_millis(cfg.retry_backoff_max_ms),
        )
    }

    pub fn max_attempts(&self) -> u32 { self.max_attempts }

    /// Delay before retry number `attempt` (1-based): base * 2^(attempt-1), capped.
    pub fn backoff(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let factor = 2_u32.saturating_pow(attempt - 1);
        self.backoff_base.saturating_mul(factor).min(self.backoff_max)
    }

    pub async fn run<F, Fut, T>(&self, mut operation: F) -> Result<T, GatewayError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, GatewayError>>,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(v) => {
                    if attempt > 0 {
                        debug!("gateway call succeeded after {} retries", attempt);
                    }
                    return Ok(v);
                }
                Err(e) if e.is_retryable() && attempt + 1 < self.max_attempts => {
                    attempt += 1;
                    let wait = self.backoff(attempt);
                    warn!(attempt, ?wait, error = %e, "gateway call failed, retrying");
                    sleep(wait).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn fast(max: u32) -> RetryPolicy { RetryPolicy::new(max, Duration::from_millis(1), Duration::from_millis(5)) }

    #[test]
    fn backoff_doubles_and_caps() {
        let p = RetryPolicy::new(5, Duration::from_millis(200), Duration::from_millis(1000));
        assert_eq!(p.backoff(0), Duration::ZERO);
        assert_eq!(p.backoff(1), Duration::from_millis(200));
        assert_eq!(p.backoff(2), Duration::from_millis(400));
        assert_eq!(p.backoff(3), Duration::from_millis(800));
        assert_eq!(p.backoff(4), Duration::from_millis(1000));
        assert_eq!(p.backoff(40), Duration::from_millis(1000));
    }

    #[tokio::test]
    async fn transient_errors_retry_until_success() {
        let counter = Arc::new(AtomicU32::new(0));
        let c = counter.clone();
        let res = fast(3).run(|| {
            let c = c.clone();
            async move {
                if c.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(GatewayError::Transient("503".into()))
                } else {
                    Ok(42)
                }
            }
        }).await;
        assert_eq!(res, Ok(42));
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let counter = Arc::new(AtomicU32::new(0));
        let c = counter.clone();
        let res: Result<(), _> = fast(2).run(|| {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err(GatewayError::Transient("timeout".into()))
            }
        }).await;
        assert!(res.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn rejections_are_not_retried() {
        let counter = Arc::new(AtomicU32::new(0));
        let c = counter.clone();
        let res: Result<(), _> = fast(5).run(|| {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err(GatewayError::Rejected("card declined".into()))
            }
        }).await;
        assert!(matches!(res, Err(GatewayError::Rejected(_))));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
