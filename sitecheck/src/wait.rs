use crate::{configuration::HarnessConfiguration, error::Error};
use std::{future::Future, time::Duration};
use tokio::time::{sleep, Instant};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Upper bound for a single suspension point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitBudget {
    timeout: Duration,
    poll_interval: Duration,
}

impl WaitBudget {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn from_configuration(configuration: &HarnessConfiguration) -> Self {
        Self::new(configuration.default_command_timeout())
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Poll `condition` until it reports `true`.
    ///
    /// The condition runs at least once even with a zero budget. Its errors abort the wait.
    pub async fn until<F, Fut>(&self, waited_for: &str, mut condition: F) -> Result<(), Error>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<bool, Error>>,
    {
        let deadline = Instant::now() + self.timeout;

        loop {
            if condition().await? {
                return Ok(());
            }

            if Instant::now() >= deadline {
                return Err(Error::Timeout {
                    waited_for: waited_for.into(),
                    budget: self.timeout,
                });
            }

            sleep(self.poll_interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_returns_once_condition_holds() {
        let calls = AtomicUsize::new(0);
        let budget =
            WaitBudget::new(Duration::from_secs(1)).with_poll_interval(Duration::from_millis(1));

        budget
            .until("third call", || {
                let call = calls.fetch_add(1, Ordering::SeqCst);
                async move { Ok(call >= 2) }
            })
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_times_out() {
        let budget =
            WaitBudget::new(Duration::from_millis(20)).with_poll_interval(Duration::from_millis(5));

        let result = budget.until("never", || async { Ok(false) }).await;

        match result {
            Err(Error::Timeout { waited_for, budget }) => {
                assert_eq!(waited_for, "never");
                assert_eq!(budget, Duration::from_millis(20));
            }
            other => panic!("Expected a timeout, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_condition_errors_abort_the_wait() {
        let budget = WaitBudget::new(Duration::from_secs(5));

        let result = budget
            .until("broken condition", || async {
                Err(Error::DriverError("connection lost".into()))
            })
            .await;

        assert!(matches!(result, Err(Error::DriverError(_))));
    }
}
