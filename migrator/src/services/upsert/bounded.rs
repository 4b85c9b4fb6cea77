use futures_util::stream::{FuturesUnordered, StreamExt};
use std::future::Future;
use thiserror::Error;
use tracing::{debug, info, warn};

/// A settled, successful operation
#[derive(Debug, Clone, PartialEq)]
pub struct Completed<T> {
    pub key: String,
    pub value: T,
}

/// First failure of a batch together with what had already landed
#[derive(Debug, Error)]
#[error(
    "{key} failed after {} operations succeeded ({not_started} not started)",
    .succeeded.len()
)]
pub struct BatchFailure<E>
where
    E: std::error::Error + 'static,
{
    /// Key of the first operation that failed
    pub key: String,
    pub source: E,
    /// Keys of every operation that settled successfully, in completion order
    pub succeeded: Vec<String>,
    /// Operations never started because of the failure
    pub not_started: usize,
    /// Further failures among operations already in flight
    pub additional_failures: usize,
}

/// Runs keyed operations with at most `limit` in flight
///
/// Futures are lazy, so callers hand over every operation up front and only
/// `limit` of them are ever polled at once. After the first failure nothing new
/// is started; operations already in flight are allowed to settle so the
/// returned [`BatchFailure`] lists every write that reached the destination.
#[derive(Debug, Clone)]
pub struct BoundedUpserter {
    label: String,
    limit: usize,
}

impl BoundedUpserter {
    pub fn new(label: impl Into<String>, limit: usize) -> Self {
        Self {
            label: label.into(),
            limit: limit.max(1),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub async fn run<T, E, Fut, I>(&self, operations: I) -> Result<Vec<Completed<T>>, BatchFailure<E>>
    where
        I: IntoIterator<Item = (String, Fut)>,
        Fut: Future<Output = Result<T, E>>,
        E: std::error::Error + 'static,
    {
        let mut pending = operations.into_iter();
        let mut in_flight = FuturesUnordered::new();
        let mut completed = Vec::new();
        let mut first_failure: Option<(String, E)> = None;
        let mut additional_failures = 0usize;

        info!(
            "[{}] Starting bounded upsert with max {} in flight",
            self.label, self.limit
        );

        loop {
            while first_failure.is_none() && in_flight.len() < self.limit {
                match pending.next() {
                    Some((key, operation)) => {
                        in_flight.push(async move {
                            let result = operation.await;
                            (key, result)
                        });
                    }
                    None => break,
                }
            }

            match in_flight.next().await {
                Some((key, Ok(value))) => {
                    debug!("[{}] {} settled", self.label, key);
                    completed.push(Completed { key, value });
                }
                Some((key, Err(error))) => {
                    warn!("[{}] {} failed: {}", self.label, key, error);
                    if first_failure.is_none() {
                        first_failure = Some((key, error));
                    } else {
                        additional_failures += 1;
                    }
                }
                None => break,
            }
        }

        match first_failure {
            None => {
                info!("[{}] Completed {} operations", self.label, completed.len());
                Ok(completed)
            }
            Some((key, source)) => {
                let not_started = pending.count();
                warn!(
                    "[{}] Aborted: {} succeeded, {} not started",
                    self.label,
                    completed.len(),
                    not_started
                );
                Err(BatchFailure {
                    key,
                    source,
                    succeeded: completed.into_iter().map(|c| c.key).collect(),
                    not_started,
                    additional_failures,
                })
            }
        }
    }
}
