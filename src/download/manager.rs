//! Bounded-concurrency fetch manager for a run's resource set.
//!
//! This module provides the `DownloadManager` which downloads N independent
//! resources (chapters plus the optional cover) using a semaphore-based
//! concurrency control pattern, aggregating progress into shared counters and
//! reporting one combined terminal outcome.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::Semaphore;
use tracing::{debug, info, instrument, warn};

use super::client::HttpClient;
use super::error::DownloadError;
use super::progress::ProgressCounters;

/// Minimum allowed concurrency value.
const MIN_CONCURRENCY: usize = 1;

/// Maximum allowed concurrency value.
const MAX_CONCURRENCY: usize = 20;

/// Default concurrency if not specified.
pub const DEFAULT_CONCURRENCY: usize = 7;

/// Error type for download manager operations.
#[derive(Debug, thiserror::Error)]
pub enum ManagerError {
    /// Invalid concurrency value provided.
    #[error(
        "invalid concurrency value {value}: must be between {MIN_CONCURRENCY} and {MAX_CONCURRENCY}"
    )]
    InvalidConcurrency {
        /// The invalid value that was provided.
        value: usize,
    },

    /// Semaphore was closed unexpectedly.
    #[error("semaphore closed unexpectedly")]
    SemaphoreClosed,
}

/// One downloadable resource: where it lives, where it lands, and what
/// content types it may legitimately carry.
#[derive(Debug, Clone)]
pub struct ResourceRequest {
    /// Source URL.
    pub url: String,
    /// Destination path inside the staging area.
    pub dest: PathBuf,
    /// Expected content-type allow-list; `None` skips validation.
    pub allowed_types: Option<Vec<String>>,
}

impl ResourceRequest {
    /// Creates a request without content-type validation.
    #[must_use]
    pub fn new(url: impl Into<String>, dest: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            dest: dest.into(),
            allowed_types: None,
        }
    }

    /// Attaches a content-type allow-list.
    #[must_use]
    pub fn with_allowed_types(mut self, types: &[&str]) -> Self {
        self.allowed_types = Some(types.iter().map(|t| (*t).to_string()).collect());
        self
    }
}

/// Terminal state of one submitted resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceState {
    /// Downloaded and written to its destination.
    Succeeded,
    /// Dispatched but failed (its error may be the run's first fatal one).
    Failed,
    /// Never dispatched because a fatal error was recorded first.
    Skipped,
}

/// Combined terminal outcome of a `fetch_all` call.
///
/// `states` is aligned index-for-index with the submitted resources;
/// `first_error` is the error that aborted the run, if any. Results of
/// in-flight workers that completed after the fatal error was recorded are
/// reflected in `states` but do not displace the first error.
#[derive(Debug)]
pub struct FetchOutcome {
    /// Per-resource terminal states, in submission order.
    pub states: Vec<ResourceState>,
    /// The first fatal error recorded, if the run was aborted.
    pub first_error: Option<DownloadError>,
}

impl FetchOutcome {
    /// True when every submitted resource succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.first_error.is_none()
            && self
                .states
                .iter()
                .all(|s| *s == ResourceState::Succeeded)
    }

    /// Number of resources that reached their destination.
    #[must_use]
    pub fn succeeded_count(&self) -> usize {
        self.states
            .iter()
            .filter(|s| **s == ResourceState::Succeeded)
            .count()
    }
}

/// Concurrent fetch manager with a bounded worker pool.
///
/// # Concurrency Model
///
/// - Each resource download runs in its own Tokio task
/// - A semaphore permit is acquired before starting each download
/// - Permits are released automatically when downloads complete (RAII)
/// - Once a fatal error is recorded, no further resources are submitted;
///   already-dispatched workers finish naturally
#[derive(Debug)]
pub struct DownloadManager {
    /// Semaphore for concurrency control.
    semaphore: Arc<Semaphore>,
    /// Configured concurrency limit.
    concurrency: usize,
    /// Shared HTTP client.
    client: HttpClient,
}

impl DownloadManager {
    /// Creates a new download manager with the specified concurrency limit.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::InvalidConcurrency`] if the value is outside
    /// the valid range (1-20).
    #[instrument(level = "debug", skip(client))]
    pub fn new(client: HttpClient, concurrency: usize) -> Result<Self, ManagerError> {
        if !(MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&concurrency) {
            return Err(ManagerError::InvalidConcurrency { value: concurrency });
        }

        debug!(concurrency, "creating download manager");

        Ok(Self {
            semaphore: Arc::new(Semaphore::new(concurrency)),
            concurrency,
            client,
        })
    }

    /// Returns the configured concurrency limit.
    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Downloads every resource with bounded parallelism and returns one
    /// combined outcome.
    ///
    /// This method:
    /// 1. Submits resources in order, acquiring a semaphore permit per task
    /// 2. Streams each resource to its destination with content-type checks
    /// 3. Stops submitting once any resource records a fatal error
    /// 4. Returns only after every dispatched resource reached success or
    ///    failure
    ///
    /// Individual download failures do NOT make this method return `Err`;
    /// they are reported through [`FetchOutcome::first_error`] so the caller
    /// can distinguish which resources, if any, are usable.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::SemaphoreClosed`] if the semaphore is closed.
    #[instrument(skip(self, resources, counters), fields(resources = resources.len()))]
    pub async fn fetch_all(
        &self,
        resources: &[ResourceRequest],
        counters: &Arc<ProgressCounters>,
    ) -> Result<FetchOutcome, ManagerError> {
        let states = Arc::new(Mutex::new(vec![ResourceState::Skipped; resources.len()]));
        let first_error: Arc<Mutex<Option<DownloadError>>> = Arc::new(Mutex::new(None));
        let aborted = Arc::new(AtomicBool::new(false));
        let mut handles = Vec::new();

        info!(total = resources.len(), "starting resource downloads");

        for (index, resource) in resources.iter().enumerate() {
            if aborted.load(Ordering::SeqCst) {
                debug!(index, "fatal error recorded; not submitting resource");
                continue;
            }

            // Acquire semaphore permit (blocks if at concurrency limit)
            let permit = self
                .semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|_| ManagerError::SemaphoreClosed)?;

            // Re-check after waiting for a permit: a worker may have recorded
            // a fatal error while this submission was blocked.
            if aborted.load(Ordering::SeqCst) {
                debug!(index, "fatal error recorded while waiting; not submitting resource");
                drop(permit);
                continue;
            }

            // Clone values for the spawned task
            let client = self.client.clone();
            let resource = resource.clone();
            let counters = Arc::clone(counters);
            let states = Arc::clone(&states);
            let first_error = Arc::clone(&first_error);
            let aborted = Arc::clone(&aborted);

            handles.push(tokio::spawn(async move {
                // Permit is dropped when this block exits (RAII)
                let _permit = permit;

                let result = client
                    .fetch_resource(
                        &resource.url,
                        &resource.dest,
                        resource.allowed_types.as_deref(),
                        &counters,
                    )
                    .await;

                match result {
                    Ok(bytes) => {
                        info!(url = %resource.url, bytes, "resource completed");
                        if let Ok(mut states) = states.lock() {
                            states[index] = ResourceState::Succeeded;
                        }
                    }
                    Err(e) => {
                        warn!(url = %resource.url, error = %e, "resource failed");
                        if let Ok(mut states) = states.lock() {
                            states[index] = ResourceState::Failed;
                        }
                        aborted.store(true, Ordering::SeqCst);
                        if let Ok(mut slot) = first_error.lock() {
                            // Only the first fatal error is reported; later
                            // failures from in-flight workers are discarded.
                            if slot.is_none() {
                                *slot = Some(e);
                            }
                        }
                    }
                }
            }));
        }

        debug!(
            task_count = handles.len(),
            "waiting for downloads to complete"
        );

        // Wait for all dispatched tasks to complete
        for handle in handles {
            // Ignore JoinError - task panics are logged but don't fail the batch
            if let Err(e) = handle.await {
                warn!(error = %e, "download task panicked");
            }
        }

        let states = states
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone());
        let first_error = first_error
            .lock()
            .map(|mut guard| guard.take())
            .unwrap_or(None);

        let outcome = FetchOutcome {
            states,
            first_error,
        };
        info!(
            succeeded = outcome.succeeded_count(),
            aborted = outcome.first_error.is_some(),
            "resource downloads finished"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_manager_new_valid_concurrency() {
        let manager = DownloadManager::new(HttpClient::new(), 1).unwrap();
        assert_eq!(manager.concurrency(), 1);

        let manager = DownloadManager::new(HttpClient::new(), DEFAULT_CONCURRENCY).unwrap();
        assert_eq!(manager.concurrency(), 7);

        let manager = DownloadManager::new(HttpClient::new(), 20).unwrap();
        assert_eq!(manager.concurrency(), 20);
    }

    #[test]
    fn test_manager_new_invalid_concurrency_zero() {
        let result = DownloadManager::new(HttpClient::new(), 0);
        assert!(matches!(
            result,
            Err(ManagerError::InvalidConcurrency { value: 0 })
        ));
    }

    #[test]
    fn test_manager_new_invalid_concurrency_too_high() {
        let result = DownloadManager::new(HttpClient::new(), 21);
        assert!(matches!(
            result,
            Err(ManagerError::InvalidConcurrency { value: 21 })
        ));
    }

    #[test]
    fn test_resource_request_allow_list() {
        let request =
            ResourceRequest::new("https://example.com/0.pdf", "/tmp/0.pdf")
                .with_allowed_types(&["application/pdf"]);
        assert_eq!(
            request.allowed_types,
            Some(vec!["application/pdf".to_string()])
        );
    }

    #[test]
    fn test_fetch_outcome_success_accounting() {
        let outcome = FetchOutcome {
            states: vec![ResourceState::Succeeded, ResourceState::Succeeded],
            first_error: None,
        };
        assert!(outcome.is_success());
        assert_eq!(outcome.succeeded_count(), 2);

        let outcome = FetchOutcome {
            states: vec![
                ResourceState::Succeeded,
                ResourceState::Failed,
                ResourceState::Skipped,
            ],
            first_error: Some(DownloadError::timeout("https://example.com/1.pdf")),
        };
        assert!(!outcome.is_success());
        assert_eq!(outcome.succeeded_count(), 1);
    }

    #[test]
    fn test_manager_error_display() {
        let error = ManagerError::InvalidConcurrency { value: 0 };
        let msg = error.to_string();
        assert!(msg.contains("invalid concurrency"));
        assert!(msg.contains("0"));
    }
}
