//! Concurrent fan-out over independently failing targets.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::task::JoinSet;

/// Aggregate of every target that failed during one bulk call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkFailure {
    failures: HashMap<String, String>,
}

impl BulkFailure {
    #[cfg(test)]
    pub const fn failures(&self) -> &HashMap<String, String> {
        &self.failures
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for BulkFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of the targets failed:", self.failures.len())?;
        let mut targets: Vec<_> = self.failures.iter().collect();
        targets.sort();
        for (target, error) in targets {
            write!(f, "\n - {target}: {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for BulkFailure {}

/// Run `worker` for every target concurrently and wait for all of them.
///
/// Each failure is recorded under its target in a map that lives only for
/// this call. The result is `Ok` when every target succeeded, otherwise a
/// single [`BulkFailure`] listing all failed targets, independent of the
/// order in which the workers finished.
pub async fn fan_out<F, Fut, E>(targets: &[String], worker: F) -> Result<(), BulkFailure>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<(), E>> + Send + 'static,
    E: fmt::Display + Send + 'static,
{
    let errors = Arc::new(Mutex::new(HashMap::with_capacity(targets.len())));
    let mut tasks = JoinSet::new();
    let mut owners = HashMap::with_capacity(targets.len());

    for target in targets {
        let job = worker(target.clone());
        let errors = Arc::clone(&errors);
        let name = target.clone();
        let handle = tasks.spawn(async move {
            if let Err(err) = job.await {
                errors
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .insert(name, err.to_string());
            }
        });
        owners.insert(handle.id(), target.clone());
    }

    while let Some(joined) = tasks.join_next().await {
        if let Err(join_error) = joined
            && let Some(target) = owners.get(&join_error.id())
        {
            errors
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(target.clone(), format!("worker aborted: {join_error}"));
        }
    }

    let failure = BulkFailure {
        failures: std::mem::take(&mut *errors.lock().unwrap_or_else(PoisonError::into_inner)),
    };
    if failure.is_empty() {
        Ok(())
    } else {
        Err(failure)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn targets(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("image-{i}")).collect()
    }

    #[tokio::test]
    async fn test_all_succeed() {
        let result = fan_out(&targets(4), |_| async { Ok::<(), String>(()) }).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_empty_target_set() {
        let result = fan_out(&[], |_| async { Err::<(), _>("unreachable") }).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_collects_every_failure() {
        let result = fan_out(&targets(5), |target| async move {
            if target.ends_with('1') || target.ends_with('3') {
                Err(format!("pull failed for {target}"))
            } else {
                Ok(())
            }
        })
        .await;

        let failure = result.unwrap_err();
        assert_eq!(failure.len(), 2);
        assert_eq!(
            failure.failures().get("image-3").map(String::as_str),
            Some("pull failed for image-3")
        );
    }

    #[tokio::test]
    async fn test_aggregate_independent_of_completion_order() {
        let all = targets(6);
        let n = all.len() as u64;

        // Forward: first dispatched finishes first.
        let forward = fan_out(&all, |target| async move {
            let i: u64 = target.trim_start_matches("image-").parse().unwrap();
            tokio::time::sleep(Duration::from_millis(5 * i)).await;
            if i % 2 == 0 { Err("boom") } else { Ok(()) }
        })
        .await
        .unwrap_err();

        // Reverse: last dispatched finishes first.
        let reverse = fan_out(&all, |target| async move {
            let i: u64 = target.trim_start_matches("image-").parse().unwrap();
            tokio::time::sleep(Duration::from_millis(5 * (n - i))).await;
            if i % 2 == 0 { Err("boom") } else { Ok(()) }
        })
        .await
        .unwrap_err();

        assert_eq!(forward.len(), 3);
        assert_eq!(forward, reverse);
        assert_eq!(forward.to_string(), reverse.to_string());
    }

    #[tokio::test]
    async fn test_panicking_worker_is_reported() {
        let result = fan_out(&targets(2), |target| async move {
            assert!(target != "image-1", "worker exploded");
            Ok::<(), String>(())
        })
        .await;

        let failure = result.unwrap_err();
        assert_eq!(failure.len(), 1);
        assert!(failure.failures().contains_key("image-1"));
    }

    #[test]
    fn test_display_is_sorted() {
        let failure = BulkFailure {
            failures: HashMap::from([
                ("b".to_string(), "second".to_string()),
                ("a".to_string(), "first".to_string()),
            ]),
        };
        assert_eq!(
            failure.to_string(),
            "2 of the targets failed:\n - a: first\n - b: second"
        );
    }
}
