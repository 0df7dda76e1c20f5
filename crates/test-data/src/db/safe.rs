//! Best-effort execution of cleanup steps.

use std::fmt::Display;
use std::future::Future;

use tracing::{debug, warn};

/// Runs `action`, logging and swallowing any error.
///
/// Cleanup keeps going when one table fails (missing table, constraint
/// mismatch). The failure is reported under `label` and `None` is returned.
/// Nothing is retried.
pub async fn delete_safely<T, E, F, Fut>(label: &str, action: F) -> Option<T>
where
    E: Display,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    match action().await {
        Ok(value) => {
            debug!(label, "delete step finished");
            Some(value)
        }
        Err(e) => {
            warn!(label, error = %e, "delete step failed, continuing");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn passes_through_success() {
        let out = delete_safely("ok", || async { Ok::<_, String>(7u64) }).await;
        assert_eq!(out, Some(7));
    }

    #[tokio::test]
    async fn swallows_failure() {
        let out = delete_safely("boom", || async { Err::<u64, _>("table is gone") }).await;
        assert_eq!(out, None);
    }

    #[tokio::test]
    async fn runs_the_action_exactly_once() {
        let mut calls = 0;
        let _ = delete_safely("count", || {
            calls += 1;
            async { Err::<(), _>("nope") }
        })
        .await;
        assert_eq!(calls, 1);
    }
}
