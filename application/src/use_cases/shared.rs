//! Shared utilities for use cases.
//!
//! Contains cancellation checking and the bounded-await helper applied at
//! every suspension point (oracle round-trips, tool calls).

use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Why a bounded operation did not produce a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Interrupted {
    Cancelled,
    TimedOut(Duration),
}

/// Check if cancellation has been requested.
pub(crate) fn check_cancelled(token: &Option<CancellationToken>) -> Result<(), Interrupted> {
    if let Some(token) = token
        && token.is_cancelled()
    {
        return Err(Interrupted::Cancelled);
    }
    Ok(())
}

/// Await `future`, giving up on cancellation or after `timeout`.
///
/// Cancellation wins if both happen in the same poll.
pub(crate) async fn run_bounded<F, T>(
    future: F,
    timeout: Option<Duration>,
    token: &Option<CancellationToken>,
) -> Result<T, Interrupted>
where
    F: Future<Output = T>,
{
    check_cancelled(token)?;

    let timed = async {
        match timeout {
            Some(limit) => tokio::time::timeout(limit, future)
                .await
                .map_err(|_| Interrupted::TimedOut(limit)),
            None => Ok(future.await),
        }
    };

    match token {
        Some(token) => {
            tokio::select! {
                biased;
                _ = token.cancelled() => Err(Interrupted::Cancelled),
                result = timed => result,
            }
        }
        None => timed.await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_cancelled() {
        assert!(check_cancelled(&None).is_ok());

        let token = CancellationToken::new();
        assert!(check_cancelled(&Some(token.clone())).is_ok());
        token.cancel();
        assert_eq!(check_cancelled(&Some(token)), Err(Interrupted::Cancelled));
    }

    #[tokio::test]
    async fn test_run_bounded_completes() {
        let value = run_bounded(async { 7 }, Some(Duration::from_secs(1)), &None).await;
        assert_eq!(value, Ok(7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_bounded_times_out() {
        let result = run_bounded(
            tokio::time::sleep(Duration::from_secs(60)),
            Some(Duration::from_secs(1)),
            &None,
        )
        .await;
        assert_eq!(result, Err(Interrupted::TimedOut(Duration::from_secs(1))));
    }

    #[tokio::test]
    async fn test_run_bounded_cancelled_while_waiting() {
        let token = CancellationToken::new();
        let trigger = token.clone();
        tokio::spawn(async move {
            tokio::task::yield_now().await;
            trigger.cancel();
        });

        let result = run_bounded(std::future::pending::<()>(), None, &Some(token)).await;
        assert_eq!(result, Err(Interrupted::Cancelled));
    }
}
