//! Per-operation deadline and cancellation.

use std::future::Future;
use std::time::Duration;

use social_core::{Ctx, RepoError};

/// Run one store operation under the context's budget.
///
/// The operation is abandoned as soon as the context is cancelled or the
/// budget (`QUERY_TIMEOUT`, or less if the context deadline is closer) runs out.
pub(crate) async fn bounded<T, F>(ctx: &Ctx, op: F) -> Result<T, RepoError>
where
    F: Future<Output = Result<T, RepoError>>,
{
    if ctx.is_cancelled() {
        return Err(RepoError::Cancelled);
    }

    let budget = ctx.query_budget();
    if budget == Duration::ZERO {
        return Err(RepoError::Timeout(budget));
    }

    tokio::select! {
        biased;
        _ = ctx.cancelled() => Err(RepoError::Cancelled),
        outcome = tokio::time::timeout(budget, op) => match outcome {
            Ok(result) => result,
            Err(_) => Err(RepoError::Timeout(budget)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn passes_result_through() {
        let ctx = Ctx::background();
        let value = bounded(&ctx, async { Ok::<_, RepoError>(42) }).await.unwrap();
        assert_eq!(value, 42);

        let err = bounded(&ctx, async { Err::<(), _>(RepoError::NotFound) })
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::NotFound));
    }

    #[tokio::test]
    async fn slow_operation_times_out() {
        let ctx = Ctx::background().with_timeout(Duration::from_millis(20));
        let err = bounded(&ctx, std::future::pending::<Result<(), RepoError>>())
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Timeout(_)));
    }

    #[tokio::test]
    async fn expired_deadline_fails_fast() {
        let ctx = Ctx::background().with_timeout(Duration::ZERO);
        let err = bounded(&ctx, async { Ok::<_, RepoError>(()) })
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Timeout(_)));
    }

    #[tokio::test]
    async fn cancelled_context_aborts_before_running() {
        let ctx = Ctx::background();
        ctx.cancel();
        let err = bounded(&ctx, async { Ok::<_, RepoError>(()) })
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Cancelled));
    }

    #[tokio::test]
    async fn cancellation_interrupts_in_flight_operation() {
        let ctx = Ctx::background();
        let canceller = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            canceller.cancel();
        });

        let err = bounded(&ctx, std::future::pending::<Result<(), RepoError>>())
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Cancelled));
    }
}
