use crate::error::ViewError;
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Runs `fut` unless `token` is cancelled first, in which case `fut` is dropped.
///
/// Cancellation wins ties, so a result racing a cancellation is discarded.
pub async fn with_cancel<F: Future>(
    token: &CancellationToken,
    fut: F,
) -> Result<F::Output, ViewError> {
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(ViewError::Cancelled),
        output = fut => Ok(output),
    }
}
