pub mod containers;
pub mod events;
pub mod health;
pub mod levels;
pub mod skills;

use crate::error::AppError;

/// Run a blocking engine call off the async executor.
pub(crate) async fn blocking<T, F>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> skilltree_core::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let result = tokio::task::spawn_blocking(f)
        .await
        .map_err(AppError::join)?;
    Ok(result?)
}
