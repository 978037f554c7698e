pub mod push;
pub mod submit;

use std::{future::Future, time::Duration};

use crate::error::ServiceError;

/// Bound a call to an external service. Dropping the returned future
/// cancels the call.
pub(crate) async fn within_deadline<T, F>(deadline: Duration, call: F) -> Result<T, ServiceError>
where
    F: Future<Output = Result<T, ServiceError>>,
{
    tokio::time::timeout(deadline, call)
        .await
        .map_err(|_| ServiceError::Timeout(deadline))?
}
