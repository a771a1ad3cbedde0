use async_trait::async_trait;
use log::debug;
use serde::de::DeserializeOwned;

use super::error::HttpError;
use super::types::Envelope;

/// Query parameters attached to a GET request.
pub type QueryParams<'a> = &'a [(&'static str, String)];

/// The single capability the view controllers need from the backend.
///
/// Implementations return the decoded `{ status, data }` envelope. A
/// non-200 `status` is a regular response, only transport, HTTP and decode
/// failures are errors.
#[async_trait]
pub trait ExplorerApi: Send + Sync {
    async fn get(&self, path: &str, params: QueryParams<'_>) -> Result<Envelope, HttpError>;
}

/// Fetches `path` and decodes the envelope payload into `T`.
///
/// Returns `Ok(None)` when the backend answered with a non-200 status.
pub async fn fetch_data<T: DeserializeOwned>(
    api: &dyn ExplorerApi,
    path: &str,
    params: QueryParams<'_>,
) -> Result<Option<T>, HttpError> {
    let envelope = api.get(path, params).await?;
    if !envelope.is_success() {
        debug!(
            path = path,
            status = envelope.status;
            "Explorer returned no usable payload"
        );
        return Ok(None);
    }

    Ok(Some(serde_json::from_value(envelope.data)?))
}
