//! Error types for explorer API operations.
//!
//! This module defines the [`HttpError`] enum which encompasses all possible
//! failure modes when talking to the explorer backend.

use thiserror::Error;

/// Errors that can occur while fetching data from the explorer backend.
///
/// # Error Categories
///
/// - **Network errors**: [`RequestFailed`](HttpError::RequestFailed),
///   [`MiddlewareError`](HttpError::MiddlewareError)
/// - **Server errors**: [`ServerError`](HttpError::ServerError)
/// - **Client errors**: [`UrlError`](HttpError::UrlError),
///   [`JsonError`](HttpError::JsonError)
///
/// An envelope whose application `status` is not 200 is *not* an error; it is
/// returned to the caller as a regular [`Envelope`](super::Envelope).
///
/// # Example
///
/// ```rust,no_run
/// use nrlxplore::http::HttpError;
///
/// fn handle_error(err: HttpError) {
///     match err {
///         HttpError::ServerError { status, body } => {
///             eprintln!("Server returned {}: {}", status, body);
///         }
///         HttpError::RequestFailed(e) => {
///             eprintln!("Network error: {}", e);
///         }
///         _ => eprintln!("Other error: {}", err),
///     }
/// }
/// ```
#[derive(Debug, Error)]
pub enum HttpError {
    /// The HTTP request failed due to a network or connection error.
    ///
    /// Connection refused, timeouts, DNS and TLS failures end up here.
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// An error occurred in the HTTP middleware layer.
    ///
    /// The middleware handles retry logic, so this usually means all retry
    /// attempts have been exhausted.
    #[error("Middleware error: {0}")]
    MiddlewareError(#[from] reqwest_middleware::Error),

    /// The server returned a non-success HTTP status code.
    #[error("Server error {status}: {body}")]
    ServerError {
        /// The HTTP status code returned by the server.
        status: reqwest::StatusCode,
        /// The response body, which may contain error details.
        body: String,
    },

    /// Joining the base URL with a request path produced an invalid URL.
    #[error("URL parse error: {0}")]
    UrlError(#[from] url::ParseError),

    /// The envelope or its payload did not match the expected shape.
    ///
    /// This includes amounts sent as strings that are not numbers.
    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}
