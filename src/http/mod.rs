//! HTTP access to the explorer backend.
//!
//! Controllers depend only on the [`ExplorerApi`] trait, a single
//! `get(path, params)` capability returning the backend's `{ status, data }`
//! [`Envelope`]. [`ExplorerHttpClient`] implements it on top of reqwest with
//! retry middleware and latency tracking.
//!
//! # Error Handling
//!
//! [`HttpError`] covers transport, HTTP status, URL and JSON failures. An
//! envelope with a non-200 `status` is not an error: [`fetch_data`] maps it
//! to `Ok(None)`, meaning "request understood, no usable payload".

mod api;
mod error;
mod explorer_http_client;
mod http_client;
#[cfg(test)]
pub(crate) mod testing;
mod types;

pub use api::{ExplorerApi, QueryParams, fetch_data};
pub use error::HttpError;
pub use explorer_http_client::ExplorerHttpClient;
pub use types::{Envelope, SUCCESS_STATUS};
