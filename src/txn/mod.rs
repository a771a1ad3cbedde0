//! Transaction detail page.
//!
//! The [`TxnDetailController`] loads a single Stellar transaction and the
//! operations it contains. Operation records are open-ended JSON objects;
//! their keys are converted to camelCase for display by
//! [`normalize_operation`].

mod controller;
mod keys;
mod types;

pub use controller::TxnDetailController;
pub use keys::{camel_case, normalize_operation};
pub use types::{OperationsPayload, STELLAR_CURRENCY, TxnDetail, TxnView};
