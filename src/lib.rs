pub mod cli;
pub mod config;
pub mod feed;
pub mod http;
pub mod log;
pub mod models;
pub mod txn;

pub use crate::config::ExplorerConfig;
pub use crate::feed::{AddressFeedController, AddressQuery, AddressView};
pub use crate::http::{ExplorerApi, ExplorerHttpClient, HttpError};
pub use crate::txn::{TxnDetailController, TxnView};
