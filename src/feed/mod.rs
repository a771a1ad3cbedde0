//! Address transaction feed.
//!
//! The [`AddressFeedController`] backs the address page of the explorer: it
//! loads the token balances of an address, pages through its transaction
//! history ten at a time and projects every transaction to a [`ViewTxn`]
//! carrying the signed net value for that address.
//!
//! # Key Types
//!
//! - [`AddressQuery`] - The address and currency being viewed
//! - [`AddressView`] - Everything the rendering layer needs
//! - [`RawTxn`] - Backend transaction shape with `vin`/`vout` entries
//! - [`FeedState`] - Accumulated pages for one query

mod controller;
mod types;
mod value;

pub use controller::AddressFeedController;
pub use types::{
    AddressQuery, AddressTxsPage, AddressView, BalancePayload, BalanceState, FeedState, PAGE_SIZE, RawTokenBalance,
    RawTxn, TokenBalance, VinAddress, VinEntry, ViewTxn, VoutEntry,
};
pub use value::{balance_for, net_value};
