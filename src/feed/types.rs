use serde::{Deserialize, Serialize};

use crate::models::Amount;

/// Number of transactions the backend returns per page.
pub const PAGE_SIZE: usize = 10;

/// Identifies the address being viewed and the currency it is viewed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressQuery {
    pub address: String,
    pub currency: String,
}

impl AddressQuery {
    pub fn new(address: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            currency: currency.into(),
        }
    }
}

/// Transaction as returned by `GET /address/txs/{address}`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTxn {
    pub txid: String,
    #[serde(default)]
    pub blockhash: Option<String>,
    #[serde(default)]
    pub blocktime: Option<u64>,
    #[serde(default)]
    pub vin: Vec<VinEntry>,
    #[serde(default)]
    pub vout: Vec<VoutEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VinEntry {
    #[serde(default)]
    pub address: Option<VinAddress>,
}

/// The previous output a vin spends.
#[derive(Debug, Clone, Deserialize)]
pub struct VinAddress {
    pub address: String,
    #[serde(default)]
    pub value: Amount,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VoutEntry {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub value: Amount,
}

/// Payload of one address transaction page.
#[derive(Debug, Clone, Deserialize)]
pub struct AddressTxsPage {
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub result: Vec<RawTxn>,
}

/// Payload of `GET /balance/{address}`.
#[derive(Debug, Clone, Deserialize)]
pub struct BalancePayload {
    #[serde(default)]
    pub balance: Vec<RawTokenBalance>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawTokenBalance {
    pub ticker: String,
    #[serde(default)]
    pub value: Amount,
    #[serde(default)]
    pub asset: String,
}

/// One token held by the address, renamed for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenBalance {
    pub symbol: String,
    pub balance: Amount,
    pub asset: String,
}

impl From<RawTokenBalance> for TokenBalance {
    fn from(raw: RawTokenBalance) -> Self {
        Self {
            symbol: raw.ticker,
            balance: raw.value,
            asset: raw.asset,
        }
    }
}

/// A transaction projected relative to the queried address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewTxn {
    pub hash: String,
    pub block_hash: String,
    /// Block time in unix seconds, 0 while unconfirmed.
    pub timestamp: u64,
    /// Net balance change for the queried address; negative when it spent.
    pub value: f64,
}

/// Accumulated transaction history for the active query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedState {
    pub items: Vec<ViewTxn>,
    /// `None` until the first page arrives; unknown is not zero.
    pub total: Option<u64>,
    pub has_more: bool,
    pub is_loading: bool,
    exhausted: bool,
}

impl FeedState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Offset of the next page to request.
    pub fn next_offset(&self) -> usize {
        self.items.len()
    }

    /// Appends a page in response order.
    ///
    /// Once a short page has been seen, `has_more` stays false until
    /// [`reset`](Self::reset).
    pub fn append_page(&mut self, total: Option<u64>, page: Vec<ViewTxn>) {
        let full = page.len() >= PAGE_SIZE;
        self.has_more = full && !self.exhausted;
        if !full {
            self.exhausted = true;
        }
        self.total = total;
        self.items.extend(page);
    }
}

/// Balance half of the address view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BalanceState {
    pub address: Option<String>,
    pub balance: Option<f64>,
    pub token_balances: Option<Vec<TokenBalance>>,
    pub is_loading: bool,
}

/// The state exposed to the rendering layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressView {
    pub address: Option<String>,
    pub balance: Option<f64>,
    pub txn_history: Vec<ViewTxn>,
    pub total_txns: Option<u64>,
    pub token_balances: Option<Vec<TokenBalance>>,
    pub is_loading_balance: bool,
    pub is_loading_txns: bool,
    pub has_more_txns: bool,
}

impl AddressView {
    pub(crate) fn from_parts(feed: &FeedState, balance: &BalanceState) -> Self {
        Self {
            address: balance.address.clone(),
            balance: balance.balance,
            txn_history: feed.items.clone(),
            total_txns: feed.total,
            token_balances: balance.token_balances.clone(),
            is_loading_balance: balance.is_loading,
            is_loading_txns: feed.is_loading,
            has_more_txns: feed.has_more,
        }
    }
}
