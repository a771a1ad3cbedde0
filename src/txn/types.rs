use serde::{Deserialize, Serialize};

use crate::models::Amount;

/// The only currency with a transaction detail view.
pub const STELLAR_CURRENCY: &str = "XLM";

/// A transaction as shown on the transaction page.
///
/// Accepts both the backend's snake_case field names and the camelCase
/// names used for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxnDetail {
    pub hash: String,
    #[serde(default, alias = "source_account")]
    pub account: Option<String>,
    #[serde(default, alias = "operation_count", alias = "op_count")]
    pub op_count: Option<u64>,
    /// Fee in stroops.
    #[serde(default, alias = "fee_paid")]
    pub fee_paid: Option<Amount>,
    /// RFC 3339 creation time.
    #[serde(default, alias = "created_at")]
    pub timestamp: Option<String>,
    /// Ledger sequence the transaction was included in.
    #[serde(default, alias = "ledger_attr")]
    pub ledger: Option<u64>,
}

/// Payload of `GET /tx/operations/{hash}`.
#[derive(Debug, Clone, Deserialize)]
pub struct OperationsPayload {
    #[serde(default)]
    pub result: Vec<serde_json::Value>,
}

/// The state exposed to the rendering layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TxnView {
    pub txn: Option<TxnDetail>,
    pub operations: Vec<serde_json::Value>,
    pub is_loading: bool,
}
