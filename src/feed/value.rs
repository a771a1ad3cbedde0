use super::types::{RawTxn, TokenBalance, ViewTxn};

/// Net balance change of `address` in `txn`.
///
/// Inputs spending from the address subtract, outputs paying to it add.
/// Entries without an address never match, so an address on both sides of a
/// self-transfer nets out instead of counting twice.
pub fn net_value(txn: &RawTxn, address: &str) -> f64 {
    let spent = txn
        .vin
        .iter()
        .filter_map(|vin| vin.address.as_ref())
        .filter(|prev| prev.address == address)
        .fold(0.0, |acc, prev| acc - prev.value.value());

    txn.vout
        .iter()
        .filter(|vout| vout.address.as_deref() == Some(address))
        .fold(spent, |acc, vout| acc + vout.value.value())
}

impl ViewTxn {
    pub fn from_raw(txn: RawTxn, address: &str) -> Self {
        let value = net_value(&txn, address);
        Self {
            hash: txn.txid,
            block_hash: txn.blockhash.unwrap_or_default(),
            timestamp: txn.blocktime.unwrap_or_default(),
            value,
        }
    }
}

/// Balance of the token whose symbol equals `currency`, or 0 when the
/// address holds none.
pub fn balance_for(tokens: &[TokenBalance], currency: &str) -> f64 {
    tokens
        .iter()
        .find(|token| token.symbol == currency)
        .map(|token| token.balance.value())
        .unwrap_or(0.0)
}
