use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use num_format::{Locale, ToFormattedString};

use crate::feed::AddressView;
use crate::txn::TxnView;

#[derive(Parser)]
#[command(name = "nrlxplore")]
#[command(about = "Multi-currency blockchain explorer CLI", long_about = None)]
pub struct Cli {
    #[arg(short, long, help = "Path to the configuration file", default_value = "data/config.toml")]
    pub config: PathBuf,
    #[arg(short = 'u', long, help = "Override the explorer API base URL")]
    pub api_url: Option<String>,
    #[arg(long, help = "Print views as JSON")]
    pub json: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the balance and transaction history of an address
    Address {
        address: String,
        #[arg(short, long, help = "Currency to view the address in (defaults to the configured one)")]
        currency: Option<String>,
        #[arg(short, long, help = "Number of transaction pages to load", default_value_t = 1)]
        pages: u32,
    },
    /// Show a transaction and its operations
    Txn {
        hash: String,
        #[arg(short, long, help = "Currency of the transaction (defaults to the configured one)")]
        currency: Option<String>,
    },
}

/// Formats unix seconds for display; 0 means unconfirmed.
pub fn format_block_time(timestamp: u64) -> String {
    if timestamp == 0 {
        return "unconfirmed".to_string();
    }
    i64::try_from(timestamp)
        .ok()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}

pub fn print_address_view(view: &AddressView, currency: &str) {
    println!("Address: {}", view.address.as_deref().unwrap_or("-"));
    match view.balance {
        Some(balance) => println!("Balance: {} {}", balance, currency),
        None => println!("Balance: unavailable"),
    }
    for token in view.token_balances.iter().flatten() {
        println!("  {:>8} {} ({})", token.symbol, token.balance, token.asset);
    }

    let total = view
        .total_txns
        .map(|t| t.to_formatted_string(&Locale::en))
        .unwrap_or_else(|| "unknown".to_string());
    println!();
    println!("Transactions: {} shown of {}", view.txn_history.len(), total);
    for txn in &view.txn_history {
        println!("  {:+} {}  {}  {}", txn.value, currency, format_block_time(txn.timestamp), txn.hash);
    }
    if view.has_more_txns {
        println!("  ... more available (use --pages)");
    }
}

pub fn print_txn_view(view: &TxnView, currency: &str) {
    let Some(txn) = &view.txn else {
        println!("No content...");
        return;
    };

    println!("Transaction: {}", txn.hash);
    println!("Account: {}", txn.account.as_deref().unwrap_or("-"));
    println!(
        "Operations: {}",
        txn.op_count.map(|c| c.to_string()).unwrap_or_else(|| "-".to_string())
    );
    if let Some(fee) = txn.fee_paid {
        println!("Fee: {} Stroops", fee);
    }
    if let Some(timestamp) = &txn.timestamp {
        let sent = DateTime::parse_from_rfc3339(timestamp)
            .map(|t| t.with_timezone(&Utc).format("%b %e, %Y %l:%M %p UTC").to_string())
            .unwrap_or_else(|_| timestamp.clone());
        println!("Sent on: {}", sent);
    }
    if let Some(ledger) = txn.ledger {
        println!("Ledger Sequence: {} ({})", ledger, currency.to_lowercase());
    }

    println!();
    for op in &view.operations {
        let kind = op.get("type").and_then(|v| v.as_str()).unwrap_or("operation");
        let time = op.get("time").and_then(|v| v.as_str()).unwrap_or("-");
        let id = op.get("id").map(|v| v.to_string()).unwrap_or_default();
        println!("  {:<24} {}  {}", kind, time, id);
    }
}
