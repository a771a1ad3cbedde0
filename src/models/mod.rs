//! Shared value types for explorer payloads.
//!
//! - [`Amount`] - A coin amount that may arrive as a JSON number or string

pub mod amount;
pub use amount::Amount;
