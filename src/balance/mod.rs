//! Balance computation: reducing expenses, splits and settlements to net
//! positions, and suggesting payments that settle them.

pub mod engine;
pub mod source;
pub mod transfers;

pub use engine::{BalanceEngine, BalanceError, GroupBalances, NetBalance};
pub use source::LedgerSource;
pub use transfers::{apply_suggestions, minimize_transfers, TransferSuggestion};
