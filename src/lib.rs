//! # group-ledger
//!
//! Shared-expense tracking for groups: exact split allocation and greedy
//! debt settlement.
//!
//! All money is integer minor units (paise, cents), so every split adds up
//! to the expense amount exactly and every group's balances sum to zero.
//!
//! ## Architecture
//!
//! - **core** — Foundational types: money, identifiers, ledger records, net ledger
//! - **split** — Equal, exact and percent split allocation
//! - **balance** — Net balance computation and transfer suggestions
//! - **store** — In-memory storage collaborator with validated writes
//! - **simulation** — Random group generation

pub mod balance;
pub mod core;
pub mod simulation;
pub mod split;
pub mod store;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::balance::{
        minimize_transfers, BalanceEngine, GroupBalances, LedgerSource, NetBalance,
        TransferSuggestion,
    };
    pub use crate::core::ids::{ExpenseId, GroupId, SettlementId};
    pub use crate::core::ledger::NetLedger;
    pub use crate::core::money::Money;
    pub use crate::core::participant::{Member, ParticipantId};
    pub use crate::split::{allocate_shares, Share, SplitPolicy};
    pub use crate::store::{InMemoryLedger, LedgerSnapshot, NewExpense, NewSettlement};
}
