//! In-memory storage collaborator.
//!
//! Holds groups, members, expenses, splits and settlements, validates
//! writes the way the hosting service does, and exposes the read side to
//! the balance engine through [`LedgerSource`](crate::balance::LedgerSource).

pub mod activity;
pub mod memory;
pub mod snapshot;

use crate::balance::BalanceError;
use crate::core::ids::{ExpenseId, GroupId};
use crate::core::money::Money;
use crate::core::participant::ParticipantId;
use crate::split::AllocationError;
use thiserror::Error;

pub use activity::{ActivityEntry, ActivityKind};
pub use memory::{ExpenseReceipt, InMemoryLedger, MemberRole, NewExpense, NewSettlement};
pub use snapshot::{ExpenseSnapshot, LedgerSnapshot};

/// Currency recorded on expenses that do not name one.
pub const DEFAULT_CURRENCY: &str = "INR";

/// Limits applied to writes.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Currency used when an expense does not specify one.
    pub default_currency: String,
    /// Maximum length of an expense description.
    pub max_description_len: usize,
    /// Maximum length of a settlement note.
    pub max_note_len: usize,
    /// Allowed group name length (inclusive).
    pub group_name_len: (usize, usize),
    /// Allowed idempotency key length (inclusive).
    pub idempotency_key_len: (usize, usize),
    /// Expense page size when the caller asks for none.
    pub default_page_size: usize,
    /// Upper bound on expense page size.
    pub max_page_size: usize,
    /// Number of settlements returned by a listing.
    pub settlement_list_limit: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            default_currency: DEFAULT_CURRENCY.to_string(),
            max_description_len: 200,
            max_note_len: 200,
            group_name_len: (2, 60),
            idempotency_key_len: (8, 200),
            default_page_size: 20,
            max_page_size: 50,
            settlement_list_limit: 50,
        }
    }
}

/// Errors arising from store reads and writes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("group {0} not found")]
    GroupNotFound(GroupId),
    #[error("{user} is not a member of group {group}")]
    NotAMember { group: GroupId, user: ParticipantId },
    #[error("{0} is already a member of this group")]
    AlreadyMember(ParticipantId),
    #[error("only a group owner may {0}")]
    NotOwner(&'static str),
    #[error("expense {0} not found")]
    ExpenseNotFound(ExpenseId),
    #[error("idempotency key {0} was already used in another group")]
    IdempotencyConflict(String),
    #[error("{user} has an outstanding balance of {net}; settle up first")]
    OutstandingBalance { user: ParticipantId, net: Money },
    #[error("{0} has left the group; their expenses can no longer change")]
    DepartedMember(ParticipantId),
    #[error("group {0} would exceed the largest representable amount")]
    AmountOverflow(GroupId),
    #[error("invalid request: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Allocation(#[from] AllocationError),
    #[error(transparent)]
    Balance(#[from] BalanceError),
}
