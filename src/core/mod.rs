//! Foundational types: money, identifiers, ledger records and the net ledger.

pub mod ids;
pub mod ledger;
pub mod money;
pub mod participant;
pub mod record;
