//! Split allocation: turning an expense amount and a split policy into
//! exact per-participant shares.

pub mod allocator;
pub mod policy;

pub use allocator::{allocate_shares, ensure_unique_participants};
pub use policy::{AllocationError, Share, SplitPolicy};
