use crate::core::ids::{ExpenseId, GroupId, SettlementId};
use crate::core::money::Money;
use crate::core::participant::ParticipantId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What happened in a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityKind {
    GroupCreated { name: String },
    MemberJoined { user_id: ParticipantId },
    MemberRemoved { user_id: ParticipantId },
    ExpenseAdded { expense_id: ExpenseId, amount: Money },
    ExpenseDeleted {
        expense_id: ExpenseId,
        amount: Money,
        description: String,
    },
    SettlementAdded { settlement_id: SettlementId, amount: Money },
}

/// An append-only audit record written alongside every mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub group_id: GroupId,
    pub actor: ParticipantId,
    pub kind: ActivityKind,
    pub at: DateTime<Utc>,
}

impl ActivityEntry {
    pub fn now(group_id: GroupId, actor: ParticipantId, kind: ActivityKind) -> Self {
        Self {
            group_id,
            actor,
            kind,
            at: Utc::now(),
        }
    }
}
