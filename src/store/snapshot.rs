use crate::core::ids::GroupId;
use crate::core::money::Money;
use crate::core::participant::{Member, ParticipantId};
use crate::split::SplitPolicy;
use crate::store::memory::{InMemoryLedger, NewExpense, NewSettlement};
use crate::store::StoreError;
use serde::{Deserialize, Serialize};

/// A portable description of one group's history.
///
/// Loading a snapshot replays it through the store's normal write path,
/// so every expense is re-validated and re-allocated. The first member
/// becomes the group owner. Members listed under `departed` take part in
/// the replay and are removed once it is complete.
///
/// ```json
/// {
///   "name": "Goa trip",
///   "members": [{ "user_id": "asha", "name": "Asha" }, { "user_id": "ravi" }],
///   "expenses": [
///     {
///       "description": "Dinner",
///       "amount": 1500,
///       "paid_by": "asha",
///       "split": { "type": "EQUAL", "participants": ["asha", "ravi"] }
///     }
///   ],
///   "settlements": [{ "from": "ravi", "to": "asha", "amount": 200 }]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub name: String,
    pub members: Vec<Member>,
    #[serde(default)]
    pub expenses: Vec<ExpenseSnapshot>,
    #[serde(default)]
    pub settlements: Vec<SettlementSnapshot>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub departed: Vec<ParticipantId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseSnapshot {
    pub description: String,
    pub amount: Money,
    pub paid_by: ParticipantId,
    pub split: SplitPolicy,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub deleted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementSnapshot {
    pub from: ParticipantId,
    pub to: ParticipantId,
    pub amount: Money,
    #[serde(default)]
    pub note: Option<String>,
}

impl LedgerSnapshot {
    /// Replay this snapshot into `store` as a new group.
    ///
    /// Expenses are recorded by their payer, settlements by their sender,
    /// and deleted expenses are deleted by their payer right after being
    /// recorded.
    pub fn load_into(&self, store: &mut InMemoryLedger) -> Result<GroupId, StoreError> {
        let (owner, rest) = self
            .members
            .split_first()
            .ok_or_else(|| StoreError::InvalidInput("snapshot has no members".into()))?;

        let group = store.create_group(&self.name, owner.clone())?;
        for member in rest {
            store.add_member(&group, member.clone())?;
        }

        for e in &self.expenses {
            let mut request =
                NewExpense::new(e.description.clone(), e.amount, e.paid_by.clone(), e.split.clone());
            if let Some(currency) = &e.currency {
                request = request.with_currency(currency.clone());
            }
            let receipt = store.record_expense(&e.paid_by, &group, request)?;
            if e.deleted {
                store.delete_expense(&e.paid_by, &group, receipt.id)?;
            }
        }

        for s in &self.settlements {
            let mut request = NewSettlement::new(s.from.clone(), s.to.clone(), s.amount);
            if let Some(note) = &s.note {
                request = request.with_note(note.clone());
            }
            store.record_settlement(&s.from, &group, request)?;
        }

        for user in &self.departed {
            store.remove_member(&owner.user_id, &group, user)?;
        }

        Ok(group)
    }

    /// Export a group's full history. Expense splits are written as exact
    /// shares so a reload reproduces the same balances. Departed members
    /// are listed after the current ones.
    pub fn export(store: &InMemoryLedger, group: &GroupId) -> Result<Self, StoreError> {
        use crate::balance::LedgerSource;

        let name = store
            .group_name(group)
            .ok_or_else(|| StoreError::GroupNotFound(group.clone()))?
            .to_string();
        let mut members = store
            .members(group)
            .ok_or_else(|| StoreError::GroupNotFound(group.clone()))?;
        let departed_members = store
            .departed_members(group)
            .ok_or_else(|| StoreError::GroupNotFound(group.clone()))?;
        let departed = departed_members.iter().map(|m| m.user_id.clone()).collect();
        members.extend(departed_members);

        let expenses = store
            .all_expenses(group)
            .into_iter()
            .map(|e| ExpenseSnapshot {
                description: e.description().to_string(),
                amount: e.amount(),
                paid_by: e.paid_by().clone(),
                split: SplitPolicy::Exact(
                    store
                        .splits_of(e.id())
                        .into_iter()
                        .map(|s| (s.user_id, s.share))
                        .collect(),
                ),
                currency: Some(e.currency().to_string()),
                deleted: e.is_deleted(),
            })
            .collect();

        let settlements = store
            .settlements(group)
            .into_iter()
            .map(|s| SettlementSnapshot {
                from: s.from().clone(),
                to: s.to().clone(),
                amount: s.amount(),
                note: s.note().map(str::to_string),
            })
            .collect();

        Ok(Self {
            name,
            members,
            expenses,
            settlements,
            departed,
        })
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
