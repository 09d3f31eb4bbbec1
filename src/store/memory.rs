use crate::balance::{BalanceEngine, GroupBalances, LedgerSource};
use crate::core::ids::{ExpenseId, GroupId, SettlementId};
use crate::core::money::Money;
use crate::core::participant::{Member, ParticipantId};
use crate::core::record::{ExpenseRecord, ExpenseSplitRecord, SettlementRecord};
use crate::split::{allocate_shares, ensure_unique_participants, SplitPolicy};
use crate::store::activity::{ActivityEntry, ActivityKind};
use crate::store::{StoreConfig, StoreError};
use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A member's role within a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberRole {
    Owner,
    Member,
}

/// Request to record a new expense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewExpense {
    pub description: String,
    pub amount: Money,
    pub paid_by: ParticipantId,
    pub policy: SplitPolicy,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub idempotency_key: Option<String>,
}

impl NewExpense {
    pub fn new(
        description: impl Into<String>,
        amount: Money,
        paid_by: ParticipantId,
        policy: SplitPolicy,
    ) -> Self {
        Self {
            description: description.into(),
            amount,
            paid_by,
            policy,
            currency: None,
            idempotency_key: None,
        }
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    pub fn with_idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }
}

/// Outcome of recording an expense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseReceipt {
    pub id: ExpenseId,
    /// True when the idempotency key matched an earlier request and no
    /// new expense was written.
    pub idempotent: bool,
}

/// Request to record a payment between two members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSettlement {
    pub from: ParticipantId,
    pub to: ParticipantId,
    pub amount: Money,
    #[serde(default)]
    pub note: Option<String>,
}

impl NewSettlement {
    pub fn new(from: ParticipantId, to: ParticipantId, amount: Money) -> Self {
        Self {
            from,
            to,
            amount,
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// An expense together with its splits, as returned by listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseView {
    pub expense: ExpenseRecord,
    pub splits: Vec<ExpenseSplitRecord>,
}

/// One page of a group's expenses, newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpensePage {
    pub expenses: Vec<ExpenseView>,
    pub next_cursor: Option<ExpenseId>,
}

#[derive(Debug, Clone)]
struct GroupState {
    name: String,
    created_at: DateTime<Utc>,
    members: Vec<(Member, MemberRole)>,
    departed: Vec<Member>,
}

impl GroupState {
    fn role_of(&self, user: &ParticipantId) -> Option<MemberRole> {
        self.members
            .iter()
            .find(|(m, _)| &m.user_id == user)
            .map(|(_, r)| *r)
    }

    fn is_member(&self, user: &ParticipantId) -> bool {
        self.role_of(user).is_some()
    }
}

/// In-memory storage for any number of groups.
///
/// Writes validate their whole request before touching state, so a
/// failed write leaves the store unchanged.
///
/// # Examples
///
/// ```
/// use group_ledger::core::money::Money;
/// use group_ledger::core::participant::{Member, ParticipantId};
/// use group_ledger::split::SplitPolicy;
/// use group_ledger::store::{InMemoryLedger, NewExpense};
///
/// let mut store = InMemoryLedger::new();
/// let asha = ParticipantId::new("asha");
/// let ravi = ParticipantId::new("ravi");
/// let group = store.create_group("Flat 4B", Member::new("asha")).unwrap();
/// store.add_member(&group, Member::new("ravi")).unwrap();
///
/// store
///     .record_expense(
///         &asha,
///         &group,
///         NewExpense::new(
///             "Groceries",
///             Money::new(1_000),
///             asha.clone(),
///             SplitPolicy::Equal(vec![asha.clone(), ravi.clone()]),
///         ),
///     )
///     .unwrap();
///
/// let balances = store.group_balances(&asha, &group).unwrap();
/// assert_eq!(balances.net_of(&ravi), Money::new(-500));
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    config: StoreConfig,
    groups: HashMap<GroupId, GroupState>,
    expenses: Vec<ExpenseRecord>,
    splits: Vec<ExpenseSplitRecord>,
    settlements: Vec<SettlementRecord>,
    activity: Vec<ActivityEntry>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    // --- Groups and members ---

    /// Create a group with `creator` as its owner.
    pub fn create_group(&mut self, name: &str, creator: Member) -> Result<GroupId, StoreError> {
        let name = name.trim();
        let (min, max) = self.config.group_name_len;
        let len = name.chars().count();
        if len < min || len > max {
            return Err(StoreError::InvalidInput(format!(
                "group name must be {}-{} characters",
                min, max
            )));
        }

        let id = GroupId::generate();
        let actor = creator.user_id.clone();
        self.groups.insert(
            id.clone(),
            GroupState {
                name: name.to_string(),
                created_at: Utc::now(),
                members: vec![(creator, MemberRole::Owner)],
                departed: Vec::new(),
            },
        );
        self.log(
            &id,
            actor,
            ActivityKind::GroupCreated {
                name: name.to_string(),
            },
        );
        info!("created group {} ({})", id, name);
        Ok(id)
    }

    /// Add a member to a group. The member joins with the plain member role.
    pub fn add_member(&mut self, group: &GroupId, member: Member) -> Result<(), StoreError> {
        let state = self
            .groups
            .get_mut(group)
            .ok_or_else(|| StoreError::GroupNotFound(group.clone()))?;
        if state.is_member(&member.user_id) {
            return Err(StoreError::AlreadyMember(member.user_id));
        }

        let user_id = member.user_id.clone();
        state.departed.retain(|m| m.user_id != user_id);
        state.members.push((member, MemberRole::Member));
        self.log(
            group,
            user_id.clone(),
            ActivityKind::MemberJoined { user_id },
        );
        Ok(())
    }

    /// Remove `user` from the group.
    ///
    /// Only an owner may remove members, nobody may remove themselves, the
    /// last owner cannot be removed, and the member must be fully settled.
    pub fn remove_member(
        &mut self,
        actor: &ParticipantId,
        group: &GroupId,
        user: &ParticipantId,
    ) -> Result<(), StoreError> {
        if actor == user {
            return Err(StoreError::InvalidInput("you cannot remove yourself".into()));
        }
        let state = self.require_member(group, actor)?;
        if state.role_of(actor) != Some(MemberRole::Owner) {
            return Err(StoreError::NotOwner("remove members"));
        }
        let target_role = state.role_of(user).ok_or_else(|| StoreError::NotAMember {
            group: group.clone(),
            user: user.clone(),
        })?;
        if target_role == MemberRole::Owner {
            let other_owners = state
                .members
                .iter()
                .filter(|(m, r)| *r == MemberRole::Owner && &m.user_id != user)
                .count();
            if other_owners == 0 {
                return Err(StoreError::InvalidInput("cannot remove the last owner".into()));
            }
        }

        let net = BalanceEngine::compute_group_balances(&*self, group)?.net_of(user);
        if !net.is_zero() {
            return Err(StoreError::OutstandingBalance {
                user: user.clone(),
                net,
            });
        }

        if let Some(state) = self.groups.get_mut(group) {
            if let Some(pos) = state.members.iter().position(|(m, _)| &m.user_id == user) {
                let (member, _) = state.members.remove(pos);
                state.departed.push(member);
            }
        }
        self.log(
            group,
            actor.clone(),
            ActivityKind::MemberRemoved {
                user_id: user.clone(),
            },
        );
        Ok(())
    }

    /// Groups `user` belongs to, as `(id, name)` pairs, newest first.
    pub fn groups_for(&self, user: &ParticipantId) -> Vec<(GroupId, String)> {
        let mut groups: Vec<(&GroupId, &GroupState)> = self
            .groups
            .iter()
            .filter(|(_, s)| s.is_member(user))
            .collect();
        groups.sort_by(|a, b| b.1.created_at.cmp(&a.1.created_at).then_with(|| a.0.cmp(b.0)));
        groups
            .into_iter()
            .map(|(id, s)| (id.clone(), s.name.clone()))
            .collect()
    }

    pub fn group_name(&self, group: &GroupId) -> Option<&str> {
        self.groups.get(group).map(|s| s.name.as_str())
    }

    pub fn role_of(&self, group: &GroupId, user: &ParticipantId) -> Option<MemberRole> {
        self.groups.get(group).and_then(|s| s.role_of(user))
    }

    /// Members who were removed from the group and have not rejoined, in
    /// the order they left.
    pub fn departed_members(&self, group: &GroupId) -> Option<Vec<Member>> {
        self.groups.get(group).map(|s| s.departed.clone())
    }

    // --- Expenses ---

    /// Validate, allocate and persist a new expense with its splits.
    pub fn record_expense(
        &mut self,
        actor: &ParticipantId,
        group: &GroupId,
        request: NewExpense,
    ) -> Result<ExpenseReceipt, StoreError> {
        let state = self.require_member(group, actor)?;

        let description = request.description.trim();
        let len = description.chars().count();
        if len == 0 || len > self.config.max_description_len {
            return Err(StoreError::InvalidInput(format!(
                "description must be 1-{} characters",
                self.config.max_description_len
            )));
        }
        if !state.is_member(&request.paid_by) {
            return Err(StoreError::NotAMember {
                group: group.clone(),
                user: request.paid_by.clone(),
            });
        }

        let participants = request.policy.participants();
        if participants.is_empty() {
            return Err(StoreError::InvalidInput("at least one participant is required".into()));
        }
        ensure_unique_participants(participants.iter().copied())?;
        if let Some(outsider) = participants.iter().find(|p| !state.is_member(p)) {
            return Err(StoreError::NotAMember {
                group: group.clone(),
                user: (*outsider).clone(),
            });
        }

        if let Some(key) = request.idempotency_key.as_deref() {
            let (min, max) = self.config.idempotency_key_len;
            let len = key.chars().count();
            if len < min || len > max {
                return Err(StoreError::InvalidInput(format!(
                    "idempotency key must be {}-{} characters",
                    min, max
                )));
            }
            if let Some(existing) = self
                .expenses
                .iter()
                .find(|e| e.idempotency_key() == Some(key))
            {
                if existing.group_id() != group {
                    return Err(StoreError::IdempotencyConflict(key.to_string()));
                }
                debug!("idempotent replay of expense {}", existing.id());
                return Ok(ExpenseReceipt {
                    id: existing.id(),
                    idempotent: true,
                });
            }
        }

        // The expense credits its payer and debits its splits.
        self.ensure_volume(group, request.amount.minor_units() as i128 * 2)?;
        let shares = allocate_shares(request.amount, &request.policy)?;

        let currency = request
            .currency
            .clone()
            .unwrap_or_else(|| self.config.default_currency.clone());
        let mut expense = ExpenseRecord::new(
            group.clone(),
            description,
            request.amount,
            request.paid_by.clone(),
            request.policy.kind(),
        )
        .with_currency(currency);
        if let Some(key) = request.idempotency_key {
            expense = expense.with_idempotency_key(key);
        }

        let id = expense.id();
        self.splits.extend(
            shares
                .into_iter()
                .map(|s| ExpenseSplitRecord::new(id, s.user_id, s.share)),
        );
        self.expenses.push(expense);
        self.log(
            group,
            actor.clone(),
            ActivityKind::ExpenseAdded {
                expense_id: id,
                amount: request.amount,
            },
        );
        debug!("recorded expense {} of {} in group {}", id, request.amount, group);

        Ok(ExpenseReceipt {
            id,
            idempotent: false,
        })
    }

    /// Soft-delete an expense and all of its splits together.
    pub fn delete_expense(
        &mut self,
        actor: &ParticipantId,
        group: &GroupId,
        expense_id: ExpenseId,
    ) -> Result<(), StoreError> {
        let state = self.require_member(group, actor)?;

        let expense = self
            .expenses
            .iter()
            .find(|e| e.id() == expense_id && e.group_id() == group && !e.is_deleted())
            .ok_or(StoreError::ExpenseNotFound(expense_id))?;

        // A departed member's balance was zero when they left and must stay so.
        let touched = std::iter::once(expense.paid_by()).chain(
            self.splits
                .iter()
                .filter(|s| s.expense_id == expense_id)
                .map(|s| &s.user_id),
        );
        for user in touched {
            if !state.is_member(user) {
                return Err(StoreError::DepartedMember(user.clone()));
            }
        }

        let expense = self
            .expenses
            .iter_mut()
            .find(|e| e.id() == expense_id)
            .ok_or(StoreError::ExpenseNotFound(expense_id))?;

        expense.mark_deleted(actor.clone(), Utc::now());
        let kind = ActivityKind::ExpenseDeleted {
            expense_id,
            amount: expense.amount(),
            description: expense.description().to_string(),
        };
        for split in self.splits.iter_mut().filter(|s| s.expense_id == expense_id) {
            split.is_deleted = true;
        }
        self.log(group, actor.clone(), kind);
        debug!("deleted expense {} in group {}", expense_id, group);
        Ok(())
    }

    /// Live expenses of a group, newest first, `limit` at a time.
    ///
    /// `cursor` is the id of the last expense of the previous page.
    pub fn list_expenses(
        &self,
        actor: &ParticipantId,
        group: &GroupId,
        limit: Option<usize>,
        cursor: Option<ExpenseId>,
    ) -> Result<ExpensePage, StoreError> {
        self.require_member(group, actor)?;
        let limit = limit
            .filter(|l| *l > 0)
            .unwrap_or(self.config.default_page_size)
            .min(self.config.max_page_size);

        let mut live: Vec<&ExpenseRecord> = self
            .expenses
            .iter()
            .rev()
            .filter(|e| e.group_id() == group && !e.is_deleted())
            .collect();
        live.sort_by(|a, b| b.created_at().cmp(&a.created_at()));

        let start = match cursor {
            Some(c) => live
                .iter()
                .position(|e| e.id() == c)
                .map(|i| i + 1)
                .ok_or(StoreError::ExpenseNotFound(c))?,
            None => 0,
        };

        let expenses: Vec<ExpenseView> = live
            .into_iter()
            .skip(start)
            .take(limit)
            .map(|e| ExpenseView {
                expense: e.clone(),
                splits: self.splits_of(e.id()),
            })
            .collect();
        let next_cursor = if expenses.len() == limit {
            expenses.last().map(|v| v.expense.id())
        } else {
            None
        };

        Ok(ExpensePage {
            expenses,
            next_cursor,
        })
    }

    // --- Settlements ---

    /// Record that one member has paid another.
    pub fn record_settlement(
        &mut self,
        actor: &ParticipantId,
        group: &GroupId,
        request: NewSettlement,
    ) -> Result<SettlementId, StoreError> {
        let state = self.require_member(group, actor)?;
        if !request.amount.is_positive() {
            return Err(StoreError::InvalidInput(format!(
                "settlement amount must be positive, got {}",
                request.amount
            )));
        }
        if request.from == request.to {
            return Err(StoreError::InvalidInput("payer and payee must differ".into()));
        }
        for user in [&request.from, &request.to] {
            if !state.is_member(user) {
                return Err(StoreError::NotAMember {
                    group: group.clone(),
                    user: user.clone(),
                });
            }
        }
        if let Some(note) = request.note.as_deref() {
            if note.chars().count() > self.config.max_note_len {
                return Err(StoreError::InvalidInput(format!(
                    "note must be at most {} characters",
                    self.config.max_note_len
                )));
            }
        }

        self.ensure_volume(group, request.amount.minor_units() as i128)?;

        let mut settlement =
            SettlementRecord::new(group.clone(), request.from, request.to, request.amount);
        if let Some(note) = request.note {
            settlement = settlement.with_note(note);
        }
        let id = settlement.id();
        self.log(
            group,
            actor.clone(),
            ActivityKind::SettlementAdded {
                settlement_id: id,
                amount: settlement.amount(),
            },
        );
        debug!(
            "recorded settlement {} -> {} of {} in group {}",
            settlement.from(),
            settlement.to(),
            settlement.amount(),
            group
        );
        self.settlements.push(settlement);
        Ok(id)
    }

    /// Most recent settlements of a group, newest first.
    pub fn list_settlements(
        &self,
        actor: &ParticipantId,
        group: &GroupId,
    ) -> Result<Vec<SettlementRecord>, StoreError> {
        self.require_member(group, actor)?;
        let mut settlements: Vec<&SettlementRecord> = self
            .settlements
            .iter()
            .rev()
            .filter(|s| s.group_id() == group)
            .collect();
        settlements.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(settlements
            .into_iter()
            .take(self.config.settlement_list_limit)
            .cloned()
            .collect())
    }

    // --- Reads ---

    /// Current balances of a group, as seen by one of its members.
    pub fn group_balances(
        &self,
        actor: &ParticipantId,
        group: &GroupId,
    ) -> Result<GroupBalances, StoreError> {
        self.require_member(group, actor)?;
        Ok(BalanceEngine::compute_group_balances(self, group)?)
    }

    /// Audit trail of a group in the order it happened.
    pub fn activity(&self, group: &GroupId) -> Vec<&ActivityEntry> {
        self.activity
            .iter()
            .filter(|a| &a.group_id == group)
            .collect()
    }

    /// All expenses of a group including deleted ones, in insertion order.
    pub fn all_expenses(&self, group: &GroupId) -> Vec<&ExpenseRecord> {
        self.expenses
            .iter()
            .filter(|e| e.group_id() == group)
            .collect()
    }

    /// Every split of an expense, deleted or not.
    pub fn splits_of(&self, expense: ExpenseId) -> Vec<ExpenseSplitRecord> {
        self.splits
            .iter()
            .filter(|s| s.expense_id == expense)
            .cloned()
            .collect()
    }

    fn require_member(
        &self,
        group: &GroupId,
        user: &ParticipantId,
    ) -> Result<&GroupState, StoreError> {
        let state = self
            .groups
            .get(group)
            .ok_or_else(|| StoreError::GroupNotFound(group.clone()))?;
        if !state.is_member(user) {
            return Err(StoreError::NotAMember {
                group: group.clone(),
                user: user.clone(),
            });
        }
        Ok(state)
    }

    /// Reject a write that would push the group's gross ledger volume past
    /// what [`Money`] can hold. Balance computation relies on this bound.
    fn ensure_volume(&self, group: &GroupId, added: i128) -> Result<(), StoreError> {
        let expenses: i128 = self
            .expenses
            .iter()
            .filter(|e| e.group_id() == group && !e.is_deleted())
            .map(|e| e.amount().minor_units() as i128 * 2)
            .sum();
        let settlements: i128 = self
            .settlements
            .iter()
            .filter(|s| s.group_id() == group)
            .map(|s| s.amount().minor_units() as i128)
            .sum();
        if expenses + settlements + added > i64::MAX as i128 {
            return Err(StoreError::AmountOverflow(group.clone()));
        }
        Ok(())
    }

    fn log(&mut self, group: &GroupId, actor: ParticipantId, kind: ActivityKind) {
        self.activity
            .push(ActivityEntry::now(group.clone(), actor, kind));
    }
}

impl LedgerSource for InMemoryLedger {
    fn members(&self, group: &GroupId) -> Option<Vec<Member>> {
        self.groups
            .get(group)
            .map(|s| s.members.iter().map(|(m, _)| m.clone()).collect())
    }

    fn active_expenses(&self, group: &GroupId) -> Vec<ExpenseRecord> {
        self.expenses
            .iter()
            .filter(|e| e.group_id() == group && !e.is_deleted())
            .cloned()
            .collect()
    }

    fn active_splits(&self, expenses: &[ExpenseId]) -> Vec<ExpenseSplitRecord> {
        self.splits
            .iter()
            .filter(|s| !s.is_deleted && expenses.contains(&s.expense_id))
            .cloned()
            .collect()
    }

    fn settlements(&self, group: &GroupId) -> Vec<SettlementRecord> {
        self.settlements
            .iter()
            .filter(|s| s.group_id() == group)
            .cloned()
            .collect()
    }
}
