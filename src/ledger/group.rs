//! Group ledger orchestrator that coordinates members, expenses and
//! settlement records around the balance engine

use crate::engine::{BalanceEngine, GroupBalanceReport, SettlementTransfer, SplitRule};
use crate::ledger::{ExpenseManager, MemberManager, SettlementManager};
use crate::money::Money;
use crate::settings::EngineSettings;
use crate::traits::*;
use crate::types::*;

/// Main entry point for applications: storage-backed group operations
pub struct GroupLedger<S: GroupStorage> {
    member_manager: MemberManager<S>,
    expense_manager: ExpenseManager<S>,
    settlement_manager: SettlementManager<S>,
    engine: BalanceEngine,
}

impl<S: GroupStorage + Clone> GroupLedger<S> {
    /// Create a new ledger with the given storage backend and default settings
    pub fn new(storage: S) -> Self {
        Self::with_settings(storage, EngineSettings::default())
    }

    /// Create a new ledger with explicit engine settings
    pub fn with_settings(storage: S, settings: EngineSettings) -> Self {
        let tolerance = settings.tolerance;
        Self {
            member_manager: MemberManager::new(storage.clone()),
            expense_manager: ExpenseManager::new(storage.clone(), tolerance),
            settlement_manager: SettlementManager::new(storage),
            engine: BalanceEngine::new(settings),
        }
    }

    /// Create a new ledger with a custom expense validator
    pub fn with_validator(
        storage: S,
        settings: EngineSettings,
        expense_validator: Box<dyn ExpenseValidator>,
    ) -> Self {
        let tolerance = settings.tolerance;
        Self {
            member_manager: MemberManager::new(storage.clone()),
            expense_manager: ExpenseManager::with_validator(
                storage.clone(),
                tolerance,
                expense_validator,
            ),
            settlement_manager: SettlementManager::new(storage),
            engine: BalanceEngine::new(settings),
        }
    }

    pub fn engine(&self) -> &BalanceEngine {
        &self.engine
    }

    // Member operations
    /// Add a member to a group
    pub async fn add_member(&mut self, group_id: &GroupId, member: Member) -> SplitResult<Member> {
        self.member_manager.add_member(group_id, member).await
    }

    /// The group's roster
    pub async fn list_members(&self, group_id: &GroupId) -> SplitResult<Vec<Member>> {
        self.member_manager.list_members(group_id).await
    }

    /// Remove a member; refused while any of the group's expenses still
    /// names them as payer or share holder
    pub async fn remove_member(
        &mut self,
        group_id: &GroupId,
        member_id: &MemberId,
    ) -> SplitResult<()> {
        self.member_manager
            .get_member_required(group_id, member_id)
            .await?;

        let expenses = self.expense_manager.group_expenses(group_id).await?;
        let involved = expenses
            .iter()
            .filter(|e| &e.paid_by == member_id || e.share_of(member_id).is_some())
            .count();
        if involved > 0 {
            return Err(SplitError::Validation(format!(
                "Member {member_id} is still part of {involved} expense(s); delete those first"
            )));
        }

        self.member_manager.remove_member(group_id, member_id).await
    }

    /// Equal split over the group's whole roster
    pub async fn equal_split_for_group(&self, group_id: &GroupId) -> SplitResult<SplitRule> {
        let members = self.list_members(group_id).await?;
        if members.is_empty() {
            return Err(SplitError::EmptySplit);
        }
        Ok(SplitRule::Equal(members.iter().map(Member::id).collect()))
    }

    // Expense operations
    /// Validate and persist an expense
    pub async fn record_expense(&mut self, expense: Expense) -> SplitResult<Expense> {
        self.expense_manager.record_expense(expense).await
    }

    /// Get an expense by ID
    pub async fn get_expense(&self, expense_id: &ExpenseId) -> SplitResult<Option<Expense>> {
        self.expense_manager.get_expense(expense_id).await
    }

    /// All expenses of a group, newest first
    pub async fn group_expenses(&self, group_id: &GroupId) -> SplitResult<Vec<Expense>> {
        self.expense_manager.group_expenses(group_id).await
    }

    /// Delete an expense
    pub async fn delete_expense(&mut self, expense_id: &ExpenseId) -> SplitResult<()> {
        self.expense_manager.delete_expense(expense_id).await
    }

    // Balance operations
    /// Fetch the group snapshot and compute balances and suggested transfers
    pub async fn group_balances(&self, group_id: &GroupId) -> SplitResult<GroupBalanceReport> {
        let members = self.member_manager.list_members(group_id).await?;
        let expenses = self.expense_manager.group_expenses(group_id).await?;
        Ok(self.engine.summarize(&members, &expenses))
    }

    // Settlement operations
    /// Create a pending settlement record for a payment `requester` makes
    pub async fn create_settlement(
        &mut self,
        requester: &MemberId,
        group_id: GroupId,
        to: MemberId,
        amount: Money,
        description: String,
    ) -> SplitResult<SettlementRecord> {
        self.settlement_manager
            .create_settlement(requester, group_id, *requester, to, amount, description)
            .await
    }

    /// Record a suggested transfer as a pending settlement
    pub async fn settle_transfer(
        &mut self,
        requester: &MemberId,
        group_id: GroupId,
        transfer: &SettlementTransfer,
        description: String,
    ) -> SplitResult<SettlementRecord> {
        self.settlement_manager
            .settle_transfer(requester, group_id, transfer, description)
            .await
    }

    /// Confirm a settlement as received
    pub async fn complete_settlement(
        &mut self,
        requester: &MemberId,
        settlement_id: &SettlementId,
    ) -> SplitResult<SettlementRecord> {
        self.settlement_manager
            .complete_settlement(requester, settlement_id)
            .await
    }

    /// Settlements a member pays or receives
    pub async fn member_settlements(
        &self,
        member_id: &MemberId,
    ) -> SplitResult<Vec<SettlementRecord>> {
        self.settlement_manager.member_settlements(member_id).await
    }
}
