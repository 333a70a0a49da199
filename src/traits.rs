//! Traits for storage abstraction and extensibility

use async_trait::async_trait;

use crate::money::Money;
use crate::types::*;

/// Storage abstraction for groups, expenses and settlement records
///
/// Implement this for whatever backend holds the data (SQL database,
/// document store, in-memory map). The balance engine itself never touches
/// storage; only the ledger layer does.
#[async_trait]
pub trait GroupStorage: Send + Sync {
    /// Add a member to a group's roster (or replace the stored entry)
    async fn save_member(&mut self, group_id: &GroupId, member: &Member) -> SplitResult<()>;

    /// The group's roster in the order members were added
    async fn list_members(&self, group_id: &GroupId) -> SplitResult<Vec<Member>>;

    /// Remove a member from a group's roster
    async fn remove_member(&mut self, group_id: &GroupId, member_id: &MemberId)
        -> SplitResult<()>;

    /// Save an expense together with its shares
    async fn save_expense(&mut self, expense: &Expense) -> SplitResult<()>;

    /// Get an expense by ID
    async fn get_expense(&self, expense_id: &ExpenseId) -> SplitResult<Option<Expense>>;

    /// All expenses of a group, newest date first
    async fn list_expenses(&self, group_id: &GroupId) -> SplitResult<Vec<Expense>>;

    /// Delete an expense and its shares
    async fn delete_expense(&mut self, expense_id: &ExpenseId) -> SplitResult<()>;

    /// Save a new settlement record
    async fn save_settlement(&mut self, settlement: &SettlementRecord) -> SplitResult<()>;

    /// Get a settlement record by ID
    async fn get_settlement(
        &self,
        settlement_id: &SettlementId,
    ) -> SplitResult<Option<SettlementRecord>>;

    /// Replace an existing settlement record
    async fn update_settlement(&mut self, settlement: &SettlementRecord) -> SplitResult<()>;

    /// Settlements where the member pays or receives, newest first
    async fn list_member_settlements(
        &self,
        member_id: &MemberId,
    ) -> SplitResult<Vec<SettlementRecord>>;
}

/// Trait for implementing custom expense validation rules
pub trait ExpenseValidator: Send + Sync {
    /// Validate an expense before saving
    fn validate_expense(&self, expense: &Expense, tolerance: Money) -> SplitResult<()>;

    /// Validate that the payer and every share belong to the group roster
    fn validate_member_references(&self, expense: &Expense, roster: &[Member])
        -> SplitResult<()>;
}

/// Default expense validator: share totals and roster membership
pub struct DefaultExpenseValidator;

impl ExpenseValidator for DefaultExpenseValidator {
    fn validate_expense(&self, expense: &Expense, tolerance: Money) -> SplitResult<()> {
        expense.validate(tolerance)
    }

    fn validate_member_references(
        &self,
        expense: &Expense,
        roster: &[Member],
    ) -> SplitResult<()> {
        let is_member = |id: &MemberId| roster.iter().any(|m| &m.id() == id);

        if !is_member(&expense.paid_by) {
            return Err(SplitError::Validation(format!(
                "Payer {} is not a member of this group",
                expense.paid_by
            )));
        }

        for share in &expense.shares {
            if !is_member(&share.member_id) {
                return Err(SplitError::Validation(format!(
                    "Share member {} is not a member of this group",
                    share.member_id
                )));
            }
        }

        Ok(())
    }
}
