//! Balance engine: share allocation, net balances and settlement suggestions
//!
//! Everything here is a pure function of the snapshot passed in. Nothing is
//! cached and nothing is written; callers decide what to persist.

pub mod allocation;
pub mod balance;
pub mod settlement;

pub use allocation::*;
pub use balance::*;
pub use settlement::*;

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::settings::EngineSettings;
use crate::types::*;

/// Everything a group balance view needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupBalanceReport {
    /// One entry per roster member, in roster order
    pub balances: Vec<MemberBalance>,
    /// Suggested transfers that would zero every balance
    pub transfers: Vec<SettlementTransfer>,
    /// Sum of all expense amounts in the snapshot
    pub total_expenses: Money,
    /// Data inconsistencies found along the way
    pub warnings: Vec<LedgerWarning>,
}

impl GroupBalanceReport {
    pub fn is_consistent(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Display name of a member on the report's roster
    pub fn member_name(&self, member_id: &MemberId) -> Option<String> {
        self.balances
            .iter()
            .find(|b| &b.member_id() == member_id)
            .map(|b| b.member.display_name())
    }
}

/// Stateless facade over allocation, balance computation and matching
#[derive(Debug, Clone, Default)]
pub struct BalanceEngine {
    settings: EngineSettings,
}

impl BalanceEngine {
    pub fn new(settings: EngineSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn tolerance(&self) -> Money {
        self.settings.tolerance
    }

    /// Compute shares for an expense and check they add up to `total`
    pub fn allocate(&self, total: Money, rule: &SplitRule) -> SplitResult<Vec<ShareAllocation>> {
        let allocations = allocate_shares(total, rule)?;
        check_share_total(total, &allocations, self.tolerance())?;
        Ok(allocations)
    }

    /// Net balance per roster member, flagging a ledger that does not sum to zero
    pub fn compute_balances(&self, roster: &[Member], expenses: &[Expense]) -> BalanceSheet {
        tracing::debug!(
            members = roster.len(),
            expenses = expenses.len(),
            "computing group balances"
        );

        let mut sheet = compute_balances(roster, expenses);
        let residual = sheet.net_total();
        if !residual.is_within(self.tolerance()) {
            sheet.warnings.push(LedgerWarning::Imbalance { residual });
        }

        for warning in &sheet.warnings {
            tracing::warn!(%warning, "inconsistent group ledger");
        }
        sheet
    }

    /// Suggest transfers that settle the given balances
    pub fn suggest_transfers(&self, balances: &[MemberBalance]) -> SettlementPlan {
        let positions: Vec<(MemberId, Money)> = balances
            .iter()
            .map(|b| (b.member_id(), b.net_balance))
            .collect();

        let plan = match_settlements(&positions, self.tolerance());
        for warning in &plan.warnings {
            tracing::warn!(%warning, "settlement matching left a residual");
        }
        tracing::debug!(transfers = plan.transfers.len(), "settlement plan ready");
        plan
    }

    /// Balances, suggested transfers and total spend for one group snapshot
    pub fn summarize(&self, roster: &[Member], expenses: &[Expense]) -> GroupBalanceReport {
        let sheet = self.compute_balances(roster, expenses);
        let plan = self.suggest_transfers(&sheet.balances);

        let mut warnings = sheet.warnings;
        warnings.extend(plan.warnings);

        GroupBalanceReport {
            balances: sheet.balances,
            transfers: plan.transfers,
            total_expenses: expenses
                .iter()
                .filter(|e| balance::within_limits(e))
                .map(|e| e.amount)
                .sum(),
            warnings,
        }
    }
}
