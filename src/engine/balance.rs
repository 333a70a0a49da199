//! Net balance computation over a group's expense history

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::money::Money;
use crate::types::*;

/// Paid, owed and net amounts for one member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberBalance {
    pub member: Member,
    /// Sum of the expenses this member funded
    pub total_paid: Money,
    /// Sum of this member's shares
    pub total_owed: Money,
    /// `total_paid - total_owed`; positive means the member is owed money
    pub net_balance: Money,
}

impl MemberBalance {
    fn empty(member: Member) -> Self {
        Self {
            member,
            total_paid: Money::ZERO,
            total_owed: Money::ZERO,
            net_balance: Money::ZERO,
        }
    }

    pub fn member_id(&self) -> MemberId {
        self.member.id()
    }

    /// True when the member neither owes nor is owed more than `tolerance`
    pub fn is_settled(&self, tolerance: Money) -> bool {
        self.net_balance.is_within(tolerance)
    }
}

/// Data inconsistency detected while computing balances or settlements
///
/// These never abort a computation; the result is still returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LedgerWarning {
    /// An expense was paid by someone outside the roster
    UnknownPayer {
        expense_id: ExpenseId,
        member_id: MemberId,
        amount: Money,
    },
    /// A share was recorded against someone outside the roster
    UnknownShareMember {
        expense_id: ExpenseId,
        member_id: MemberId,
        amount: Money,
    },
    /// The roster listed the same member more than once
    DuplicateMember { member_id: MemberId },
    /// Net balances do not add up to zero
    Imbalance { residual: Money },
    /// A member was left with an outstanding amount after matching
    UnsettledResidual { member_id: MemberId, amount: Money },
    /// An expense or one of its shares exceeds [`Money::MAX`] and was skipped
    AmountOutOfRange { expense_id: ExpenseId, amount: Money },
}

impl fmt::Display for LedgerWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerWarning::UnknownPayer {
                expense_id,
                member_id,
                amount,
            } => write!(
                f,
                "expense {expense_id} of {amount} was paid by non-member {member_id}"
            ),
            LedgerWarning::UnknownShareMember {
                expense_id,
                member_id,
                amount,
            } => write!(
                f,
                "expense {expense_id} has a share of {amount} for non-member {member_id}"
            ),
            LedgerWarning::DuplicateMember { member_id } => {
                write!(f, "member {member_id} appears more than once in the roster")
            }
            LedgerWarning::Imbalance { residual } => {
                write!(f, "net balances do not sum to zero (residual {residual})")
            }
            LedgerWarning::UnsettledResidual { member_id, amount } => write!(
                f,
                "member {member_id} is left with {amount} after settlement matching"
            ),
            LedgerWarning::AmountOutOfRange { expense_id, amount } => write!(
                f,
                "expense {expense_id} was skipped, {amount} exceeds the maximum amount"
            ),
        }
    }
}

/// Per-member balances for a group snapshot, in roster order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSheet {
    pub balances: Vec<MemberBalance>,
    pub warnings: Vec<LedgerWarning>,
}

impl BalanceSheet {
    /// Sum of every member's net balance; zero for a consistent ledger
    pub fn net_total(&self) -> Money {
        self.balances.iter().map(|b| b.net_balance).sum()
    }

    /// Balance of a single member
    pub fn balance_of(&self, member_id: &MemberId) -> Option<&MemberBalance> {
        self.balances.iter().find(|b| &b.member_id() == member_id)
    }

    /// `(member, net)` pairs in roster order
    pub fn positions(&self) -> Vec<(MemberId, Money)> {
        self.balances
            .iter()
            .map(|b| (b.member_id(), b.net_balance))
            .collect()
    }
}

/// Reduce a group's expenses into one balance per roster member.
///
/// Members without any expense or share still get a zero balance. Amounts
/// that reference members missing from the roster are reported as warnings
/// instead of being dropped silently, as are expenses above [`Money::MAX`].
pub fn compute_balances(roster: &[Member], expenses: &[Expense]) -> BalanceSheet {
    let mut balances: Vec<MemberBalance> = Vec::with_capacity(roster.len());
    let mut index: HashMap<MemberId, usize> = HashMap::with_capacity(roster.len());
    let mut warnings = Vec::new();

    for member in roster {
        let id = member.id();
        if index.contains_key(&id) {
            warnings.push(LedgerWarning::DuplicateMember { member_id: id });
            continue;
        }
        index.insert(id, balances.len());
        balances.push(MemberBalance::empty(member.clone()));
    }

    for expense in expenses {
        if !within_limits(expense) {
            warnings.push(LedgerWarning::AmountOutOfRange {
                expense_id: expense.id,
                amount: expense.amount,
            });
            continue;
        }

        match index.get(&expense.paid_by) {
            Some(&i) => balances[i].total_paid += expense.amount,
            None => warnings.push(LedgerWarning::UnknownPayer {
                expense_id: expense.id,
                member_id: expense.paid_by,
                amount: expense.amount,
            }),
        }

        for share in &expense.shares {
            match index.get(&share.member_id) {
                Some(&i) => balances[i].total_owed += share.amount,
                None => warnings.push(LedgerWarning::UnknownShareMember {
                    expense_id: expense.id,
                    member_id: share.member_id,
                    amount: share.amount,
                }),
            }
        }
    }

    for balance in &mut balances {
        balance.net_balance = balance.total_paid - balance.total_owed;
    }

    BalanceSheet { balances, warnings }
}

/// True when the expense and every share fit under [`Money::MAX`]
pub(crate) fn within_limits(expense: &Expense) -> bool {
    expense.amount.ensure_in_range().is_ok()
        && expense
            .shares
            .iter()
            .all(|share| share.amount.ensure_in_range().is_ok())
}
