//! Settlement suggestions: greedy debtor/creditor matching

use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::HashMap;

use crate::engine::balance::LedgerWarning;
use crate::money::Money;
use crate::types::MemberId;

/// A suggested payment between two members
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementTransfer {
    pub from: MemberId,
    pub to: MemberId,
    pub amount: Money,
}

/// Suggested transfers plus anything that could not be matched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementPlan {
    pub transfers: Vec<SettlementTransfer>,
    pub warnings: Vec<LedgerWarning>,
}

impl SettlementPlan {
    /// Balances after executing every transfer, in the order of `positions`
    pub fn apply_to(&self, positions: &[(MemberId, Money)]) -> Vec<(MemberId, Money)> {
        let mut delta: HashMap<MemberId, Money> = HashMap::new();
        for transfer in &self.transfers {
            *delta.entry(transfer.from).or_default() += transfer.amount;
            *delta.entry(transfer.to).or_default() -= transfer.amount;
        }

        positions
            .iter()
            .map(|(id, net)| (*id, *net + delta.get(id).copied().unwrap_or_default()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.transfers.is_empty()
    }
}

/// Match debtors against creditors to produce a small set of transfers.
///
/// Debtors are taken most-negative first and creditors largest first; ties
/// keep the order of `positions`. Each step moves the smaller of the two
/// outstanding amounts. Transfers of `tolerance` or less are not recorded.
///
/// This is a greedy approximation: it yields at most
/// `debtors + creditors - 1` transfers but not necessarily the fewest
/// possible. Members left with more than `tolerance` outstanding (which only
/// happens when the balances do not sum to zero) are reported as
/// [`LedgerWarning::UnsettledResidual`].
pub fn match_settlements(positions: &[(MemberId, Money)], tolerance: Money) -> SettlementPlan {
    // (member, outstanding amount as a positive value)
    let mut debtors: Vec<(MemberId, Money)> = positions
        .iter()
        .filter(|(_, net)| *net < -tolerance)
        .map(|(id, net)| (*id, -*net))
        .collect();
    let mut creditors: Vec<(MemberId, Money)> = positions
        .iter()
        .filter(|(_, net)| *net > tolerance)
        .copied()
        .collect();

    // stable sorts: equal amounts keep their input order
    debtors.sort_by_key(|(_, debt)| Reverse(*debt));
    creditors.sort_by_key(|(_, credit)| Reverse(*credit));

    let mut transfers = Vec::new();
    let (mut d, mut c) = (0, 0);
    while d < debtors.len() && c < creditors.len() {
        let amount = debtors[d].1.min(creditors[c].1);
        if amount > tolerance {
            transfers.push(SettlementTransfer {
                from: debtors[d].0,
                to: creditors[c].0,
                amount,
            });
        }

        debtors[d].1 -= amount;
        creditors[c].1 -= amount;

        if debtors[d].1.is_within(tolerance) {
            d += 1;
        }
        if creditors[c].1.is_within(tolerance) {
            c += 1;
        }
    }

    let mut warnings = Vec::new();
    for (member_id, debt) in &debtors[d..] {
        if !debt.is_within(tolerance) {
            warnings.push(LedgerWarning::UnsettledResidual {
                member_id: *member_id,
                amount: -*debt,
            });
        }
    }
    for (member_id, credit) in &creditors[c..] {
        if !credit.is_within(tolerance) {
            warnings.push(LedgerWarning::UnsettledResidual {
                member_id: *member_id,
                amount: *credit,
            });
        }
    }

    SettlementPlan {
        transfers,
        warnings,
    }
}
