//! Share allocation: turning an expense total and a split rule into
//! per-member amounts

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::*;

/// Per-member input for dividing an expense total
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "participants", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SplitRule {
    /// Divide evenly between the listed members
    Equal(Vec<MemberId>),
    /// Use the listed amounts as-is
    Exact(Vec<(MemberId, Money)>),
    /// Use the listed percentages of the total
    Percentage(Vec<(MemberId, BigDecimal)>),
}

impl SplitRule {
    /// The split type recorded on the resulting expense
    pub fn split_type(&self) -> SplitType {
        match self {
            SplitRule::Equal(_) => SplitType::Equal,
            SplitRule::Exact(_) => SplitType::Exact,
            SplitRule::Percentage(_) => SplitType::Percentage,
        }
    }

    /// Number of participating members
    pub fn participant_count(&self) -> usize {
        match self {
            SplitRule::Equal(members) => members.len(),
            SplitRule::Exact(shares) => shares.len(),
            SplitRule::Percentage(shares) => shares.len(),
        }
    }

    /// Participating members in input order
    pub fn participants(&self) -> Vec<MemberId> {
        match self {
            SplitRule::Equal(members) => members.clone(),
            SplitRule::Exact(shares) => shares.iter().map(|(id, _)| *id).collect(),
            SplitRule::Percentage(shares) => shares.iter().map(|(id, _)| *id).collect(),
        }
    }
}

/// Computed amount for one participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareAllocation {
    pub member_id: MemberId,
    pub amount: Money,
}

/// Compute every participant's share of `total`, in input order.
///
/// Equal splits give the `total % n` leftover cents one each to the first
/// participants. Percentage amounts are rounded half-up to the cent; when the
/// percentages add up to exactly 100 the rounding leftover is spread the same
/// way, so the shares always sum to the total.
pub fn allocate_shares(total: Money, rule: &SplitRule) -> SplitResult<Vec<ShareAllocation>> {
    if total.is_negative() {
        return Err(SplitError::InvalidAmount(format!(
            "expense amount cannot be negative: {total}"
        )));
    }
    total.ensure_in_range()?;

    match rule {
        SplitRule::Equal(members) => allocate_equal(total, members),
        SplitRule::Exact(shares) => allocate_exact(shares),
        SplitRule::Percentage(shares) => allocate_percentage(total, shares),
    }
}

/// Reject allocations whose sum differs from `total` by more than `tolerance`
pub fn check_share_total(
    total: Money,
    allocations: &[ShareAllocation],
    tolerance: Money,
) -> SplitResult<()> {
    let actual: Money = allocations.iter().map(|a| a.amount).sum();
    if (actual - total).is_within(tolerance) {
        Ok(())
    } else {
        Err(SplitError::ShareMismatch {
            expected: total,
            actual,
        })
    }
}

fn allocate_equal(total: Money, members: &[MemberId]) -> SplitResult<Vec<ShareAllocation>> {
    if members.is_empty() {
        return Err(SplitError::EmptySplit);
    }

    let count = members.len() as i64;
    let base = total.cents() / count;
    let leftover = total.cents() % count;

    Ok(members
        .iter()
        .enumerate()
        .map(|(index, member_id)| {
            let extra = if (index as i64) < leftover { 1 } else { 0 };
            ShareAllocation {
                member_id: *member_id,
                amount: Money::from_cents(base + extra),
            }
        })
        .collect())
}

fn allocate_exact(shares: &[(MemberId, Money)]) -> SplitResult<Vec<ShareAllocation>> {
    if shares.is_empty() {
        return Err(SplitError::EmptySplit);
    }

    shares
        .iter()
        .map(|(member_id, amount)| {
            if amount.is_negative() {
                return Err(SplitError::InvalidAmount(format!(
                    "share for member {member_id} cannot be negative"
                )));
            }
            amount.ensure_in_range()?;
            Ok(ShareAllocation {
                member_id: *member_id,
                amount: *amount,
            })
        })
        .collect()
}

fn allocate_percentage(
    total: Money,
    shares: &[(MemberId, BigDecimal)],
) -> SplitResult<Vec<ShareAllocation>> {
    if shares.is_empty() {
        return Err(SplitError::EmptySplit);
    }

    let zero = BigDecimal::from(0);
    let hundred = BigDecimal::from(100);
    let total_decimal = total.to_decimal();

    let mut allocations = Vec::with_capacity(shares.len());
    for (member_id, percentage) in shares {
        if *percentage < zero {
            return Err(SplitError::InvalidAmount(format!(
                "percentage for member {member_id} cannot be negative"
            )));
        }
        let amount = Money::from_decimal(&(&total_decimal * percentage / &hundred))?;
        allocations.push(ShareAllocation {
            member_id: *member_id,
            amount,
        });
    }

    let percentage_sum: BigDecimal = shares.iter().map(|(_, pct)| pct).sum();
    if percentage_sum == hundred {
        let allocated: Money = allocations.iter().map(|a| a.amount).sum();
        spread_leftover(&mut allocations, total - allocated);
    }

    Ok(allocations)
}

/// Hand out `leftover` one cent at a time in input order.
fn spread_leftover(allocations: &mut [ShareAllocation], leftover: Money) {
    let step = if leftover.is_negative() { -1 } else { 1 };
    let mut remaining = leftover.cents().abs();

    let count = allocations.len();
    if count == 0 {
        return;
    }
    let mut index = 0;
    while remaining > 0 {
        // never push a share below zero
        if step < 0 && allocations.iter().all(|a| a.amount.is_zero()) {
            break;
        }
        let allocation = &mut allocations[index % count];
        index += 1;
        if step < 0 && allocation.amount.is_zero() {
            continue;
        }
        allocation.amount += Money::from_cents(step);
        remaining -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn members(n: usize) -> Vec<MemberId> {
        (0..n).map(|_| MemberId::new()).collect()
    }

    fn total_of(allocations: &[ShareAllocation]) -> Money {
        allocations.iter().map(|a| a.amount).sum()
    }

    #[test]
    fn test_equal_split_three_ways() {
        let ids = members(3);
        let allocations =
            allocate_shares(Money::from_cents(3000), &SplitRule::Equal(ids.clone())).unwrap();

        assert_eq!(allocations.len(), 3);
        for (allocation, id) in allocations.iter().zip(&ids) {
            assert_eq!(allocation.member_id, *id);
            assert_eq!(allocation.amount, Money::from_cents(1000));
        }
    }

    #[test]
    fn test_equal_split_leftover_goes_to_first_members() {
        let ids = members(3);
        let allocations =
            allocate_shares(Money::from_cents(1000), &SplitRule::Equal(ids)).unwrap();
        let cents: Vec<i64> = allocations.iter().map(|a| a.amount.cents()).collect();

        assert_eq!(cents, vec![334, 333, 333]);
    }

    #[test]
    fn test_equal_split_sums_to_total_for_many_group_sizes() {
        let totals = [0, 1, 99, 1000, 3333, 123_457, 10_000_001];
        for n in 1..=1000 {
            let ids = members(n);
            for total in totals {
                let total = Money::from_cents(total);
                let allocations = allocate_shares(total, &SplitRule::Equal(ids.clone())).unwrap();
                assert_eq!(allocations.len(), n);
                assert!((total_of(&allocations) - total).is_within(Money::from_cents(1)));
                assert!(allocations.iter().all(|a| !a.amount.is_negative()));
            }
        }
    }

    #[test]
    fn test_equal_split_with_no_members_fails() {
        let err = allocate_shares(Money::from_cents(100), &SplitRule::Equal(vec![])).unwrap_err();
        assert!(matches!(err, SplitError::EmptySplit));
        assert!(err.is_validation());
    }

    #[test]
    fn test_percentage_split_sixty_forty() {
        let ids = members(2);
        let rule = SplitRule::Percentage(vec![
            (ids[0], BigDecimal::from(60)),
            (ids[1], BigDecimal::from(40)),
        ]);
        let allocations = allocate_shares(Money::from_cents(10_000), &rule).unwrap();

        assert_eq!(allocations[0].amount, Money::from_cents(6000));
        assert_eq!(allocations[1].amount, Money::from_cents(4000));
    }

    #[test]
    fn test_percentage_split_spreads_rounding_leftover() {
        let ids = members(3);
        let third = BigDecimal::from_str("33.3333333333333333").unwrap();
        let last = BigDecimal::from(100) - &third - &third;
        let rule = SplitRule::Percentage(vec![
            (ids[0], third.clone()),
            (ids[1], third),
            (ids[2], last),
        ]);
        let allocations = allocate_shares(Money::from_cents(10_000), &rule).unwrap();

        assert_eq!(total_of(&allocations), Money::from_cents(10_000));
        assert_eq!(allocations[0].amount, Money::from_cents(3334));
    }

    #[test]
    fn test_percentage_split_takes_back_overallocated_cents() {
        let ids = members(2);
        let rule = SplitRule::Percentage(vec![
            (ids[0], BigDecimal::from(50)),
            (ids[1], BigDecimal::from(50)),
        ]);

        // 1.5 cents each rounds up to 2, one cent too many
        let allocations = allocate_shares(Money::from_cents(3), &rule).unwrap();
        let cents: Vec<i64> = allocations.iter().map(|a| a.amount.cents()).collect();
        assert_eq!(cents, vec![1, 2]);

        let allocations = allocate_shares(Money::from_cents(1), &rule).unwrap();
        let cents: Vec<i64> = allocations.iter().map(|a| a.amount.cents()).collect();
        assert_eq!(cents, vec![0, 1]);
    }

    #[test]
    fn test_percentage_not_summing_to_hundred_is_left_alone() {
        let ids = members(2);
        let rule = SplitRule::Percentage(vec![
            (ids[0], BigDecimal::from(50)),
            (ids[1], BigDecimal::from(40)),
        ]);
        let total = Money::from_cents(10_000);
        let allocations = allocate_shares(total, &rule).unwrap();

        assert_eq!(total_of(&allocations), Money::from_cents(9000));
        assert!(check_share_total(total, &allocations, Money::from_cents(1)).is_err());
    }

    #[test]
    fn test_exact_split_tolerance() {
        let ids = members(2);
        let total = Money::from_cents(5000);
        let tolerance = Money::from_cents(1);

        let drift = SplitRule::Exact(vec![
            (ids[0], Money::from_cents(2500)),
            (ids[1], Money::from_cents(2499)),
        ]);
        let allocations = allocate_shares(total, &drift).unwrap();
        assert!(check_share_total(total, &allocations, tolerance).is_ok());

        let off_by_a_dollar = SplitRule::Exact(vec![
            (ids[0], Money::from_cents(2500)),
            (ids[1], Money::from_cents(2400)),
        ]);
        let allocations = allocate_shares(total, &off_by_a_dollar).unwrap();
        let err = check_share_total(total, &allocations, tolerance).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_negative_inputs_are_rejected() {
        let ids = members(1);
        assert!(allocate_shares(Money::from_cents(-1), &SplitRule::Equal(ids.clone())).is_err());
        assert!(allocate_shares(
            Money::from_cents(100),
            &SplitRule::Exact(vec![(ids[0], Money::from_cents(-100))])
        )
        .is_err());
        assert!(allocate_shares(
            Money::from_cents(100),
            &SplitRule::Percentage(vec![(ids[0], BigDecimal::from(-100))])
        )
        .is_err());
    }
}
