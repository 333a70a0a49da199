//! Core types and data structures for group expense splitting

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::money::Money;

/// Generates a UUID-backed identifier newtype
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Create a new random identifier
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Get the underlying UUID
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Parse an identifier from its string form
            pub fn parse(s: &str) -> Result<Self, uuid::Error> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }
    };
}

define_id!(
    /// Identifier of a group
    GroupId
);
define_id!(
    /// Identifier of a group member (registered user or guest)
    MemberId
);
define_id!(
    /// Identifier of an expense
    ExpenseId
);
define_id!(
    /// Identifier of a persisted settlement record
    SettlementId
);

/// A participant in a group
///
/// Registered users and guests (invitees without a full account) are
/// handled identically by allocation and balance computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Member {
    /// A member with a full account
    Registered {
        id: MemberId,
        name: String,
        email: Option<String>,
    },
    /// A member that joined without an account
    Guest {
        id: MemberId,
        name: String,
        email: Option<String>,
    },
}

impl Member {
    /// Create a registered member with a fresh id
    pub fn registered(name: impl Into<String>, email: Option<String>) -> Self {
        Member::Registered {
            id: MemberId::new(),
            name: name.into(),
            email,
        }
    }

    /// Create a guest member with a fresh id
    pub fn guest(name: impl Into<String>) -> Self {
        Member::Guest {
            id: MemberId::new(),
            name: name.into(),
            email: None,
        }
    }

    pub fn id(&self) -> MemberId {
        match self {
            Member::Registered { id, .. } | Member::Guest { id, .. } => *id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Member::Registered { name, .. } | Member::Guest { name, .. } => name,
        }
    }

    pub fn email(&self) -> Option<&str> {
        match self {
            Member::Registered { email, .. } | Member::Guest { email, .. } => email.as_deref(),
        }
    }

    pub fn is_guest(&self) -> bool {
        matches!(self, Member::Guest { .. })
    }

    /// Name for display, falling back to the email and then the id
    pub fn display_name(&self) -> String {
        if !self.name().trim().is_empty() {
            return self.name().to_string();
        }
        match self.email() {
            Some(email) if !email.trim().is_empty() => email.to_string(),
            _ => self.id().to_string(),
        }
    }
}

/// How an expense total is divided between participants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SplitType {
    /// Total divided evenly between participants
    Equal,
    /// Each participant's amount given explicitly
    Exact,
    /// Each participant's amount given as a percentage of the total
    Percentage,
}

impl fmt::Display for SplitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SplitType::Equal => "EQUAL",
            SplitType::Exact => "EXACT",
            SplitType::Percentage => "PERCENTAGE",
        };
        f.write_str(label)
    }
}

/// One member's portion of an expense
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Share {
    /// Expense this share belongs to
    pub expense_id: ExpenseId,
    /// Member who owes this share
    pub member_id: MemberId,
    /// Amount owed
    pub amount: Money,
    /// True only for the payer's own share
    pub is_paid: bool,
}

/// A single shared cost paid by one member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,
    pub group_id: GroupId,
    /// Member who funded the expense
    pub paid_by: MemberId,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    /// Total amount, never negative
    pub amount: Money,
    pub split_type: SplitType,
    /// Date the expense occurred
    pub date: NaiveDate,
    pub shares: Vec<Share>,
    pub created_at: NaiveDateTime,
}

impl Expense {
    /// Sum of all share amounts
    pub fn shares_total(&self) -> Money {
        self.shares.iter().map(|s| s.amount).sum()
    }

    /// Share owed by a given member, if any
    pub fn share_of(&self, member_id: &MemberId) -> Option<&Share> {
        self.shares.iter().find(|s| &s.member_id == member_id)
    }

    /// Check the creation-time invariants of the expense
    pub fn validate(&self, tolerance: Money) -> SplitResult<()> {
        self.amount.ensure_in_range()?;
        if self.amount.is_negative() {
            return Err(SplitError::InvalidAmount(format!(
                "expense amount cannot be negative: {}",
                self.amount
            )));
        }

        if self.shares.is_empty() {
            return Err(SplitError::Validation(
                "Expense must have at least one share".to_string(),
            ));
        }

        let mut seen = std::collections::HashSet::new();
        for share in &self.shares {
            share.amount.ensure_in_range()?;
            if share.amount.is_negative() {
                return Err(SplitError::InvalidAmount(format!(
                    "share for member {} cannot be negative",
                    share.member_id
                )));
            }
            if !seen.insert(share.member_id) {
                return Err(SplitError::Validation(format!(
                    "Member {} has more than one share in the expense",
                    share.member_id
                )));
            }
        }

        let actual = self.shares_total();
        if !(actual - self.amount).is_within(tolerance) {
            return Err(SplitError::ShareMismatch {
                expected: self.amount,
                actual,
            });
        }

        Ok(())
    }
}

/// Lifecycle state of a settlement record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SettlementStatus {
    Pending,
    Completed,
}

/// A user-initiated promise to pay another member
///
/// Records move from `Pending` to `Completed` once the receiving member
/// confirms the payment. The balance engine never creates these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementRecord {
    pub id: SettlementId,
    pub group_id: GroupId,
    /// Member paying
    pub from: MemberId,
    /// Member receiving
    pub to: MemberId,
    pub amount: Money,
    pub description: String,
    pub status: SettlementStatus,
    pub created_at: NaiveDateTime,
    pub settled_at: Option<NaiveDateTime>,
}

impl SettlementRecord {
    /// Create a pending settlement record
    pub fn new(
        group_id: GroupId,
        from: MemberId,
        to: MemberId,
        amount: Money,
        description: String,
    ) -> SplitResult<Self> {
        if !amount.is_positive() {
            return Err(SplitError::InvalidAmount(
                "Settlement amount must be positive".to_string(),
            ));
        }
        amount.ensure_in_range()?;
        if from == to {
            return Err(SplitError::Validation(
                "A member cannot settle with themselves".to_string(),
            ));
        }

        Ok(Self {
            id: SettlementId::new(),
            group_id,
            from,
            to,
            amount,
            description,
            status: SettlementStatus::Pending,
            created_at: chrono::Utc::now().naive_utc(),
            settled_at: None,
        })
    }

    pub fn is_pending(&self) -> bool {
        self.status == SettlementStatus::Pending
    }

    /// Mark the settlement as completed on behalf of `acting_member`
    ///
    /// Only the receiving member may confirm a payment.
    pub fn complete(&mut self, acting_member: &MemberId) -> SplitResult<()> {
        if &self.to != acting_member {
            return Err(SplitError::PermissionDenied(
                "Only the receiving member can mark a settlement as completed".to_string(),
            ));
        }
        if !self.is_pending() {
            return Err(SplitError::InvalidSettlementState(format!(
                "Settlement {} is already completed",
                self.id
            )));
        }

        self.status = SettlementStatus::Completed;
        self.settled_at = Some(chrono::Utc::now().naive_utc());
        Ok(())
    }
}

/// Errors that can occur while splitting expenses or managing settlements
#[derive(Debug, thiserror::Error)]
pub enum SplitError {
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Cannot split an expense between zero members")]
    EmptySplit,
    #[error("Shares must sum up to the total amount: expected {expected}, got {actual}")]
    ShareMismatch { expected: Money, actual: Money },
    #[error("Member not found: {0}")]
    MemberNotFound(MemberId),
    #[error("Expense not found: {0}")]
    ExpenseNotFound(ExpenseId),
    #[error("Settlement not found: {0}")]
    SettlementNotFound(SettlementId),
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    #[error("Invalid settlement state: {0}")]
    InvalidSettlementState(String),
    #[error(transparent)]
    Config(#[from] config::ConfigError),
}

impl SplitError {
    /// True for errors that reject bad input before anything is written
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            SplitError::Validation(_)
                | SplitError::InvalidAmount(_)
                | SplitError::EmptySplit
                | SplitError::ShareMismatch { .. }
        )
    }
}

/// Result type for splitting operations
pub type SplitResult<T> = Result<T, SplitError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_expense(amount: i64, shares: &[(MemberId, i64)]) -> Expense {
        let id = ExpenseId::new();
        Expense {
            id,
            group_id: GroupId::new(),
            paid_by: shares[0].0,
            title: "Dinner".to_string(),
            description: None,
            category: None,
            amount: Money::from_cents(amount),
            split_type: SplitType::Exact,
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            shares: shares
                .iter()
                .map(|(member_id, cents)| Share {
                    expense_id: id,
                    member_id: *member_id,
                    amount: Money::from_cents(*cents),
                    is_paid: false,
                })
                .collect(),
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    #[test]
    fn test_member_variants() {
        let alice = Member::registered("Alice", Some("alice@example.com".to_string()));
        let guest = Member::guest("");

        assert!(!alice.is_guest());
        assert_eq!(alice.email(), Some("alice@example.com"));
        assert!(guest.is_guest());
        assert_eq!(guest.display_name(), guest.id().to_string());
    }

    #[test]
    fn test_expense_validation_tolerance() {
        let (a, b) = (MemberId::new(), MemberId::new());
        let one_cent = Money::from_cents(1);

        let drift = sample_expense(5000, &[(a, 2500), (b, 2499)]);
        assert!(drift.validate(one_cent).is_ok());

        let mismatch = sample_expense(5000, &[(a, 2500), (b, 2400)]);
        let err = mismatch.validate(one_cent).unwrap_err();
        assert!(err.is_validation());
        assert!(matches!(err, SplitError::ShareMismatch { .. }));
    }

    #[test]
    fn test_expense_rejects_amounts_above_maximum() {
        let (a, b) = (MemberId::new(), MemberId::new());
        let half = 2_305_843_009_213_693_952;
        let huge = sample_expense(2 * half, &[(a, half), (b, half)]);
        assert!(matches!(
            huge.validate(Money::from_cents(1)),
            Err(SplitError::InvalidAmount(_))
        ));

        let max = Money::MAX.cents();
        assert!(sample_expense(max, &[(a, max)])
            .validate(Money::from_cents(1))
            .is_ok());
    }

    #[test]
    fn test_expense_rejects_duplicate_and_missing_shares() {
        let a = MemberId::new();
        let dup = sample_expense(200, &[(a, 100), (a, 100)]);
        assert!(matches!(
            dup.validate(Money::from_cents(1)),
            Err(SplitError::Validation(_))
        ));

        let mut empty = sample_expense(200, &[(a, 200)]);
        empty.shares.clear();
        assert!(empty.validate(Money::from_cents(1)).is_err());
    }

    #[test]
    fn test_settlement_lifecycle() {
        let (from, to) = (MemberId::new(), MemberId::new());
        let mut record = SettlementRecord::new(
            GroupId::new(),
            from,
            to,
            Money::from_cents(1000),
            "Dinner".to_string(),
        )
        .unwrap();

        assert!(record.is_pending());
        assert!(matches!(
            record.complete(&from),
            Err(SplitError::PermissionDenied(_))
        ));

        record.complete(&to).unwrap();
        assert_eq!(record.status, SettlementStatus::Completed);
        assert!(record.settled_at.is_some());
        assert!(matches!(
            record.complete(&to),
            Err(SplitError::InvalidSettlementState(_))
        ));
    }

    #[test]
    fn test_settlement_rejects_bad_input() {
        let member = MemberId::new();
        assert!(SettlementRecord::new(
            GroupId::new(),
            member,
            member,
            Money::from_cents(100),
            String::new()
        )
        .is_err());
        assert!(SettlementRecord::new(
            GroupId::new(),
            member,
            MemberId::new(),
            Money::ZERO,
            String::new()
        )
        .is_err());
    }
}
