//! Expense recording and construction

use bigdecimal::BigDecimal;
use chrono::NaiveDate;

use crate::engine::{allocate_shares, check_share_total, SplitRule};
use crate::money::Money;
use crate::settings::EngineSettings;
use crate::traits::*;
use crate::types::*;

/// Expense manager for recording and looking up expenses
pub struct ExpenseManager<S: GroupStorage> {
    pub(crate) storage: S,
    validator: Box<dyn ExpenseValidator>,
    tolerance: Money,
}

impl<S: GroupStorage> ExpenseManager<S> {
    /// Create a new expense manager
    pub fn new(storage: S, tolerance: Money) -> Self {
        Self {
            storage,
            validator: Box::new(DefaultExpenseValidator),
            tolerance,
        }
    }

    /// Create a new expense manager with custom validator
    pub fn with_validator(
        storage: S,
        tolerance: Money,
        validator: Box<dyn ExpenseValidator>,
    ) -> Self {
        Self {
            storage,
            validator,
            tolerance,
        }
    }

    /// Record a new expense
    ///
    /// Nothing is written unless the expense passes validation and every
    /// referenced member is on the group roster.
    pub async fn record_expense(&mut self, expense: Expense) -> SplitResult<Expense> {
        self.validator.validate_expense(&expense, self.tolerance)?;

        let roster = self.storage.list_members(&expense.group_id).await?;
        self.validator
            .validate_member_references(&expense, &roster)?;

        self.storage.save_expense(&expense).await?;
        tracing::info!(
            expense_id = %expense.id,
            group_id = %expense.group_id,
            amount = %expense.amount,
            split = %expense.split_type,
            "expense recorded"
        );

        Ok(expense)
    }

    /// Get an expense by ID
    pub async fn get_expense(&self, expense_id: &ExpenseId) -> SplitResult<Option<Expense>> {
        self.storage.get_expense(expense_id).await
    }

    /// Get an expense by ID, returning an error if not found
    pub async fn get_expense_required(&self, expense_id: &ExpenseId) -> SplitResult<Expense> {
        self.storage
            .get_expense(expense_id)
            .await?
            .ok_or(SplitError::ExpenseNotFound(*expense_id))
    }

    /// All expenses of a group, newest first
    pub async fn group_expenses(&self, group_id: &GroupId) -> SplitResult<Vec<Expense>> {
        self.storage.list_expenses(group_id).await
    }

    /// Delete an expense
    pub async fn delete_expense(&mut self, expense_id: &ExpenseId) -> SplitResult<()> {
        let expense = self.get_expense_required(expense_id).await?;
        self.storage.delete_expense(&expense.id).await?;
        tracing::info!(expense_id = %expense.id, "expense deleted");
        Ok(())
    }
}

/// Builder for expenses and their shares
#[derive(Debug)]
pub struct ExpenseBuilder {
    group_id: GroupId,
    paid_by: MemberId,
    title: String,
    amount: Money,
    date: NaiveDate,
    description: Option<String>,
    category: Option<String>,
    rule: Option<SplitRule>,
}

impl ExpenseBuilder {
    /// Start building an expense paid by `paid_by`
    pub fn new(
        group_id: GroupId,
        paid_by: MemberId,
        title: String,
        amount: Money,
        date: NaiveDate,
    ) -> Self {
        Self {
            group_id,
            paid_by,
            title,
            amount,
            date,
            description: None,
            category: None,
            rule: None,
        }
    }

    pub fn description(mut self, description: String) -> Self {
        self.description = Some(description);
        self
    }

    pub fn category(mut self, category: String) -> Self {
        self.category = Some(category);
        self
    }

    /// Set how the amount is divided
    pub fn split(mut self, rule: SplitRule) -> Self {
        self.rule = Some(rule);
        self
    }

    /// Build with the default one-cent tolerance
    pub fn build(self) -> SplitResult<Expense> {
        let tolerance = EngineSettings::default().tolerance;
        self.build_with_tolerance(tolerance)
    }

    /// Allocate shares and build the expense.
    ///
    /// The payer's own share, if any, is marked as paid.
    pub fn build_with_tolerance(self, tolerance: Money) -> SplitResult<Expense> {
        let rule = self.rule.ok_or_else(|| {
            SplitError::Validation("Expense needs a split rule".to_string())
        })?;

        let allocations = allocate_shares(self.amount, &rule)?;
        check_share_total(self.amount, &allocations, tolerance)?;

        let id = ExpenseId::new();
        let shares = allocations
            .into_iter()
            .map(|allocation| Share {
                expense_id: id,
                member_id: allocation.member_id,
                amount: allocation.amount,
                is_paid: allocation.member_id == self.paid_by,
            })
            .collect();

        let expense = Expense {
            id,
            group_id: self.group_id,
            paid_by: self.paid_by,
            title: self.title,
            description: self.description,
            category: self.category,
            amount: self.amount,
            split_type: rule.split_type(),
            date: self.date,
            shares,
            created_at: chrono::Utc::now().naive_utc(),
        };
        expense.validate(tolerance)?;
        Ok(expense)
    }
}

/// Common expense shapes
pub mod patterns {
    use super::*;
    use crate::utils::validation::validate_percentages;

    /// Expense divided evenly between `participants`
    pub fn equal_expense(
        group_id: GroupId,
        paid_by: MemberId,
        title: String,
        amount: Money,
        date: NaiveDate,
        participants: Vec<MemberId>,
    ) -> SplitResult<Expense> {
        ExpenseBuilder::new(group_id, paid_by, title, amount, date)
            .split(SplitRule::Equal(participants))
            .build()
    }

    /// Expense with an explicit amount per member
    pub fn exact_expense(
        group_id: GroupId,
        paid_by: MemberId,
        title: String,
        amount: Money,
        date: NaiveDate,
        shares: Vec<(MemberId, Money)>,
    ) -> SplitResult<Expense> {
        ExpenseBuilder::new(group_id, paid_by, title, amount, date)
            .split(SplitRule::Exact(shares))
            .build()
    }

    /// Expense divided by percentage per member
    ///
    /// The percentages must be non-negative and add up to exactly 100.
    pub fn percentage_expense(
        group_id: GroupId,
        paid_by: MemberId,
        title: String,
        amount: Money,
        date: NaiveDate,
        percentages: Vec<(MemberId, BigDecimal)>,
    ) -> SplitResult<Expense> {
        validate_percentages(&percentages)?;
        ExpenseBuilder::new(group_id, paid_by, title, amount, date)
            .split(SplitRule::Percentage(percentages))
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::memory_storage::MemoryStorage;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, 14).unwrap()
    }

    #[test]
    fn test_percentage_pattern_requires_exact_hundred() {
        let (a, b) = (MemberId::new(), MemberId::new());
        let amount = Money::from_cents(10_000);

        let nearly = vec![
            (a, BigDecimal::from(50)),
            (b, "49.99".parse::<BigDecimal>().unwrap()),
        ];
        let result =
            patterns::percentage_expense(GroupId::new(), a, "Hotel".to_string(), amount, date(), nearly);
        assert!(matches!(result, Err(SplitError::Validation(_))));

        let negative = vec![(a, BigDecimal::from(110)), (b, BigDecimal::from(-10))];
        let result = patterns::percentage_expense(
            GroupId::new(),
            a,
            "Hotel".to_string(),
            amount,
            date(),
            negative,
        );
        assert!(matches!(result, Err(SplitError::Validation(_))));

        let even = vec![(a, BigDecimal::from(50)), (b, BigDecimal::from(50))];
        let expense =
            patterns::percentage_expense(GroupId::new(), a, "Hotel".to_string(), amount, date(), even)
                .unwrap();
        assert_eq!(expense.shares_total(), amount);
    }

    #[test]
    fn test_builder_marks_payer_share_paid() {
        let (payer, other) = (MemberId::new(), MemberId::new());
        let expense = ExpenseBuilder::new(
            GroupId::new(),
            payer,
            "Cabin".to_string(),
            Money::from_cents(20_000),
            date(),
        )
        .category("Lodging".to_string())
        .split(SplitRule::Equal(vec![payer, other]))
        .build()
        .unwrap();

        assert_eq!(expense.split_type, SplitType::Equal);
        assert!(expense.share_of(&payer).unwrap().is_paid);
        assert!(!expense.share_of(&other).unwrap().is_paid);
        assert!(expense.shares.iter().all(|s| s.expense_id == expense.id));
    }

    #[test]
    fn test_builder_requires_split_rule() {
        let result = ExpenseBuilder::new(
            GroupId::new(),
            MemberId::new(),
            "Nothing".to_string(),
            Money::from_cents(100),
            date(),
        )
        .build();
        assert!(matches!(result, Err(SplitError::Validation(_))));
    }

    #[test]
    fn test_exact_pattern_tolerance() {
        let (a, b) = (MemberId::new(), MemberId::new());
        let total = Money::from_cents(5000);

        let accepted = patterns::exact_expense(
            GroupId::new(),
            a,
            "Tickets".to_string(),
            total,
            date(),
            vec![(a, Money::from_cents(2500)), (b, Money::from_cents(2499))],
        );
        assert!(accepted.is_ok());

        let rejected = patterns::exact_expense(
            GroupId::new(),
            a,
            "Tickets".to_string(),
            total,
            date(),
            vec![(a, Money::from_cents(2500)), (b, Money::from_cents(2400))],
        );
        assert!(rejected.unwrap_err().is_validation());
    }

    #[tokio::test]
    async fn test_record_rejects_non_members() {
        let mut storage = MemoryStorage::new();
        let group = GroupId::new();
        let alice = Member::registered("Alice", None);
        storage.save_member(&group, &alice).await.unwrap();

        let mut manager = ExpenseManager::new(storage.clone(), Money::from_cents(1));
        let stranger = MemberId::new();
        let expense = patterns::equal_expense(
            group,
            alice.id(),
            "Fuel".to_string(),
            Money::from_cents(6000),
            date(),
            vec![alice.id(), stranger],
        )
        .unwrap();

        let err = manager.record_expense(expense).await.unwrap_err();
        assert!(err.is_validation());
        assert!(manager.group_expenses(&group).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_record_and_delete() {
        let mut storage = MemoryStorage::new();
        let group = GroupId::new();
        let alice = Member::registered("Alice", None);
        storage.save_member(&group, &alice).await.unwrap();

        let mut manager = ExpenseManager::new(storage, Money::from_cents(1));
        let expense = patterns::equal_expense(
            group,
            alice.id(),
            "Snacks".to_string(),
            Money::from_cents(800),
            date(),
            vec![alice.id()],
        )
        .unwrap();
        let recorded = manager.record_expense(expense).await.unwrap();

        assert_eq!(manager.group_expenses(&group).await.unwrap().len(), 1);
        manager.delete_expense(&recorded.id).await.unwrap();
        assert!(manager.get_expense(&recorded.id).await.unwrap().is_none());
        assert!(matches!(
            manager.delete_expense(&recorded.id).await,
            Err(SplitError::ExpenseNotFound(_))
        ));
    }
}
