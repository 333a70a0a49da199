//! Validation utilities

use bigdecimal::BigDecimal;

use crate::money::Money;
use crate::traits::*;
use crate::types::*;

/// Validate that an amount is positive
pub fn validate_positive_amount(amount: Money) -> SplitResult<()> {
    if amount.is_positive() {
        Ok(())
    } else {
        Err(SplitError::InvalidAmount(
            "Amount must be positive".to_string(),
        ))
    }
}

/// Validate an expense title
pub fn validate_expense_title(title: &str) -> SplitResult<()> {
    if title.trim().is_empty() {
        return Err(SplitError::Validation(
            "Expense title cannot be empty".to_string(),
        ));
    }

    if title.len() > 100 {
        return Err(SplitError::Validation(
            "Expense title cannot exceed 100 characters".to_string(),
        ));
    }

    Ok(())
}

/// Validate an optional expense description
pub fn validate_expense_description(description: Option<&str>) -> SplitResult<()> {
    match description {
        Some(text) if text.len() > 500 => Err(SplitError::Validation(
            "Expense description cannot exceed 500 characters".to_string(),
        )),
        _ => Ok(()),
    }
}

/// Validate that percentages are non-negative and add up to exactly 100
pub fn validate_percentages(percentages: &[(MemberId, BigDecimal)]) -> SplitResult<()> {
    let zero = BigDecimal::from(0);
    if let Some((member_id, _)) = percentages.iter().find(|(_, pct)| *pct < zero) {
        return Err(SplitError::Validation(format!(
            "Percentage for member {member_id} cannot be negative"
        )));
    }

    let total: BigDecimal = percentages.iter().map(|(_, pct)| pct).sum();
    if total != BigDecimal::from(100) {
        return Err(SplitError::Validation(format!(
            "Percentages must add up to 100, got {total}"
        )));
    }

    Ok(())
}

/// Stricter expense validator for user-facing input
///
/// On top of the default checks it requires a sensible title, a positive
/// amount and a payer who is also one of the participants.
pub struct StrictExpenseValidator;

impl ExpenseValidator for StrictExpenseValidator {
    fn validate_expense(&self, expense: &Expense, tolerance: Money) -> SplitResult<()> {
        DefaultExpenseValidator.validate_expense(expense, tolerance)?;

        validate_expense_title(&expense.title)?;
        validate_expense_description(expense.description.as_deref())?;
        validate_positive_amount(expense.amount)?;

        if expense.share_of(&expense.paid_by).is_none() {
            return Err(SplitError::Validation(
                "Payer must take part in the expense".to_string(),
            ));
        }

        Ok(())
    }

    fn validate_member_references(
        &self,
        expense: &Expense,
        roster: &[Member],
    ) -> SplitResult<()> {
        DefaultExpenseValidator.validate_member_references(expense, roster)
    }
}
