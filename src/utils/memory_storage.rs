//! In-memory storage implementation for testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::traits::*;
use crate::types::*;

/// In-memory storage implementation for testing and development
///
/// Clones share the same underlying maps.
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    members: Arc<RwLock<HashMap<GroupId, Vec<Member>>>>,
    expenses: Arc<RwLock<HashMap<ExpenseId, Expense>>>,
    settlements: Arc<RwLock<HashMap<SettlementId, SettlementRecord>>>,
}

fn read<T>(lock: &RwLock<T>) -> SplitResult<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|_| SplitError::Storage("storage lock poisoned".to_string()))
}

fn write<T>(lock: &RwLock<T>) -> SplitResult<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|_| SplitError::Storage("storage lock poisoned".to_string()))
}

impl MemoryStorage {
    /// Create a new memory storage instance
    pub fn new() -> Self {
        Self {
            members: Arc::new(RwLock::new(HashMap::new())),
            expenses: Arc::new(RwLock::new(HashMap::new())),
            settlements: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) -> SplitResult<()> {
        write(&self.members)?.clear();
        write(&self.expenses)?.clear();
        write(&self.settlements)?.clear();
        Ok(())
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GroupStorage for MemoryStorage {
    async fn save_member(&mut self, group_id: &GroupId, member: &Member) -> SplitResult<()> {
        let mut members = write(&self.members)?;
        let roster = members.entry(*group_id).or_default();
        match roster.iter_mut().find(|m| m.id() == member.id()) {
            Some(existing) => *existing = member.clone(),
            None => roster.push(member.clone()),
        }
        Ok(())
    }

    async fn list_members(&self, group_id: &GroupId) -> SplitResult<Vec<Member>> {
        Ok(read(&self.members)?
            .get(group_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn remove_member(
        &mut self,
        group_id: &GroupId,
        member_id: &MemberId,
    ) -> SplitResult<()> {
        let mut members = write(&self.members)?;
        let roster = members
            .get_mut(group_id)
            .ok_or(SplitError::MemberNotFound(*member_id))?;
        let before = roster.len();
        roster.retain(|m| &m.id() != member_id);
        if roster.len() == before {
            return Err(SplitError::MemberNotFound(*member_id));
        }
        Ok(())
    }

    async fn save_expense(&mut self, expense: &Expense) -> SplitResult<()> {
        write(&self.expenses)?.insert(expense.id, expense.clone());
        Ok(())
    }

    async fn get_expense(&self, expense_id: &ExpenseId) -> SplitResult<Option<Expense>> {
        Ok(read(&self.expenses)?.get(expense_id).cloned())
    }

    async fn list_expenses(&self, group_id: &GroupId) -> SplitResult<Vec<Expense>> {
        let mut expenses: Vec<Expense> = read(&self.expenses)?
            .values()
            .filter(|expense| &expense.group_id == group_id)
            .cloned()
            .collect();
        expenses.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(expenses)
    }

    async fn delete_expense(&mut self, expense_id: &ExpenseId) -> SplitResult<()> {
        if write(&self.expenses)?.remove(expense_id).is_some() {
            Ok(())
        } else {
            Err(SplitError::ExpenseNotFound(*expense_id))
        }
    }

    async fn save_settlement(&mut self, settlement: &SettlementRecord) -> SplitResult<()> {
        write(&self.settlements)?.insert(settlement.id, settlement.clone());
        Ok(())
    }

    async fn get_settlement(
        &self,
        settlement_id: &SettlementId,
    ) -> SplitResult<Option<SettlementRecord>> {
        Ok(read(&self.settlements)?.get(settlement_id).cloned())
    }

    async fn update_settlement(&mut self, settlement: &SettlementRecord) -> SplitResult<()> {
        let mut settlements = write(&self.settlements)?;
        match settlements.get_mut(&settlement.id) {
            Some(existing) => {
                *existing = settlement.clone();
                Ok(())
            }
            None => Err(SplitError::SettlementNotFound(settlement.id)),
        }
    }

    async fn list_member_settlements(
        &self,
        member_id: &MemberId,
    ) -> SplitResult<Vec<SettlementRecord>> {
        let mut settlements: Vec<SettlementRecord> = read(&self.settlements)?
            .values()
            .filter(|s| &s.from == member_id || &s.to == member_id)
            .cloned()
            .collect();
        settlements.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(settlements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::patterns;
    use crate::money::Money;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_roster_keeps_insertion_order() {
        let mut storage = MemoryStorage::new();
        let group = GroupId::new();
        let names = ["Alice", "Bob", "Carol", "Dave"];
        for name in names {
            storage
                .save_member(&group, &Member::registered(name, None))
                .await
                .unwrap();
        }

        let roster = storage.list_members(&group).await.unwrap();
        let listed: Vec<&str> = roster.iter().map(Member::name).collect();
        assert_eq!(listed, names);
        assert!(storage
            .list_members(&GroupId::new())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_expenses_newest_first_and_scoped_to_group() {
        let mut storage = MemoryStorage::new();
        let group = GroupId::new();
        let payer = MemberId::new();

        for day in [3, 1, 2] {
            let expense = patterns::equal_expense(
                group,
                payer,
                format!("Day {day}"),
                Money::from_cents(100),
                NaiveDate::from_ymd_opt(2024, 8, day).unwrap(),
                vec![payer],
            )
            .unwrap();
            storage.save_expense(&expense).await.unwrap();
        }
        let elsewhere = patterns::equal_expense(
            GroupId::new(),
            payer,
            "Elsewhere".to_string(),
            Money::from_cents(100),
            NaiveDate::from_ymd_opt(2024, 8, 9).unwrap(),
            vec![payer],
        )
        .unwrap();
        storage.save_expense(&elsewhere).await.unwrap();

        let titles: Vec<String> = storage
            .list_expenses(&group)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.title)
            .collect();
        assert_eq!(titles, vec!["Day 3", "Day 2", "Day 1"]);

        storage.clear().unwrap();
        assert!(storage.list_expenses(&group).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_settlement_fails() {
        let mut storage = MemoryStorage::new();
        let record = SettlementRecord::new(
            GroupId::new(),
            MemberId::new(),
            MemberId::new(),
            Money::from_cents(100),
            String::new(),
        )
        .unwrap();

        assert!(matches!(
            storage.update_settlement(&record).await,
            Err(SplitError::SettlementNotFound(_))
        ));
    }
}
