//! Settlement record workflow: a member promises a payment, the receiver
//! confirms it

use crate::engine::SettlementTransfer;
use crate::money::Money;
use crate::traits::*;
use crate::types::*;

/// Settlement manager for creating and completing settlement records
pub struct SettlementManager<S: GroupStorage> {
    storage: S,
}

impl<S: GroupStorage> SettlementManager<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Create a pending settlement on behalf of `requester`
    ///
    /// Members can only create settlements for payments they make themselves.
    pub async fn create_settlement(
        &mut self,
        requester: &MemberId,
        group_id: GroupId,
        from: MemberId,
        to: MemberId,
        amount: Money,
        description: String,
    ) -> SplitResult<SettlementRecord> {
        if requester != &from {
            return Err(SplitError::PermissionDenied(
                "You can only create settlements for yourself".to_string(),
            ));
        }

        let roster = self.storage.list_members(&group_id).await?;
        for member_id in [&from, &to] {
            if !roster.iter().any(|m| &m.id() == member_id) {
                return Err(SplitError::MemberNotFound(*member_id));
            }
        }

        let record = SettlementRecord::new(group_id, from, to, amount, description)?;
        self.storage.save_settlement(&record).await?;
        tracing::info!(
            settlement_id = %record.id,
            from = %record.from,
            to = %record.to,
            amount = %record.amount,
            "settlement created"
        );

        Ok(record)
    }

    /// Turn a suggested transfer into a pending settlement record
    pub async fn settle_transfer(
        &mut self,
        requester: &MemberId,
        group_id: GroupId,
        transfer: &SettlementTransfer,
        description: String,
    ) -> SplitResult<SettlementRecord> {
        self.create_settlement(
            requester,
            group_id,
            transfer.from,
            transfer.to,
            transfer.amount,
            description,
        )
        .await
    }

    /// Mark a settlement completed; only the receiving member may do this
    pub async fn complete_settlement(
        &mut self,
        requester: &MemberId,
        settlement_id: &SettlementId,
    ) -> SplitResult<SettlementRecord> {
        let mut record = self
            .storage
            .get_settlement(settlement_id)
            .await?
            .ok_or(SplitError::SettlementNotFound(*settlement_id))?;

        record.complete(requester)?;
        self.storage.update_settlement(&record).await?;
        tracing::info!(settlement_id = %record.id, "settlement completed");

        Ok(record)
    }

    /// Get a settlement record by ID
    pub async fn get_settlement(
        &self,
        settlement_id: &SettlementId,
    ) -> SplitResult<Option<SettlementRecord>> {
        self.storage.get_settlement(settlement_id).await
    }

    /// Settlements the member pays or receives, newest first
    pub async fn member_settlements(
        &self,
        member_id: &MemberId,
    ) -> SplitResult<Vec<SettlementRecord>> {
        self.storage.list_member_settlements(member_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::memory_storage::MemoryStorage;

    async fn setup() -> (SettlementManager<MemoryStorage>, GroupId, Member, Member) {
        let mut storage = MemoryStorage::new();
        let group = GroupId::new();
        let alice = Member::registered("Alice", None);
        let bob = Member::guest("Bob");
        storage.save_member(&group, &alice).await.unwrap();
        storage.save_member(&group, &bob).await.unwrap();
        (SettlementManager::new(storage), group, alice, bob)
    }

    #[tokio::test]
    async fn test_only_payer_can_create() {
        let (mut manager, group, alice, bob) = setup().await;

        let result = manager
            .create_settlement(
                &alice.id(),
                group,
                bob.id(),
                alice.id(),
                Money::from_cents(1000),
                String::new(),
            )
            .await;
        assert!(matches!(result, Err(SplitError::PermissionDenied(_))));
    }

    #[tokio::test]
    async fn test_settlement_flow() {
        let (mut manager, group, alice, bob) = setup().await;
        let transfer = SettlementTransfer {
            from: bob.id(),
            to: alice.id(),
            amount: Money::from_cents(1000),
        };

        let record = manager
            .settle_transfer(&bob.id(), group, &transfer, "Dinner".to_string())
            .await
            .unwrap();
        assert!(record.is_pending());

        let denied = manager.complete_settlement(&bob.id(), &record.id).await;
        assert!(matches!(denied, Err(SplitError::PermissionDenied(_))));

        let completed = manager
            .complete_settlement(&alice.id(), &record.id)
            .await
            .unwrap();
        assert_eq!(completed.status, SettlementStatus::Completed);

        let stored = manager.get_settlement(&record.id).await.unwrap().unwrap();
        assert_eq!(stored.status, SettlementStatus::Completed);
        assert_eq!(manager.member_settlements(&alice.id()).await.unwrap().len(), 1);
        assert_eq!(manager.member_settlements(&bob.id()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_settlement_and_non_member() {
        let (mut manager, group, alice, _bob) = setup().await;

        let missing = manager
            .complete_settlement(&alice.id(), &SettlementId::new())
            .await;
        assert!(matches!(missing, Err(SplitError::SettlementNotFound(_))));

        let stranger = MemberId::new();
        let result = manager
            .create_settlement(
                &alice.id(),
                group,
                alice.id(),
                stranger,
                Money::from_cents(500),
                String::new(),
            )
            .await;
        assert!(matches!(result, Err(SplitError::MemberNotFound(id)) if id == stranger));
    }
}
