//! Group roster management

use crate::traits::*;
use crate::types::*;

/// Member manager for a group's roster
pub struct MemberManager<S: GroupStorage> {
    pub(crate) storage: S,
}

impl<S: GroupStorage> MemberManager<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Add a member to a group
    pub async fn add_member(&mut self, group_id: &GroupId, member: Member) -> SplitResult<Member> {
        if member.name().trim().is_empty() && member.email().is_none_or(|e| e.trim().is_empty()) {
            return Err(SplitError::Validation(
                "Member needs a name or an email".to_string(),
            ));
        }

        let roster = self.storage.list_members(group_id).await?;
        if roster.iter().any(|m| m.id() == member.id()) {
            return Err(SplitError::Validation(format!(
                "Member {} is already in this group",
                member.id()
            )));
        }

        self.storage.save_member(group_id, &member).await?;
        tracing::info!(
            group_id = %group_id,
            member_id = %member.id(),
            guest = member.is_guest(),
            "member added"
        );
        Ok(member)
    }

    /// The group's roster
    pub async fn list_members(&self, group_id: &GroupId) -> SplitResult<Vec<Member>> {
        self.storage.list_members(group_id).await
    }

    /// Look up one member of a group
    pub async fn get_member_required(
        &self,
        group_id: &GroupId,
        member_id: &MemberId,
    ) -> SplitResult<Member> {
        self.storage
            .list_members(group_id)
            .await?
            .into_iter()
            .find(|m| &m.id() == member_id)
            .ok_or(SplitError::MemberNotFound(*member_id))
    }

    /// Remove a member from a group's roster
    pub async fn remove_member(
        &mut self,
        group_id: &GroupId,
        member_id: &MemberId,
    ) -> SplitResult<()> {
        self.get_member_required(group_id, member_id).await?;
        self.storage.remove_member(group_id, member_id).await?;
        tracing::info!(group_id = %group_id, member_id = %member_id, "member removed");
        Ok(())
    }
}
