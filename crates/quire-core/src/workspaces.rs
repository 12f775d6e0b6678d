//! Workspace lifecycle and membership management.
//!
//! Every workspace has exactly one owner. The owner membership is written
//! together with the workspace and is never demoted, removed or handed out
//! through invitations or role changes.
//!
//! Role changes and removals follow the dominance rule: a caller may only
//! act on members strictly less privileged than themselves.

use quire_org::{MemberProfile, Membership, Workspace, WorkspaceRole, WorkspaceSummary};
use quire_rbac::{Action, ResourceType};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::context::CoreContext;
use crate::error::{WorkspaceError, WorkspaceResult};
use crate::store::StoreError;
use crate::validation::{bounded_text, required_text};

/// Creates, updates and deletes workspaces and manages their members.
#[derive(Debug, Clone)]
pub struct WorkspaceService {
    ctx: CoreContext,
}

impl WorkspaceService {
    /// Create a workspace service.
    pub fn new(ctx: CoreContext) -> Self {
        Self { ctx }
    }

    fn validate_name(&self, name: &str) -> WorkspaceResult<()> {
        required_text("workspace name", name, self.ctx.config.fields.workspace_name)
    }

    fn validate_description(&self, description: &str) -> WorkspaceResult<()> {
        bounded_text(
            "workspace description",
            description,
            self.ctx.config.fields.workspace_description,
        )
    }

    async fn load(&self, workspace_id: Uuid) -> WorkspaceResult<Workspace> {
        self.ctx
            .store
            .find_workspace(workspace_id)
            .await?
            .ok_or(WorkspaceError::NotFound(ResourceType::Workspace))
    }

    /// Create a team workspace owned by `actor`.
    ///
    /// # Errors
    ///
    /// - `NotFound(User)` if the actor does not exist
    /// - `InvalidInput` for a bad name or description
    /// - `LimitExceeded(OwnedTeamWorkspaces)` at the per-owner ceiling
    pub async fn create(
        &self,
        actor: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> WorkspaceResult<Workspace> {
        if self.ctx.users.find_by_id(actor).await?.is_none() {
            return Err(WorkspaceError::NotFound(ResourceType::User));
        }
        self.validate_name(name)?;
        if let Some(description) = description {
            self.validate_description(description)?;
        }
        self.ctx.quota.ensure_team_workspace_headroom(actor).await?;

        let workspace = Workspace::team(name, description.map(str::to_string));
        self.ctx
            .store
            .create_workspace(workspace.clone(), Membership::owner(workspace.id, actor))
            .await?;

        info!(workspace_id = %workspace.id, owner_id = %actor, "Created team workspace");
        Ok(workspace)
    }

    /// Update name and/or description. Requires Admin.
    pub async fn update(
        &self,
        workspace_id: Uuid,
        actor: Uuid,
        name: Option<&str>,
        description: Option<&str>,
    ) -> WorkspaceResult<Workspace> {
        self.ctx
            .gate
            .authorize(actor, workspace_id, Action::UpdateWorkspace)
            .await?;
        let mut workspace = self.load(workspace_id).await?;

        if let Some(name) = name {
            self.validate_name(name)?;
            workspace.rename(name);
        }
        if let Some(description) = description {
            self.validate_description(description)?;
            workspace.set_description(description);
        }
        self.ctx.store.update_workspace(workspace.clone()).await?;

        info!(workspace_id = %workspace_id, "Updated workspace");
        Ok(workspace)
    }

    /// Delete a team workspace with its members, folders and posts.
    /// Requires Owner.
    ///
    /// # Errors
    ///
    /// `CannotDeletePersonal` for a personal workspace.
    pub async fn delete(&self, workspace_id: Uuid, actor: Uuid) -> WorkspaceResult<()> {
        self.ctx
            .gate
            .authorize(actor, workspace_id, Action::DeleteWorkspace)
            .await?;
        let workspace = self.load(workspace_id).await?;
        if workspace.is_personal() {
            warn!(workspace_id = %workspace_id, "Refused to delete personal workspace");
            return Err(WorkspaceError::CannotDeletePersonal);
        }

        self.ctx.store.delete_workspace(workspace_id).await?;
        info!(workspace_id = %workspace_id, "Deleted workspace");
        Ok(())
    }

    /// Add the user registered under `email` with `role`. Requires Admin.
    ///
    /// # Errors
    ///
    /// Checked in this order:
    /// - `CannotAssignOwner` if `role` is Owner
    /// - `CannotInviteToPersonal` for a personal workspace
    /// - `NotFound(User)` if no user has that email
    /// - `AlreadyMember` if the user already belongs
    /// - `LimitExceeded(Members)` at the member ceiling
    pub async fn invite(
        &self,
        workspace_id: Uuid,
        actor: Uuid,
        email: &str,
        role: WorkspaceRole,
    ) -> WorkspaceResult<Membership> {
        self.ctx
            .gate
            .authorize(actor, workspace_id, Action::ManageMembers)
            .await?;
        if role.is_owner() {
            return Err(WorkspaceError::CannotAssignOwner);
        }
        if self.load(workspace_id).await?.is_personal() {
            return Err(WorkspaceError::CannotInviteToPersonal);
        }
        let invitee = self
            .ctx
            .users
            .find_by_email(email)
            .await?
            .ok_or(WorkspaceError::NotFound(ResourceType::User))?;
        if self
            .ctx
            .store
            .find_membership(workspace_id, invitee.id)
            .await?
            .is_some()
        {
            return Err(WorkspaceError::AlreadyMember);
        }
        self.ctx.quota.ensure_member_headroom(workspace_id).await?;

        let membership = Membership::new(workspace_id, invitee.id, role).with_inviter(actor);
        match self.ctx.store.insert_membership(membership.clone()).await {
            Ok(()) => {}
            // Lost a race with a concurrent invite of the same user
            Err(StoreError::Conflict(_)) => return Err(WorkspaceError::AlreadyMember),
            Err(e) => return Err(e.into()),
        }

        info!(
            workspace_id = %workspace_id,
            user_id = %invitee.id,
            role = %role,
            invited_by = %actor,
            "Invited member"
        );
        Ok(membership)
    }

    async fn find_member(&self, workspace_id: Uuid, member_id: Uuid) -> WorkspaceResult<Membership> {
        self.ctx
            .store
            .find_membership_by_id(member_id)
            .await?
            .filter(|m| m.workspace_id == workspace_id)
            .ok_or(WorkspaceError::NotFound(ResourceType::Member))
    }

    fn ensure_dominates(actor_role: WorkspaceRole, target: &Membership) -> WorkspaceResult<()> {
        if target.is_owner() || !actor_role.dominates(target.role) {
            warn!(
                actor_role = %actor_role,
                target_role = %target.role,
                member_id = %target.id,
                "Refused to modify member with equal or higher role"
            );
            return Err(WorkspaceError::CannotModifyHigherRole);
        }
        Ok(())
    }

    /// Change a member's role. Requires Admin and strict dominance over the
    /// target.
    ///
    /// # Errors
    ///
    /// - `NotFound(Member)` if the member is not in this workspace
    /// - `CannotAssignOwner` if `new_role` is Owner
    /// - `CannotModifyHigherRole` for the owner or an equal or higher role
    pub async fn update_member_role(
        &self,
        workspace_id: Uuid,
        actor: Uuid,
        member_id: Uuid,
        new_role: WorkspaceRole,
    ) -> WorkspaceResult<Membership> {
        let grant = self
            .ctx
            .gate
            .authorize(actor, workspace_id, Action::ManageMembers)
            .await?;
        let mut target = self.find_member(workspace_id, member_id).await?;
        if new_role.is_owner() {
            return Err(WorkspaceError::CannotAssignOwner);
        }
        Self::ensure_dominates(grant.role(), &target)?;

        let previous = target.role;
        target.role = new_role;
        self.ctx.store.update_membership(target.clone()).await?;

        info!(
            workspace_id = %workspace_id,
            member_id = %member_id,
            from = %previous,
            to = %new_role,
            "Changed member role"
        );
        Ok(target)
    }

    /// Remove a member. Same checks as [`update_member_role`](Self::update_member_role).
    pub async fn remove_member(&self, workspace_id: Uuid, actor: Uuid, member_id: Uuid) -> WorkspaceResult<()> {
        let grant = self
            .ctx
            .gate
            .authorize(actor, workspace_id, Action::ManageMembers)
            .await?;
        let target = self.find_member(workspace_id, member_id).await?;
        Self::ensure_dominates(grant.role(), &target)?;

        self.ctx.store.delete_membership(target.id).await?;
        info!(
            workspace_id = %workspace_id,
            member_id = %member_id,
            user_id = %target.user_id,
            "Removed member"
        );
        Ok(())
    }

    /// Leave a workspace.
    ///
    /// # Errors
    ///
    /// `OwnerCannotLeave` for the owner.
    pub async fn leave(&self, workspace_id: Uuid, actor: Uuid) -> WorkspaceResult<()> {
        let membership = self.ctx.gate.resolve_member(actor, workspace_id).await?;
        if membership.is_owner() {
            warn!(workspace_id = %workspace_id, user_id = %actor, "Owner tried to leave");
            return Err(WorkspaceError::OwnerCannotLeave);
        }

        self.ctx.store.delete_membership(membership.id).await?;
        info!(workspace_id = %workspace_id, user_id = %actor, "Left workspace");
        Ok(())
    }

    /// The workspace as the caller sees it, with usage against quotas.
    pub async fn get(&self, workspace_id: Uuid, actor: Uuid) -> WorkspaceResult<WorkspaceSummary> {
        let grant = self.ctx.gate.authorize(actor, workspace_id, Action::Read).await?;
        let workspace = self.load(workspace_id).await?;
        let usage = self.ctx.quota.usage(workspace_id).await?;
        Ok(WorkspaceSummary::new(&workspace, grant.role(), usage))
    }

    /// Every workspace the actor belongs to, oldest first.
    pub async fn list_mine(&self, actor: Uuid) -> WorkspaceResult<Vec<WorkspaceSummary>> {
        let memberships = self.ctx.store.list_user_memberships(actor).await?;
        let mut summaries = Vec::with_capacity(memberships.len());
        for membership in memberships {
            let Some(workspace) = self.ctx.store.find_workspace(membership.workspace_id).await? else {
                continue;
            };
            let usage = self.ctx.quota.usage(workspace.id).await?;
            summaries.push(WorkspaceSummary::new(&workspace, membership.role, usage));
        }
        summaries.sort_by_key(|s| (s.created_at, s.id));

        debug!(user_id = %actor, count = summaries.len(), "Listed workspaces");
        Ok(summaries)
    }

    /// Members of a workspace, most privileged first, then by join time.
    ///
    /// Memberships whose user record is gone are skipped.
    pub async fn list_members(&self, workspace_id: Uuid, actor: Uuid) -> WorkspaceResult<Vec<MemberProfile>> {
        self.ctx.gate.authorize(actor, workspace_id, Action::Read).await?;
        let mut memberships = self.ctx.store.list_workspace_memberships(workspace_id).await?;
        memberships.sort_by_key(|m| (m.role.level(), m.joined_at, m.id));

        let mut members = Vec::with_capacity(memberships.len());
        for membership in memberships {
            if let Some(user) = self.ctx.users.find_by_id(membership.user_id).await? {
                members.push(MemberProfile {
                    member_id: membership.id,
                    user_id: user.id,
                    email: user.email,
                    nickname: user.nickname,
                    role: membership.role,
                    joined_at: membership.joined_at,
                });
            }
        }
        Ok(members)
    }
}
