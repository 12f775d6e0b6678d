//! Membership gate
//!
//! The single entry point through which every workspace-scoped operation
//! learns who the caller is inside the workspace. Lookups happen in a fixed
//! order so callers can tell a missing workspace from a missing user from a
//! non-member:
//!
//! 1. workspace absent: `NotFound(Workspace)`
//! 2. user absent: `NotFound(User)`
//! 3. no membership: `AccessDenied`

use quire_org::Membership;
use quire_rbac::{Action, Grant, ResourceType};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::directory::UserDirectory;
use crate::error::{WorkspaceError, WorkspaceResult};
use crate::store::WorkspaceStore;

/// Resolves memberships and issues grants.
#[derive(Clone)]
pub struct MembershipGate {
    store: Arc<dyn WorkspaceStore>,
    users: Arc<dyn UserDirectory>,
}

impl std::fmt::Debug for MembershipGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MembershipGate").finish_non_exhaustive()
    }
}

impl MembershipGate {
    /// Create a gate over a store and a user directory.
    pub fn new(store: Arc<dyn WorkspaceStore>, users: Arc<dyn UserDirectory>) -> Self {
        Self { store, users }
    }

    /// Find the caller's membership in a workspace.
    ///
    /// # Errors
    ///
    /// - [`WorkspaceError::NotFound`] with `Workspace` or `User`
    /// - [`WorkspaceError::AccessDenied`] if the user is not a member
    pub async fn resolve_member(&self, user_id: Uuid, workspace_id: Uuid) -> WorkspaceResult<Membership> {
        if self.store.find_workspace(workspace_id).await?.is_none() {
            return Err(WorkspaceError::NotFound(ResourceType::Workspace));
        }
        if self.users.find_by_id(user_id).await?.is_none() {
            return Err(WorkspaceError::NotFound(ResourceType::User));
        }
        match self.store.find_membership(workspace_id, user_id).await? {
            Some(membership) => {
                debug!(
                    user_id = %user_id,
                    workspace_id = %workspace_id,
                    role = %membership.role,
                    "Resolved membership"
                );
                Ok(membership)
            }
            None => {
                warn!(user_id = %user_id, workspace_id = %workspace_id, "Access denied: not a member");
                Err(WorkspaceError::AccessDenied)
            }
        }
    }

    /// Resolve the caller's membership and require an action.
    ///
    /// # Errors
    ///
    /// Everything [`resolve_member`](Self::resolve_member) returns, plus
    /// [`WorkspaceError::InsufficientPermission`] if the role is too low.
    pub async fn authorize(&self, user_id: Uuid, workspace_id: Uuid, action: Action) -> WorkspaceResult<Grant> {
        let membership = self.resolve_member(user_id, workspace_id).await?;
        Grant::new(membership).require(action).map_err(|denied| {
            warn!(
                user_id = %user_id,
                workspace_id = %workspace_id,
                action = %action,
                role = %denied.actual,
                "Permission denied"
            );
            WorkspaceError::from(denied)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::MemoryUserDirectory;
    use crate::store::MemoryStore;
    use quire_org::{User, Workspace, WorkspaceRole};

    struct Fixture {
        gate: MembershipGate,
        store: Arc<MemoryStore>,
        users: Arc<MemoryUserDirectory>,
        workspace: Workspace,
        owner: User,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let users = Arc::new(MemoryUserDirectory::new());
        let owner = User::new("owner@example.com", "owner");
        users.insert(owner.clone()).await.unwrap();
        let workspace = Workspace::team("Team", None);
        store
            .create_workspace(workspace.clone(), Membership::owner(workspace.id, owner.id))
            .await
            .unwrap();
        Fixture {
            gate: MembershipGate::new(store.clone(), users.clone()),
            store,
            users,
            workspace,
            owner,
        }
    }

    #[tokio::test]
    async fn test_resolves_owner() {
        let f = fixture().await;
        let membership = f.gate.resolve_member(f.owner.id, f.workspace.id).await.unwrap();
        assert_eq!(membership.role, WorkspaceRole::Owner);
    }

    #[tokio::test]
    async fn test_lookup_order() {
        let f = fixture().await;

        // Missing workspace wins over missing user
        let err = f
            .gate
            .resolve_member(Uuid::now_v7(), Uuid::now_v7())
            .await
            .unwrap_err();
        assert!(matches!(err, WorkspaceError::NotFound(ResourceType::Workspace)));

        let err = f
            .gate
            .resolve_member(Uuid::now_v7(), f.workspace.id)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkspaceError::NotFound(ResourceType::User)));

        let stranger = User::new("stranger@example.com", "stranger");
        f.users.insert(stranger.clone()).await.unwrap();
        let err = f
            .gate
            .resolve_member(stranger.id, f.workspace.id)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkspaceError::AccessDenied));
    }

    #[tokio::test]
    async fn test_authorize_checks_role() {
        let f = fixture().await;
        let viewer = User::new("viewer@example.com", "viewer");
        f.users.insert(viewer.clone()).await.unwrap();
        f.store
            .insert_membership(Membership::new(f.workspace.id, viewer.id, WorkspaceRole::Viewer))
            .await
            .unwrap();

        let grant = f
            .gate
            .authorize(viewer.id, f.workspace.id, Action::Read)
            .await
            .unwrap();
        assert_eq!(grant.role(), WorkspaceRole::Viewer);

        let err = f
            .gate
            .authorize(viewer.id, f.workspace.id, Action::Write)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WorkspaceError::InsufficientPermission {
                required: WorkspaceRole::Member,
                actual: WorkspaceRole::Viewer
            }
        ));
    }
}
