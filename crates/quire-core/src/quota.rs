//! Quota enforcement.
//!
//! Counts are read and compared against the configured ceiling before a
//! record is created. The check and the insert are separate steps, so two
//! concurrent creators can both pass the check; the ceiling is a soft limit
//! under concurrency.

use quire_org::{QuotaLimits, QuotaResource, QuotaUsage};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{WorkspaceError, WorkspaceResult};
use crate::store::WorkspaceStore;

/// Checks resource counts against quota ceilings.
#[derive(Clone)]
pub struct QuotaEnforcer {
    store: Arc<dyn WorkspaceStore>,
    limits: QuotaLimits,
}

impl std::fmt::Debug for QuotaEnforcer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuotaEnforcer")
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

impl QuotaEnforcer {
    /// Create an enforcer with the given ceilings.
    pub fn new(store: Arc<dyn WorkspaceStore>, limits: QuotaLimits) -> Self {
        Self { store, limits }
    }

    /// The configured ceilings.
    pub fn limits(&self) -> &QuotaLimits {
        &self.limits
    }

    /// Refuse creation if `count` has reached the resource's ceiling.
    pub fn check(&self, resource: QuotaResource, count: u64) -> WorkspaceResult<()> {
        if self.limits.allows(resource, count) {
            debug!(resource = %resource, count, ceiling = self.limits.ceiling(resource), "Quota check passed");
            Ok(())
        } else {
            warn!(resource = %resource, count, ceiling = self.limits.ceiling(resource), "Quota exceeded");
            Err(WorkspaceError::LimitExceeded(resource))
        }
    }

    /// Require room for one more member in a workspace.
    pub async fn ensure_member_headroom(&self, workspace_id: Uuid) -> WorkspaceResult<()> {
        let count = self.store.count_memberships(workspace_id).await?;
        self.check(QuotaResource::Members, count)
    }

    /// Require room for one more folder in a workspace.
    pub async fn ensure_folder_headroom(&self, workspace_id: Uuid) -> WorkspaceResult<()> {
        let count = self.store.count_folders(workspace_id).await?;
        self.check(QuotaResource::Folders, count)
    }

    /// Require room for one more post in a workspace.
    pub async fn ensure_post_headroom(&self, workspace_id: Uuid) -> WorkspaceResult<()> {
        let count = self.store.count_posts(workspace_id).await?;
        self.check(QuotaResource::Posts, count)
    }

    /// Require that the user may own one more team workspace.
    pub async fn ensure_team_workspace_headroom(&self, user_id: Uuid) -> WorkspaceResult<()> {
        let count = self.store.count_owned_team_workspaces(user_id).await?;
        self.check(QuotaResource::OwnedTeamWorkspaces, count)
    }

    /// Current member, folder and post counts of a workspace with their
    /// ceilings.
    pub async fn usage(&self, workspace_id: Uuid) -> WorkspaceResult<QuotaUsage> {
        Ok(QuotaUsage {
            member_count: self.store.count_memberships(workspace_id).await?,
            member_limit: self.limits.members,
            folder_count: self.store.count_folders(workspace_id).await?,
            folder_limit: self.limits.folders,
            post_count: self.store.count_posts(workspace_id).await?,
            post_limit: self.limits.posts,
        })
    }
}
