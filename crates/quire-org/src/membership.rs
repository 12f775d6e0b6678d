//! Membership domain models
//!
//! A membership links a user to a workspace with exactly one role. At most
//! one membership exists per (workspace, user) pair.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::roles::WorkspaceRole;

/// Workspace membership linking a user to a workspace.
///
/// # Examples
///
/// ```
/// use uuid::Uuid;
/// use quire_org::{Membership, WorkspaceRole};
///
/// let workspace_id = Uuid::now_v7();
/// let user_id = Uuid::now_v7();
/// let membership = Membership::new(workspace_id, user_id, WorkspaceRole::Member);
/// assert!(membership.invited_by.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    /// Unique membership ID
    pub id: Uuid,

    /// Workspace ID
    pub workspace_id: Uuid,

    /// User ID
    pub user_id: Uuid,

    /// Role within the workspace
    pub role: WorkspaceRole,

    /// When the user joined
    pub joined_at: DateTime<Utc>,

    /// Who invited this user (None for the owner)
    pub invited_by: Option<Uuid>,
}

impl Membership {
    /// Creates a new membership with a UUID v7 ID and the current time as
    /// `joined_at`.
    pub fn new(workspace_id: Uuid, user_id: Uuid, role: WorkspaceRole) -> Self {
        Self {
            id: Uuid::now_v7(),
            workspace_id,
            user_id,
            role,
            joined_at: Utc::now(),
            invited_by: None,
        }
    }

    /// Creates the owner membership for a freshly created workspace.
    pub fn owner(workspace_id: Uuid, user_id: Uuid) -> Self {
        Self::new(workspace_id, user_id, WorkspaceRole::Owner)
    }

    /// Set who invited this user.
    pub fn with_inviter(mut self, inviter_id: Uuid) -> Self {
        self.invited_by = Some(inviter_id);
        self
    }

    /// Check if this membership is the workspace owner.
    pub fn is_owner(&self) -> bool {
        self.role.is_owner()
    }
}

/// A membership joined with the member's public profile, for member lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberProfile {
    /// Membership ID
    pub member_id: Uuid,

    /// User ID
    pub user_id: Uuid,

    /// Email
    pub email: String,

    /// Nickname
    pub nickname: String,

    /// Role within the workspace
    pub role: WorkspaceRole,

    /// When the user joined
    pub joined_at: DateTime<Utc>,
}
