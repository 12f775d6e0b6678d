//! Resource quotas
//!
//! This module defines the countable resources that are capped at creation
//! time and the ceilings that apply to them.

use serde::{Deserialize, Serialize};

/// A resource whose count is capped.
///
/// # Scopes
///
/// - **OwnedTeamWorkspaces**: per user, team workspaces the user owns
/// - **Members**: per workspace
/// - **Folders**: per workspace
/// - **Posts**: per workspace
///
/// # Examples
///
/// ```
/// use quire_org::{QuotaLimits, QuotaResource};
///
/// let limits = QuotaLimits::default();
/// assert_eq!(limits.ceiling(QuotaResource::Folders), 20);
/// assert!(limits.allows(QuotaResource::Members, 4));
/// assert!(!limits.allows(QuotaResource::Members, 5));
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum QuotaResource {
    /// Team workspaces owned by one user
    OwnedTeamWorkspaces,

    /// Memberships in one workspace
    Members,

    /// Folders in one workspace
    Folders,

    /// Posts in one workspace
    Posts,
}

impl QuotaResource {
    /// Get string representation of the resource.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OwnedTeamWorkspaces => "workspace",
            Self::Members => "member",
            Self::Folders => "folder",
            Self::Posts => "post",
        }
    }
}

impl std::fmt::Display for QuotaResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ceilings for every quota resource.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuotaLimits {
    /// Maximum team workspaces one user may own
    pub owned_team_workspaces: u32,

    /// Maximum memberships per workspace
    pub members: u32,

    /// Maximum folders per workspace
    pub folders: u32,

    /// Maximum posts per workspace
    pub posts: u32,
}

impl Default for QuotaLimits {
    fn default() -> Self {
        Self {
            owned_team_workspaces: 3,
            members: 5,
            folders: 20,
            posts: 100,
        }
    }
}

impl QuotaLimits {
    /// Get the ceiling for a resource.
    pub fn ceiling(&self, resource: QuotaResource) -> u32 {
        match resource {
            QuotaResource::OwnedTeamWorkspaces => self.owned_team_workspaces,
            QuotaResource::Members => self.members,
            QuotaResource::Folders => self.folders,
            QuotaResource::Posts => self.posts,
        }
    }

    /// Check whether one more resource may be created given the current
    /// count.
    ///
    /// Creation is refused once the count has reached the ceiling.
    pub fn allows(&self, resource: QuotaResource, current: u64) -> bool {
        current < u64::from(self.ceiling(resource))
    }
}

/// Current counts of a workspace's capped resources against their ceilings.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuotaUsage {
    /// Number of memberships
    pub member_count: u64,

    /// Membership ceiling
    pub member_limit: u32,

    /// Number of folders
    pub folder_count: u64,

    /// Folder ceiling
    pub folder_limit: u32,

    /// Number of posts
    pub post_count: u64,

    /// Post ceiling
    pub post_limit: u32,
}
