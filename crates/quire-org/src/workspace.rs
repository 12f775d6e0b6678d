//! Workspace domain models
//!
//! A workspace is the tenant boundary: it owns its memberships, folders and
//! posts, and every permission check is scoped to one workspace.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::quotas::QuotaUsage;
use crate::roles::WorkspaceRole;

/// Workspace kind.
///
/// Every user gets exactly one personal workspace at signup. Personal
/// workspaces cannot be deleted and cannot receive invitations.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum WorkspaceKind {
    /// Created automatically for a single user
    Personal,

    /// Created explicitly and shared with invited members
    Team,
}

impl WorkspaceKind {
    /// Get string representation of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Personal => "personal",
            Self::Team => "team",
        }
    }
}

/// A named container of folders and posts.
///
/// # Examples
///
/// ```
/// use quire_org::{Workspace, WorkspaceKind};
///
/// let workspace = Workspace::team("Design", Some("Design docs".to_string()));
/// assert_eq!(workspace.kind, WorkspaceKind::Team);
/// assert!(!workspace.is_personal());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    /// Unique identifier for the workspace
    pub id: Uuid,

    /// Human-readable name
    pub name: String,

    /// Optional description
    pub description: Option<String>,

    /// Personal or team
    pub kind: WorkspaceKind,

    /// When the workspace was created
    pub created_at: DateTime<Utc>,

    /// When the workspace was last updated
    pub updated_at: DateTime<Utc>,
}

impl Workspace {
    /// Creates a new workspace of the given kind.
    pub fn new(name: impl Into<String>, description: Option<String>, kind: WorkspaceKind) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            description,
            kind,
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates a team workspace.
    pub fn team(name: impl Into<String>, description: Option<String>) -> Self {
        Self::new(name, description, WorkspaceKind::Team)
    }

    /// Creates a personal workspace.
    pub fn personal(name: impl Into<String>) -> Self {
        Self::new(name, None, WorkspaceKind::Personal)
    }

    /// Check if this is a personal workspace.
    pub fn is_personal(&self) -> bool {
        self.kind == WorkspaceKind::Personal
    }

    /// Rename the workspace.
    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.updated_at = Utc::now();
    }

    /// Replace the description.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = Some(description.into());
        self.updated_at = Utc::now();
    }
}

/// Workspace as seen by one of its members.
///
/// Carries the caller's role and the workspace's current quota usage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceSummary {
    /// Workspace ID
    pub id: Uuid,

    /// Workspace name
    pub name: String,

    /// Description
    pub description: Option<String>,

    /// Personal or team
    pub kind: WorkspaceKind,

    /// Caller's role in this workspace
    pub my_role: WorkspaceRole,

    /// Member, folder and post counts against their ceilings
    pub usage: QuotaUsage,

    /// When the workspace was created
    pub created_at: DateTime<Utc>,
}

impl WorkspaceSummary {
    /// Build a summary from a workspace, the caller's role and usage counts.
    pub fn new(workspace: &Workspace, my_role: WorkspaceRole, usage: QuotaUsage) -> Self {
        Self {
            id: workspace.id,
            name: workspace.name.clone(),
            description: workspace.description.clone(),
            kind: workspace.kind,
            my_role,
            usage,
            created_at: workspace.created_at,
        }
    }
}
