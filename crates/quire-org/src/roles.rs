//! Workspace roles
//!
//! This module defines the graded role hierarchy used inside a workspace,
//! along with the comparison rules every permission check is built on.

use serde::{Deserialize, Serialize};

/// A member's role within a workspace.
///
/// Roles are totally ordered by privilege level, where a *lower* level is
/// *more* privileged:
///
/// | Role   | Level |
/// |--------|-------|
/// | Owner  | 0     |
/// | Admin  | 1     |
/// | Member | 2     |
/// | Viewer | 3     |
///
/// # Permission Model
///
/// - **Owner**: Everything, including deleting the workspace
/// - **Admin**: Workspace settings and member management
/// - **Member**: Read and write folders and posts
/// - **Viewer**: Read-only access
///
/// # Examples
///
/// ```
/// use quire_org::WorkspaceRole;
///
/// let role = WorkspaceRole::Member;
/// assert!(role.can_write());
/// assert!(!role.has_permission(WorkspaceRole::Admin));
///
/// let admin = WorkspaceRole::Admin;
/// assert!(admin.has_permission(WorkspaceRole::Member));
/// assert!(admin.dominates(WorkspaceRole::Member));
/// assert!(!admin.dominates(WorkspaceRole::Admin));
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum WorkspaceRole {
    /// Sole owner of the workspace
    Owner,

    /// Manages workspace settings and members
    Admin,

    /// Reads and writes content
    Member,

    /// Read-only access
    Viewer,
}

impl WorkspaceRole {
    /// All roles, most privileged first.
    pub const ALL: [WorkspaceRole; 4] = [
        WorkspaceRole::Owner,
        WorkspaceRole::Admin,
        WorkspaceRole::Member,
        WorkspaceRole::Viewer,
    ];

    /// Privilege level of this role. Lower is more privileged.
    pub fn level(&self) -> u8 {
        match self {
            Self::Owner => 0,
            Self::Admin => 1,
            Self::Member => 2,
            Self::Viewer => 3,
        }
    }

    /// Check whether this role satisfies a required role.
    ///
    /// A role satisfies the requirement when its level is less than or
    /// equal to the required level.
    ///
    /// # Examples
    ///
    /// ```
    /// use quire_org::WorkspaceRole;
    ///
    /// assert!(WorkspaceRole::Owner.has_permission(WorkspaceRole::Viewer));
    /// assert!(WorkspaceRole::Admin.has_permission(WorkspaceRole::Admin));
    /// assert!(!WorkspaceRole::Viewer.has_permission(WorkspaceRole::Member));
    /// ```
    pub fn has_permission(&self, required: WorkspaceRole) -> bool {
        self.level() <= required.level()
    }

    /// Check whether this role is strictly more privileged than `other`.
    ///
    /// This is the dominance rule non-owners are held to when they change
    /// or remove another member.
    pub fn dominates(&self, other: WorkspaceRole) -> bool {
        self.level() < other.level()
    }

    /// Check if this role can create and edit folders and posts.
    ///
    /// # Returns
    ///
    /// `true` for every role except Viewer
    pub fn can_write(&self) -> bool {
        self.has_permission(WorkspaceRole::Member)
    }

    /// Check if this role can manage members and workspace settings.
    pub fn can_manage(&self) -> bool {
        self.has_permission(WorkspaceRole::Admin)
    }

    /// Check if this is the owner role.
    pub fn is_owner(&self) -> bool {
        matches!(self, Self::Owner)
    }

    /// Parse role from string representation.
    ///
    /// # Arguments
    ///
    /// * `s` - String to parse (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use quire_org::WorkspaceRole;
    ///
    /// assert_eq!(WorkspaceRole::parse("admin"), Some(WorkspaceRole::Admin));
    /// assert_eq!(WorkspaceRole::parse("VIEWER"), Some(WorkspaceRole::Viewer));
    /// assert_eq!(WorkspaceRole::parse("editor"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "owner" => Some(Self::Owner),
            "admin" => Some(Self::Admin),
            "member" => Some(Self::Member),
            "viewer" => Some(Self::Viewer),
            _ => None,
        }
    }

    /// Get string representation of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Admin => "admin",
            Self::Member => "member",
            Self::Viewer => "viewer",
        }
    }

    /// Get a human-readable display name for the role.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Owner => "Owner",
            Self::Admin => "Admin",
            Self::Member => "Member",
            Self::Viewer => "Viewer",
        }
    }
}

impl Default for WorkspaceRole {
    fn default() -> Self {
        Self::Member
    }
}

impl std::fmt::Display for WorkspaceRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
