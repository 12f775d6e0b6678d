//! # Actions
//!
//! Defines the operations a member can perform inside a workspace and the
//! minimum role each one requires.

use quire_org::WorkspaceRole;
use serde::{Deserialize, Serialize};

/// Actions that can be performed within a workspace.
///
/// Each action maps to the least privileged role allowed to perform it:
/// - **Read**: Viewer
/// - **Write**: Member (folders and posts)
/// - **UpdateWorkspace**: Admin
/// - **ManageMembers**: Admin (invite, change role, remove)
/// - **DeleteWorkspace**: Owner
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// View workspace content.
    Read,

    /// Create, edit, move or delete folders and posts.
    Write,

    /// Change the workspace's name or description.
    UpdateWorkspace,

    /// Invite members, change their roles or remove them.
    ManageMembers,

    /// Delete the workspace and everything in it.
    DeleteWorkspace,
}

impl Action {
    /// Get the string representation of the action.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Write => "write",
            Action::UpdateWorkspace => "update_workspace",
            Action::ManageMembers => "manage_members",
            Action::DeleteWorkspace => "delete_workspace",
        }
    }

    /// Parse action from string representation.
    ///
    /// # Arguments
    ///
    /// * `s` - String to parse (case-insensitive, supports aliases)
    ///
    /// # Example
    ///
    /// ```
    /// use quire_rbac::actions::Action;
    ///
    /// assert_eq!(Action::parse("read"), Some(Action::Read));
    /// assert_eq!(Action::parse("edit"), Some(Action::Write));
    /// assert_eq!(Action::parse("invalid"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "read" | "view" => Some(Action::Read),
            "write" | "edit" => Some(Action::Write),
            "update_workspace" => Some(Action::UpdateWorkspace),
            "manage_members" | "manage" => Some(Action::ManageMembers),
            "delete_workspace" => Some(Action::DeleteWorkspace),
            _ => None,
        }
    }

    /// Get all actions.
    pub fn all() -> Vec<Self> {
        vec![
            Action::Read,
            Action::Write,
            Action::UpdateWorkspace,
            Action::ManageMembers,
            Action::DeleteWorkspace,
        ]
    }

    /// The least privileged role allowed to perform this action.
    ///
    /// # Example
    ///
    /// ```
    /// use quire_org::WorkspaceRole;
    /// use quire_rbac::actions::Action;
    ///
    /// assert_eq!(Action::Write.required_role(), WorkspaceRole::Member);
    /// assert_eq!(Action::DeleteWorkspace.required_role(), WorkspaceRole::Owner);
    /// ```
    pub fn required_role(&self) -> WorkspaceRole {
        match self {
            Action::Read => WorkspaceRole::Viewer,
            Action::Write => WorkspaceRole::Member,
            Action::UpdateWorkspace | Action::ManageMembers => WorkspaceRole::Admin,
            Action::DeleteWorkspace => WorkspaceRole::Owner,
        }
    }

    /// Check whether a role may perform this action.
    pub fn permits(&self, role: WorkspaceRole) -> bool {
        role.has_permission(self.required_role())
    }

    /// Check if this action leaves workspace state unchanged.
    pub fn is_read_only(&self) -> bool {
        matches!(self, Action::Read)
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
