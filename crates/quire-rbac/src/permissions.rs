//! # Grants
//!
//! A [`Grant`] is proof that a membership was resolved for a user and
//! workspace. Holding one is the only way to reach workspace-scoped
//! operations, and [`Grant::require`] narrows it to a specific action.

use quire_org::{Membership, WorkspaceRole};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::actions::Action;

/// A resolved membership, usable as an authorization capability.
///
/// # Example
///
/// ```
/// use uuid::Uuid;
/// use quire_org::{Membership, WorkspaceRole};
/// use quire_rbac::{Action, Grant};
///
/// let membership = Membership::new(Uuid::now_v7(), Uuid::now_v7(), WorkspaceRole::Member);
/// let grant = Grant::new(membership);
///
/// assert!(grant.allows(Action::Write));
/// assert!(grant.clone().require(Action::ManageMembers).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    membership: Membership,
}

impl Grant {
    /// Wrap a membership that was looked up for the caller.
    pub fn new(membership: Membership) -> Self {
        Self { membership }
    }

    /// The underlying membership.
    pub fn membership(&self) -> &Membership {
        &self.membership
    }

    /// Consume the grant, returning the membership.
    pub fn into_membership(self) -> Membership {
        self.membership
    }

    /// The caller's role in the workspace.
    pub fn role(&self) -> WorkspaceRole {
        self.membership.role
    }

    /// The caller's user ID.
    pub fn user_id(&self) -> Uuid {
        self.membership.user_id
    }

    /// The workspace this grant applies to.
    pub fn workspace_id(&self) -> Uuid {
        self.membership.workspace_id
    }

    /// The caller's membership ID.
    pub fn member_id(&self) -> Uuid {
        self.membership.id
    }

    /// Check whether the grant covers an action.
    pub fn allows(&self, action: Action) -> bool {
        action.permits(self.role())
    }

    /// Narrow the grant to an action.
    ///
    /// # Errors
    ///
    /// Returns [`Denied`] if the caller's role is below the action's
    /// minimum role.
    pub fn require(self, action: Action) -> Result<Grant, Denied> {
        if self.allows(action) {
            Ok(self)
        } else {
            Err(Denied {
                action,
                required: action.required_role(),
                actual: self.role(),
            })
        }
    }
}

/// An action refused because the caller's role is too low.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Denied {
    /// The refused action
    pub action: Action,

    /// Minimum role for the action
    pub required: WorkspaceRole,

    /// Role the caller holds
    pub actual: WorkspaceRole,
}

impl std::fmt::Display for Denied {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} requires {} but caller is {}",
            self.action, self.required, self.actual
        )
    }
}

impl std::error::Error for Denied {}
