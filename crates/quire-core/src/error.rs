//! Error types for workspace operations
//!
//! Every service in this crate returns [`WorkspaceError`]. Policy failures
//! carry enough structure for a transport layer to map them to a status code
//! and a stable error code without string matching.

use quire_auth::AuthError;
use quire_org::{QuotaResource, WorkspaceRole};
use quire_rbac::{Denied, ResourceType};
use thiserror::Error;

use crate::store::{StoreError, UniqueField};

/// Why a folder move was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvalidMove {
    /// The destination is the folder itself
    SelfMove,
    /// The destination is inside the folder's own subtree
    IntoDescendant,
}

impl std::fmt::Display for InvalidMove {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidMove::SelfMove => f.write_str("cannot move a folder into itself"),
            InvalidMove::IntoDescendant => f.write_str("cannot move a folder into its descendant"),
        }
    }
}

/// Workspace operation error types.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// A record is absent, or lives in another workspace
    #[error("{0} not found")]
    NotFound(ResourceType),

    /// The caller is not a member of the workspace
    #[error("Access denied")]
    AccessDenied,

    /// The caller's role is below what the operation requires
    #[error("Insufficient permission: requires {required}, caller is {actual}")]
    InsufficientPermission {
        /// Minimum role for the operation
        required: WorkspaceRole,
        /// Role the caller holds
        actual: WorkspaceRole,
    },

    /// A quota ceiling has been reached
    #[error("{0} limit exceeded")]
    LimitExceeded(QuotaResource),

    /// A folder move would break the tree
    #[error("Invalid move: {0}")]
    InvalidMove(InvalidMove),

    /// The post changed since the caller read it
    #[error("Version conflict: expected {expected}, current {actual}")]
    VersionConflict {
        /// Version the caller based the edit on
        expected: u64,
        /// Version currently stored
        actual: u64,
    },

    /// The invitee already belongs to the workspace
    #[error("User is already a member of this workspace")]
    AlreadyMember,

    /// The owner role cannot be granted
    #[error("The owner role cannot be assigned")]
    CannotAssignOwner,

    /// The target member is not strictly below the caller
    #[error("Cannot modify a member with an equal or higher role")]
    CannotModifyHigherRole,

    /// The owner cannot leave or drop their last team workspace
    #[error("The owner cannot leave the workspace")]
    OwnerCannotLeave,

    /// Personal workspaces cannot be deleted
    #[error("Personal workspaces cannot be deleted")]
    CannotDeletePersonal,

    /// Personal workspaces cannot receive invitations
    #[error("Cannot invite members to a personal workspace")]
    CannotInviteToPersonal,

    /// A field failed validation
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Email already registered
    #[error("Email is already in use")]
    DuplicateEmail,

    /// Login id already registered
    #[error("Login id is already in use")]
    DuplicateLoginId,

    /// Nickname already taken
    #[error("Nickname is already in use")]
    DuplicateNickname,

    /// Identity-provider profile or linking failure
    #[error(transparent)]
    Identity(#[from] AuthError),

    /// A collaborator (store, directory, blob store) failed
    #[error("Infrastructure error: {0}")]
    Infrastructure(String),
}

/// Result type for workspace operations.
pub type WorkspaceResult<T> = Result<T, WorkspaceError>;

impl WorkspaceError {
    /// Check if this error should be logged at error level.
    pub fn is_server_error(&self) -> bool {
        matches!(self, WorkspaceError::Infrastructure(_))
    }

    /// Check if re-reading and retrying the operation may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, WorkspaceError::VersionConflict { .. })
    }

    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            WorkspaceError::NotFound(_) => 404,

            WorkspaceError::AccessDenied | WorkspaceError::InsufficientPermission { .. } => 403,

            WorkspaceError::VersionConflict { .. } => 409,

            WorkspaceError::LimitExceeded(_)
            | WorkspaceError::InvalidMove(_)
            | WorkspaceError::AlreadyMember
            | WorkspaceError::CannotAssignOwner
            | WorkspaceError::CannotModifyHigherRole
            | WorkspaceError::OwnerCannotLeave
            | WorkspaceError::CannotDeletePersonal
            | WorkspaceError::CannotInviteToPersonal
            | WorkspaceError::InvalidInput(_)
            | WorkspaceError::DuplicateEmail
            | WorkspaceError::DuplicateLoginId
            | WorkspaceError::DuplicateNickname => 400,

            WorkspaceError::Identity(e) => e.status_code(),
            WorkspaceError::Infrastructure(_) => 500,
        }
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            WorkspaceError::NotFound(resource) => resource.not_found_code(),
            WorkspaceError::AccessDenied => "ACCESS_DENIED",
            WorkspaceError::InsufficientPermission {
                required: WorkspaceRole::Member,
                ..
            } => "WRITE_PERMISSION_DENIED",
            WorkspaceError::InsufficientPermission { .. } => "INSUFFICIENT_PERMISSION",
            WorkspaceError::LimitExceeded(resource) => match resource {
                QuotaResource::OwnedTeamWorkspaces => "WORKSPACE_LIMIT_EXCEEDED",
                QuotaResource::Members => "MEMBER_LIMIT_EXCEEDED",
                QuotaResource::Folders => "FOLDER_LIMIT_EXCEEDED",
                QuotaResource::Posts => "POST_LIMIT_EXCEEDED",
            },
            WorkspaceError::InvalidMove(InvalidMove::SelfMove) => "CANNOT_MOVE_TO_SELF",
            WorkspaceError::InvalidMove(InvalidMove::IntoDescendant) => "CANNOT_MOVE_TO_CHILD",
            WorkspaceError::VersionConflict { .. } => "VERSION_CONFLICT",
            WorkspaceError::AlreadyMember => "ALREADY_WORKSPACE_MEMBER",
            WorkspaceError::CannotAssignOwner => "CANNOT_ASSIGN_OWNER_ROLE",
            WorkspaceError::CannotModifyHigherRole => "CANNOT_MODIFY_HIGHER_ROLE",
            WorkspaceError::OwnerCannotLeave => "OWNER_CANNOT_LEAVE",
            WorkspaceError::CannotDeletePersonal => "CANNOT_DELETE_PERSONAL_WORKSPACE",
            WorkspaceError::CannotInviteToPersonal => "CANNOT_INVITE_TO_PERSONAL_WORKSPACE",
            WorkspaceError::InvalidInput(_) => "INVALID_INPUT",
            WorkspaceError::DuplicateEmail => "DUPLICATE_EMAIL",
            WorkspaceError::DuplicateLoginId => "DUPLICATE_LOGIN_ID",
            WorkspaceError::DuplicateNickname => "DUPLICATE_NICKNAME",
            WorkspaceError::Identity(e) => e.error_code(),
            WorkspaceError::Infrastructure(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<Denied> for WorkspaceError {
    fn from(denied: Denied) -> Self {
        WorkspaceError::InsufficientPermission {
            required: denied.required,
            actual: denied.actual,
        }
    }
}

impl From<StoreError> for WorkspaceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(UniqueField::Email) => WorkspaceError::DuplicateEmail,
            StoreError::Duplicate(UniqueField::Nickname) => WorkspaceError::DuplicateNickname,
            StoreError::Duplicate(UniqueField::LoginId) => WorkspaceError::DuplicateLoginId,
            other => WorkspaceError::Infrastructure(other.to_string()),
        }
    }
}
