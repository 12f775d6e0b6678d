//! # Quire Workspace Records
//!
//! This crate provides the domain records of Quire's multi-tenant content
//! model: users belong to workspaces with graded roles, and each workspace
//! owns a forest of folders containing posts.
//!
//! ## Overview
//!
//! The quire-org crate handles:
//! - **Workspaces**: Personal and team tenants
//! - **Memberships**: User-workspace links carrying a role
//! - **Roles**: The ordered Owner > Admin > Member > Viewer hierarchy
//! - **Folders**: Parent-linked folders forming a forest per workspace
//! - **Posts**: Versioned content, optionally filed in a folder
//! - **Quotas**: Ceilings on members, folders, posts and owned workspaces
//!
//! ## Architecture
//!
//! ```text
//! User
//!   └─ Membership (role) ─→ Workspace
//!                              ├─ Folders (parent_id forest)
//!                              │    └─ Posts
//!                              └─ Posts (unfiled)
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use quire_org::{Folder, Membership, Post, User, Workspace, WorkspaceRole};
//!
//! let user = User::new("ada@example.com", "ada");
//! let workspace = Workspace::team("Research", None);
//! let owner = Membership::owner(workspace.id, user.id);
//!
//! let folder = Folder::new(workspace.id, user.id, "Papers", None);
//! let post = Post::new(workspace.id, user.id, Some(folder.id), "Notes", "");
//! assert!(owner.role.has_permission(WorkspaceRole::Admin));
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Serialization support (enabled by default)

pub mod folder;
pub mod membership;
pub mod post;
pub mod quotas;
pub mod roles;
pub mod user;
pub mod workspace;

// Re-export main types for convenience
pub use folder::{Folder, FolderNode, WorkspaceTree};
pub use membership::{MemberProfile, Membership};
pub use post::{Post, PostEdit, PostSummary, PostView};
pub use quotas::{QuotaLimits, QuotaResource, QuotaUsage};
pub use roles::WorkspaceRole;
pub use user::{AuthProvider, User, UserSummary};
pub use workspace::{Workspace, WorkspaceKind, WorkspaceSummary};
