//! # Quire RBAC (Role-Based Access Control)
//!
//! This crate provides the authorization vocabulary for Quire workspaces.
//!
//! ## Overview
//!
//! The quire-rbac crate handles:
//! - **Resources**: Record kinds an operation can address
//! - **Actions**: Workspace operations and the minimum role for each
//! - **Grants**: Resolved memberships used as capabilities
//!
//! ## Architecture
//!
//! ```text
//! (user, workspace) ─→ Membership ─→ Grant ─require(Action)→ Grant | Denied
//!
//! Action        Minimum role
//!   read          viewer
//!   write         member
//!   manage        admin
//!   delete        owner
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use uuid::Uuid;
//! use quire_org::{Membership, WorkspaceRole};
//! use quire_rbac::{Action, Grant};
//!
//! let grant = Grant::new(Membership::new(Uuid::now_v7(), Uuid::now_v7(), WorkspaceRole::Admin));
//!
//! assert!(grant.allows(Action::ManageMembers));
//! assert!(grant.require(Action::DeleteWorkspace).is_err());
//! ```
//!
//! ## Integration with quire-org
//!
//! Roles come from `quire-org`; a role satisfies an action when its level
//! is at or below the action's required role level.

pub mod actions;
pub mod permissions;
pub mod resources;

// Re-export main types for convenience
pub use actions::Action;
pub use permissions::{Denied, Grant};
pub use resources::ResourceType;
