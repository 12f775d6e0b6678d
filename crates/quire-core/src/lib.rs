//! # Quire Core
//!
//! The authorization and hierarchical-content core of Quire: every
//! workspace-scoped operation passes through a single membership gate, is
//! checked against the caller's role, is checked against quota for
//! creations, and only then mutates state.
//!
//! ## Overview
//!
//! - **Gate**: resolves the caller's membership and issues a typed [`Grant`]
//! - **Quota**: member, folder, post and owned-workspace ceilings
//! - **Folders**: a parent-linked forest with cycle-safe moves
//! - **Posts**: optimistic versioning with compare-and-swap writes
//! - **Workspaces**: lifecycle, invitations, role changes, departure
//! - **Accounts**: local and provider sign-up with a personal workspace
//!
//! Storage, the user directory, content sanitization and blob storage are
//! collaborator traits. In-memory implementations are provided for tests
//! and embedding.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use quire_core::{CoreConfig, QuireCore};
//!
//! # async fn example() -> quire_core::WorkspaceResult<()> {
//! let core = QuireCore::in_memory(CoreConfig::default());
//!
//! let ada = core.accounts().register_local("ada@example.com", "ada", "ada").await?;
//! let team = core.workspaces().create(ada.id, "Research", None).await?;
//! let papers = core.folders().create(team.id, ada.id, "Papers", None).await?;
//! let post = core
//!     .posts()
//!     .create(team.id, ada.id, "Notes", "<p>draft</p>", Some(papers.id))
//!     .await?;
//!
//! // Stale writers are rejected
//! core.posts()
//!     .update(team.id, ada.id, post.id, Some("Final"), None, Some(post.version))
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod accounts;
pub mod blob;
pub mod config;
pub mod context;
pub mod directory;
pub mod error;
pub mod folders;
pub mod gate;
pub mod posts;
pub mod quota;
pub mod sanitizer;
pub mod store;
pub mod workspaces;

mod validation;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

// Re-export main types
pub use accounts::AccountService;
pub use blob::{BlobError, BlobResult, BlobStore, MemoryBlobStore};
pub use config::{ConfigError, CoreConfig, FieldLimits};
pub use context::CoreContext;
pub use directory::{MemoryUserDirectory, UserDirectory};
pub use error::{InvalidMove, WorkspaceError, WorkspaceResult};
pub use folders::FolderService;
pub use gate::MembershipGate;
pub use posts::PostService;
pub use quota::QuotaEnforcer;
pub use sanitizer::{strip_tags, ContentSanitizer, HtmlSanitizer, SanitizeError};
pub use store::{
    MemoryStore, PostWrite, StoreError, StoreResult, SubtreeRemoval, UniqueField, WorkspaceStore,
};
pub use workspaces::WorkspaceService;

pub use quire_rbac::{Action, Grant, ResourceType};

/// All services built over one shared context.
#[derive(Debug, Clone)]
pub struct QuireCore {
    context: CoreContext,
    folders: FolderService,
    posts: PostService,
    workspaces: WorkspaceService,
    accounts: AccountService,
}

impl QuireCore {
    /// Build the services over the given context.
    pub fn new(context: CoreContext) -> Self {
        Self {
            folders: FolderService::new(context.clone()),
            posts: PostService::new(context.clone()),
            workspaces: WorkspaceService::new(context.clone()),
            accounts: AccountService::new(context.clone()),
            context,
        }
    }

    /// Build over in-memory collaborators and the HTML sanitizer.
    pub fn in_memory(config: CoreConfig) -> Self {
        Self::new(CoreContext::new(
            config,
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryUserDirectory::new()),
            Arc::new(HtmlSanitizer::new()),
            Arc::new(MemoryBlobStore::new()),
        ))
    }

    /// Shared context.
    pub fn context(&self) -> &CoreContext {
        &self.context
    }

    /// Membership gate.
    pub fn gate(&self) -> &MembershipGate {
        &self.context.gate
    }

    /// Folder tree operations.
    pub fn folders(&self) -> &FolderService {
        &self.folders
    }

    /// Post operations.
    pub fn posts(&self) -> &PostService {
        &self.posts
    }

    /// Workspace and membership operations.
    pub fn workspaces(&self) -> &WorkspaceService {
        &self.workspaces
    }

    /// Account operations.
    pub fn accounts(&self) -> &AccountService {
        &self.accounts
    }
}
