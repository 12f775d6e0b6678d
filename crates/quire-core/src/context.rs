//! Shared service context.
//!
//! Bundles configuration, collaborators, the membership gate and the quota
//! enforcer so every service is built from the same instances.

use std::sync::Arc;

use crate::blob::BlobStore;
use crate::config::CoreConfig;
use crate::directory::UserDirectory;
use crate::gate::MembershipGate;
use crate::quota::QuotaEnforcer;
use crate::sanitizer::ContentSanitizer;
use crate::store::WorkspaceStore;

/// Collaborators and policy shared by all services.
#[derive(Clone)]
pub struct CoreContext {
    /// Configuration
    pub config: Arc<CoreConfig>,
    /// Workspace, membership, folder and post storage
    pub store: Arc<dyn WorkspaceStore>,
    /// User accounts
    pub users: Arc<dyn UserDirectory>,
    /// Post content sanitizer
    pub sanitizer: Arc<dyn ContentSanitizer>,
    /// Profile image storage
    pub blobs: Arc<dyn BlobStore>,
    /// Membership gate
    pub gate: MembershipGate,
    /// Quota enforcer
    pub quota: QuotaEnforcer,
}

impl std::fmt::Debug for CoreContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreContext")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl CoreContext {
    /// Build a context, deriving the gate and quota enforcer from the store.
    pub fn new(
        config: CoreConfig,
        store: Arc<dyn WorkspaceStore>,
        users: Arc<dyn UserDirectory>,
        sanitizer: Arc<dyn ContentSanitizer>,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        let gate = MembershipGate::new(store.clone(), users.clone());
        let quota = QuotaEnforcer::new(store.clone(), config.limits);
        Self {
            config: Arc::new(config),
            store,
            users,
            sanitizer,
            blobs,
            gate,
            quota,
        }
    }
}
