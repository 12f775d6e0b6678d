//! Fixtures for unit tests.

use quire_org::{Membership, QuotaLimits, User, Workspace, WorkspaceKind, WorkspaceRole};
use std::sync::Arc;

use crate::{
    ContentSanitizer, CoreConfig, CoreContext, MemoryBlobStore, MemoryStore, MemoryUserDirectory,
    QuireCore,
};

pub(crate) fn core() -> QuireCore {
    QuireCore::in_memory(CoreConfig::default())
}

fn core_with(config: CoreConfig, sanitizer: Arc<dyn ContentSanitizer>) -> QuireCore {
    QuireCore::new(CoreContext::new(
        config,
        Arc::new(MemoryStore::new()),
        Arc::new(MemoryUserDirectory::new()),
        sanitizer,
        Arc::new(MemoryBlobStore::new()),
    ))
}

/// Register a local user named `name` with email `{name}@example.com`.
pub(crate) async fn user(core: &QuireCore, name: &str) -> User {
    core.accounts()
        .register_local(&format!("{name}@example.com"), name, name)
        .await
        .unwrap()
}

pub(crate) async fn team(core: &QuireCore, owner: &User, name: &str) -> Workspace {
    core.workspaces().create(owner.id, name, None).await.unwrap()
}

/// The user's personal workspace.
pub(crate) async fn personal(core: &QuireCore, user: &User) -> Workspace {
    let summary = core
        .workspaces()
        .list_mine(user.id)
        .await
        .unwrap()
        .into_iter()
        .find(|s| s.kind == WorkspaceKind::Personal)
        .unwrap();
    core.context().store.find_workspace(summary.id).await.unwrap().unwrap()
}

/// Register a user and add them to `workspace` with `role`, bypassing
/// invitation checks.
pub(crate) async fn member(core: &QuireCore, workspace: &Workspace, name: &str, role: WorkspaceRole) -> User {
    let user = user(core, name).await;
    core.context()
        .store
        .insert_membership(Membership::new(workspace.id, user.id, role))
        .await
        .unwrap();
    user
}

pub(crate) async fn membership_of(core: &QuireCore, workspace: &Workspace, user: &User) -> Membership {
    core.context()
        .store
        .find_membership(workspace.id, user.id)
        .await
        .unwrap()
        .unwrap()
}

async fn setup(core: QuireCore) -> (QuireCore, User, Workspace) {
    let owner = user(&core, "owner").await;
    let workspace = team(&core, &owner, "Team").await;
    (core, owner, workspace)
}

/// A core with one owner and one team workspace.
pub(crate) async fn team_setup() -> (QuireCore, User, Workspace) {
    setup(core()).await
}

pub(crate) async fn team_setup_with(limits: QuotaLimits) -> (QuireCore, User, Workspace) {
    let config = CoreConfig {
        limits,
        ..CoreConfig::default()
    };
    setup(core_with(config, Arc::new(crate::HtmlSanitizer::new()))).await
}

pub(crate) async fn team_setup_with_sanitizer(sanitizer: Arc<dyn ContentSanitizer>) -> (QuireCore, User, Workspace) {
    setup(core_with(CoreConfig::default(), sanitizer)).await
}
