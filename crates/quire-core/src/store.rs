//! Workspace storage
//!
//! This module provides the storage abstraction for workspaces, memberships,
//! folders and posts, and an in-memory implementation.
//!
//! Every method is atomic on its own. Operations that touch several records
//! at once (workspace plus owner membership, subtree delete, workspace
//! cascade, post compare-and-swap) are single methods so a backend can wrap
//! each in one transaction.

use async_trait::async_trait;
use quire_org::{Folder, Membership, Post, PostEdit, Workspace, WorkspaceKind, WorkspaceRole};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Storage error types.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not be reached or failed mid-operation
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// A uniqueness constraint was violated
    #[error("Unique constraint violated: {0}")]
    Conflict(String),

    /// A user field that must be unique is already held by another user
    #[error("Duplicate user {0}")]
    Duplicate(UniqueField),
}

/// User fields with a uniqueness constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniqueField {
    /// Email address
    Email,
    /// Nickname
    Nickname,
    /// Local login id
    LoginId,
}

impl std::fmt::Display for UniqueField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UniqueField::Email => f.write_str("email"),
            UniqueField::Nickname => f.write_str("nickname"),
            UniqueField::LoginId => f.write_str("login_id"),
        }
    }
}

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Outcome of a versioned post write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostWrite {
    /// The edit was applied; holds the post at its new version
    Applied(Post),
    /// The stored version differs from the expected one; nothing was written
    Stale {
        /// Version currently stored
        actual: u64,
    },
    /// No such post
    Missing,
}

/// Counts of records removed by a subtree delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubtreeRemoval {
    /// Folders removed, including the subtree root
    pub folders: usize,
    /// Posts removed
    pub posts: usize,
}

/// Storage trait for workspace records.
#[async_trait]
pub trait WorkspaceStore: Send + Sync {
    // Workspaces

    /// Find a workspace by ID.
    async fn find_workspace(&self, id: Uuid) -> StoreResult<Option<Workspace>>;

    /// Create a workspace together with its owner membership.
    async fn create_workspace(&self, workspace: Workspace, owner: Membership) -> StoreResult<()>;

    /// Overwrite a workspace's name, description and timestamps.
    async fn update_workspace(&self, workspace: Workspace) -> StoreResult<()>;

    /// Delete a workspace with all of its memberships, folders and posts.
    async fn delete_workspace(&self, id: Uuid) -> StoreResult<()>;

    // Memberships

    /// Find the membership joining a user to a workspace.
    async fn find_membership(&self, workspace_id: Uuid, user_id: Uuid) -> StoreResult<Option<Membership>>;

    /// Find a membership by its own ID.
    async fn find_membership_by_id(&self, id: Uuid) -> StoreResult<Option<Membership>>;

    /// All memberships of a workspace.
    async fn list_workspace_memberships(&self, workspace_id: Uuid) -> StoreResult<Vec<Membership>>;

    /// All memberships of a user.
    async fn list_user_memberships(&self, user_id: Uuid) -> StoreResult<Vec<Membership>>;

    /// Insert a membership. Fails with [`StoreError::Conflict`] if the user
    /// already belongs to the workspace.
    async fn insert_membership(&self, membership: Membership) -> StoreResult<()>;

    /// Overwrite a membership's role.
    async fn update_membership(&self, membership: Membership) -> StoreResult<()>;

    /// Delete a membership.
    async fn delete_membership(&self, id: Uuid) -> StoreResult<()>;

    /// Number of memberships in a workspace.
    async fn count_memberships(&self, workspace_id: Uuid) -> StoreResult<u64>;

    /// Number of team workspaces the user owns.
    async fn count_owned_team_workspaces(&self, user_id: Uuid) -> StoreResult<u64>;

    // Folders

    /// Find a folder by ID.
    async fn find_folder(&self, id: Uuid) -> StoreResult<Option<Folder>>;

    /// All folders of a workspace.
    async fn list_folders(&self, workspace_id: Uuid) -> StoreResult<Vec<Folder>>;

    /// Insert a folder.
    async fn insert_folder(&self, folder: Folder) -> StoreResult<()>;

    /// Overwrite a folder's name and parent.
    async fn update_folder(&self, folder: Folder) -> StoreResult<()>;

    /// Delete a folder, every descendant folder and every post filed in them.
    async fn delete_folder_subtree(&self, id: Uuid) -> StoreResult<SubtreeRemoval>;

    /// Number of folders in a workspace.
    async fn count_folders(&self, workspace_id: Uuid) -> StoreResult<u64>;

    // Posts

    /// Find a post by ID.
    async fn find_post(&self, id: Uuid) -> StoreResult<Option<Post>>;

    /// All posts of a workspace.
    async fn list_posts(&self, workspace_id: Uuid) -> StoreResult<Vec<Post>>;

    /// Insert a post.
    async fn insert_post(&self, post: Post) -> StoreResult<()>;

    /// Apply an edit if the stored version equals `expected_version`.
    ///
    /// With `expected_version` of `None` the edit is applied unconditionally.
    /// The comparison and the write happen under one lock.
    async fn update_post_versioned(
        &self,
        id: Uuid,
        expected_version: Option<u64>,
        edit: PostEdit,
    ) -> StoreResult<PostWrite>;

    /// File a post in another folder without touching its version.
    async fn relocate_post(&self, id: Uuid, folder_id: Option<Uuid>) -> StoreResult<Option<Post>>;

    /// Delete a post. Returns whether it existed.
    async fn delete_post(&self, id: Uuid) -> StoreResult<bool>;

    /// Number of posts in a workspace.
    async fn count_posts(&self, workspace_id: Uuid) -> StoreResult<u64>;
}

/// Records held by [`MemoryStore`], guarded by a single lock.
#[derive(Debug, Default)]
struct MemoryState {
    workspaces: HashMap<Uuid, Workspace>,
    memberships: HashMap<Uuid, Membership>,
    folders: HashMap<Uuid, Folder>,
    posts: HashMap<Uuid, Post>,
    /// workspace_id -> parent_id -> child folder ids
    children: HashMap<Uuid, HashMap<Option<Uuid>, Vec<Uuid>>>,
}

impl MemoryState {
    fn link(&mut self, folder: &Folder) {
        self.children
            .entry(folder.workspace_id)
            .or_default()
            .entry(folder.parent_id)
            .or_default()
            .push(folder.id);
    }

    fn unlink(&mut self, workspace_id: Uuid, parent_id: Option<Uuid>, folder_id: Uuid) {
        if let Some(by_parent) = self.children.get_mut(&workspace_id) {
            if let Some(ids) = by_parent.get_mut(&parent_id) {
                ids.retain(|id| *id != folder_id);
                if ids.is_empty() {
                    by_parent.remove(&parent_id);
                }
            }
        }
    }

    fn child_ids(&self, workspace_id: Uuid, parent_id: Option<Uuid>) -> &[Uuid] {
        self.children
            .get(&workspace_id)
            .and_then(|by_parent| by_parent.get(&parent_id))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The folder and all of its descendants, parents before children.
    fn subtree(&self, workspace_id: Uuid, root: Uuid) -> Vec<Uuid> {
        let mut collected = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if collected.contains(&id) {
                continue;
            }
            collected.push(id);
            stack.extend_from_slice(self.child_ids(workspace_id, Some(id)));
        }
        collected
    }
}

/// In-memory workspace store.
///
/// Suitable for tests and single-process embedding. Keeps a
/// `workspace -> parent -> children` index so subtree operations do not
/// scan every folder.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore").finish_non_exhaustive()
    }
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Child folder IDs of `parent_id` (or the roots, for `None`), in
    /// insertion order.
    pub async fn child_folder_ids(&self, workspace_id: Uuid, parent_id: Option<Uuid>) -> Vec<Uuid> {
        let state = self.state.read().await;
        state.child_ids(workspace_id, parent_id).to_vec()
    }
}

#[async_trait]
impl WorkspaceStore for MemoryStore {
    async fn find_workspace(&self, id: Uuid) -> StoreResult<Option<Workspace>> {
        Ok(self.state.read().await.workspaces.get(&id).cloned())
    }

    async fn create_workspace(&self, workspace: Workspace, owner: Membership) -> StoreResult<()> {
        if owner.workspace_id != workspace.id || owner.role != WorkspaceRole::Owner {
            return Err(StoreError::Conflict(
                "owner membership does not match workspace".to_string(),
            ));
        }
        let mut state = self.state.write().await;
        if state.workspaces.contains_key(&workspace.id) {
            return Err(StoreError::Conflict(format!("workspace {} exists", workspace.id)));
        }
        state.memberships.insert(owner.id, owner);
        state.workspaces.insert(workspace.id, workspace);
        Ok(())
    }

    async fn update_workspace(&self, workspace: Workspace) -> StoreResult<()> {
        let mut state = self.state.write().await;
        state.workspaces.insert(workspace.id, workspace);
        Ok(())
    }

    async fn delete_workspace(&self, id: Uuid) -> StoreResult<()> {
        let mut state = self.state.write().await;
        state.workspaces.remove(&id);
        state.memberships.retain(|_, m| m.workspace_id != id);
        state.folders.retain(|_, f| f.workspace_id != id);
        state.posts.retain(|_, p| p.workspace_id != id);
        state.children.remove(&id);
        Ok(())
    }

    async fn find_membership(&self, workspace_id: Uuid, user_id: Uuid) -> StoreResult<Option<Membership>> {
        let state = self.state.read().await;
        Ok(state
            .memberships
            .values()
            .find(|m| m.workspace_id == workspace_id && m.user_id == user_id)
            .cloned())
    }

    async fn find_membership_by_id(&self, id: Uuid) -> StoreResult<Option<Membership>> {
        Ok(self.state.read().await.memberships.get(&id).cloned())
    }

    async fn list_workspace_memberships(&self, workspace_id: Uuid) -> StoreResult<Vec<Membership>> {
        let state = self.state.read().await;
        Ok(state
            .memberships
            .values()
            .filter(|m| m.workspace_id == workspace_id)
            .cloned()
            .collect())
    }

    async fn list_user_memberships(&self, user_id: Uuid) -> StoreResult<Vec<Membership>> {
        let state = self.state.read().await;
        Ok(state
            .memberships
            .values()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn insert_membership(&self, membership: Membership) -> StoreResult<()> {
        let mut state = self.state.write().await;
        let duplicate = state
            .memberships
            .values()
            .any(|m| m.workspace_id == membership.workspace_id && m.user_id == membership.user_id);
        if duplicate {
            return Err(StoreError::Conflict(format!(
                "user {} already in workspace {}",
                membership.user_id, membership.workspace_id
            )));
        }
        state.memberships.insert(membership.id, membership);
        Ok(())
    }

    async fn update_membership(&self, membership: Membership) -> StoreResult<()> {
        let mut state = self.state.write().await;
        state.memberships.insert(membership.id, membership);
        Ok(())
    }

    async fn delete_membership(&self, id: Uuid) -> StoreResult<()> {
        self.state.write().await.memberships.remove(&id);
        Ok(())
    }

    async fn count_memberships(&self, workspace_id: Uuid) -> StoreResult<u64> {
        let state = self.state.read().await;
        Ok(state
            .memberships
            .values()
            .filter(|m| m.workspace_id == workspace_id)
            .count() as u64)
    }

    async fn count_owned_team_workspaces(&self, user_id: Uuid) -> StoreResult<u64> {
        let state = self.state.read().await;
        Ok(state
            .memberships
            .values()
            .filter(|m| m.user_id == user_id && m.is_owner())
            .filter(|m| {
                state
                    .workspaces
                    .get(&m.workspace_id)
                    .is_some_and(|w| w.kind == WorkspaceKind::Team)
            })
            .count() as u64)
    }

    async fn find_folder(&self, id: Uuid) -> StoreResult<Option<Folder>> {
        Ok(self.state.read().await.folders.get(&id).cloned())
    }

    async fn list_folders(&self, workspace_id: Uuid) -> StoreResult<Vec<Folder>> {
        let state = self.state.read().await;
        Ok(state
            .folders
            .values()
            .filter(|f| f.workspace_id == workspace_id)
            .cloned()
            .collect())
    }

    async fn insert_folder(&self, folder: Folder) -> StoreResult<()> {
        let mut state = self.state.write().await;
        state.link(&folder);
        state.folders.insert(folder.id, folder);
        Ok(())
    }

    async fn update_folder(&self, folder: Folder) -> StoreResult<()> {
        let mut state = self.state.write().await;
        let previous_parent = state.folders.get(&folder.id).map(|f| f.parent_id);
        match previous_parent {
            Some(parent) if parent != folder.parent_id => {
                state.unlink(folder.workspace_id, parent, folder.id);
                state.link(&folder);
            }
            Some(_) => {}
            None => state.link(&folder),
        }
        state.folders.insert(folder.id, folder);
        Ok(())
    }

    async fn delete_folder_subtree(&self, id: Uuid) -> StoreResult<SubtreeRemoval> {
        let mut state = self.state.write().await;
        let Some(root) = state.folders.get(&id).cloned() else {
            return Ok(SubtreeRemoval::default());
        };

        let doomed = state.subtree(root.workspace_id, id);
        let posts_before = state.posts.len();
        state
            .posts
            .retain(|_, p| !p.folder_id.is_some_and(|f| doomed.contains(&f)));
        let posts = posts_before - state.posts.len();

        state.unlink(root.workspace_id, root.parent_id, id);
        for folder_id in &doomed {
            state.folders.remove(folder_id);
            if let Some(by_parent) = state.children.get_mut(&root.workspace_id) {
                by_parent.remove(&Some(*folder_id));
            }
        }

        Ok(SubtreeRemoval {
            folders: doomed.len(),
            posts,
        })
    }

    async fn count_folders(&self, workspace_id: Uuid) -> StoreResult<u64> {
        let state = self.state.read().await;
        Ok(state
            .folders
            .values()
            .filter(|f| f.workspace_id == workspace_id)
            .count() as u64)
    }

    async fn find_post(&self, id: Uuid) -> StoreResult<Option<Post>> {
        Ok(self.state.read().await.posts.get(&id).cloned())
    }

    async fn list_posts(&self, workspace_id: Uuid) -> StoreResult<Vec<Post>> {
        let state = self.state.read().await;
        Ok(state
            .posts
            .values()
            .filter(|p| p.workspace_id == workspace_id)
            .cloned()
            .collect())
    }

    async fn insert_post(&self, post: Post) -> StoreResult<()> {
        self.state.write().await.posts.insert(post.id, post);
        Ok(())
    }

    async fn update_post_versioned(
        &self,
        id: Uuid,
        expected_version: Option<u64>,
        edit: PostEdit,
    ) -> StoreResult<PostWrite> {
        let mut state = self.state.write().await;
        let Some(post) = state.posts.get_mut(&id) else {
            return Ok(PostWrite::Missing);
        };
        if let Some(expected) = expected_version {
            if post.version != expected {
                return Ok(PostWrite::Stale {
                    actual: post.version,
                });
            }
        }
        post.apply_edit(edit);
        Ok(PostWrite::Applied(post.clone()))
    }

    async fn relocate_post(&self, id: Uuid, folder_id: Option<Uuid>) -> StoreResult<Option<Post>> {
        let mut state = self.state.write().await;
        Ok(state.posts.get_mut(&id).map(|post| {
            post.move_to(folder_id);
            post.clone()
        }))
    }

    async fn delete_post(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.state.write().await.posts.remove(&id).is_some())
    }

    async fn count_posts(&self, workspace_id: Uuid) -> StoreResult<u64> {
        let state = self.state.read().await;
        Ok(state
            .posts
            .values()
            .filter(|p| p.workspace_id == workspace_id)
            .count() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store_with_workspace() -> (MemoryStore, Workspace, Uuid) {
        let store = MemoryStore::new();
        let owner = Uuid::now_v7();
        let workspace = Workspace::team("Team", None);
        store
            .create_workspace(workspace.clone(), Membership::owner(workspace.id, owner))
            .await
            .unwrap();
        (store, workspace, owner)
    }

    #[tokio::test]
    async fn test_create_workspace_with_owner() {
        let (store, workspace, owner) = store_with_workspace().await;

        let membership = store.find_membership(workspace.id, owner).await.unwrap().unwrap();
        assert!(membership.is_owner());
        assert_eq!(store.count_owned_team_workspaces(owner).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_create_workspace_rejects_mismatched_owner() {
        let store = MemoryStore::new();
        let workspace = Workspace::team("Team", None);
        let wrong = Membership::owner(Uuid::now_v7(), Uuid::now_v7());

        assert!(store.create_workspace(workspace.clone(), wrong).await.is_err());
        assert!(store.find_workspace(workspace.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_membership_conflicts() {
        let (store, workspace, _) = store_with_workspace().await;
        let user = Uuid::now_v7();

        store
            .insert_membership(Membership::new(workspace.id, user, WorkspaceRole::Member))
            .await
            .unwrap();
        let second = store
            .insert_membership(Membership::new(workspace.id, user, WorkspaceRole::Viewer))
            .await;

        assert!(matches!(second, Err(StoreError::Conflict(_))));
        assert_eq!(store.count_memberships(workspace.id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_index_follows_folder_moves() {
        let (store, workspace, owner) = store_with_workspace().await;
        let a = Folder::new(workspace.id, owner, "A", None);
        let mut b = Folder::new(workspace.id, owner, "B", None);
        store.insert_folder(a.clone()).await.unwrap();
        store.insert_folder(b.clone()).await.unwrap();

        b.move_to(Some(a.id));
        store.update_folder(b.clone()).await.unwrap();

        assert_eq!(store.child_folder_ids(workspace.id, None).await, vec![a.id]);
        assert_eq!(store.child_folder_ids(workspace.id, Some(a.id)).await, vec![b.id]);
    }

    #[tokio::test]
    async fn test_subtree_delete_takes_posts() {
        let (store, workspace, owner) = store_with_workspace().await;
        let a = Folder::new(workspace.id, owner, "A", None);
        let b = Folder::new(workspace.id, owner, "B", Some(a.id));
        let c = Folder::new(workspace.id, owner, "C", Some(b.id));
        let keep = Folder::new(workspace.id, owner, "Keep", None);
        for folder in [&a, &b, &c, &keep] {
            store.insert_folder(folder.clone()).await.unwrap();
        }
        store
            .insert_post(Post::new(workspace.id, owner, Some(c.id), "deep", ""))
            .await
            .unwrap();
        store
            .insert_post(Post::new(workspace.id, owner, Some(keep.id), "kept", ""))
            .await
            .unwrap();
        store
            .insert_post(Post::new(workspace.id, owner, None, "root", ""))
            .await
            .unwrap();

        let removed = store.delete_folder_subtree(a.id).await.unwrap();

        assert_eq!(removed, SubtreeRemoval { folders: 3, posts: 1 });
        assert_eq!(store.count_folders(workspace.id).await.unwrap(), 1);
        assert_eq!(store.count_posts(workspace.id).await.unwrap(), 2);
        assert_eq!(store.child_folder_ids(workspace.id, None).await, vec![keep.id]);
    }

    #[tokio::test]
    async fn test_versioned_update() {
        let (store, workspace, owner) = store_with_workspace().await;
        let post = Post::new(workspace.id, owner, None, "T", "C");
        store.insert_post(post.clone()).await.unwrap();

        let edit = PostEdit {
            title: Some("T2".into()),
            content: None,
        };
        let applied = store
            .update_post_versioned(post.id, Some(0), edit.clone())
            .await
            .unwrap();
        assert!(matches!(applied, PostWrite::Applied(ref p) if p.version == 1));

        let stale = store.update_post_versioned(post.id, Some(0), edit).await.unwrap();
        assert_eq!(stale, PostWrite::Stale { actual: 1 });

        let missing = store
            .update_post_versioned(Uuid::now_v7(), None, PostEdit::default())
            .await
            .unwrap();
        assert_eq!(missing, PostWrite::Missing);
    }

    #[tokio::test]
    async fn test_delete_workspace_cascades() {
        let (store, workspace, owner) = store_with_workspace().await;
        let folder = Folder::new(workspace.id, owner, "A", None);
        store.insert_folder(folder.clone()).await.unwrap();
        store
            .insert_post(Post::new(workspace.id, owner, Some(folder.id), "T", ""))
            .await
            .unwrap();

        store.delete_workspace(workspace.id).await.unwrap();

        assert!(store.find_workspace(workspace.id).await.unwrap().is_none());
        assert_eq!(store.count_memberships(workspace.id).await.unwrap(), 0);
        assert_eq!(store.count_folders(workspace.id).await.unwrap(), 0);
        assert_eq!(store.count_posts(workspace.id).await.unwrap(), 0);
        assert!(store.child_folder_ids(workspace.id, None).await.is_empty());
    }
}
