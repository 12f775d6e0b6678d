//! Folder tree management.
//!
//! Folders only store their `parent_id`. A move is checked for cycles by
//! walking parent pointers upward from the destination: if the walk reaches
//! the folder being moved, the destination lies inside its subtree.
//!
//! The walk and the reassignment are not one atomic step. Two concurrent
//! moves over the same subtree can each pass the check; callers are expected
//! to serialize moves per folder.

use quire_org::{Folder, FolderNode, Post, PostSummary, WorkspaceTree};
use quire_rbac::{Action, ResourceType};
use std::collections::{HashMap, HashSet};
use tracing::{info, warn};
use uuid::Uuid;

use crate::context::CoreContext;
use crate::error::{InvalidMove, WorkspaceError, WorkspaceResult};
use crate::validation::required_text;

/// Creates, renames, deletes, moves and lists folders.
#[derive(Debug, Clone)]
pub struct FolderService {
    ctx: CoreContext,
}

impl FolderService {
    /// Create a folder service.
    pub fn new(ctx: CoreContext) -> Self {
        Self { ctx }
    }

    /// Load a folder, treating folders of other workspaces as absent.
    pub(crate) async fn folder_in_workspace(&self, workspace_id: Uuid, folder_id: Uuid) -> WorkspaceResult<Folder> {
        find_folder_in(&self.ctx, workspace_id, folder_id).await
    }

    /// Create a folder at the root or under `parent_id`.
    ///
    /// # Errors
    ///
    /// - gate errors, or `InsufficientPermission` below Member
    /// - `LimitExceeded(Folders)` at the folder ceiling
    /// - `InvalidInput` for a blank or overlong name
    /// - `NotFound(Folder)` if the parent is not in this workspace
    pub async fn create(
        &self,
        workspace_id: Uuid,
        actor: Uuid,
        name: &str,
        parent_id: Option<Uuid>,
    ) -> WorkspaceResult<Folder> {
        self.ctx.gate.authorize(actor, workspace_id, Action::Write).await?;
        self.ctx.quota.ensure_folder_headroom(workspace_id).await?;
        required_text("folder name", name, self.ctx.config.fields.folder_name)?;
        if let Some(parent_id) = parent_id {
            self.folder_in_workspace(workspace_id, parent_id).await?;
        }

        let folder = Folder::new(workspace_id, actor, name, parent_id);
        self.ctx.store.insert_folder(folder.clone()).await?;

        info!(
            folder_id = %folder.id,
            workspace_id = %workspace_id,
            parent_id = ?parent_id,
            "Created folder"
        );
        Ok(folder)
    }

    /// Rename a folder. `None` leaves the name unchanged.
    pub async fn rename(
        &self,
        workspace_id: Uuid,
        actor: Uuid,
        folder_id: Uuid,
        name: Option<&str>,
    ) -> WorkspaceResult<Folder> {
        self.ctx.gate.authorize(actor, workspace_id, Action::Write).await?;
        let mut folder = self.folder_in_workspace(workspace_id, folder_id).await?;

        if let Some(name) = name {
            required_text("folder name", name, self.ctx.config.fields.folder_name)?;
            folder.rename(name);
            self.ctx.store.update_folder(folder.clone()).await?;
            info!(folder_id = %folder_id, workspace_id = %workspace_id, "Renamed folder");
        }
        Ok(folder)
    }

    /// Delete a folder with every descendant folder and every post in them.
    pub async fn delete(&self, workspace_id: Uuid, actor: Uuid, folder_id: Uuid) -> WorkspaceResult<()> {
        self.ctx.gate.authorize(actor, workspace_id, Action::Write).await?;
        self.folder_in_workspace(workspace_id, folder_id).await?;

        let removed = self.ctx.store.delete_folder_subtree(folder_id).await?;
        info!(
            folder_id = %folder_id,
            workspace_id = %workspace_id,
            folders = removed.folders,
            posts = removed.posts,
            "Deleted folder subtree"
        );
        Ok(())
    }

    /// Move a folder under `new_parent_id`, or to the root for `None`.
    ///
    /// # Errors
    ///
    /// - `NotFound(Folder)` if either folder is not in this workspace
    /// - `InvalidMove(SelfMove)` if the destination is the folder itself
    /// - `InvalidMove(IntoDescendant)` if the destination is in its subtree
    pub async fn move_folder(
        &self,
        workspace_id: Uuid,
        actor: Uuid,
        folder_id: Uuid,
        new_parent_id: Option<Uuid>,
    ) -> WorkspaceResult<Folder> {
        self.ctx.gate.authorize(actor, workspace_id, Action::Write).await?;
        let mut folder = self.folder_in_workspace(workspace_id, folder_id).await?;

        if let Some(target_id) = new_parent_id {
            if target_id == folder_id {
                warn!(folder_id = %folder_id, "Rejected move into self");
                return Err(WorkspaceError::InvalidMove(InvalidMove::SelfMove));
            }
            let target = self.folder_in_workspace(workspace_id, target_id).await?;
            if self.is_ancestor_of(folder_id, &target).await? {
                warn!(folder_id = %folder_id, target_id = %target_id, "Rejected move into descendant");
                return Err(WorkspaceError::InvalidMove(InvalidMove::IntoDescendant));
            }
        }

        folder.move_to(new_parent_id);
        self.ctx.store.update_folder(folder.clone()).await?;

        info!(
            folder_id = %folder_id,
            workspace_id = %workspace_id,
            parent_id = ?new_parent_id,
            "Moved folder"
        );
        Ok(folder)
    }

    /// Walk up from `start` and report whether `ancestor_id` is on the path.
    async fn is_ancestor_of(&self, ancestor_id: Uuid, start: &Folder) -> WorkspaceResult<bool> {
        let mut visited = HashSet::new();
        let mut current = start.parent_id;
        while let Some(id) = current {
            if id == ancestor_id {
                return Ok(true);
            }
            if !visited.insert(id) {
                return Err(WorkspaceError::Infrastructure(format!(
                    "folder parent chain loops at {id}"
                )));
            }
            current = match self.ctx.store.find_folder(id).await? {
                Some(folder) => folder.parent_id,
                None => None,
            };
        }
        Ok(false)
    }

    /// The workspace's folder forest with the posts filed in each folder,
    /// plus the unfiled posts. Any member may read it.
    pub async fn tree(&self, workspace_id: Uuid, actor: Uuid) -> WorkspaceResult<WorkspaceTree> {
        self.ctx.gate.authorize(actor, workspace_id, Action::Read).await?;
        let folders = self.ctx.store.list_folders(workspace_id).await?;
        let posts = self.ctx.store.list_posts(workspace_id).await?;
        Ok(build_tree(folders, posts))
    }
}

pub(crate) async fn find_folder_in(ctx: &CoreContext, workspace_id: Uuid, folder_id: Uuid) -> WorkspaceResult<Folder> {
    ctx.store
        .find_folder(folder_id)
        .await?
        .filter(|f| f.workspace_id == workspace_id)
        .ok_or(WorkspaceError::NotFound(ResourceType::Folder))
}

/// Assemble folders and posts into a forest. Siblings and posts are ordered
/// by ID, which is creation order for v7 IDs.
fn build_tree(mut folders: Vec<Folder>, mut posts: Vec<Post>) -> WorkspaceTree {
    folders.sort_by_key(|f| f.id);
    posts.sort_by_key(|p| p.id);

    let known: HashSet<Uuid> = folders.iter().map(|f| f.id).collect();
    let mut root_posts = Vec::new();
    let mut posts_by_folder: HashMap<Uuid, Vec<PostSummary>> = HashMap::new();
    for post in &posts {
        match post.folder_id {
            Some(folder_id) if known.contains(&folder_id) => {
                posts_by_folder.entry(folder_id).or_default().push(PostSummary::from(post))
            }
            _ => root_posts.push(PostSummary::from(post)),
        }
    }

    // A folder whose parent is missing is shown at the root rather than lost
    let mut children: HashMap<Uuid, Vec<&Folder>> = HashMap::new();
    let mut roots = Vec::new();
    for folder in &folders {
        match folder.parent_id {
            Some(parent) if known.contains(&parent) => children.entry(parent).or_default().push(folder),
            _ => roots.push(folder),
        }
    }

    let folders = roots
        .into_iter()
        .map(|root| build_node(root, &children, &mut posts_by_folder))
        .collect();

    WorkspaceTree { folders, root_posts }
}

fn build_node(
    folder: &Folder,
    children: &HashMap<Uuid, Vec<&Folder>>,
    posts_by_folder: &mut HashMap<Uuid, Vec<PostSummary>>,
) -> FolderNode {
    let posts = posts_by_folder.remove(&folder.id).unwrap_or_default();
    let mut node = FolderNode::new(folder, posts);
    if let Some(kids) = children.get(&folder.id) {
        node.children = kids
            .iter()
            .map(|child| build_node(child, children, posts_by_folder))
            .collect();
    }
    node
}
