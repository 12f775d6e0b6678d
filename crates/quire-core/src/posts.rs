//! Post lifecycle with optimistic versioning.
//!
//! A post starts at version 0 and every accepted title or content update
//! advances it by one. An update may carry the version the caller last
//! read; the store compares and writes in one step, so of two writers that
//! read the same version only the first succeeds.

use quire_org::{Post, PostEdit, PostView};
use quire_rbac::{Action, ResourceType};
use tracing::{info, warn};
use uuid::Uuid;

use crate::context::CoreContext;
use crate::error::{WorkspaceError, WorkspaceResult};
use crate::folders::find_folder_in;
use crate::sanitizer::strip_tags;
use crate::store::PostWrite;
use crate::validation::required_text;

/// Creates, edits, moves, deletes and reads posts.
#[derive(Debug, Clone)]
pub struct PostService {
    ctx: CoreContext,
}

impl PostService {
    /// Create a post service.
    pub fn new(ctx: CoreContext) -> Self {
        Self { ctx }
    }

    /// Sanitize post content, stripping every tag if the sanitizer fails.
    fn clean(&self, raw: &str) -> String {
        match self.ctx.sanitizer.sanitize(raw) {
            Ok(clean) => clean,
            Err(e) => {
                warn!(error = %e, "Sanitizer failed, stripping all tags");
                strip_tags(raw)
            }
        }
    }

    async fn post_in_workspace(&self, workspace_id: Uuid, post_id: Uuid) -> WorkspaceResult<Post> {
        self.ctx
            .store
            .find_post(post_id)
            .await?
            .filter(|p| p.workspace_id == workspace_id)
            .ok_or(WorkspaceError::NotFound(ResourceType::Post))
    }

    /// Create a post at version 0, filed under `folder_id` or unfiled.
    ///
    /// # Errors
    ///
    /// - gate errors, or `InsufficientPermission` below Member
    /// - `LimitExceeded(Posts)` at the post ceiling
    /// - `InvalidInput` for a blank or overlong title
    /// - `NotFound(Folder)` if the folder is not in this workspace
    pub async fn create(
        &self,
        workspace_id: Uuid,
        actor: Uuid,
        title: &str,
        content: &str,
        folder_id: Option<Uuid>,
    ) -> WorkspaceResult<Post> {
        self.ctx.gate.authorize(actor, workspace_id, Action::Write).await?;
        self.ctx.quota.ensure_post_headroom(workspace_id).await?;
        required_text("post title", title, self.ctx.config.fields.post_title)?;
        if let Some(folder_id) = folder_id {
            find_folder_in(&self.ctx, workspace_id, folder_id).await?;
        }

        let post = Post::new(workspace_id, actor, folder_id, title, self.clean(content));
        self.ctx.store.insert_post(post.clone()).await?;

        info!(
            post_id = %post.id,
            workspace_id = %workspace_id,
            folder_id = ?folder_id,
            "Created post"
        );
        Ok(post)
    }

    /// Update a post's title and/or content.
    ///
    /// With `expected_version` set, the update only applies if the stored
    /// version still matches. Without it the update always applies. Either
    /// way a successful update advances the version by one.
    ///
    /// # Errors
    ///
    /// - `NotFound(Post)` if the post is not in this workspace
    /// - `VersionConflict` if `expected_version` is stale; nothing changes
    pub async fn update(
        &self,
        workspace_id: Uuid,
        actor: Uuid,
        post_id: Uuid,
        title: Option<&str>,
        content: Option<&str>,
        expected_version: Option<u64>,
    ) -> WorkspaceResult<Post> {
        self.ctx.gate.authorize(actor, workspace_id, Action::Write).await?;
        self.post_in_workspace(workspace_id, post_id).await?;
        if let Some(title) = title {
            required_text("post title", title, self.ctx.config.fields.post_title)?;
        }

        let edit = PostEdit {
            title: title.map(str::to_string),
            content: content.map(|c| self.clean(c)),
        };

        match self
            .ctx
            .store
            .update_post_versioned(post_id, expected_version, edit)
            .await?
        {
            PostWrite::Applied(post) => {
                info!(post_id = %post_id, version = post.version, "Updated post");
                Ok(post)
            }
            PostWrite::Stale { actual } => {
                let expected = expected_version.unwrap_or(actual);
                warn!(post_id = %post_id, expected, actual, "Version conflict");
                Err(WorkspaceError::VersionConflict { expected, actual })
            }
            PostWrite::Missing => Err(WorkspaceError::NotFound(ResourceType::Post)),
        }
    }

    /// Delete a post.
    pub async fn delete(&self, workspace_id: Uuid, actor: Uuid, post_id: Uuid) -> WorkspaceResult<()> {
        self.ctx.gate.authorize(actor, workspace_id, Action::Write).await?;
        self.post_in_workspace(workspace_id, post_id).await?;

        if !self.ctx.store.delete_post(post_id).await? {
            return Err(WorkspaceError::NotFound(ResourceType::Post));
        }
        info!(post_id = %post_id, workspace_id = %workspace_id, "Deleted post");
        Ok(())
    }

    /// File a post under another folder, or unfile it with `None`. The
    /// version is unchanged.
    pub async fn move_post(
        &self,
        workspace_id: Uuid,
        actor: Uuid,
        post_id: Uuid,
        folder_id: Option<Uuid>,
    ) -> WorkspaceResult<Post> {
        self.ctx.gate.authorize(actor, workspace_id, Action::Write).await?;
        self.post_in_workspace(workspace_id, post_id).await?;
        if let Some(folder_id) = folder_id {
            find_folder_in(&self.ctx, workspace_id, folder_id).await?;
        }

        let post = self
            .ctx
            .store
            .relocate_post(post_id, folder_id)
            .await?
            .ok_or(WorkspaceError::NotFound(ResourceType::Post))?;

        info!(post_id = %post_id, folder_id = ?folder_id, "Moved post");
        Ok(post)
    }

    /// Read a post with its author's nickname. Any member may read.
    ///
    /// The nickname is `None` if the author's account no longer exists.
    pub async fn get(&self, workspace_id: Uuid, actor: Uuid, post_id: Uuid) -> WorkspaceResult<PostView> {
        self.ctx.gate.authorize(actor, workspace_id, Action::Read).await?;
        let post = self.post_in_workspace(workspace_id, post_id).await?;
        let author = self.ctx.users.find_by_id(post.author_id).await?;
        Ok(PostView::new(post, author.map(|u| u.nickname)))
    }
}
