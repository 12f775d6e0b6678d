//! Post domain models
//!
//! Posts carry a version counter used for optimistic concurrency: it starts
//! at 0 and grows by exactly one on every successful title or content edit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A post within a workspace, optionally filed in a folder.
///
/// # Examples
///
/// ```
/// use uuid::Uuid;
/// use quire_org::Post;
///
/// let post = Post::new(Uuid::now_v7(), Uuid::now_v7(), None, "Hello", "<p>hi</p>");
/// assert_eq!(post.version, 0);
/// assert!(post.is_unfiled());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Unique identifier for the post
    pub id: Uuid,

    /// Workspace this post belongs to
    pub workspace_id: Uuid,

    /// Folder the post is filed in (None = root post)
    pub folder_id: Option<Uuid>,

    /// Author user ID
    pub author_id: Uuid,

    /// Title
    pub title: String,

    /// Sanitized HTML content
    pub content: String,

    /// Optimistic concurrency version
    pub version: u64,

    /// When the post was created
    pub created_at: DateTime<Utc>,

    /// When the post was last updated
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Creates a new post at version 0.
    ///
    /// `content` is stored as given; callers sanitize it first.
    pub fn new(
        workspace_id: Uuid,
        author_id: Uuid,
        folder_id: Option<Uuid>,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            workspace_id,
            folder_id,
            author_id,
            title: title.into(),
            content: content.into(),
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if the post is not filed in any folder.
    pub fn is_unfiled(&self) -> bool {
        self.folder_id.is_none()
    }

    /// Apply an edit and advance the version.
    ///
    /// Fields left as `None` are unchanged. The version advances even when
    /// both fields are `None`, since every accepted write is a new revision.
    pub fn apply_edit(&mut self, edit: PostEdit) {
        if let Some(title) = edit.title {
            self.title = title;
        }
        if let Some(content) = edit.content {
            self.content = content;
        }
        self.version += 1;
        self.updated_at = Utc::now();
    }

    /// File the post in another folder. Does not touch the version.
    pub fn move_to(&mut self, folder_id: Option<Uuid>) {
        self.folder_id = folder_id;
        self.updated_at = Utc::now();
    }
}

/// A title and/or content change to a post.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostEdit {
    /// New title
    pub title: Option<String>,

    /// New (already sanitized) content
    pub content: Option<String>,
}

/// Post as shown inside a folder tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostSummary {
    /// Post ID
    pub id: Uuid,

    /// Title
    pub title: String,

    /// When the post was created
    pub created_at: DateTime<Utc>,

    /// When the post was last updated
    pub updated_at: DateTime<Utc>,
}

impl From<&Post> for PostSummary {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id,
            title: post.title.clone(),
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

/// Full post state returned to readers, including the version needed for
/// the next optimistic update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostView {
    /// Post ID
    pub id: Uuid,

    /// Title
    pub title: String,

    /// Content
    pub content: String,

    /// Current version
    pub version: u64,

    /// Folder the post is filed in
    pub folder_id: Option<Uuid>,

    /// Author user ID
    pub author_id: Uuid,

    /// Author nickname (None if the author no longer exists)
    pub author_nickname: Option<String>,

    /// When the post was created
    pub created_at: DateTime<Utc>,

    /// When the post was last updated
    pub updated_at: DateTime<Utc>,
}

impl PostView {
    /// Build a view from a post and its author's nickname.
    pub fn new(post: Post, author_nickname: Option<String>) -> Self {
        Self {
            id: post.id,
            title: post.title,
            content: post.content,
            version: post.version,
            folder_id: post.folder_id,
            author_id: post.author_id,
            author_nickname,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}
