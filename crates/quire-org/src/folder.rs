//! Folder domain models
//!
//! Folders form a forest inside each workspace. A folder stores only its
//! `parent_id`; children are derived by looking folders up by parent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::post::PostSummary;

/// A folder within a workspace.
///
/// # Examples
///
/// ```
/// use uuid::Uuid;
/// use quire_org::Folder;
///
/// let workspace_id = Uuid::now_v7();
/// let user_id = Uuid::now_v7();
/// let root = Folder::new(workspace_id, user_id, "Specs", None);
/// let child = Folder::new(workspace_id, user_id, "Drafts", Some(root.id));
/// assert!(root.is_root());
/// assert_eq!(child.parent_id, Some(root.id));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    /// Unique identifier for the folder
    pub id: Uuid,

    /// Workspace this folder belongs to
    pub workspace_id: Uuid,

    /// User who created the folder
    pub created_by: Uuid,

    /// Parent folder in the same workspace (None = root folder)
    pub parent_id: Option<Uuid>,

    /// Folder name
    pub name: String,

    /// When the folder was created
    pub created_at: DateTime<Utc>,

    /// When the folder was last updated
    pub updated_at: DateTime<Utc>,
}

impl Folder {
    /// Creates a new folder.
    pub fn new(
        workspace_id: Uuid,
        created_by: Uuid,
        name: impl Into<String>,
        parent_id: Option<Uuid>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            workspace_id,
            created_by,
            parent_id,
            name: name.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if this is a root folder.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Rename the folder.
    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.updated_at = Utc::now();
    }

    /// Re-parent the folder. `None` makes it a root.
    pub fn move_to(&mut self, parent_id: Option<Uuid>) {
        self.parent_id = parent_id;
        self.updated_at = Utc::now();
    }
}

/// A folder with its nested children and the posts filed directly in it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderNode {
    /// Folder ID
    pub id: Uuid,

    /// Folder name
    pub name: String,

    /// Parent folder ID
    pub parent_id: Option<Uuid>,

    /// When the folder was created
    pub created_at: DateTime<Utc>,

    /// When the folder was last updated
    pub updated_at: DateTime<Utc>,

    /// Child folders
    pub children: Vec<FolderNode>,

    /// Posts filed in this folder
    pub posts: Vec<PostSummary>,
}

impl FolderNode {
    /// Build a childless node for a folder.
    pub fn new(folder: &Folder, posts: Vec<PostSummary>) -> Self {
        Self {
            id: folder.id,
            name: folder.name.clone(),
            parent_id: folder.parent_id,
            created_at: folder.created_at,
            updated_at: folder.updated_at,
            children: Vec::new(),
            posts,
        }
    }
}

/// The folder forest of a workspace plus its unfiled posts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkspaceTree {
    /// Root folders, each with its subtree
    pub folders: Vec<FolderNode>,

    /// Posts not filed in any folder
    pub root_posts: Vec<PostSummary>,
}
