//! # Resource Types
//!
//! Kinds of records an operation can address. Used to say which lookup
//! failed when a record is missing or lives in another workspace.

use serde::{Deserialize, Serialize};

/// Resource kinds addressed by workspace operations.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    /// User accounts.
    User,
    /// Workspaces (personal or team).
    Workspace,
    /// Memberships joining a user to a workspace.
    Member,
    /// Folders inside a workspace.
    Folder,
    /// Posts inside a workspace.
    Post,
}

impl ResourceType {
    /// Get the string representation of the resource type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::User => "user",
            ResourceType::Workspace => "workspace",
            ResourceType::Member => "member",
            ResourceType::Folder => "folder",
            ResourceType::Post => "post",
        }
    }

    /// Parse resource type from string representation.
    ///
    /// # Example
    ///
    /// ```
    /// use quire_rbac::resources::ResourceType;
    ///
    /// assert_eq!(ResourceType::parse("folder"), Some(ResourceType::Folder));
    /// assert_eq!(ResourceType::parse("membership"), Some(ResourceType::Member));
    /// assert_eq!(ResourceType::parse("invalid"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "user" => Some(ResourceType::User),
            "workspace" => Some(ResourceType::Workspace),
            "member" | "membership" => Some(ResourceType::Member),
            "folder" => Some(ResourceType::Folder),
            "post" => Some(ResourceType::Post),
            _ => None,
        }
    }

    /// Error code prefix used when this resource is not found,
    /// e.g. `FOLDER_NOT_FOUND`.
    pub fn not_found_code(&self) -> &'static str {
        match self {
            ResourceType::User => "USER_NOT_FOUND",
            ResourceType::Workspace => "WORKSPACE_NOT_FOUND",
            ResourceType::Member => "MEMBER_NOT_FOUND",
            ResourceType::Folder => "FOLDER_NOT_FOUND",
            ResourceType::Post => "POST_NOT_FOUND",
        }
    }

    /// Get all resource types.
    pub fn all() -> Vec<Self> {
        vec![
            ResourceType::User,
            ResourceType::Workspace,
            ResourceType::Member,
            ResourceType::Folder,
            ResourceType::Post,
        ]
    }
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_parsing() {
        assert_eq!(ResourceType::parse("USER"), Some(ResourceType::User));
        assert_eq!(ResourceType::parse("workspace"), Some(ResourceType::Workspace));
        assert_eq!(ResourceType::parse("post"), Some(ResourceType::Post));
        assert_eq!(ResourceType::parse("document"), None);
    }

    #[test]
    fn test_parse_round_trips_as_str() {
        for resource in ResourceType::all() {
            assert_eq!(ResourceType::parse(resource.as_str()), Some(resource));
        }
    }

    #[test]
    fn test_not_found_codes() {
        assert_eq!(ResourceType::Folder.not_found_code(), "FOLDER_NOT_FOUND");
        assert_eq!(ResourceType::Member.not_found_code(), "MEMBER_NOT_FOUND");
    }
}
