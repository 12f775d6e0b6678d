//! Core configuration.
//!
//! Quota ceilings, field length limits and the name given to personal
//! workspaces. Configuration is loaded from environment variables with the
//! standard ceilings as defaults.

use quire_org::QuotaLimits;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid configuration value.
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Error message.
        message: String,
    },
}

/// Maximum lengths, in characters, of user-supplied fields.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldLimits {
    /// Folder name.
    pub folder_name: usize,

    /// Workspace name.
    pub workspace_name: usize,

    /// Workspace description.
    pub workspace_description: usize,

    /// Post title.
    pub post_title: usize,

    /// User nickname.
    pub nickname: usize,
}

impl Default for FieldLimits {
    fn default() -> Self {
        Self {
            folder_name: 50,
            workspace_name: 100,
            workspace_description: 500,
            post_title: 200,
            nickname: 50,
        }
    }
}

/// Configuration shared by every service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Quota ceilings.
    pub limits: QuotaLimits,

    /// Field length limits.
    pub fields: FieldLimits,

    /// Name of the workspace created for every new account.
    pub personal_workspace_name: String,

    /// Maximum number of user search results.
    pub search_limit: usize,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            limits: QuotaLimits::default(),
            fields: FieldLimits::default(),
            personal_workspace_name: "My Workspace".to_string(),
            search_limit: 10,
        }
    }
}

impl CoreConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `QUIRE_MAX_TEAM_WORKSPACES`: Team workspaces one user may own (default: 3)
    /// - `QUIRE_MAX_MEMBERS`: Members per workspace (default: 5)
    /// - `QUIRE_MAX_FOLDERS`: Folders per workspace (default: 20)
    /// - `QUIRE_MAX_POSTS`: Posts per workspace (default: 100)
    /// - `QUIRE_PERSONAL_WORKSPACE_NAME`: Personal workspace name (default: "My Workspace")
    ///
    /// Unparseable numbers fall back to the default.
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            limits: QuotaLimits {
                owned_team_workspaces: env_number("QUIRE_MAX_TEAM_WORKSPACES")
                    .unwrap_or(default.limits.owned_team_workspaces),
                members: env_number("QUIRE_MAX_MEMBERS").unwrap_or(default.limits.members),
                folders: env_number("QUIRE_MAX_FOLDERS").unwrap_or(default.limits.folders),
                posts: env_number("QUIRE_MAX_POSTS").unwrap_or(default.limits.posts),
            },
            fields: default.fields,
            personal_workspace_name: std::env::var("QUIRE_PERSONAL_WORKSPACE_NAME")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(default.personal_workspace_name),
            search_limit: default.search_limit,
        }
    }

    /// Validate the configuration.
    ///
    /// Zero ceilings would make creation impossible, so they are rejected.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ceilings = [
            ("QUIRE_MAX_TEAM_WORKSPACES", self.limits.owned_team_workspaces),
            ("QUIRE_MAX_MEMBERS", self.limits.members),
            ("QUIRE_MAX_FOLDERS", self.limits.folders),
            ("QUIRE_MAX_POSTS", self.limits.posts),
        ];
        for (key, value) in ceilings {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: "must be at least 1".to_string(),
                });
            }
        }
        if self.personal_workspace_name.chars().count() > self.fields.workspace_name {
            return Err(ConfigError::InvalidValue {
                key: "QUIRE_PERSONAL_WORKSPACE_NAME".to_string(),
                message: format!("longer than {} characters", self.fields.workspace_name),
            });
        }
        Ok(())
    }
}

fn env_number(key: &str) -> Option<u32> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CoreConfig::default();
        assert_eq!(config.limits.folders, 20);
        assert_eq!(config.fields.post_title, 200);
        assert_eq!(config.search_limit, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_ceiling_rejected() {
        let mut config = CoreConfig::default();
        config.limits.posts = 0;

        match config.validate() {
            Err(ConfigError::InvalidValue { key, .. }) => assert_eq!(key, "QUIRE_MAX_POSTS"),
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn test_long_personal_name_rejected() {
        let config = CoreConfig {
            personal_workspace_name: "x".repeat(101),
            ..CoreConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_serializes() {
        let json = serde_json::to_value(CoreConfig::default()).unwrap();
        assert_eq!(json["limits"]["members"], 5);
        assert_eq!(json["personal_workspace_name"], "My Workspace");
    }
}
