//! User records
//!
//! Users are referenced, never owned, by workspace memberships.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How an account signs in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AuthProvider {
    /// Login id and password
    Local,
    /// Google OAuth
    Google,
    /// Kakao OAuth
    Kakao,
    /// Naver OAuth
    Naver,
}

impl AuthProvider {
    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Google => "google",
            Self::Kakao => "kakao",
            Self::Naver => "naver",
        }
    }

    /// Parse from a registration id such as `"google"` (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "local" => Some(Self::Local),
            "google" => Some(Self::Google),
            "kakao" => Some(Self::Kakao),
            "naver" => Some(Self::Naver),
            _ => None,
        }
    }
}

impl std::fmt::Display for AuthProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user account.
///
/// # Examples
///
/// ```
/// use quire_org::User;
///
/// let user = User::new("ada@example.com", "ada");
/// assert!(user.provider.is_none());
/// assert!(user.login_id.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique user ID
    pub id: Uuid,

    /// Email address (unique)
    pub email: String,

    /// Login id for local accounts (unique when present)
    pub login_id: Option<String>,

    /// Public handle (unique)
    pub nickname: String,

    /// Profile image URL in the blob store
    pub profile_image: Option<String>,

    /// Sign-in provider
    pub provider: Option<AuthProvider>,

    /// Provider-specific account id
    pub provider_id: Option<String>,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a new user with no login id and no provider.
    pub fn new(email: impl Into<String>, nickname: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            email: email.into(),
            login_id: None,
            nickname: nickname.into(),
            profile_image: None,
            provider: None,
            provider_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the local login id.
    pub fn with_login_id(mut self, login_id: impl Into<String>) -> Self {
        self.login_id = Some(login_id.into());
        self.provider = Some(AuthProvider::Local);
        self
    }

    /// Link an OAuth provider account.
    pub fn with_provider(mut self, provider: AuthProvider, provider_id: impl Into<String>) -> Self {
        self.provider = Some(provider);
        self.provider_id = Some(provider_id.into());
        self
    }

    /// Set the profile image URL.
    pub fn with_profile_image(mut self, url: Option<String>) -> Self {
        self.profile_image = url;
        self
    }

    /// Link an OAuth provider to an existing account.
    pub fn link_provider(&mut self, provider: AuthProvider, provider_id: impl Into<String>) {
        self.provider = Some(provider);
        self.provider_id = Some(provider_id.into());
        self.updated_at = Utc::now();
    }
}

/// Public view of a user, as returned by user search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    /// User ID
    pub id: Uuid,

    /// Email address
    pub email: String,

    /// Nickname
    pub nickname: String,

    /// Profile image URL
    pub profile_image: Option<String>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            nickname: user.nickname.clone(),
            profile_image: user.profile_image.clone(),
        }
    }
}
