//! Account provisioning.
//!
//! Every account gets a personal workspace at registration. The user record
//! and the workspace live in different collaborators, so registration
//! inserts the user first and removes it again if the workspace cannot be
//! created.

use chrono::Utc;
use quire_auth::{link_decision, nickname_base, nickname_candidates, LinkDecision, ProviderPayload};
use quire_org::{Membership, User, UserSummary, Workspace, WorkspaceKind};
use quire_rbac::ResourceType;
use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::context::CoreContext;
use crate::error::{WorkspaceError, WorkspaceResult};
use crate::validation::required_text;

/// Folder that profile images are uploaded under.
const PROFILE_FOLDER: &str = "profile";

/// Registers, updates, deletes and searches user accounts.
#[derive(Debug, Clone)]
pub struct AccountService {
    ctx: CoreContext,
}

impl AccountService {
    /// Create an account service.
    pub fn new(ctx: CoreContext) -> Self {
        Self { ctx }
    }

    /// Load a user.
    pub async fn find(&self, user_id: Uuid) -> WorkspaceResult<User> {
        self.ctx
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(WorkspaceError::NotFound(ResourceType::User))
    }

    fn validate_nickname(&self, nickname: &str) -> WorkspaceResult<()> {
        required_text("nickname", nickname, self.ctx.config.fields.nickname)
    }

    /// Register a local account and its personal workspace.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for a blank field or an overlong nickname
    /// - `DuplicateEmail`, `DuplicateLoginId` or `DuplicateNickname`
    pub async fn register_local(&self, email: &str, login_id: &str, nickname: &str) -> WorkspaceResult<User> {
        required_text("email", email, usize::MAX)?;
        required_text("login id", login_id, usize::MAX)?;
        self.validate_nickname(nickname)?;

        if self.ctx.users.exists_by_email(email).await? {
            return Err(WorkspaceError::DuplicateEmail);
        }
        if self.ctx.users.exists_by_login_id(login_id).await? {
            return Err(WorkspaceError::DuplicateLoginId);
        }
        if self.ctx.users.exists_by_nickname(nickname).await? {
            return Err(WorkspaceError::DuplicateNickname);
        }

        let user = User::new(email, nickname).with_login_id(login_id);
        self.provision(user).await
    }

    /// Sign in through an identity provider, creating or linking the
    /// account as needed.
    ///
    /// An existing account with the same email is linked according to
    /// [`link_decision`]. Otherwise a new account is registered under a
    /// free nickname derived from the provider's suggestion.
    ///
    /// # Errors
    ///
    /// - `Identity` when the payload is unusable or the account cannot be
    ///   linked
    /// - `DuplicateNickname` when every nickname candidate is taken
    pub async fn provision_oauth(&self, registration_id: &str, attributes: Value) -> WorkspaceResult<User> {
        let profile = ProviderPayload::parse(registration_id, attributes)?.into_profile()?;

        if let Some(mut existing) = self.ctx.users.find_by_email(&profile.email).await? {
            return match link_decision(&existing, &profile) {
                Ok(LinkDecision::Link) => {
                    existing.link_provider(profile.provider, profile.provider_id.as_str());
                    self.ctx.users.update(existing.clone()).await?;
                    info!(user_id = %existing.id, provider = %profile.provider, "Linked provider to account");
                    Ok(existing)
                }
                Ok(LinkDecision::AlreadyLinked) => {
                    debug!(user_id = %existing.id, provider = %profile.provider, "Provider sign-in");
                    Ok(existing)
                }
                Err(e) => {
                    warn!(
                        user_id = %existing.id,
                        provider = %profile.provider,
                        error = %e,
                        "Refused provider link"
                    );
                    Err(e.into())
                }
            };
        }

        // A nickname taken between the check and the insert moves on to the
        // next candidate
        let base = nickname_base(profile.nickname.as_deref());
        for candidate in nickname_candidates(&base) {
            if self.ctx.users.exists_by_nickname(&candidate).await? {
                continue;
            }
            let user = User::new(profile.email.as_str(), candidate.as_str())
                .with_provider(profile.provider, profile.provider_id.as_str())
                .with_profile_image(profile.profile_image.clone());
            match self.provision(user).await {
                Err(WorkspaceError::DuplicateNickname) => {
                    debug!(nickname = %candidate, "Nickname taken during registration, trying next");
                }
                result => return result,
            }
        }
        warn!(base = %base, "No free nickname for provider sign-up");
        Err(WorkspaceError::DuplicateNickname)
    }

    /// Insert a user and create their personal workspace.
    async fn provision(&self, user: User) -> WorkspaceResult<User> {
        self.ctx.users.insert(user.clone()).await?;

        let workspace = Workspace::personal(self.ctx.config.personal_workspace_name.as_str());
        let owner = Membership::owner(workspace.id, user.id);
        if let Err(e) = self.ctx.store.create_workspace(workspace.clone(), owner).await {
            warn!(user_id = %user.id, error = %e, "Personal workspace creation failed, removing user");
            if let Err(cleanup) = self.ctx.users.delete(user.id).await {
                warn!(user_id = %user.id, error = %cleanup, "Failed to remove user after aborted registration");
            }
            return Err(e.into());
        }

        info!(
            user_id = %user.id,
            workspace_id = %workspace.id,
            provider = ?user.provider,
            "Registered account"
        );
        Ok(user)
    }

    /// Change nickname and/or profile image.
    ///
    /// A new image is uploaded before the record is saved. The previous
    /// image is then deleted; a failed delete is logged and ignored. If the
    /// save fails the new image is deleted instead.
    ///
    /// # Errors
    ///
    /// - `NotFound(User)` if the user does not exist
    /// - `DuplicateNickname` if another user holds the nickname
    /// - `Infrastructure` if the upload fails
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        nickname: Option<&str>,
        profile_image: Option<Vec<u8>>,
    ) -> WorkspaceResult<User> {
        let mut user = self.find(user_id).await?;

        if let Some(nickname) = nickname {
            self.validate_nickname(nickname)?;
            if nickname != user.nickname && self.ctx.users.exists_by_nickname(nickname).await? {
                return Err(WorkspaceError::DuplicateNickname);
            }
            user.nickname = nickname.to_string();
        }

        let mut uploaded = None;
        let mut replaced = None;
        if let Some(bytes) = profile_image {
            let url = self
                .ctx
                .blobs
                .upload(bytes, PROFILE_FOLDER)
                .await
                .map_err(|e| WorkspaceError::Infrastructure(e.to_string()))?;
            replaced = user.profile_image.replace(url.clone());
            uploaded = Some(url);
        }

        user.updated_at = Utc::now();
        if let Err(e) = self.ctx.users.update(user.clone()).await {
            if let Some(url) = uploaded {
                self.discard_blob(user_id, &url).await;
            }
            return Err(e.into());
        }

        if let Some(old) = replaced {
            self.discard_blob(user_id, &old).await;
        }
        info!(user_id = %user_id, "Updated profile");
        Ok(user)
    }

    async fn discard_blob(&self, user_id: Uuid, url: &str) {
        if let Err(e) = self.ctx.blobs.delete(url).await {
            warn!(user_id = %user_id, url = %url, error = %e, "Failed to delete profile image");
        }
    }

    /// Delete an account with its personal workspaces and memberships.
    ///
    /// # Errors
    ///
    /// `OwnerCannotLeave` while the user still owns a team workspace.
    pub async fn delete_account(&self, user_id: Uuid) -> WorkspaceResult<()> {
        let user = self.find(user_id).await?;
        let memberships = self.ctx.store.list_user_memberships(user_id).await?;

        let mut personal = Vec::new();
        for membership in memberships.iter().filter(|m| m.is_owner()) {
            match self.ctx.store.find_workspace(membership.workspace_id).await? {
                Some(ws) if ws.kind == WorkspaceKind::Team => {
                    warn!(user_id = %user_id, workspace_id = %ws.id, "Account still owns a team workspace");
                    return Err(WorkspaceError::OwnerCannotLeave);
                }
                Some(ws) => personal.push(ws.id),
                None => {}
            }
        }

        if let Some(url) = user.profile_image.as_deref() {
            self.discard_blob(user_id, url).await;
        }
        for workspace_id in &personal {
            self.ctx.store.delete_workspace(*workspace_id).await?;
        }
        for membership in memberships.iter().filter(|m| !m.is_owner()) {
            self.ctx.store.delete_membership(membership.id).await?;
        }
        self.ctx.users.delete(user_id).await?;

        info!(user_id = %user_id, personal_workspaces = personal.len(), "Deleted account");
        Ok(())
    }

    /// Users whose email or nickname contains `query`, ignoring case,
    /// excluding the caller.
    pub async fn search(&self, actor: Uuid, query: &str) -> WorkspaceResult<Vec<UserSummary>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let users = self
            .ctx
            .users
            .search(query, actor, self.ctx.config.search_limit)
            .await?;
        Ok(users.iter().map(UserSummary::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreResult;
    use crate::testing;
    use crate::{
        CoreConfig, HtmlSanitizer, MemoryBlobStore, MemoryStore, MemoryUserDirectory, QuireCore, UserDirectory,
    };
    use async_trait::async_trait;
    use quire_auth::AuthError;
    use quire_org::{AuthProvider, WorkspaceRole};
    use serde_json::json;
    use std::sync::Arc;

    /// Directory whose existence checks always miss, as when another
    /// registration lands between the check and the insert.
    struct StaleDirectory {
        inner: MemoryUserDirectory,
        nicknames_taken: bool,
    }

    #[async_trait]
    impl UserDirectory for StaleDirectory {
        async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
            self.inner.find_by_id(id).await
        }
        async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
            self.inner.find_by_email(email).await
        }
        async fn find_by_login_id(&self, login_id: &str) -> StoreResult<Option<User>> {
            self.inner.find_by_login_id(login_id).await
        }
        async fn exists_by_email(&self, _email: &str) -> StoreResult<bool> {
            Ok(false)
        }
        async fn exists_by_login_id(&self, _login_id: &str) -> StoreResult<bool> {
            Ok(false)
        }
        async fn exists_by_nickname(&self, _nickname: &str) -> StoreResult<bool> {
            Ok(self.nicknames_taken)
        }
        async fn insert(&self, user: User) -> StoreResult<()> {
            self.inner.insert(user).await
        }
        async fn update(&self, user: User) -> StoreResult<()> {
            self.inner.update(user).await
        }
        async fn delete(&self, id: Uuid) -> StoreResult<()> {
            self.inner.delete(id).await
        }
        async fn search(&self, query: &str, exclude: Uuid, limit: usize) -> StoreResult<Vec<User>> {
            self.inner.search(query, exclude, limit).await
        }
    }

    fn stale_core(nicknames_taken: bool) -> (QuireCore, MemoryBlobStore) {
        let blobs = MemoryBlobStore::new();
        let directory = StaleDirectory {
            inner: MemoryUserDirectory::new(),
            nicknames_taken,
        };
        let core = QuireCore::new(CoreContext::new(
            CoreConfig::default(),
            Arc::new(MemoryStore::new()),
            Arc::new(directory),
            Arc::new(HtmlSanitizer::new()),
            Arc::new(blobs.clone()),
        ));
        (core, blobs)
    }

    #[tokio::test]
    async fn test_register_creates_personal_workspace() {
        let core = testing::core();
        let user = core
            .accounts()
            .register_local("ada@example.com", "ada", "ada")
            .await
            .unwrap();

        assert_eq!(user.provider, Some(AuthProvider::Local));
        let mine = core.workspaces().list_mine(user.id).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].name, "My Workspace");
        assert_eq!(mine[0].kind, WorkspaceKind::Personal);
        assert_eq!(mine[0].my_role, WorkspaceRole::Owner);
    }

    #[tokio::test]
    async fn test_register_rejects_duplicates() {
        let core = testing::core();
        let accounts = core.accounts();
        accounts.register_local("ada@example.com", "ada", "ada").await.unwrap();

        let err = accounts
            .register_local("ada@example.com", "other", "other")
            .await
            .unwrap_err();
        assert!(matches!(err, WorkspaceError::DuplicateEmail));

        let err = accounts
            .register_local("b@example.com", "ada", "other")
            .await
            .unwrap_err();
        assert!(matches!(err, WorkspaceError::DuplicateLoginId));

        let err = accounts
            .register_local("b@example.com", "b", "ada")
            .await
            .unwrap_err();
        assert!(matches!(err, WorkspaceError::DuplicateNickname));
    }

    #[tokio::test]
    async fn test_register_race_reports_duplicate() {
        let (core, _) = stale_core(false);
        let ada = testing::user(&core, "ada").await;

        let err = core
            .accounts()
            .register_local("b@example.com", "b", "ada")
            .await
            .unwrap_err();
        assert!(matches!(err, WorkspaceError::DuplicateNickname));
        assert_eq!(err.status_code(), 400);

        let err = core
            .accounts()
            .register_local("ada@example.com", "c", "c")
            .await
            .unwrap_err();
        assert!(matches!(err, WorkspaceError::DuplicateEmail));

        let err = core
            .accounts()
            .register_local("d@example.com", "ada", "d")
            .await
            .unwrap_err();
        assert!(matches!(err, WorkspaceError::DuplicateLoginId));

        let all = core.accounts().search(Uuid::new_v4(), "example.com").await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, ada.id);
    }

    #[tokio::test]
    async fn test_oauth_race_takes_next_nickname() {
        let (core, _) = stale_core(false);
        testing::user(&core, "grace").await;

        let user = core
            .accounts()
            .provision_oauth(
                "google",
                json!({"sub": "g-1", "email": "g@example.org", "name": "grace"}),
            )
            .await
            .unwrap();
        assert_eq!(user.nickname, "grace_1");
        assert_eq!(core.workspaces().list_mine(user.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_oauth_gives_up_when_every_nickname_is_taken() {
        let (core, _) = stale_core(true);

        let err = core
            .accounts()
            .provision_oauth("google", json!({"sub": "g-1", "email": "g@example.com", "name": "g"}))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkspaceError::DuplicateNickname));
        let users = &core.context().users;
        assert!(users.find_by_email("g@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_oauth_registers_new_user() {
        let core = testing::core();
        let attributes = json!({
            "sub": "g-123",
            "email": "grace@example.com",
            "name": "grace",
            "picture": "https://img.example.com/g.png"
        });

        let user = core.accounts().provision_oauth("google", attributes).await.unwrap();

        assert_eq!(user.provider, Some(AuthProvider::Google));
        assert_eq!(user.provider_id.as_deref(), Some("g-123"));
        assert_eq!(user.nickname, "grace");
        assert_eq!(user.profile_image.as_deref(), Some("https://img.example.com/g.png"));
        assert_eq!(core.workspaces().list_mine(user.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_oauth_nickname_gets_suffix() {
        let core = testing::core();
        core.accounts()
            .register_local("first@example.com", "first", "grace")
            .await
            .unwrap();
        core.accounts()
            .register_local("second@example.com", "second", "grace_1")
            .await
            .unwrap();

        let user = core
            .accounts()
            .provision_oauth(
                "google",
                json!({"sub": "g-1", "email": "grace@example.com", "name": "grace"}),
            )
            .await
            .unwrap();
        assert_eq!(user.nickname, "grace_2");
    }

    #[tokio::test]
    async fn test_oauth_links_local_account() {
        let core = testing::core();
        let local = core
            .accounts()
            .register_local("ada@example.com", "ada", "ada")
            .await
            .unwrap();

        let linked = core
            .accounts()
            .provision_oauth("google", json!({"sub": "g-9", "email": "ada@example.com"}))
            .await
            .unwrap();
        assert_eq!(linked.id, local.id);
        assert_eq!(linked.provider, Some(AuthProvider::Google));

        // Signing in again is a no-op
        let again = core
            .accounts()
            .provision_oauth("google", json!({"sub": "g-9", "email": "ada@example.com"}))
            .await
            .unwrap();
        assert_eq!(again.id, local.id);
        assert_eq!(core.workspaces().list_mine(local.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_oauth_link_conflicts() {
        let core = testing::core();
        core.accounts()
            .provision_oauth("google", json!({"sub": "g-1", "email": "ada@example.com"}))
            .await
            .unwrap();

        let err = core
            .accounts()
            .provision_oauth("google", json!({"sub": "g-2", "email": "ada@example.com"}))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkspaceError::Identity(AuthError::ProviderIdMismatch)));

        let err = core
            .accounts()
            .provision_oauth(
                "naver",
                json!({"response": {"id": "n-1", "email": "ada@example.com", "nickname": "ada"}}),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WorkspaceError::Identity(AuthError::AccountExists { provider: AuthProvider::Google })
        ));
    }

    #[tokio::test]
    async fn test_oauth_requires_email() {
        let core = testing::core();
        let err = core
            .accounts()
            .provision_oauth("google", json!({"sub": "g-1"}))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkspaceError::Identity(AuthError::MissingAttribute("email"))));
    }

    #[tokio::test]
    async fn test_update_profile_replaces_image() {
        let core = testing::core();
        let user = testing::user(&core, "ada").await;

        let first = core
            .accounts()
            .update_profile(user.id, None, Some(vec![1, 2, 3]))
            .await
            .unwrap();
        let first_url = first.profile_image.clone().unwrap();

        let second = core
            .accounts()
            .update_profile(user.id, Some("ada2"), Some(vec![4, 5]))
            .await
            .unwrap();
        let second_url = second.profile_image.clone().unwrap();
        assert_eq!(second.nickname, "ada2");
        assert_ne!(second_url, first_url);

        // The old image is gone, the new one is live
        let blobs = &core.context().blobs;
        assert!(blobs.delete(&first_url).await.is_err());
        assert!(blobs.delete(&second_url).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_profile_nickname_rules() {
        let core = testing::core();
        let ada = testing::user(&core, "ada").await;
        testing::user(&core, "bob").await;

        // Keeping one's own nickname is fine
        core.accounts().update_profile(ada.id, Some("ada"), None).await.unwrap();

        let err = core
            .accounts()
            .update_profile(ada.id, Some("bob"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkspaceError::DuplicateNickname));
    }

    #[tokio::test]
    async fn test_failed_profile_save_discards_upload() {
        let (core, blobs) = stale_core(false);
        let ada = testing::user(&core, "ada").await;
        testing::user(&core, "bob").await;

        let err = core
            .accounts()
            .update_profile(ada.id, Some("bob"), Some(vec![1, 2, 3]))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkspaceError::DuplicateNickname));
        assert!(blobs.is_empty().await);

        let unchanged = core.accounts().find(ada.id).await.unwrap();
        assert_eq!(unchanged.nickname, "ada");
        assert!(unchanged.profile_image.is_none());
    }

    #[tokio::test]
    async fn test_delete_account() {
        let (core, owner, ws) = testing::team_setup().await;
        let member = testing::member(&core, &ws, "member", WorkspaceRole::Member).await;
        let personal = testing::personal(&core, &member).await;

        let err = core.accounts().delete_account(owner.id).await.unwrap_err();
        assert!(matches!(err, WorkspaceError::OwnerCannotLeave));

        core.accounts().delete_account(member.id).await.unwrap();

        let store = &core.context().store;
        assert!(store.find_workspace(personal.id).await.unwrap().is_none());
        assert!(store.find_membership(ws.id, member.id).await.unwrap().is_none());
        let err = core.accounts().find(member.id).await.unwrap_err();
        assert!(matches!(err, WorkspaceError::NotFound(ResourceType::User)));
    }

    #[tokio::test]
    async fn test_search() {
        let core = testing::core();
        let ada = testing::user(&core, "ada").await;
        testing::user(&core, "adam").await;
        testing::user(&core, "bob").await;

        let found = core.accounts().search(ada.id, "ADA").await.unwrap();
        let names: Vec<&str> = found.iter().map(|u| u.nickname.as_str()).collect();
        assert_eq!(names, vec!["adam"]);

        assert!(core.accounts().search(ada.id, "  ").await.unwrap().is_empty());
    }
}
