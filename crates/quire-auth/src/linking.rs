//! Account linking
//!
//! Decides what happens when a provider login arrives for an email that is
//! already registered, and derives nicknames for new provider accounts.

use quire_org::{AuthProvider, User};

use crate::error::{AuthError, AuthResult};
use crate::oauth::OAuthProfile;

/// Longest nickname base before numeric suffixes are appended.
pub const MAX_NICKNAME_BASE: usize = 40;

/// Fallback nickname base when the provider supplies none.
pub const DEFAULT_NICKNAME: &str = "user";

/// Most nickname candidates tried before giving up, the bare base included.
pub const MAX_NICKNAME_ATTEMPTS: usize = 100;

/// Outcome of matching a provider login to an existing account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkDecision {
    /// The account has no provider yet (or is local); attach this one
    Link,
    /// The account is already linked to this exact provider account
    AlreadyLinked,
}

/// Apply the linking policy to an existing account with the profile's email.
///
/// - Local or unlinked accounts are linked to the provider.
/// - Accounts on the same provider must carry the same provider id.
/// - Accounts on a different provider are refused.
///
/// # Example
///
/// ```
/// use quire_org::{AuthProvider, User};
/// use quire_auth::{link_decision, LinkDecision, OAuthProfile};
///
/// let existing = User::new("a@b.c", "ada").with_login_id("ada");
/// let profile = OAuthProfile {
///     provider: AuthProvider::Google,
///     provider_id: "g-1".into(),
///     email: "a@b.c".into(),
///     nickname: None,
///     profile_image: None,
/// };
/// assert_eq!(link_decision(&existing, &profile).unwrap(), LinkDecision::Link);
/// ```
pub fn link_decision(existing: &User, profile: &OAuthProfile) -> AuthResult<LinkDecision> {
    match existing.provider {
        None | Some(AuthProvider::Local) => Ok(LinkDecision::Link),
        Some(provider) if provider == profile.provider => {
            if existing.provider_id.as_deref() == Some(profile.provider_id.as_str()) {
                Ok(LinkDecision::AlreadyLinked)
            } else {
                Err(AuthError::ProviderIdMismatch)
            }
        }
        Some(provider) => Err(AuthError::AccountExists { provider }),
    }
}

/// Nickname base for a new account: the suggestion if non-blank, else
/// [`DEFAULT_NICKNAME`], cut to [`MAX_NICKNAME_BASE`] characters.
pub fn nickname_base(suggested: Option<&str>) -> String {
    let base = match suggested {
        Some(s) if !s.trim().is_empty() => s,
        _ => DEFAULT_NICKNAME,
    };
    base.chars().take(MAX_NICKNAME_BASE).collect()
}

/// Nickname candidates in the order they should be tried: the base, then
/// `base_1`, `base_2`, and so on, [`MAX_NICKNAME_ATTEMPTS`] in total.
///
/// # Example
///
/// ```
/// use quire_auth::nickname_candidates;
///
/// let first: Vec<String> = nickname_candidates("ada").take(3).collect();
/// assert_eq!(first, ["ada", "ada_1", "ada_2"]);
/// ```
pub fn nickname_candidates(base: &str) -> impl Iterator<Item = String> + '_ {
    std::iter::once(base.to_string())
        .chain((1u32..).map(move |n| format!("{base}_{n}")))
        .take(MAX_NICKNAME_ATTEMPTS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(provider: AuthProvider, id: &str) -> OAuthProfile {
        OAuthProfile {
            provider,
            provider_id: id.to_string(),
            email: "a@b.c".to_string(),
            nickname: None,
            profile_image: None,
        }
    }

    #[test]
    fn test_unlinked_account_links() {
        let user = User::new("a@b.c", "a");
        assert_eq!(
            link_decision(&user, &profile(AuthProvider::Kakao, "1")).unwrap(),
            LinkDecision::Link
        );
    }

    #[test]
    fn test_same_provider_same_id() {
        let user = User::new("a@b.c", "a").with_provider(AuthProvider::Google, "g-1");
        assert_eq!(
            link_decision(&user, &profile(AuthProvider::Google, "g-1")).unwrap(),
            LinkDecision::AlreadyLinked
        );
    }

    #[test]
    fn test_same_provider_other_id() {
        let user = User::new("a@b.c", "a").with_provider(AuthProvider::Google, "g-1");
        assert_eq!(
            link_decision(&user, &profile(AuthProvider::Google, "g-2")).unwrap_err(),
            AuthError::ProviderIdMismatch
        );
    }

    #[test]
    fn test_other_provider_refused() {
        let user = User::new("a@b.c", "a").with_provider(AuthProvider::Naver, "n-1");
        assert_eq!(
            link_decision(&user, &profile(AuthProvider::Google, "g-1")).unwrap_err(),
            AuthError::AccountExists {
                provider: AuthProvider::Naver
            }
        );
    }

    #[test]
    fn test_nickname_base() {
        assert_eq!(nickname_base(Some("ada")), "ada");
        assert_eq!(nickname_base(Some("   ")), "user");
        assert_eq!(nickname_base(None), "user");

        let long = "가".repeat(50);
        assert_eq!(nickname_base(Some(&long)).chars().count(), 40);
    }

    #[test]
    fn test_nickname_candidates() {
        let mut candidates = nickname_candidates("user");
        assert_eq!(candidates.next().as_deref(), Some("user"));
        assert_eq!(candidates.next().as_deref(), Some("user_1"));
        assert_eq!(candidates.nth(8).as_deref(), Some("user_10"));
    }

    #[test]
    fn test_nickname_candidates_are_bounded() {
        assert_eq!(nickname_candidates("a").count(), MAX_NICKNAME_ATTEMPTS);
        let last = nickname_candidates("a").last();
        assert_eq!(last, Some(format!("a_{}", MAX_NICKNAME_ATTEMPTS - 1)));
    }
}
