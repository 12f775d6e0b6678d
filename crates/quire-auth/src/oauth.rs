//! OAuth 2.0 provider payloads
//!
//! This module turns the attribute map an identity provider returns after a
//! successful code exchange into a uniform [`OAuthProfile`]. Each provider
//! nests its fields differently, so each gets its own payload type.

use quire_org::AuthProvider;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AuthError, AuthResult};

/// Google userinfo payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GooglePayload {
    /// Subject (account id)
    #[serde(default)]
    pub sub: Option<String>,

    /// Email address
    #[serde(default)]
    pub email: Option<String>,

    /// Display name
    #[serde(default)]
    pub name: Option<String>,

    /// Profile picture URL
    #[serde(default)]
    pub picture: Option<String>,
}

/// Kakao user payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KakaoPayload {
    /// Numeric account id
    #[serde(default)]
    pub id: Option<Value>,

    /// Account details
    #[serde(default)]
    pub kakao_account: Option<KakaoAccount>,
}

/// The `kakao_account` object of a Kakao payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KakaoAccount {
    /// Email address
    #[serde(default)]
    pub email: Option<String>,

    /// Profile details
    #[serde(default)]
    pub profile: Option<KakaoProfile>,
}

/// The `kakao_account.profile` object of a Kakao payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KakaoProfile {
    /// Nickname
    #[serde(default)]
    pub nickname: Option<String>,

    /// Profile image URL
    #[serde(default)]
    pub profile_image_url: Option<String>,
}

/// Naver user payload. Every field lives under `response`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NaverPayload {
    /// Account details
    #[serde(default)]
    pub response: Option<NaverResponse>,
}

/// The `response` object of a Naver payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NaverResponse {
    /// Account id
    #[serde(default)]
    pub id: Option<String>,

    /// Email address
    #[serde(default)]
    pub email: Option<String>,

    /// Nickname
    #[serde(default)]
    pub nickname: Option<String>,

    /// Real name, used when no nickname is set
    #[serde(default)]
    pub name: Option<String>,

    /// Profile image URL
    #[serde(default)]
    pub profile_image: Option<String>,
}

/// Provider-tagged OAuth payload.
#[derive(Debug, Clone)]
pub enum ProviderPayload {
    /// Google
    Google(GooglePayload),
    /// Kakao
    Kakao(KakaoPayload),
    /// Naver
    Naver(NaverPayload),
}

impl ProviderPayload {
    /// Parse an attribute map for the provider named by `registration_id`.
    ///
    /// # Errors
    ///
    /// - [`AuthError::UnsupportedProvider`] for unknown ids and for `local`
    /// - [`AuthError::InvalidPayload`] if the map has the wrong shape
    ///
    /// # Example
    ///
    /// ```
    /// use serde_json::json;
    /// use quire_auth::ProviderPayload;
    ///
    /// let payload = ProviderPayload::parse(
    ///     "google",
    ///     json!({"sub": "1", "email": "a@b.c", "name": "Ada"}),
    /// ).unwrap();
    /// let profile = payload.into_profile().unwrap();
    /// assert_eq!(profile.nickname.as_deref(), Some("Ada"));
    /// ```
    pub fn parse(registration_id: &str, attributes: Value) -> AuthResult<Self> {
        let provider = AuthProvider::parse(registration_id)
            .ok_or_else(|| AuthError::UnsupportedProvider(registration_id.to_string()))?;
        Self::from_attributes(provider, attributes)
    }

    /// Parse an attribute map for a known provider.
    pub fn from_attributes(provider: AuthProvider, attributes: Value) -> AuthResult<Self> {
        let invalid = |e: serde_json::Error| AuthError::InvalidPayload(e.to_string());
        match provider {
            AuthProvider::Google => Ok(Self::Google(
                serde_json::from_value(attributes).map_err(invalid)?,
            )),
            AuthProvider::Kakao => Ok(Self::Kakao(
                serde_json::from_value(attributes).map_err(invalid)?,
            )),
            AuthProvider::Naver => Ok(Self::Naver(
                serde_json::from_value(attributes).map_err(invalid)?,
            )),
            AuthProvider::Local => Err(AuthError::UnsupportedProvider(
                provider.as_str().to_string(),
            )),
        }
    }

    /// The provider this payload came from.
    pub fn provider(&self) -> AuthProvider {
        match self {
            Self::Google(_) => AuthProvider::Google,
            Self::Kakao(_) => AuthProvider::Kakao,
            Self::Naver(_) => AuthProvider::Naver,
        }
    }

    /// Flatten into a profile, requiring a non-blank email and provider id.
    pub fn into_profile(self) -> AuthResult<OAuthProfile> {
        let provider = self.provider();
        let (provider_id, email, nickname, profile_image) = match self {
            Self::Google(p) => (p.sub, p.email, p.name, p.picture),
            Self::Kakao(p) => {
                let account = p.kakao_account.unwrap_or_default();
                let profile = account.profile.unwrap_or_default();
                (
                    p.id.as_ref().and_then(id_to_string),
                    account.email,
                    profile.nickname,
                    profile.profile_image_url,
                )
            }
            Self::Naver(p) => {
                let response = p
                    .response
                    .ok_or_else(|| AuthError::InvalidPayload("missing response object".into()))?;
                let nickname = non_blank(response.nickname).or(response.name);
                (response.id, response.email, nickname, response.profile_image)
            }
        };

        let email = non_blank(email).ok_or(AuthError::MissingAttribute("email"))?;
        let provider_id = non_blank(provider_id).ok_or(AuthError::MissingAttribute("provider_id"))?;

        Ok(OAuthProfile {
            provider,
            provider_id,
            email,
            nickname: non_blank(nickname),
            profile_image: non_blank(profile_image),
        })
    }
}

/// Identity attributes common to every provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthProfile {
    /// Provider the profile came from
    pub provider: AuthProvider,

    /// Provider-specific account id
    pub provider_id: String,

    /// Verified email address
    pub email: String,

    /// Suggested nickname
    pub nickname: Option<String>,

    /// Profile image URL
    pub profile_image: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn id_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
