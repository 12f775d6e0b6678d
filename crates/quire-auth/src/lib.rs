//! # Quire Identity
//!
//! This crate maps identity-provider logins onto Quire accounts.
//!
//! ## Overview
//!
//! The quire-auth crate handles:
//! - **Provider payloads**: Google, Kakao and Naver attribute maps parsed
//!   into one [`OAuthProfile`] shape
//! - **Account linking**: What to do when a provider login arrives for an
//!   email that is already registered
//! - **Nicknames**: Deriving a unique handle for new provider accounts
//!
//! The OAuth code and token exchange happens outside this crate; it starts
//! from the attribute map the provider returned.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use serde_json::json;
//! use quire_auth::{nickname_base, nickname_candidates, ProviderPayload};
//!
//! let profile = ProviderPayload::parse(
//!     "naver",
//!     json!({"response": {"id": "n1", "email": "lee@example.com", "nickname": "lee"}}),
//! )
//! .and_then(ProviderPayload::into_profile)
//! .unwrap();
//!
//! let base = nickname_base(profile.nickname.as_deref());
//! let first_choice = nickname_candidates(&base).next();
//! ```
//!
//! ## Linking Policy
//!
//! | Existing account | Login | Result |
//! |---|---|---|
//! | local or unlinked | any provider | link |
//! | provider P, id X | P, id X | already linked |
//! | provider P, id X | P, id Y | `ProviderIdMismatch` |
//! | provider P | Q ≠ P | `AccountExists` |

pub mod error;
pub mod linking;
pub mod oauth;

// Re-export main types
pub use error::{AuthError, AuthResult};
pub use linking::{
    link_decision, nickname_base, nickname_candidates, LinkDecision, DEFAULT_NICKNAME,
    MAX_NICKNAME_ATTEMPTS, MAX_NICKNAME_BASE,
};
pub use oauth::{
    GooglePayload, KakaoAccount, KakaoPayload, KakaoProfile, NaverPayload, NaverResponse,
    OAuthProfile, ProviderPayload,
};
