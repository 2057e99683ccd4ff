//! OAuth provider integration
//!
//! This module holds the provider adapters (Google, Kakao, Naver), the
//! callback state router and the identity type every adapter normalizes to.

pub mod config;
pub mod error;
pub mod providers;
pub mod state;

pub use config::{OAuthConfig, RuntimeProvider};
pub use error::OAuthError;
pub use providers::{GoogleAdapter, KakaoAdapter, NaverAdapter, ProviderAdapter};
pub use state::{generate_naver_state, CallbackState, KAKAO_STATE, NAVER_STATE_PREFIX};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity providers supported by the login page
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OAuthProvider {
    Google,
    Kakao,
    Naver,
}

impl OAuthProvider {
    pub const ALL: [Self; 3] = [Self::Google, Self::Kakao, Self::Naver];

    /// Lowercase name used in routes and settings
    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Kakao => "kakao",
            Self::Naver => "naver",
        }
    }

    #[must_use]
    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|provider| provider.slug().eq_ignore_ascii_case(slug))
    }

    /// Username used when the provider profile carries no name
    #[must_use]
    pub fn fallback_username(self) -> &'static str {
        match self {
            Self::Google => "Google User",
            Self::Kakao => "Kakao User",
            Self::Naver => "Naver User",
        }
    }
}

impl fmt::Display for OAuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Google => "Google",
            Self::Kakao => "Kakao",
            Self::Naver => "Naver",
        };
        f.write_str(name)
    }
}

/// Provider identity normalized from the differing userinfo shapes.
///
/// Serializes to the body the backend expects on `POST /api/users/oauth-login`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct OAuthIdentity {
    pub provider: OAuthProvider,
    pub provider_user_id: String,
    pub email: String,
    pub username: String,
}

/// Request body sent to the backend login endpoint
pub type OAuthLoginRequest = OAuthIdentity;

/// Query parameters delivered to the OAuth callback
#[derive(Deserialize, Debug, Default, Clone)]
pub struct OAuthCallback {
    pub code: Option<String>,
    pub state: Option<String>,
    pub redirect: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

impl OAuthCallback {
    /// Authorization code, treating an empty value as absent
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        non_empty(self.code.as_deref())
    }

    /// State parameter, treating an empty value as absent
    #[must_use]
    pub fn state(&self) -> Option<&str> {
        non_empty(self.state.as_deref())
    }
}

/// First value that is present and not empty
pub(crate) fn first_non_empty<'a, I>(candidates: I) -> Option<String>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    candidates
        .into_iter()
        .flatten()
        .find(|value| !value.is_empty())
        .map(ToString::to_string)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_serializes_with_capitalized_name() {
        let identity = OAuthIdentity {
            provider: OAuthProvider::Naver,
            provider_user_id: "u1".to_string(),
            email: "a@b.com".to_string(),
            username: "Naver User".to_string(),
        };

        let json = serde_json::to_value(&identity).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "provider": "Naver",
                "provider_user_id": "u1",
                "email": "a@b.com",
                "username": "Naver User"
            })
        );
    }

    #[test]
    fn test_provider_slugs() {
        assert_eq!(OAuthProvider::from_slug("kakao"), Some(OAuthProvider::Kakao));
        assert_eq!(OAuthProvider::from_slug("NAVER"), Some(OAuthProvider::Naver));
        assert_eq!(OAuthProvider::from_slug("github"), None);
        assert_eq!(OAuthProvider::Google.slug(), "google");
    }

    #[test]
    fn test_first_non_empty_skips_blank_values() {
        assert_eq!(
            first_non_empty([None, Some(""), Some("nick"), Some("other")]),
            Some("nick".to_string())
        );
        assert_eq!(first_non_empty([None, Some("")]), None);
    }

    #[test]
    fn test_callback_treats_empty_params_as_missing() {
        let callback = OAuthCallback {
            code: Some(String::new()),
            state: Some("kakao_login".to_string()),
            ..Default::default()
        };
        assert_eq!(callback.code(), None);
        assert_eq!(callback.state(), Some("kakao_login"));
    }
}
