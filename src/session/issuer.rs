//! Trades a normalized OAuth identity for an application session via the backend

use super::cookie::{CookieFactory, DEFAULT_SESSION_MAX_AGE_SECONDS, SESSION_COOKIE};
use crate::oauth::OAuthLoginRequest;
use crate::settings::MemogateSettings;
use actix_web::cookie::Cookie;
use serde::{Deserialize, Serialize};

const DEFAULT_BACKEND_ERROR: &str = "OAuth login failed";

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("backend login failed with status {status}: {message}")]
    BackendLogin { status: u16, message: String },

    #[error("backend login request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend login succeeded without a session token")]
    MissingToken,
}

impl SessionError {
    /// Coarse `error` query code for the login redirect
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        "unknown"
    }

    /// Message suitable for showing to the user
    #[must_use]
    pub fn user_message(&self) -> &str {
        match self {
            Self::BackendLogin { message, .. } => message,
            Self::Transport(_) | Self::MissingToken => DEFAULT_BACKEND_ERROR,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
struct AuthResponse {
    user: Option<UserResponse>,
    #[serde(default)]
    access_token: String,
    expires_in: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct BackendError {
    error: Option<String>,
}

/// Session minted by the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedSession {
    pub access_token: String,
    /// Lifetime in seconds, when the backend stated one
    pub expires_in: Option<i64>,
    /// Backend user record; kept for callers, the login flow only needs the token
    pub user: Option<UserResponse>,
}

impl IssuedSession {
    /// Cookie lifetime; a missing or non-positive `expires_in` means the default
    #[must_use]
    pub fn max_age_seconds(&self) -> i64 {
        self.expires_in
            .filter(|seconds| *seconds > 0)
            .unwrap_or(DEFAULT_SESSION_MAX_AGE_SECONDS)
    }
}

/// Calls `POST {api_base_url}/api/users/oauth-login` and builds the session cookie
#[derive(Clone)]
pub struct SessionIssuer {
    http: reqwest::Client,
    login_url: String,
    cookie_factory: CookieFactory,
}

impl SessionIssuer {
    #[must_use]
    pub fn new(http: reqwest::Client, login_url: String, cookie_factory: CookieFactory) -> Self {
        Self {
            http,
            login_url,
            cookie_factory,
        }
    }

    #[must_use]
    pub fn from_settings(settings: &MemogateSettings, http: reqwest::Client) -> Self {
        Self::new(
            http,
            settings.oauth_login_url(),
            CookieFactory::new(settings.cookie_secure()),
        )
    }

    #[must_use]
    pub fn cookie_factory(&self) -> &CookieFactory {
        &self.cookie_factory
    }

    /// Exchange an identity for a backend session.
    ///
    /// A usable `access_token` in the JSON body wins; otherwise the backend's
    /// `Set-Cookie: access_token=…` header is relayed.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable, answers with a non-success
    /// status, or succeeds without any session token
    pub async fn issue(&self, request: &OAuthLoginRequest) -> Result<IssuedSession, SessionError> {
        log::debug!(
            "Requesting backend session for {} user {}",
            request.provider,
            request.provider_user_id
        );

        let response = self.http.post(&self.login_url).json(request).send().await?;
        let status = response.status();
        let relayed = relayed_session_cookie(response.headers());
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<BackendError>(&body)
                .ok()
                .and_then(|e| e.error)
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| DEFAULT_BACKEND_ERROR.to_string());
            return Err(SessionError::BackendLogin {
                status: status.as_u16(),
                message,
            });
        }

        match serde_json::from_str::<AuthResponse>(&body) {
            Ok(auth) if !auth.access_token.is_empty() => Ok(IssuedSession {
                access_token: auth.access_token,
                expires_in: auth.expires_in,
                user: auth.user,
            }),
            parsed => {
                if let Err(e) = parsed {
                    log::debug!("Backend login body is not a session response: {e}");
                }
                relayed
                    .map(|cookie| IssuedSession {
                        access_token: cookie.value().to_string(),
                        expires_in: cookie.max_age().map(|age| age.whole_seconds()),
                        user: None,
                    })
                    .ok_or(SessionError::MissingToken)
            }
        }
    }

    /// `access_token` cookie for an issued session
    #[must_use]
    pub fn session_cookie(&self, session: &IssuedSession) -> Cookie<'static> {
        self.cookie_factory
            .create_session_cookie(&session.access_token, session.max_age_seconds())
    }
}

fn relayed_session_cookie(headers: &reqwest::header::HeaderMap) -> Option<Cookie<'static>> {
    headers
        .get_all(reqwest::header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| Cookie::parse(value.to_string()).ok())
        .find(|cookie| cookie.name() == SESSION_COOKIE && !cookie.value().is_empty())
}
