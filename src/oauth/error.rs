use super::OAuthProvider;

/// Failures while talking to an OAuth provider
#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    #[error("{provider} is not configured: {reason}")]
    Configuration {
        provider: OAuthProvider,
        reason: String,
    },

    /// Token endpoint answered with a non-success status or no token
    #[error("{provider} token exchange failed: {reason}")]
    TokenExchange {
        provider: OAuthProvider,
        reason: String,
    },

    /// Userinfo endpoint answered with a non-success status
    #[error("{provider} user info request failed: {reason}")]
    UserInfo {
        provider: OAuthProvider,
        reason: String,
    },

    /// Provider-specific error payload, e.g. Naver `resultcode != "00"`
    #[error("{provider} API error {code}: {message}")]
    ProviderApi {
        provider: OAuthProvider,
        code: String,
        message: String,
    },

    #[error("{provider} request failed: {source}")]
    Transport {
        provider: OAuthProvider,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} returned an unreadable response: {reason}")]
    InvalidResponse {
        provider: OAuthProvider,
        reason: String,
    },
}

impl OAuthError {
    #[must_use]
    pub fn provider(&self) -> OAuthProvider {
        match self {
            Self::Configuration { provider, .. }
            | Self::TokenExchange { provider, .. }
            | Self::UserInfo { provider, .. }
            | Self::ProviderApi { provider, .. }
            | Self::Transport { provider, .. }
            | Self::InvalidResponse { provider, .. } => *provider,
        }
    }

    /// Coarse `error` query code for the login redirect
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::TokenExchange { .. } => "token_exchange_failed",
            Self::UserInfo { .. } => "user_info_failed",
            Self::ProviderApi {
                provider: OAuthProvider::Naver,
                ..
            } => "naver_api_failed",
            Self::ProviderApi { .. } => "user_info_failed",
            Self::Configuration { .. } | Self::Transport { .. } | Self::InvalidResponse { .. } => {
                "unknown"
            }
        }
    }
}
