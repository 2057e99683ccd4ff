// Centralized logging utilities to reduce verbose logging patterns
use crate::oauth::{OAuthCallback, OAuthError, OAuthProvider};
use log::{debug, info, warn};

pub struct LoggingHelper;

impl LoggingHelper {
    /// Log OAuth provider initialization start
    pub fn log_oauth_provider_initialization() {
        info!("🔧 Initializing OAuth providers from configuration...");
    }

    /// Log that a provider is disabled
    pub fn log_oauth_provider_disabled(provider: OAuthProvider) {
        info!("⏭️  Provider {provider} is disabled, skipping");
    }

    /// Log that a provider is configured
    pub fn log_oauth_provider_configured(provider: OAuthProvider) {
        info!("✅ {provider} OAuth2 configured ({})", provider.slug());
    }

    /// Log that a provider is not configured
    pub fn log_oauth_provider_not_configured(provider: OAuthProvider, error: &OAuthError) {
        info!("❌ {provider} OAuth2 not configured - {error}");
    }

    /// Log summary of configured OAuth providers
    pub fn log_oauth_providers_summary(providers: &[OAuthProvider]) {
        info!("🎯 Configured OAuth providers: {providers:?}");
    }

    pub fn log_sign_in_redirect(provider: OAuthProvider, return_path: &str) {
        info!("🔍 Redirecting to {provider} consent screen (return path: {return_path})");
    }

    /// Log token exchange start
    pub fn log_token_exchange_start(provider: OAuthProvider) {
        info!("🔄 Exchanging authorization code for tokens with {provider}");
    }

    /// Log token exchange summary; the token itself is never written
    pub fn log_token_exchange_summary(
        provider: OAuthProvider,
        token_type: Option<&str>,
        expires_in: Option<u64>,
    ) {
        debug!(
            "🔍 Token exchange summary for {provider}: token_type={}, expires_in={expires_in:?}",
            token_type.unwrap_or("unspecified")
        );
    }

    /// Log identity resolution success
    pub fn log_identity_resolved(provider: OAuthProvider, provider_user_id: &str) {
        info!("Resolved {provider} identity for provider user {provider_user_id}");
    }

    /// Log session issuance success
    pub fn log_session_issued(provider: OAuthProvider, token_len: usize, max_age_seconds: i64) {
        info!(
            "Backend issued a session for a {provider} login (token length {token_len}, max age {max_age_seconds}s)"
        );
    }

    /// Log a failed login and the error code sent back to the login page
    pub fn log_login_failure(error_code: &str, error: &dyn std::fmt::Display) {
        warn!("Login failed ({error_code}): {error}");
    }

    /// Log OAuth callback details in development mode
    pub fn log_callback_debug(req: &actix_web::HttpRequest, callback_data: &OAuthCallback) {
        debug!(
            "OAuth callback received via {}: code present={}, state={:?}, error={:?}",
            req.method(),
            callback_data.code().is_some(),
            callback_data.state(),
            callback_data.error
        );
        debug!("Callback request connection info: {:?}", req.connection_info());
    }
}
