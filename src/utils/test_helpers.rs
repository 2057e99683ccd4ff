// Shared fixtures for unit and integration tests
use crate::oauth::OAuthConfig;
use crate::session::SessionIssuer;
use crate::settings::{MemogateSettings, ProviderSettings};

/// Settings whose provider endpoints live under `provider_base_url` (`/kakao/token`,
/// `/naver/me`, `/google/userinfo`, ...) and whose backend is `backend_base_url`
#[must_use]
pub fn create_test_settings(provider_base_url: &str, backend_base_url: &str) -> MemogateSettings {
    let provider = |name: &str, secret: Option<&str>| ProviderSettings {
        name: name.to_string(),
        authorization_endpoint: Some(format!("{provider_base_url}/{name}/authorize")),
        token_endpoint: Some(format!("{provider_base_url}/{name}/token")),
        userinfo_endpoint: Some(format!("{provider_base_url}/{name}/me")),
        scopes: Vec::new(),
        client_id: Some(format!("{name}-client-id")),
        client_secret: secret.map(ToString::to_string),
        client_id_env: None,
        client_secret_env: None,
        enabled: true,
    };

    let mut settings = MemogateSettings::default();
    settings.backend.api_base_url = backend_base_url.to_string();
    settings.providers = vec![
        provider("google", None),
        provider("kakao", Some("kakao-secret")),
        provider("naver", Some("naver-secret")),
    ];
    settings
}

/// Provider adapters and session issuer built from test settings
///
/// # Panics
///
/// Panics if the settings configure no provider
#[must_use]
pub fn create_test_services(settings: &MemogateSettings) -> (OAuthConfig, SessionIssuer) {
    let http = reqwest::Client::new();
    let oauth_config =
        OAuthConfig::from_settings(settings, &http).expect("test settings configure providers");
    (oauth_config, SessionIssuer::from_settings(settings, http))
}
