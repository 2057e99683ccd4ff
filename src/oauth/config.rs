// Config-driven provider setup: resolves endpoints and credentials from settings
// and builds one adapter per configured provider.

use super::providers::{GoogleAdapter, KakaoAdapter, NaverAdapter, ProviderAdapter};
use super::{CallbackState, OAuthError, OAuthProvider};
use crate::settings::{MemogateSettings, ProviderSettings};
use crate::utils::logging::LoggingHelper;
use std::collections::HashMap;
use std::sync::Arc;

/// Production endpoints for a provider: (authorize, token, userinfo, scopes)
fn default_endpoints(
    provider: OAuthProvider,
) -> (&'static str, &'static str, &'static str, &'static [&'static str]) {
    match provider {
        OAuthProvider::Google => (
            "https://accounts.google.com/o/oauth2/v2/auth",
            "https://oauth2.googleapis.com/token",
            "https://www.googleapis.com/oauth2/v3/userinfo",
            &["openid", "email", "profile"],
        ),
        OAuthProvider::Kakao => (
            "https://kauth.kakao.com/oauth/authorize",
            "https://kauth.kakao.com/oauth/token",
            "https://kapi.kakao.com/v2/user/me",
            &["account_email"],
        ),
        OAuthProvider::Naver => (
            "https://nid.naver.com/oauth2.0/authorize",
            "https://nid.naver.com/oauth2.0/token",
            "https://openapi.naver.com/v1/nid/me",
            &[],
        ),
    }
}

// Runtime provider configuration with resolved endpoints
#[derive(Debug, Clone)]
pub struct RuntimeProvider {
    pub provider: OAuthProvider,
    pub auth_url: String,
    pub token_url: String,
    pub userinfo_url: String,
    pub scopes: Vec<String>,
    pub client_id: String,
    pub client_secret: Option<String>,
}

impl RuntimeProvider {
    /// Resolve a provider from settings, filling unset endpoints with the production defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the client ID is missing, or the client secret is missing
    /// for Naver, whose token endpoint always requires it
    pub fn from_settings(
        provider: OAuthProvider,
        settings: &ProviderSettings,
    ) -> Result<Self, OAuthError> {
        let client_id = settings.get_client_id().ok_or_else(|| OAuthError::Configuration {
            provider,
            reason: "client ID not set".to_string(),
        })?;
        let client_secret = settings.get_client_secret();
        if provider == OAuthProvider::Naver && client_secret.is_none() {
            return Err(OAuthError::Configuration {
                provider,
                reason: "client secret not set".to_string(),
            });
        }

        let (auth_url, token_url, userinfo_url, scopes) = default_endpoints(provider);
        let scopes = if settings.scopes.is_empty() {
            scopes.iter().map(ToString::to_string).collect()
        } else {
            settings.scopes.clone()
        };

        Ok(Self {
            provider,
            auth_url: settings
                .authorization_endpoint
                .clone()
                .unwrap_or_else(|| auth_url.to_string()),
            token_url: settings
                .token_endpoint
                .clone()
                .unwrap_or_else(|| token_url.to_string()),
            userinfo_url: settings
                .userinfo_endpoint
                .clone()
                .unwrap_or_else(|| userinfo_url.to_string()),
            scopes,
            client_id,
            client_secret,
        })
    }

    /// Authorization URL with the given query parameters appended
    ///
    /// # Errors
    ///
    /// Returns an error if the configured authorization endpoint is not a valid URL
    pub fn build_authorize_url(&self, params: &[(&str, &str)]) -> Result<String, OAuthError> {
        let mut url = url::Url::parse(&self.auth_url).map_err(|e| OAuthError::Configuration {
            provider: self.provider,
            reason: format!("invalid authorization endpoint: {e}"),
        })?;
        url.query_pairs_mut().extend_pairs(params);
        Ok(url.to_string())
    }

    #[must_use]
    pub fn scope(&self) -> String {
        self.scopes.join(" ")
    }
}

/// Adapters for every configured provider
#[derive(Clone, Default)]
pub struct OAuthConfig {
    adapters: HashMap<OAuthProvider, Arc<dyn ProviderAdapter>>,
}

impl OAuthConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Initialize adapters from settings
    ///
    /// Providers that are disabled or lack credentials are skipped with a log line.
    ///
    /// # Errors
    ///
    /// Returns an error if no provider ends up configured
    pub fn from_settings(
        settings: &MemogateSettings,
        http_client: &reqwest::Client,
    ) -> Result<Self, OAuthError> {
        LoggingHelper::log_oauth_provider_initialization();
        let mut config = Self::new();

        for provider_settings in &settings.providers {
            let Some(provider) = provider_settings.provider() else {
                log::warn!(
                    "Ignoring unsupported provider '{}' in settings",
                    provider_settings.name
                );
                continue;
            };
            if !provider_settings.enabled {
                LoggingHelper::log_oauth_provider_disabled(provider);
                continue;
            }

            match RuntimeProvider::from_settings(provider, provider_settings) {
                Ok(runtime) => {
                    let adapter: Arc<dyn ProviderAdapter> = match provider {
                        OAuthProvider::Kakao => Arc::new(KakaoAdapter::new(
                            runtime,
                            settings.callback_url(),
                            http_client.clone(),
                        )),
                        OAuthProvider::Naver => Arc::new(NaverAdapter::new(
                            runtime,
                            settings.callback_url(),
                            http_client.clone(),
                        )),
                        OAuthProvider::Google => Arc::new(GoogleAdapter::new(
                            runtime,
                            settings.google_callback_url(),
                            http_client.clone(),
                        )),
                    };
                    LoggingHelper::log_oauth_provider_configured(provider);
                    config.insert_adapter(adapter);
                }
                Err(e) => LoggingHelper::log_oauth_provider_not_configured(provider, &e),
            }
        }

        if config.adapters.is_empty() {
            return Err(OAuthError::Configuration {
                provider: OAuthProvider::Kakao,
                reason: "no OAuth providers are configured; set provider credentials in \
                         Settings.toml or the environment"
                    .to_string(),
            });
        }

        LoggingHelper::log_oauth_providers_summary(&config.configured_providers());
        Ok(config)
    }

    /// Register an adapter, replacing any previous adapter for the same provider
    pub fn insert_adapter(&mut self, adapter: Arc<dyn ProviderAdapter>) {
        self.adapters.insert(adapter.provider(), adapter);
    }

    #[must_use]
    pub fn adapter(&self, provider: OAuthProvider) -> Option<&Arc<dyn ProviderAdapter>> {
        self.adapters.get(&provider)
    }

    /// Adapter selected by a parsed callback state
    #[must_use]
    pub fn adapter_for_state(&self, state: &CallbackState) -> Option<&Arc<dyn ProviderAdapter>> {
        state.provider().and_then(|provider| self.adapter(provider))
    }

    #[must_use]
    pub fn is_configured(&self, provider: OAuthProvider) -> bool {
        self.adapters.contains_key(&provider)
    }

    /// Configured providers in login page order
    #[must_use]
    pub fn configured_providers(&self) -> Vec<OAuthProvider> {
        OAuthProvider::ALL
            .into_iter()
            .filter(|provider| self.is_configured(*provider))
            .collect()
    }
}
