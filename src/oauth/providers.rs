//! Provider-specific OAuth logic
//!
//! Each adapter builds its provider's authorization URL and turns a credential
//! (an authorization code for Kakao and Naver, an access token for Google) into
//! an [`OAuthIdentity`]. The differing userinfo shapes are normalized here.

use super::config::RuntimeProvider;
use super::{first_non_empty, OAuthError, OAuthIdentity, OAuthProvider};
use crate::utils::logging::LoggingHelper;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Adapter for a single OAuth provider
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    fn provider(&self) -> OAuthProvider;

    /// Authorization URL embedding client id, redirect URI, scope and `state`
    ///
    /// # Errors
    ///
    /// Returns an error if the configured authorization endpoint is invalid
    fn authorize_url(&self, state: &str) -> Result<String, OAuthError>;

    /// Resolve the provider identity for a credential
    ///
    /// `state` is the value the provider echoed back, which Naver requires at the
    /// token endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the token or userinfo call fails or the provider reports an error
    async fn exchange(
        &self,
        credential: &str,
        state: Option<&str>,
    ) -> Result<OAuthIdentity, OAuthError>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    token_type: Option<String>,
    expires_in: Option<u64>,
    error: Option<String>,
    error_description: Option<String>,
}

impl TokenResponse {
    fn into_access_token(self, provider: OAuthProvider) -> Result<String, OAuthError> {
        if let Some(error) = self.error {
            return Err(OAuthError::TokenExchange {
                provider,
                reason: format!(
                    "{error}: {}",
                    self.error_description.unwrap_or_default()
                ),
            });
        }

        LoggingHelper::log_token_exchange_summary(
            provider,
            self.token_type.as_deref(),
            self.expires_in,
        );

        self.access_token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| OAuthError::TokenExchange {
                provider,
                reason: "token response carried no access token".to_string(),
            })
    }
}

/// POST the token form; a non-success status aborts before any userinfo call
async fn request_access_token(
    http: &reqwest::Client,
    provider: OAuthProvider,
    token_url: &str,
    form: &[(&str, &str)],
) -> Result<String, OAuthError> {
    LoggingHelper::log_token_exchange_start(provider);

    let response = http
        .post(token_url)
        .form(form)
        .send()
        .await
        .map_err(|source| OAuthError::Transport { provider, source })?;

    let status = response.status();
    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        log::error!("{provider} token exchange failed with status {status}: {error_text}");
        return Err(OAuthError::TokenExchange {
            provider,
            reason: format!("status {status}"),
        });
    }

    let token: TokenResponse =
        response
            .json()
            .await
            .map_err(|e| OAuthError::InvalidResponse {
                provider,
                reason: format!("failed to parse token response: {e}"),
            })?;
    token.into_access_token(provider)
}

async fn request_userinfo<T: DeserializeOwned>(
    http: &reqwest::Client,
    provider: OAuthProvider,
    userinfo_url: &str,
    access_token: &str,
) -> Result<T, OAuthError> {
    let response = http
        .get(userinfo_url)
        .bearer_auth(access_token)
        .send()
        .await
        .map_err(|source| OAuthError::Transport { provider, source })?;

    let status = response.status();
    if !status.is_success() {
        log::error!("{provider} user info fetch failed with status {status}");
        return Err(OAuthError::UserInfo {
            provider,
            reason: format!("status {status}"),
        });
    }

    response
        .json()
        .await
        .map_err(|e| OAuthError::InvalidResponse {
            provider,
            reason: format!("failed to parse user info: {e}"),
        })
}

// ---------------------------------------------------------------------------
// Kakao
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct KakaoUserInfo {
    id: u64,
    kakao_account: Option<KakaoAccount>,
    properties: Option<KakaoProperties>,
}

#[derive(Debug, Deserialize)]
struct KakaoAccount {
    email: Option<String>,
    profile: Option<KakaoProfile>,
}

#[derive(Debug, Deserialize)]
struct KakaoProfile {
    nickname: Option<String>,
}

#[derive(Debug, Deserialize)]
struct KakaoProperties {
    nickname: Option<String>,
}

impl KakaoUserInfo {
    fn into_identity(self) -> OAuthIdentity {
        let account = self.kakao_account.as_ref();
        let email = first_non_empty([account.and_then(|a| a.email.as_deref())]);
        let username = first_non_empty([
            account
                .and_then(|a| a.profile.as_ref())
                .and_then(|p| p.nickname.as_deref()),
            self.properties.as_ref().and_then(|p| p.nickname.as_deref()),
        ]);

        OAuthIdentity {
            provider: OAuthProvider::Kakao,
            provider_user_id: self.id.to_string(),
            email: email.unwrap_or_default(),
            username: username
                .unwrap_or_else(|| OAuthProvider::Kakao.fallback_username().to_string()),
        }
    }
}

/// Kakao login: server-side code exchange with the app secret
pub struct KakaoAdapter {
    runtime: RuntimeProvider,
    redirect_uri: String,
    http: reqwest::Client,
}

impl KakaoAdapter {
    #[must_use]
    pub fn new(runtime: RuntimeProvider, redirect_uri: String, http: reqwest::Client) -> Self {
        Self {
            runtime,
            redirect_uri,
            http,
        }
    }
}

#[async_trait]
impl ProviderAdapter for KakaoAdapter {
    fn provider(&self) -> OAuthProvider {
        OAuthProvider::Kakao
    }

    fn authorize_url(&self, state: &str) -> Result<String, OAuthError> {
        let scope = self.runtime.scope();
        self.runtime.build_authorize_url(&[
            ("response_type", "code"),
            ("client_id", self.runtime.client_id.as_str()),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("scope", scope.as_str()),
            ("state", state),
        ])
    }

    async fn exchange(
        &self,
        code: &str,
        _state: Option<&str>,
    ) -> Result<OAuthIdentity, OAuthError> {
        let access_token = request_access_token(
            &self.http,
            OAuthProvider::Kakao,
            &self.runtime.token_url,
            &[
                ("grant_type", "authorization_code"),
                ("client_id", self.runtime.client_id.as_str()),
                (
                    "client_secret",
                    self.runtime.client_secret.as_deref().unwrap_or_default(),
                ),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("code", code),
            ],
        )
        .await?;

        let user_info: KakaoUserInfo = request_userinfo(
            &self.http,
            OAuthProvider::Kakao,
            &self.runtime.userinfo_url,
            &access_token,
        )
        .await?;
        Ok(user_info.into_identity())
    }
}

// ---------------------------------------------------------------------------
// Naver
// ---------------------------------------------------------------------------

const NAVER_SUCCESS_CODE: &str = "00";

#[derive(Debug, Deserialize)]
struct NaverUserInfo {
    resultcode: String,
    message: Option<String>,
    response: Option<NaverProfile>,
}

#[derive(Debug, Deserialize)]
struct NaverProfile {
    id: String,
    email: Option<String>,
    name: Option<String>,
    nickname: Option<String>,
}

impl NaverUserInfo {
    fn into_identity(self) -> Result<OAuthIdentity, OAuthError> {
        if self.resultcode != NAVER_SUCCESS_CODE {
            return Err(OAuthError::ProviderApi {
                provider: OAuthProvider::Naver,
                code: self.resultcode,
                message: self.message.unwrap_or_default(),
            });
        }

        let profile = self.response.ok_or_else(|| OAuthError::InvalidResponse {
            provider: OAuthProvider::Naver,
            reason: "profile response missing".to_string(),
        })?;

        Ok(OAuthIdentity {
            provider: OAuthProvider::Naver,
            email: first_non_empty([profile.email.as_deref()]).unwrap_or_default(),
            username: first_non_empty([profile.name.as_deref(), profile.nickname.as_deref()])
                .unwrap_or_else(|| OAuthProvider::Naver.fallback_username().to_string()),
            provider_user_id: profile.id,
        })
    }
}

/// Naver login: server-side code exchange, state echoed to the token endpoint
pub struct NaverAdapter {
    runtime: RuntimeProvider,
    redirect_uri: String,
    http: reqwest::Client,
}

impl NaverAdapter {
    #[must_use]
    pub fn new(runtime: RuntimeProvider, redirect_uri: String, http: reqwest::Client) -> Self {
        Self {
            runtime,
            redirect_uri,
            http,
        }
    }
}

#[async_trait]
impl ProviderAdapter for NaverAdapter {
    fn provider(&self) -> OAuthProvider {
        OAuthProvider::Naver
    }

    fn authorize_url(&self, state: &str) -> Result<String, OAuthError> {
        let scope = self.runtime.scope();
        let mut params = vec![
            ("response_type", "code"),
            ("client_id", self.runtime.client_id.as_str()),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("state", state),
        ];
        if !scope.is_empty() {
            params.push(("scope", scope.as_str()));
        }
        self.runtime.build_authorize_url(&params)
    }

    async fn exchange(
        &self,
        code: &str,
        state: Option<&str>,
    ) -> Result<OAuthIdentity, OAuthError> {
        let access_token = request_access_token(
            &self.http,
            OAuthProvider::Naver,
            &self.runtime.token_url,
            &[
                ("grant_type", "authorization_code"),
                ("client_id", self.runtime.client_id.as_str()),
                (
                    "client_secret",
                    self.runtime.client_secret.as_deref().unwrap_or_default(),
                ),
                ("code", code),
                ("state", state.unwrap_or_default()),
            ],
        )
        .await?;

        let user_info: NaverUserInfo = request_userinfo(
            &self.http,
            OAuthProvider::Naver,
            &self.runtime.userinfo_url,
            &access_token,
        )
        .await?;
        user_info.into_identity()
    }
}

// ---------------------------------------------------------------------------
// Google
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    sub: String,
    email: Option<String>,
    name: Option<String>,
}

impl GoogleUserInfo {
    fn into_identity(self) -> OAuthIdentity {
        OAuthIdentity {
            provider: OAuthProvider::Google,
            email: self.email.unwrap_or_default(),
            username: first_non_empty([self.name.as_deref()])
                .unwrap_or_else(|| OAuthProvider::Google.fallback_username().to_string()),
            provider_user_id: self.sub,
        }
    }
}

/// Google login: the browser obtains an access token (token flow), which is
/// traded directly for userinfo without a server-side code exchange
pub struct GoogleAdapter {
    runtime: RuntimeProvider,
    redirect_uri: String,
    http: reqwest::Client,
}

impl GoogleAdapter {
    #[must_use]
    pub fn new(runtime: RuntimeProvider, redirect_uri: String, http: reqwest::Client) -> Self {
        Self {
            runtime,
            redirect_uri,
            http,
        }
    }
}

#[async_trait]
impl ProviderAdapter for GoogleAdapter {
    fn provider(&self) -> OAuthProvider {
        OAuthProvider::Google
    }

    fn authorize_url(&self, state: &str) -> Result<String, OAuthError> {
        let scope = self.runtime.scope();
        self.runtime.build_authorize_url(&[
            ("response_type", "token"),
            ("client_id", self.runtime.client_id.as_str()),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("scope", scope.as_str()),
            ("state", state),
        ])
    }

    async fn exchange(
        &self,
        access_token: &str,
        _state: Option<&str>,
    ) -> Result<OAuthIdentity, OAuthError> {
        let user_info: GoogleUserInfo = request_userinfo(
            &self.http,
            OAuthProvider::Google,
            &self.runtime.userinfo_url,
            access_token,
        )
        .await?;
        Ok(user_info.into_identity())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn runtime(provider: OAuthProvider, server: &MockServer) -> RuntimeProvider {
        RuntimeProvider {
            provider,
            auth_url: format!("{}/authorize", server.uri()),
            token_url: format!("{}/token", server.uri()),
            userinfo_url: format!("{}/me", server.uri()),
            scopes: vec!["account_email".to_string()],
            client_id: "client-123".to_string(),
            client_secret: Some("secret-456".to_string()),
        }
    }

    fn kakao(server: &MockServer) -> KakaoAdapter {
        KakaoAdapter::new(
            runtime(OAuthProvider::Kakao, server),
            "http://localhost:3000/auth/callback".to_string(),
            reqwest::Client::new(),
        )
    }

    fn naver(server: &MockServer) -> NaverAdapter {
        let mut runtime = runtime(OAuthProvider::Naver, server);
        runtime.scopes.clear();
        NaverAdapter::new(
            runtime,
            "http://localhost:3000/auth/callback".to_string(),
            reqwest::Client::new(),
        )
    }

    #[tokio::test]
    async fn test_kakao_authorize_url() {
        let server = MockServer::start().await;
        let url = kakao(&server).authorize_url("kakao_login").unwrap();
        let parsed = url::Url::parse(&url).unwrap();
        let pairs: Vec<(String, String)> = parsed.query_pairs().into_owned().collect();

        assert_eq!(parsed.path(), "/authorize");
        assert!(pairs.contains(&("response_type".to_string(), "code".to_string())));
        assert!(pairs.contains(&("client_id".to_string(), "client-123".to_string())));
        assert!(pairs.contains(&("scope".to_string(), "account_email".to_string())));
        assert!(pairs.contains(&("state".to_string(), "kakao_login".to_string())));
        assert!(pairs.contains(&(
            "redirect_uri".to_string(),
            "http://localhost:3000/auth/callback".to_string()
        )));
    }

    #[tokio::test]
    async fn test_kakao_exchange_normalizes_identity() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=authorization_code"))
            .and(body_string_contains("code=auth-code"))
            .and(body_string_contains("client_secret=secret-456"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "kakao-access",
                "token_type": "bearer",
                "expires_in": 21599
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/me"))
            .and(header("authorization", "Bearer kakao-access"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 3_456_789_u64,
                "kakao_account": {
                    "email": "kakao@example.com",
                    "profile": { "nickname": "" }
                },
                "properties": { "nickname": "카카오친구" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let identity = kakao(&server).exchange("auth-code", None).await.unwrap();
        assert_eq!(
            identity,
            OAuthIdentity {
                provider: OAuthProvider::Kakao,
                provider_user_id: "3456789".to_string(),
                email: "kakao@example.com".to_string(),
                username: "카카오친구".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_kakao_fallback_username_and_empty_email() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "access_token": "t" })),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 1 })))
            .mount(&server)
            .await;

        let identity = kakao(&server).exchange("code", None).await.unwrap();
        assert_eq!(identity.email, "");
        assert_eq!(identity.username, "Kakao User");
    }

    #[tokio::test]
    async fn test_failed_token_exchange_skips_userinfo() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": "invalid_grant",
                "error_code": "KOE320"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/me"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = kakao(&server).exchange("stale-code", None).await.unwrap_err();
        assert!(matches!(err, OAuthError::TokenExchange { .. }));
        assert_eq!(err.error_code(), "token_exchange_failed");
    }

    #[tokio::test]
    async fn test_userinfo_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "access_token": "t" })),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/me"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = kakao(&server).exchange("code", None).await.unwrap_err();
        assert_eq!(err.error_code(), "user_info_failed");
    }

    #[tokio::test]
    async fn test_naver_exchange_uses_fallback_username() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("state=naver_xyz"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "access_token": "naver-access" })),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/me"))
            .and(header("authorization", "Bearer naver-access"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "resultcode": "00",
                "message": "success",
                "response": { "id": "u1", "email": "a@b.com" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let identity = naver(&server)
            .exchange("code", Some("naver_xyz"))
            .await
            .unwrap();
        assert_eq!(
            identity,
            OAuthIdentity {
                provider: OAuthProvider::Naver,
                provider_user_id: "u1".to_string(),
                email: "a@b.com".to_string(),
                username: "Naver User".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_naver_error_payload_on_token_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "error": "invalid_request",
                "error_description": "no valid data in session"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/me"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = naver(&server)
            .exchange("code", Some("naver_xyz"))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "token_exchange_failed");
    }

    #[tokio::test]
    async fn test_naver_result_code_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "access_token": "t" })),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "resultcode": "024",
                "message": "Authentication failed"
            })))
            .mount(&server)
            .await;

        let err = naver(&server)
            .exchange("code", Some("naver_xyz"))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "naver_api_failed");
    }

    #[tokio::test]
    async fn test_naver_authorize_url_omits_empty_scope() {
        let server = MockServer::start().await;
        let url = naver(&server).authorize_url("naver_abc").unwrap();
        assert!(url.contains("state=naver_abc"));
        assert!(!url.contains("scope="));
    }

    #[tokio::test]
    async fn test_google_token_flow_reads_userinfo_only() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/me"))
            .and(header("authorization", "Bearer google-access"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "sub": "10987",
                "email": "g@example.com",
                "name": "Gil Dong"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let adapter = GoogleAdapter::new(
            runtime(OAuthProvider::Google, &server),
            "http://localhost:3000/auth/google/callback".to_string(),
            reqwest::Client::new(),
        );
        let identity = adapter.exchange("google-access", None).await.unwrap();
        assert_eq!(identity.provider, OAuthProvider::Google);
        assert_eq!(identity.provider_user_id, "10987");
        assert_eq!(identity.username, "Gil Dong");

        let url = adapter.authorize_url("google_login").unwrap();
        assert!(url.contains("response_type=token"));
    }
}
