// Authentication handlers: sign-in, Google token login and logout
use super::callback::{finish_login, requested_return_path};
use crate::errors::{login_error_message, CallbackError};
use crate::oauth::{generate_naver_state, OAuthConfig, OAuthProvider, KAKAO_STATE};
use crate::routes;
use crate::session::{LoginAttempt, SessionIssuer, REDIRECT_COOKIE, SESSION_COOKIE};
use crate::utils::logging::LoggingHelper;
use crate::utils::redirect_validator::{return_path_or_default, validate_return_path};
use crate::utils::responses::ResponseBuilder;
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse, Result};
use log::{error, warn};
use serde::{Deserialize, Serialize};

/// State sent with the Google token flow; the callback router never sees it
const GOOGLE_STATE: &str = "google_login";

#[derive(Deserialize)]
pub struct SignInQuery {
    pub redirect: Option<String>,
}

#[derive(Deserialize)]
pub struct GoogleTokenRequest {
    pub access_token: String,
    pub redirect: Option<String>,
}

#[derive(Serialize)]
struct LoginRedirect {
    redirect: String,
}

fn sign_in_state(provider: OAuthProvider) -> String {
    match provider {
        OAuthProvider::Kakao => KAKAO_STATE.to_string(),
        OAuthProvider::Naver => generate_naver_state(),
        OAuthProvider::Google => GOOGLE_STATE.to_string(),
    }
}

/// `GET /auth/{provider}/sign_in?redirect=` sends the browser to the consent screen
///
/// # Errors
///
/// Never returns an error; an unknown or unconfigured provider redirects to the login page
pub async fn oauth_sign_in(
    path: web::Path<String>,
    query: web::Query<SignInQuery>,
    oauth_config: web::Data<OAuthConfig>,
    issuer: web::Data<SessionIssuer>,
) -> Result<HttpResponse> {
    let slug = path.into_inner();
    let Some(adapter) = OAuthProvider::from_slug(&slug).and_then(|p| oauth_config.adapter(p)) else {
        warn!("Sign-in requested for unknown or unconfigured provider '{slug}'");
        return Ok(ResponseBuilder::login_error_redirect(
            CallbackError::UnknownProvider(slug).error_code(),
            Vec::new(),
        ));
    };

    let provider = adapter.provider();
    match adapter.authorize_url(&sign_in_state(provider)) {
        Ok(authorize_url) => {
            let mut cookies = Vec::new();
            let return_path = query
                .redirect
                .as_deref()
                .and_then(|candidate| validate_return_path(candidate).ok());
            if let Some(return_path) = &return_path {
                cookies.push(issuer.cookie_factory().create_redirect_cookie(return_path));
            }
            LoggingHelper::log_sign_in_redirect(
                provider,
                return_path.as_deref().unwrap_or(routes::MEMOS),
            );
            Ok(ResponseBuilder::redirect(&authorize_url, cookies))
        }
        Err(e) => {
            error!("Failed to build {provider} authorization URL: {e}");
            Ok(ResponseBuilder::login_error_redirect(e.error_code(), Vec::new()))
        }
    }
}

/// `POST /auth/google` with the access token the browser obtained from Google
///
/// Answers `200 {"redirect"}` with the session cookie, or `401 {"error","message"}`
/// plus the backend's `detail` when the backend refused the login.
///
/// # Errors
///
/// Never returns an error; failures become a JSON error body
pub async fn google_token_login(
    req: HttpRequest,
    body: web::Json<GoogleTokenRequest>,
    oauth_config: web::Data<OAuthConfig>,
    issuer: web::Data<SessionIssuer>,
) -> Result<HttpResponse> {
    let body = body.into_inner();
    let requested = requested_return_path(&req, body.redirect.as_deref());
    let return_path = return_path_or_default(requested.as_deref());
    let clear_redirect = issuer.cookie_factory().create_expired_cookie(REDIRECT_COOKIE);
    let mut attempt = LoginAttempt::at_callback();

    let result = match oauth_config.adapter(OAuthProvider::Google) {
        None => Err(CallbackError::UnknownProvider(GOOGLE_STATE.to_string())),
        Some(_) if body.access_token.is_empty() => Err(CallbackError::MissingCode),
        Some(adapter) => {
            finish_login(
                adapter.as_ref(),
                &body.access_token,
                None,
                &issuer,
                &mut attempt,
            )
            .await
        }
    };

    match result {
        Ok(session) => Ok(HttpResponse::Ok()
            .cookie(issuer.session_cookie(&session))
            .cookie(clear_redirect)
            .json(LoginRedirect {
                redirect: return_path,
            })),
        Err(e) => {
            let error_code = e.error_code();
            attempt.fail(error_code);
            LoggingHelper::log_login_failure(error_code, &e);
            Ok(ResponseBuilder::json_error(
                StatusCode::UNAUTHORIZED,
                error_code,
                login_error_message(error_code),
                e.detail(),
                vec![clear_redirect],
            ))
        }
    }
}

/// `GET|POST /auth/logout` clears the session cookie
///
/// # Errors
///
/// Never returns an error
pub async fn oauth_logout(issuer: web::Data<SessionIssuer>) -> Result<HttpResponse> {
    log::info!("Clearing session cookie on logout");
    let factory = issuer.cookie_factory();
    Ok(ResponseBuilder::redirect(
        routes::LOGIN,
        vec![
            factory.create_expired_cookie(SESSION_COOKIE),
            factory.create_expired_cookie(REDIRECT_COOKIE),
        ],
    ))
}
