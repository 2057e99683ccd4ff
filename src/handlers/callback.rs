// OAuth callback handler
use crate::errors::CallbackError;
use crate::oauth::{CallbackState, OAuthCallback, OAuthConfig, ProviderAdapter};
use crate::session::{IssuedSession, LoginAttempt, SessionIssuer, REDIRECT_COOKIE};
use crate::utils::logging::LoggingHelper;
use crate::utils::redirect_validator::return_path_or_default;
use crate::utils::responses::ResponseBuilder;
use actix_web::{error::InternalError, web, HttpRequest, HttpResponse, Result};

/// `GET /auth/callback?code&state[&redirect][&error]` for the code-flow providers
///
/// Every failure ends in a `/login?error=<code>` redirect.
///
/// # Errors
///
/// Never returns an error; failures are turned into redirects
pub async fn oauth_callback(
    query: web::Query<OAuthCallback>,
    req: HttpRequest,
    oauth_config: web::Data<OAuthConfig>,
    issuer: web::Data<SessionIssuer>,
) -> Result<HttpResponse> {
    let callback = query.into_inner();
    LoggingHelper::log_callback_debug(&req, &callback);

    let requested = requested_return_path(&req, callback.redirect.as_deref());
    let return_path = return_path_or_default(requested.as_deref());
    let clear_redirect = issuer.cookie_factory().create_expired_cookie(REDIRECT_COOKIE);
    let mut attempt = LoginAttempt::at_callback();

    match complete_callback(&callback, &oauth_config, &issuer, &mut attempt).await {
        Ok(session) => Ok(ResponseBuilder::redirect(
            &return_path,
            vec![issuer.session_cookie(&session), clear_redirect],
        )),
        Err(e) => {
            let error_code = e.error_code();
            attempt.fail(error_code);
            LoggingHelper::log_login_failure(error_code, &e);
            Ok(ResponseBuilder::login_error_redirect(
                error_code,
                vec![clear_redirect],
            ))
        }
    }
}

/// Query extractor config for the callback route
///
/// A query that fails to deserialize (a repeated `code`, say) still ends in
/// `/login?error=unknown` instead of a bare 400.
#[must_use]
pub fn callback_query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, req| {
        LoggingHelper::log_login_failure("unknown", &err);
        let cookies = req
            .app_data::<web::Data<SessionIssuer>>()
            .map(|issuer| vec![issuer.cookie_factory().create_expired_cookie(REDIRECT_COOKIE)])
            .unwrap_or_default();
        InternalError::from_response(
            err,
            ResponseBuilder::login_error_redirect("unknown", cookies),
        )
        .into()
    })
}

/// Return path from the query, falling back to the `oauth_redirect` cookie
pub(crate) fn requested_return_path(req: &HttpRequest, explicit: Option<&str>) -> Option<String> {
    explicit
        .filter(|path| !path.is_empty())
        .map(ToString::to_string)
        .or_else(|| {
            req.cookie(REDIRECT_COOKIE)
                .map(|cookie| cookie.value().to_string())
                .filter(|path| !path.is_empty())
        })
}

async fn complete_callback(
    callback: &OAuthCallback,
    oauth_config: &OAuthConfig,
    issuer: &SessionIssuer,
    attempt: &mut LoginAttempt,
) -> Result<IssuedSession, CallbackError> {
    if let Some(error) = callback.error.as_deref().filter(|e| !e.is_empty()) {
        let description = callback.error_description.as_deref().unwrap_or_default();
        return Err(CallbackError::ProviderDenied(format!("{error} {description}")));
    }

    // Parameter checks come before any network call
    let code = callback.code().ok_or(CallbackError::MissingCode)?;
    let raw_state = callback.state().ok_or(CallbackError::MissingState)?;

    let state = CallbackState::parse(raw_state);
    let adapter = oauth_config
        .adapter_for_state(&state)
        .ok_or_else(|| CallbackError::UnknownProvider(raw_state.to_string()))?;

    finish_login(adapter.as_ref(), code, Some(raw_state), issuer, attempt).await
}

/// Resolve the identity with `adapter` and trade it for a backend session
///
/// # Errors
///
/// Returns an error if the provider exchange or the backend login fails
pub(crate) async fn finish_login(
    adapter: &dyn ProviderAdapter,
    credential: &str,
    state: Option<&str>,
    issuer: &SessionIssuer,
    attempt: &mut LoginAttempt,
) -> Result<IssuedSession, CallbackError> {
    attempt.set_provider(adapter.provider());
    attempt.advance()?;

    let identity = adapter.exchange(credential, state).await?;
    LoggingHelper::log_identity_resolved(identity.provider, &identity.provider_user_id);
    attempt.advance()?;

    let session = issuer.issue(&identity).await?;
    attempt.advance()?;
    LoggingHelper::log_session_issued(
        identity.provider,
        session.access_token.len(),
        session.max_age_seconds(),
    );
    Ok(session)
}
