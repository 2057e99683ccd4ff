use crate::oauth::OAuthError;
use crate::session::{IllegalTransition, SessionError};

/// Everything that can end a login attempt early, recovered at the handler
/// boundary and turned into a `/login?error=<code>` redirect
#[derive(Debug, thiserror::Error)]
pub enum CallbackError {
    #[error("callback is missing the authorization code")]
    MissingCode,

    #[error("callback is missing the state parameter")]
    MissingState,

    #[error("state {0:?} does not match a configured provider")]
    UnknownProvider(String),

    #[error("provider reported an error: {0}")]
    ProviderDenied(String),

    #[error(transparent)]
    Provider(#[from] OAuthError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Attempt(#[from] IllegalTransition),
}

impl CallbackError {
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingCode => "no_code",
            Self::MissingState => "no_state",
            Self::UnknownProvider(_) => "invalid_state",
            Self::ProviderDenied(_) | Self::Attempt(_) => "unknown",
            Self::Provider(e) => e.error_code(),
            Self::Session(e) => e.error_code(),
        }
    }

    /// Backend's own reason when the session step failed
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Session(e) => Some(e.user_message()),
            _ => None,
        }
    }
}

/// Korean message shown on the login page for an `error` code
#[must_use]
pub fn login_error_message(error_code: &str) -> &'static str {
    match error_code {
        "no_code" => "인증 코드를 받지 못했습니다. 다시 시도해주세요.",
        "no_state" => "잘못된 요청입니다. 다시 시도해주세요.",
        "invalid_state" => "지원하지 않는 로그인 방식입니다.",
        "token_exchange_failed" => "토큰 교환에 실패했습니다. 다시 시도해주세요.",
        "user_info_failed" => "사용자 정보를 가져오는데 실패했습니다.",
        "naver_api_failed" => "네이버 API 호출에 실패했습니다.",
        _ => "로그인 중 오류가 발생했습니다. 다시 시도해주세요.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oauth::OAuthProvider;

    #[test]
    fn test_detail_carries_backend_message() {
        let err = CallbackError::Session(SessionError::BackendLogin {
            status: 409,
            message: "Email already registered".to_string(),
        });
        assert_eq!(err.detail(), Some("Email already registered"));
        assert_eq!(CallbackError::MissingCode.detail(), None);
    }

    #[test]
    fn test_callback_error_codes() {
        assert_eq!(CallbackError::MissingCode.error_code(), "no_code");
        assert_eq!(CallbackError::MissingState.error_code(), "no_state");
        assert_eq!(
            CallbackError::UnknownProvider("google".to_string()).error_code(),
            "invalid_state"
        );
        assert_eq!(
            CallbackError::ProviderDenied("access_denied".to_string()).error_code(),
            "unknown"
        );

        let provider: CallbackError = OAuthError::UserInfo {
            provider: OAuthProvider::Google,
            reason: "status 401".to_string(),
        }
        .into();
        assert_eq!(provider.error_code(), "user_info_failed");

        let session: CallbackError = SessionError::MissingToken.into();
        assert_eq!(session.error_code(), "unknown");
    }

    #[test]
    fn test_every_code_has_a_message() {
        assert_eq!(
            login_error_message("naver_api_failed"),
            "네이버 API 호출에 실패했습니다."
        );
        assert_eq!(
            login_error_message("something_else"),
            login_error_message("unknown")
        );
    }
}
