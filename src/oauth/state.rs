//! Provider selection from the round-tripped `state` parameter

use super::OAuthProvider;
use rand::distr::Alphanumeric;
use rand::Rng;

/// State value the Kakao sign-in sends
pub const KAKAO_STATE: &str = "kakao_login";

/// Prefix of every Naver state value; the remainder is a random nonce
pub const NAVER_STATE_PREFIX: &str = "naver_";

const NAVER_NONCE_LEN: usize = 12;

/// Callback state resolved once at callback entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackState {
    Kakao,
    Naver(String),
    Unknown(String),
}

impl CallbackState {
    #[must_use]
    pub fn parse(state: &str) -> Self {
        if state == KAKAO_STATE {
            Self::Kakao
        } else if let Some(nonce) = state.strip_prefix(NAVER_STATE_PREFIX) {
            Self::Naver(nonce.to_string())
        } else {
            Self::Unknown(state.to_string())
        }
    }

    /// Provider this state routes to, `None` for unknown states
    #[must_use]
    pub fn provider(&self) -> Option<OAuthProvider> {
        match self {
            Self::Kakao => Some(OAuthProvider::Kakao),
            Self::Naver(_) => Some(OAuthProvider::Naver),
            Self::Unknown(_) => None,
        }
    }
}

/// Fresh `naver_<nonce>` state for a Naver sign-in
#[must_use]
pub fn generate_naver_state() -> String {
    let nonce: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(NAVER_NONCE_LEN)
        .map(char::from)
        .collect();
    format!("{NAVER_STATE_PREFIX}{nonce}")
}
