//! Lifecycle of a single login attempt
//!
//! `Idle → AwaitingProviderConsent → AwaitingProviderExchange →
//! AwaitingSessionIssuance → Authenticated`. Any non-terminal stage may fail;
//! `Failed` and `Authenticated` are terminal.

use crate::oauth::OAuthProvider;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginStage {
    Idle,
    AwaitingProviderConsent,
    AwaitingProviderExchange,
    AwaitingSessionIssuance,
    Authenticated,
    /// Carries the coarse error code reported to the login page
    Failed(String),
}

impl LoginStage {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Authenticated | Self::Failed(_))
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::AwaitingProviderConsent => "awaiting_provider_consent",
            Self::AwaitingProviderExchange => "awaiting_provider_exchange",
            Self::AwaitingSessionIssuance => "awaiting_session_issuance",
            Self::Authenticated => "authenticated",
            Self::Failed(_) => "failed",
        }
    }

    fn next(&self) -> Option<Self> {
        match self {
            Self::Idle => Some(Self::AwaitingProviderConsent),
            Self::AwaitingProviderConsent => Some(Self::AwaitingProviderExchange),
            Self::AwaitingProviderExchange => Some(Self::AwaitingSessionIssuance),
            Self::AwaitingSessionIssuance => Some(Self::Authenticated),
            Self::Authenticated | Self::Failed(_) => None,
        }
    }
}

impl fmt::Display for LoginStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed(reason) => write!(f, "failed({reason})"),
            other => f.write_str(other.name()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("illegal login transition from {from} to {to}")]
pub struct IllegalTransition {
    pub from: LoginStage,
    pub to: LoginStage,
}

/// Login attempt tracked through one request chain
#[derive(Debug, Clone)]
pub struct LoginAttempt {
    provider: Option<OAuthProvider>,
    stage: LoginStage,
}

impl Default for LoginAttempt {
    fn default() -> Self {
        Self::new()
    }
}

impl LoginAttempt {
    #[must_use]
    pub fn new() -> Self {
        Self {
            provider: None,
            stage: LoginStage::Idle,
        }
    }

    /// Attempt resumed at the callback, where consent has already been granted
    #[must_use]
    pub fn at_callback() -> Self {
        Self {
            provider: None,
            stage: LoginStage::AwaitingProviderConsent,
        }
    }

    #[must_use]
    pub fn stage(&self) -> &LoginStage {
        &self.stage
    }

    #[must_use]
    pub fn provider(&self) -> Option<OAuthProvider> {
        self.provider
    }

    pub fn set_provider(&mut self, provider: OAuthProvider) {
        self.provider = Some(provider);
    }

    /// Move to `to`. Only the next stage in order, or `Failed` from a
    /// non-terminal stage, is accepted.
    ///
    /// # Errors
    ///
    /// Returns an error if the transition is not allowed; the stage is unchanged
    pub fn transition(&mut self, to: LoginStage) -> Result<(), IllegalTransition> {
        let allowed = match &to {
            LoginStage::Failed(_) => !self.stage.is_terminal(),
            target => self.stage.next().as_ref() == Some(target),
        };
        if !allowed {
            return Err(IllegalTransition {
                from: self.stage.clone(),
                to,
            });
        }

        log::debug!(
            "Login attempt ({}) {} -> {}",
            self.provider.map_or_else(|| "unrouted".to_string(), |p| p.to_string()),
            self.stage,
            to
        );
        self.stage = to;
        Ok(())
    }

    /// Advance to the next stage in order
    ///
    /// # Errors
    ///
    /// Returns an error if the attempt is already terminal
    pub fn advance(&mut self) -> Result<(), IllegalTransition> {
        match self.stage.next() {
            Some(next) => self.transition(next),
            None => Err(IllegalTransition {
                from: self.stage.clone(),
                to: self.stage.clone(),
            }),
        }
    }

    /// Mark the attempt failed with an error code. A terminal attempt stays as it is.
    pub fn fail(&mut self, error_code: &str) {
        if let Err(e) = self.transition(LoginStage::Failed(error_code.to_string())) {
            log::warn!("{e}");
        }
    }
}
