use crate::routes;
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;

// High-confidence attack patterns; relative-path checks below handle the rest

static PATH_TRAVERSAL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.\.").expect("path traversal pattern compiles"));

static PROTOCOL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:[a-z][a-z0-9+.-]*:)|(?:/{2,})").expect("protocol pattern compiles")
});

// Control characters, encoded line breaks, backslashes and invisible separators
static SUSPICIOUS_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)[\x00-\x1F\x7F-\x9F]|%(?:00|0[aAdD]|09|5c|26%23)|^[.@〱〵ゝーｰ]|\\|[\u{200E}\u{200F}\u{2060}-\u{2064}\u{2000}-\u{200A}]",
    )
    .expect("suspicious pattern compiles")
});

const MAX_REDIRECT_LEN: usize = 2048;

/// Reasons a post-login return path is refused
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RedirectError {
    #[error("redirect is empty")]
    Empty,
    #[error("redirect is not a same-site relative path")]
    NotRelative,
    #[error("redirect is {0} characters long")]
    TooLong(usize),
    #[error("redirect contains a suspicious pattern")]
    Suspicious,
    #[error("redirect points back into the login flow")]
    LoginFlow,
}

/// Validate a post-login return path. Only same-site relative paths are accepted.
///
/// # Errors
///
/// Returns an error naming the first rule the candidate breaks
pub fn validate_return_path(candidate: &str) -> Result<String, RedirectError> {
    debug!("Validating post-login return path: {candidate}");

    if candidate.is_empty() {
        return Err(RedirectError::Empty);
    }
    if candidate.len() > MAX_REDIRECT_LEN {
        return Err(RedirectError::TooLong(candidate.len()));
    }
    if !is_relative_path(candidate) {
        return Err(RedirectError::NotRelative);
    }

    for variant in decoded_variants(candidate) {
        if PATH_TRAVERSAL_PATTERN.is_match(&variant)
            || PROTOCOL_PATTERN.is_match(&variant)
            || SUSPICIOUS_PATTERN.is_match(&variant)
            || contains_dangerous_protocol(&variant.to_lowercase())
            || variant.matches('@').count() > 1
        {
            return Err(RedirectError::Suspicious);
        }
    }

    if candidate.starts_with(routes::LOGIN) || candidate.starts_with("/auth/") {
        return Err(RedirectError::LoginFlow);
    }

    Ok(candidate.to_string())
}

/// Validated return path, or `/memos` when absent or refused
#[must_use]
pub fn return_path_or_default(candidate: Option<&str>) -> String {
    match candidate {
        None => routes::MEMOS.to_string(),
        Some(candidate) => validate_return_path(candidate).unwrap_or_else(|e| {
            warn!("Ignoring post-login redirect {candidate:?}: {e}");
            routes::MEMOS.to_string()
        }),
    }
}

/// Relative means: starts with a single `/` and the path part carries no scheme separator
fn is_relative_path(url: &str) -> bool {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    url.starts_with('/') && !url.starts_with("//") && !path.contains(':')
}

/// The raw path plus its single and double URL-decoded forms
fn decoded_variants(request_path: &str) -> Vec<String> {
    let mut variants = vec![request_path.to_string()];

    if let Ok(decoded) = urlencoding::decode(request_path) {
        let decoded = decoded.into_owned();
        if decoded != request_path {
            if let Ok(double_decoded) = urlencoding::decode(&decoded) {
                let double_decoded = double_decoded.into_owned();
                if double_decoded != decoded {
                    variants.push(double_decoded);
                }
            }
            variants.push(decoded);
        }
    }

    variants
}

fn contains_dangerous_protocol(text: &str) -> bool {
    const DANGEROUS_PROTOCOLS: &[&str] = &["javascript:", "vbscript:", "data:", "file:", "ftp:"];
    DANGEROUS_PROTOCOLS.iter().any(|protocol| text.contains(protocol))
}
