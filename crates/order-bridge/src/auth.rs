//! Bearer-token verification for inbound calls.

use std::collections::HashSet;
use tracing::debug;

/// Who is making a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Redacted token, safe to log.
    pub subject: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Missing credential")]
    MissingCredential,

    #[error("Unauthorized")]
    Unauthorized,
}

/// Turns a raw `Authorization` value into a principal.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, credential: Option<&str>) -> Result<Principal, AuthError>;
}

/// Accepts `Bearer <token>` for a fixed token set.
///
/// With an empty set any non-empty token is accepted, which is how the service runs in
/// development and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenVerifier {
    tokens: HashSet<String>,
}

impl StaticTokenVerifier {
    pub fn new(tokens: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_dev_mode(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl TokenVerifier for StaticTokenVerifier {
    fn verify(&self, credential: Option<&str>) -> Result<Principal, AuthError> {
        let header = credential.ok_or(AuthError::MissingCredential)?;
        let token = header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::Unauthorized)?;

        if !self.is_dev_mode() && !self.tokens.contains(token) {
            debug!("Rejected unknown token");
            return Err(AuthError::Unauthorized);
        }

        let visible: String = token.chars().take(4).collect();
        Ok(Principal {
            subject: format!("{visible}***"),
        })
    }
}
