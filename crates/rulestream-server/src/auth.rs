//! Admin gate for the rule administration endpoints
//!
//! Requests carry `Authorization: Bearer <token>`; the token is compared to
//! the configured one in constant time.

use axum::http::{header, HeaderMap};
use subtle::ConstantTimeEq;
use thiserror::Error;

/// Admin authentication errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Rule administration is disabled: no admin token configured")]
    NotConfigured,

    #[error("Missing bearer token")]
    MissingToken,

    #[error("Invalid admin token")]
    InvalidToken,
}

#[derive(Clone, Default)]
pub struct AdminGate {
    token: Option<String>,
}

impl AdminGate {
    /// An empty token counts as no token.
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: token.filter(|t| !t.is_empty()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.token.is_some()
    }

    /// Check the bearer token in `headers`
    pub fn authorize(&self, headers: &HeaderMap) -> Result<(), AuthError> {
        let expected = self.token.as_deref().ok_or(AuthError::NotConfigured)?;
        let presented = bearer_token(headers).ok_or(AuthError::MissingToken)?;

        if bool::from(presented.as_bytes().ct_eq(expected.as_bytes())) {
            Ok(())
        } else {
            Err(AuthError::InvalidToken)
        }
    }
}

impl std::fmt::Debug for AdminGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminGate")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
