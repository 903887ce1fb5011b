//! The single authentication gate for protected operations.

use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::auth::token::TokenIssuer;
use crate::defaults::BEARER_SCHEME;
use crate::error::{AuthError, Result};
use crate::traits::RevocationLedger;

/// Extract the raw token from an `Authorization` header value.
///
/// The value must split on single spaces into exactly `Bearer` and a
/// non-empty token.
pub fn bearer_token(header: Option<&str>) -> std::result::Result<&str, AuthError> {
    let header = header.ok_or(AuthError::MalformedHeader)?;
    let parts: Vec<&str> = header.split(' ').collect();
    match parts[..] {
        [scheme, token] if scheme == BEARER_SCHEME && !token.is_empty() => Ok(token),
        _ => Err(AuthError::MalformedHeader),
    }
}

/// Composes header parsing, the revocation ledger and token verification.
#[derive(Debug, Clone)]
pub struct TokenValidator {
    issuer: TokenIssuer,
}

impl TokenValidator {
    pub fn new(issuer: TokenIssuer) -> Self {
        Self { issuer }
    }

    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    /// Resolve an `Authorization` header to the authenticated user id.
    ///
    /// Checks run in a fixed order: header shape, revocation, then signature
    /// and expiry. The only side effect is the ledger read.
    pub async fn authenticate<L>(&self, ledger: &mut L, header: Option<&str>) -> Result<Uuid>
    where
        L: RevocationLedger + ?Sized,
    {
        self.authenticate_at(ledger, header, Utc::now()).await
    }

    /// [`authenticate`](Self::authenticate) with an explicit clock.
    pub async fn authenticate_at<L>(
        &self,
        ledger: &mut L,
        header: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Uuid>
    where
        L: RevocationLedger + ?Sized,
    {
        let token = bearer_token(header).map_err(|e| reject(e, "malformed_header"))?;

        if ledger.is_revoked(token).await? {
            return Err(reject(AuthError::Revoked, "revoked").into());
        }

        let user_id = self
            .issuer
            .verify_at(token, now)
            .map_err(|e| reject(AuthError::from(e), "verify_failed"))?;
        Ok(user_id)
    }
}

fn reject(err: AuthError, rejection: &'static str) -> AuthError {
    debug!(
        subsystem = "auth",
        component = "validator",
        rejection,
        "Authentication rejected"
    );
    err
}
