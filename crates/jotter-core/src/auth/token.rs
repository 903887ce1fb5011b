//! HS256-signed bearer tokens.
//!
//! Wire format is a compact JWS: `base64url(header).base64url(claims).
//! base64url(signature)` without padding. The signature is checked before the
//! claims are trusted, and expiry is judged by the server clock alone.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use uuid::Uuid;

use crate::auth::password::HashParams;
use crate::defaults::{TOKEN_ALGORITHM, TOKEN_LIFETIME_SECS};
use crate::error::{Error, Result, TokenError};

type HmacSha256 = Hmac<Sha256>;

/// Authentication configuration injected at startup.
#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC signing secret. Must not be empty.
    pub jwt_secret: String,
    /// How long an issued token stays valid.
    pub token_lifetime: Duration,
    /// Cost parameters for new password hashes.
    pub hash_params: HashParams,
}

impl AuthConfig {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            token_lifetime: Duration::seconds(TOKEN_LIFETIME_SECS),
            hash_params: HashParams::default(),
        }
    }

    pub fn with_hash_params(mut self, hash_params: HashParams) -> Self {
        self.hash_params = hash_params;
        self
    }

    pub fn with_token_lifetime(mut self, token_lifetime: Duration) -> Self {
        self.token_lifetime = token_lifetime;
        self
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("token_lifetime", &self.token_lifetime)
            .field("hash_params", &self.hash_params)
            .finish()
    }
}

#[derive(Serialize, Deserialize)]
struct Header {
    alg: String,
    typ: String,
}

/// Token payload. Times are Unix seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Creates and verifies signed, time-limited bearer tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    secret: Vec<u8>,
    lifetime: Duration,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("secret", &"[REDACTED]")
            .field("lifetime", &self.lifetime)
            .finish()
    }
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Result<Self> {
        if config.jwt_secret.is_empty() {
            return Err(Error::Internal("JWT secret must not be empty".to_string()));
        }
        Ok(Self {
            secret: config.jwt_secret.as_bytes().to_vec(),
            lifetime: config.token_lifetime,
        })
    }

    fn mac(&self) -> std::result::Result<HmacSha256, TokenError> {
        HmacSha256::new_from_slice(&self.secret).map_err(|_| TokenError::Malformed)
    }

    /// Issue a token for `user_id` valid from now.
    pub fn issue(&self, user_id: Uuid) -> Result<String> {
        self.issue_at(user_id, Utc::now())
    }

    /// Issue a token as if the current instant were `now`.
    pub fn issue_at(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<String> {
        let header = Header {
            alg: TOKEN_ALGORITHM.to_string(),
            typ: "JWT".to_string(),
        };
        let iat = now.timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            iat,
            exp: iat + self.lifetime.num_seconds(),
        };

        let signing_input = format!(
            "{}.{}",
            encode_segment(&header)?,
            encode_segment(&claims)?
        );

        let mut mac = self
            .mac()
            .map_err(|_| Error::Internal("Invalid signing key".to_string()))?;
        mac.update(signing_input.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(format!("{}.{}", signing_input, signature))
    }

    /// Verify a token against the current clock and return its subject.
    pub fn verify(&self, token: &str) -> std::result::Result<Uuid, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify a token as if the current instant were `now`.
    pub fn verify_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> std::result::Result<Uuid, TokenError> {
        let segments: Vec<&str> = token.split('.').collect();
        let [header_b64, claims_b64, signature_b64] = segments[..] else {
            return Err(TokenError::Malformed);
        };

        let header: Header = decode_segment(header_b64)?;
        if header.alg != TOKEN_ALGORITHM {
            return Err(TokenError::Malformed);
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| TokenError::Malformed)?;
        let mut mac = self.mac()?;
        mac.update(header_b64.as_bytes());
        mac.update(b".");
        mac.update(claims_b64.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::Malformed)?;

        let claims: Claims = decode_segment(claims_b64)?;
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| TokenError::Malformed)?;
        if now.timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }
        Ok(user_id)
    }
}

fn encode_segment<T: Serialize>(value: &T) -> Result<String> {
    let bytes = serde_json::to_vec(value)
        .map_err(|e| Error::Internal(format!("Token encoding failed: {}", e)))?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

fn decode_segment<T: serde::de::DeserializeOwned>(
    segment: &str,
) -> std::result::Result<T, TokenError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| TokenError::Malformed)?;
    serde_json::from_slice(&bytes).map_err(|_| TokenError::Malformed)
}
