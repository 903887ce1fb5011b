//! Centralized default constants for jotter.
//!
//! **This module is the single source of truth** for shared limits and
//! defaults. Validation, the services, and the HTTP layer reference these
//! constants instead of defining their own magic numbers.

// =============================================================================
// TOKENS
// =============================================================================

/// Bearer token lifetime in seconds (one hour).
pub const TOKEN_LIFETIME_SECS: i64 = 3600;

/// Signing algorithm name carried in the token header.
pub const TOKEN_ALGORITHM: &str = "HS256";

/// Scheme word expected before the token in the Authorization header.
pub const BEARER_SCHEME: &str = "Bearer";

/// Length of the random secret generated when none is configured.
pub const EPHEMERAL_SECRET_LEN: usize = 64;

// =============================================================================
// ACCOUNTS
// =============================================================================

/// Minimum username length in characters.
pub const USERNAME_MIN_LEN: usize = 3;

/// Maximum username length in characters.
pub const USERNAME_MAX_LEN: usize = 20;

/// Maximum stored email length.
pub const EMAIL_MAX_LEN: usize = 120;

/// Minimum password length in characters.
pub const PASSWORD_MIN_LEN: usize = 8;

// =============================================================================
// NOTES & TAGS
// =============================================================================

/// Maximum note title length in characters.
pub const TITLE_MAX_LEN: usize = 200;

/// Maximum tag name length in characters.
pub const TAG_NAME_MAX_LEN: usize = 50;

// =============================================================================
// PAGINATION
// =============================================================================

/// Upper bound applied to caller-supplied list limits.
pub const PAGE_LIMIT_MAX: i64 = 500;
