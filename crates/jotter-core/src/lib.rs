//! # jotter-core
//!
//! Core types, traits, authentication and note lifecycle for jotter.
//!
//! This crate holds everything that does not depend on a particular storage
//! backend or transport: the domain models, the storage traits, the password
//! hasher and token machinery, the note state machine, and the services that
//! drive them through a [`UnitOfWork`]. [`MemoryStore`] is an in-process
//! implementation of the storage traits.
//!
//! ## Logging
//!
//! Events carry structured `tracing` fields: `subsystem` (`auth`, `notes`,
//! `tags`, `database`), an optional `component`, `op`, and the ids involved
//! (`user_id`, `note_id`, `tag_id`).
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Storage or internal failure surfaced as a 500 |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events (startup, shutdown), completed mutations |
//! | DEBUG | Decision points such as an authentication rejection reason |
//! | TRACE | Per-row detail |
//!
//! Raw bearer tokens and passwords are never logged under any field.

pub mod auth;
pub mod defaults;
pub mod error;
pub mod lifecycle;
pub mod memory;
pub mod models;
pub mod service;
pub mod traits;
pub mod validation;

// Re-export commonly used types at crate root
pub use auth::{AuthConfig, HashParams, PasswordHasher, TokenIssuer, TokenValidator};
pub use error::{AuthError, Error, Result, TokenError};
pub use memory::MemoryStore;
pub use models::*;
pub use service::AccountService;
pub use traits::*;
