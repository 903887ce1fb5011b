//! Storage-backed operations.
//!
//! Every function here takes the caller's unit of work and leaves committing
//! to the caller, so a request's reads and writes succeed or fail together.

pub mod accounts;
pub mod notes;
pub mod tags;

pub use accounts::AccountService;
