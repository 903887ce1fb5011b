//! Shared application state.

use std::sync::Arc;

use jotter_core::{AccountService, Store};

/// State handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub accounts: Arc<AccountService>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, accounts: AccountService) -> Self {
        Self {
            store,
            accounts: Arc::new(accounts),
        }
    }
}
