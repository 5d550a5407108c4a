//! Credential injection.
//!
//! The client never reads tokens from ambient storage. Callers hand it either a
//! fixed token or a [`TokenProvider`] that is asked once per request.

use std::fmt::Debug;
use std::sync::{Arc, RwLock};

/// Source of the current bearer token.
pub trait TokenProvider: Send + Sync + Debug {
    /// Token to send with the next request, or `None` to send no credentials.
    fn current_token(&self) -> Option<String>;
}

/// Authentication strategy for the API.
#[derive(Clone, Debug, Default)]
pub enum Auth {
    /// No `Authorization` header
    #[default]
    None,
    /// `Authorization: Bearer {token}`
    Bearer(String),
    /// `Authorization: Bearer {provider.current_token()}`
    Provider(Arc<dyn TokenProvider>),
}

impl Auth {
    pub fn current_token(&self) -> Option<String> {
        match self {
            Auth::None => None,
            Auth::Bearer(token) => Some(token.clone()),
            Auth::Provider(provider) => provider.current_token(),
        }
    }
}

/// Replaceable token shared between the client and whoever refreshes it.
#[derive(Debug, Default)]
pub struct StaticToken {
    token: RwLock<Option<String>>,
}

impl StaticToken {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: RwLock::new(token),
        }
    }

    pub fn set(&self, token: Option<String>) {
        match self.token.write() {
            Ok(mut guard) => *guard = token,
            Err(poisoned) => *poisoned.into_inner() = token,
        }
    }
}

impl TokenProvider for StaticToken {
    fn current_token(&self) -> Option<String> {
        match self.token.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}
