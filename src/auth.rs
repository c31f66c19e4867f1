use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A client account the session layer can authenticate. The email address is
/// where booking notifications are delivered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub username: String,
    pub password: String,
    pub email: String,
}

/// Bearer-token session store. Tokens are issued on login and resolved on
/// every authenticated request; the core never sees an unresolved identity.
#[derive(Debug, Clone)]
pub struct SessionManager {
    accounts: Arc<Vec<Account>>,
    tokens: Arc<Mutex<HashMap<Uuid, String>>>,
}

impl SessionManager {
    pub fn new(accounts: Vec<Account>) -> Self {
        Self {
            accounts: Arc::new(accounts),
            tokens: Arc::default(),
        }
    }

    /// Verifies credentials and issues a fresh session token.
    pub fn login(&self, username: &str, password: &str) -> Option<Uuid> {
        self.accounts
            .iter()
            .find(|account| account.username == username && account.password == password)?;
        let token = Uuid::new_v4();
        let mut tokens = self.tokens.lock().unwrap();
        tokens.insert(token, username.into());
        Some(token)
    }

    /// Resolves a session token to the authenticated username.
    pub fn resolve(&self, token: Uuid) -> Option<String> {
        let tokens = self.tokens.lock().unwrap();
        tokens.get(&token).cloned()
    }

    pub fn logout(&self, token: Uuid) {
        let mut tokens = self.tokens.lock().unwrap();
        tokens.remove(&token);
    }

    pub fn email_of(&self, username: &str) -> Option<String> {
        self.accounts
            .iter()
            .find(|account| account.username == username)
            .map(|account| account.email.clone())
    }
}
