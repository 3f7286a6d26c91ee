//! Session and credential-provider abstraction
//!
//! The identity provider sits behind [`AuthProvider`] so everything above it
//! can be exercised against a stub, and the resulting [`Session`] is an
//! explicit context object handed to every data-fetching call rather than
//! ambient global state.

use crate::api::ApiClient;
use crate::error::Result;
use crate::models::UserAccount;
use async_trait::async_trait;

/// An authenticated session against the backend
///
/// Carries the bearer token plus the account profile returned at login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    token: String,
    account: UserAccount,
}

impl Session {
    pub fn new(token: impl Into<String>, account: UserAccount) -> Self {
        Self {
            token: token.into(),
            account,
        }
    }

    pub fn account(&self) -> &UserAccount {
        &self.account
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Value for the `Authorization` header
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

/// Credential exchange seam
///
/// `login` either yields a full [`Session`] or an error; there is no partial
/// success. Implementations must not retry on their own.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<Session>;
}

/// The real provider: delegates to the backend's `/api/user/login`
#[derive(Debug, Clone)]
pub struct BackendAuthProvider {
    client: ApiClient,
}

impl BackendAuthProvider {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AuthProvider for BackendAuthProvider {
    async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let response = self.client.login(email, password).await?;
        Ok(Session::new(response.token, response.account))
    }
}
