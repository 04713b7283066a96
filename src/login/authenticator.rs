//! Authentication strategies
//!
//! [`RemoteAuthenticator`] talks to the real login endpoint,
//! [`MockAuthenticator`] accepts any complete form after a delay, and
//! [`FallbackAuthenticator`] chains them. Whether the mock is used at all
//! is decided where the strategy is built, never at the call site.

use crate::error::{ClinicError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Path of the login endpoint
pub const AUTH_PATH: &str = "/api/auth/login";

/// Token returned by the mock
pub const MOCK_TOKEN: &str = "mock-token";

/// Delay the mock waits before answering
pub const DEFAULT_MOCK_DELAY: Duration = Duration::from_millis(280);

/// Login form contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Login email
    pub email: String,
    /// Password
    pub password: String,
    /// Selected profile
    pub profile: String,
}

impl Credentials {
    /// Build credentials, trimming email and password as the form does
    pub fn new(email: &str, password: &str, profile: impl Into<String>) -> Self {
        Self {
            email: email.trim().to_string(),
            password: password.trim().to_string(),
            profile: profile.into(),
        }
    }

    /// Whether every field is filled
    pub fn is_complete(&self) -> bool {
        !self.email.is_empty() && !self.password.is_empty() && !self.profile.is_empty()
    }
}

/// User echoed back by the auth endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    /// Login email
    pub email: String,
    /// Profile
    pub profile: String,
}

/// Successful authentication
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Session token
    pub token: String,
    /// Authenticated user
    pub user: AuthUser,
}

/// Credential check strategy
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Authenticate the given credentials
    async fn authenticate(&self, credentials: &Credentials) -> Result<AuthResponse>;
}

/// POSTs credentials to the login endpoint
#[derive(Debug, Clone)]
pub struct RemoteAuthenticator {
    client: reqwest::Client,
    endpoint: String,
}

impl RemoteAuthenticator {
    /// Authenticator for a full endpoint URL
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    /// Authenticator for the login path of a server
    pub fn for_server(base_url: &str) -> Self {
        Self::new(format!("{}{}", base_url.trim_end_matches('/'), AUTH_PATH))
    }

    /// Endpoint URL
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Authenticator for RemoteAuthenticator {
    async fn authenticate(&self, credentials: &Credentials) -> Result<AuthResponse> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(credentials)
            .send()
            .await
            .map_err(|e| ClinicError::network(&self.endpoint, e.to_string()))?;

        if !response.status().is_success() {
            tracing::debug!(status = %response.status(), "Login endpoint rejected credentials");
            return Err(ClinicError::InvalidCredentials);
        }

        Ok(response.json::<AuthResponse>().await?)
    }
}

/// Local stand-in that accepts any complete form
#[derive(Debug, Clone)]
pub struct MockAuthenticator {
    delay: Duration,
}

impl MockAuthenticator {
    /// Mock waiting `delay` before answering
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Configured delay
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for MockAuthenticator {
    fn default() -> Self {
        Self::new(DEFAULT_MOCK_DELAY)
    }
}

#[async_trait]
impl Authenticator for MockAuthenticator {
    async fn authenticate(&self, credentials: &Credentials) -> Result<AuthResponse> {
        tokio::time::sleep(self.delay).await;

        if !credentials.is_complete() {
            return Err(ClinicError::MissingCredentials);
        }

        Ok(AuthResponse {
            token: MOCK_TOKEN.to_string(),
            user: AuthUser {
                email: credentials.email.clone(),
                profile: credentials.profile.clone(),
            },
        })
    }
}

/// Tries the primary strategy and, when configured, falls back when it was
/// unreachable or answered with a non-2xx status. A 2xx with an unreadable
/// body is reported as is.
pub struct FallbackAuthenticator {
    primary: Box<dyn Authenticator>,
    fallback: Option<Box<dyn Authenticator>>,
}

impl FallbackAuthenticator {
    /// Chain `primary` with an optional `fallback`
    pub fn new(primary: Box<dyn Authenticator>, fallback: Option<Box<dyn Authenticator>>) -> Self {
        Self { primary, fallback }
    }

    /// Remote endpoint with the mock behind it
    pub fn remote_with_mock(endpoint: impl Into<String>, mock_delay: Duration) -> Self {
        Self::new(
            Box::new(RemoteAuthenticator::new(endpoint)),
            Some(Box::new(MockAuthenticator::new(mock_delay))),
        )
    }

    /// Whether a fallback is configured
    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }
}

#[async_trait]
impl Authenticator for FallbackAuthenticator {
    async fn authenticate(&self, credentials: &Credentials) -> Result<AuthResponse> {
        match self.primary.authenticate(credentials).await {
            Ok(response) => Ok(response),
            Err(e) => match &self.fallback {
                Some(fallback) if e.is_recoverable() => {
                    tracing::warn!("Primary authentication failed ({}), using fallback", e);
                    fallback.authenticate(credentials).await
                }
                _ => Err(e),
            },
        }
    }
}
