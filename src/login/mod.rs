//! Login Client
//!
//! Drives the login form: authenticate through an [`Authenticator`],
//! persist the session and decide where the user lands. Every state change
//! is published on a `watch` channel so a front end can render the status
//! line while the flow runs.

mod authenticator;
mod session;

pub use authenticator::*;
pub use session::*;

use crate::error::ClinicError;
use std::sync::Arc;
use tokio::sync::watch;

/// Profile of clinic administrators
pub const CLINIC_ADMIN_PROFILE: &str = "ADMIN/CLINICA";

/// Landing page of clinic administrators
pub const CLINIC_DASHBOARD_PATH: &str = "/frontend/dashboard-clinica.html";
/// Landing page of every other profile
pub const REPORT_QUEUE_PATH: &str = "/frontend/fila-laudos.html";

/// Status while authenticating
pub const STATUS_AUTHENTICATING: &str = "Autenticando...";
/// Status after a successful login
pub const STATUS_SUCCESS: &str = "Login realizado com sucesso! Redirecionando...";
/// Status when the login could not be completed for a non-user reason
pub const STATUS_FAILURE_FALLBACK: &str = "Não foi possível fazer login agora.";

/// Page a profile is sent to after login
pub fn redirect_for(profile: &str) -> &'static str {
    if profile == CLINIC_ADMIN_PROFILE {
        CLINIC_DASHBOARD_PATH
    } else {
        REPORT_QUEUE_PATH
    }
}

/// State of the login form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginState {
    /// Waiting for input
    Idle,
    /// Credentials submitted
    Authenticating,
    /// Session saved, user should be redirected
    Succeeded {
        /// Persisted session
        session: Session,
        /// Target page
        redirect: &'static str,
    },
    /// Login failed
    Failed {
        /// Message shown in the error-styled status area
        message: String,
    },
}

impl LoginState {
    /// Status line for this state, `None` while idle
    pub fn status_message(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::Authenticating => Some(STATUS_AUTHENTICATING),
            Self::Succeeded { .. } => Some(STATUS_SUCCESS),
            Self::Failed { message } => Some(message),
        }
    }

    /// Whether the status line uses the error style
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Login form controller
pub struct LoginFlow {
    authenticator: Box<dyn Authenticator>,
    sessions: Arc<dyn SessionStore>,
    state: watch::Sender<LoginState>,
}

impl LoginFlow {
    /// Create a flow over an authentication strategy and a session store
    pub fn new(authenticator: Box<dyn Authenticator>, sessions: Arc<dyn SessionStore>) -> Self {
        let (state, _) = watch::channel(LoginState::Idle);
        Self {
            authenticator,
            sessions,
            state,
        }
    }

    /// Current state
    pub fn state(&self) -> LoginState {
        self.state.borrow().clone()
    }

    /// Receive every state change
    pub fn subscribe(&self) -> watch::Receiver<LoginState> {
        self.state.subscribe()
    }

    /// Submit the form. Returns the final state.
    pub async fn submit(&self, credentials: Credentials) -> LoginState {
        self.state.send_replace(LoginState::Authenticating);

        let outcome = match self.authenticator.authenticate(&credentials).await {
            Ok(response) => {
                let session = Session {
                    email: response.user.email,
                    profile: response.user.profile,
                };

                match persist_session(self.sessions.as_ref(), &session) {
                    Ok(()) => {
                        let redirect = redirect_for(&session.profile);
                        tracing::info!(email = %session.email, redirect, "Login succeeded");
                        LoginState::Succeeded { session, redirect }
                    }
                    Err(e) => {
                        tracing::warn!("Could not persist session: {}", e);
                        LoginState::Failed {
                            message: STATUS_FAILURE_FALLBACK.to_string(),
                        }
                    }
                }
            }
            Err(e) if e.is_validation() || matches!(e, ClinicError::InvalidCredentials) => {
                LoginState::Failed {
                    message: e.to_string(),
                }
            }
            Err(e) => {
                tracing::warn!("Login failed: {}", e);
                LoginState::Failed {
                    message: STATUS_FAILURE_FALLBACK.to_string(),
                }
            }
        };

        self.state.send_replace(outcome.clone());
        outcome
    }
}
