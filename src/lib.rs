//! # CardioPix - Cardiac Exam Tracking
//!
//! CardioPix lets clinic staff register cardiac exams and follow whether the
//! report is still awaited or already available.
//!
//! ## Components
//!
//! - **Exam Registry**: in-memory, append-only exam collection
//! - **HTTP API**: `GET`/`POST /exames`, the dashboard page and static assets
//! - **Dashboard Client**: list view-model, HTML rendering, exam form
//! - **Login Client**: remote login with mock fallback, persisted session
//!
//! ## Quick Start
//!
//! ```no_run
//! use cardiopix::api::{ApiServer, ApiServerConfig, AppState, StaticFiles};
//! use cardiopix::registry::ExamRegistry;
//!
//! let config = ApiServerConfig::default();
//! let state = AppState::new(
//!     ExamRegistry::with_seed(),
//!     StaticFiles::new(&config.frontend_root),
//! );
//!
//! let server = ApiServer::bind(config, state).unwrap();
//! server.run().unwrap();
//! ```
//!
//! ## Registering Exams
//!
//! ```
//! use cardiopix::registry::{ExamRegistry, ExamStatus, NewExam, NO_FILE_SUBMITTED};
//!
//! let registry = ExamRegistry::in_memory();
//! let exam = registry.create_exam(NewExam::new("Ana Souza")).unwrap();
//!
//! assert_eq!(exam.status, ExamStatus::AwaitingReport);
//! assert_eq!(exam.file_name, NO_FILE_SUBMITTED);
//! assert!(registry.create_exam(NewExam::default()).is_err());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod api;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod login;
pub mod registry;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use error::{ClinicError, Result};
pub use registry::{Exam, ExamRegistry, ExamStatus, NewExam};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    //! Convenient re-exports for common usage
    //!
    //! ```no_run
    //! use cardiopix::prelude::*;
    //! ```

    pub use crate::api::{ApiServer, ApiServerConfig, AppState, StaticFiles};
    pub use crate::dashboard::{Dashboard, ExamApi, HttpExamApi, ListView, SubmitOutcome};
    pub use crate::error::{ClinicError, Result};
    pub use crate::login::{
        Authenticator, Credentials, FallbackAuthenticator, FileSessionStore, LoginFlow,
        LoginState, MockAuthenticator, Session, SessionStore,
    };
    pub use crate::registry::{Exam, ExamRegistry, ExamStatus, ExamStore, NewExam};
}
