//! CardioPix HTTP API
//!
//! Exposes the exam registry over JSON and serves the clinic frontend.
//!
//! ## API Endpoints
//!
//! | Endpoint | Method | Description |
//! |----------|--------|-------------|
//! | `/exames` | GET | List every exam in insertion order |
//! | `/exames` | POST | Register an exam (`{patientName, fileName?}`) |
//! | `/clinica/dashboard` | GET | Clinic dashboard document |
//! | `/health` | GET | Liveness probe |
//! | anything else | GET | Static file from the frontend tree |

mod handlers;
mod models;
mod server;
mod static_files;

pub use handlers::*;
pub use models::*;
pub use server::*;
pub use static_files::*;
