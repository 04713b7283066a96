//! Exam Registry
//!
//! Authoritative collection of exams served by the HTTP API. The registry is
//! an explicit object owned by the server's composition root; storage is
//! injected through [`ExamStore`] so tests can build isolated registries.
//!
//! Ids come from an atomic counter owned by the registry, not from the
//! length of the stored sequence.

mod exam;
mod store;

pub use exam::*;
pub use store::*;

use crate::error::{ClinicError, Result};
use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Registry of exams over an injected store
pub struct ExamRegistry<S: ExamStore = InMemoryExamStore> {
    store: S,
    next_id: AtomicU64,
}

impl ExamRegistry<InMemoryExamStore> {
    /// Empty in-memory registry
    pub fn in_memory() -> Self {
        Self::new(InMemoryExamStore::new())
    }

    /// In-memory registry holding the demo seed exams
    pub fn with_seed() -> Self {
        Self::new(InMemoryExamStore::with_exams(seed_exams()))
    }
}

impl<S: ExamStore> ExamRegistry<S> {
    /// Create a registry over a store. The id counter continues after the
    /// highest id already present.
    pub fn new(store: S) -> Self {
        let next_id = store
            .snapshot()
            .iter()
            .map(|e| e.id)
            .max()
            .map_or(1, |max| max + 1);

        Self {
            store,
            next_id: AtomicU64::new(next_id),
        }
    }

    /// All exams in insertion order
    pub fn list_exams(&self) -> Vec<Exam> {
        self.store.snapshot()
    }

    /// Validate and append a new exam awaiting its report
    pub fn create_exam(&self, request: NewExam) -> Result<Exam> {
        let patient_name = request
            .patient_name
            .filter(|name| !name.trim().is_empty())
            .ok_or(ClinicError::MissingPatientName)?;

        let file_name = request
            .file_name
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| NO_FILE_SUBMITTED.to_string());

        let exam = Exam {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            patient_name,
            file_name,
            status: ExamStatus::AwaitingReport,
            created_at: Utc::now(),
        };

        self.store.append(exam.clone());
        tracing::info!(id = exam.id, patient = %exam.patient_name, "Exam registered");

        Ok(exam)
    }

    /// Number of registered exams
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Whether no exam is registered
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

/// Demo exams present when the server starts
pub fn seed_exams() -> Vec<Exam> {
    let now = Utc::now();
    vec![
        Exam {
            id: 1,
            patient_name: "Maria Silva".to_string(),
            file_name: "ecg_maria.pdf".to_string(),
            status: ExamStatus::AwaitingReport,
            created_at: now,
        },
        Exam {
            id: 2,
            patient_name: "João Pereira".to_string(),
            file_name: "ecg_joao.pdf".to_string(),
            status: ExamStatus::ReportAvailable,
            created_at: now,
        },
    ]
}
