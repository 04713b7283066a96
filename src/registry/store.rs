//! Exam storage backends

use crate::registry::exam::Exam;
use std::sync::RwLock;

/// Append-only storage injected into the registry
pub trait ExamStore: Send + Sync {
    /// Append an exam at the end of the sequence
    fn append(&self, exam: Exam);

    /// Snapshot of every exam in insertion order
    fn snapshot(&self) -> Vec<Exam>;

    /// Number of stored exams
    fn len(&self) -> usize;

    /// Whether the store is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Volatile store, lost on restart
#[derive(Debug, Default)]
pub struct InMemoryExamStore {
    exams: RwLock<Vec<Exam>>,
}

impl InMemoryExamStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with exams
    pub fn with_exams(exams: Vec<Exam>) -> Self {
        Self {
            exams: RwLock::new(exams),
        }
    }
}

impl ExamStore for InMemoryExamStore {
    fn append(&self, exam: Exam) {
        // A poisoned lock still holds a valid Vec; appends never leave it half-written.
        let mut exams = self.exams.write().unwrap_or_else(|e| e.into_inner());
        exams.push(exam);
    }

    fn snapshot(&self) -> Vec<Exam> {
        self.exams.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn len(&self) -> usize {
        self.exams.read().unwrap_or_else(|e| e.into_inner()).len()
    }
}
