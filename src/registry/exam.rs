//! Exam domain model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// File name recorded when an exam is created without an attachment
pub const NO_FILE_SUBMITTED: &str = "Arquivo não enviado";

/// Report status of an exam
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ExamStatus {
    /// Waiting for the cardiologist's report
    #[serde(rename = "Aguardando Laudo")]
    AwaitingReport,
    /// Report has been issued
    #[serde(rename = "Laudo Disponível")]
    ReportAvailable,
}

impl ExamStatus {
    /// Label shown to clinic staff, identical to the wire value
    pub fn label(&self) -> &'static str {
        match self {
            Self::AwaitingReport => "Aguardando Laudo",
            Self::ReportAvailable => "Laudo Disponível",
        }
    }

    /// Parse a wire label back into a status
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Aguardando Laudo" => Some(Self::AwaitingReport),
            "Laudo Disponível" => Some(Self::ReportAvailable),
            _ => None,
        }
    }
}

impl fmt::Display for ExamStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A cardiac exam tracked by the registry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Exam {
    /// Registry-assigned id
    pub id: u64,
    /// Patient name, never empty
    pub patient_name: String,
    /// Attached file name, or [`NO_FILE_SUBMITTED`]
    pub file_name: String,
    /// Report status
    pub status: ExamStatus,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

/// Create exam request, as posted by the dashboard
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewExam {
    /// Patient name; absent or blank is rejected
    #[serde(default)]
    pub patient_name: Option<String>,
    /// Optional attachment name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

impl NewExam {
    /// Request for a patient without attachment
    pub fn new(patient_name: impl Into<String>) -> Self {
        Self {
            patient_name: Some(patient_name.into()),
            file_name: None,
        }
    }

    /// Attach a file name
    pub fn with_file(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }
}
