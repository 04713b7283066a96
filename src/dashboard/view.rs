//! Dashboard view-model
//!
//! Converts exam records into the rows, badges and placeholders the
//! dashboard renders. No markup is produced here; see `render`.

use crate::registry::{Exam, ExamStatus, NO_FILE_SUBMITTED};
use chrono::{DateTime, Datelike, Local, NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// Column titles of the exam table
pub const TABLE_HEADERS: [&str; 4] = ["Paciente", "Arquivo", "Status", "Criado em"];

/// Placeholder while the list is being fetched
pub const LOADING_TEXT: &str = "Carregando exames...";
/// Placeholder for an empty registry
pub const EMPTY_TEXT: &str = "Nenhum exame cadastrado ainda.";
/// Placeholder when fetching or parsing the list failed
pub const ERROR_TEXT: &str = "Erro ao carregar exames.";

/// Lowercase fragments that mark free-text status as pending
const PENDING_MARKERS: [&str; 2] = ["aguardando", "awaiting"];

const MONTHS_PT_BR: [&str; 12] = [
    "jan", "fev", "mar", "abr", "mai", "jun", "jul", "ago", "set", "out", "nov", "dez",
];

/// Visual style of a status badge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeStyle {
    /// Report still awaited
    Pending,
    /// Report available
    Ready,
}

/// Explicit status to style table
const STATUS_STYLES: [(ExamStatus, BadgeStyle); 2] = [
    (ExamStatus::AwaitingReport, BadgeStyle::Pending),
    (ExamStatus::ReportAvailable, BadgeStyle::Ready),
];

impl BadgeStyle {
    /// Style for a known status
    pub fn for_status(status: ExamStatus) -> Self {
        STATUS_STYLES
            .iter()
            .find(|(s, _)| *s == status)
            .map_or(Self::Ready, |(_, style)| *style)
    }

    /// Style for status text as received from the server.
    ///
    /// Known labels go through the status table. Anything else is pending
    /// when it contains a pending marker, case-insensitively, and ready otherwise.
    pub fn classify_text(text: &str) -> Self {
        if let Some(status) = ExamStatus::from_label(text) {
            return Self::for_status(status);
        }

        let normalized = text.to_lowercase();
        if PENDING_MARKERS.iter().any(|m| normalized.contains(m)) {
            Self::Pending
        } else {
            Self::Ready
        }
    }

    /// CSS modifier class
    pub fn css_class(&self) -> &'static str {
        match self {
            Self::Pending => "badge--pending",
            Self::Ready => "badge--ready",
        }
    }
}

/// Status as read by the client: a known status or unrecognized text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DisplayStatus {
    /// One of the registry's statuses
    Known(ExamStatus),
    /// Text this client does not know
    Other(String),
}

impl DisplayStatus {
    /// Text shown inside the badge
    pub fn label(&self) -> &str {
        match self {
            Self::Known(status) => status.label(),
            Self::Other(text) => text,
        }
    }

    /// Badge style for this status
    pub fn style(&self) -> BadgeStyle {
        match self {
            Self::Known(status) => BadgeStyle::for_status(*status),
            Self::Other(text) => BadgeStyle::classify_text(text),
        }
    }
}

/// Exam as received by the dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamRecord {
    /// Exam id
    pub id: u64,
    /// Patient name
    pub patient_name: String,
    /// Attachment name, possibly absent
    #[serde(default)]
    pub file_name: Option<String>,
    /// Report status
    pub status: DisplayStatus,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl From<Exam> for ExamRecord {
    fn from(exam: Exam) -> Self {
        Self {
            id: exam.id,
            patient_name: exam.patient_name,
            file_name: Some(exam.file_name),
            status: DisplayStatus::Known(exam.status),
            created_at: exam.created_at,
        }
    }
}

/// Status badge of a row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    /// Badge text
    pub label: String,
    /// Badge style
    pub style: BadgeStyle,
}

/// One table row, in display order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamRow {
    /// Patient name
    pub patient_name: String,
    /// `ID #<id>`
    pub id_label: String,
    /// Attachment name or the not-submitted sentinel
    pub file_name: String,
    /// Status badge
    pub badge: Badge,
    /// Creation date formatted for display
    pub created_at: String,
}

impl From<&ExamRecord> for ExamRow {
    fn from(record: &ExamRecord) -> Self {
        let file_name = record
            .file_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(NO_FILE_SUBMITTED)
            .to_string();

        Self {
            patient_name: record.patient_name.clone(),
            id_label: format!("ID #{}", record.id),
            file_name,
            badge: Badge {
                label: record.status.label().to_string(),
                style: record.status.style(),
            },
            created_at: format_created_at(&record.created_at),
        }
    }
}

/// What the exam list area currently shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListView {
    /// Fetch in flight
    Loading,
    /// Registry has no exams
    Empty,
    /// Fetch or parse failed
    Error,
    /// Rows to render
    Table(Vec<ExamRow>),
}

impl ListView {
    /// Build the view for a fetched list
    pub fn from_records(records: &[ExamRecord]) -> Self {
        if records.is_empty() {
            Self::Empty
        } else {
            Self::Table(records.iter().map(ExamRow::from).collect())
        }
    }

    /// Placeholder text, `None` for a table
    pub fn placeholder(&self) -> Option<&'static str> {
        match self {
            Self::Loading => Some(LOADING_TEXT),
            Self::Empty => Some(EMPTY_TEXT),
            Self::Error => Some(ERROR_TEXT),
            Self::Table(_) => None,
        }
    }
}

/// Format a creation time in local time, e.g. `05 de out., 14:07`
pub fn format_created_at(at: &DateTime<Utc>) -> String {
    format_timestamp(&at.with_timezone(&Local).naive_local())
}

/// Day, abbreviated month, hour and minute in pt-BR style
pub fn format_timestamp(at: &NaiveDateTime) -> String {
    format!(
        "{:02} de {}., {:02}:{:02}",
        at.day(),
        MONTHS_PT_BR[at.month0() as usize],
        at.hour(),
        at.minute()
    )
}
