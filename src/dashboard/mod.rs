//! Dashboard Client
//!
//! Controller behind the clinic dashboard: loads and renders the exam list,
//! drives the "new exam" modal and keeps the attachment selection. The
//! server goes through [`ExamApi`], so the same controller runs against a
//! remote server or an in-process registry.

mod client;
mod render;
mod view;

pub use client::*;
pub use render::*;
pub use view::*;

use crate::error::ClinicError;
use crate::registry::NewExam;

/// Upload label when no file is attached
pub const NO_FILE_SELECTED: &str = "Nenhum arquivo selecionado";
/// Name used by the simulated attachment
pub const SIMULATED_FILE_NAME: &str = "ECG_simulado.pdf";

/// Alert for a submission without patient name
pub const ALERT_MISSING_PATIENT: &str = "Informe o nome do paciente.";
/// Alert when the server rejected the exam without a message
pub const ALERT_SAVE_FAILED: &str = "Não foi possível salvar o exame.";
/// Alert when the server could not be reached
pub const ALERT_UNREACHABLE: &str = "Falha ao comunicar com o servidor.";

/// File attached to the exam form
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Attachment {
    /// Nothing attached
    #[default]
    None,
    /// File picked from disk
    Selected(String),
    /// Fixed demo attachment
    Simulated,
}

impl Attachment {
    /// Attached file name, if any
    pub fn file_name(&self) -> Option<&str> {
        match self {
            Self::None => None,
            Self::Selected(name) => Some(name),
            Self::Simulated => Some(SIMULATED_FILE_NAME),
        }
    }
}

/// Result of submitting the exam form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Exam registered, list reloaded, modal closed
    Saved(ExamRecord),
    /// Blocking alert shown to the user; the modal stays open
    Alert(String),
}

/// Dashboard controller
pub struct Dashboard<A: ExamApi> {
    api: A,
    view: ListView,
    modal_open: bool,
    patient_name: String,
    attachment: Attachment,
}

impl<A: ExamApi> Dashboard<A> {
    /// Create a dashboard; call [`Dashboard::reload`] to populate it
    pub fn new(api: A) -> Self {
        Self {
            api,
            view: ListView::Loading,
            modal_open: false,
            patient_name: String::new(),
            attachment: Attachment::None,
        }
    }

    /// Current list view
    pub fn view(&self) -> &ListView {
        &self.view
    }

    /// Current list rendered as HTML
    pub fn render(&self) -> String {
        render_list(&self.view)
    }

    /// Fetch the exams and rebuild the list view. Failures become the
    /// error placeholder.
    pub async fn reload(&mut self) -> &ListView {
        self.view = ListView::Loading;

        self.view = match self.api.list_exams().await {
            Ok(records) => ListView::from_records(&records),
            Err(e) => {
                tracing::warn!("Failed to load exams: {}", e);
                ListView::Error
            }
        };

        &self.view
    }

    /// Whether the modal is visible
    pub fn is_modal_open(&self) -> bool {
        self.modal_open
    }

    /// Value of the modal's `aria-hidden` attribute
    pub fn aria_hidden(&self) -> &'static str {
        if self.modal_open {
            "false"
        } else {
            "true"
        }
    }

    /// Show the modal
    pub fn open_modal(&mut self) {
        self.modal_open = true;
    }

    /// Hide the modal and reset the form
    pub fn close_modal(&mut self) {
        self.modal_open = false;
        self.patient_name.clear();
        self.attachment = Attachment::None;
    }

    /// Patient name typed in the form
    pub fn patient_name(&self) -> &str {
        &self.patient_name
    }

    /// Update the patient name field
    pub fn set_patient_name(&mut self, name: impl Into<String>) {
        self.patient_name = name.into();
    }

    /// Current attachment
    pub fn attachment(&self) -> &Attachment {
        &self.attachment
    }

    /// Pick a real file, or clear the picker with `None`. Replaces any
    /// simulated attachment.
    pub fn select_file(&mut self, file_name: Option<String>) {
        self.attachment = match file_name {
            Some(name) if !name.is_empty() => Attachment::Selected(name),
            _ => Attachment::None,
        };
    }

    /// Attach the demo file, clearing any real selection
    pub fn simulate_attachment(&mut self) {
        self.attachment = Attachment::Simulated;
    }

    /// Text shown next to the upload control
    pub fn upload_label(&self) -> &str {
        self.attachment.file_name().unwrap_or(NO_FILE_SELECTED)
    }

    /// Submit the form
    pub async fn submit(&mut self) -> SubmitOutcome {
        if self.patient_name.trim().is_empty() {
            return SubmitOutcome::Alert(ALERT_MISSING_PATIENT.to_string());
        }

        let request = NewExam {
            patient_name: Some(self.patient_name.clone()),
            file_name: self.attachment.file_name().map(str::to_string),
        };

        match self.api.create_exam(&request).await {
            Ok(record) => {
                self.reload().await;
                self.close_modal();
                SubmitOutcome::Saved(record)
            }
            Err(e) => {
                tracing::warn!("Failed to save exam: {}", e);
                SubmitOutcome::Alert(alert_for(&e))
            }
        }
    }
}

fn alert_for(err: &ClinicError) -> String {
    match err {
        e if e.is_validation() => e.to_string(),
        ClinicError::Server { message, .. } => message
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or(ALERT_SAVE_FAILED)
            .to_string(),
        _ => ALERT_UNREACHABLE.to_string(),
    }
}
