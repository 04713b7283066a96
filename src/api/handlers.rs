//! API Request Handlers
//!
//! Handlers for the exam routes and the dashboard page, plus the router
//! that maps a parsed request onto them.

use crate::api::models::*;
use crate::api::static_files::StaticFiles;
use crate::dashboard::{render_list, ExamRecord, ListView};
use crate::error::{ClinicError, Result};
use crate::registry::{Exam, ExamRegistry, NewExam};
use std::time::Instant;

/// Marker in the dashboard document replaced by the rendered exam list
pub const EXAM_LIST_MARKER: &str = "<!-- exames-lista -->";

/// Dashboard document, relative to the frontend root
pub const DASHBOARD_DOCUMENT: &str = "/clinica/dashboard/index.html";

/// Application state shared across handlers
pub struct AppState {
    /// Exam registry
    pub registry: ExamRegistry,
    /// Frontend asset tree
    pub frontend: StaticFiles,
    /// Server start time
    pub start_time: Instant,
}

impl AppState {
    /// Create application state
    pub fn new(registry: ExamRegistry, frontend: StaticFiles) -> Self {
        Self {
            registry,
            frontend,
            start_time: Instant::now(),
        }
    }
}

/// Handler for GET /exames
pub fn handle_list_exams(state: &AppState) -> Vec<Exam> {
    state.registry.list_exams()
}

/// Handler for POST /exames
pub fn handle_create_exam(state: &AppState, request: NewExam) -> Result<Exam> {
    state.registry.create_exam(request)
}

/// Handler for GET /clinica/dashboard. `Ok(None)` when the document is missing.
pub fn handle_dashboard(state: &AppState) -> Result<Option<Vec<u8>>> {
    let Some(file) = state.frontend.load(DASHBOARD_DOCUMENT)? else {
        return Ok(None);
    };

    let document = String::from_utf8_lossy(&file.body);
    if !document.contains(EXAM_LIST_MARKER) {
        return Ok(Some(file.body));
    }

    let records: Vec<ExamRecord> = state
        .registry
        .list_exams()
        .into_iter()
        .map(ExamRecord::from)
        .collect();
    let list = render_list(&ListView::from_records(&records));

    Ok(Some(document.replacen(EXAM_LIST_MARKER, &list, 1).into_bytes()))
}

/// Decode a create request. An empty body counts as `{}`.
pub fn parse_new_exam(body: &[u8]) -> Result<NewExam> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(NewExam::default());
    }
    Ok(serde_json::from_slice(body)?)
}

/// Route a request to its handler. `HEAD` is answered as `GET`; the
/// connection layer drops the body.
pub fn route_request(request: &HttpRequest, state: &AppState) -> HttpResponse {
    let method = match request.method.as_str() {
        "HEAD" => "GET",
        other => other,
    };
    let path = match request.path() {
        "/exames/" => "/exames",
        other => other,
    };

    match (method, path) {
        ("GET", "/exames") => HttpResponse::json(200, &handle_list_exams(state)),

        ("POST", "/exames") => {
            let created = parse_new_exam(&request.body)
                .and_then(|new_exam| handle_create_exam(state, new_exam));

            match created {
                Ok(exam) => HttpResponse::json(201, &exam),
                Err(ClinicError::Serialization(e)) => {
                    HttpResponse::error(400, format!("Corpo da requisição inválido: {e}"))
                }
                Err(e) if e.is_validation() => HttpResponse::error(400, e.to_string()),
                Err(e) => {
                    tracing::error!("Failed to create exam: {}", e);
                    HttpResponse::error(500, "Internal Server Error")
                }
            }
        }

        (_, "/exames") => HttpResponse::error(405, "Method not allowed"),

        ("GET", "/clinica/dashboard" | "/clinica/dashboard/") => match handle_dashboard(state) {
            Ok(Some(html)) => HttpResponse::bytes(200, "text/html; charset=utf-8", html),
            Ok(None) => HttpResponse::not_found(),
            Err(e) => {
                tracing::error!("Failed to serve dashboard: {}", e);
                HttpResponse::error(500, "Internal Server Error")
            }
        },

        ("GET", "/health") => HttpResponse::plain(200, "OK"),

        ("GET", path) => match state.frontend.load(path) {
            Ok(Some(file)) => HttpResponse::bytes(200, file.content_type, file.body),
            Ok(None) => HttpResponse::not_found(),
            Err(e) => {
                tracing::error!("Failed to serve {}: {}", path, e);
                HttpResponse::error(500, "Internal Server Error")
            }
        },

        _ => HttpResponse::not_found(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{ExamStatus, NO_FILE_SUBMITTED};
    use std::fs;
    use tempfile::TempDir;

    fn state() -> (TempDir, AppState) {
        let dir = TempDir::new().unwrap();
        let dashboard = dir.path().join("clinica").join("dashboard");
        fs::create_dir_all(&dashboard).unwrap();
        fs::write(
            dashboard.join("index.html"),
            format!("<main id=\"exames-lista\">{EXAM_LIST_MARKER}</main>"),
        )
        .unwrap();
        fs::write(dir.path().join("styles.css"), "body {}").unwrap();

        let state = AppState::new(ExamRegistry::with_seed(), StaticFiles::new(dir.path()));
        (dir, state)
    }

    #[test]
    fn test_list_exams() {
        let (_dir, state) = state();
        let response = route_request(&HttpRequest::new("GET", "/exames"), &state);

        assert_eq!(response.status, 200);
        assert!(response.content_type.starts_with("application/json"));
        let exams: Vec<Exam> = response.json_body().unwrap();
        assert_eq!(exams.len(), 2);
    }

    #[test]
    fn test_create_exam_without_file() {
        let (_dir, state) = state();
        let request = HttpRequest::new("POST", "/exames").with_body(r#"{"patientName":"Ana Souza"}"#);
        let response = route_request(&request, &state);

        assert_eq!(response.status, 201);
        let exam: Exam = response.json_body().unwrap();
        assert_eq!(exam.patient_name, "Ana Souza");
        assert_eq!(exam.file_name, NO_FILE_SUBMITTED);
        assert_eq!(exam.status, ExamStatus::AwaitingReport);

        let value: serde_json::Value = response.json_body().unwrap();
        assert_eq!(value["status"], "Aguardando Laudo");
    }

    #[test]
    fn test_create_exam_missing_name() {
        let (_dir, state) = state();

        for body in ["{}", "", r#"{"patientName":""}"#, r#"{"patientName":null}"#] {
            let request = HttpRequest::new("POST", "/exames").with_body(body);
            let response = route_request(&request, &state);

            assert_eq!(response.status, 400);
            assert_eq!(
                response.json_body::<ApiError>().unwrap(),
                ApiError::new("Nome do paciente é obrigatório.")
            );
        }
        assert_eq!(state.registry.len(), 2);
    }

    #[test]
    fn test_create_exam_malformed_body() {
        let (_dir, state) = state();
        let request = HttpRequest::new("POST", "/exames").with_body("{patientName:");
        let response = route_request(&request, &state);

        assert_eq!(response.status, 400);
        let error: ApiError = response.json_body().unwrap();
        assert!(error.message.starts_with("Corpo da requisição inválido"));
    }

    #[test]
    fn test_created_exam_is_listed_verbatim() {
        let (_dir, state) = state();
        let request = HttpRequest::new("POST", "/exames")
            .with_body(r#"{"patientName":"Ana Souza","fileName":"ECG_simulado.pdf"}"#);
        let created: Exam = route_request(&request, &state).json_body().unwrap();

        let listed: Vec<Exam> = route_request(&HttpRequest::new("GET", "/exames"), &state)
            .json_body()
            .unwrap();
        assert_eq!(listed.last(), Some(&created));
    }

    #[test]
    fn test_dashboard_routes_render_exams() {
        let (_dir, state) = state();

        for path in ["/clinica/dashboard", "/clinica/dashboard/", "/clinica/dashboard?x=1"] {
            let response = route_request(&HttpRequest::new("GET", path), &state);
            assert_eq!(response.status, 200);

            let html = String::from_utf8(response.body).unwrap();
            assert!(html.contains("Maria Silva"));
            assert!(html.contains("badge--ready"));
            assert!(!html.contains(EXAM_LIST_MARKER));
        }
    }

    #[test]
    fn test_dashboard_missing_document() {
        let dir = TempDir::new().unwrap();
        let state = AppState::new(ExamRegistry::in_memory(), StaticFiles::new(dir.path()));
        let response = route_request(&HttpRequest::new("GET", "/clinica/dashboard"), &state);
        assert_eq!(response.status, 404);
    }

    #[test]
    fn test_static_files_and_fallbacks() {
        let (_dir, state) = state();

        let response = route_request(&HttpRequest::new("GET", "/styles.css"), &state);
        assert_eq!(response.status, 200);
        assert_eq!(response.body, b"body {}");

        let response = route_request(&HttpRequest::new("GET", "/missing.js"), &state);
        assert_eq!(response.status, 404);

        let response = route_request(&HttpRequest::new("DELETE", "/exames"), &state);
        assert_eq!(response.status, 405);

        let response = route_request(&HttpRequest::new("PUT", "/styles.css"), &state);
        assert_eq!(response.status, 404);

        let response = route_request(&HttpRequest::new("GET", "/health"), &state);
        assert_eq!(response.body, b"OK");
    }

    #[test]
    fn test_bundled_frontend_loads_its_scripts() {
        let root = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("frontend");
        let state = AppState::new(ExamRegistry::with_seed(), StaticFiles::new(root));

        let page = route_request(&HttpRequest::new("GET", "/clinica/dashboard"), &state);
        let html = String::from_utf8(page.body).unwrap();
        assert!(html.contains(r#"<script src="/clinica/dashboard/app.js">"#));
        assert!(html.contains(r#"id="exames-lista""#));
        assert!(html.contains("Maria Silva"));

        let script = route_request(&HttpRequest::new("GET", "/clinica/dashboard/app.js"), &state);
        assert_eq!(script.status, 200);
        assert!(script.content_type.starts_with("application/javascript"));
        let script = String::from_utf8(script.body).unwrap();
        for id in ["form-exame", "novo-exame", "recarregar", "simular-anexo", "modal-exame"] {
            assert!(script.contains(id), "dashboard script does not wire {id}");
            assert!(html.contains(&format!(r#"id="{id}""#)), "dashboard page lacks {id}");
        }

        let login = route_request(&HttpRequest::new("GET", "/"), &state);
        let login = String::from_utf8(login.body).unwrap();
        assert!(login.contains(r#"<script src="/js/auth.js">"#));

        let script = route_request(&HttpRequest::new("GET", "/js/auth.js"), &state);
        assert_eq!(script.status, 200);
        let script = String::from_utf8(script.body).unwrap();
        assert!(script.contains("login-form"));
        assert!(script.contains("/api/auth/login"));
    }

    #[test]
    fn test_exam_routes_accept_trailing_slash_and_head() {
        let (_dir, state) = state();

        let response = route_request(&HttpRequest::new("GET", "/exames/"), &state);
        assert_eq!(response.status, 200);
        assert_eq!(response.json_body::<Vec<Exam>>().unwrap().len(), 2);

        let request = HttpRequest::new("POST", "/exames/").with_body(r#"{"patientName":"Ana"}"#);
        assert_eq!(route_request(&request, &state).status, 201);

        let head = route_request(&HttpRequest::new("HEAD", "/exames"), &state);
        let get = route_request(&HttpRequest::new("GET", "/exames"), &state);
        assert_eq!(head.status, 200);
        assert_eq!(head.body, get.body);
    }
}
