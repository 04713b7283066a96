//! HTTP API Server
//!
//! Lightweight HTTP/1.1 server for the exam API and the clinic frontend.
//! Blocking accept loop with one thread per connection, no web framework.
//!
//! ## Running the Server
//!
//! ```bash
//! # Default port 3000, or $PORT
//! cardiopix serve
//!
//! # Custom bind address and asset tree
//! cardiopix serve --bind 127.0.0.1 --port 8080 --frontend ./frontend
//! ```

use crate::api::handlers::*;
use crate::api::models::*;
use crate::error::{ClinicError, Result};
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiServerConfig {
    /// Bind address
    pub bind: String,
    /// Port
    pub port: u16,
    /// Frontend asset root
    pub frontend_root: PathBuf,
    /// Enable CORS for all origins
    pub cors_enabled: bool,
    /// Maximum request body size (bytes)
    pub max_body_size: usize,
}

impl Default for ApiServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 3000,
            frontend_root: PathBuf::from("frontend"),
            cors_enabled: true,
            max_body_size: 1024 * 1024, // 1 MiB
        }
    }
}

impl ApiServerConfig {
    /// `bind:port`
    pub fn address(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

/// API HTTP Server
pub struct ApiServer {
    /// Bound listener
    listener: TcpListener,
    /// Configuration
    config: ApiServerConfig,
    /// Shared application state
    state: Arc<AppState>,
    /// Shutdown flag
    shutdown: Arc<AtomicBool>,
}

impl ApiServer {
    /// Bind the configured address
    pub fn bind(config: ApiServerConfig, state: AppState) -> Result<Self> {
        let addr = config.address();
        let listener = TcpListener::bind(&addr)
            .map_err(|e| ClinicError::network(&addr, e.to_string()))?;

        Ok(Self {
            listener,
            config,
            state: Arc::new(state),
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Get the bound address
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Get shutdown flag for external control
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Get shared state
    pub fn state(&self) -> Arc<AppState> {
        Arc::clone(&self.state)
    }

    /// Run the server (blocking)
    pub fn run(&self) -> Result<()> {
        self.listener
            .set_nonblocking(true)
            .map_err(|e| ClinicError::network("listener", e.to_string()))?;

        tracing::info!(
            "Servidor executando na porta {}",
            self.local_addr().map(|a| a.port()).unwrap_or(self.config.port)
        );

        while !self.shutdown.load(Ordering::SeqCst) {
            match self.listener.accept() {
                Ok((stream, addr)) => {
                    tracing::debug!("Accepted connection from {}", addr);

                    let state = Arc::clone(&self.state);
                    let config = self.config.clone();

                    thread::spawn(move || {
                        if let Err(e) = handle_connection(stream, &state, &config) {
                            tracing::error!("Connection error: {}", e);
                        }
                    });
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(Duration::from_millis(10));
                }
                Err(e) => {
                    tracing::error!("Accept error: {}", e);
                }
            }
        }

        tracing::info!(
            "API server shutting down after {}s",
            self.state.start_time.elapsed().as_secs()
        );
        Ok(())
    }
}

/// Outcome of reading a request off the wire
enum ReadOutcome {
    Request(HttpRequest),
    Reject(HttpResponse),
    Closed,
}

/// Handle a single HTTP connection
fn handle_connection(
    mut stream: TcpStream,
    state: &AppState,
    config: &ApiServerConfig,
) -> Result<()> {
    // Accepted sockets inherit non-blocking mode on some platforms.
    stream.set_nonblocking(false)?;

    let (response, head_only) = match read_request(&stream, config)? {
        ReadOutcome::Request(request) => {
            tracing::debug!(method = %request.method, target = %request.target, "Request");

            if request.method == "OPTIONS" && config.cors_enabled {
                return send_cors_preflight(&mut stream);
            }
            (route_request(&request, state), request.method == "HEAD")
        }
        ReadOutcome::Reject(response) => (response, false),
        ReadOutcome::Closed => return Ok(()),
    };

    send_response(&mut stream, &response, head_only, config)
}

/// Read request line, headers and body
fn read_request(stream: &TcpStream, config: &ApiServerConfig) -> Result<ReadOutcome> {
    let mut reader = BufReader::new(stream);

    let mut request_line = String::new();
    if reader.read_line(&mut request_line)? == 0 {
        return Ok(ReadOutcome::Closed);
    }

    let parts: Vec<&str> = request_line.split_whitespace().collect();
    if parts.len() < 2 {
        return Ok(ReadOutcome::Reject(HttpResponse::error(400, "Bad Request")));
    }

    let mut request = HttpRequest::new(parts[0], parts[1]);
    let mut content_length = 0usize;

    loop {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 || line.trim().is_empty() {
            break;
        }

        if let Some((key, value)) = line.trim().split_once(':') {
            let key = key.trim().to_lowercase();
            let value = value.trim().to_string();

            if key == "content-length" {
                match value.parse() {
                    Ok(len) => content_length = len,
                    Err(_) => {
                        return Ok(ReadOutcome::Reject(HttpResponse::error(
                            400,
                            "Invalid Content-Length",
                        )))
                    }
                }
            }

            request.headers.insert(key, value);
        }
    }

    if content_length > config.max_body_size {
        return Ok(ReadOutcome::Reject(HttpResponse::error(
            413,
            format!("Request body exceeds {} bytes", config.max_body_size),
        )));
    }

    if content_length > 0 {
        let mut body = vec![0u8; content_length];
        reader
            .read_exact(&mut body)
            .map_err(|e| ClinicError::Http(format!("truncated body: {e}")))?;
        request.body = body;
    }

    Ok(ReadOutcome::Request(request))
}

/// Send HTTP response; `head_only` keeps the headers of the full response
/// and omits the body
fn send_response(
    stream: &mut TcpStream,
    response: &HttpResponse,
    head_only: bool,
    config: &ApiServerConfig,
) -> Result<()> {
    let mut head = format!(
        "HTTP/1.1 {} {}\r\n\
         Content-Type: {}\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n",
        response.status,
        status_text(response.status),
        response.content_type,
        response.body.len(),
    );

    if config.cors_enabled {
        head.push_str("Access-Control-Allow-Origin: *\r\n");
        head.push_str("Access-Control-Allow-Methods: GET, POST, OPTIONS\r\n");
        head.push_str("Access-Control-Allow-Headers: Content-Type, Authorization\r\n");
    }

    head.push_str("\r\n");

    stream.write_all(head.as_bytes())?;
    if !head_only {
        stream.write_all(&response.body)?;
    }
    stream.flush()?;

    Ok(())
}

/// Send CORS preflight response
fn send_cors_preflight(stream: &mut TcpStream) -> Result<()> {
    let response = "HTTP/1.1 204 No Content\r\n\
         Access-Control-Allow-Origin: *\r\n\
         Access-Control-Allow-Methods: GET, POST, OPTIONS\r\n\
         Access-Control-Allow-Headers: Content-Type, Authorization\r\n\
         Access-Control-Max-Age: 86400\r\n\
         Content-Length: 0\r\n\
         Connection: close\r\n\r\n";

    stream.write_all(response.as_bytes())?;
    stream.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::static_files::StaticFiles;
    use crate::dashboard::{Dashboard, HttpExamApi, ListView, SubmitOutcome};
    use crate::login::{
        Credentials, FallbackAuthenticator, LoginFlow, LoginState, MemorySessionStore,
        RemoteAuthenticator, CLINIC_DASHBOARD_PATH,
    };
    use crate::registry::{Exam, ExamRegistry, ExamStatus, NewExam, NO_FILE_SUBMITTED};
    use std::fs;
    use std::net::Shutdown;
    use tempfile::TempDir;

    struct Running {
        base_url: String,
        addr: SocketAddr,
        shutdown: Arc<AtomicBool>,
        handle: Option<thread::JoinHandle<()>>,
        _frontend: TempDir,
    }

    impl Drop for Running {
        fn drop(&mut self) {
            self.shutdown.store(true, Ordering::SeqCst);
            if let Some(handle) = self.handle.take() {
                let _ = handle.join();
            }
        }
    }

    fn start(max_body_size: usize) -> Running {
        let frontend = TempDir::new().unwrap();
        let dashboard = frontend.path().join("clinica").join("dashboard");
        fs::create_dir_all(&dashboard).unwrap();
        fs::write(dashboard.join("index.html"), "<main><!-- exames-lista --></main>").unwrap();

        let config = ApiServerConfig {
            bind: "127.0.0.1".to_string(),
            port: 0,
            frontend_root: frontend.path().to_path_buf(),
            cors_enabled: true,
            max_body_size,
        };
        let state = AppState::new(
            ExamRegistry::with_seed(),
            StaticFiles::new(&config.frontend_root),
        );

        let server = ApiServer::bind(config, state).unwrap();
        let addr = server.local_addr().unwrap();
        let shutdown = server.shutdown_flag();
        let handle = thread::spawn(move || {
            let _ = server.run();
        });

        Running {
            base_url: format!("http://{addr}"),
            addr,
            shutdown,
            handle: Some(handle),
            _frontend: frontend,
        }
    }

    fn raw_exchange(addr: SocketAddr, request: &str) -> String {
        let mut stream = TcpStream::connect(addr).unwrap();
        stream.write_all(request.as_bytes()).unwrap();
        stream.shutdown(Shutdown::Write).unwrap();

        let mut response = String::new();
        stream.read_to_string(&mut response).unwrap();
        response
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_post_then_get_round_trip() {
        let server = start(1024 * 1024);
        let client = reqwest::Client::new();
        let url = format!("{}/exames", server.base_url);

        let response = client
            .post(&url)
            .json(&serde_json::json!({"patientName": "Ana Souza"}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 201);
        let created: Exam = response.json().await.unwrap();
        assert_eq!(created.file_name, NO_FILE_SUBMITTED);
        assert_eq!(created.status, ExamStatus::AwaitingReport);

        let listed: Vec<Exam> = client.get(&url).send().await.unwrap().json().await.unwrap();
        assert_eq!(listed.len(), 3);
        assert_eq!(listed[2], created);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_post_without_name_is_rejected() {
        let server = start(1024 * 1024);
        let response = reqwest::Client::new()
            .post(format!("{}/exames", server.base_url))
            .json(&serde_json::json!({}))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 400);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body, serde_json::json!({"message": "Nome do paciente é obrigatório."}));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_dashboard_client_against_server() {
        let server = start(1024 * 1024);
        let mut dashboard = Dashboard::new(HttpExamApi::new(&server.base_url));

        assert!(matches!(dashboard.reload().await, ListView::Table(rows) if rows.len() == 2));

        dashboard.open_modal();
        dashboard.set_patient_name("Carla Dias");
        dashboard.select_file(Some("ecg_carla.pdf".into()));
        assert!(matches!(dashboard.submit().await, SubmitOutcome::Saved(_)));
        assert!(!dashboard.is_modal_open());
        assert!(dashboard.render().contains("ecg_carla.pdf"));

        let page = reqwest::get(format!("{}/clinica/dashboard/", server.base_url))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert!(page.contains("Carla Dias"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_dashboard_surfaces_server_message() {
        let server = start(1024 * 1024);
        let api = HttpExamApi::new(&server.base_url);

        let err = crate::dashboard::ExamApi::create_exam(&api, &NewExam::new(""))
            .await
            .unwrap_err();
        assert_eq!(err.server_message(), Some("Nome do paciente é obrigatório."));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_login_falls_back_when_endpoint_missing() {
        let server = start(1024 * 1024);
        let store = Arc::new(MemorySessionStore::new());
        let flow = LoginFlow::new(
            Box::new(FallbackAuthenticator::remote_with_mock(
                format!("{}/api/auth/login", server.base_url),
                Duration::from_millis(10),
            )),
            store,
        );

        let state = flow
            .submit(Credentials::new("a@b.com", "x", "ADMIN/CLINICA"))
            .await;
        assert!(matches!(state, LoginState::Succeeded { redirect, .. } if redirect == CLINIC_DASHBOARD_PATH));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_login_without_fallback_reports_rejection() {
        let server = start(1024 * 1024);
        let flow = LoginFlow::new(
            Box::new(FallbackAuthenticator::new(
                Box::new(RemoteAuthenticator::for_server(&server.base_url)),
                None,
            )),
            Arc::new(MemorySessionStore::new()),
        );

        let state = flow
            .submit(Credentials::new("a@b.com", "x", "ADMIN/CLINICA"))
            .await;
        assert_eq!(
            state,
            LoginState::Failed {
                message: "Credenciais inválidas.".into()
            }
        );
    }

    #[test]
    fn test_raw_requests() {
        let server = start(16);

        let response = raw_exchange(server.addr, "GET /health HTTP/1.1\r\nHost: x\r\n\r\n");
        assert!(response.starts_with("HTTP/1.1 200 OK"));
        assert!(response.contains("Access-Control-Allow-Origin: *"));
        assert!(response.ends_with("OK"));

        let response = raw_exchange(server.addr, "HEAD /health HTTP/1.1\r\n\r\n");
        assert!(response.starts_with("HTTP/1.1 200 OK"));
        assert!(response.contains("Content-Length: 2\r\n"));
        assert!(response.ends_with("\r\n\r\n"));

        let response = raw_exchange(server.addr, "OPTIONS /exames HTTP/1.1\r\n\r\n");
        assert!(response.starts_with("HTTP/1.1 204 No Content"));

        let response = raw_exchange(
            server.addr,
            "POST /exames HTTP/1.1\r\nContent-Length: 64\r\n\r\n",
        );
        assert!(response.starts_with("HTTP/1.1 413 Payload Too Large"));

        let response = raw_exchange(server.addr, "garbage\r\n\r\n");
        assert!(response.starts_with("HTTP/1.1 400 Bad Request"));
    }
}
