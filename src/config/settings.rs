//! Configuration settings for CardioPix
//!
//! CLI arguments, environment overrides and the settings structs built
//! from them.

use crate::api::ApiServerConfig;
use crate::login::{
    default_session_path, Authenticator, FallbackAuthenticator, MockAuthenticator,
    RemoteAuthenticator, AUTH_PATH, CLINIC_ADMIN_PROFILE, DEFAULT_MOCK_DELAY,
};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

/// Default server URL used by the client commands
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3000";

/// CardioPix - clinic exam tracking
#[derive(Parser, Debug, Clone)]
#[command(name = "cardiopix")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Cardiac exam tracking for clinics")]
#[command(long_about = r#"
CardioPix tracks cardiac exams for a clinic: staff register exams and follow
whether the report is still awaited or already available.

Examples:
  cardiopix serve                                   # API + frontend on $PORT or 3000
  cardiopix exams list                              # Exam table from the server
  cardiopix exams create "Ana Souza" --simulate-attachment
  cardiopix login --email a@b.com --password x --profile ADMIN/CLINICA
"#)]
pub struct CliArgs {
    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the HTTP server
    Serve(ServeArgs),

    /// Dashboard operations against a running server
    Exams {
        #[command(subcommand)]
        action: ExamCommand,

        /// Server URL
        #[arg(long, env = "CARDIOPIX_SERVER", default_value = DEFAULT_SERVER_URL, global = true)]
        server: String,
    },

    /// Log in and store the session
    Login(LoginArgs),

    /// Forget the stored session
    Logout {
        /// Session file
        #[arg(long, env = "CARDIOPIX_SESSION_FILE", value_name = "PATH")]
        session_file: Option<PathBuf>,
    },
}

/// `serve` options
#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short = 'p', long, env = "PORT", default_value = "3000")]
    pub port: u16,

    /// Bind address
    #[arg(long, default_value = "0.0.0.0")]
    pub bind: String,

    /// Frontend asset directory
    #[arg(long, env = "CARDIOPIX_FRONTEND", default_value = "frontend", value_name = "DIR")]
    pub frontend: PathBuf,

    /// Disable CORS headers
    #[arg(long)]
    pub no_cors: bool,

    /// Maximum request body size in bytes
    #[arg(long, default_value = "1048576", value_name = "BYTES")]
    pub max_body_size: usize,

    /// Start with an empty registry instead of the demo exams
    #[arg(long)]
    pub no_seed: bool,
}

/// `exams` actions
#[derive(Subcommand, Debug, Clone)]
pub enum ExamCommand {
    /// Show the exam table
    List {
        /// Print the rendered HTML instead of a text table
        #[arg(long)]
        html: bool,
    },

    /// Register a new exam
    Create {
        /// Patient name
        patient_name: String,

        /// Attached file name
        #[arg(long, value_name = "NAME", conflicts_with = "simulate_attachment")]
        file: Option<String>,

        /// Attach the demo file instead of a real one
        #[arg(long)]
        simulate_attachment: bool,
    },
}

/// `login` options
#[derive(Args, Debug, Clone)]
pub struct LoginArgs {
    /// Login email
    #[arg(long, default_value = "")]
    pub email: String,

    /// Password
    #[arg(long, default_value = "", env = "CARDIOPIX_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Profile
    #[arg(long, default_value = CLINIC_ADMIN_PROFILE)]
    pub profile: String,

    /// Server URL hosting the login endpoint
    #[arg(long, env = "CARDIOPIX_SERVER", default_value = DEFAULT_SERVER_URL)]
    pub server: String,

    /// Mock authenticator delay in milliseconds
    #[arg(long, default_value_t = DEFAULT_MOCK_DELAY.as_millis() as u64, value_name = "MS")]
    pub mock_delay_ms: u64,

    /// Report login endpoint failures instead of using the mock
    #[arg(long)]
    pub no_mock_fallback: bool,

    /// Session file
    #[arg(long, env = "CARDIOPIX_SESSION_FILE", value_name = "PATH")]
    pub session_file: Option<PathBuf>,

    /// Show the stored session instead of logging in
    #[arg(long)]
    pub status: bool,
}

impl ServeArgs {
    /// Server configuration for these arguments
    pub fn server_config(&self) -> ApiServerConfig {
        ApiServerConfig {
            bind: self.bind.clone(),
            port: self.port,
            frontend_root: self.frontend.clone(),
            cors_enabled: !self.no_cors,
            max_body_size: self.max_body_size,
        }
    }
}

/// Resolved login settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginSettings {
    /// Login endpoint URL
    pub auth_endpoint: String,
    /// Mock delay
    pub mock_delay: Duration,
    /// Whether the mock backs the remote endpoint
    pub mock_fallback: bool,
    /// Session file
    pub session_file: PathBuf,
}

impl LoginSettings {
    /// Settings from the `login` arguments
    pub fn from_args(args: &LoginArgs) -> Self {
        Self {
            auth_endpoint: format!("{}{}", args.server.trim_end_matches('/'), AUTH_PATH),
            mock_delay: Duration::from_millis(args.mock_delay_ms),
            mock_fallback: !args.no_mock_fallback,
            session_file: resolve_session_file(args.session_file.as_ref()),
        }
    }

    /// Authentication strategy for these settings
    pub fn authenticator(&self) -> Box<dyn Authenticator> {
        let fallback: Option<Box<dyn Authenticator>> = if self.mock_fallback {
            Some(Box::new(MockAuthenticator::new(self.mock_delay)))
        } else {
            None
        };

        Box::new(FallbackAuthenticator::new(
            Box::new(RemoteAuthenticator::new(&self.auth_endpoint)),
            fallback,
        ))
    }
}

/// Explicit session file, or the default location
pub fn resolve_session_file(explicit: Option<&PathBuf>) -> PathBuf {
    explicit.cloned().unwrap_or_else(default_session_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_defaults() {
        let args = CliArgs::try_parse_from(["cardiopix", "serve", "--port", "8080"]).unwrap();
        let Commands::Serve(serve) = args.command else {
            panic!("expected serve");
        };

        let config = serve.server_config();
        assert_eq!(config.port, 8080);
        assert_eq!(config.bind, "0.0.0.0");
        assert!(config.cors_enabled);
        assert_eq!(config.max_body_size, 1024 * 1024);
        assert!(!serve.no_seed);
    }

    #[test]
    fn test_exam_create_args() {
        let args = CliArgs::try_parse_from([
            "cardiopix",
            "exams",
            "--server",
            "http://clinic:3000",
            "create",
            "Ana Souza",
            "--simulate-attachment",
        ])
        .unwrap();

        match args.command {
            Commands::Exams { action, server } => {
                assert_eq!(server, "http://clinic:3000");
                assert!(matches!(
                    action,
                    ExamCommand::Create { ref patient_name, simulate_attachment: true, file: None }
                        if patient_name == "Ana Souza"
                ));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_file_conflicts_with_simulated_attachment() {
        let result = CliArgs::try_parse_from([
            "cardiopix",
            "exams",
            "create",
            "Ana",
            "--file",
            "ecg.pdf",
            "--simulate-attachment",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_login_settings() {
        let args = CliArgs::try_parse_from([
            "cardiopix",
            "login",
            "--email",
            "a@b.com",
            "--password",
            "x",
            "--server",
            "http://clinic:3000/",
            "--mock-delay-ms",
            "50",
            "--no-mock-fallback",
            "--session-file",
            "/tmp/session.json",
        ])
        .unwrap();
        let Commands::Login(login) = args.command else {
            panic!("expected login");
        };

        assert_eq!(login.profile, CLINIC_ADMIN_PROFILE);
        let settings = LoginSettings::from_args(&login);
        assert_eq!(settings.auth_endpoint, "http://clinic:3000/api/auth/login");
        assert_eq!(settings.mock_delay, Duration::from_millis(50));
        assert!(!settings.mock_fallback);
        assert_eq!(settings.session_file, PathBuf::from("/tmp/session.json"));
    }

    #[test]
    fn test_login_default_delay() {
        let args =
            CliArgs::try_parse_from(["cardiopix", "login", "--email", "a@b.com"]).unwrap();
        let Commands::Login(login) = args.command else {
            panic!("expected login");
        };
        assert_eq!(login.mock_delay_ms, 280);
    }
}
