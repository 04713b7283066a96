//! CardioPix CLI
//!
//! Runs the exam server and the dashboard/login clients from a terminal.

use anyhow::{bail, Context};
use cardiopix::api::{ApiServer, AppState, StaticFiles};
use cardiopix::config::{CliArgs, Commands, ExamCommand, LoginArgs, LoginSettings, ServeArgs};
use cardiopix::dashboard::{render_list, render_text, Dashboard, HttpExamApi, SubmitOutcome};
use cardiopix::login::{
    clear_session, load_session, Credentials, FileSessionStore, LoginFlow, LoginState,
};
use cardiopix::registry::ExamRegistry;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn main() {
    // Parse CLI arguments
    let args = CliArgs::parse();

    // Initialize logging
    let default_level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    // Handle result
    if let Err(e) = run(args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(args: CliArgs) -> anyhow::Result<()> {
    match args.command {
        Commands::Serve(serve) => cmd_serve(&serve),
        Commands::Exams { action, server } => {
            let runtime = tokio::runtime::Runtime::new().context("starting async runtime")?;
            runtime.block_on(cmd_exams(action, &server))
        }
        Commands::Login(login) => {
            let runtime = tokio::runtime::Runtime::new().context("starting async runtime")?;
            runtime.block_on(cmd_login(&login))
        }
        Commands::Logout { session_file } => cmd_logout(session_file),
    }
}

fn cmd_serve(args: &ServeArgs) -> anyhow::Result<()> {
    let config = args.server_config();

    if !config.frontend_root.is_dir() {
        tracing::warn!(
            "Frontend directory {} not found; only the API will answer",
            config.frontend_root.display()
        );
    }

    let registry = if args.no_seed {
        ExamRegistry::in_memory()
    } else {
        ExamRegistry::with_seed()
    };
    let state = AppState::new(registry, StaticFiles::new(&config.frontend_root));

    let server = ApiServer::bind(config, state).context("binding server")?;
    server.run()?;
    Ok(())
}

async fn cmd_exams(action: ExamCommand, server: &str) -> anyhow::Result<()> {
    let mut dashboard = Dashboard::new(HttpExamApi::new(server));

    match action {
        ExamCommand::List { html } => {
            let view = dashboard.reload().await;
            if html {
                println!("{}", render_list(view));
            } else {
                print!("{}", render_text(view));
            }
        }
        ExamCommand::Create {
            patient_name,
            file,
            simulate_attachment,
        } => {
            dashboard.open_modal();
            dashboard.set_patient_name(patient_name);
            if simulate_attachment {
                dashboard.simulate_attachment();
            } else {
                dashboard.select_file(file);
            }

            match dashboard.submit().await {
                SubmitOutcome::Saved(record) => {
                    println!("Exame #{} cadastrado para {}", record.id, record.patient_name);
                    print!("{}", render_text(dashboard.view()));
                }
                SubmitOutcome::Alert(message) => bail!(message),
            }
        }
    }

    Ok(())
}

async fn cmd_login(args: &LoginArgs) -> anyhow::Result<()> {
    let settings = LoginSettings::from_args(args);
    let store = Arc::new(FileSessionStore::new(&settings.session_file));

    if args.status {
        match load_session(store.as_ref())? {
            Some(session) => println!("{} ({})", session.email, session.profile),
            None => println!("Nenhuma sessão ativa."),
        }
        return Ok(());
    }

    let flow = LoginFlow::new(settings.authenticator(), store);
    let mut states = flow.subscribe();
    let printer = tokio::spawn(async move {
        while states.changed().await.is_ok() {
            let state = states.borrow_and_update().clone();
            if let Some(message) = state.status_message() {
                if state.is_error() {
                    eprintln!("{message}");
                } else {
                    println!("{message}");
                }
            }
        }
    });

    let credentials = Credentials::new(&args.email, &args.password, args.profile.clone());
    let outcome = flow.submit(credentials).await;

    drop(flow);
    let _ = printer.await;

    match outcome {
        LoginState::Succeeded { redirect, .. } => {
            println!("{redirect}");
            Ok(())
        }
        LoginState::Failed { message } => bail!(message),
        LoginState::Idle | LoginState::Authenticating => Ok(()),
    }
}

fn cmd_logout(session_file: Option<PathBuf>) -> anyhow::Result<()> {
    let path = cardiopix::config::resolve_session_file(session_file.as_ref());
    let store = FileSessionStore::new(&path);
    clear_session(&store).with_context(|| format!("clearing session in {}", path.display()))?;
    println!("Sessão encerrada.");
    Ok(())
}
