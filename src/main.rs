use anyhow::{anyhow, bail, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use std::time::Duration;

mod app;
mod config;
mod guidance;
mod handler;
mod preset;
mod toast;
mod tui;
mod ui;

use app::{App, Message, Role};
use config::Config;
use guidance::{Backend, CannedGuidance};

#[derive(Parser)]
#[command(name = "triage")]
#[command(about = "Terminal emergency symptom assistant")]
struct Cli {
    /// Guidance service base URL (canned responses when unset)
    #[arg(long)]
    endpoint: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a symptom description and print the guidance
    Ask {
        /// Your symptoms or emergency situation
        symptoms: String,
    },
    /// List the preset emergency categories
    Presets,
    /// Set or show the configured guidance endpoint
    Endpoint {
        /// New guidance service base URL; shows the current one when omitted
        url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load().unwrap_or_else(|_| Config::new());
    let _log_guard = init_logging();

    let backend = build_backend(&cli, &config);
    tracing::info!(backend = backend.describe(), "starting up");

    match cli.command {
        Some(Commands::Ask { symptoms }) => ask(&backend, &symptoms).await?,
        Some(Commands::Presets) => list_presets(),
        Some(Commands::Endpoint { url }) => set_endpoint(config, url)?,
        None => run_tui(App::new(backend)).await?,
    }

    Ok(())
}

fn build_backend(cli: &Cli, config: &Config) -> Backend {
    let endpoint = cli.endpoint.as_deref().or(config.endpoint.as_deref());
    match (endpoint, config.response_delay_ms) {
        (None, Some(ms)) => Backend::Canned(CannedGuidance::with_delay(Duration::from_millis(ms))),
        _ => Backend::from_endpoint(endpoint),
    }
}

/// Logging goes to a file under the config directory; the terminal itself
/// belongs to the TUI.
fn init_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let log_dir = Config::log_dir().ok()?;
    std::fs::create_dir_all(&log_dir).ok()?;

    let appender = tracing_appender::rolling::never(log_dir, "triage.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(writer)
        .with_ansi(false)
        .init();

    Some(guard)
}

async fn run_tui(mut app: App) -> Result<()> {
    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new();

    while !app.should_quit {
        terminal.draw(|frame| ui::render(&mut app, frame))?;

        if let Some(event) = events.next().await {
            handler::handle_event(&mut app, event)?;
        }

        poll_guidance(&mut app).await;
    }

    // Cancel any in-flight request so nothing lands after teardown
    if let Some(task) = app.guidance_task.take() {
        task.abort();
    }

    tui::restore()?;
    Ok(())
}

/// Land the result of a finished guidance request, if there is one.
async fn poll_guidance(app: &mut App) {
    let finished = app
        .guidance_task
        .as_ref()
        .map(|task| task.is_finished())
        .unwrap_or(false);
    if !finished {
        return;
    }

    if let Some(task) = app.guidance_task.take() {
        match task.await {
            Ok(result) => app.apply_guidance(result),
            Err(e) if e.is_cancelled() => {}
            Err(e) => app.apply_guidance(Err(anyhow!("guidance task failed: {}", e))),
        }
    }
}

async fn ask(backend: &Backend, symptoms: &str) -> Result<()> {
    if symptoms.trim().is_empty() {
        bail!("Please describe your symptoms");
    }

    let conversation = vec![Message {
        role: Role::User,
        content: symptoms.to_string(),
        timestamp: Local::now(),
    }];

    println!("Getting guidance...\n");
    let guidance = backend.guide(&conversation).await?;

    println!("{}", guidance);
    println!("\nIf this is a medical emergency, call emergency services immediately.");

    Ok(())
}

fn set_endpoint(mut config: Config, url: Option<String>) -> Result<()> {
    match url {
        Some(url) => {
            config.endpoint = Some(url.clone());
            config.save()?;
            println!("Guidance endpoint set to {}", url);
        }
        None => match config.endpoint {
            Some(url) => println!("Guidance endpoint: {}", url),
            None => println!("No endpoint configured; using canned guidance"),
        },
    }
    Ok(())
}

fn list_presets() {
    println!("Common emergencies:\n");
    for p in preset::catalog() {
        println!("  {} {}", p.icon, p.label);
        println!("     {}", p.description);
    }
}
