mod api;
mod config;
mod doctor_cmd;
mod report;
mod shell;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use dropcheck_config::{redacted_yaml, validate, DropcheckConfig};
use dropcheck_core::{SessionStatus, VisionModel};
use dropcheck_logging::init_logger;
use dropcheck_media::{is_image, ImageFile, IntakeSource, PreviewRegistry};
use dropcheck_understanding::{GeminiProvider, VerifyOptions};

use api::AppState;
use config::Settings;
use report::{note_error, note_warn, render_report, supports_color};
use shell::AppShell;

#[derive(Parser)]
#[command(name = "dropcheck")]
#[command(about = "Dropcheck - AI verification of delivery photos")]
#[command(version)]
struct Cli {
    /// Path to the config file (defaults to ~/.dropcheck/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the verification page and HTTP API
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
        /// Address to bind the HTTP server to
        #[arg(short, long)]
        bind: Option<String>,
    },
    /// Verify delivery photos from the command line
    Verify {
        /// Print the raw result as JSON
        #[arg(long)]
        json: bool,
        /// Model identifier to use instead of the configured one
        #[arg(short, long)]
        model: Option<String>,
        /// Image files, or directories whose images are all included
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Check credentials and configuration
    Doctor,
    /// Inspect the effective configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective config with secrets masked
    Show,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "Command failed");
            note_error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config_path = config::resolve_path(cli.config.as_deref());
    let config = config::load(&config_path).await?;
    init_logger(&config::logger_options(&config));

    match cli.command {
        Commands::Serve { port, bind } => {
            let mut settings = settings_for(&config)?;
            if let Some(port) = port {
                settings.port = port;
            }
            if let Some(bind) = bind {
                settings.bind_address = bind;
            }
            run_server(settings).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Verify { json, model, paths } => {
            let mut settings = settings_for(&config)?;
            if let Some(model) = model {
                settings.model = model;
            }
            run_verify(settings, &paths, json).await
        }
        Commands::Doctor => Ok(if doctor_cmd::run(&config, &config_path) {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }),
        Commands::Config {
            action: ConfigAction::Show,
        } => {
            print!("{}", redacted_yaml(&config)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Validate and resolve settings; any validation error is fatal.
fn settings_for(config: &DropcheckConfig) -> Result<Settings> {
    let report = validate(config);
    for warning in &report.warnings {
        note_warn(&format!("{}: {}", warning.path, warning.message));
    }
    if let Some(first) = report.errors.first() {
        for e in &report.errors {
            error!(path = %e.path, message = %e.message, "Invalid config");
        }
        bail!("invalid config at {}: {}", first.path, first.message);
    }
    Ok(Settings::from_config(config)?)
}

fn build_shell(settings: &Settings, registry: PreviewRegistry) -> AppShell {
    let provider = GeminiProvider::new(&settings.api_key).with_base_url(&settings.base_url);
    let model: Arc<dyn VisionModel> = Arc::new(provider);
    let options = VerifyOptions {
        model: settings.model.clone(),
    };
    AppShell::new(model, options, registry, settings.max_images)
}

async fn run_server(settings: Settings) -> Result<()> {
    info!(
        port = settings.port,
        bind = %settings.bind_address,
        model = %settings.model,
        "Starting dropcheck server"
    );

    let registry = PreviewRegistry::new(settings.preview_capacity);
    let shell = build_shell(&settings, registry.clone());
    let app = api::build_router(AppState { shell, registry }, settings.max_upload_bytes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = format!("{}:{}", settings.bind_address, settings.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(addr = %addr, "HTTP API listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Exit 0 when every criterion passed, 2 on a failed verification, 1 when
/// the attempt itself failed.
async fn run_verify(settings: Settings, paths: &[PathBuf], json: bool) -> Result<ExitCode> {
    let files = collect_images(paths).await?;
    let registry = PreviewRegistry::new(settings.preview_capacity.max(files.len()));
    let shell = build_shell(&settings, registry);

    shell.select(files, IntakeSource::Picker).await?;
    let status = shell.verify().await?;
    let snapshot = shell.snapshot().await;

    if status != SessionStatus::Succeeded {
        let message = snapshot.error.unwrap_or_default();
        if json {
            println!("{}", serde_json::json!({ "error": message }));
        } else {
            note_error(&message);
        }
        return Ok(ExitCode::FAILURE);
    }

    let Some(result) = snapshot.result else {
        bail!("verification succeeded without a result");
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", render_report(Some(&result), supports_color()));
    }
    Ok(if result.overall_passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    })
}

/// Files pass through as given; directories contribute only their images,
/// sorted by name.
async fn collect_images(paths: &[PathBuf]) -> Result<Vec<ImageFile>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            files.extend(images_in_dir(path).await?);
        } else {
            files.push(ImageFile::from_path(path));
        }
    }
    Ok(files)
}

async fn images_in_dir(dir: &Path) -> Result<Vec<ImageFile>> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .with_context(|| format!("Failed to read directory: {}", dir.display()))?;
    let mut paths = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();

    Ok(paths
        .into_iter()
        .map(ImageFile::from_path)
        .filter(|f| is_image(f.media_type()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn directories_contribute_only_images() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("b.jpg"), b"b").await.unwrap();
        tokio::fs::write(dir.path().join("a.png"), b"a").await.unwrap();
        tokio::fs::write(dir.path().join("notes.txt"), b"n").await.unwrap();

        let files = collect_images(&[dir.path().to_path_buf()]).await.unwrap();
        let names: Vec<_> = files.iter().map(ImageFile::name).collect();
        assert_eq!(names, ["a.png", "b.jpg"]);
    }

    #[tokio::test]
    async fn explicit_files_pass_through() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memo.pdf");
        tokio::fs::write(&path, b"%PDF").await.unwrap();

        let files = collect_images(&[path]).await.unwrap();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn cli_parses_verify() {
        let cli = Cli::try_parse_from(["dropcheck", "verify", "--json", "a.jpg", "b.jpg"]).unwrap();
        match cli.command {
            Commands::Verify { json, paths, .. } => {
                assert!(json);
                assert_eq!(paths.len(), 2);
            }
            _ => panic!("expected verify"),
        }
    }
}
