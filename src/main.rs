mod config;
mod services;

use std::path::{Path, PathBuf};
use std::time::Duration;

use canvas::export::{ExportError, ExportFormat};
use canvas::session::{InitialImage, SaveError, Session, SessionError};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{AtelierConfig, ConfigError};
use crate::services::notify::TracingNotifier;
use crate::services::script::{self, ScriptError};
use crate::services::upload::HttpUploader;

const FETCH_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("config: {0}")]
    Config(#[from] ConfigError),
    #[error("read {}: {source}", path.display())]
    Io { path: PathBuf, source: std::io::Error },
    #[error("fetch initial image: {0}")]
    Fetch(String),
    #[error("open session: {0}")]
    Session(#[from] SessionError),
    #[error("script: {0}")]
    Script(#[from] ScriptError),
    #[error("export: {0}")]
    Export(#[from] ExportError),
    #[error("save: {0}")]
    Save(#[from] SaveError),
    #[error("ATELIER_UPLOAD_URL is required for save")]
    MissingUploadUrl,
}

#[derive(Parser, Debug)]
#[command(name = "atelier", about = "Headless design canvas: replay sketch scripts, export and save designs")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a script and write the exported image to a file.
    Render {
        /// JSON sketch script.
        script: PathBuf,
        /// Output file; defaults to `design.<ext>` for the configured format.
        #[arg(long, short)]
        out: Option<PathBuf>,
        /// Reference image (path or http(s) URL) placed on the surface first.
        #[arg(long, env = "ATELIER_INITIAL_IMAGE")]
        initial_image: Option<String>,
    },
    /// Replay a script and upload the design, printing the resulting URL.
    Save {
        script: PathBuf,
        #[arg(long, env = "ATELIER_INITIAL_IMAGE")]
        initial_image: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("ignoring .env: {e}");
        }
    }
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = AtelierConfig::from_env()?;

    match cli.command {
        Command::Render { script, out, initial_image } => {
            let out = out.unwrap_or_else(|| default_out_path(config.format));
            run_render(&config, &script, &out, initial_image).await
        }
        Command::Save { script, initial_image } => run_save(&config, &script, initial_image).await,
    }
}

async fn run_render(
    config: &AtelierConfig,
    script_path: &Path,
    out: &Path,
    initial_image: Option<String>,
) -> Result<(), CliError> {
    let session = prepare(config, script_path, initial_image).await?;
    let image = session.export()?;
    tokio::fs::write(out, &image.bytes).await.map_err(|source| CliError::Io { path: out.to_path_buf(), source })?;
    info!(path = %out.display(), bytes = image.bytes.len(), mime = image.mime, "design written");
    session.close();
    Ok(())
}

fn default_out_path(format: ExportFormat) -> PathBuf {
    PathBuf::from(format!("design.{}", format.extension()))
}

async fn run_save(config: &AtelierConfig, script_path: &Path, initial_image: Option<String>) -> Result<(), CliError> {
    let upload = config.upload.as_ref().ok_or(CliError::MissingUploadUrl)?;
    let uploader = HttpUploader::new(upload).map_err(SaveError::from)?;
    let notifier = TracingNotifier;

    let mut session = prepare(config, script_path, initial_image).await?;
    session.on_save(|url| info!(%url, "design attached to order"));
    let url = session.save(&uploader, &notifier).await?;
    println!("{url}");
    session.close();
    Ok(())
}

async fn prepare(config: &AtelierConfig, script_path: &Path, initial_image: Option<String>) -> Result<Session, CliError> {
    let json = tokio::fs::read_to_string(script_path)
        .await
        .map_err(|source| CliError::Io { path: script_path.to_path_buf(), source })?;
    let steps = script::parse(&json)?;

    let initial = match initial_image {
        Some(src) => Some(load_initial_image(src).await?),
        None => None,
    };

    let mut session = Session::open(config.session_config()?, initial)?;
    let actions = script::replay(session.engine_mut(), &steps)?;
    info!(steps = steps.len(), actions = actions.len(), objects = session.engine().surface.len(), "script replayed");
    Ok(session)
}

async fn load_initial_image(src: String) -> Result<InitialImage, CliError> {
    if !(src.starts_with("http://") || src.starts_with("https://")) {
        let path = PathBuf::from(&src);
        let bytes = tokio::fs::read(&path).await.map_err(|source| CliError::Io { path, source })?;
        return Ok(InitialImage { url: src, bytes });
    }

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
        .build()
        .map_err(|e| CliError::Fetch(e.to_string()))?;
    let response = http.get(&src).send().await.map_err(|e| CliError::Fetch(e.to_string()))?;
    let status = response.status();
    if !status.is_success() {
        warn!(url = %src, status = status.as_u16(), "initial image fetch failed");
        return Err(CliError::Fetch(format!("HTTP {} for {src}", status.as_u16())));
    }
    let bytes = response.bytes().await.map_err(|e| CliError::Fetch(e.to_string()))?;
    Ok(InitialImage { url: src, bytes: bytes.to_vec() })
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
