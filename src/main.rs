//! Sandbox Preview CLI
//!
//! Renders preview documents from a directory of edited files.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use sandbox_preview::sandbox::{HostPageRenderer, Renderer};
use sandbox_preview::{Environment, FileStore, PreviewConfig, Session, Starter, Validate};

#[derive(Parser)]
#[command(name = "sandbox-preview", about = "Compose sandboxed previews of HTML/CSS/JS files")]
struct Cli {
    /// Preview configuration (TOML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Starter files to apply before loading overrides (YAML).
    #[arg(long, global = true)]
    starter: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render the preview document for an environment.
    Render {
        /// Environment to render (vanilla or react).
        environment: Environment,

        /// Directory holding edited files at their environment paths.
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Output file; the document goes to stdout when omitted.
        #[arg(long)]
        out: Option<PathBuf>,

        /// Write a host page embedding the sandboxed surface instead of the bare document.
        #[arg(long)]
        host_page: bool,
    },
    /// Validate configuration and starter files.
    Validate,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("sandbox-preview failed: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> sandbox_preview::Result<()> {
    let config = match &cli.config {
        Some(path) => PreviewConfig::load(path)?,
        None => PreviewConfig::default(),
    };
    for warning in config.validate().into_result()? {
        tracing::warn!(%warning, "configuration warning");
    }

    let starter = cli.starter.as_ref().map(Starter::load).transpose()?;
    if let Some(starter) = &starter {
        for warning in starter.validate().into_result()? {
            tracing::warn!(%warning, "starter warning");
        }
    }

    match cli.command {
        Command::Validate => {
            println!("configuration ok");
            Ok(())
        }
        Command::Render {
            environment,
            dir,
            out,
            host_page,
        } => {
            let mut store = FileStore::new();
            if let Some(starter) = &starter {
                starter.apply(&mut store)?;
            }
            if let Some(dir) = &dir {
                store.overlay_dir(environment, dir).await?;
            }

            // Config was validated above
            let mut session = Session::with_store(&config, store);
            if session.environment() != environment {
                session.switch_environment(environment);
            }
            let snapshot = session.snapshot();

            if host_page {
                let path = out.unwrap_or_else(|| PathBuf::from("preview.html"));
                let renderer = HostPageRenderer::new(&path, config.sandbox.clone());
                renderer.load(&snapshot).await?;
                println!("{}", path.display());
            } else if let Some(path) = out {
                tokio::fs::write(&path, snapshot.document.as_bytes()).await?;
                tracing::info!(path = ?path, "wrote preview document");
            } else {
                print!("{}", snapshot.document);
            }
            Ok(())
        }
    }
}
