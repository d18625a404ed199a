//! duet_notebook — entry point.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use duet_notebook::app::{run, AppConfig};
use notebook_core::SessionConfig;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "duet_notebook", about = "Two-player gesture drawing notebook")]
struct Cli {
    /// JSON session config; missing fields keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for game selection and particles (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Skip the startup banner
    #[arg(long)]
    quick: bool,

    /// Canvas width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Canvas height in pixels
    #[arg(long)]
    height: Option<u32>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "duet_notebook=info,notebook_core=info".into()),
        )
        .init();

    if !cli.quick {
        println!();
        println!("╔══════════════════════════════════════════════════════════════╗");
        println!("║        Duet Notebook — draw together, wave to play           ║");
        println!("╚══════════════════════════════════════════════════════════════╝");
        println!();
        #[cfg(feature = "leap")]
        println!("  Mode: LeapMotion hardware");
        #[cfg(not(feature = "leap"))]
        println!("  Mode: Keyboard simulation  (use --features leap for hardware)");
        println!();
    }

    let mut session = match &cli.config {
        Some(path) => SessionConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SessionConfig::default(),
    };
    if let Some(w) = cli.width  { session.canvas_width  = w as f32; }
    if let Some(h) = cli.height { session.canvas_height = h as f32; }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        width = session.canvas_width,
        height = session.canvas_height,
        seed = ?cli.seed,
        "duet_notebook starting"
    );

    run(AppConfig { session, seed: cli.seed })
}
