//! Limelight renderer binary.
//!
//! Launched by the agent-side bridge with its stdin/stdout as the
//! protocol channel. `--headless` renders one message and exits; the
//! default mode runs the interactive dispatch loop on the controlling
//! terminal.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use limelight_tui::theme::ThemeRegistry;
use limelight_tui::{headless, App};

#[derive(Debug, Parser)]
#[command(name = "limelight-tui", about = "Terminal renderer for Limelight agents")]
struct Args {
    /// Render one message from stdin to stdout and exit.
    #[arg(long)]
    headless: bool,

    /// Theme id or path to a JSON palette file.
    #[arg(long, env = "LIMELIGHT_THEME")]
    theme: Option<String>,

    /// Fragment width in columns (headless mode).
    #[arg(long, default_value_t = 80)]
    width: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Stdout is the protocol channel; logs must stay on stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("LIMELIGHT_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let registry = match ThemeRegistry::user_theme_dir() {
        Some(dir) => ThemeRegistry::with_user_dir(&dir),
        None => ThemeRegistry::builtin(),
    };
    let theme = registry.resolve(args.theme.as_deref())?;

    if args.headless {
        if let Err(e) = headless::run(&theme, args.width).await {
            eprintln!("limelight-tui: {e}");
            std::process::exit(1);
        }
        return Ok(());
    }

    App::new(theme).run().await
}
