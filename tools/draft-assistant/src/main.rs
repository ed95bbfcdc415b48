mod app;
mod commands;
mod config;
mod error;
mod render;
mod session;

use clap::{ArgAction, Parser};
use colored::*;
use std::path::PathBuf;
use tracing::Level;

use app::AppState;
use config::AppConfig;
use error::AppError;
use session::Session;

#[derive(Parser)]
#[command(name = "draft-assistant")]
#[command(about = "Dynasty draft board with live Sleeper picks and shared team rankings")]
#[command(version = "0.1.0")]
struct Cli {
    /// Configuration file (defaults to ./draft-assistant.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Start as this team member
    #[arg(short, long)]
    user: Option<String>,

    /// Ranking export to load instead of the configured one
    #[arg(short, long)]
    rankings: Option<PathBuf>,

    /// Refresh on a timer instead of reading commands
    #[arg(short, long)]
    watch: bool,

    /// Log more (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt().with_max_level(level).with_writer(std::io::stderr).init();

    if let Err(e) = run(cli).await {
        eprintln!("{} {}", "❌".red(), e.to_string().red().bold());
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(path) = cli.rankings {
        config.rankings_csv = path;
    }

    let (mut app, warnings) = AppState::init(config).await?;
    if let Some(user) = cli.user {
        app.switch_user(&user.to_lowercase())?;
    }

    let mut session = Session::new(app);
    if cli.watch {
        session.watch(warnings).await;
        Ok(())
    } else {
        session.run(warnings).await
    }
}
