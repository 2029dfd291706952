//! `pnl` CLI entry point.

use clap::Parser as _;
use pnl_cli::{Cli, Commands};

fn init_tracing() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_timer(tracing_subscriber::fmt::time::uptime())
        .with_target(false)
        .try_init()
        .map_err(|e| eyre::eyre!("failed to initialize tracing: {e:?}"))?;
    Ok(())
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> eyre::Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing()?;

    let cli = Cli::parse();

    let res = match cli.command {
        Commands::Run { args } => pnl_cli::commands::run(args).await,
        Commands::Scan { args } => pnl_cli::commands::scan(args).await,
        Commands::ConfigSchema => pnl_cli::commands::config_schema(),
        Commands::TargetsSchema => pnl_cli::commands::targets_schema(),
    };

    if let Err(e) = res {
        tracing::error!("Error: {:?}", e);
        std::process::exit(1);
    }

    Ok(())
}
