//! Placement Insight - Main Entry Point
//!
//! Train, predict, explain and serve from one binary.

use clap::Parser;
use placement_insight::cli::{cmd_explain, cmd_importance, cmd_predict, cmd_serve, cmd_train, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "placement_insight=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train { data, output, test_size, seed } => {
            cmd_train(&data, &output, test_size, seed)?;
        }
        Commands::Predict { model, input, no_explain } => {
            cmd_predict(&model, &input, !no_explain)?;
        }
        Commands::Explain { model, input, kind } => {
            cmd_explain(&model, &input, kind)?;
        }
        Commands::Importance { model, kind, top } => {
            cmd_importance(&model, kind, top)?;
        }
        Commands::Serve { model, host, port } => {
            cmd_serve(model, host, port).await?;
        }
    }

    Ok(())
}
