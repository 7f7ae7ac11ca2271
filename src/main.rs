use clap::Parser;
use mock_pilot::cli::commands::{cmd_configure, cmd_fields, cmd_fill};
use mock_pilot::cli::config::{Cli, Commands, load_config, log_filter, resolve_settings};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_filter(cli.verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(cli.config.as_deref());

    match cli.command {
        Commands::Fields { page } => {
            cmd_fields(&page).await?;
        }
        Commands::Fill {
            page,
            output,
            trace,
            settings,
        } => {
            // Resolve settings: CLI > config > env > defaults
            let resolved = resolve_settings(&config, &settings);
            let trace_path = trace.unwrap_or_else(|| config.trace.path.clone());
            let response = cmd_fill(&page, output.as_deref(), &resolved, &trace_path).await?;
            if !response.success {
                std::process::exit(1);
            }
        }
        Commands::Configure { settings } => {
            cmd_configure(cli.config.as_deref(), &settings)?;
        }
    }

    Ok(())
}
