use anyhow::Result;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
use cli::{Cli, Commands, commands};

fn main() -> Result<()> {
    // Parse CLI arguments first to get verbosity level
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    let config = cli.config.as_deref();
    let json = cli.json;
    let runtime = tokio::runtime::Runtime::new()?;

    debug!("Command: {:?}", cli.command);
    match cli.command {
        Commands::Classify(args) => runtime.block_on(commands::analyze::classify(args, config, json))?,
        Commands::Route(args) => runtime.block_on(commands::analyze::route(args, config, json))?,
        Commands::Outcome(args) => runtime.block_on(commands::feedback::outcome(args, config, json))?,
        Commands::Suggest(args) => runtime.block_on(commands::feedback::suggest(args, config, json))?,
        Commands::Harvest(args) => runtime.block_on(commands::feedback::harvest(args, config, json))?,
        Commands::Stats => runtime.block_on(commands::status::stats(config, json))?,
        Commands::Handlers => runtime.block_on(commands::status::handlers(config, json))?,
        Commands::ToggleLearning => runtime.block_on(commands::status::toggle_learning(config, json))?,
        Commands::ToggleOrchestration => {
            runtime.block_on(commands::status::toggle_orchestration(config, json))?
        }
        Commands::Mode { mode } => runtime.block_on(commands::status::set_mode(&mode, config, json))?,
        Commands::ResetLearning => runtime.block_on(commands::status::reset_learning(config, json))?,
    }

    Ok(())
}
