//! # sitepact CLI Entry Point
//!
//! Assembles subcommands and dispatches to handler modules.

use clap::Parser;

use sitepact_core::TradeCategory;

/// Sitepact escrow engine CLI.
///
/// Walks the engine through scripted settlement and dispute lifecycles and
/// inspects the trade catalog.
#[derive(Parser, Debug)]
#[command(name = "sitepact", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run a scripted lifecycle against an in-memory engine.
    Demo(sitepact_cli::demo::DemoArgs),
    /// List the trade categories services can be created under.
    Trades,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Demo(args) => sitepact_cli::demo::run(args)?,
        Commands::Trades => {
            for trade in TradeCategory::all() {
                println!("{trade}");
            }
        }
    }

    Ok(())
}
