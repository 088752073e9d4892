//! # plc CLI Entry Point

use clap::Parser;

/// Policy lifecycle toolchain.
///
/// Inspects the transition table and runs lifecycle scenarios against an
/// in-memory policy stack.
#[derive(Parser, Debug)]
#[command(name = "plc", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Print the transition table.
    Table(plc_cli::table::TableArgs),
    /// List available actions for a state and role set.
    Actions(plc_cli::actions::ActionsArgs),
    /// Run a YAML lifecycle scenario.
    Run(plc_cli::scenario::RunArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let output = match cli.command {
        Commands::Table(args) => plc_cli::table::run_table(&args)?,
        Commands::Actions(args) => plc_cli::actions::run_actions(&args)?,
        Commands::Run(args) => plc_cli::scenario::run_file(&args)?,
    };
    println!("{output}");

    Ok(())
}
