use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use waterfall_tools::session::Session;
use waterfall_tools::{Result, ToolError};

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_logging(&cli.log_level).and_then(|()| run(cli)) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Utilities(args) => execute_utilities(args),
        Command::Render(args) => execute_render(args),
        Command::Dump(args) => execute_dump(args),
    }
}

fn execute_utilities(args: UtilitiesArgs) -> Result<()> {
    let session = load_session(&args.input)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(session.utilities())?);
    } else {
        for utility in session.utilities() {
            println!("{utility}");
        }
    }
    Ok(())
}

fn execute_render(args: RenderArgs) -> Result<()> {
    let session = load_session(&args.input)?;

    let utility = match args.utility {
        Some(utility) => {
            if !session.utilities().contains(&utility) {
                return Err(ToolError::UnknownUtility(utility));
            }
            utility
        }
        None => session.default_utility().unwrap_or_default().to_string(),
    };
    info!(%utility, "rendering flows");

    let text = session.render(&utility);
    match args.output {
        Some(path) => fs::write(path, text)?,
        None => println!("{text}"),
    }
    Ok(())
}

fn execute_dump(args: DumpArgs) -> Result<()> {
    let session = load_session(&args.input)?;
    if let Some(dataset) = session.dataset() {
        println!("{}", serde_json::to_string_pretty(dataset)?);
    }
    Ok(())
}

fn load_session(input: &Path) -> Result<Session> {
    let mut session = Session::default();
    session.load_path(input)?;
    Ok(session)
}

/// Installs the global subscriber. `RUST_LOG` takes precedence over `level`.
fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|error| ToolError::Logging(error.to_string()))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init()
        .map_err(|error| ToolError::Logging(error.to_string()))
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Turn Utility/Source/Target/Value sheets into waterfall flow text."
)]
struct Cli {
    /// Log level or filter directive, overridden by RUST_LOG.
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the utilities found in a CSV or Excel file.
    Utilities(UtilitiesArgs),
    /// Render the flow text for one utility.
    Render(RenderArgs),
    /// Print the normalised records as JSON.
    Dump(DumpArgs),
}

#[derive(clap::Args)]
struct UtilitiesArgs {
    /// Input file path (.csv, .xlsx or .xls).
    #[arg(long)]
    input: PathBuf,

    /// Print the list as a JSON array.
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args)]
struct RenderArgs {
    /// Input file path (.csv, .xlsx or .xls).
    #[arg(long)]
    input: PathBuf,

    /// Utility to render; defaults to the first in sorted order.
    #[arg(long)]
    utility: Option<String>,

    /// Output file path; prints to stdout when omitted.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(clap::Args)]
struct DumpArgs {
    /// Input file path (.csv, .xlsx or .xls).
    #[arg(long)]
    input: PathBuf,
}
