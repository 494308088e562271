// lotegen CLI - fills template copies from loosely structured batch sheets

mod error;
mod exit_codes;
mod generate;
mod inspect;
mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use lotegen_config::Settings;

use error::CliError;
use exit_codes::EXIT_SUCCESS;
use generate::{cmd_generate, GenerateArgs};
use inspect::{cmd_inspect, InspectArgs};

#[derive(Parser)]
#[command(name = "lotegen")]
#[command(about = "Fill integration templates from batch spreadsheets, one file per event")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// More log output on stderr (-v info, -vv debug)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate one filled template per event (HC30%, HCP, CALCS, HSP, CALCP)
    #[command(after_help = "\
Examples:
  lotegen generate lote.xlsx
  lotegen generate lote.xlsx --template modelos/testesLotes.xlsx --out-dir saida
  lotegen generate lote.csv --hcp 'Contratual CHM' --hsp 'Sucumb. Preço' --json
  lotegen generate lote.xlsx --strict || echo 'some columns were left empty'")]
    Generate(GenerateArgs),

    /// Show the detected header, the batch columns and how column texts resolve
    #[command(after_help = "\
Examples:
  lotegen inspect lote.xlsx
  lotegen inspect lote.xlsx -c 'contratual 30' -c 'sucumb preco' --json")]
    Inspect(InspectArgs),

    /// Settings file helpers
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the settings file path
    Path,

    /// Write a commented default settings file
    Init {
        /// Write here instead of the default path
        #[arg(long, value_name = "FILE")]
        path: Option<PathBuf>,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  lotegen-engine ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("TARGET"),
    )
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Generate(args) => cmd_generate(args),
        Commands::Inspect(args) => cmd_inspect(args),
        Commands::Config(ConfigCommands::Path) => cmd_config_path(),
        Commands::Config(ConfigCommands::Init { path }) => cmd_config_init(path),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

// ============================================================================
// config
// ============================================================================

fn cmd_config_path() -> Result<(), CliError> {
    println!("{}", Settings::config_path().display());
    Ok(())
}

fn cmd_config_init(path: Option<PathBuf>) -> Result<(), CliError> {
    let path = path.unwrap_or_else(Settings::config_path);
    Settings::init_file(&path).map_err(|e| {
        CliError::from(e).with_hint("edit the existing file, or pass --path")
    })?;
    println!("{}", path.display());
    Ok(())
}
