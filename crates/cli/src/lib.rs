pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "oilwise",
    about = "OilWise analytics CLI",
    long_about = "Run the OilWise scoring engines from the command line: consumption \
                  forecasts, health risk assessments, and recipe recommendations.",
    after_help = "Examples:\n  oilwise assess --input metrics.json\n  oilwise forecast --input history.json\n  oilwise recommend --input preferences.json\n  oilwise config"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Assess health risk from a JSON metric set")]
    Assess {
        #[arg(long, help = "Path to a JSON file with the metric set (defaults to stdin)")]
        input: Option<PathBuf>,
    },
    #[command(about = "Forecast consumption from a JSON array of history records")]
    Forecast {
        #[arg(long, help = "Path to a JSON file with the consumption history (defaults to stdin)")]
        input: Option<PathBuf>,
    },
    #[command(about = "Rank seed-catalog recipes against a JSON preference profile")]
    Recommend {
        #[arg(long, help = "Path to a JSON file with the preference profile (defaults to stdin)")]
        input: Option<PathBuf>,
    },
    #[command(about = "Inspect effective configuration values")]
    Config,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Assess { input } => commands::assess::run(input.as_deref()),
        Command::Forecast { input } => commands::forecast::run(input.as_deref()),
        Command::Recommend { input } => commands::recommend::run(input.as_deref()),
        Command::Config => commands::config::run(),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
