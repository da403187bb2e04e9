pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "cfpbot",
    about = "CFP review bot operator CLI",
    long_about = "Inspect configuration, apply migrations, and validate proposal exports offline.",
    after_help = "Examples:\n  cfpbot config\n  cfpbot migrate\n  cfpbot validate proposals.json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Validate every proposal in an API export file and print a JSON report")]
    Validate {
        #[arg(help = "Path to a JSON file shaped like the `/api/proposals` response")]
        file: PathBuf,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Migrate => commands::migrate::run(),
        Command::Validate { file } => commands::validate::run(&file),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
