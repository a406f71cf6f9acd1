pub mod commands;
pub mod logging;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "maxim",
    about = "Maxim operator CLI",
    long_about = "Inspect configuration, check backend readiness, list the concept vocabulary, \
                  and generate concepts from the terminal.",
    after_help = "Examples:\n  maxim doctor --json\n  maxim config\n  maxim generate --field physics --type effect\n  maxim generate --keyword entropy --length 80"
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
    #[command(about = "Validate config, credentials, and backend endpoint reachability")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "List the supported fields and concept types")]
    Vocabulary,
    #[command(about = "Generate one concept record and print it as JSON")]
    Generate {
        #[arg(long, help = "Field of study (random when omitted)")]
        field: Option<String>,
        #[arg(long, conflicts_with = "field", help = "Free-text theme instead of a field")]
        keyword: Option<String>,
        #[arg(long = "type", help = "Concept type (random when omitted)")]
        concept_type: Option<String>,
        #[arg(long, allow_negative_numbers = true, help = "Approximate quote length in characters")]
        length: Option<i64>,
        #[arg(long, default_value_t = 0, help = "Extra attempts after a retryable backend failure")]
        retries: u32,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Config => commands::config::run(),
        Command::Doctor { json } => commands::doctor::run(json),
        Command::Vocabulary => commands::vocabulary::run(),
        Command::Generate { field, keyword, concept_type, length, retries } => {
            commands::generate::run(commands::generate::GenerateArgs {
                field,
                keyword,
                concept_type,
                length,
                retries,
            })
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
