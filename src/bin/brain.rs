//! Brain CLI - Command-line interface for Agent Brain
//!
//! Commands:
//! - build: Ingest captured events and write the site profile and summary
//! - validate: Report which event lines would be accepted
//! - summary: Render the summary of a stored profile

use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use agent_brain::session::{PROFILE_FILE, SUMMARY_FILE};
use agent_brain::types::Profile;
use agent_brain::{
    render_summary, BrainConfig, BrainError, BrainSession, LineOutcome, BRAIN_VERSION,
    PROFILE_SCHEMA,
};

/// Brain - Derive site profiles from captured network traffic
#[derive(Parser)]
#[command(name = "brain")]
#[command(version = BRAIN_VERSION)]
#[command(about = "Derive site profiles from captured network traffic", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest events and write profile.v1.json and summary.md
    Build {
        /// Input NDJSON file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output directory (overrides the config file)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// JSON configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Print the summary to stdout
        #[arg(long)]
        print: bool,
    },

    /// Validate event lines without building
    Validate {
        /// Input NDJSON file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Render the summary of a stored profile
    Summary {
        /// Path to a profile.v1.json file
        #[arg(short, long)]
        profile: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e)).unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_logger(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_millis()
        .try_init();
}

fn run(cli: Cli) -> Result<(), BrainCliError> {
    match cli.command {
        Commands::Build {
            input,
            output,
            config,
            print,
        } => cmd_build(&input, output, config.as_deref(), print),

        Commands::Validate { input, json } => cmd_validate(&input, json),

        Commands::Summary { profile } => cmd_summary(&profile),
    }
}

fn read_input(input: &Path) -> Result<String, BrainCliError> {
    if input.to_string_lossy() == "-" {
        if atty::is(atty::Stream::Stdin) {
            log::warn!("reading events from an interactive terminal; end input with Ctrl-D");
        }
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn cmd_build(
    input: &Path,
    output: Option<PathBuf>,
    config: Option<&Path>,
    print: bool,
) -> Result<(), BrainCliError> {
    let mut config = match config {
        Some(path) => BrainConfig::load(path)?,
        None => BrainConfig::default(),
    };
    if let Some(dir) = output {
        config.output_dir = dir;
    }

    let input_data = read_input(input)?;

    let mut session = BrainSession::new(config);
    session.ingest(&input_data);
    session.build_profile()?;
    session.save()?;

    let out_dir = &session.config().output_dir;
    log::info!(
        "wrote {} and {} to {}",
        PROFILE_FILE,
        SUMMARY_FILE,
        out_dir.display()
    );

    if print {
        if let Some(summary) = session.summary() {
            print!("{}", summary);
        }
    }

    Ok(())
}

fn cmd_validate(input: &Path, json: bool) -> Result<(), BrainCliError> {
    let input_data = read_input(input)?;

    let mut session = BrainSession::default();
    let report = session.ingest(&input_data);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Accepted:   {}", report.accepted);
        println!("Duplicates: {}", report.duplicates);
        println!("Rejected:   {}", report.rejected);

        if report.rejected > 0 {
            println!("\nErrors:");
            for outcome in report.rejections() {
                if let LineOutcome::Rejected { line, reason } = outcome {
                    println!("  - line {}: {}", line, reason);
                }
            }
        }
    }

    if report.rejected > 0 {
        Err(BrainCliError::ValidationFailed(report.rejected))
    } else {
        Ok(())
    }
}

fn cmd_summary(path: &Path) -> Result<(), BrainCliError> {
    let contents = fs::read_to_string(path)?;
    let profile: Profile = serde_json::from_str(&contents)?;
    print!("{}", render_summary(&profile));
    Ok(())
}

// Error types

#[derive(Debug)]
enum BrainCliError {
    Io(io::Error),
    Brain(BrainError),
    Json(serde_json::Error),
    ValidationFailed(usize),
}

impl From<io::Error> for BrainCliError {
    fn from(e: io::Error) -> Self {
        BrainCliError::Io(e)
    }
}

impl From<BrainError> for BrainCliError {
    fn from(e: BrainError) -> Self {
        BrainCliError::Brain(e)
    }
}

impl From<serde_json::Error> for BrainCliError {
    fn from(e: serde_json::Error) -> Self {
        BrainCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<BrainCliError> for CliError {
    fn from(e: BrainCliError) -> Self {
        match e {
            BrainCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            BrainCliError::Brain(BrainError::NoData) => CliError {
                code: "NO_DATA".to_string(),
                message: "No events ingested yet".to_string(),
                hint: Some("Ensure the input contains valid capture events".to_string()),
            },
            BrainCliError::Brain(BrainError::Config(msg)) => CliError {
                code: "CONFIG_ERROR".to_string(),
                message: msg,
                hint: Some("Check the configuration file".to_string()),
            },
            BrainCliError::Brain(e) => CliError {
                code: "BRAIN_ERROR".to_string(),
                message: e.to_string(),
                hint: None,
            },
            BrainCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some(format!("Ensure the file is a {} document", PROFILE_SCHEMA)),
            },
            BrainCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} lines failed validation", count),
                hint: Some("Fix the reported lines and retry".to_string()),
            },
        }
    }
}
