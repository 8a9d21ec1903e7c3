use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use apexreport::cli;
use apexreport::report::{CoberturaReport, ReportLinkConfig};

/// apexreport — HTML and Cobertura coverage reports for Apex test runs.
#[derive(Parser)]
#[command(name = "apexreport", version, about)]
struct Cli {
    /// Base directory for the reports (default: current directory).
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct LinkArgs {
    /// CI server base URL for the detailed test report link.
    #[arg(long)]
    ci_base_url: Option<String>,

    /// CI job name. Without it, the job is taken from the working directory
    /// when that path contains --ci-marker.
    #[arg(long)]
    ci_job: Option<String>,

    /// Path segment identifying a CI workspace.
    #[arg(long, default_value = cli::DEFAULT_CI_MARKER)]
    ci_marker: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Write Report/ApexUnitReport.html.
    Html {
        /// Run results (JSON).
        #[arg(long)]
        input: PathBuf,

        #[command(flatten)]
        link: LinkArgs,
    },

    /// Write Cobertura4Apex.xml.
    Cobertura {
        /// Run results (JSON).
        #[arg(long)]
        input: PathBuf,
    },

    /// Write both reports.
    All {
        /// Run results (JSON).
        #[arg(long)]
        input: PathBuf,

        #[command(flatten)]
        link: LinkArgs,
    },
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn link_config(args: &LinkArgs, working_dir: &Path) -> Result<ReportLinkConfig> {
    cli::resolve_link(
        args.ci_base_url.as_deref(),
        args.ci_job.as_deref(),
        &args.ci_marker,
        working_dir,
    )
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_logging(args.verbose);

    let working_dir = std::env::current_dir().context("Failed to read working directory")?;
    let base_dir = args.dir.unwrap_or_else(|| working_dir.clone());

    let output = match args.command {
        Commands::Html { input, link } => {
            let link = link_config(&link, &working_dir)?;
            cli::cmd_html(&input, &base_dir, &link)?
        }
        Commands::Cobertura { input } => {
            cli::cmd_cobertura(&input, &base_dir, CoberturaReport::now())?
        }
        Commands::All { input, link } => {
            let link = link_config(&link, &working_dir)?;
            cli::cmd_all(&input, &base_dir, &link, CoberturaReport::now())?
        }
    };
    print!("{output}");
    Ok(())
}
