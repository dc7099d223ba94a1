use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::document::{DocumentWriter, PdfWriter};
use crate::load_config::load_config;
use crate::report;

/// CLI for repo-report: turn a repository into a paginated PDF report.
#[derive(Parser)]
#[clap(
    name = "repo-report",
    version,
    about = "Assemble markdown docs and a directory tree into a paginated PDF report"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate the report described by the given config file
    Generate {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
        /// Override the repository root from the config
        #[clap(long)]
        repo: Option<PathBuf>,
        /// Override the output file from the config
        #[clap(long)]
        output: Option<PathBuf>,
    },
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Generate {
            config,
            repo,
            output,
        } => {
            let mut config = load_config(config)?;
            if let Some(repo) = repo {
                config.repo_path = repo;
            }
            if let Some(output) = output {
                config.output_file = output;
            }

            println!("Report generation starting...");
            let mut writer = PdfWriter::new(&config.title);
            match report::generate(&config, &mut writer).await {
                Ok(summary) => {
                    let bytes = writer
                        .finish()
                        .await
                        .map_err(|e| anyhow::anyhow!("Failed to render document: {e:?}"))?;
                    fs::write(&config.output_file, &bytes).map_err(|e| {
                        anyhow::anyhow!(
                            "Failed to write output file {}: {e}",
                            config.output_file.display()
                        )
                    })?;
                    println!("Report complete: {}", config.output_file.display());
                    println!("Summary:\n{:#?}", summary);
                    Ok(())
                }
                Err(e) => {
                    eprintln!("[ERROR] Report generation failed: {}", e);
                    Err(anyhow::Error::msg(e))
                }
            }
        }
    }
}
