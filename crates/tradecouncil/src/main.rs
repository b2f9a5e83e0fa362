use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tradecouncil::agents::report::store_pipeline_result;
use tradecouncil::agents::FsReportSink;
use tradecouncil::models::{FundContext, PipelineOverrides};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "tradecouncil", about = "Multi-agent debate pipeline for fund trade decisions")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/tradecouncil.toml", global = true)]
    config: PathBuf,

    /// Pretty-print the output JSON
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the full pipeline and print the result
    Run {
        #[command(flatten)]
        fund: FundArgs,

        /// File with recent trade history to show the trader and fund manager
        #[arg(long)]
        trade_memory: Option<PathBuf>,

        /// Model for every agent, overriding the config
        #[arg(long)]
        model: Option<String>,

        /// Do not write the report to the reports directory
        #[arg(long)]
        no_save: bool,
    },
    /// Run only the analysts and print their reports
    Analysts {
        #[command(flatten)]
        fund: FundArgs,

        #[arg(long)]
        model: Option<String>,
    },
}

#[derive(Args, Debug)]
struct FundArgs {
    /// Fund identifier
    #[arg(long)]
    fund: String,

    /// File with the fund briefing (portfolio, mandate, market context)
    #[arg(long)]
    context: PathBuf,

    /// Tradeable tickers, comma separated
    #[arg(long, value_delimiter = ',')]
    universe: Vec<String>,
}

impl FundArgs {
    fn load(&self) -> Result<FundContext> {
        Ok(FundContext {
            fund_id: self.fund.clone(),
            briefing: read_file(&self.context)?,
            universe: self.universe.iter().map(|s| s.trim().to_uppercase()).collect(),
        })
    }
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let output = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{output}");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing (respects RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = tradecouncil::load_config(&cli.config)?;
    let orchestrator = tradecouncil::build_orchestrator(&config);

    match cli.command {
        Command::Run {
            fund,
            trade_memory,
            model,
            no_save,
        } => {
            let context = fund.load()?;
            let overrides = PipelineOverrides {
                model,
                trade_memory_text: trade_memory.as_deref().map(read_file).transpose()?,
            };

            let result = tradecouncil::run_pipeline(&orchestrator, &context, &overrides)
                .await
                .map_err(|e| anyhow::anyhow!("Pipeline aborted: {e}"))?;

            if !no_save {
                let sink = FsReportSink::new(&config.reports.output_dir);
                let key = store_pipeline_result(&sink, &result).context("Failed to store report")?;
                tracing::info!(fund = %key.fund_id, date = %key.date, "Report saved");
            }
            print_json(&result, cli.pretty)?;
        }
        Command::Analysts { fund, model } => {
            let context = fund.load()?;
            let overrides = PipelineOverrides {
                model,
                trade_memory_text: None,
            };
            let reports =
                tradecouncil::run_analyst_stage_only(&orchestrator, &context, &overrides).await;
            print_json(&reports, cli.pretty)?;
        }
    }

    Ok(())
}
