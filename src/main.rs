use anyhow::Context;
use clap::Parser;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use trustscore::{
    logging::{self, LogFacade},
    utils::normalize_user_input_path,
    Config,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// File with one GitHub or npm package URL per line
    url_file: String,

    /// Configuration file (defaults to <config dir>/trustscore/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of repositories to evaluate at the same time
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Run the metrics of each repository one after another
    #[arg(long)]
    sequential: bool,

    /// Keep cloned repositories after the run
    #[arg(long)]
    keep_clones: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        let message = format!("{:#}", e);
        eprintln!("{}", logging::fatal_line(&message, std::io::stderr().is_terminal()));
        process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    config.apply_env();
    if let Some(jobs) = cli.jobs {
        config.jobs = jobs;
    }
    if cli.sequential {
        config.concurrent_metrics = false;
    }
    if cli.keep_clones {
        config.keep_clones = true;
    }
    config.validate()?;

    let log_file = config
        .log_file
        .clone()
        .context("Missing environment variables")?;
    logging::init(&log_file, &config.log_level)
        .with_context(|| format!("Failed to open log file {}", log_file.display()))?;

    let url_file = normalize_user_input_path(&cli.url_file);
    trustscore::run(&config, &url_file, Arc::new(LogFacade)).await?;
    Ok(())
}
