mod cerebras;
mod cli;
mod config;
mod exa;
mod export;
mod http;
mod report;
mod research;

pub const USER_AGENT: &str = concat!("quarry/", env!("CARGO_PKG_VERSION"));

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use reqwest::Client;
use tracing::{error, info};

use cerebras::CerebrasClient;
use config::Config;
use exa::ExaClient;
use research::{Mode, Orchestrator};

/// TCP connection establishment timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Research assistant: neural web search plus LLM synthesis with citations.
///
/// Without --query, starts an interactive menu.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Research a single query and exit
    #[arg(short, long)]
    query: Option<String>,

    /// Run two-round deep research (with --query)
    #[arg(long, requires = "query")]
    deep: bool,

    /// Save the result as JSON without asking (with --query)
    #[arg(long, requires = "query")]
    save: bool,

    /// Directory for saved results (overrides QUARRY_OUTPUT_DIR)
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("quarry=info".parse()?),
        )
        .init();

    let args = Args::parse();
    let config = Config::from_env().inspect_err(|e| error!("configuration error: {e}"))?;

    let http = Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(config.request_timeout)
        .build()?;
    let search = ExaClient::new(http.clone(), config.exa_api_key.clone(), config.request_timeout);
    let synthesis = CerebrasClient::new(
        http,
        config.cerebras_api_key.clone(),
        config.request_timeout,
    );
    let output_dir = args.output_dir.unwrap_or(config.output_dir);

    info!(model = %config.research.model, "starting quarry");
    let orchestrator = Orchestrator::new(search, synthesis, config.research);
    let interrupt = &cli::Interrupt::listen();

    match args.query {
        Some(query) => {
            let mode = if args.deep { Mode::Deep } else { Mode::Basic };
            let save_dir = args.save.then_some(output_dir.as_path());
            cli::run_once(
                &orchestrator,
                &query,
                mode,
                save_dir,
                &mut io::stdout(),
                interrupt.pressed(),
            )
            .await?;
        }
        None => {
            println!("quarry: research assistant (Exa search + Cerebras synthesis)");
            cli::run_interactive(
                &orchestrator,
                io::stdin().lock(),
                &mut io::stdout(),
                &output_dir,
                move || interrupt.pressed(),
            )
            .await?;
        }
    }

    Ok(())
}
