use clap::Parser;
use ledger_spammer::client::{ClientConfig, HttpLedgerClient};
use ledger_spammer::logging::init_logging;
use ledger_spammer::spam::{parse_duration, Dispatcher, Mode, SpamConfig, SpamError};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "spammer", about = "Load generator for a ledger node's public API")]
struct Cli {
    /// The program to run: 0 = faucet requests, 1 = data messages, 2 = conflicts
    #[arg(long, default_value_t = 0)]
    program: u8,

    /// Concurrent workers for faucet and data spam
    #[arg(long, default_value_t = 4)]
    program_para: usize,

    /// Leading zero bits required by the faucet proof of work
    #[arg(long, default_value_t = 22)]
    faucet_pow_target: u32,

    /// Pause between two requests of one worker (e.g. 500ms, 2s)
    #[arg(long, default_value = "0s", value_parser = parse_duration)]
    faucet_req_sleep: Duration,

    /// Interval between funding polls
    #[arg(long, default_value = "1s", value_parser = parse_duration)]
    polling_interval: Duration,

    /// How long to wait for faucet funds before giving up on a conflict run
    #[arg(long, default_value = "20s", value_parser = parse_duration)]
    funding_timeout: Duration,

    /// Native balance required before the conflicting spends are sent
    #[arg(long, default_value_t = 1_000_000)]
    funding_threshold: u64,

    /// Stop each worker after this many iterations (runs until interrupted by default)
    #[arg(long)]
    iterations: Option<u64>,

    /// Timeout of a single HTTP request
    #[arg(long, default_value = "20s", value_parser = parse_duration)]
    request_timeout: Duration,

    /// The node to use
    #[arg(long, default_value = "http://127.0.0.1:8080")]
    node: String,
}

impl Cli {
    fn spam_config(&self) -> SpamConfig {
        SpamConfig::new()
            .with_parallelism(self.program_para)
            .with_faucet_pow_target(self.faucet_pow_target)
            .with_request_sleep(self.faucet_req_sleep)
            .with_polling_interval(self.polling_interval)
            .with_funding_timeout(self.funding_timeout)
            .with_funding_threshold(self.funding_threshold)
            .with_iterations(self.iterations)
    }

    fn client_config(&self) -> ClientConfig {
        ClientConfig::new(&self.node).with_request_timeout(self.request_timeout)
    }
}

async fn run(cli: Cli) -> Result<(), SpamError> {
    let mode = Mode::try_from(cli.program)?;
    let client = Arc::new(HttpLedgerClient::new(&cli.client_config())?);
    info!(node = %client.base_url(), "using node");

    let dispatcher = Dispatcher::new(client, cli.spam_config())?;
    dispatcher
        .run(mode, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "unable to listen for interrupt");
                std::future::pending::<()>().await;
            }
        })
        .await
}

#[tokio::main]
async fn main() {
    init_logging();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        error!(error = %e, "spammer stopped");
        std::process::exit(1);
    }
}
