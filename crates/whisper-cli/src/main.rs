use clap::Parser;
use tracing::error;
use whisper_cli::{Cli, CliError};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.json_logs);

    if let Err(e) = whisper_cli::run_cli(cli).await {
        error!("whisper CLI error: {e}");

        let exit_code = match e {
            CliError::InvalidArgument { .. } => 1,
            CliError::Request(_) => 2,
            CliError::Server { .. } => 3,
            CliError::Io(_) => 4,
        };

        std::process::exit(exit_code);
    }
}

fn init_tracing(level: &str, json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
