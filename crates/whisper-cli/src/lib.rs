//! # Whisper CLI
//!
//! Command-line client for the one-time-secret HTTP service.
//!
//! This crate talks to a running `whisper-service` instance purely over HTTP
//! via `reqwest`; every subcommand is a client of the wire API of §6:
//! `create`, `fetch`, `destroy`, `status`.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One-time-secret CLI client.
#[derive(Parser)]
#[command(name = "whisper")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Client for the one-time-secret service")]
pub struct Cli {
    /// Base URL of the whisper-service instance to talk to.
    #[arg(long, env = "WHISPER_SERVER", default_value = "http://127.0.0.1:8080")]
    pub server: String,

    /// Request timeout in seconds.
    #[arg(long, default_value = "30")]
    pub timeout_seconds: u64,

    /// Logging level.
    #[arg(short, long, default_value = "info")]
    pub log_level: String,

    /// Emit JSON-formatted logs.
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands, one per wire endpoint of §6.
#[derive(Subcommand)]
pub enum Commands {
    /// Deposit a secret and receive its token.
    Create {
        /// The secret text. Use `--file` instead to send file bytes.
        #[arg(conflicts_with = "file")]
        secret: Option<String>,

        /// Path to a file whose bytes are deposited, base64-encoded.
        #[arg(long, conflicts_with = "secret")]
        file: Option<std::path::PathBuf>,

        /// Optional password gating retrieval and destruction.
        #[arg(short, long)]
        password: Option<String>,

        /// Retrieval budget; `<= 0` means unlimited until expiration.
        #[arg(short, long, default_value = "1")]
        accesses: i64,

        /// Lifetime until expiration (e.g. "10m", "24h"). Server default
        /// applies when omitted.
        #[arg(short, long)]
        lifetime: Option<String>,
    },

    /// Retrieve a secret by token, consuming one access.
    Fetch {
        /// The token returned by `create`.
        token: String,

        /// The password, if the secret is password-gated.
        #[arg(short, long)]
        password: Option<String>,

        /// Write the secret payload to this file instead of stdout.
        #[arg(short, long)]
        output: Option<std::path::PathBuf>,
    },

    /// Destroy a secret by token before it would otherwise expire.
    Destroy {
        /// The token returned by `create`.
        token: String,

        /// The password, if the secret is password-gated.
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Query the service's status.
    Status,
}

/// CLI-specific errors.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("invalid argument: {arg} - {message}")]
    InvalidArgument { arg: String, message: String },

    #[error("http request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("server returned {status}: {message}")]
    Server { status: u16, message: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

fn http_client(timeout: Duration) -> Result<reqwest::Client, CliError> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

fn bearer_header(password: &str) -> String {
    format!("Bearer {}", URL_SAFE_NO_PAD.encode(password.as_bytes()))
}

#[derive(Debug, Serialize)]
struct CreateRequestBody {
    secret: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    password: Option<String>,
    accesses: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    lifetime: Option<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    filename: String,
    is_base64: bool,
}

#[derive(Debug, Deserialize)]
struct CreateReplyBody {
    token: String,
    expires: String,
}

#[derive(Debug, Deserialize)]
struct FetchReplyBody {
    secret: String,
    filename: String,
    is_base64: bool,
    #[allow(dead_code)]
    created: String,
    accesses: i64,
    destroyed: bool,
}

#[derive(Debug, Deserialize)]
struct DestroyReplyBody {
    destroyed: bool,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Run the parsed CLI to completion, printing results to stdout.
pub async fn run_cli(cli: Cli) -> Result<(), CliError> {
    let client = http_client(Duration::from_secs(cli.timeout_seconds))?;

    match cli.command {
        Commands::Create {
            secret,
            file,
            password,
            accesses,
            lifetime,
        } => execute_create(&client, &cli.server, secret, file, password, accesses, lifetime).await,
        Commands::Fetch {
            token,
            password,
            output,
        } => execute_fetch(&client, &cli.server, &token, password, output).await,
        Commands::Destroy { token, password } => {
            execute_destroy(&client, &cli.server, &token, password).await
        }
        Commands::Status => execute_status(&client, &cli.server).await,
    }
}

async fn execute_create(
    client: &reqwest::Client,
    server: &str,
    secret: Option<String>,
    file: Option<std::path::PathBuf>,
    password: Option<String>,
    accesses: i64,
    lifetime: Option<String>,
) -> Result<(), CliError> {
    let (secret, filename, is_base64) = match (secret, file) {
        (Some(text), None) => (text, String::new(), false),
        (None, Some(path)) => {
            let bytes = std::fs::read(&path)?;
            let filename = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            (base64::engine::general_purpose::STANDARD.encode(bytes), filename, true)
        }
        (None, None) => {
            return Err(CliError::InvalidArgument {
                arg: "secret".to_string(),
                message: "either a secret argument or --file must be given".to_string(),
            })
        }
        (Some(_), Some(_)) => unreachable!("clap enforces secret/--file are mutually exclusive"),
    };

    let body = CreateRequestBody {
        secret,
        password,
        accesses,
        lifetime,
        filename,
        is_base64,
    };

    let response = client
        .post(format!("{server}/v1/secrets"))
        .json(&body)
        .send()
        .await?;

    let reply: CreateReplyBody = parse_reply(response).await?;
    println!("token:   {}", reply.token);
    println!("expires: {}", reply.expires);
    Ok(())
}

async fn execute_fetch(
    client: &reqwest::Client,
    server: &str,
    token: &str,
    password: Option<String>,
    output: Option<std::path::PathBuf>,
) -> Result<(), CliError> {
    let mut request = client.get(format!("{server}/v1/secrets/{token}"));
    if let Some(password) = &password {
        request = request.header("Authorization", bearer_header(password));
    }

    let response = request.send().await?;
    let reply: FetchReplyBody = parse_reply(response).await?;

    let payload = if reply.is_base64 {
        base64::engine::general_purpose::STANDARD
            .decode(&reply.secret)
            .unwrap_or_else(|_| reply.secret.clone().into_bytes())
    } else {
        reply.secret.clone().into_bytes()
    };

    match output {
        Some(path) => std::fs::write(&path, &payload)?,
        None => {
            use std::io::Write;
            std::io::stdout().write_all(&payload)?;
            if !reply.secret.ends_with('\n') {
                println!();
            }
        }
    }

    if !reply.filename.is_empty() {
        eprintln!("filename: {}", reply.filename);
    }
    eprintln!("accesses: {}", reply.accesses);
    if reply.destroyed {
        eprintln!("this was the final read; the secret has been destroyed");
    }
    Ok(())
}

async fn execute_destroy(
    client: &reqwest::Client,
    server: &str,
    token: &str,
    password: Option<String>,
) -> Result<(), CliError> {
    let mut request = client.delete(format!("{server}/v1/secrets/{token}"));
    if let Some(password) = &password {
        request = request.header("Authorization", bearer_header(password));
    }

    let response = request.send().await?;
    let reply: DestroyReplyBody = parse_reply(response).await?;
    println!("destroyed: {}", reply.destroyed);
    Ok(())
}

async fn execute_status(client: &reqwest::Client, server: &str) -> Result<(), CliError> {
    let response = client.get(format!("{server}/v1/status")).send().await?;
    let body: serde_json::Value = parse_reply(response).await?;
    println!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    Ok(())
}

async fn parse_reply<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
) -> Result<T, CliError> {
    let status = response.status();
    if status.is_success() {
        Ok(response.json::<T>().await?)
    } else {
        let message = response
            .json::<ErrorBody>()
            .await
            .map(|b| b.error)
            .unwrap_or_else(|_| status.to_string());
        Err(CliError::Server {
            status: status.as_u16(),
            message,
        })
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
