use anyhow::{Context, Result};
use clap::Parser;
use rust_decimal::Decimal;
use serde_json::Value;
use std::time::Duration;
use tspay::{ClientConfig, Payments, TransactionRequest, TsPayClient};

/// tspay - TsPay merchant API client
///
/// Creates transactions and checks their status using a merchant access token.
///
/// Examples:
///   tspay --token TOKEN create 15000 --comment "order 42"
///   tspay --token TOKEN check abc123
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Merchant access token (also via TSPAY_ACCESS_TOKEN)
    #[arg(
        long = "token",
        env = "TSPAY_ACCESS_TOKEN",
        value_name = "TOKEN",
        hide_env_values = true,
        global = true
    )]
    token: Option<String>,

    /// API base URL (defaults to https://tspay.uz/api/v1)
    #[arg(long = "base-url", value_name = "URL", global = true)]
    base_url: Option<String>,

    /// Attempts made while the API answers 429
    #[arg(long = "max-retries", value_name = "N", global = true)]
    max_retries: Option<u32>,

    /// Seconds to wait between rate-limited attempts
    #[arg(long = "retry-delay", value_name = "SECONDS", global = true)]
    retry_delay: Option<f64>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Create a new transaction
    Create(CreateArgs),

    /// Show the status of a transaction
    Check(CheckArgs),
}

#[derive(clap::Args, Debug)]
struct CreateArgs {
    /// Amount to charge
    #[arg(value_name = "AMOUNT")]
    amount: Decimal,

    /// Where the payer is sent after paying
    #[arg(long = "redirect-url", default_value = "")]
    redirect_url: String,

    /// Free-form note attached to the transaction
    #[arg(long, default_value = "")]
    comment: String,
}

#[derive(clap::Args, Debug)]
struct CheckArgs {
    /// Cheque id returned when the transaction was created
    #[arg(value_name = "CHEQUE_ID")]
    cheque_id: String,
}

impl Cli {
    fn client_config(&self) -> Result<ClientConfig> {
        let mut config = ClientConfig::new();
        if let Some(base_url) = &self.base_url {
            config = config.with_base_url(base_url);
        }
        if let Some(max_retries) = self.max_retries {
            config = config.with_max_retries(max_retries);
        }
        if let Some(seconds) = self.retry_delay {
            let delay = Duration::try_from_secs_f64(seconds)
                .context("--retry-delay must be a non-negative number of seconds")?;
            config = config.with_retry_delay(delay);
        }
        Ok(config)
    }
}

fn run(payments: &dyn Payments, token: &str, command: Commands) -> Result<Value> {
    let value = match command {
        Commands::Create(args) => {
            let request = TransactionRequest::new(args.amount)
                .with_redirect_url(args.redirect_url)
                .with_comment(args.comment);
            Value::from(payments.create_transaction(token, &request)?)
        }
        Commands::Check(args) => payments.check_transaction(token, &args.cheque_id)?,
    };
    Ok(value)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let config = cli.client_config()?;
    let client = TsPayClient::new(config)?;
    let token = cli.token.unwrap_or_default();

    let value = run(&client, &token, cli.command)?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
