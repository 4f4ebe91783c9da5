//! stash: command-line front end for the signet wallet.
//!
//! Settings come from `STASH_*` environment variables and are overridden by
//! the global flags. Logs go to stderr, results to stdout.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use stash_core::bitcoin::Network;
use stash_core::config::{parse_network, ConfigError, WalletConfig};
use stash_core::crypto::Secp256k1Backend;
use stash_core::types::{format_btc, SpendRequest};
use stash_indexer::EsploraClient;
use stash_wallet::{BalanceQuery, SendOutcome, TransferSummary, Wallet};

#[derive(Parser)]
#[command(name = "stash")]
#[command(version, about = "Minimal custodial signet wallet")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// Network (signet, testnet, regtest) [env: STASH_NETWORK]
    #[arg(long, global = true, value_parser = network_arg)]
    network: Option<Network>,

    /// Fixed fee in sats [env: STASH_FEE_SATS]
    #[arg(long, global = true)]
    fee: Option<u64>,

    /// Esplora API base URL [env: STASH_INDEXER_URL]
    #[arg(long, global = true)]
    indexer_url: Option<String>,

    /// Directory holding wallet files [env: STASH_WALLET_DIR]
    #[arg(long, global = true)]
    wallet_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new wallet
    Generate {
        /// Wallet name; stored as <wallet-dir>/<name>.json
        name: String,
    },
    /// Show the balance of a wallet or an address
    Balance(BalanceArgs),
    /// Send funds from a wallet
    Send(SendArgs),
    /// Look up a transaction's confirmation status
    Status {
        /// Transaction id (hex)
        txid: String,
    },
}

#[derive(Args)]
struct BalanceArgs {
    /// Wallet name
    #[arg(short, long, conflicts_with = "address")]
    wallet: Option<String>,

    /// Address to query directly
    #[arg(short, long)]
    address: Option<String>,
}

#[derive(Args)]
struct SendArgs {
    /// Source wallet name
    #[arg(short, long)]
    from: String,

    /// Destination address
    #[arg(short, long)]
    to: String,

    /// Amount in BTC (e.g. 0.0001)
    #[arg(short, long)]
    amount: String,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    yes: bool,
}

fn network_arg(value: &str) -> Result<Network, ConfigError> {
    parse_network("--network", value)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = resolve_config(cli.global)?;
    let wallet = Wallet::new(
        config.clone(),
        Box::new(Secp256k1Backend::new(config.network)),
        Box::new(EsploraClient::new(&config.indexer_url)),
    );

    match cli.command {
        Commands::Generate { name } => generate(&wallet, &name),
        Commands::Balance(args) => balance(&wallet, args).await,
        Commands::Send(args) => send(&wallet, args).await,
        Commands::Status { txid } => status(&wallet, &txid).await,
    }
}

/// Environment first, then flags.
fn resolve_config(flags: GlobalArgs) -> Result<WalletConfig> {
    let mut config = WalletConfig::from_env().context("invalid environment configuration")?;
    if let Some(network) = flags.network {
        config.network = network;
    }
    if let Some(fee) = flags.fee {
        config.fee_sats = fee;
    }
    if let Some(url) = flags.indexer_url {
        config.indexer_url = url.trim_end_matches('/').to_string();
    }
    if let Some(dir) = flags.wallet_dir {
        config.wallet_dir = dir;
    }
    Ok(config)
}

fn generate(wallet: &Wallet, name: &str) -> Result<()> {
    let (path, record) = wallet
        .generate(name)
        .with_context(|| format!("failed to generate wallet {name:?}"))?;

    println!("\n=== WALLET CREATED ===");
    println!("Network:    {}", wallet.config().network);
    println!("Address:    {}", record.address);
    println!("Public key: {}", record.public_key);
    println!("\nWallet saved to: {}", path.display());
    println!("The private key is stored unencrypted in that file. Keep it safe.");
    Ok(())
}

async fn balance(wallet: &Wallet, args: BalanceArgs) -> Result<()> {
    let query = BalanceQuery::from_options(args.wallet, args.address)?;
    let report = wallet.balance(&query).await.context("balance lookup failed")?;

    println!("\n=== BALANCE ===");
    println!("Address:     {}", report.address);
    println!("Total:       {} BTC ({} sats)", format_btc(report.total), report.total);
    println!("Confirmed:   {} sats", report.confirmed);
    println!("Unconfirmed: {} sats", report.unconfirmed);
    if !report.utxos.is_empty() {
        println!("\nUnspent outputs:");
        for utxo in &report.utxos {
            let state = if utxo.status.confirmed { "confirmed" } else { "unconfirmed" };
            println!("  {}:{}  {} sats  ({state})", utxo.txid, utxo.vout, utxo.value);
        }
    }
    Ok(())
}

async fn send(wallet: &Wallet, args: SendArgs) -> Result<()> {
    let request = SpendRequest::new(args.from, args.to, args.amount);
    let skip_prompt = args.yes;
    let confirmer = move |summary: &TransferSummary| {
        print_summary(summary);
        skip_prompt || prompt_yes_no()
    };

    match wallet.send(&request, &confirmer).await.context("send failed")? {
        SendOutcome::Aborted(_) => {
            println!("Aborted by user.");
        }
        SendOutcome::Broadcast(receipt) => {
            println!("\n=== TRANSACTION SENT ===");
            println!("TxID:   {}", receipt.txid);
            println!("Amount: {} sats", receipt.summary.amount_sats);
            println!("Fee:    {} sats", receipt.summary.fee_sats);
            if receipt.change_sats > 0 {
                println!("Change: {} sats", receipt.change_sats);
            }
            if let Some(status) = receipt.already_known {
                println!("Note: the indexer already knew this transaction ({status}).");
            }
        }
    }
    Ok(())
}

async fn status(wallet: &Wallet, txid: &str) -> Result<()> {
    match wallet.status(txid).await.context("status lookup failed")? {
        Some(status) => println!("{txid}: {status}"),
        None => println!("{txid}: not known to the indexer"),
    }
    Ok(())
}

fn print_summary(summary: &TransferSummary) {
    println!("\nTransaction summary:");
    println!("  From: {} ({})", summary.from_wallet, summary.from_address);
    println!("  To:   {}", summary.to_address);
    println!("  Send: {} BTC ({} sats)", summary.amount_btc, summary.amount_sats);
    println!("  Fee:  {} sats", summary.fee_sats);
    println!("  Total deducted: {} sats", summary.total_sats);
}

/// Read one line from stdin; only `y`/`yes` (any case) approves.
fn prompt_yes_no() -> bool {
    print!("\n  Proceed? (y/N): ");
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut line = String::new();
    match io::stdin().lock().read_line(&mut line) {
        Ok(_) => matches!(line.trim().to_lowercase().as_str(), "y" | "yes"),
        Err(_) => false,
    }
}
