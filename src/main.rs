//! Kadena wallet CLI
//!
//! Talks to the local signing daemons (Chainweaver, Zelcore).

use clap::{Parser, Subcommand, ValueEnum};
use kda_wallet::pact::{CommandSerializer, PactCommandSerializer};
use kda_wallet::wallets::{ChainweaverConnector, ZelcoreConnector};
use kda_wallet::{Account, Config, Error, KdaWallet, PactCommand, Result, Wallet, WalletConnector};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "kda-wallet")]
#[command(about = "Sign Kadena transactions with a local wallet")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum DaemonWallet {
    Chainweaver,
    Zelcore,
}

#[derive(Subcommand)]
enum Commands {
    /// Report which local wallets are running
    Probe,

    /// List the Kadena accounts Zelcore holds
    Accounts,

    /// Sign one command
    Sign {
        #[arg(short, long, value_enum)]
        wallet: DaemonWallet,

        /// JSON file holding the command
        #[arg(long)]
        cmd: PathBuf,

        /// Account to sign with (Chainweaver); defaults to the sender's k: account
        #[arg(short, long)]
        account: Option<String>,
    },

    /// Quicksign a batch of commands with Chainweaver
    Quicksign {
        /// JSON files holding the commands
        #[arg(long, num_args = 1.., required = true)]
        cmd: Vec<PathBuf>,

        /// Account to sign with
        #[arg(short, long)]
        account: String,
    },

    /// Print the command string and hash that quicksign would send
    Hash {
        #[arg(long)]
        cmd: PathBuf,
    },

    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (ignore if not found)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let config = match cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    }
    .with_overrides(|name| std::env::var(name).ok());

    match cli.command {
        Commands::Probe => run_probe(&config).await?,
        Commands::Accounts => {
            let accounts = ZelcoreConnector::with_url(&config.zelcore_url)?
                .fetch_accounts()
                .await?;
            print_json(&accounts)?;
        }
        Commands::Sign {
            wallet,
            cmd,
            account,
        } => run_sign(&config, wallet, &cmd, account).await?,
        Commands::Quicksign { cmd, account } => run_quicksign(&config, &cmd, &account).await?,
        Commands::Hash { cmd } => {
            let serialized = PactCommandSerializer.serialize(&read_command(&cmd)?)?;
            print_json(&serialized)?;
        }
        Commands::Config => print_json(&config)?,
    }

    Ok(())
}

async fn run_probe(config: &Config) -> Result<()> {
    let chainweaver = ChainweaverConnector::with_url(&config.chainweaver_url)?;
    let zelcore = ZelcoreConnector::with_url(&config.zelcore_url)?;

    let (chainweaver_up, zelcore_up) =
        tokio::join!(chainweaver.is_installed(), zelcore.is_installed());

    println!("{:<12} {}", chainweaver.wallet_name(), status(chainweaver_up));
    println!("{:<12} {}", zelcore.wallet_name(), status(zelcore_up));
    Ok(())
}

fn status(installed: bool) -> &'static str {
    if installed {
        "running"
    } else {
        "not found"
    }
}

async fn run_sign(
    config: &Config,
    wallet: DaemonWallet,
    cmd_path: &Path,
    account: Option<String>,
) -> Result<()> {
    let cmd = read_command(cmd_path)?;

    let wallet: Wallet = match wallet {
        DaemonWallet::Chainweaver => {
            let account = match account {
                Some(account) => Account::from_k_account(&account)?,
                None => {
                    let sender = cmd.sender_signer().ok_or_else(|| {
                        Error::Validation("command has no signers".to_string())
                    })?;
                    Account::k_account_for(&sender.pub_key)
                }
            };
            ChainweaverConnector::with_url(&config.chainweaver_url)?
                .connect(vec![account])
                .await?
                .into()
        }
        DaemonWallet::Zelcore => ZelcoreConnector::with_url(&config.zelcore_url)?
            .connect(())
            .await?
            .into(),
    };

    tracing::info!(
        wallet = wallet.wallet_name(),
        chain_id = %cmd.public_meta.chain_id,
        "Signing command"
    );
    let signed = wallet.sign_cmd(&cmd).await?;
    wallet.disconnect().await?;
    print_json(&signed)
}

async fn run_quicksign(config: &Config, cmd_paths: &[PathBuf], account: &str) -> Result<()> {
    let cmds = cmd_paths
        .iter()
        .map(|path| read_command(path))
        .collect::<Result<Vec<_>>>()?;

    let wallet = ChainweaverConnector::with_url(&config.chainweaver_url)?
        .connect(vec![Account::from_k_account(account)?])
        .await?;

    tracing::info!(commands = cmds.len(), "Quicksigning batch");
    let signed = wallet.quick_sign_cmds(&cmds).await?;
    print_json(&signed)
}

fn read_command(path: &Path) -> Result<PactCommand> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
    serde_json::from_str(&content)
        .map_err(|e| Error::Validation(format!("{}: {}", path.display(), e)))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
