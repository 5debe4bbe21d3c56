#![expect(
    clippy::multiple_crate_versions,
    reason = "transitive dependency duplication"
)]

use clap::{Parser, Subcommand, ValueEnum};
use coboweb3::{
    chains::{evm::EvmTransaction, registry, solana::SolInstruction},
    config::{Environment, PortalConfig},
    paths::PortalPaths,
    platform::http::HttpPlatform,
    store::{self, ConfigStore, API_PRIVATE_KEY_ENV},
    AddressWallet, ErrorReport, PortalClient, PortalError, Wallet,
};
use eyre::Context as _;
use serde_json::{json, Value};
use std::process::ExitCode;
use tracing_subscriber::prelude::*;

mod cli_output;
mod doctor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CliEnvironment {
    Dev,
    Sandbox,
    Prod,
}

impl From<CliEnvironment> for Environment {
    fn from(v: CliEnvironment) -> Self {
        match v {
            CliEnvironment::Dev => Self::Dev,
            CliEnvironment::Sandbox => Self::Sandbox,
            CliEnvironment::Prod => Self::Prod,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "coboweb3", version)]
struct Cli {
    /// Platform environment for this invocation (overrides config and `COBOWEB3_ENV`).
    #[arg(long, value_enum, global = true)]
    env: Option<CliEnvironment>,

    #[command(subcommand)]
    cmd: Command,
}

/// Selects one address of one wallet.
#[derive(clap::Args, Debug)]
struct AddressArgs {
    /// Platform wallet id.
    #[arg(long)]
    wallet: String,
    /// Address exactly as the platform lists it.
    #[arg(long)]
    address: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List tokens enabled for the organization.
    Tokens,

    /// List chains enabled for the organization.
    Chains,

    /// List wallets.
    Wallets,

    /// Show one wallet.
    Wallet { wallet_id: String },

    /// List a wallet's addresses with their chain family.
    Addresses { wallet_id: String },

    /// List token balances held by one address.
    Balances { wallet_id: String, address: String },

    /// Show a platform transaction.
    Tx { transaction_id: String },

    /// Submit an EVM transaction (JSON, `eth_sendTransaction` field names) as a contract call.
    SendEvm {
        #[command(flatten)]
        target: AddressArgs,
        /// Transaction JSON, e.g. '{"to":"0x..","value":"0x0","data":"0x.."}'.
        #[arg(long)]
        tx: String,
    },

    /// Ask the platform for a fee estimate for an EVM transaction.
    EstimateFee {
        #[command(flatten)]
        target: AddressArgs,
        #[arg(long)]
        tx: String,
    },

    /// Request an EIP-191 personal-message signature.
    PersonalSign {
        #[command(flatten)]
        target: AddressArgs,
        #[arg(long)]
        message: String,
        /// Treat `--message` as 0x-prefixed hex bytes instead of text.
        #[arg(long, default_value_t = false)]
        hex: bool,
    },

    /// Request an EIP-712 typed-data signature.
    SignTyped {
        #[command(flatten)]
        target: AddressArgs,
        /// Typed-data JSON document.
        #[arg(long)]
        typed_data: String,
    },

    /// Submit Solana instructions (JSON array) as a contract call.
    SendSolana {
        #[command(flatten)]
        target: AddressArgs,
        #[arg(long)]
        instructions: String,
    },

    /// Print the native EVM chain id table.
    Registry,

    /// Print resolved paths (useful for debugging).
    Paths,

    /// Print a quick self-diagnostic report (safe to paste; contains no secrets).
    Doctor {
        /// Emit JSON to stdout (machine-readable).
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn init_logging(paths: &PortalPaths) -> tracing_appender::non_blocking::WorkerGuard {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env();
    let file_name = paths
        .log_file
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("coboweb3.log.jsonl");
    let file_appender = tracing_appender::rolling::never(&paths.data_dir, file_name);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(std::io::stderr)
        .with_filter(env_filter.clone());
    let file_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(file_writer)
        .with_filter(env_filter);

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .init();

    guard
}

fn load_config(paths: &PortalPaths, env: Option<CliEnvironment>) -> eyre::Result<PortalConfig> {
    let mut cfg = ConfigStore::new(paths).load()?;
    if let Some(env) = env {
        cfg.environment = env.into();
    }
    Ok(cfg)
}

fn connect(cfg: &PortalConfig) -> eyre::Result<PortalClient<HttpPlatform>> {
    let Some(key) = store::api_private_key_from_env() else {
        cli_output::print_hint("Tip: run `coboweb3 doctor` to check your setup.");
        eyre::bail!("{API_PRIVATE_KEY_ENV} is not set");
    };
    Ok(PortalClient::connect(cfg, &key)?)
}

fn parse_json_arg<T: serde::de::DeserializeOwned>(what: &str, raw: &str) -> eyre::Result<T> {
    serde_json::from_str(raw).with_context(|| format!("parse --{what} JSON"))
}

fn message_bytes(message: &str, hex: bool) -> eyre::Result<Vec<u8>> {
    if hex {
        let h = message.strip_prefix("0x").unwrap_or(message);
        hex::decode(h).context("decode --message hex")
    } else {
        Ok(message.as_bytes().to_vec())
    }
}

/// One address row; `native_chain_id` is filled for EVM tokens the registry knows.
fn address_json(aw: &AddressWallet) -> Value {
    let chain_token = aw.info().chain_token();
    json!({
        "address": aw.address(),
        "chain_id": chain_token,
        "native_chain_id": registry::native_chain_id(chain_token),
        "family": aw.family(),
    })
}

async fn address_wallet(
    portal: &PortalClient<HttpPlatform>,
    target: &AddressArgs,
) -> Result<AddressWallet, PortalError> {
    let wallet = portal.get_wallet(&target.wallet).await?;
    portal.address_wallet(&wallet, &target.address).await
}

/// Commands that talk to the platform.
async fn run_remote(cmd: Command, portal: &mut PortalClient<HttpPlatform>) -> eyre::Result<Value> {
    let out = match cmd {
        Command::Tokens => Value::Array(portal.list_enabled_tokens().await?),
        Command::Chains => Value::Array(portal.list_enabled_chains().await?),
        Command::Wallets => {
            let wallets = portal.list_wallets().await?;
            let wallets: Vec<&Wallet> = wallets.iter().map(|w| &**w).collect();
            serde_json::to_value(wallets)?
        }
        Command::Wallet { wallet_id } => {
            let wallet = portal.get_wallet(&wallet_id).await?;
            serde_json::to_value(&*wallet)?
        }
        Command::Addresses { wallet_id } => {
            let wallet = portal.get_wallet(&wallet_id).await?;
            let aws = portal.address_wallets(&wallet).await?;
            Value::Array(aws.iter().map(address_json).collect())
        }
        Command::Balances { wallet_id, address } => {
            serde_json::to_value(portal.list_token_balances(&wallet_id, &address).await?)?
        }
        Command::Tx { transaction_id } => {
            serde_json::to_value(portal.get_transaction(&transaction_id).await?)?
        }
        Command::SendEvm { target, tx } => {
            let tx: EvmTransaction = parse_json_arg("tx", &tx)?;
            let aw = address_wallet(portal, &target).await?;
            serde_json::to_value(aw.send_evm_transaction(portal, &tx).await?)?
        }
        Command::EstimateFee { target, tx } => {
            let tx: EvmTransaction = parse_json_arg("tx", &tx)?;
            let aw = address_wallet(portal, &target).await?;
            aw.estimate_fee(portal, &tx).await?
        }
        Command::PersonalSign {
            target,
            message,
            hex,
        } => {
            let bytes = message_bytes(&message, hex)?;
            let aw = address_wallet(portal, &target).await?;
            serde_json::to_value(aw.personal_sign(portal, &bytes).await?)?
        }
        Command::SignTyped { target, typed_data } => {
            let typed: Value = parse_json_arg("typed-data", &typed_data)?;
            let aw = address_wallet(portal, &target).await?;
            serde_json::to_value(aw.sign_typed_data(portal, typed).await?)?
        }
        Command::SendSolana {
            target,
            instructions,
        } => {
            let ixs: Vec<SolInstruction> = parse_json_arg("instructions", &instructions)?;
            let aw = address_wallet(portal, &target).await?;
            serde_json::to_value(aw.send_solana_transaction(portal, &ixs).await?)?
        }
        Command::Registry | Command::Paths | Command::Doctor { .. } => {
            eyre::bail!("not a platform command")
        }
    };
    Ok(out)
}

async fn run(cli: Cli, paths: &PortalPaths) -> eyre::Result<()> {
    match cli.cmd {
        Command::Paths => cli_output::print_json(&json!({
          "config_dir": paths.config_dir,
          "data_dir": paths.data_dir,
          "log_file": paths.log_file,
        })),
        Command::Doctor { json } => {
            doctor::run(paths, cli.env.map(Into::into), json).context("doctor failed")
        }
        Command::Registry => {
            let rows: Vec<Value> = registry::entries()
                .iter()
                .map(|e| json!({"chain_id": e.chain_id, "token": e.token, "name": e.name}))
                .collect();
            cli_output::print_json(&rows)
        }
        cmd @ (Command::Tokens
        | Command::Chains
        | Command::Wallets
        | Command::Wallet { .. }
        | Command::Addresses { .. }
        | Command::Balances { .. }
        | Command::Tx { .. }
        | Command::SendEvm { .. }
        | Command::EstimateFee { .. }
        | Command::PersonalSign { .. }
        | Command::SignTyped { .. }
        | Command::SendSolana { .. }) => {
            let cfg = load_config(paths, cli.env)?;
            let mut portal = connect(&cfg)?;
            let out = run_remote(cmd, &mut portal).await?;
            cli_output::print_json(&out)
        }
    }
}

#[tokio::main]
async fn main() -> eyre::Result<ExitCode> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let paths = PortalPaths::discover()?;
    std::fs::create_dir_all(&paths.data_dir).context("create data dir")?;
    let _log_guard = init_logging(&paths);

    match run(cli, &paths).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(report) => match report.downcast_ref::<PortalError>() {
            Some(e) => {
                cli_output::print_error(&ErrorReport::from(e))?;
                Ok(ExitCode::FAILURE)
            }
            None => Err(report),
        },
    }
}
