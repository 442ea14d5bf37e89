//! Command-line access to Kotia network parameters, addresses and keys
//!
//! Every subcommand prints one JSON document on stdout; logs go to stderr.

use clap::{Parser, Subcommand};
use kot_core::NetworkContext;
use kot_params::{NetworkKind, ParamsConfig};
use std::path::PathBuf;
use tracing::debug;

mod report;

#[derive(Parser)]
#[command(name = "kotwallet-cli")]
#[command(about = "Kotia network parameters, addresses and keys", long_about = None)]
struct Cli {
    /// Network to operate on (overrides KOT_NETWORK)
    #[arg(short, long, global = true)]
    network: Option<NetworkKind>,

    /// Directory with servers/checkpoints overrides (overrides KOT_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every registered network
    Networks,

    /// Show the full parameter profile of the selected network
    Info,

    /// Show the genesis hash in display and internal byte order
    Genesis,

    /// Show the latest verified checkpoint
    Checkpoint {
        /// Latest checkpoint at or below this height
        #[arg(long)]
        height: Option<u32>,
    },

    /// Look up the extended-key version header of a scheme
    Header {
        /// Scheme tag (standard, p2wpkh-p2sh, p2wsh-p2sh, p2wpkh, p2wsh)
        scheme: String,

        /// Private (xprv) header instead of public
        #[arg(long)]
        private: bool,
    },

    /// Decode an extended key on the selected network
    InspectKey {
        /// Base58 extended key
        key: String,
    },

    /// Derive an account key and its first addresses from a mnemonic
    Derive {
        /// BIP-39 mnemonic
        #[arg(long)]
        mnemonic: String,

        /// BIP-39 passphrase
        #[arg(long, default_value = "")]
        passphrase: String,

        /// Scheme tag
        #[arg(long, default_value = "p2wpkh")]
        scheme: String,

        /// Account index
        #[arg(long, default_value_t = 0)]
        account: u32,

        /// Number of addresses
        #[arg(long, default_value_t = 5)]
        count: u32,

        /// Derive change addresses
        #[arg(long)]
        change: bool,
    },

    /// Check an address against the selected network
    ValidateAddress {
        /// Address to check
        address: String,
    },
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = config_for(&cli, ParamsConfig::from_env()?);
    debug!("Using {:?}", config);
    kot_params::init(&config)?;

    let ctx = NetworkContext::active();
    let output = match cli.command {
        Commands::Networks => report::networks(ctx.kind()),
        Commands::Info => report::info(ctx.profile()),
        Commands::Genesis => report::genesis(ctx.profile())?,
        Commands::Checkpoint { height } => report::checkpoint(ctx.profile(), height)?,
        Commands::Header { scheme, private } => report::header(&ctx, &scheme, private)?,
        Commands::InspectKey { key } => report::inspect_key(&ctx, &key)?,
        Commands::Derive {
            mnemonic,
            passphrase,
            scheme,
            account,
            count,
            change,
        } => report::derive(&ctx, &mnemonic, &passphrase, &scheme, account, count, change)?,
        Commands::ValidateAddress { address } => report::validate_address(&ctx, &address),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Command-line flags win over the environment
fn config_for(cli: &Cli, mut config: ParamsConfig) -> ParamsConfig {
    if let Some(network) = cli.network {
        config.network = network;
    }
    if let Some(dir) = &cli.data_dir {
        config.data_dir = Some(dir.clone());
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_environment() {
        let cli = Cli::parse_from(["kotwallet-cli", "--network", "Testnet", "info"]);
        let env = ParamsConfig {
            network: NetworkKind::Regtest,
            data_dir: Some(PathBuf::from("/env")),
        };
        let config = config_for(&cli, env);
        assert_eq!(config.network, NetworkKind::Testnet);
        assert_eq!(config.data_dir, Some(PathBuf::from("/env")));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["kotwallet-cli", "checkpoint", "--height", "10", "-n", "signet"]);
        assert_eq!(cli.network, Some(NetworkKind::Signet));
        assert!(matches!(cli.command, Commands::Checkpoint { height: Some(10) }));
    }

    #[test]
    fn test_unknown_network_rejected() {
        assert!(Cli::try_parse_from(["kotwallet-cli", "--network", "bitcoin", "info"]).is_err());
    }
}
