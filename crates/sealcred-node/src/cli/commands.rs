use clap::{Args, Parser, Subcommand, ValueEnum};
use sealcred_node::LedgerKind;
use sealcred_types::{EthAddress, FieldElement, Network};
use std::path::PathBuf;

const BUILD_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "sealcred")]
#[command(version = BUILD_VERSION)]
#[command(author = "SealCred <team@sealcred.xyz>")]
#[command(about = "SealCred - soulbound credential ledgers backed by zero-knowledge proofs")]
#[command(long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[arg(short, long, global = true, value_name = "FILE", help = "Path to config file")]
    pub config: Option<PathBuf>,

    #[arg(short = 'd', long, global = true, value_name = "DIR", env = "SEALCRED_DATA_DIR", help = "Data directory path")]
    pub data_dir: Option<PathBuf>,

    #[arg(short, long, action = clap::ArgAction::Count, global = true, help = "Increase verbosity (-v, -vv, -vvv)")]
    pub verbose: u8,

    #[arg(short, long, global = true, help = "Suppress non-error output")]
    pub quiet: bool,

    #[arg(long, global = true, value_name = "FILE", help = "Write logs to file")]
    pub log_file: Option<PathBuf>,

    #[arg(long, global = true, default_value = "text", help = "Output format")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// The ledger a call is addressed to, and who is calling.
#[derive(Args)]
pub struct CallArgs {
    #[arg(long, value_name = "ADDRESS", help = "Ledger address")]
    pub ledger: EthAddress,
    #[arg(long, value_name = "ADDRESS", help = "Calling account")]
    pub caller: EthAddress,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Initialize configuration and storage")]
    Init {
        #[arg(short, long, help = "Overwrite existing configuration")]
        force: bool,
    },

    #[command(about = "Deploy a new ledger")]
    Deploy {
        #[arg(long, value_enum, help = "Credential family")]
        family: LedgerKind,
        #[arg(long, value_name = "ADDRESS", help = "Deploying account, which becomes the owner")]
        owner: EthAddress,
        #[arg(long, value_name = "ADDRESS", help = "Verifier contract for new derivatives")]
        verifier: EthAddress,
        #[arg(long, value_name = "UINT256", help = "Attestor public key (decimal or 0x hex)")]
        attestor: FieldElement,
        #[arg(long, help = "Network for balance families (goerli, mainnet)")]
        network: Option<Network>,
        #[arg(long, value_name = "ADDRESS", help = "ECDSA attestor address (external ERC-721)")]
        ecdsa_attestor: Option<EthAddress>,
        #[arg(long, value_name = "ADDRESS", help = "SealHub whose roots commitments must match")]
        seal_hub: Option<EthAddress>,
        #[arg(long, default_value = "https://metadata.sealcred.xyz/metadata", help = "Base token URI")]
        base_uri: String,
        #[arg(long = "ledger-version", default_value = "0.0.1", help = "Version string stamped on derivatives")]
        ledger_version: String,
    },

    #[command(about = "Mint a derivative token from a proof")]
    Mint {
        #[command(flatten)]
        call: CallArgs,
        #[arg(long, value_name = "FILE", help = "Proof JSON: {a, b, c, input}")]
        proof: PathBuf,
        #[arg(long, help = "Origin identity; taken from the proof when omitted")]
        original: Option<String>,
        #[arg(long, value_name = "HEX", requires = "signature", help = "Signed attestation message bytes")]
        message: Option<String>,
        #[arg(long, value_name = "HEX", requires = "message", help = "65-byte or 64-byte compact signature")]
        signature: Option<String>,
    },

    #[command(about = "Look up a derivative by origin identity or address")]
    Derivative {
        #[arg(long, value_name = "ADDRESS", help = "Ledger address")]
        ledger: EthAddress,
        #[arg(help = "Origin identity, or a derivative address with --address")]
        target: String,
        #[arg(long, help = "Treat the target as a derivative address")]
        address: bool,
        #[arg(long, value_name = "UINT256", help = "Also report whether this nullifier is used")]
        nullifier: Option<FieldElement>,
    },

    #[command(about = "Show an account's balance in an origin's derivative")]
    Balance {
        #[arg(long, value_name = "ADDRESS", help = "Ledger address")]
        ledger: EthAddress,
        #[arg(help = "Origin identity")]
        original: String,
        #[arg(help = "Account")]
        account: EthAddress,
    },

    #[command(about = "Show the metadata URI of a token")]
    TokenUri {
        #[arg(long, value_name = "ADDRESS", help = "Ledger address")]
        ledger: EthAddress,
        #[arg(help = "Derivative address")]
        derivative: EthAddress,
        #[arg(help = "Token id")]
        token_id: u64,
    },

    #[command(about = "Change the verifier used by future derivatives")]
    SetVerifier {
        #[command(flatten)]
        call: CallArgs,
        #[arg(help = "New verifier contract")]
        verifier: EthAddress,
    },

    #[command(about = "Change the base token URI")]
    SetBaseUri {
        #[command(flatten)]
        call: CallArgs,
        #[arg(help = "New base URI")]
        base_uri: String,
        #[arg(long, value_name = "ADDRESS", help = "Only override this derivative")]
        derivative: Option<EthAddress>,
    },

    #[command(about = "Unregister an origin identity")]
    DeleteOriginal {
        #[command(flatten)]
        call: CallArgs,
        #[arg(help = "Origin identity")]
        original: String,
    },

    #[command(about = "Transfer ledger ownership")]
    TransferOwnership {
        #[command(flatten)]
        call: CallArgs,
        #[arg(help = "New owner")]
        new_owner: EthAddress,
    },

    #[command(about = "Decode a proof's public inputs")]
    Decode {
        #[arg(long, value_enum, help = "Credential family layout")]
        family: LedgerKind,
        #[arg(long, value_name = "FILE", help = "Proof JSON: {a, b, c, input}")]
        proof: PathBuf,
    },

    #[command(about = "Build, sign and recover cross-chain attestations")]
    Ecdsa {
        #[command(subcommand)]
        action: EcdsaAction,
    },

    #[command(about = "Show node or ledger information")]
    Info {
        #[arg(long, value_name = "ADDRESS", help = "Show one ledger in detail")]
        ledger: Option<EthAddress>,
    },
}

#[derive(Args)]
pub struct AttestationArgs {
    #[arg(long, value_name = "ADDRESS", help = "Origin ERC-721 contract")]
    pub origin: EthAddress,
    #[arg(long, help = "Origin network (goerli, mainnet)")]
    pub network: Network,
    #[arg(long, help = "Collection name")]
    pub name: String,
    #[arg(long, help = "Collection symbol")]
    pub symbol: String,
}

#[derive(Subcommand)]
pub enum EcdsaAction {
    #[command(about = "Print the attestation message bytes")]
    Message {
        #[command(flatten)]
        attestation: AttestationArgs,
    },
    #[command(about = "Sign an attestation message")]
    Sign {
        #[command(flatten)]
        attestation: AttestationArgs,
        #[arg(long, value_name = "HEX", env = "SEALCRED_ATTESTOR_KEY", hide_env_values = true, help = "Attestor private key")]
        key: String,
    },
    #[command(about = "Recover the signer of an attestation")]
    Recover {
        #[arg(long, value_name = "HEX", help = "Message bytes")]
        message: String,
        #[arg(long, value_name = "HEX", help = "Signature bytes")]
        signature: String,
    },
}
