mod commands;
mod ecdsa;
mod info;
mod init;
mod ledger;
mod utils;

pub use commands::{Cli, Commands, OutputFormat};
pub use ecdsa::handle_ecdsa;
pub use info::show_info;
pub use init::init_node;
pub use ledger::{
    balance, decode, delete_original, deploy, derivative, mint, set_base_uri, set_verifier,
    token_uri, transfer_ownership, DeployRequest,
};
pub use utils::init_logging;
