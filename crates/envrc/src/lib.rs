//! opsetup-envrc - `.envrc` preparation for a local OP Stack chain.
//!
//! This crate fills the L1 endpoint into an environment file and injects the
//! wallet variables printed by the `wallets.sh` getting-started script, while
//! keeping every other line of the file as it was.
//!
//! # Example
//!
//! ```no_run
//! use opsetup_envrc::{CommandSpec, EnvFileUpdater, RpcKind, SystemRunner};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let updater = EnvFileUpdater::new("optimism/.envrc");
//! updater.fill_l1_endpoint("https://ethereum-sepolia-rpc.publicnode.com", &RpcKind::Basic)?;
//!
//! let wallets =
//!     CommandSpec::new("./packages/contracts-bedrock/scripts/getting-started/wallets.sh")
//!         .current_dir("optimism");
//! updater
//!     .inject_from_command(&SystemRunner, &wallets, "export GS_")
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod assignments;
pub use assignments::{Assignments, DEFAULT_ASSIGNMENT_PREFIX};

mod config;
pub use config::{
    CONFIG_FILENAME, DEFAULT_ENVRC_PATH, DEFAULT_TEMPLATE_PATH, DEFAULT_WALLET_SCRIPT,
    L1_RPC_KIND_KEY, L1_RPC_URL_KEY, OpsetupConfig, expand_home,
};

mod envfile;
pub use envfile::{ApplyReport, EnvFile, EnvLine, KeyMatch};

mod error;
pub use error::EnvFileError;

mod rpc_kind;
pub use rpc_kind::RpcKind;

mod runner;
pub use runner::{CommandRunner, CommandSpec, SystemRunner};

mod updater;
pub use updater::{EnvFileUpdater, InjectReport};
