//! Configuration shared by the library and the CLI.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{DEFAULT_ASSIGNMENT_PREFIX, KeyMatch};

/// The default name of the configuration file looked up in the working directory.
pub const CONFIG_FILENAME: &str = "Opsetup.toml";

/// Key holding the L1 RPC endpoint in `.envrc`.
pub const L1_RPC_URL_KEY: &str = "L1_RPC_URL";
/// Key holding the L1 RPC provider kind in `.envrc`.
pub const L1_RPC_KIND_KEY: &str = "L1_RPC_KIND";

pub const DEFAULT_ENVRC_PATH: &str = "~/optimism/.envrc";
pub const DEFAULT_TEMPLATE_PATH: &str = "~/optimism/.envrc.example";
pub const DEFAULT_WALLET_SCRIPT: &str =
    "~/optimism/packages/contracts-bedrock/scripts/getting-started/wallets.sh";

/// Everything needed to prepare an `.envrc` for a local OP Stack chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpsetupConfig {
    /// The environment file to rewrite.
    pub envrc: PathBuf,
    /// The template copied to `envrc` when it does not exist yet.
    pub template: PathBuf,

    /// The L1 RPC endpoint written to `url_key`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub l1_rpc_url: Option<String>,
    /// The L1 RPC provider kind written to `kind_key`.
    pub l1_rpc_kind: String,
    pub url_key: String,
    pub kind_key: String,

    /// Script printing the `export GS_...` wallet variables.
    pub wallet_script: PathBuf,
    /// Extra arguments for the wallet script.
    pub wallet_args: Vec<String>,
    /// Only script output lines starting with this prefix are injected.
    pub assignment_prefix: String,

    pub key_match: KeyMatch,
}

impl Default for OpsetupConfig {
    fn default() -> Self {
        Self {
            envrc: PathBuf::from(DEFAULT_ENVRC_PATH),
            template: PathBuf::from(DEFAULT_TEMPLATE_PATH),
            l1_rpc_url: None,
            l1_rpc_kind: "alchemy".to_string(),
            url_key: L1_RPC_URL_KEY.to_string(),
            kind_key: L1_RPC_KIND_KEY.to_string(),
            wallet_script: PathBuf::from(DEFAULT_WALLET_SCRIPT),
            wallet_args: Vec::new(),
            assignment_prefix: DEFAULT_ASSIGNMENT_PREFIX.to_string(),
            key_match: KeyMatch::default(),
        }
    }
}

impl OpsetupConfig {
    /// Expand a leading `~` in every path of the configuration.
    pub fn expand_paths(mut self) -> Self {
        self.envrc = expand_home(&self.envrc);
        self.template = expand_home(&self.template);
        self.wallet_script = expand_home(&self.wallet_script);
        self
    }
}

/// Replace a leading `~` with the user's home directory.
///
/// Paths without a leading `~`, or hosts without a home directory, are
/// returned unchanged.
pub fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };

    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}
