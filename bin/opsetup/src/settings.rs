//! Layered configuration: defaults, TOML file, `OPSETUP_*` variables, CLI flags.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use opsetup_envrc::{CONFIG_FILENAME, KeyMatch, OpsetupConfig};
use serde::Serialize;

use crate::cli::{Cli, Command, L1Args, ScriptArgs};

const ENV_PREFIX: &str = "OPSETUP_";

/// Values given on the command line. Unset flags are left out so they do not
/// shadow lower layers.
#[derive(Debug, Default, Serialize)]
struct CliOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    envrc: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    template: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    l1_rpc_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    l1_rpc_kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    wallet_script: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    wallet_args: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    assignment_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    key_match: Option<KeyMatch>,
}

impl CliOverrides {
    fn from_cli(cli: &Cli) -> Self {
        let mut overrides = Self {
            envrc: cli.envrc.clone(),
            key_match: cli.key_match,
            ..Default::default()
        };

        match &cli.command {
            Command::FillL1(l1) => overrides.with_l1(l1),
            Command::Inject(script) | Command::Extract { script, .. } => {
                overrides.with_script(script)
            }
            Command::Setup(setup) => {
                overrides.with_l1(&setup.l1);
                overrides.with_script(&setup.script);
                overrides.template = setup.template.clone();
            }
            Command::Config => {}
        }

        overrides
    }

    fn with_l1(&mut self, l1: &L1Args) {
        self.l1_rpc_url = l1.url.clone();
        self.l1_rpc_kind = l1.kind.as_ref().map(ToString::to_string);
    }

    fn with_script(&mut self, script: &ScriptArgs) {
        self.wallet_script = script.script.clone();
        self.assignment_prefix = script.prefix.clone();
        if !script.args.is_empty() {
            self.wallet_args = Some(script.args.clone());
        }
    }
}

/// Resolve the effective configuration for this invocation.
pub fn load(cli: &Cli) -> Result<OpsetupConfig> {
    let figment = figment(cli.config.as_deref(), Path::new(CONFIG_FILENAME))?
        .merge(Env::prefixed(ENV_PREFIX))
        .merge(Serialized::defaults(CliOverrides::from_cli(cli)));

    let config: OpsetupConfig = figment
        .extract()
        .context("Failed to load configuration")?;

    Ok(config.expand_paths())
}

/// Defaults merged with the explicit config file, or with `fallback` if it exists.
fn figment(explicit: Option<&Path>, fallback: &Path) -> Result<Figment> {
    let figment = Figment::from(Serialized::defaults(OpsetupConfig::default()));

    match explicit {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Configuration file not found: {}", path.display());
            }
            tracing::debug!(path = %path.display(), "Loading configuration file");
            Ok(figment.merge(Toml::file(path)))
        }
        None if fallback.exists() => {
            tracing::debug!(path = %fallback.display(), "Loading configuration file");
            Ok(figment.merge(Toml::file(fallback)))
        }
        None => Ok(figment),
    }
}
