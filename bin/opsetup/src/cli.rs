use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use opsetup_envrc::{KeyMatch, RpcKind};
use tracing::level_filters::LevelFilter;

#[derive(Parser)]
#[command(name = "opsetup")]
#[command(
    author,
    version,
    about = "Prepare the .envrc of a local OP Stack chain"
)]
pub struct Cli {
    /// The verbosity level.
    #[arg(
        short,
        long,
        global = true,
        env = "OPSETUP_VERBOSITY",
        default_value_t = LevelFilter::INFO
    )]
    pub verbosity: LevelFilter,

    /// Path to a TOML configuration file.
    ///
    /// If not provided, `Opsetup.toml` in the working directory is used when it exists.
    #[arg(long, global = true, alias = "conf", env = "OPSETUP_CONFIG")]
    pub config: Option<PathBuf>,

    /// The environment file to rewrite.
    ///
    /// Defaults to ~/optimism/.envrc.
    #[arg(long, global = true)]
    pub envrc: Option<PathBuf>,

    /// How replacement keys are matched against lines: `assignment` requires
    /// `KEY=`, `prefix` only requires the line to start with `KEY`.
    #[arg(long, global = true)]
    pub key_match: Option<KeyMatch>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Write the L1 RPC URL and kind into the environment file.
    FillL1(L1Args),

    /// Run the wallet script and inject the variables it exports.
    Inject(ScriptArgs),

    /// Run the wallet script and print the variables it exports.
    Extract {
        #[command(flatten)]
        script: ScriptArgs,

        /// Print the assignments as JSON, values included.
        #[arg(long)]
        json: bool,
    },

    /// Copy the template if needed, fill the L1 endpoint and inject the wallets.
    Setup(SetupArgs),

    /// Print the effective configuration as TOML.
    Config,
}

#[derive(Debug, Clone, Default, Args)]
pub struct L1Args {
    /// The URL of the L1 RPC endpoint.
    #[arg(long, alias = "l1-rpc-url")]
    pub url: Option<String>,

    /// The kind of L1 RPC provider (alchemy, quicknode, infura, basic, ...).
    #[arg(long, alias = "l1-rpc-kind")]
    pub kind: Option<RpcKind>,
}

#[derive(Debug, Clone, Default, Args)]
pub struct ScriptArgs {
    /// The script printing `export KEY=VALUE` lines.
    #[arg(long)]
    pub script: Option<PathBuf>,

    /// Only output lines starting with this prefix are used.
    #[arg(long)]
    pub prefix: Option<String>,

    /// Arguments passed to the script.
    #[arg(last = true)]
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Default, Args)]
pub struct SetupArgs {
    #[command(flatten)]
    pub l1: L1Args,

    #[command(flatten)]
    pub script: ScriptArgs,

    /// The template copied to the environment file when it does not exist.
    #[arg(long)]
    pub template: Option<PathBuf>,

    /// Copy the template even if the environment file already exists.
    #[arg(long)]
    pub overwrite: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fill_l1() {
        let cli = Cli::try_parse_from([
            "opsetup",
            "--envrc",
            "/tmp/.envrc",
            "fill-l1",
            "--url",
            "https://example.org",
            "--kind",
            "alchemy",
        ])
        .expect("valid arguments");

        assert_eq!(cli.envrc, Some(PathBuf::from("/tmp/.envrc")));
        let Command::FillL1(args) = cli.command else {
            panic!("expected fill-l1");
        };
        assert_eq!(args.url.as_deref(), Some("https://example.org"));
        assert_eq!(args.kind, Some(RpcKind::Alchemy));
    }

    #[test]
    fn test_parse_inject_with_script_args() {
        let cli = Cli::try_parse_from([
            "opsetup",
            "inject",
            "--script",
            "./wallets.sh",
            "--key-match",
            "prefix",
            "--",
            "--count",
            "4",
        ])
        .expect("valid arguments");

        assert_eq!(cli.key_match, Some(KeyMatch::Prefix));
        let Command::Inject(args) = cli.command else {
            panic!("expected inject");
        };
        assert_eq!(args.script, Some(PathBuf::from("./wallets.sh")));
        assert_eq!(args.args, vec!["--count", "4"]);
    }

    #[test]
    fn test_parse_rejects_unknown_key_match() {
        assert!(Cli::try_parse_from(["opsetup", "--key-match", "exact", "config"]).is_err());
    }
}
