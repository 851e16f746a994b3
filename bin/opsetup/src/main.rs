//! opsetup prepares the `.envrc` of a local OP Stack chain: it fills the L1
//! endpoint and injects the wallets generated by the getting-started script.

mod cli;
mod settings;

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use clap::Parser;
use comfy_table::Table;

use cli::{Cli, Command};
use opsetup_envrc::{
    Assignments, CommandRunner, CommandSpec, EnvFileUpdater, InjectReport, OpsetupConfig, RpcKind,
    SystemRunner,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize the logger.
    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity)
        .init();

    let config = settings::load(&cli)?;

    let updater = EnvFileUpdater::new(&config.envrc)
        .key_match(config.key_match)
        .l1_keys(&config.url_key, &config.kind_key);

    match &cli.command {
        Command::FillL1(_) => fill_l1(&updater, &config)?,
        Command::Inject(_) => {
            let report = inject(&updater, &config).await?;
            print_report(&report);
        }
        Command::Extract { json, .. } => extract(&config, *json).await?,
        Command::Setup(setup) => {
            tracing::info!(
                envrc = %config.envrc.display(),
                template = %config.template.display(),
                "Preparing environment file..."
            );

            updater
                .init_from_template(&config.template, setup.overwrite)
                .context("Failed to copy environment template")?;
            fill_l1(&updater, &config)?;
            let report = inject(&updater, &config).await?;
            print_report(&report);

            tracing::info!("✓ Environment file ready, run `direnv allow` to load it.");
        }
        Command::Config => {
            let content = toml::to_string_pretty(&config)
                .context("Failed to serialize configuration to TOML")?;
            print!("{content}");
        }
    }

    Ok(())
}

fn fill_l1(updater: &EnvFileUpdater, config: &OpsetupConfig) -> Result<()> {
    let url = config
        .l1_rpc_url
        .as_deref()
        .context("No L1 RPC URL configured: pass --url or set OPSETUP_L1_RPC_URL")?;

    let kind: RpcKind = config
        .l1_rpc_kind
        .parse()
        .context("Failed to parse L1 RPC kind")?;

    updater.fill_l1_endpoint(url, &kind)?;
    Ok(())
}

fn wallet_command(config: &OpsetupConfig) -> CommandSpec {
    let mut command =
        CommandSpec::new(&config.wallet_script).args(config.wallet_args.iter().cloned());

    // The getting-started scripts expect to run from the repository root.
    if let Some(root) = config.envrc.parent().filter(|p| !p.as_os_str().is_empty()) {
        command = command.current_dir(root);
    }

    command
}

async fn inject(updater: &EnvFileUpdater, config: &OpsetupConfig) -> Result<InjectReport> {
    tracing::info!(
        script = %config.wallet_script.display(),
        prefix = %config.assignment_prefix,
        "Injecting wallet variables..."
    );

    updater
        .inject_from_command(
            &SystemRunner,
            &wallet_command(config),
            &config.assignment_prefix,
        )
        .await
}

async fn extract(config: &OpsetupConfig, json: bool) -> Result<()> {
    let command = wallet_command(config);
    let output = SystemRunner
        .capture(&command)
        .await
        .with_context(|| format!("Failed to run {command}"))?;
    let assignments = Assignments::extract(&output, &config.assignment_prefix);

    if json {
        let map: &BTreeMap<String, String> = &assignments;
        println!("{}", serde_json::to_string_pretty(map)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Key", "Value"]);
    for (key, value) in assignments.iter() {
        table.add_row(vec![key.clone(), redact(key, value)]);
    }
    println!("{table}");

    Ok(())
}

/// Hide private keys when printing to a terminal.
fn redact(key: &str, value: &str) -> String {
    const VISIBLE: usize = 6;

    if !key.contains("PRIVATE_KEY") || value.chars().count() <= VISIBLE {
        return value.to_string();
    }
    format!("{}…", value.chars().take(VISIBLE).collect::<String>())
}

fn print_report(report: &InjectReport) {
    let mut table = Table::new();
    table.set_header(vec!["Key", "Status"]);
    for key in &report.extracted {
        let status = if report.apply.missing.contains(key) {
            "not in file"
        } else {
            "replaced"
        };
        table.add_row(vec![key.as_str(), status]);
    }
    println!("{table}");
}
