//! End-to-end tests for preparing an `.envrc`.
//!
//! The wallet script is a small shell script written to a temporary
//! directory and run through `sh`, so these tests only run on unix.
//! Run with: cargo test --test envrc_test

#![cfg(unix)]

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use opsetup_envrc::{
    Assignments, CommandSpec, DEFAULT_ASSIGNMENT_PREFIX, EnvFile, EnvFileUpdater, KeyMatch,
    RpcKind, SystemRunner,
};
use tempdir::TempDir;

const ENVRC_EXAMPLE: &str = "\
##################################################
#                 Getting Started                #
##################################################

# Admin account
export GS_ADMIN_ADDRESS=
export GS_ADMIN_PRIVATE_KEY=

# Batcher account
export GS_BATCHER_ADDRESS=
export GS_BATCHER_PRIVATE_KEY=

# Proposer account
export GS_PROPOSER_ADDRESS=
export GS_PROPOSER_PRIVATE_KEY=

# Sequencer account
export GS_SEQUENCER_ADDRESS=
export GS_SEQUENCER_PRIVATE_KEY=

##################################################
#              Chain configuration               #
##################################################

L1_RPC_URL=
L1_RPC_KIND=
export L2_CHAIN_ID=42069
";

const WALLETS_SH: &str = "#!/bin/sh
echo \"# Copy the following into your .envrc file:\"
echo
echo \"# Admin address\"
echo \"export GS_ADMIN_ADDRESS=0x1111111111111111111111111111111111111111\"
echo \"export GS_ADMIN_PRIVATE_KEY=0xaaaa\"
echo
echo \"export GS_BATCHER_ADDRESS=0x2222222222222222222222222222222222222222\"
echo \"export GS_BATCHER_PRIVATE_KEY=0xbbbb\"
echo \"export GS_PROPOSER_ADDRESS=0x3333333333333333333333333333333333333333\"
echo \"export GS_PROPOSER_PRIVATE_KEY=0xcccc\"
echo \"export GS_SEQUENCER_ADDRESS=0x4444444444444444444444444444444444444444\"
echo \"export GS_SEQUENCER_PRIVATE_KEY=0xdddd\"
";

/// Scratch optimism checkout with a template and the wallet script.
struct TestContext {
    _dir: TempDir,
    root: PathBuf,
}

impl TestContext {
    fn new() -> Result<Self> {
        let dir = TempDir::new("opsetup-envrc").context("Failed to create temp dir")?;
        let root = dir.path().to_path_buf();

        std::fs::write(root.join(".envrc.example"), ENVRC_EXAMPLE)?;
        std::fs::write(root.join("wallets.sh"), WALLETS_SH)?;

        Ok(Self { _dir: dir, root })
    }

    fn envrc(&self) -> PathBuf {
        self.root.join(".envrc")
    }

    fn template(&self) -> PathBuf {
        self.root.join(".envrc.example")
    }

    fn wallets(&self) -> CommandSpec {
        // Exec of a just-written file can fail with ETXTBSY; go through `sh`.
        CommandSpec::new("sh")
            .arg("wallets.sh")
            .current_dir(&self.root)
    }
}

fn read(path: &Path) -> String {
    std::fs::read_to_string(path).expect("Failed to read file")
}

#[tokio::test]
async fn test_full_envrc_preparation() -> Result<()> {
    let ctx = TestContext::new()?;
    let updater = EnvFileUpdater::new(ctx.envrc());

    assert!(updater.init_from_template(&ctx.template(), false)?);

    updater.fill_l1_endpoint(
        "https://eth-sepolia.g.alchemy.com/v2/demo",
        &RpcKind::Alchemy,
    )?;

    let report = updater
        .inject_from_command(&SystemRunner, &ctx.wallets(), DEFAULT_ASSIGNMENT_PREFIX)
        .await?;

    assert_eq!(report.extracted.len(), 8);
    assert_eq!(report.apply.replaced.len(), 8);
    assert!(report.apply.missing.is_empty());

    let content = read(&ctx.envrc());
    let before: Vec<&str> = ENVRC_EXAMPLE.lines().collect();
    let after: Vec<&str> = content.lines().collect();
    assert_eq!(before.len(), after.len());
    assert!(content.ends_with("export L2_CHAIN_ID=42069\n"));

    for (old, new) in before.iter().zip(&after) {
        if old.starts_with("export GS_") || old.starts_with("L1_RPC_") {
            assert_ne!(old, new);
        } else {
            assert_eq!(old, new);
        }
    }

    let file = EnvFile::read(&ctx.envrc())?;
    assert_eq!(
        file.value_of("L1_RPC_URL"),
        Some("https://eth-sepolia.g.alchemy.com/v2/demo")
    );
    assert_eq!(file.value_of("L1_RPC_KIND"), Some("alchemy"));
    assert_eq!(file.value_of("GS_SEQUENCER_PRIVATE_KEY"), Some("0xdddd"));
    assert_eq!(file.value_of("L2_CHAIN_ID"), Some("42069"));

    Ok(())
}

#[tokio::test]
async fn test_rerun_is_stable() -> Result<()> {
    let ctx = TestContext::new()?;
    let updater = EnvFileUpdater::new(ctx.envrc());
    updater.init_from_template(&ctx.template(), false)?;

    updater.fill_l1_endpoint("http://localhost:8545", &RpcKind::Basic)?;
    updater
        .inject_from_command(&SystemRunner, &ctx.wallets(), DEFAULT_ASSIGNMENT_PREFIX)
        .await?;
    let first = read(&ctx.envrc());

    assert!(!updater.init_from_template(&ctx.template(), false)?);
    updater.fill_l1_endpoint("http://localhost:8545", &RpcKind::Basic)?;
    updater
        .inject_from_command(&SystemRunner, &ctx.wallets(), DEFAULT_ASSIGNMENT_PREFIX)
        .await?;

    assert_eq!(first, read(&ctx.envrc()));
    Ok(())
}

#[test]
fn test_prefix_mode_collides_on_shared_key_prefix() -> Result<()> {
    let ctx = TestContext::new()?;
    std::fs::write(ctx.envrc(), "L1_RPC_URL=a\nL1_RPC_KIND=b\n")?;
    let updates = Assignments::new().set("L1_RPC", "x");

    EnvFileUpdater::new(ctx.envrc()).apply_literal(&updates)?;
    assert_eq!(read(&ctx.envrc()), "L1_RPC_URL=a\nL1_RPC_KIND=b\n");

    EnvFileUpdater::new(ctx.envrc())
        .key_match(KeyMatch::Prefix)
        .apply_literal(&updates)?;
    assert_eq!(read(&ctx.envrc()), "L1_RPC=x\nL1_RPC=x\n");

    Ok(())
}

#[tokio::test]
async fn test_failing_script_aborts_before_write() -> Result<()> {
    let ctx = TestContext::new()?;
    let updater = EnvFileUpdater::new(ctx.envrc());
    updater.init_from_template(&ctx.template(), false)?;

    let failing = CommandSpec::new("sh").args(["-c", "echo 'export GS_ADMIN_ADDRESS=0x1'; exit 3"]);
    let result = updater
        .inject_from_command(&SystemRunner, &failing, DEFAULT_ASSIGNMENT_PREFIX)
        .await;

    assert!(result.is_err());
    assert_eq!(read(&ctx.envrc()), ENVRC_EXAMPLE);
    Ok(())
}
