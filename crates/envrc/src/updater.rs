//! Read-modify-write operations on an environment file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use url::Url;

use crate::{
    ApplyReport, Assignments, CommandRunner, CommandSpec, EnvFile, EnvFileError, KeyMatch,
    L1_RPC_KIND_KEY, L1_RPC_URL_KEY, RpcKind, envfile::is_multiline,
};

/// Result of injecting a command's exported variables into the file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InjectReport {
    /// Keys parsed from the command output, in sorted order.
    pub extracted: Vec<String>,
    pub apply: ApplyReport,
}

/// Applies replacement mappings to an environment file on disk.
///
/// Every operation reads the whole file, rewrites it in memory and writes it
/// back to the same path. Lines are never added or removed.
#[derive(Debug, Clone)]
pub struct EnvFileUpdater {
    path: PathBuf,
    key_match: KeyMatch,
    url_key: String,
    kind_key: String,
}

impl EnvFileUpdater {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            key_match: KeyMatch::default(),
            url_key: L1_RPC_URL_KEY.to_string(),
            kind_key: L1_RPC_KIND_KEY.to_string(),
        }
    }

    /// Set how keys are matched against lines.
    pub fn key_match(mut self, key_match: KeyMatch) -> Self {
        self.key_match = key_match;
        self
    }

    /// Override the keys receiving the L1 endpoint URL and kind.
    pub fn l1_keys(mut self, url_key: impl Into<String>, kind_key: impl Into<String>) -> Self {
        self.url_key = url_key.into();
        self.kind_key = kind_key.into();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rewrite the lines of the keys in `updates` with caller-supplied values.
    pub fn apply_literal(&self, updates: &Assignments) -> Result<ApplyReport, EnvFileError> {
        self.apply(updates)
    }

    /// Rewrite the lines of the keys parsed by [`Assignments::extract`].
    ///
    /// Keys carry whatever prefix the command printed (e.g. `export GS_...`),
    /// so they match the same `export` lines in the file.
    pub fn apply_from_assignments(
        &self,
        updates: &Assignments,
    ) -> Result<ApplyReport, EnvFileError> {
        self.apply(updates)
    }

    fn apply(&self, updates: &Assignments) -> Result<ApplyReport, EnvFileError> {
        if let Some((key, _)) = updates.iter().find(|(_, value)| is_multiline(value)) {
            return Err(EnvFileError::MultilineValue {
                path: self.path.clone(),
                key: key.clone(),
            });
        }

        let mut file = EnvFile::read(&self.path)?;
        let report = file.apply(updates, self.key_match);
        file.write(&self.path)?;

        for key in &report.missing {
            tracing::warn!(path = %self.path.display(), key, "Key not found in environment file");
        }

        tracing::debug!(
            path = %self.path.display(),
            replaced = report.replaced.len(),
            missing = report.missing.len(),
            "Environment file rewritten"
        );

        Ok(report)
    }

    /// Write the L1 RPC endpoint and its provider kind.
    ///
    /// The URL must parse as an absolute URL; it is written exactly as given.
    /// Neither the URL nor the kind may contain a line break.
    pub fn fill_l1_endpoint(&self, url: &str, kind: &RpcKind) -> Result<ApplyReport> {
        Url::parse(url).with_context(|| format!("Invalid L1 RPC URL: {url}"))?;

        if !kind.is_known() {
            tracing::warn!(kind = %kind, "L1 RPC kind is not one op-node recognizes");
        }

        let updates = Assignments::new()
            .set(self.url_key.as_str(), url)
            .set(self.kind_key.as_str(), kind.as_str());

        let report = self
            .apply_literal(&updates)
            .context("Failed to fill L1 endpoint")?;
        tracing::info!(path = %self.path.display(), kind = %kind, "Filled L1 endpoint");
        Ok(report)
    }

    /// Run `command`, then inject every `prefix`ed assignment it printed.
    pub async fn inject_from_command<R: CommandRunner>(
        &self,
        runner: &R,
        command: &CommandSpec,
        prefix: &str,
    ) -> Result<InjectReport> {
        let output = runner
            .capture(command)
            .await
            .with_context(|| format!("Failed to run {command}"))?;

        let assignments = Assignments::extract(&output, prefix);
        if assignments.is_empty() {
            tracing::warn!(command = %command, prefix, "Command printed no matching assignments");
        }

        let apply = self
            .apply_from_assignments(&assignments)
            .context("Failed to inject assignments")?;

        tracing::info!(
            path = %self.path.display(),
            extracted = assignments.len(),
            replaced = apply.replaced.len(),
            "Injected command assignments"
        );

        Ok(InjectReport {
            extracted: assignments.key_names().map(str::to_string).collect(),
            apply,
        })
    }

    /// Copy `template` to the file path if the file does not exist yet.
    ///
    /// Returns whether the template was copied.
    pub fn init_from_template(
        &self,
        template: &Path,
        overwrite: bool,
    ) -> Result<bool, EnvFileError> {
        let exists = self
            .path
            .try_exists()
            .map_err(|e| EnvFileError::io(&self.path, e))?;

        if exists && !overwrite {
            tracing::debug!(
                path = %self.path.display(),
                "Environment file already exists, keeping it"
            );
            return Ok(false);
        }

        std::fs::copy(template, &self.path).map_err(|source| EnvFileError::Copy {
            from: template.to_path_buf(),
            to: self.path.clone(),
            source,
        })?;
        tracing::info!(
            template = %template.display(),
            path = %self.path.display(),
            "Copied environment template"
        );
        Ok(true)
    }

    /// Read back the value currently assigned to `name`.
    pub fn lookup(&self, name: &str) -> Result<Option<String>, EnvFileError> {
        let file = EnvFile::read(&self.path)?;
        Ok(file.value_of(name).map(str::to_string))
    }
}
