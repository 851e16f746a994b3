//! In-memory model of a line-oriented `KEY=VALUE` file such as `.envrc`.

use std::{borrow::Cow, fmt, path::Path};

use serde::{Deserialize, Serialize};

use crate::{Assignments, EnvFileError};

/// How a replacement key is matched against a line of the file.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum KeyMatch {
    /// The line must start with `KEY=`.
    #[default]
    Assignment,
    /// The line must start with `KEY`. `L1_RPC` then also matches
    /// `L1_RPC_KIND=...`. When several keys match, the longest one wins.
    Prefix,
}

impl KeyMatch {
    fn matches(self, line: &str, key: &str) -> bool {
        if key.is_empty() {
            return false;
        }

        match self {
            Self::Assignment => line
                .strip_prefix(key)
                .is_some_and(|rest| rest.starts_with('=')),
            Self::Prefix => line.starts_with(key),
        }
    }
}

/// A single line of an environment file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvLine {
    /// `KEY=VALUE`, split on the first `=`. Neither side is trimmed so the
    /// line renders back byte for byte.
    Assignment { key: String, value: String },
    /// Comments, blank lines and anything without an `=`.
    Passthrough(String),
}

impl EnvLine {
    pub fn parse(line: &str) -> Self {
        if line.trim_start().starts_with('#') {
            return Self::Passthrough(line.to_string());
        }

        match line.split_once('=') {
            Some((key, value)) => Self::Assignment {
                key: key.to_string(),
                value: value.to_string(),
            },
            None => Self::Passthrough(line.to_string()),
        }
    }

    /// The line as it appears in the file, without the line terminator.
    pub fn text(&self) -> Cow<'_, str> {
        match self {
            Self::Assignment { key, value } => Cow::Owned(format!("{key}={value}")),
            Self::Passthrough(line) => Cow::Borrowed(line),
        }
    }
}

impl fmt::Display for EnvLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

/// Outcome of applying a replacement mapping to a file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// `(line index, key)` for every rewritten line, in file order.
    pub replaced: Vec<(usize, String)>,
    /// Keys of the mapping that matched no line.
    pub missing: Vec<String>,
}

impl ApplyReport {
    pub fn is_noop(&self) -> bool {
        self.replaced.is_empty()
    }
}

/// An environment file held as an ordered sequence of lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvFile {
    lines: Vec<EnvLine>,
}

impl EnvFile {
    /// Split `text` into lines. Both `\n` and `\r\n` terminate a line and a
    /// trailing terminator does not produce an extra empty line.
    pub fn parse(text: &str) -> Self {
        Self {
            lines: text.lines().map(EnvLine::parse).collect(),
        }
    }

    /// Read the whole file into memory.
    pub fn read(path: &Path) -> Result<Self, EnvFileError> {
        let bytes = std::fs::read(path).map_err(|e| EnvFileError::io(path, e))?;
        let text = String::from_utf8(bytes).map_err(|source| EnvFileError::Scan {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self::parse(&text))
    }

    /// Render every line followed by exactly one `\n`.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(&line.text());
            out.push('\n');
        }
        out
    }

    /// Overwrite `path` with the rendered content.
    ///
    /// This truncates and rewrites in place: a crash halfway through leaves a
    /// truncated file behind.
    pub fn write(&self, path: &Path) -> Result<(), EnvFileError> {
        std::fs::write(path, self.render()).map_err(|e| EnvFileError::io(path, e))
    }

    pub fn lines(&self) -> &[EnvLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Rewrite every line matched by a key of `updates` to `KEY=VALUE`.
    ///
    /// Unmatched lines are left untouched and keys that match nothing are
    /// reported as missing. An empty key never matches, and neither does a key
    /// whose value contains a line break. No line is ever added or removed.
    pub fn apply(&mut self, updates: &Assignments, key_match: KeyMatch) -> ApplyReport {
        let mut report = ApplyReport::default();

        for (index, line) in self.lines.iter_mut().enumerate() {
            let matched = {
                let text = line.text();
                updates
                    .iter()
                    .filter(|(_, value)| !is_multiline(value))
                    .filter(|(key, _)| key_match.matches(&text, key))
                    .max_by_key(|(key, _)| key.len())
            };

            let Some((key, value)) = matched else {
                continue;
            };

            tracing::trace!(line = index + 1, key = %key, "Replacing line");
            report.replaced.push((index, key.clone()));
            *line = EnvLine::Assignment {
                key: key.clone(),
                value: value.clone(),
            };
        }

        report.missing = updates
            .key_names()
            .filter(|key| !report.replaced.iter().any(|(_, k)| k == key))
            .map(str::to_string)
            .collect();

        report
    }

    /// Look up the value of `name`, accepting both `NAME=...` and
    /// `export NAME=...`. The last assignment wins, as it would in a shell.
    pub fn value_of(&self, name: &str) -> Option<&str> {
        self.lines
            .iter()
            .rev()
            .find_map(|line| match line {
                EnvLine::Assignment { key, value } => {
                    let key = key.trim();
                    let key = key.strip_prefix("export ").map(str::trim_start).unwrap_or(key);
                    (key == name).then_some(value.trim())
                }
                EnvLine::Passthrough(_) => None,
            })
    }
}

pub(crate) fn is_multiline(value: &str) -> bool {
    value.contains(['\n', '\r'])
}
