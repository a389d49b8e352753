//! Host parameter and output contract.
//!
//! The orchestrating job hands configuration to the runner through the
//! `INPUT_*` environment namespace and two required path roots, and
//! receives the run's single named output through the file named by
//! `ACTION_OUTPUT`.

use std::collections::BTreeMap;
use std::env;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use tracing::warn;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Prefix of the job's named-parameter namespace.
pub const INPUT_PREFIX: &str = "INPUT_";

/// Environment variable naming the installation root.
pub const ACTION_PATH_VAR: &str = "ACTION_PATH";

/// Environment variable naming the job working directory.
pub const ACTION_WORKSPACE_VAR: &str = "ACTION_WORKSPACE";

/// Environment variable naming the output sink file.
pub const ACTION_OUTPUT_VAR: &str = "ACTION_OUTPUT";

/// Read-once snapshot of the job's named parameters.
///
/// Parameter names are case-insensitive and dash/underscore-insensitive:
/// `result-encoding` and `result_encoding` both map to
/// `INPUT_RESULT_ENCODING`. Empty values are treated as unset, matching
/// the host convention of exporting every declared parameter.
#[derive(Debug, Clone, Default)]
pub struct Params {
    values: BTreeMap<String, String>,
}

impl Params {
    /// Snapshot the `INPUT_*` namespace from the process environment.
    pub fn from_env() -> Self {
        let values = env::vars()
            .filter(|(key, _)| key.starts_with(INPUT_PREFIX))
            .collect();
        Self { values }
    }

    /// Build a snapshot from unprefixed parameter names.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let values = pairs
            .into_iter()
            .map(|(key, value)| (env_key(key.as_ref()), value.into()))
            .collect();
        Self { values }
    }

    /// Look up a named parameter; empty values count as unset.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .get(&env_key(name))
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// Whether any parameters were received at all.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Diagnostic view of every received parameter, with the values of
    /// the `mask`ed parameters hidden. Read-only: consumers must not let
    /// this affect validation.
    pub fn redacted(&self, mask: &[&str]) -> BTreeMap<String, String> {
        let masked: Vec<String> = mask.iter().map(|name| env_key(name)).collect();
        self.values
            .iter()
            .map(|(key, value)| {
                let shown = if masked.contains(key) {
                    "***".to_string()
                } else {
                    value.clone()
                };
                (key.clone(), shown)
            })
            .collect()
    }
}

fn env_key(name: &str) -> String {
    format!("{INPUT_PREFIX}{}", name.to_ascii_uppercase().replace('-', "_"))
}

/// Required path roots provided by the host process environment.
#[derive(Debug, Clone)]
pub struct HostPaths {
    /// Installation root of the runner itself; compiled artifacts land here.
    pub action_path: PathBuf,
    /// Working directory of the job; file references resolve against it.
    pub workspace_path: PathBuf,
}

impl HostPaths {
    /// Read both roots from the environment. Absence of either is fatal
    /// and reported before any compilation is attempted.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            action_path: require_env(ACTION_PATH_VAR)?,
            workspace_path: require_env(ACTION_WORKSPACE_VAR)?,
        })
    }

    pub fn new(action_path: impl Into<PathBuf>, workspace_path: impl Into<PathBuf>) -> Self {
        Self {
            action_path: action_path.into(),
            workspace_path: workspace_path.into(),
        }
    }
}

fn require_env(name: &str) -> Result<PathBuf> {
    match env::var(name) {
        Ok(value) if !value.is_empty() => Ok(PathBuf::from(value)),
        _ => Err(Error::Configuration(format!(
            "missing {name} environment variable"
        ))),
    }
}

/// Sink for the run's single named output.
///
/// Records append to the file named by `ACTION_OUTPUT` in `name=value`
/// form; multiline values use a heredoc delimiter so embedded newlines
/// survive. Without a configured file the record goes to stdout (with a
/// warning) so the contract stays observable outside a full host harness.
#[derive(Debug, Clone, Default)]
pub struct Outputs {
    path: Option<PathBuf>,
}

impl Outputs {
    pub fn from_env() -> Self {
        let path = env::var(ACTION_OUTPUT_VAR)
            .ok()
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);
        Self { path }
    }

    pub fn to_file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Append one named output record.
    pub fn emit(&self, name: &str, value: &str) -> Result<()> {
        let Some(path) = &self.path else {
            warn!("no output file configured; writing output to stdout");
            println!("{name}={value}");
            return Ok(());
        };

        let record = if value.contains('\n') {
            let delimiter = format!("out_{}", Uuid::new_v4().simple());
            format!("{name}<<{delimiter}\n{value}\n{delimiter}\n")
        } else {
            format!("{name}={value}\n")
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| Error::Output {
                name: name.to_string(),
                message: format!("cannot open '{}': {e}", path.display()),
            })?;
        file.write_all(record.as_bytes()).map_err(|e| Error::Output {
            name: name.to_string(),
            message: format!("cannot append to '{}': {e}", path.display()),
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_normalizes_names() {
        let params = Params::from_pairs([("result-encoding", "json")]);
        assert_eq!(params.get("result_encoding"), Some("json"));
        assert_eq!(params.get("RESULT-ENCODING"), Some("json"));
        assert_eq!(params.get("input"), None);
    }

    #[test]
    fn empty_value_counts_as_unset() {
        let params = Params::from_pairs([("script", "")]);
        assert_eq!(params.get("script"), None);
    }

    #[test]
    fn redacted_masks_named_parameters() {
        let params = Params::from_pairs([("token", "s3cret"), ("debug", "true")]);
        let view = params.redacted(&["token"]);
        assert_eq!(view.get("INPUT_TOKEN").map(String::as_str), Some("***"));
        assert_eq!(view.get("INPUT_DEBUG").map(String::as_str), Some("true"));
    }

    #[test]
    fn host_paths_missing_env_is_configuration_error() {
        env::remove_var("ACTION_PATH");
        env::remove_var("ACTION_WORKSPACE");
        let err = HostPaths::from_env().unwrap_err();
        assert!(err.to_string().contains("ACTION_PATH"));
    }

    #[test]
    fn outputs_single_line_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out");
        let outputs = Outputs::to_file(&path);
        outputs.emit("result", "2").unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "result=2\n");
    }

    #[test]
    fn outputs_multiline_uses_heredoc() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out");
        let outputs = Outputs::to_file(&path);
        outputs.emit("result", "a\nb").unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("result<<out_"));
        assert!(written.contains("\na\nb\n"));
    }

    #[test]
    fn outputs_append_across_emits() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out");
        let outputs = Outputs::to_file(&path);
        outputs.emit("result", "1").unwrap();
        outputs.emit("result", "2").unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "result=1\nresult=2\n");
    }
}
