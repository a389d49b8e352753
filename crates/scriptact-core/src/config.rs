//! Run configuration: validation and decoding of the job's named
//! parameters into one immutable value.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::params::{HostPaths, Params};

/// Declared representation of the input value and the produced result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    String,
    Json,
}

impl Encoding {
    fn parse(name: &str, raw: Option<&str>) -> Result<Self> {
        // Unset falls back to the host manifest's default.
        match raw {
            None | Some("string") => Ok(Encoding::String),
            Some("json") => Ok(Encoding::Json),
            Some(other) => Err(Error::Configuration(format!(
                r#"{name} must either be "string" or "json", got "{other}""#
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Encoding::String => "string",
            Encoding::Json => "json",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exactly one source of entrypoint code per run.
///
/// Constructed only by the validator, so the contradictory "both set" and
/// "neither set" configurations cannot be represented downstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptSource {
    /// Inline script text, compiled into a disposable artifact.
    Inline(String),
    /// Reference to an existing module, resolved against the workspace root.
    File(PathBuf),
}

/// The decoded input value handed to the entrypoint.
#[derive(Debug, Clone, PartialEq)]
pub enum InputValue {
    Text(String),
    Json(serde_json::Value),
}

/// Immutable, validated configuration for a single run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub source: ScriptSource,
    pub token: String,
    pub debug: bool,
    pub result_encoding: Encoding,
    pub input_encoding: Encoding,
    pub input: InputValue,
    pub action_path: PathBuf,
    pub workspace_path: PathBuf,
}

impl RunConfig {
    /// Validate and decode the raw parameter snapshot.
    ///
    /// Emits a diagnostic snapshot of every received namespaced parameter
    /// (token masked) before validating; the snapshot never affects the
    /// outcome.
    pub fn from_params(params: &Params, paths: &HostPaths) -> Result<Self> {
        debug!(params = ?params.redacted(&["token"]), "received parameters");

        let source = match (params.get("script"), params.get("file")) {
            (Some(script), None) => ScriptSource::Inline(script.to_string()),
            (None, Some(file)) => ScriptSource::File(PathBuf::from(file)),
            (Some(_), Some(_)) => {
                return Err(Error::Configuration(
                    "both script and file inputs are set, exactly one must be set".to_string(),
                ))
            }
            (None, None) => {
                return Err(Error::Configuration(
                    "missing both script and file inputs, exactly one must be set".to_string(),
                ))
            }
        };

        let token = params
            .get("token")
            .ok_or_else(|| Error::Configuration("missing required token input".to_string()))?
            .to_string();
        let debug = parse_bool("debug", params.get("debug"))?;

        let result_encoding = Encoding::parse("result_encoding", params.get("result_encoding"))?;
        let input_encoding = Encoding::parse("input_encoding", params.get("input_encoding"))?;

        let raw_input = params.get("input").unwrap_or("");
        let input = match input_encoding {
            Encoding::String => InputValue::Text(raw_input.to_string()),
            Encoding::Json => InputValue::Json(serde_json::from_str(raw_input).map_err(|e| {
                Error::Configuration(format!("input is not valid JSON: {e}"))
            })?),
        };

        Ok(Self {
            source,
            token,
            debug,
            result_encoding,
            input_encoding,
            input,
            action_path: paths.action_path.clone(),
            workspace_path: paths.workspace_path.clone(),
        })
    }

    /// Parameter echo safe to hand to executing scripts: never includes
    /// the script text, the file reference, or the token.
    pub fn sanitized(&self) -> serde_json::Value {
        serde_json::json!({
            "debug": self.debug,
            "result_encoding": self.result_encoding,
            "input_encoding": self.input_encoding,
        })
    }
}

fn parse_bool(name: &str, raw: Option<&str>) -> Result<bool> {
    match raw {
        None => Ok(false),
        Some("true" | "True" | "TRUE") => Ok(true),
        Some("false" | "False" | "FALSE") => Ok(false),
        Some(other) => Err(Error::Configuration(format!(
            r#"{name} input is not a boolean: "{other}""#
        ))),
    }
}
