//! Shell/utility namespace registered on the host engine.
//!
//! Global functions, one host-owned instance shared by every loaded
//! module: process execution, filesystem access, structured-data parsing,
//! and environment-file parsing. Loaded modules resolve these against the
//! engine; they are never embedded per script.

use std::io::Cursor;
use std::process::Command;

use rhai::{Array, Dynamic, Engine, EvalAltResult, Map};
use tracing::debug;

pub(crate) fn register(engine: &mut Engine) {
    engine.register_fn("exec", |cmd: &str| run_command(cmd, &[]));
    engine.register_fn("exec", |cmd: &str, args: Array| {
        let args: Vec<String> = args.into_iter().map(|a| a.to_string()).collect();
        run_command(cmd, &args)
    });

    engine.register_fn(
        "read_file",
        |path: &str| -> Result<String, Box<EvalAltResult>> {
            std::fs::read_to_string(path)
                .map_err(|e| format!("failed to read '{path}': {e}").into())
        },
    );
    engine.register_fn(
        "write_file",
        |path: &str, text: &str| -> Result<(), Box<EvalAltResult>> {
            std::fs::write(path, text)
                .map_err(|e| format!("failed to write '{path}': {e}").into())
        },
    );

    engine.register_fn(
        "parse_json",
        |text: &str| -> Result<Dynamic, Box<EvalAltResult>> {
            let value: serde_json::Value = serde_json::from_str(text)
                .map_err(|e| -> Box<EvalAltResult> { format!("invalid JSON: {e}").into() })?;
            rhai::serde::to_dynamic(value)
        },
    );
    engine.register_fn(
        "to_json",
        |value: Dynamic| -> Result<String, Box<EvalAltResult>> {
            serde_json::to_string(&value)
                .map_err(|e| format!("value is not JSON-serializable: {e}").into())
        },
    );

    engine.register_fn(
        "parse_env",
        |text: &str| -> Result<Map, Box<EvalAltResult>> {
            let mut map = Map::new();
            for item in dotenvy::from_read_iter(Cursor::new(text.to_owned())) {
                let (key, value) = item.map_err(|e| -> Box<EvalAltResult> {
                    format!("invalid env file: {e}").into()
                })?;
                map.insert(key.into(), value.into());
            }
            Ok(map)
        },
    );

    engine.register_fn("env_var", |name: &str| {
        std::env::var(name).unwrap_or_default()
    });
}

/// Run a process and capture its outcome. No shell interpretation: the
/// command is the executable name, arguments are passed as-is.
fn run_command(cmd: &str, args: &[String]) -> Result<Map, Box<EvalAltResult>> {
    debug!(target: "script", command = %cmd, "exec");
    let output = Command::new(cmd)
        .args(args)
        .output()
        .map_err(|e| -> Box<EvalAltResult> { format!("failed to spawn '{cmd}': {e}").into() })?;

    let mut map = Map::new();
    map.insert(
        "exit_code".into(),
        Dynamic::from(i64::from(output.status.code().unwrap_or(-1))),
    );
    map.insert(
        "stdout".into(),
        String::from_utf8_lossy(&output.stdout).to_string().into(),
    );
    map.insert(
        "stderr".into(),
        String::from_utf8_lossy(&output.stderr).to_string().into(),
    );
    map.insert("success".into(), Dynamic::from(output.status.success()));
    Ok(map)
}
