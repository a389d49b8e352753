//! Execution context composition: the collaborator bindings handed to
//! the entrypoint.

use std::path::Path;
use std::process::Command;

use chrono::Utc;
use rhai::{Dynamic, Engine, Map};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use scriptact_core::RunConfig;

use crate::vcs::VcsClient;

/// Diagnostics facade scripts reach as `ctx.log`.
///
/// Forwards to the process tracing subscriber under the `script` target
/// so user diagnostics stay distinguishable from the runner's own.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics;

pub(crate) fn register(engine: &mut Engine) {
    engine.register_type_with_name::<Diagnostics>("Diagnostics");
    engine.register_fn("debug", |_: &mut Diagnostics, msg: &str| {
        debug!(target: "script", "{msg}");
    });
    engine.register_fn("info", |_: &mut Diagnostics, msg: &str| {
        info!(target: "script", "{msg}");
    });
    engine.register_fn("warn", |_: &mut Diagnostics, msg: &str| {
        warn!(target: "script", "{msg}");
    });
    engine.register_fn("error", |_: &mut Diagnostics, msg: &str| {
        error!(target: "script", "{msg}");
    });
}

/// Build the context object for one invocation.
///
/// Pure composition beyond client construction: the VCS client comes from
/// the validated token, run metadata is captured once, and nothing else
/// performs I/O. The context is built once and used by exactly one
/// invocation.
pub fn build_context(config: &RunConfig, run_id: Uuid) -> Map {
    let vcs = VcsClient::new(config.token.clone(), config.debug);

    let mut run = Map::new();
    run.insert("id".into(), run_id.to_string().into());
    run.insert(
        "workspace".into(),
        config.workspace_path.display().to_string().into(),
    );
    run.insert(
        "action_path".into(),
        config.action_path.display().to_string().into(),
    );
    run.insert("started_at".into(), Utc::now().to_rfc3339().into());
    match capture_head_sha(&config.workspace_path) {
        Some(sha) => run.insert("git_sha".into(), sha.into()),
        None => run.insert("git_sha".into(), Dynamic::UNIT),
    };
    // Sanitized parameter echo: never the script text, the file
    // reference, or the token.
    if let Ok(params) = rhai::serde::to_dynamic(config.sanitized()) {
        run.insert("params".into(), params);
    }

    let mut ctx = Map::new();
    ctx.insert("vcs".into(), Dynamic::from(vcs));
    ctx.insert("run".into(), Dynamic::from(run));
    ctx.insert("log".into(), Dynamic::from(Diagnostics));
    ctx
}

/// Capture the workspace HEAD commit when the workspace is a git repo.
fn capture_head_sha(dir: &Path) -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "HEAD"])
        .current_dir(dir)
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let sha = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!sha.is_empty()).then_some(sha)
}
