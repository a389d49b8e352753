//! End-to-end tests for the run pipeline over constructed configurations.

use std::fs;
use std::path::Path;

use scriptact_core::{Error, HostPaths, Params, RunConfig};
use scriptact_engine::{Runner, ScriptCompiler, ScriptHost};

fn config_from(params: Params, action: &Path, workspace: &Path) -> RunConfig {
    let paths = HostPaths::new(action, workspace);
    RunConfig::from_params(&params, &paths).expect("configuration should validate")
}

fn inline(script: &str, extra: &[(&str, &str)], action: &Path, workspace: &Path) -> RunConfig {
    let mut pairs = vec![("script", script), ("token", "test-token")];
    pairs.extend_from_slice(extra);
    config_from(Params::from_pairs(pairs), action, workspace)
}

/// Test: the documented minimal scenario. Script body `return 1 + 1`,
/// string encodings, empty input -> output "2".
#[tokio::test]
async fn minimal_scenario_returns_two() {
    let action = tempfile::tempdir().unwrap();
    let workspace = tempfile::tempdir().unwrap();
    let config = inline("return 1 + 1", &[], action.path(), workspace.path());

    let report = Runner::new().execute(&config).await.expect("run failed");
    assert_eq!(report.result, "2");
    assert!(report.module_path.exists());
}

/// Test: the entrypoint sees the decoded input value.
#[tokio::test]
async fn string_input_passes_through() {
    let action = tempfile::tempdir().unwrap();
    let workspace = tempfile::tempdir().unwrap();
    let config = inline(
        "input + \"!\"",
        &[("input", "hi")],
        action.path(),
        workspace.path(),
    );

    let report = Runner::new().execute(&config).await.expect("run failed");
    assert_eq!(report.result, "hi!");
}

/// Test: JSON input decodes into a structured value before execution.
#[tokio::test]
async fn json_input_is_decoded_for_the_script() {
    let action = tempfile::tempdir().unwrap();
    let workspace = tempfile::tempdir().unwrap();
    let config = inline(
        "input.a + 1",
        &[("input_encoding", "json"), ("input", r#"{"a":1}"#)],
        action.path(),
        workspace.path(),
    );

    let report = Runner::new().execute(&config).await.expect("run failed");
    assert_eq!(report.result, "2");
}

/// Test: JSON result encoding structurally serializes the return value.
#[tokio::test]
async fn json_result_encoding_serializes_maps() {
    let action = tempfile::tempdir().unwrap();
    let workspace = tempfile::tempdir().unwrap();
    let config = inline(
        "#{a: 1}",
        &[("result_encoding", "json")],
        action.path(),
        workspace.path(),
    );

    let report = Runner::new().execute(&config).await.expect("run failed");
    assert_eq!(report.result, r#"{"a":1}"#);
}

/// Test: scripts can use the shell namespace and the context bindings.
#[tokio::test]
async fn script_reaches_shell_and_context() {
    let action = tempfile::tempdir().unwrap();
    let workspace = tempfile::tempdir().unwrap();
    let script = r#"
        log.info("starting");
        let parsed = parse_json("{\"n\": 20}");
        let doubled = parsed.n * 2;
        run.workspace != "" && doubled == 40
    "#;
    let config = inline(script, &[], action.path(), workspace.path());

    let report = Runner::new().execute(&config).await.expect("run failed");
    assert_eq!(report.result, "true");
}

/// Test: a throwing entrypoint fails the run with the thrown message.
#[tokio::test]
async fn thrown_error_fails_the_run_with_its_message() {
    let action = tempfile::tempdir().unwrap();
    let workspace = tempfile::tempdir().unwrap();
    let config = inline(
        r#"throw "user script exploded""#,
        &[],
        action.path(),
        workspace.path(),
    );

    let err = Runner::new().execute(&config).await.unwrap_err();
    assert!(matches!(err, Error::Runtime(_)), "got: {err}");
    assert!(err.to_string().contains("user script exploded"));
}

/// Test: broken escaping is rejected at the sanity check and the build
/// step never runs (no artifact is written).
#[tokio::test]
async fn escaping_corruption_is_rejected_before_build() {
    let action = tempfile::tempdir().unwrap();
    let workspace = tempfile::tempdir().unwrap();
    let config = inline(
        r#"let s = "unterminated"#,
        &[],
        action.path(),
        workspace.path(),
    );

    let err = Runner::new().execute(&config).await.unwrap_err();
    assert!(matches!(err, Error::Parse(_)), "got: {err}");
    assert!(err.to_string().contains("escaping"));
    assert_eq!(fs::read_dir(action.path()).unwrap().count(), 0);
}

/// Test: parse-clean source with an unresolved reference fails the build
/// stage, not the sanity check.
#[tokio::test]
async fn unresolved_reference_is_a_build_failure() {
    let action = tempfile::tempdir().unwrap();
    let workspace = tempfile::tempdir().unwrap();
    let config = inline("not_a_binding + 1", &[], action.path(), workspace.path());

    let err = Runner::new().execute(&config).await.unwrap_err();
    assert!(matches!(err, Error::Build(_)), "got: {err}");
}

/// Test: repeated runs accumulate artifacts in the shared base directory;
/// nothing cleans them up.
#[tokio::test]
async fn artifacts_accumulate_across_runs() {
    let action = tempfile::tempdir().unwrap();
    let workspace = tempfile::tempdir().unwrap();
    let runner = Runner::new();

    for _ in 0..2 {
        let config = inline("return 1 + 1", &[], action.path(), workspace.path());
        runner.execute(&config).await.expect("run failed");
    }

    let artifacts = fs::read_dir(action.path()).unwrap().count();
    assert_eq!(artifacts, 2);
}

/// Test: compiling byte-identical text twice yields two distinct
/// artifact identifiers and output paths.
#[tokio::test]
async fn identical_text_never_deduplicates() {
    let action = tempfile::tempdir().unwrap();
    let host = ScriptHost::new();
    let compiler = ScriptCompiler::new("return 1 + 1", action.path());

    let first = compiler.compile(&host).await.unwrap();
    let second = compiler.compile(&host).await.unwrap();
    assert_ne!(first.id, second.id);
    assert_ne!(first.output_path, second.output_path);
}

/// Test: a file reference resolves against the workspace root and runs
/// with the same entrypoint contract.
#[tokio::test]
async fn file_module_runs_with_same_contract() {
    let action = tempfile::tempdir().unwrap();
    let workspace = tempfile::tempdir().unwrap();
    fs::write(
        workspace.path().join("job.rhai"),
        "fn main(ctx, input) { input + \"!\" }",
    )
    .unwrap();

    let params = Params::from_pairs([
        ("file", "job.rhai"),
        ("token", "test-token"),
        ("input", "x"),
    ]);
    let config = config_from(params, action.path(), workspace.path());

    let report = Runner::new().execute(&config).await.expect("run failed");
    assert_eq!(report.result, "x!");
    assert_eq!(report.module_path, workspace.path().join("job.rhai"));
}

/// Test: a missing file reference fails as a load error, and no artifact
/// is ever produced on the file path.
#[tokio::test]
async fn missing_file_reference_is_a_load_failure() {
    let action = tempfile::tempdir().unwrap();
    let workspace = tempfile::tempdir().unwrap();
    let params = Params::from_pairs([("file", "absent.rhai"), ("token", "test-token")]);
    let config = config_from(params, action.path(), workspace.path());

    let err = Runner::new().execute(&config).await.unwrap_err();
    assert!(matches!(err, Error::Load(_)), "got: {err}");
    assert_eq!(fs::read_dir(action.path()).unwrap().count(), 0);
}
