//! The run pipeline: one validated configuration in, one encoded result
//! out.

use std::path::PathBuf;
use std::time::Instant;

use rhai::Dynamic;
use tracing::info;
use uuid::Uuid;

use scriptact_core::{Error, InputValue, Result, RunConfig, RunState, RunTracker, ScriptSource};

use crate::compiler::{EntrypointSource, ScriptCompiler};
use crate::context;
use crate::encode::encode_result;
use crate::host::ScriptHost;
use crate::loader::ModuleLoader;

/// Outcome of a completed run.
#[derive(Debug)]
pub struct RunReport {
    pub run_id: Uuid,
    /// Path of the compiled artifact or the loaded module file.
    pub module_path: PathBuf,
    /// The encoded result value.
    pub result: String,
    pub duration_ms: u64,
}

/// Drives a single run through compile/load, execution, and encoding.
///
/// One run per process invocation, no internal parallelism, and no retry
/// anywhere: every failure is terminal and aborts the remaining stages.
pub struct Runner {
    host: ScriptHost,
}

impl Runner {
    pub fn new() -> Self {
        Self {
            host: ScriptHost::new(),
        }
    }

    /// Execute the pipeline for an already validated configuration.
    pub async fn execute(&self, config: &RunConfig) -> Result<RunReport> {
        let start = Instant::now();
        let run_id = Uuid::now_v7();
        let mut run = RunTracker::new();
        // Validation happened while the configuration was constructed.
        run.advance(RunState::Validating)?;

        match self.run_stages(&mut run, config, run_id).await {
            Ok((module_path, result)) => {
                run.advance(RunState::Done)?;
                let duration_ms = start.elapsed().as_millis() as u64;
                info!(run_id = %run_id, duration_ms, "run completed");
                Ok(RunReport {
                    run_id,
                    module_path,
                    result,
                    duration_ms,
                })
            }
            Err(err) => {
                run.fail();
                info!(run_id = %run_id, "run failed");
                Err(err)
            }
        }
    }

    async fn run_stages(
        &self,
        run: &mut RunTracker,
        config: &RunConfig,
        run_id: Uuid,
    ) -> Result<(PathBuf, String)> {
        let source: Box<dyn EntrypointSource> = match &config.source {
            ScriptSource::Inline(text) => {
                run.advance(RunState::Compiling)?;
                info!(run_id = %run_id, "compiling inline script");
                Box::new(ScriptCompiler::new(text.clone(), config.action_path.clone()))
            }
            ScriptSource::File(path) => {
                run.advance(RunState::LoadingFile)?;
                info!(run_id = %run_id, module = %path.display(), "loading referenced module");
                Box::new(ModuleLoader::new(path.clone(), config.workspace_path.clone()))
            }
        };
        let loaded = source.load(&self.host).await?;

        run.advance(RunState::Executing)?;
        info!(run_id = %run_id, module = %loaded.path.display(), "invoking entrypoint");
        let ctx = context::build_context(config, run_id);
        let input = decode_input(&config.input)?;
        let value = self.host.invoke(&loaded.entrypoint, ctx, input).await?;

        run.advance(RunState::Encoding)?;
        let result = encode_result(&value, config.result_encoding)?;
        Ok((loaded.path, result))
    }
}

impl Default for Runner {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert the validated input value into its engine representation.
fn decode_input(input: &InputValue) -> Result<Dynamic> {
    match input {
        InputValue::Text(text) => Ok(text.clone().into()),
        InputValue::Json(value) => rhai::serde::to_dynamic(value)
            .map_err(|e| Error::Configuration(format!("input value not representable: {e}"))),
    }
}
