//! Inline script compilation: template, sanity check, build, load.

use std::path::PathBuf;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tracing::{debug, info};
use uuid::Uuid;

use scriptact_core::{Error, Result};

use crate::host::{Entrypoint, ScriptHost};
use crate::template;

const ARTIFACT_EXT: &str = "rhai";

/// A compiled, loaded inline script.
///
/// One artifact per compilation call: identifiers are time-ordered v7
/// UUIDs, never reused and never deduplicated by content: compiling
/// byte-identical text twice yields two artifacts. The output file
/// persists after the run; nothing in this pipeline deletes it.
#[derive(Debug)]
pub struct CompiledArtifact {
    pub id: Uuid,
    /// Name the source is compiled under; runtime error positions refer
    /// to it.
    pub virtual_path: PathBuf,
    /// On-disk location of the templated source.
    pub output_path: PathBuf,
    pub entrypoint: Entrypoint,
}

/// A loaded entrypoint plus the path it was produced from.
#[derive(Debug)]
pub struct LoadedEntrypoint {
    pub path: PathBuf,
    pub entrypoint: Entrypoint,
}

/// Seam shared by the two entrypoint producers: inline compilation and
/// direct file loading.
#[async_trait]
pub trait EntrypointSource: Send + Sync {
    async fn load(&self, host: &ScriptHost) -> Result<LoadedEntrypoint>;
}

/// Compiles inline script text into a disposable, loadable artifact.
pub struct ScriptCompiler {
    script: String,
    artifact_dir: PathBuf,
}

impl ScriptCompiler {
    pub fn new(script: impl Into<String>, artifact_dir: impl Into<PathBuf>) -> Self {
        Self {
            script: script.into(),
            artifact_dir: artifact_dir.into(),
        }
    }

    /// Run the full template -> sanity check -> build -> load pipeline.
    pub async fn compile(&self, host: &ScriptHost) -> Result<CompiledArtifact> {
        let source = template::wrap(&self.script);

        // Parse before building: a failure here means the inline text was
        // transported with broken escaping and corrupted the template.
        host.parse_check(&source)
            .map_err(|e| Error::Parse(e.to_string()))?;

        let id = Uuid::now_v7();
        let file_name = format!("script-{id}.{ARTIFACT_EXT}");
        let virtual_path = PathBuf::from(&file_name);
        let output_path = self.artifact_dir.join(&file_name);

        let script_digest = hex::encode(Sha256::digest(self.script.as_bytes()));
        debug!(artifact = %file_name, script_sha256 = %script_digest, "building script artifact");

        std::fs::create_dir_all(&self.artifact_dir).map_err(|e| Error::Io {
            path: self.artifact_dir.clone(),
            source: e,
        })?;
        std::fs::write(&output_path, &source).map_err(|e| Error::Io {
            path: output_path.clone(),
            source: e,
        })?;

        let mut ast = host
            .engine()
            .compile(&source)
            .map_err(|e| Error::Build(e.to_string()))?;
        ast.set_source(file_name.clone());

        // Evaluate the module top level once; a throw here is a load
        // failure, not a runtime one.
        host.engine()
            .run_ast(&ast)
            .map_err(|e| Error::Load(e.to_string()))?;

        let entrypoint = Entrypoint::from_ast(ast)?;
        info!(artifact = %output_path.display(), "script artifact compiled and loaded");

        Ok(CompiledArtifact {
            id,
            virtual_path,
            output_path,
            entrypoint,
        })
    }
}

#[async_trait]
impl EntrypointSource for ScriptCompiler {
    async fn load(&self, host: &ScriptHost) -> Result<LoadedEntrypoint> {
        let CompiledArtifact {
            output_path,
            entrypoint,
            ..
        } = self.compile(host).await?;
        Ok(LoadedEntrypoint {
            path: output_path,
            entrypoint,
        })
    }
}
