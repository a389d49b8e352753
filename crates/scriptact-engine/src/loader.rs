//! Direct loading of pre-existing script modules.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::info;

use scriptact_core::{Error, Result};

use crate::compiler::{EntrypointSource, LoadedEntrypoint};
use crate::host::{Entrypoint, ScriptHost};

/// Loads a referenced module file directly: no templating, no sanity
/// check. The module must define the same `main(ctx, input)` entrypoint
/// the compiler generates; callability is the only shape requirement.
/// Every resolution, compilation, or evaluation failure is a load error.
pub struct ModuleLoader {
    reference: PathBuf,
    workspace: PathBuf,
}

impl ModuleLoader {
    pub fn new(reference: impl Into<PathBuf>, workspace: impl Into<PathBuf>) -> Self {
        Self {
            reference: reference.into(),
            workspace: workspace.into(),
        }
    }

    /// Resolve the reference against the workspace root; absolute
    /// references are taken as-is.
    fn resolve(&self) -> PathBuf {
        if self.reference.is_absolute() {
            self.reference.clone()
        } else {
            self.workspace.join(&self.reference)
        }
    }

    pub async fn load_module(&self, host: &ScriptHost) -> Result<LoadedEntrypoint> {
        let path = self.resolve();
        info!(module = %path.display(), "loading module file");

        let mut ast = host
            .engine()
            .compile_file(path.clone())
            .map_err(|e| Error::Load(e.to_string()))?;
        ast.set_source(path.display().to_string());

        // Top-level statements run exactly once, here. A throw in them is
        // a load failure.
        host.engine()
            .run_ast(&ast)
            .map_err(|e| Error::Load(e.to_string()))?;

        let entrypoint = Entrypoint::from_ast(ast)?;
        Ok(LoadedEntrypoint { path, entrypoint })
    }
}

#[async_trait]
impl EntrypointSource for ModuleLoader {
    async fn load(&self, host: &ScriptHost) -> Result<LoadedEntrypoint> {
        self.load_module(host).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[tokio::test]
    async fn loads_relative_reference_from_workspace() {
        let workspace = tempfile::tempdir().unwrap();
        fs::create_dir(workspace.path().join("scripts")).unwrap();
        fs::write(
            workspace.path().join("scripts/job.rhai"),
            "fn main(ctx, input) { input }",
        )
        .unwrap();

        let loader = ModuleLoader::new("scripts/job.rhai", workspace.path());
        let loaded = loader.load_module(&ScriptHost::new()).await.unwrap();
        assert_eq!(loaded.path, workspace.path().join("scripts/job.rhai"));
    }

    #[tokio::test]
    async fn missing_file_is_a_load_error() {
        let workspace = tempfile::tempdir().unwrap();
        let loader = ModuleLoader::new("nope.rhai", workspace.path());
        let err = loader.load_module(&ScriptHost::new()).await.unwrap_err();
        assert!(matches!(err, Error::Load(_)));
    }

    #[tokio::test]
    async fn top_level_throw_is_a_load_error() {
        let workspace = tempfile::tempdir().unwrap();
        fs::write(
            workspace.path().join("job.rhai"),
            "throw \"top-level\";\nfn main(ctx, input) { input }",
        )
        .unwrap();

        let loader = ModuleLoader::new("job.rhai", workspace.path());
        let err = loader.load_module(&ScriptHost::new()).await.unwrap_err();
        assert!(matches!(err, Error::Load(_)));
        assert!(err.to_string().contains("top-level"));
    }

    #[tokio::test]
    async fn module_without_entrypoint_is_a_load_error() {
        let workspace = tempfile::tempdir().unwrap();
        fs::write(workspace.path().join("job.rhai"), "fn helper() { 1 }").unwrap();

        let loader = ModuleLoader::new("job.rhai", workspace.path());
        let err = loader.load_module(&ScriptHost::new()).await.unwrap_err();
        assert!(err.to_string().contains("entrypoint"));
    }
}
