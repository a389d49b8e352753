//! The host-owned script engines and the single-invocation entry.

use std::sync::Arc;

use rhai::{CallFnOptions, Dynamic, Engine, Scope, AST};
use scriptact_core::{Error, Result};

use crate::{context, shell, vcs};

/// Name of the entrypoint function every loadable module must define.
pub const ENTRYPOINT: &str = "main";

/// Host-owned engines: a bare parser for sanity checks, and the fully
/// configured engine scripts actually build against and run on.
///
/// The configured engine compiles in strict-variables mode so unresolved
/// references fail at build time instead of surfacing as late runtime
/// errors, and carries the collaborator types plus the shell/utility
/// namespace as host-registered globals shared by every loaded module.
pub struct ScriptHost {
    engine: Arc<Engine>,
    parser: Engine,
}

impl ScriptHost {
    pub fn new() -> Self {
        let mut engine = Engine::new();
        engine.set_strict_variables(true);
        shell::register(&mut engine);
        vcs::register(&mut engine);
        context::register(&mut engine);

        Self {
            engine: Arc::new(engine),
            parser: Engine::new(),
        }
    }

    /// Parse-only pass over module text: no execution, no registration,
    /// no strictness. Failures here mean the text itself is broken.
    pub fn parse_check(&self, source: &str) -> std::result::Result<(), rhai::ParseError> {
        self.parser.compile(source).map(|_| ())
    }

    pub(crate) fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Invoke the loaded entrypoint exactly once with `(ctx, input)`.
    ///
    /// The call runs on a dedicated blocking thread so arbitrary user code
    /// cannot stall the async runtime. The module's top level is not
    /// re-evaluated: the load stage already ran it once. There is no
    /// timeout: the call returns when the script does.
    pub async fn invoke(
        &self,
        entry: &Entrypoint,
        ctx: rhai::Map,
        input: Dynamic,
    ) -> Result<Dynamic> {
        let engine = Arc::clone(&self.engine);
        let ast = entry.ast.clone();

        let outcome = tokio::task::spawn_blocking(move || {
            let options = CallFnOptions::new().eval_ast(false);
            let mut scope = Scope::new();
            engine.call_fn_with_options::<Dynamic>(
                options,
                &mut scope,
                &ast,
                ENTRYPOINT,
                (Dynamic::from(ctx), input),
            )
        })
        .await
        .map_err(|e| Error::Runtime(format!("script thread panicked: {e}")))?;

        outcome.map_err(|e| Error::Runtime(e.to_string()))
    }
}

impl Default for ScriptHost {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to a loaded module's entrypoint.
#[derive(Debug, Clone)]
pub struct Entrypoint {
    pub(crate) ast: AST,
}

impl Entrypoint {
    /// Locate the arity-2 entrypoint among the module's compiled
    /// functions. Callability is the only shape requirement.
    pub(crate) fn from_ast(ast: AST) -> Result<Self> {
        let found = ast
            .iter_functions()
            .any(|f| f.name == ENTRYPOINT && f.params.len() == 2);
        if !found {
            return Err(Error::Load(format!(
                "no {ENTRYPOINT}(ctx, input) entrypoint function found in module"
            )));
        }
        Ok(Self { ast })
    }
}
