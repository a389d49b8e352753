//! Script compilation and execution engine for the scriptact runner.
//!
//! Turns inline script text (templated, sanity-checked, built, loaded) or
//! a referenced module file into a single `main(ctx, input)` entrypoint,
//! invokes it exactly once with the composed collaborator context, and
//! encodes the returned value under the configured result encoding.

pub mod compiler;
pub mod context;
pub mod encode;
pub mod host;
pub mod loader;
pub mod runner;
pub mod shell;
pub mod template;
pub mod vcs;

pub use compiler::{CompiledArtifact, EntrypointSource, LoadedEntrypoint, ScriptCompiler};
pub use context::Diagnostics;
pub use encode::encode_result;
pub use host::{Entrypoint, ScriptHost, ENTRYPOINT};
pub use loader::ModuleLoader;
pub use runner::{RunReport, Runner};
pub use vcs::VcsClient;
