//! Error taxonomy for the run pipeline.
//!
//! Every failure is terminal for the run: nothing is retried, nothing is
//! recovered past its origin. The boundary reports the originating error's
//! own message, never a translated code.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for runner operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Invalid, missing, or contradictory configuration, including
    /// malformed JSON input text.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The templated script failed the parse-only sanity check. The usual
    /// cause is broken escaping in transport corrupting the template.
    #[error(
        "script is not parseable, likely due to escaping issues; \
         check the script content and escaping: {0}"
    )]
    Parse(String),

    /// Parse-clean source failed the full build (e.g. an unresolved
    /// reference caught by the strict compile).
    #[error("script build failed: {0}")]
    Build(String),

    /// Module resolution or top-level evaluation failed, including a
    /// top-level throw in loaded code.
    #[error("module load failed: {0}")]
    Load(String),

    /// The entrypoint raised during invocation.
    #[error("script execution failed: {0}")]
    Runtime(String),

    /// The returned value cannot be represented under the configured
    /// result encoding.
    #[error("result encoding failed: {0}")]
    Encoding(String),

    /// Run state machine misuse; indicates a pipeline bug, not bad input.
    #[error("invalid run state transition: {from} -> {to}")]
    InvalidTransition {
        from: &'static str,
        to: &'static str,
    },

    /// Artifact or fixture file I/O.
    #[error("i/o error at '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The output sink rejected the run's result.
    #[error("failed to write output '{name}': {message}")]
    Output { name: String, message: String },
}
