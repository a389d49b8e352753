//! Core contracts for the scriptact runner.
//!
//! Defines the pieces every other crate agrees on:
//! - the host parameter/output API (`INPUT_*` namespace, `ACTION_*` roots)
//! - configuration validation into one immutable [`RunConfig`]
//! - the run error taxonomy
//! - the run lifecycle state machine
//! - process logging setup

pub mod config;
pub mod error;
pub mod params;
pub mod state;
pub mod telemetry;

pub use config::{Encoding, InputValue, RunConfig, ScriptSource};
pub use error::{Error, Result};
pub use params::{HostPaths, Outputs, Params};
pub use state::{RunState, RunTracker};
pub use telemetry::init_tracing;
