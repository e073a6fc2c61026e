//! Configuration resolver for triggering Datadog Synthetic tests from a CI
//! pipeline step.
//!
//! The library merges the step inputs exposed by the CI host, an optional
//! `datadog-ci.json` project file, and built-in defaults into a single
//! [`ResolvedConfig`], which is then handed to the external orchestration
//! client that triggers the tests and collects their results.

pub mod config;
pub mod error;
pub mod inputs;
pub mod orchestrator;
pub mod reporter;

pub use config::{
    ConfigFileSource, GlobalConfig, ResolvedConfig, WorkspaceConfigFiles, resolve_config,
};
pub use error::ResolveError;
pub use inputs::{InputSource, ProcessEnvironment, StepInputs};
pub use orchestrator::{RunSummary, SyntheticsOrchestrator, run_tests};
pub use reporter::{NoopReporter, Reporter, TracingReporter};
