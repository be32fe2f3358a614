//! prereq-lib: Core types and logic for prereq
//!
//! This crate fetches and builds the third-party projects a source tree
//! depends on:
//! - `Project`: the capability contract every dependency plugin implements
//! - `Registry`: name-to-factory lookup for built-in and declared projects
//! - `resolve`: dependency ordering with cycle and unknown-name detection
//! - `Orchestrator`: runs download, configure, validate, and build in order
//! - `GeneratedScript`: the environment script written after a run

pub mod config;
pub mod consts;
pub mod context;
pub mod env;
pub mod orchestrate;
pub mod platform;
pub mod process;
pub mod project;
pub mod resolve;
pub mod script;
pub mod status;
pub mod util;
pub mod vcs;
pub mod workspace;

pub use context::{Action, RunContext};
pub use env::EnvironmentState;
pub use orchestrate::{OrchestrateError, Orchestrator, RunReport};
pub use project::{Project, Registry, Services};
