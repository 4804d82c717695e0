//! Script evaluation engine.
//!
//! Runs externally-authored Node/Python analysis scripts as child processes,
//! drains their output concurrently, classifies failures and repairs a missing
//! runtime dependency once before giving up.
//!
//! ```text
//! EvaluatorRegistry ─▶ RuntimeEvaluator ─▶ process::spawn ─▶ collector::collect
//!                                   │                              │
//!                                   └── installer::install ◀── classifier::classify
//! ```

pub mod classifier;
pub mod collector;
pub mod error;
pub mod evaluator;
pub mod installer;
pub mod invocation;
pub mod log;
pub mod process;
pub mod registry;
pub mod runtime;

pub use classifier::{classify, ErrorVerdict};
pub use collector::{OutputSink, ProcessResult, StreamKind, TracingSink};
pub use error::{EvaluationError, InstallError, LaunchError};
pub use evaluator::{
    EvaluateOptions, EvaluationReport, NodeEvaluator, PythonEvaluator, RuntimeEvaluator,
};
pub use invocation::{ScriptArgs, ScriptInvocation, ScriptType};
pub use registry::EvaluatorRegistry;
pub use runtime::{EngineConfig, EnvPolicy, InstallCommand, RuntimeConfig};
