//! Runtime evaluators: launch, collect, classify, repair once, retry once.
//!
//! ```text
//! Starting ─▶ Running ─▶ Succeeded
//!    ▲           │
//!    │           ├─▶ Failed            (unclassified, or anything after a repair)
//!    │           ▼
//!    └──── Repairing ─▶ Failed         (installer failed / not configured)
//! ```
//!
//! `Succeeded` and `Failed` are terminal. At most one `Repairing` per evaluation.

/// Builders and the [`RuntimeEvaluator`] impl shared by the per-runtime
/// evaluators. Expects `runtime: RuntimeConfig` and `options: EvaluateOptions` fields.
macro_rules! runtime_evaluator {
    ($name:ident, $script_type:expr) => {
        impl $name {
            pub fn with_options(mut self, options: $crate::evaluator::EvaluateOptions) -> Self {
                self.options = options;
                self
            }

            pub fn with_timeout(mut self, timeout: Option<std::time::Duration>) -> Self {
                self.options.timeout = timeout;
                self
            }

            pub fn with_sink(
                mut self,
                sink: std::sync::Arc<dyn $crate::collector::OutputSink>,
            ) -> Self {
                self.options.sink = sink;
                self
            }
        }

        impl $crate::evaluator::RuntimeEvaluator for $name {
            fn script_type(&self) -> $crate::invocation::ScriptType {
                $script_type
            }

            fn runtime(&self) -> &$crate::runtime::RuntimeConfig {
                &self.runtime
            }

            fn evaluate_with_report(
                &self,
                work_dir: &std::path::Path,
                args: &$crate::invocation::ScriptArgs,
            ) -> Result<$crate::evaluator::EvaluationReport, $crate::error::EvaluationError> {
                $crate::evaluator::run_evaluation(&self.runtime, &self.options, work_dir, args)
            }
        }
    };
}

mod node;
mod python;


pub use node::NodeEvaluator;
pub use python::PythonEvaluator;

use scriptheal_core::observability;
use scriptheal_core::path_validation::validate_work_dir;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::classifier::{self, ErrorVerdict};
use crate::collector::{self, CollectError, OutputSink, ProcessResult, TracingSink};
use crate::error::{EvaluationError, InstallError, LaunchError};
use crate::installer;
use crate::invocation::{ScriptArgs, ScriptType};
use crate::process;
use crate::runtime::RuntimeConfig;

/// One evaluator per runtime; the registry dispatches on [`ScriptType`].
pub trait RuntimeEvaluator: Send + Sync {
    fn script_type(&self) -> ScriptType;

    fn runtime(&self) -> &RuntimeConfig;

    /// Run the script in `work_dir`, repairing a missing dependency at most once.
    fn evaluate_with_report(
        &self,
        work_dir: &Path,
        args: &ScriptArgs,
    ) -> Result<EvaluationReport, EvaluationError>;

    fn evaluate(&self, work_dir: &Path, args: &ScriptArgs) -> Result<(), EvaluationError> {
        self.evaluate_with_report(work_dir, args).map(|_| ())
    }
}

/// Per-evaluator options. No deadline unless one is supplied.
#[derive(Clone)]
pub struct EvaluateOptions {
    pub timeout: Option<Duration>,
    pub sink: Arc<dyn OutputSink>,
}

impl Default for EvaluateOptions {
    fn default() -> Self {
        Self {
            timeout: None,
            sink: Arc::new(TracingSink),
        }
    }
}

impl fmt::Debug for EvaluateOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvaluateOptions")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl EvaluateOptions {
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn OutputSink>) -> Self {
        self.sink = sink;
        self
    }
}

/// What a successful evaluation went through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationReport {
    /// Process launches (1, or 2 after a repair)
    pub attempts: u32,
    /// Module installed by the repair step
    pub repaired: Option<String>,
    pub result: ProcessResult,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EvaluationState {
    Starting,
    Running,
    Repairing,
    Succeeded,
    Failed,
}

/// Shared state machine behind both evaluators.
pub(crate) fn run_evaluation(
    runtime: &RuntimeConfig,
    options: &EvaluateOptions,
    work_dir: &Path,
    args: &ScriptArgs,
) -> Result<EvaluationReport, EvaluationError> {
    let script_type = runtime.script_type;
    let start = Instant::now();
    let cwd = work_dir.to_string_lossy().to_string();

    let mut attempts = 0u32;
    let outcome = evaluate_inner(runtime, options, work_dir, args, start, &mut attempts);

    let duration_ms = start.elapsed().as_millis() as u64;
    match &outcome {
        Ok(_) => {
            transition(script_type, EvaluationState::Succeeded);
            observability::audit_evaluation_completed(
                script_type.as_str(),
                &cwd,
                true,
                attempts,
                duration_ms,
                None,
            );
        }
        Err(e) => {
            transition(script_type, EvaluationState::Failed);
            tracing::error!(
                script_type = %script_type,
                kind = e.kind(),
                "Error during evaluating script {}",
                runtime.entry_path(work_dir).display()
            );
            observability::audit_evaluation_completed(
                script_type.as_str(),
                &cwd,
                false,
                attempts,
                duration_ms,
                Some(&e.to_string()),
            );
        }
    }
    outcome
}

fn evaluate_inner(
    runtime: &RuntimeConfig,
    options: &EvaluateOptions,
    work_dir: &Path,
    args: &ScriptArgs,
    start: Instant,
    attempts: &mut u32,
) -> Result<EvaluationReport, EvaluationError> {
    let script_type = runtime.script_type;
    let launch_err = |source: LaunchError| EvaluationError::Launch {
        script_type,
        source,
    };

    let work_dir = validate_work_dir(work_dir).map_err(|e| launch_err(e.into()))?;
    let spec = runtime.command_for(&work_dir, args);
    tracing::debug!(
        script_type = %script_type,
        cmd = %runtime.command_tokens(&work_dir, args).join(" "),
        "Evaluating script"
    );

    observability::audit_evaluation_started(
        script_type.as_str(),
        &spec.program,
        &spec.args,
        work_dir.to_string_lossy().as_ref(),
    );

    let mut repaired: Option<String> = None;

    loop {
        transition(script_type, EvaluationState::Starting);
        let remaining = time_left(options.timeout, start).map_err(|after| EvaluationError::Timeout {
            script_type,
            after,
            stderr: String::new(),
        })?;

        let child = process::spawn(&spec).map_err(launch_err)?;
        *attempts += 1;
        transition(script_type, EvaluationState::Running);

        let result = collector::collect(child, options.sink.as_ref(), remaining).map_err(|e| match e {
            CollectError::Timeout { partial, .. } => EvaluationError::Timeout {
                script_type,
                after: options.timeout.unwrap_or_default(),
                stderr: partial.stderr,
            },
            CollectError::Wait(source) => EvaluationError::Wait {
                script_type,
                source,
            },
        })?;

        if result.success() {
            return Ok(EvaluationReport {
                attempts: *attempts,
                repaired,
                result,
            });
        }

        match classifier::classify(&result.stderr) {
            ErrorVerdict::MissingDependency { module_name } if repaired.is_none() => {
                transition(script_type, EvaluationState::Repairing);
                tracing::warn!(
                    script_type = %script_type,
                    module = %module_name,
                    exit_code = result.exit_code,
                    "Script is missing a module, trying to install it"
                );

                let remaining = time_left(options.timeout, start).map_err(|after| {
                    EvaluationError::Timeout {
                        script_type,
                        after,
                        stderr: result.stderr.clone(),
                    }
                })?;
                let installed = installer::install(&module_name, runtime, &work_dir, remaining);
                observability::audit_dependency_install(
                    script_type.as_str(),
                    &module_name,
                    installed.is_ok(),
                    &installed
                        .as_ref()
                        .err()
                        .map(|e| e.to_string())
                        .unwrap_or_default(),
                );
                match installed {
                    Ok(()) => {}
                    // The overall deadline ran out during the repair.
                    Err(InstallError::TimedOut { .. }) => {
                        return Err(EvaluationError::Timeout {
                            script_type,
                            after: options.timeout.unwrap_or_default(),
                            stderr: result.stderr,
                        });
                    }
                    Err(source) => {
                        return Err(EvaluationError::Install {
                            script_type,
                            module: module_name,
                            script_stderr: result.stderr,
                            source,
                        });
                    }
                }
                repaired = Some(module_name);
            }
            _ => {
                return Err(EvaluationError::Unclassified {
                    script_type,
                    exit_code: result.exit_code,
                    stderr: result.stderr,
                    repaired,
                });
            }
        }
    }
}

/// Time left before the overall deadline. `Err(limit)` once it has passed.
fn time_left(timeout: Option<Duration>, start: Instant) -> Result<Option<Duration>, Duration> {
    match timeout {
        None => Ok(None),
        Some(limit) => match limit.checked_sub(start.elapsed()) {
            Some(left) if !left.is_zero() => Ok(Some(left)),
            _ => Err(limit),
        },
    }
}

fn transition(script_type: ScriptType, state: EvaluationState) {
    tracing::trace!(script_type = %script_type, state = ?state, "Evaluation state");
}
