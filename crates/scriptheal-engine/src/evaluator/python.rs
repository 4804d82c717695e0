//! Python evaluator. The entry file is executed directly (shebang) unless an
//! interpreter is configured; the parent environment is inherited.

use super::EvaluateOptions;
use crate::invocation::ScriptType;
use crate::runtime::RuntimeConfig;

#[derive(Debug, Clone)]
pub struct PythonEvaluator {
    runtime: RuntimeConfig,
    options: EvaluateOptions,
}

impl PythonEvaluator {
    pub fn new(runtime: RuntimeConfig) -> Self {
        debug_assert_eq!(runtime.script_type, ScriptType::Python);
        tracing::debug!(
            interpreter = runtime.interpreter.as_deref().unwrap_or("<direct>"),
            repair = runtime.install_command.is_some(),
            "Python evaluator ready"
        );
        Self {
            runtime,
            options: EvaluateOptions::default(),
        }
    }
}

runtime_evaluator!(PythonEvaluator, ScriptType::Python);
