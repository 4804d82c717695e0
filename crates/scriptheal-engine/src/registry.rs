//! Dispatch from [`ScriptType`] to its evaluator.
//!
//! Built once at startup and only read afterwards.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::error::EvaluationError;
use crate::evaluator::{EvaluationReport, NodeEvaluator, PythonEvaluator, RuntimeEvaluator};
use crate::invocation::{ScriptArgs, ScriptInvocation, ScriptType};
use crate::runtime::EngineConfig;

#[derive(Default, Clone)]
pub struct EvaluatorRegistry {
    evaluators: HashMap<ScriptType, Arc<dyn RuntimeEvaluator>>,
}

impl std::fmt::Debug for EvaluatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut types: Vec<_> = self.evaluators.keys().map(ScriptType::as_str).collect();
        types.sort_unstable();
        f.debug_struct("EvaluatorRegistry")
            .field("script_types", &types)
            .finish()
    }
}

impl EvaluatorRegistry {
    /// Empty registry; every dispatch fails with `UnknownScriptType` until populated.
    pub fn new() -> Self {
        Self::default()
    }

    /// Node and Python evaluators built from `config`.
    pub fn with_defaults(config: &EngineConfig) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(
            NodeEvaluator::new(config.node.clone()).with_timeout(config.timeout),
        ));
        registry.register(Arc::new(
            PythonEvaluator::new(config.python.clone()).with_timeout(config.timeout),
        ));
        registry
    }

    pub fn from_env() -> Self {
        Self::with_defaults(EngineConfig::from_env())
    }

    /// Register `evaluator` under its own script type, replacing any previous one.
    pub fn register(&mut self, evaluator: Arc<dyn RuntimeEvaluator>) {
        let script_type = evaluator.script_type();
        if self.evaluators.insert(script_type, evaluator).is_some() {
            tracing::debug!(script_type = %script_type, "Replaced registered evaluator");
        }
    }

    pub fn get(&self, script_type: ScriptType) -> Option<&Arc<dyn RuntimeEvaluator>> {
        self.evaluators.get(&script_type)
    }

    pub fn evaluate(
        &self,
        script_type: ScriptType,
        work_dir: &Path,
        args: &ScriptArgs,
    ) -> Result<EvaluationReport, EvaluationError> {
        let evaluator = self
            .get(script_type)
            .ok_or_else(|| EvaluationError::UnknownScriptType(script_type.to_string()))?;
        crate::info_log!(
            "Evaluating {} script {}",
            script_type,
            evaluator.runtime().entry_path(work_dir).display()
        );
        evaluator.evaluate_with_report(work_dir, args)
    }

    pub fn evaluate_invocation(
        &self,
        invocation: &ScriptInvocation,
    ) -> Result<EvaluationReport, EvaluationError> {
        self.evaluate(invocation.script_type, &invocation.work_dir, &invocation.args)
    }

    /// Dispatch on a script type name as received from outside (`"node"`, `"py"`, ...).
    pub fn evaluate_named(
        &self,
        script_type: &str,
        work_dir: &Path,
        args: &ScriptArgs,
    ) -> Result<EvaluationReport, EvaluationError> {
        let script_type: ScriptType = script_type.parse()?;
        self.evaluate(script_type, work_dir, args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::ProcessResult;
    use crate::runtime::RuntimeConfig;
    use scriptheal_core::config::{NodeSettings, PythonSettings};
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Evaluator that records calls instead of launching anything.
    struct FakeEvaluator {
        runtime: RuntimeConfig,
        calls: AtomicU32,
    }

    impl FakeEvaluator {
        fn python() -> Self {
            Self {
                runtime: RuntimeConfig::python(&PythonSettings::default(), "script/script.sc"),
                calls: AtomicU32::new(0),
            }
        }
    }

    impl RuntimeEvaluator for FakeEvaluator {
        fn script_type(&self) -> ScriptType {
            self.runtime.script_type
        }

        fn runtime(&self) -> &RuntimeConfig {
            &self.runtime
        }

        fn evaluate_with_report(
            &self,
            _work_dir: &Path,
            args: &ScriptArgs,
        ) -> Result<EvaluationReport, EvaluationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(EvaluationReport {
                attempts: 1,
                repaired: None,
                result: ProcessResult {
                    exit_code: 0,
                    stdout: args.tokens().join(","),
                    stderr: String::new(),
                },
            })
        }
    }

    #[test]
    fn test_empty_registry_rejects_every_type() {
        let registry = EvaluatorRegistry::new();
        for script_type in ScriptType::ALL {
            let err = registry
                .evaluate(script_type, Path::new("/tmp"), &ScriptArgs::new())
                .unwrap_err();
            assert!(matches!(err, EvaluationError::UnknownScriptType(_)));
        }
    }

    #[test]
    fn test_dispatch_by_type() {
        let fake = Arc::new(FakeEvaluator::python());
        let mut registry = EvaluatorRegistry::new();
        registry.register(fake.clone());

        let args = ScriptArgs::new().with("-a", "1").unwrap();
        let invocation = ScriptInvocation::new(ScriptType::Python, "/tmp", args);
        let report = registry.evaluate_invocation(&invocation).unwrap();
        assert_eq!(report.result.stdout, "-a 1");
        assert_eq!(fake.calls.load(Ordering::SeqCst), 1);

        assert!(registry.get(ScriptType::Node).is_none());
        assert!(matches!(
            registry.evaluate(ScriptType::Node, Path::new("/tmp"), &ScriptArgs::new()),
            Err(EvaluationError::UnknownScriptType(ref s)) if s == "node"
        ));
    }

    #[test]
    fn test_evaluate_named() {
        let fake = Arc::new(FakeEvaluator::python());
        let mut registry = EvaluatorRegistry::new();
        registry.register(fake.clone());

        registry
            .evaluate_named("py", Path::new("/tmp"), &ScriptArgs::new())
            .unwrap();
        assert_eq!(fake.calls.load(Ordering::SeqCst), 1);

        let err = registry
            .evaluate_named("ruby", Path::new("/tmp"), &ScriptArgs::new())
            .unwrap_err();
        assert_eq!(err.kind(), "unknown_script_type");
        assert_eq!(fake.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_with_defaults_registers_both_runtimes() {
        let config = EngineConfig {
            node: RuntimeConfig::node(
                &NodeSettings {
                    node_bin: "node".into(),
                    npm_bin: "npm".into(),
                    module_path: None,
                },
                "script/script.sc",
            ),
            python: RuntimeConfig::python(&PythonSettings::default(), "script/script.sc"),
            timeout: None,
        };
        let registry = EvaluatorRegistry::with_defaults(&config);
        for script_type in ScriptType::ALL {
            let evaluator = registry.get(script_type).unwrap();
            assert_eq!(evaluator.script_type(), script_type);
            assert_eq!(evaluator.runtime().script_type, script_type);
        }
    }
}
