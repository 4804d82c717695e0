//! Node evaluator: `node <entry> [args]` with an isolated environment whose only
//! variable is `NODE_PATH`. Missing modules are repaired with `npm install -g`.

use super::EvaluateOptions;
use crate::invocation::ScriptType;
use crate::runtime::RuntimeConfig;

#[derive(Debug, Clone)]
pub struct NodeEvaluator {
    runtime: RuntimeConfig,
    options: EvaluateOptions,
}

impl NodeEvaluator {
    pub fn new(runtime: RuntimeConfig) -> Self {
        debug_assert_eq!(runtime.script_type, ScriptType::Node);
        if runtime.module_path().is_none() {
            // The child env is cleared, so nothing tells node where `npm install -g` puts modules.
            tracing::warn!(
                "NODE_PATH is not configured; modules installed by repair may stay invisible to scripts"
            );
        }
        Self {
            runtime,
            options: EvaluateOptions::default(),
        }
    }
}

runtime_evaluator!(NodeEvaluator, ScriptType::Node);
