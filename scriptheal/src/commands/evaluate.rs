//! `scriptheal evaluate`: one script run through the evaluator registry.

use anyhow::{Context, Result};
use scriptheal_engine::{
    EngineConfig, EvaluationError, EvaluatorRegistry, ScriptArgs, ScriptInvocation, ScriptType,
};
use serde_json::json;
use std::path::Path;
use std::time::Duration;

/// Evaluate the script in `work_dir` and return the JSON report.
///
/// `timeout` (seconds) overrides the configured deadline; 0 disables it.
pub fn run_evaluate(
    script_type: &str,
    work_dir: &Path,
    raw_args: &[String],
    timeout: Option<u64>,
) -> Result<String> {
    let args = parse_script_args(raw_args)?;
    tracing::debug!(
        script_type,
        work_dir = %work_dir.display(),
        args = ?args.tokens(),
        timeout = ?timeout,
        "evaluate command"
    );

    let mut config = EngineConfig::from_env().clone();
    if let Some(secs) = timeout {
        config.timeout = (secs > 0).then(|| Duration::from_secs(secs));
    }
    let registry = EvaluatorRegistry::with_defaults(&config);

    evaluate_with(&registry, script_type, work_dir, &args)
}

pub fn evaluate_with(
    registry: &EvaluatorRegistry,
    script_type: &str,
    work_dir: &Path,
    args: &ScriptArgs,
) -> Result<String> {
    let script_type: ScriptType = script_type.parse()?;
    let invocation = ScriptInvocation::new(script_type, work_dir, args.clone());
    match registry.evaluate_invocation(&invocation) {
        Ok(report) => Ok(serde_json::to_string_pretty(&json!({
            "success": true,
            "script_type": script_type,
            "attempts": report.attempts,
            "repaired": report.repaired,
            "exit_code": report.result.exit_code,
            "stdout": report.result.stdout,
            "stderr": report.result.stderr,
        }))?),
        Err(e) => {
            let summary = failure_summary(&e);
            Err(e).with_context(|| {
                format!(
                    "Evaluating {} script in {} failed\n{}",
                    script_type,
                    work_dir.display(),
                    summary
                )
            })
        }
    }
}

fn failure_summary(e: &EvaluationError) -> String {
    json!({
        "success": false,
        "kind": e.kind(),
        "exit_code": e.exit_code(),
        "diagnostics": e.diagnostics(),
    })
    .to_string()
}

/// Parse `KEY=VALUE` pairs in order. A bare `KEY` becomes a flag with an empty value.
pub fn parse_script_args(raw: &[String]) -> Result<ScriptArgs> {
    let mut args = ScriptArgs::new();
    for item in raw {
        let (key, value) = item.split_once('=').unwrap_or((item.as_str(), ""));
        args.insert(key, value)
            .with_context(|| format!("Invalid script argument: {:?}", item))?;
    }
    Ok(args)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use scriptheal_core::config::{NodeSettings, PythonSettings};
    use scriptheal_engine::RuntimeConfig;

    fn sh_registry() -> EvaluatorRegistry {
        let node = NodeSettings {
            node_bin: "sh".into(),
            npm_bin: "npm".into(),
            module_path: None,
        };
        let python = PythonSettings {
            python_bin: Some("sh".into()),
            ..PythonSettings::default()
        };
        EvaluatorRegistry::with_defaults(&EngineConfig::new(
            RuntimeConfig::node(&node, "script/script.sc"),
            RuntimeConfig::python(&python, "script/script.sc"),
        ))
    }

    fn job(script: &str) -> tempfile::TempDir {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("script")).unwrap();
        std::fs::write(tmp.path().join("script/script.sc"), script).unwrap();
        tmp
    }

    #[test]
    fn test_parse_script_args() {
        let raw = vec![
            "--question_dir=/data/q 1".to_string(),
            "--verbose".to_string(),
            "--expr=a=b".to_string(),
        ];
        let args = parse_script_args(&raw).unwrap();
        assert_eq!(args.argv(), vec!["--question_dir", "/data/q 1", "--verbose", "--expr", "a=b"]);

        assert!(parse_script_args(&["=oops".to_string()]).is_err());
    }

    #[test]
    fn test_evaluate_success_report() {
        let tmp = job("echo \"got $2\"\n");
        let args = parse_script_args(&["-n=5".to_string()]).unwrap();
        let out = evaluate_with(&sh_registry(), "python", tmp.path(), &args).unwrap();
        let v: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v["success"], true);
        assert_eq!(v["script_type"], "python");
        assert_eq!(v["attempts"], 1);
        assert_eq!(v["stdout"], "got 5");
    }

    #[test]
    fn test_evaluate_failure_carries_diagnostics() {
        let tmp = job("echo 'TypeError: x is undefined' >&2\nexit 4\n");
        let err = evaluate_with(&sh_registry(), "node", tmp.path(), &ScriptArgs::new()).unwrap_err();
        let msg = format!("{:#}", err);
        assert!(msg.contains("unclassified_execution_error"));
        assert!(msg.contains("TypeError: x is undefined"));
        assert!(matches!(
            err.downcast_ref::<EvaluationError>(),
            Some(EvaluationError::Unclassified { exit_code: 4, .. })
        ));
    }

    #[test]
    fn test_evaluate_unknown_type() {
        let tmp = job("exit 0\n");
        let err = evaluate_with(&sh_registry(), "ruby", tmp.path(), &ScriptArgs::new()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EvaluationError>(),
            Some(EvaluationError::UnknownScriptType(_))
        ));
    }
}
