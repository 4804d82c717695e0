//! Observability: tracing init and the JSONL audit log.
//!
//! Settings come from [`ObservabilityConfig`]: SCRIPTHEAL_QUIET, SCRIPTHEAL_LOG_LEVEL,
//! SCRIPTHEAL_LOG_JSON and SCRIPTHEAL_AUDIT_LOG.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use chrono::Utc;
use serde_json::{json, Value};
use tracing_subscriber::{prelude::*, EnvFilter};

use crate::config::ObservabilityConfig;

/// Initialize tracing on stderr. Call once at process startup; later calls are no-ops.
/// `RUST_LOG` wins over SCRIPTHEAL_LOG_LEVEL. Quiet mode keeps WARN and above.
pub fn init_tracing() {
    let cfg = ObservabilityConfig::from_env();
    let directives = if cfg.quiet {
        "scriptheal=warn"
    } else {
        cfg.log_level.as_str()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives));

    let fmt = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);
    let layer = if cfg.log_json {
        fmt.json().boxed()
    } else {
        fmt.boxed()
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init();
}

/// Audit file from SCRIPTHEAL_AUDIT_LOG, resolved once. Parent dirs are created on first use.
fn audit_path() -> Option<&'static Path> {
    static PATH: OnceLock<Option<PathBuf>> = OnceLock::new();
    PATH.get_or_init(|| {
        let path = PathBuf::from(ObservabilityConfig::from_env().audit_log.as_ref()?);
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        Some(path)
    })
    .as_deref()
}

fn emit(event: &str, fields: Value) {
    if let Some(path) = audit_path() {
        append_event(path, event, fields);
    }
}

/// One JSON object per line: `ts`, `event`, then `fields`. Write failures are dropped.
fn append_event(path: &Path, event: &str, fields: Value) {
    let mut record = json!({
        "ts": Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        "event": event,
    });
    if let (Some(obj), Value::Object(extra)) = (record.as_object_mut(), fields) {
        obj.extend(extra);
    }
    let Ok(line) = serde_json::to_string(&record) else {
        return;
    };
    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(mut f) => {
            let _ = writeln!(f, "{}", line);
        }
        Err(e) => tracing::debug!(path = %path.display(), "Audit log not writable: {}", e),
    }
}

/// Right before the first launch.
pub fn audit_evaluation_started(script_type: &str, program: &str, args: &[String], cwd: &str) {
    emit(
        "evaluation_started",
        json!({ "script_type": script_type, "cmd": program, "args": args, "cwd": cwd }),
    );
}

/// One record per repair attempt.
pub fn audit_dependency_install(script_type: &str, module: &str, success: bool, detail: &str) {
    emit(
        "dependency_install",
        json!({ "script_type": script_type, "module": module, "success": success, "detail": detail }),
    );
}

pub fn audit_evaluation_completed(
    script_type: &str,
    cwd: &str,
    success: bool,
    attempts: u32,
    duration_ms: u64,
    error: Option<&str>,
) {
    emit(
        "evaluation_completed",
        json!({
            "script_type": script_type,
            "cwd": cwd,
            "success": success,
            "attempts": attempts,
            "duration_ms": duration_ms,
            "error": error,
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_event_one_record_per_line() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("audit.jsonl");
        append_event(&path, "dependency_install", json!({"module": "lodash", "success": true}));
        append_event(&path, "evaluation_completed", json!({"attempts": 2}));

        let content = std::fs::read_to_string(&path).unwrap();
        let events: Vec<Value> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0]["event"], "dependency_install");
        assert_eq!(events[0]["module"], "lodash");
        assert_eq!(events[1]["attempts"], 2);
        assert!(events[1]["ts"].as_str().unwrap().ends_with('Z'));
    }
}
