//! Config structs grouped by concern.
//!
//! Loaded from environment variables with the shared fallback rules.

use super::env_keys::{execution, node, observability as obv_keys, paths, python};
use super::loader::{env_bool, env_optional, env_or};

/// Default entry script, relative to the work directory.
pub const DEFAULT_SCRIPT_FILE: &str = "script/script.sc";

/// Node-flavored runtime settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSettings {
    /// Interpreter program (`node`)
    pub node_bin: String,
    /// Package manager used for global installs (`npm`)
    pub npm_bin: String,
    /// Global module directory exported as `NODE_PATH`
    pub module_path: Option<String>,
}

impl NodeSettings {
    pub fn from_env() -> Self {
        super::loader::load_dotenv();
        Self {
            node_bin: env_or(node::SCRIPTHEAL_NODE_BIN, &[], || "node".to_string()),
            npm_bin: env_or(node::SCRIPTHEAL_NPM_BIN, &[], || "npm".to_string()),
            module_path: env_optional(node::SCRIPTHEAL_NODE_PATH, node::NODE_PATH_ALIASES),
        }
    }
}

/// Python-flavored runtime settings
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PythonSettings {
    pub python_bin: Option<String>,
    pub python_path: Option<String>,
    /// Installer program followed by its fixed args
    pub install_command: Option<Vec<String>>,
}

impl PythonSettings {
    pub fn from_env() -> Self {
        super::loader::load_dotenv();
        let install_command = env_optional(python::SCRIPTHEAL_PYTHON_INSTALL, &[]).map(|s| {
            s.split_whitespace()
                .map(String::from)
                .collect::<Vec<_>>()
        });
        Self {
            python_bin: env_optional(python::SCRIPTHEAL_PYTHON_BIN, &[]),
            python_path: env_optional(python::SCRIPTHEAL_PYTHON_PATH, &[]),
            install_command,
        }
    }
}

/// Script layout and execution limits shared by all runtimes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionConfig {
    pub script_file: String,
    /// Wall-clock deadline in seconds. `None` means wait indefinitely.
    pub timeout_secs: Option<u64>,
}

impl ExecutionConfig {
    pub fn from_env() -> Self {
        super::loader::load_dotenv();
        let timeout_secs = env_optional(execution::SCRIPTHEAL_TIMEOUT_SECS, &[]).and_then(|s| {
            match s.parse::<u64>() {
                Ok(0) => None,
                Ok(secs) => Some(secs),
                Err(_) => {
                    tracing::warn!(
                        "Invalid {}: {}, running without a deadline",
                        execution::SCRIPTHEAL_TIMEOUT_SECS,
                        s
                    );
                    None
                }
            }
        });
        Self {
            script_file: env_or(execution::SCRIPTHEAL_SCRIPT_FILE, &[], || {
                DEFAULT_SCRIPT_FILE.to_string()
            }),
            timeout_secs,
        }
    }
}

/// Work directory confinement
#[derive(Debug, Clone)]
pub struct PathsConfig {
    /// Every work dir must resolve under this root when set
    pub work_root: Option<String>,
}

impl PathsConfig {
    pub fn from_env() -> Self {
        super::loader::load_dotenv();
        Self {
            work_root: env_optional(paths::SCRIPTHEAL_WORK_ROOT, &[]),
        }
    }
}

/// Observability: quiet, log_level, log_json, audit_log
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub quiet: bool,
    pub log_level: String,
    pub log_json: bool,
    pub audit_log: Option<String>,
}

impl ObservabilityConfig {
    pub fn from_env() -> &'static Self {
        use std::sync::OnceLock;
        static CACHE: OnceLock<ObservabilityConfig> = OnceLock::new();
        CACHE.get_or_init(|| {
            super::loader::load_dotenv();
            Self {
                quiet: env_bool(obv_keys::SCRIPTHEAL_QUIET, &[], false),
                log_level: env_or(obv_keys::SCRIPTHEAL_LOG_LEVEL, &[], || {
                    "scriptheal=info".to_string()
                }),
                log_json: env_bool(obv_keys::SCRIPTHEAL_LOG_JSON, &[], false),
                audit_log: env_optional(obv_keys::SCRIPTHEAL_AUDIT_LOG, &[]),
            }
        })
    }
}
