//! Environment variable keys and their aliases.
//!
//! Primary variables use the `SCRIPTHEAL_*` prefix; aliases keep older deployment
//! property names working.

/// Node-flavored runtime
pub mod node {
    /// Module search path exported to Node scripts as `NODE_PATH`.
    pub const SCRIPTHEAL_NODE_PATH: &str = "SCRIPTHEAL_NODE_PATH";
    pub const NODE_PATH_ALIASES: &[&str] = &["NODE_GLOBAL_LIB"];

    pub const SCRIPTHEAL_NODE_BIN: &str = "SCRIPTHEAL_NODE_BIN";
    pub const SCRIPTHEAL_NPM_BIN: &str = "SCRIPTHEAL_NPM_BIN";
}

/// Python-flavored runtime
pub mod python {
    /// Interpreter program. Unset means the entry file is executed directly.
    pub const SCRIPTHEAL_PYTHON_BIN: &str = "SCRIPTHEAL_PYTHON_BIN";
    pub const SCRIPTHEAL_PYTHON_PATH: &str = "SCRIPTHEAL_PYTHON_PATH";
    /// Installer program + fixed args, whitespace separated (e.g. "pip install").
    pub const SCRIPTHEAL_PYTHON_INSTALL: &str = "SCRIPTHEAL_PYTHON_INSTALL";
}

/// Script layout and execution
pub mod execution {
    pub const SCRIPTHEAL_SCRIPT_FILE: &str = "SCRIPTHEAL_SCRIPT_FILE";
    pub const SCRIPTHEAL_TIMEOUT_SECS: &str = "SCRIPTHEAL_TIMEOUT_SECS";
}

/// Work directories
pub mod paths {
    pub const SCRIPTHEAL_WORK_ROOT: &str = "SCRIPTHEAL_WORK_ROOT";
}

/// Observability and logging
pub mod observability {
    pub const SCRIPTHEAL_QUIET: &str = "SCRIPTHEAL_QUIET";
    pub const SCRIPTHEAL_LOG_LEVEL: &str = "SCRIPTHEAL_LOG_LEVEL";
    pub const SCRIPTHEAL_LOG_JSON: &str = "SCRIPTHEAL_LOG_JSON";
    pub const SCRIPTHEAL_AUDIT_LOG: &str = "SCRIPTHEAL_AUDIT_LOG";
}
