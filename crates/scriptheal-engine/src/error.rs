//! Error taxonomy. Every failure reaches the caller as one [`EvaluationError`].

use scriptheal_core::path_validation::WorkDirError;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::invocation::ScriptType;

/// The child process could not be started.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error(transparent)]
    InvalidWorkDir(#[from] WorkDirError),

    #[error("executable not found: {program}")]
    ProgramNotFound {
        program: String,
        #[source]
        source: which::Error,
    },

    #[error("failed to spawn {program} in {work_dir}: {source}")]
    Spawn {
        program: String,
        work_dir: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The remediation subprocess failed.
#[derive(Debug, Error)]
pub enum InstallError {
    #[error("no installer configured for the {script_type} runtime")]
    NotConfigured { script_type: ScriptType },

    #[error("failed to launch installer for module '{module}': {source}")]
    Launch {
        module: String,
        #[source]
        source: LaunchError,
    },

    #[error("installing module '{module}' failed with exit code {exit_code}:\n{stderr}")]
    Failed {
        module: String,
        exit_code: i32,
        stderr: String,
    },

    #[error("installing module '{module}' timed out after {after:?}")]
    TimedOut { module: String, after: Duration },

    #[error("failed to wait for installer of module '{module}': {source}")]
    Wait {
        module: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("failed to launch {script_type} script: {source}")]
    Launch {
        script_type: ScriptType,
        #[source]
        source: LaunchError,
    },

    /// A missing module was detected and repairing it failed.
    #[error("{script_type} script requires module '{module}' and installing it failed: {source}")]
    Install {
        script_type: ScriptType,
        module: String,
        /// stderr of the run that was classified as missing the module
        script_stderr: String,
        #[source]
        source: InstallError,
    },

    /// Non-zero exit with no recoverable signature, or any failure after a repair.
    #[error("error during evaluating {script_type} script, exit code {exit_code}:\n{stderr}")]
    Unclassified {
        script_type: ScriptType,
        exit_code: i32,
        stderr: String,
        /// Module installed before this (final) attempt, if any
        repaired: Option<String>,
    },

    #[error("unknown script type: {0}")]
    UnknownScriptType(String),

    #[error("{script_type} script exceeded deadline of {after:?}")]
    Timeout {
        script_type: ScriptType,
        after: Duration,
        stderr: String,
    },

    #[error("failed to wait for {script_type} script: {source}")]
    Wait {
        script_type: ScriptType,
        #[source]
        source: std::io::Error,
    },
}

impl EvaluationError {
    /// Diagnostic text that informed the failure, if any.
    pub fn diagnostics(&self) -> Option<&str> {
        match self {
            Self::Unclassified { stderr, .. } | Self::Timeout { stderr, .. } => Some(stderr),
            Self::Install { source, script_stderr, .. } => match source {
                InstallError::Failed { stderr, .. } => Some(stderr),
                _ => Some(script_stderr),
            },
            _ => None,
        }
    }

    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::Unclassified { exit_code, .. } => Some(*exit_code),
            _ => None,
        }
    }

    /// Short machine-readable kind, used in audit records and CLI output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Launch { .. } => "launch_error",
            Self::Install { .. } => "install_error",
            Self::Unclassified { .. } => "unclassified_execution_error",
            Self::UnknownScriptType(_) => "unknown_script_type",
            Self::Timeout { .. } => "timeout",
            Self::Wait { .. } => "wait_error",
        }
    }
}
