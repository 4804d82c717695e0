//! Dependency installation for the repair step.
//!
//! Runs the runtime's installer (`npm install -g <module>` for Node) and waits
//! for it. A runtime without an installer fails immediately.

use std::path::Path;
use std::time::Duration;

use crate::collector::{self, CollectError, OutputSink, StreamKind};
use crate::error::InstallError;
use crate::process::{self, CommandSpec};
use crate::runtime::{EnvPolicy, RuntimeConfig};

/// Installer output is operator noise (npm WARN lines etc.), keep it at DEBUG.
struct InstallerSink;

impl OutputSink for InstallerSink {
    fn on_line(&self, stream: StreamKind, line: &str) {
        tracing::debug!(target: "scriptheal::installer", stream = ?stream, "{}", line);
    }
}

/// Install `module` with `runtime`'s installer, running in `work_dir`.
pub fn install(
    module: &str,
    runtime: &RuntimeConfig,
    work_dir: &Path,
    timeout: Option<Duration>,
) -> Result<(), InstallError> {
    let Some(ref command) = runtime.install_command else {
        return Err(InstallError::NotConfigured {
            script_type: runtime.script_type,
        });
    };

    let spec = CommandSpec {
        program: command.program.clone(),
        args: command.args_for(module),
        env: Vec::new(),
        env_policy: EnvPolicy::Inherit,
        work_dir: work_dir.to_path_buf(),
    };

    crate::info_log!("Installing missing {} module '{}': {}", runtime.script_type, module, spec.display());

    let child = process::spawn(&spec).map_err(|source| InstallError::Launch {
        module: module.to_string(),
        source,
    })?;

    let result = collector::collect(child, &InstallerSink, timeout).map_err(|e| match e {
        CollectError::Timeout { after, .. } => InstallError::TimedOut {
            module: module.to_string(),
            after,
        },
        CollectError::Wait(source) => InstallError::Wait {
            module: module.to_string(),
            source,
        },
    })?;

    if !result.success() {
        return Err(InstallError::Failed {
            module: module.to_string(),
            exit_code: result.exit_code,
            stderr: result.stderr,
        });
    }

    crate::info_log!("Installed {} module '{}'", runtime.script_type, module);
    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::runtime::InstallCommand;
    use scriptheal_core::config::PythonSettings;

    fn runtime_with(install: Option<InstallCommand>) -> RuntimeConfig {
        RuntimeConfig::python(&PythonSettings::default(), "script/script.sc")
            .with_install_command(install)
    }

    #[test]
    fn test_install_without_installer_fails_immediately() {
        let tmp = tempfile::tempdir().unwrap();
        let err = install("requests", &runtime_with(None), tmp.path(), None).unwrap_err();
        assert!(matches!(err, InstallError::NotConfigured { .. }));
    }

    #[test]
    fn test_install_passes_module_as_last_arg() {
        let tmp = tempfile::tempdir().unwrap();
        let cmd = InstallCommand::new("sh", ["-c", "echo \"$1\" > installed.txt", "installer"]);
        install("lodash", &runtime_with(Some(cmd)), tmp.path(), None).unwrap();
        let installed = std::fs::read_to_string(tmp.path().join("installed.txt")).unwrap();
        assert_eq!(installed.trim(), "lodash");
    }

    #[test]
    fn test_install_failure_embeds_stderr() {
        let tmp = tempfile::tempdir().unwrap();
        let cmd = InstallCommand::new("sh", ["-c", "echo \"404 Not Found: $1\" >&2; exit 1", "installer"]);
        let err = install("lodash", &runtime_with(Some(cmd)), tmp.path(), None).unwrap_err();
        match err {
            InstallError::Failed { module, exit_code, stderr } => {
                assert_eq!(module, "lodash");
                assert_eq!(exit_code, 1);
                assert_eq!(stderr, "404 Not Found: lodash");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_install_launch_error() {
        let tmp = tempfile::tempdir().unwrap();
        let cmd = InstallCommand::new("scriptheal-no-such-npm", ["install", "-g"]);
        let err = install("lodash", &runtime_with(Some(cmd)), tmp.path(), None).unwrap_err();
        assert!(matches!(err, InstallError::Launch { .. }));
    }
}
