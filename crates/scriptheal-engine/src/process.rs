//! Process launch: one external command with a controlled environment and work dir.
//!
//! Arguments are passed to the OS as a vector; nothing is joined into a shell
//! string and re-split.

use scriptheal_core::path_validation::validate_work_dir_under;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};

use crate::error::LaunchError;
use crate::runtime::EnvPolicy;

/// Everything needed to start one child process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
    pub env_policy: EnvPolicy,
    pub work_dir: PathBuf,
}

impl CommandSpec {
    /// Human-readable command line, for logs only.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A launched child with piped stdout/stderr.
#[derive(Debug)]
pub struct RunningProcess {
    pub(crate) child: Child,
    program: String,
}

impl RunningProcess {
    pub fn id(&self) -> u32 {
        self.child.id()
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Kill the child and everything in its process group.
    pub(crate) fn kill_tree(&mut self) {
        #[cfg(unix)]
        {
            use nix::sys::signal::{killpg, Signal};
            use nix::unistd::Pid;
            if killpg(Pid::from_raw(self.child.id() as i32), Signal::SIGKILL).is_ok() {
                return;
            }
        }
        let _ = self.child.kill();
    }
}

/// Start `spec`. Fails before spawning when the work dir is unusable or the
/// program cannot be resolved.
pub fn spawn(spec: &CommandSpec) -> Result<RunningProcess, LaunchError> {
    let work_dir = validate_work_dir_under(&spec.work_dir, None)?;

    // Resolve against the parent's PATH: an isolated child env has no PATH of its own.
    let program = which::which(&spec.program).map_err(|source| LaunchError::ProgramNotFound {
        program: spec.program.clone(),
        source,
    })?;

    let mut cmd = Command::new(&program);
    cmd.args(&spec.args)
        .current_dir(&work_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    if spec.env_policy == EnvPolicy::Isolated {
        cmd.env_clear();
    }
    cmd.envs(spec.env.iter().map(|(k, v)| (k.as_str(), v.as_str())));

    // Own process group so a deadline can take down grandchildren too.
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }

    tracing::debug!(
        cmd = %spec.display(),
        cwd = %work_dir.display(),
        env_policy = ?spec.env_policy,
        "Spawning process"
    );

    let child = cmd.spawn().map_err(|source| LaunchError::Spawn {
        program: spec.program.clone(),
        work_dir: work_dir.clone(),
        source,
    })?;

    Ok(RunningProcess {
        child,
        program: spec.program.clone(),
    })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh_spec(work_dir: PathBuf, script: &str) -> CommandSpec {
        CommandSpec {
            program: "sh".into(),
            args: vec!["-c".into(), script.into()],
            env: Vec::new(),
            env_policy: EnvPolicy::Inherit,
            work_dir,
        }
    }

    #[test]
    fn test_spawn_missing_program() {
        let tmp = tempfile::tempdir().unwrap();
        let mut spec = sh_spec(tmp.path().to_path_buf(), "true");
        spec.program = "scriptheal-definitely-not-installed".into();
        assert!(matches!(
            spawn(&spec),
            Err(LaunchError::ProgramNotFound { .. })
        ));
    }

    #[test]
    fn test_spawn_invalid_work_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let spec = sh_spec(tmp.path().join("missing"), "true");
        assert!(matches!(spawn(&spec), Err(LaunchError::InvalidWorkDir(_))));
    }

    #[test]
    fn test_spawn_runs_in_work_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let spec = sh_spec(tmp.path().to_path_buf(), "pwd > where.txt");
        let mut process = spawn(&spec).unwrap();
        assert!(process.child.wait().unwrap().success());
        let written = std::fs::read_to_string(tmp.path().join("where.txt")).unwrap();
        assert_eq!(
            PathBuf::from(written.trim()).canonicalize().unwrap(),
            tmp.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn test_isolated_env_only_has_explicit_vars() {
        let tmp = tempfile::tempdir().unwrap();
        let mut spec = sh_spec(tmp.path().to_path_buf(), "echo \"$NODE_PATH|$HOME\" > env.txt");
        spec.env_policy = EnvPolicy::Isolated;
        spec.env = vec![("NODE_PATH".into(), "/opt/lib".into())];
        let mut process = spawn(&spec).unwrap();
        assert!(process.child.wait().unwrap().success());
        let env = std::fs::read_to_string(tmp.path().join("env.txt")).unwrap();
        assert_eq!(env.trim(), "/opt/lib|");
    }
}
