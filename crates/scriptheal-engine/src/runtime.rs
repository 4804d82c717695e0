//! Per-runtime static configuration and command construction.
//!
//! `EngineConfig::from_env()` is loaded once at startup and never mutated.

use scriptheal_core::config::{ExecutionConfig, NodeSettings, PythonSettings};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::invocation::{ScriptArgs, ScriptType};
use crate::process::CommandSpec;

/// How the child environment is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvPolicy {
    /// Start from an empty environment; only the runtime's explicit variables are set.
    Isolated,
    /// Inherit the parent environment, then apply the runtime's variables.
    Inherit,
}

/// Package installer: program plus fixed args. The module name is appended last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl InstallCommand {
    pub fn new(program: impl Into<String>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// `npm install -g <module>`
    pub fn npm_global(npm_bin: &str) -> Self {
        Self::new(npm_bin, ["install", "-g"])
    }

    /// First token is the program, the rest are fixed args. Empty input yields `None`.
    pub fn from_tokens(tokens: &[String]) -> Option<Self> {
        let (program, args) = tokens.split_first()?;
        Some(Self::new(program.clone(), args.iter().cloned()))
    }

    pub fn args_for(&self, module: &str) -> Vec<String> {
        let mut args = self.args.clone();
        args.push(module.to_string());
        args
    }
}

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub script_type: ScriptType,
    /// Interpreter program. `None` executes the entry file directly.
    pub interpreter: Option<String>,
    /// Entry script, relative to the work dir.
    pub entry_file: PathBuf,
    pub env_policy: EnvPolicy,
    /// Module search path override and similar (e.g. `NODE_PATH`).
    pub env: Vec<(String, String)>,
    pub install_command: Option<InstallCommand>,
}

impl RuntimeConfig {
    /// Node: `node <entry>`, isolated env with only `NODE_PATH`, `npm install -g` repair.
    pub fn node(settings: &NodeSettings, script_file: &str) -> Self {
        let mut env = Vec::new();
        if let Some(ref module_path) = settings.module_path {
            env.push(("NODE_PATH".to_string(), module_path.clone()));
        }
        Self {
            script_type: ScriptType::Node,
            interpreter: Some(settings.node_bin.clone()),
            entry_file: PathBuf::from(script_file),
            env_policy: EnvPolicy::Isolated,
            env,
            install_command: Some(InstallCommand::npm_global(&settings.npm_bin)),
        }
    }

    /// Python: inherited env, entry executed directly unless an interpreter is set,
    /// no installer unless one is configured.
    pub fn python(settings: &PythonSettings, script_file: &str) -> Self {
        let mut env = Vec::new();
        if let Some(ref python_path) = settings.python_path {
            env.push(("PYTHONPATH".to_string(), python_path.clone()));
        }
        Self {
            script_type: ScriptType::Python,
            interpreter: settings.python_bin.clone(),
            entry_file: PathBuf::from(script_file),
            env_policy: EnvPolicy::Inherit,
            env,
            install_command: settings
                .install_command
                .as_deref()
                .and_then(InstallCommand::from_tokens),
        }
    }

    pub fn with_interpreter(mut self, interpreter: Option<String>) -> Self {
        self.interpreter = interpreter;
        self
    }

    pub fn with_entry_file(mut self, entry_file: impl Into<PathBuf>) -> Self {
        self.entry_file = entry_file.into();
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn with_install_command(mut self, install_command: Option<InstallCommand>) -> Self {
        self.install_command = install_command;
        self
    }

    /// `NODE_PATH` this runtime exports to its scripts, if any.
    pub fn module_path(&self) -> Option<&str> {
        self.env
            .iter()
            .find(|(k, _)| k == "NODE_PATH")
            .map(|(_, v)| v.as_str())
    }

    pub fn entry_path(&self, work_dir: &Path) -> PathBuf {
        work_dir.join(&self.entry_file)
    }

    /// Logical command tokens: `[interpreter?, entry, "key value", ...]`.
    pub fn command_tokens(&self, work_dir: &Path, args: &ScriptArgs) -> Vec<String> {
        let mut tokens = Vec::with_capacity(args.len() + 2);
        if let Some(ref interpreter) = self.interpreter {
            tokens.push(interpreter.clone());
        }
        tokens.push(self.entry_path(work_dir).to_string_lossy().to_string());
        tokens.extend(args.tokens());
        tokens
    }

    /// Process spec for one script run in `work_dir`.
    pub fn command_for(&self, work_dir: &Path, args: &ScriptArgs) -> CommandSpec {
        let entry = self.entry_path(work_dir).to_string_lossy().to_string();
        let (program, mut argv) = match self.interpreter {
            Some(ref interpreter) => (interpreter.clone(), vec![entry]),
            None => (entry, Vec::new()),
        };
        argv.extend(args.argv());
        CommandSpec {
            program,
            args: argv,
            env: self.env.clone(),
            env_policy: self.env_policy,
            work_dir: work_dir.to_path_buf(),
        }
    }
}

/// Process-wide engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub node: RuntimeConfig,
    pub python: RuntimeConfig,
    pub timeout: Option<Duration>,
}

impl EngineConfig {
    /// Explicit configuration with no deadline.
    pub fn new(node: RuntimeConfig, python: RuntimeConfig) -> Self {
        Self {
            node,
            python,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load once from the environment; later calls return the same instance.
    pub fn from_env() -> &'static Self {
        use std::sync::OnceLock;
        static CACHE: OnceLock<EngineConfig> = OnceLock::new();
        CACHE.get_or_init(Self::load)
    }

    /// Uncached load from the environment.
    pub fn load() -> Self {
        let execution = ExecutionConfig::from_env();
        let config = Self {
            node: RuntimeConfig::node(&NodeSettings::from_env(), &execution.script_file),
            python: RuntimeConfig::python(&PythonSettings::from_env(), &execution.script_file),
            timeout: execution.timeout_secs.map(Duration::from_secs),
        };
        tracing::debug!(
            script_file = %execution.script_file,
            node_path = ?config.node.module_path(),
            python_installer = config.python.install_command.is_some(),
            timeout = ?config.timeout,
            "Engine configuration loaded"
        );
        config
    }

    pub fn runtime(&self, script_type: ScriptType) -> &RuntimeConfig {
        match script_type {
            ScriptType::Node => &self.node,
            ScriptType::Python => &self.python,
        }
    }
}
