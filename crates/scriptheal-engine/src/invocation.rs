//! Evaluation request model: script type, work dir and ordered arguments.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

use crate::error::EvaluationError;

/// Closed set of supported runtimes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptType {
    Node,
    Python,
}

impl ScriptType {
    pub const ALL: [ScriptType; 2] = [ScriptType::Node, ScriptType::Python];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::Python => "python",
        }
    }
}

impl fmt::Display for ScriptType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScriptType {
    type Err = EvaluationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "node" | "nodejs" | "js" => Ok(Self::Node),
            "python" | "py" => Ok(Self::Python),
            _ => Err(EvaluationError::UnknownScriptType(s.to_string())),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArgsError {
    #[error("script argument key must not be empty")]
    EmptyKey,
}

/// Ordered flag → value mapping. Insertion order is command-line order.
///
/// Re-inserting an existing key replaces its value in place. Serialized as a
/// list of `[key, value]` pairs; deserializing goes through [`ScriptArgs::insert`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<(String, String)>", into = "Vec<(String, String)>")]
pub struct ScriptArgs {
    entries: Vec<(String, String)>,
}

impl TryFrom<Vec<(String, String)>> for ScriptArgs {
    type Error = ArgsError;

    fn try_from(pairs: Vec<(String, String)>) -> Result<Self, Self::Error> {
        let mut args = Self::new();
        for (key, value) in pairs {
            args.insert(key, value)?;
        }
        Ok(args)
    }
}

impl From<ScriptArgs> for Vec<(String, String)> {
    fn from(args: ScriptArgs) -> Self {
        args.entries
    }
}

impl ScriptArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), ArgsError> {
        let key = key.into();
        if key.is_empty() {
            return Err(ArgsError::EmptyKey);
        }
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
        Ok(())
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Result<Self, ArgsError> {
        self.insert(key, value)?;
        Ok(self)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One logical token per argument: `"key value"` (or `"key"` for an empty value).
    /// Used for logs and audit records.
    pub fn tokens(&self) -> Vec<String> {
        self.iter()
            .map(|(k, v)| {
                if v.is_empty() {
                    k.to_string()
                } else {
                    format!("{} {}", k, v)
                }
            })
            .collect()
    }

    /// Argument vector handed to the exec primitive: key and value as separate
    /// elements, values never re-split on whitespace.
    pub fn argv(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.entries.len() * 2);
        for (k, v) in self.iter() {
            out.push(k.to_string());
            if !v.is_empty() {
                out.push(v.to_string());
            }
        }
        out
    }
}

/// One evaluation request. Not persisted; owned by the caller.
#[derive(Debug, Clone)]
pub struct ScriptInvocation {
    pub script_type: ScriptType,
    pub work_dir: PathBuf,
    pub args: ScriptArgs,
}

impl ScriptInvocation {
    pub fn new(script_type: ScriptType, work_dir: impl Into<PathBuf>, args: ScriptArgs) -> Self {
        Self {
            script_type,
            work_dir: work_dir.into(),
            args,
        }
    }
}
