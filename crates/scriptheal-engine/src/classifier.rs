//! Failure classification from captured diagnostic text.
//!
//! One signature today: Node's missing-module error. Module names are matched
//! as lowercase letters only, so scoped (`@org/pkg`), hyphenated or uppercase
//! names stay unclassified.

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

pub const MISSING_MODULE_PATTERN: &str = r"Error: Cannot find module '([a-z]+)'";

fn missing_module_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(MISSING_MODULE_PATTERN).expect("static pattern compiles"))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ErrorVerdict {
    Unclassified { raw_text: String },
    MissingDependency { module_name: String },
}

impl ErrorVerdict {
    pub fn missing_module(&self) -> Option<&str> {
        match self {
            Self::MissingDependency { module_name } => Some(module_name),
            Self::Unclassified { .. } => None,
        }
    }
}

/// Pure and deterministic: the same text always yields the same verdict.
pub fn classify(stderr: &str) -> ErrorVerdict {
    match missing_module_regex().captures(stderr) {
        Some(caps) => ErrorVerdict::MissingDependency {
            module_name: caps[1].to_string(),
        },
        None => ErrorVerdict::Unclassified {
            raw_text: stderr.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn missing(name: &str) -> ErrorVerdict {
        ErrorVerdict::MissingDependency {
            module_name: name.to_string(),
        }
    }

    #[test]
    fn test_missing_module_detected_anywhere_in_text() {
        let text = "internal/modules/cjs/loader.js:638\n    throw err;\n    ^\n\n\
                    Error: Cannot find module 'lodash'\nRequire stack:\n- /jobs/1/script/script.sc";
        assert_eq!(classify(text), missing("lodash"));
        assert_eq!(classify("Error: Cannot find module 'moment'"), missing("moment"));
    }

    #[test]
    fn test_first_match_wins() {
        let text = "Error: Cannot find module 'axios'\nError: Cannot find module 'lodash'";
        assert_eq!(classify(text), missing("axios"));
    }

    #[test]
    fn test_non_lowercase_names_unclassified() {
        for text in [
            "Error: Cannot find module 'lodash-es'",
            "Error: Cannot find module '@types/node'",
            "Error: Cannot find module 'Lodash'",
            "Error: Cannot find module 'mod2'",
            "Error: Cannot find module ''",
            "error: cannot find module 'lodash'",
        ] {
            assert_eq!(
                classify(text),
                ErrorVerdict::Unclassified {
                    raw_text: text.to_string()
                },
                "{text}"
            );
        }
    }

    #[test]
    fn test_other_failures_unclassified() {
        let text = "SyntaxError: unexpected token";
        let verdict = classify(text);
        assert_eq!(verdict.missing_module(), None);
        assert_eq!(verdict, classify(text));
        assert_eq!(classify(""), ErrorVerdict::Unclassified { raw_text: String::new() });
    }

    #[test]
    fn test_verdict_serializes_with_kind_tag() {
        let json = serde_json::to_value(missing("lodash")).unwrap();
        assert_eq!(json["kind"], "missing_dependency");
        assert_eq!(json["module_name"], "lodash");
    }
}
