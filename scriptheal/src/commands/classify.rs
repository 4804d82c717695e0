//! `scriptheal classify`: run the failure classifier over captured text.

use anyhow::{Context, Result};
use std::io::Read;

pub fn run_classify(input: &str) -> Result<String> {
    let text = if input == "-" {
        let mut s = String::new();
        std::io::stdin()
            .read_to_string(&mut s)
            .context("Failed to read stdin")?;
        s
    } else {
        std::fs::read_to_string(input).with_context(|| format!("Failed to read {}", input))?
    };
    classify_text(&text)
}

pub fn classify_text(text: &str) -> Result<String> {
    let verdict = scriptheal_engine::classify(text);
    Ok(serde_json::to_string_pretty(&verdict)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("stderr.txt");
        std::fs::write(&path, "Error: Cannot find module 'axios'\nRequire stack:\n").unwrap();

        let out = run_classify(path.to_str().unwrap()).unwrap();
        let v: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v["kind"], "missing_dependency");
        assert_eq!(v["module_name"], "axios");
    }

    #[test]
    fn test_classify_unclassified_keeps_text() {
        let v: serde_json::Value =
            serde_json::from_str(&classify_text("Segmentation fault").unwrap()).unwrap();
        assert_eq!(v["kind"], "unclassified");
        assert_eq!(v["raw_text"], "Segmentation fault");
    }

    #[test]
    fn test_classify_missing_file() {
        let err = run_classify("/definitely/not/here.txt").unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }
}
