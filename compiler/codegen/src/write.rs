//! Persisting rendered sources
//!
//! Each artifact is written under one [`WritePolicy`]. A write that
//! legitimately produces nothing reports [`WriteOutcome::Skipped`] instead of
//! an error so callers can carry on with the next artifact.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::Path;

use regex::Regex;

use crate::{clean_generated_source, Result};

/// How a rendered file meets an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritePolicy {
    /// Replace the file
    Overwrite,
    /// Write only when no file exists yet
    CreateIfAbsent,
    /// Append the top-level functions the existing file does not declare yet
    MergePreserving,
}

impl fmt::Display for WritePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WritePolicy::Overwrite => write!(f, "overwrite"),
            WritePolicy::CreateIfAbsent => write!(f, "create-if-absent"),
            WritePolicy::MergePreserving => write!(f, "merge"),
        }
    }
}

/// Why nothing was written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The file exists and the policy never replaces it
    AlreadyExists,
    /// Every rendered function is already declared in the file
    NothingToMerge,
    /// The renderer produced no text
    NothingToRender,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::AlreadyExists => write!(f, "file already exists"),
            SkipReason::NothingToMerge => write!(f, "nothing new to merge"),
            SkipReason::NothingToRender => write!(f, "nothing to render"),
        }
    }
}

/// Result of one successful write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The whole file was written
    Written,
    /// Functions appended to an existing file
    Merged {
        /// Names of the appended functions, `Type.Method` for methods
        added: Vec<String>,
    },
    /// Nothing was done
    Skipped(SkipReason),
}

impl WriteOutcome {
    /// Whether this is the "nothing to do" outcome
    pub fn is_skipped(&self) -> bool { matches!(self, WriteOutcome::Skipped(_)) }
}

impl fmt::Display for WriteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteOutcome::Written => write!(f, "written"),
            WriteOutcome::Merged { added } => write!(f, "merged {}", added.join(", ")),
            WriteOutcome::Skipped(reason) => write!(f, "skipped: {}", reason),
        }
    }
}

/// Write `source` to `path` under `policy`, creating parent directories
pub fn write_source(path: &Path, source: &str, policy: WritePolicy) -> Result<WriteOutcome> {
    let cleaned = clean_generated_source(source);
    if cleaned.is_empty() {
        return Ok(WriteOutcome::Skipped(SkipReason::NothingToRender));
    }

    let exists = path.exists();
    match policy {
        WritePolicy::CreateIfAbsent if exists => {
            Ok(WriteOutcome::Skipped(SkipReason::AlreadyExists))
        }
        WritePolicy::MergePreserving if exists => merge_into(path, &cleaned),
        _ => {
            write_file(path, &cleaned)?;
            Ok(WriteOutcome::Written)
        }
    }
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content.as_bytes())?;
    Ok(())
}

fn merge_into(path: &Path, rendered: &str) -> Result<WriteOutcome> {
    let existing = fs::read_to_string(path)?;
    let matcher = FuncMatcher::new()?;
    let mut declared: BTreeSet<String> = matcher.declared(&existing).collect();

    let mut added = Vec::new();
    let mut appended = String::new();
    for block in matcher.blocks(rendered) {
        if declared.insert(block.key.clone()) {
            appended.push('\n');
            appended.push_str(&block.text);
            added.push(block.key);
        }
    }

    if added.is_empty() {
        return Ok(WriteOutcome::Skipped(SkipReason::NothingToMerge));
    }

    let mut merged = existing.trim_end().to_string();
    merged.push('\n');
    merged.push_str(&appended);
    write_file(path, &clean_generated_source(&merged))?;
    Ok(WriteOutcome::Merged { added })
}

/// A top-level function with its leading doc comment
struct FuncBlock {
    key: String,
    text: String,
}

struct FuncMatcher {
    signature: Regex,
}

impl FuncMatcher {
    fn new() -> Result<Self> {
        Ok(Self {
            signature: Regex::new(r"^func\s+(?:\(\s*(?:\w+\s+)?\*?(\w+)\s*\)\s*)?(\w+)")?,
        })
    }

    fn key(&self, line: &str) -> Option<String> {
        let caps = self.signature.captures(line)?;
        let name = caps.get(2)?.as_str();
        Some(match caps.get(1) {
            Some(receiver) => format!("{}.{}", receiver.as_str(), name),
            None => name.to_string(),
        })
    }

    fn declared<'s>(&'s self, source: &'s str) -> impl Iterator<Item = String> + 's {
        source.lines().filter_map(|line| self.key(line))
    }

    /// Split Go source into its top-level functions; a function ends at the
    /// first unindented closing brace
    fn blocks(&self, source: &str) -> Vec<FuncBlock> {
        let lines: Vec<&str> = source.lines().collect();
        let mut blocks = Vec::new();
        let mut i = 0;
        while i < lines.len() {
            let Some(key) = self.key(lines[i]) else {
                i += 1;
                continue;
            };
            let mut start = i;
            while start > 0 && lines[start - 1].starts_with("//") {
                start -= 1;
            }
            let mut end = i;
            if !lines[i].trim_end().ends_with('}') {
                while end + 1 < lines.len() && lines[end] != "}" {
                    end += 1;
                }
            }
            blocks.push(FuncBlock { key, text: format!("{}\n", lines[start..=end].join("\n")) });
            i = end + 1;
        }
        blocks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_keep_doc_comments_and_receivers() {
        let source = "package x\n\n// A does a.\nfunc A() int {\n\treturn 1\n}\n\n\
                      func (s *svc) B() {}\n\nfunc C(\n\tx int,\n) {\n}\n";
        let matcher = FuncMatcher::new().expect("pattern compiles");
        let blocks = matcher.blocks(source);
        let keys: Vec<_> = blocks.iter().map(|b| b.key.as_str()).collect();
        assert_eq!(keys, vec!["A", "svc.B", "C"]);
        assert_eq!(blocks[0].text, "// A does a.\nfunc A() int {\n\treturn 1\n}\n");
        assert_eq!(blocks[1].text, "func (s *svc) B() {}\n");
    }
}
