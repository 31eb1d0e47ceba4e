/*!
 * Terminology check backed by a user-supplied glossary.
 *
 * For each glossary pair, every occurrence of the source term must be
 * matched by at least as many occurrences of the target term in the
 * translation. Matching is case-sensitive substring counting.
 */

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::qa::checks::excerpt;
use crate::qa::service::{CheckKind, QaIssue, Severity};

/// One glossary pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlossaryEntry {
    /// Term as it appears in the source language
    pub source_term: String,
    /// Required rendering in the target language
    pub target_term: String,
}

/// A terminology glossary
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Glossary {
    /// Glossary pairs, checked independently
    pub entries: Vec<GlossaryEntry>,
}

impl Glossary {
    /// Create an empty glossary
    pub fn new() -> Self {
        Glossary::default()
    }

    /// Add a pair to the glossary
    pub fn add(&mut self, source_term: impl Into<String>, target_term: impl Into<String>) {
        self.entries.push(GlossaryEntry {
            source_term: source_term.into(),
            target_term: target_term.into(),
        });
    }

    /// Whether the glossary holds no pairs
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of pairs
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Load a glossary from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read glossary file: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse glossary file: {}", path.display()))
    }
}

/// Check one segment pair against the glossary
pub fn check_terminology(
    segment_id: &str,
    source: &str,
    target: &str,
    glossary: &Glossary,
) -> Vec<QaIssue> {
    if source.is_empty() || target.is_empty() {
        return Vec::new();
    }

    let mut issues = Vec::new();
    for entry in &glossary.entries {
        if entry.source_term.is_empty() || entry.target_term.is_empty() {
            continue;
        }
        let expected = source.matches(entry.source_term.as_str()).count();
        if expected == 0 {
            continue;
        }
        let found = target.matches(entry.target_term.as_str()).count();
        if found < expected {
            issues.push(QaIssue {
                segment_id: segment_id.to_string(),
                check: CheckKind::Terminology,
                severity: Severity::Warning,
                message: format!(
                    "Term '{}' appears {} time(s) in source but '{}' appears only {} time(s) in target",
                    entry.source_term, expected, entry.target_term, found
                ),
                source_excerpt: excerpt(source, 50, false),
                target_excerpt: excerpt(target, 50, false),
            });
        }
    }
    issues
}
