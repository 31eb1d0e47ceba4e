/*!
 * QA service that orchestrates all checks.
 *
 * This module provides a unified interface for running a selected subset
 * of QA checks over extracted segments and aggregating the results into
 * a report with per-check counts.
 *
 * The spelling check is opt-in and excluded from the default set: it
 * talks to an external backend and must never make the rest of the suite
 * unusable, so it runs under a short timeout and degrades to reporting
 * no issues on any failure.
 */

use std::collections::HashMap;
use std::time::Duration;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::document_store::Segment;
use crate::providers::SpellingProvider;
use crate::qa::checks;
use crate::qa::repetitions::check_inconsistent_repetitions;
use crate::qa::terminology::{Glossary, check_terminology};

/// The kinds of QA checks this engine knows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    /// Trailing punctuation parity between source and target
    TrailingPunctuation,
    /// Numeric token parity (multiset of per-value counts)
    Numbers,
    /// Consecutive spaces in the target
    DoubleSpaces,
    /// Leading/trailing whitespace parity
    Whitespace,
    /// Per-glyph bracket count parity
    Brackets,
    /// Glossary term coverage
    Terminology,
    /// Identical repeated sources translated differently
    InconsistentRepetitions,
    /// External spell checking (opt-in)
    Spelling,
}

impl CheckKind {
    /// Stable identifier used in reports and configuration
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TrailingPunctuation => "trailing_punctuation",
            Self::Numbers => "numbers",
            Self::DoubleSpaces => "double_spaces",
            Self::Whitespace => "whitespace",
            Self::Brackets => "brackets",
            Self::Terminology => "terminology",
            Self::InconsistentRepetitions => "inconsistent_repetitions",
            Self::Spelling => "spelling",
        }
    }
}

impl std::fmt::Display for CheckKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for CheckKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "trailing_punctuation" => Ok(Self::TrailingPunctuation),
            "numbers" => Ok(Self::Numbers),
            "double_spaces" => Ok(Self::DoubleSpaces),
            "whitespace" => Ok(Self::Whitespace),
            "brackets" => Ok(Self::Brackets),
            "terminology" => Ok(Self::Terminology),
            "inconsistent_repetitions" => Ok(Self::InconsistentRepetitions),
            "spelling" => Ok(Self::Spelling),
            other => Err(anyhow::anyhow!("Unknown QA check: {}", other)),
        }
    }
}

/// Severity of a QA issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Likely problem worth reviewing
    Warning,
    /// Definite problem
    Error,
}

/// A single QA issue found in a segment
#[derive(Debug, Clone, Serialize)]
pub struct QaIssue {
    /// Segment the issue belongs to
    pub segment_id: String,
    /// Which check found it
    pub check: CheckKind,
    /// How severe it is
    pub severity: Severity,
    /// Description of the issue
    pub message: String,
    /// Short source excerpt for display
    pub source_excerpt: String,
    /// Short target excerpt for display
    pub target_excerpt: String,
}

/// Complete QA report for a document
#[derive(Debug, Clone, Serialize)]
pub struct QaReport {
    /// Number of segments offered to the engine
    pub total_segments: usize,
    /// Number of segments actually checked
    pub segments_checked: usize,
    /// Number of segments with at least one issue
    pub segments_with_issues: usize,
    /// Every issue found
    pub issues: Vec<QaIssue>,
    /// Issue counts per check identifier
    pub summary: HashMap<String, usize>,
}

impl QaReport {
    /// One-line human-readable summary
    pub fn summary_line(&self) -> String {
        format!(
            "QA: {}/{} segments with issues, {} issue(s) total",
            self.segments_with_issues,
            self.total_segments,
            self.issues.len()
        )
    }
}

/// Configuration for the QA service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QaConfig {
    /// Whether QA is enabled at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Which checks to run
    #[serde(default = "default_checks")]
    pub checks: Vec<CheckKind>,

    /// Timeout for each spelling backend call, in seconds
    #[serde(default = "default_spelling_timeout_secs")]
    pub spelling_timeout_secs: u64,
}

fn default_true() -> bool {
    true
}

fn default_spelling_timeout_secs() -> u64 {
    10
}

/// The default check set. Spelling is opt-in only: it depends on an
/// external backend.
pub fn default_checks() -> Vec<CheckKind> {
    vec![
        CheckKind::TrailingPunctuation,
        CheckKind::Numbers,
        CheckKind::DoubleSpaces,
        CheckKind::Whitespace,
        CheckKind::Brackets,
        CheckKind::Terminology,
        CheckKind::InconsistentRepetitions,
    ]
}

impl Default for QaConfig {
    fn default() -> Self {
        QaConfig {
            enabled: true,
            checks: default_checks(),
            spelling_timeout_secs: default_spelling_timeout_secs(),
        }
    }
}

/// QA service for extracted segment pairs
#[derive(Debug, Clone, Default)]
pub struct QaService {
    config: QaConfig,
    glossary: Glossary,
}

impl QaService {
    /// Create a service with the default configuration and no glossary
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a service with a custom configuration
    pub fn with_config(config: QaConfig) -> Self {
        QaService {
            config,
            glossary: Glossary::default(),
        }
    }

    /// Attach a glossary for the terminology check
    pub fn with_glossary(mut self, glossary: Glossary) -> Self {
        self.glossary = glossary;
        self
    }

    /// Whether QA is enabled
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    fn check_enabled(&self, kind: CheckKind) -> bool {
        self.config.enabled && self.config.checks.contains(&kind)
    }

    /// Run the configured synchronous checks over all segments.
    ///
    /// The spelling check never runs here even if configured; use
    /// `run_checks_with_spelling` to include it.
    pub fn run_checks(&self, segments: &[Segment]) -> QaReport {
        let mut issues: Vec<QaIssue> = Vec::new();

        if self.config.enabled {
            for segment in segments {
                let id = segment.segment_id.as_str();
                let source = segment.source.as_str();
                let target = segment.target.as_str();

                if self.check_enabled(CheckKind::TrailingPunctuation) {
                    issues.extend(checks::check_trailing_punctuation(id, source, target));
                }
                if self.check_enabled(CheckKind::Numbers) {
                    issues.extend(checks::check_numbers(id, source, target));
                }
                if self.check_enabled(CheckKind::DoubleSpaces) {
                    issues.extend(checks::check_double_spaces(id, target));
                }
                if self.check_enabled(CheckKind::Whitespace) {
                    issues.extend(checks::check_whitespace(id, source, target));
                }
                if self.check_enabled(CheckKind::Brackets) {
                    issues.extend(checks::check_brackets(id, source, target));
                }
                if self.check_enabled(CheckKind::Terminology) && !self.glossary.is_empty() {
                    issues.extend(check_terminology(id, source, target, &self.glossary));
                }
            }

            if self.check_enabled(CheckKind::InconsistentRepetitions) {
                issues.extend(check_inconsistent_repetitions(segments));
            }
        }

        let report = build_report(segments.len(), issues);
        debug!("{}", report.summary_line());
        report
    }

    /// Run the configured checks including the opt-in spelling check.
    ///
    /// Each backend call is wrapped in a short timeout. On any failure or
    /// timeout the spelling pass stops and contributes no further issues;
    /// the rest of the report is unaffected.
    pub async fn run_checks_with_spelling(
        &self,
        segments: &[Segment],
        provider: &dyn SpellingProvider,
        language: &str,
    ) -> QaReport {
        let mut report = self.run_checks(segments);
        if !self.check_enabled(CheckKind::Spelling) {
            return report;
        }

        let timeout = Duration::from_secs(self.config.spelling_timeout_secs.max(1));
        let mut spelling_issues: Vec<QaIssue> = Vec::new();

        for segment in segments {
            if segment.target.is_empty() {
                continue;
            }

            let outcome =
                tokio::time::timeout(timeout, provider.check(&segment.target, language)).await;
            match outcome {
                Ok(Ok(misspellings)) => {
                    for misspelling in misspellings {
                        let suggestions = if misspelling.suggestions.is_empty() {
                            String::new()
                        } else {
                            format!(" (suggestions: {})", misspelling.suggestions.join(", "))
                        };
                        spelling_issues.push(QaIssue {
                            segment_id: segment.segment_id.clone(),
                            check: CheckKind::Spelling,
                            severity: Severity::Warning,
                            message: format!(
                                "Possible misspelling '{}'{}",
                                misspelling.word, suggestions
                            ),
                            source_excerpt: String::new(),
                            target_excerpt: checks::excerpt(&segment.target, 50, false),
                        });
                    }
                }
                Ok(Err(error)) => {
                    warn!("Spelling backend failed, skipping spelling check: {}", error);
                    break;
                }
                Err(_) => {
                    warn!(
                        "Spelling backend timed out after {}s, skipping spelling check",
                        timeout.as_secs()
                    );
                    break;
                }
            }
        }

        if !spelling_issues.is_empty() {
            report.issues.extend(spelling_issues);
            report = build_report(report.total_segments, report.issues);
        }
        report
    }
}

fn build_report(total_segments: usize, issues: Vec<QaIssue>) -> QaReport {
    let mut summary: HashMap<String, usize> = HashMap::new();
    let mut flagged: Vec<&str> = Vec::new();
    for issue in &issues {
        *summary.entry(issue.check.as_str().to_string()).or_insert(0) += 1;
        flagged.push(issue.segment_id.as_str());
    }
    flagged.sort_unstable();
    flagged.dedup();
    let segments_with_issues = flagged.len();

    QaReport {
        total_segments,
        segments_checked: total_segments,
        segments_with_issues,
        issues,
        summary,
    }
}
