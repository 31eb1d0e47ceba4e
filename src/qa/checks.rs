/*!
 * Per-segment QA checks.
 *
 * Each check is a pure, stateless predicate over a (source, target) pair
 * (or the target alone) producing at most one issue. Cross-segment checks
 * live in `repetitions`; glossary checks in `terminology`.
 */

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::qa::service::{CheckKind, QaIssue, Severity};

/// Trailing punctuation across scripts (Latin, Arabic, CJK)
static TRAILING_PUNCT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[.!?:;،。！？：；]+$").expect("Invalid trailing punctuation regex")
});

/// Integer and decimal tokens, accepting '.' or ',' as decimal separator
static NUMBER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+(?:[.,]\d+)?").expect("Invalid number regex"));

/// Two or more consecutive spaces
static DOUBLE_SPACE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ ]{2,}").expect("Invalid double space regex"));

/// Bracket glyphs counted independently per side (ASCII + full-width CJK)
const BRACKET_GLYPHS: &[char] = &[
    '(', ')', '[', ']', '{', '}', '（', '）', '【', '】', '「', '」', '『', '』',
];

/// Create a short excerpt from text for display in QA issues
pub(crate) fn excerpt(text: &str, max_len: usize, tail: bool) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_len {
        return text.to_string();
    }
    if tail {
        let kept: String = chars[chars.len() - (max_len - 3)..].iter().collect();
        format!("...{}", kept)
    } else {
        let kept: String = chars[..max_len - 3].iter().collect();
        format!("{}...", kept)
    }
}

/// Flag when exactly one of source/target ends in recognized punctuation
pub fn check_trailing_punctuation(segment_id: &str, source: &str, target: &str) -> Option<QaIssue> {
    if source.is_empty() || target.is_empty() {
        return None;
    }

    let source_punct = TRAILING_PUNCT_REGEX.find(source);
    let target_punct = TRAILING_PUNCT_REGEX.find(target);

    if source_punct.is_some() == target_punct.is_some() {
        return None;
    }

    let message = match source_punct {
        Some(found) => format!("Source ends with '{}' but target does not", found.as_str()),
        None => match target_punct {
            Some(found) => format!("Target ends with '{}' but source does not", found.as_str()),
            None => return None,
        },
    };

    Some(QaIssue {
        segment_id: segment_id.to_string(),
        check: CheckKind::TrailingPunctuation,
        severity: Severity::Warning,
        message,
        source_excerpt: excerpt(source, 50, true),
        target_excerpt: excerpt(target, 50, true),
    })
}

fn number_counts(text: &str) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for found in NUMBER_REGEX.find_iter(text) {
        *counts.entry(found.as_str().to_string()).or_insert(0) += 1;
    }
    counts
}

/// Flag when numeric tokens differ between source and target.
///
/// Numbers are compared as a multiset of per-value counts, so a dropped
/// or duplicated occurrence of the same value is caught ("50 50" vs "50").
pub fn check_numbers(segment_id: &str, source: &str, target: &str) -> Option<QaIssue> {
    if source.is_empty() || target.is_empty() {
        return None;
    }

    let source_counts = number_counts(source);
    let target_counts = number_counts(target);
    if source_counts == target_counts {
        return None;
    }

    let mut values: Vec<&String> = source_counts.keys().chain(target_counts.keys()).collect();
    values.sort();
    values.dedup();

    let mut missing = Vec::new();
    let mut extra = Vec::new();
    for value in values {
        let in_source = source_counts.get(value).copied().unwrap_or(0);
        let in_target = target_counts.get(value).copied().unwrap_or(0);
        if in_source > in_target {
            missing.push(format!("{} ({} vs {})", value, in_source, in_target));
        } else if in_target > in_source {
            extra.push(format!("{} ({} vs {})", value, in_source, in_target));
        }
    }

    let mut parts = Vec::new();
    if !missing.is_empty() {
        parts.push(format!("missing: {}", missing.join(", ")));
    }
    if !extra.is_empty() {
        parts.push(format!("extra: {}", extra.join(", ")));
    }

    Some(QaIssue {
        segment_id: segment_id.to_string(),
        check: CheckKind::Numbers,
        severity: Severity::Warning,
        message: format!("Number mismatch - {}", parts.join("; ")),
        source_excerpt: excerpt(source, 50, false),
        target_excerpt: excerpt(target, 50, false),
    })
}

/// Flag consecutive spaces in the target only (source double-spacing is
/// assumed intentional)
pub fn check_double_spaces(segment_id: &str, target: &str) -> Option<QaIssue> {
    if target.is_empty() {
        return None;
    }

    let found = DOUBLE_SPACE_REGEX.find(target)?;
    let chars: Vec<char> = target.chars().collect();
    let char_pos = target[..found.start()].chars().count();
    let context_start = char_pos.saturating_sub(10);
    let context_end = (char_pos + 15).min(chars.len());
    let context: String = chars[context_start..context_end].iter().collect();

    Some(QaIssue {
        segment_id: segment_id.to_string(),
        check: CheckKind::DoubleSpaces,
        severity: Severity::Warning,
        message: "Target contains double spaces".to_string(),
        source_excerpt: String::new(),
        target_excerpt: format!("...{}...", context),
    })
}

/// Flag when leading or trailing whitespace presence differs between
/// source and target. Important for UI strings where spacing affects
/// layout.
pub fn check_whitespace(segment_id: &str, source: &str, target: &str) -> Option<QaIssue> {
    if source.is_empty() && target.is_empty() {
        return None;
    }

    let source_leading = source != source.trim_start();
    let source_trailing = source != source.trim_end();
    let target_leading = target != target.trim_start();
    let target_trailing = target != target.trim_end();

    let mut findings = Vec::new();
    if source_leading != target_leading {
        if source_leading {
            findings.push("source has leading whitespace, target doesn't");
        } else {
            findings.push("target has leading whitespace, source doesn't");
        }
    }
    if source_trailing != target_trailing {
        if source_trailing {
            findings.push("source has trailing whitespace, target doesn't");
        } else {
            findings.push("target has trailing whitespace, source doesn't");
        }
    }

    if findings.is_empty() {
        return None;
    }

    Some(QaIssue {
        segment_id: segment_id.to_string(),
        check: CheckKind::Whitespace,
        severity: Severity::Warning,
        message: format!("Whitespace mismatch: {}", findings.join("; ")),
        source_excerpt: excerpt(source, 50, false),
        target_excerpt: excerpt(target, 50, false),
    })
}

fn bracket_counts(text: &str) -> HashMap<char, usize> {
    let mut counts = HashMap::new();
    for c in text.chars() {
        if BRACKET_GLYPHS.contains(&c) {
            *counts.entry(c).or_insert(0) += 1;
        }
    }
    counts
}

/// Flag per-glyph bracket count mismatches between source and target
pub fn check_brackets(segment_id: &str, source: &str, target: &str) -> Option<QaIssue> {
    if source.is_empty() || target.is_empty() {
        return None;
    }

    let source_counts = bracket_counts(source);
    let target_counts = bracket_counts(target);
    if source_counts == target_counts {
        return None;
    }

    let mut glyphs: Vec<&char> = source_counts.keys().chain(target_counts.keys()).collect();
    glyphs.sort();
    glyphs.dedup();

    let mut mismatches = Vec::new();
    for glyph in glyphs {
        let in_source = source_counts.get(glyph).copied().unwrap_or(0);
        let in_target = target_counts.get(glyph).copied().unwrap_or(0);
        if in_source != in_target {
            mismatches.push(format!("'{}': {} vs {}", glyph, in_source, in_target));
        }
    }

    Some(QaIssue {
        segment_id: segment_id.to_string(),
        check: CheckKind::Brackets,
        severity: Severity::Warning,
        message: format!("Bracket count mismatch - {}", mismatches.join(", ")),
        source_excerpt: excerpt(source, 50, false),
        target_excerpt: excerpt(target, 50, false),
    })
}
