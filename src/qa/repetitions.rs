/*!
 * Cross-segment consistency check for repeated source text.
 *
 * Segments marked as repetitions of the same source should generally be
 * translated identically. Non-empty targets are grouped by exact string;
 * when more than one distinct target exists, every segment not matching
 * the majority target is flagged.
 */

use std::collections::HashMap;

use crate::document_store::Segment;
use crate::qa::checks::excerpt;
use crate::qa::service::{CheckKind, QaIssue, Severity};

/// Check segments marked as repetitions for inconsistent translations.
///
/// May flag intentional variation in rare cases; issues are warnings.
pub fn check_inconsistent_repetitions(segments: &[Segment]) -> Vec<QaIssue> {
    let mut issues = Vec::new();

    // Group repeated segments by source text, preserving first-seen order
    let mut group_order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<&Segment>> = HashMap::new();
    for segment in segments {
        if segment.repetitions > 1 && !segment.source.is_empty() {
            let entry = groups.entry(segment.source.as_str()).or_default();
            if entry.is_empty() {
                group_order.push(segment.source.as_str());
            }
            entry.push(segment);
        }
    }

    for source in group_order {
        let group = &groups[source];
        if group.len() < 2 {
            continue;
        }

        // Distinct non-empty targets, in first-seen order
        let mut target_order: Vec<&str> = Vec::new();
        let mut targets: HashMap<&str, Vec<&str>> = HashMap::new();
        for segment in group {
            if segment.target.is_empty() {
                continue;
            }
            let entry = targets.entry(segment.target.as_str()).or_default();
            if entry.is_empty() {
                target_order.push(segment.target.as_str());
            }
            entry.push(segment.segment_id.as_str());
        }

        if targets.len() < 2 {
            continue;
        }

        // Majority target wins; ties break on first appearance
        let mut ranked: Vec<(&str, &Vec<&str>)> =
            target_order.iter().map(|t| (*t, &targets[t])).collect();
        ranked.sort_by(|a, b| b.1.len().cmp(&a.1.len()));
        let (_, majority_ids) = ranked[0];

        for (target, segment_ids) in ranked.iter().skip(1) {
            for segment_id in segment_ids.iter() {
                issues.push(QaIssue {
                    segment_id: segment_id.to_string(),
                    check: CheckKind::InconsistentRepetitions,
                    severity: Severity::Warning,
                    message: format!(
                        "Repetition has different translation than {} other segment(s) with same source",
                        majority_ids.len()
                    ),
                    source_excerpt: excerpt(source, 50, false),
                    target_excerpt: excerpt(target, 50, false),
                });
            }
        }
    }

    issues
}
