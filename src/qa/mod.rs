/*!
 * QA rule engine for extracted segment pairs.
 *
 * A registry of independent, pure, stateless checks over
 * (segment_id, source, target), plus an aggregator that runs a selected
 * subset and returns per-check counts with the full issue list.
 *
 * # Architecture
 *
 * - `checks`: per-segment predicates (punctuation, numbers, spaces,
 *   whitespace, brackets)
 * - `terminology`: glossary-driven term coverage
 * - `repetitions`: cross-segment consistency of repeated sources
 * - `service`: orchestrates all checks, including the opt-in spelling
 *   check against an external backend
 *
 * The engine consumes document store output and never touches the tree.
 */

pub mod checks;
pub mod repetitions;
pub mod service;
pub mod terminology;

// Re-export main types
pub use repetitions::check_inconsistent_repetitions;
pub use service::{CheckKind, QaConfig, QaIssue, QaReport, QaService, Severity, default_checks};
pub use terminology::{Glossary, GlossaryEntry};
