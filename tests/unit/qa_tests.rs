/*!
 * Unit tests for the QA rule engine against extracted segments.
 */

use xliffedit::providers::mock::MockSpeller;
use xliffedit::qa::{CheckKind, QaConfig, QaService, default_checks};
use xliffedit::{DocumentLimits, Glossary, Misspelling, XliffDocument};

use crate::common::{repetitions_xliff, sample_document};

#[test]
fn test_runChecks_onSampleDocument_shouldFlagNumberAndPunctuation() {
    let mut document = sample_document();
    let segments = document.extract_all();
    let service = QaService::new();

    let report = service.run_checks(&segments);

    // Segment 2: "Version 2.0 (beta)." vs "Version (beta)"
    assert_eq!(report.summary.get("numbers"), Some(&1));
    assert_eq!(report.summary.get("trailing_punctuation"), Some(&1));
    let number_issue = report
        .issues
        .iter()
        .find(|i| i.check == CheckKind::Numbers)
        .expect("number issue expected");
    assert_eq!(number_issue.segment_id, "2");
    assert!(number_issue.message.contains("missing: 2.0 (1 vs 0)"));
}

#[test]
fn test_runChecks_numericParity_shouldUseMultisets() {
    let mut document = sample_document();
    let mut segments = document.extract_all();
    // Duplicate the number in the target only
    segments[1].target = "Version 2.0 2.0 (beta).".to_string();

    let config = QaConfig {
        enabled: true,
        checks: vec![CheckKind::Numbers],
        spelling_timeout_secs: 10,
    };
    let report = QaService::with_config(config).run_checks(&segments);

    assert_eq!(report.issues.len(), 1);
    assert!(report.issues[0].message.contains("extra: 2.0 (1 vs 2)"));
}

#[test]
fn test_runChecks_bracketParity_shouldReportPerGlyphCounts() {
    let mut document = sample_document();
    let mut segments = document.extract_all();
    segments[1].target = "Version 2.0 (beta)).".to_string();

    let config = QaConfig {
        enabled: true,
        checks: vec![CheckKind::Brackets],
        spelling_timeout_secs: 10,
    };
    let report = QaService::with_config(config).run_checks(&segments);

    assert_eq!(report.issues.len(), 1);
    assert!(report.issues[0].message.contains("')': 1 vs 2"));
}

#[test]
fn test_runChecks_inconsistentRepetitions_shouldFlagMinorityTranslation() {
    let mut document =
        XliffDocument::from_bytes(repetitions_xliff().as_bytes(), DocumentLimits::default())
            .expect("repetitions document should parse");
    let segments = document.extract_all();

    let report = QaService::new().run_checks(&segments);

    let repetition_issues: Vec<_> = report
        .issues
        .iter()
        .filter(|i| i.check == CheckKind::InconsistentRepetitions)
        .collect();
    assert_eq!(repetition_issues.len(), 1);
    assert_eq!(repetition_issues[0].segment_id, "3");
}

#[test]
fn test_runChecks_terminology_shouldCountOccurrences() {
    let mut document = sample_document();
    let mut segments = document.extract_all();
    segments[1].source = "The server connects to the server pool.".to_string();
    segments[1].target = "Der Server verbindet sich mit dem Pool.".to_string();

    let mut glossary = Glossary::new();
    glossary.add("server", "Server");
    let config = QaConfig {
        enabled: true,
        checks: vec![CheckKind::Terminology],
        spelling_timeout_secs: 10,
    };
    let report = QaService::with_config(config)
        .with_glossary(glossary)
        .run_checks(&segments);

    assert_eq!(report.issues.len(), 1);
    assert!(report.issues[0].message.contains("appears 2 time(s)"));
}

#[test]
fn test_defaultCheckSet_shouldExcludeSpellingButIncludeTheRest() {
    let checks = default_checks();

    assert!(!checks.contains(&CheckKind::Spelling));
    for kind in [
        CheckKind::TrailingPunctuation,
        CheckKind::Numbers,
        CheckKind::DoubleSpaces,
        CheckKind::Whitespace,
        CheckKind::Brackets,
        CheckKind::Terminology,
        CheckKind::InconsistentRepetitions,
    ] {
        assert!(checks.contains(&kind), "{} missing from defaults", kind);
    }
}

#[tokio::test]
async fn test_spellingCheck_withMockBackend_shouldAttachIssuesToSegments() {
    let mut document = sample_document();
    let mut segments = document.extract_all();
    segments[1].target = "Versoin (beta)".to_string();

    let mut config = QaConfig::default();
    config.checks = vec![CheckKind::Spelling];
    let service = QaService::with_config(config);
    let speller = MockSpeller::flagging(vec![Misspelling {
        word: "Versoin".to_string(),
        suggestions: vec!["Version".to_string()],
    }]);

    let report = service
        .run_checks_with_spelling(&segments, &speller, "de-DE")
        .await;

    assert_eq!(report.summary.get("spelling"), Some(&1));
    let issue = &report.issues[0];
    assert_eq!(issue.segment_id, "2");
    assert!(issue.message.contains("Versoin"));
    assert!(issue.message.contains("Version"));
}

#[tokio::test]
async fn test_spellingCheck_withDeadBackend_shouldNotPoisonOtherChecks() {
    let mut document = sample_document();
    let segments = document.extract_all();

    let mut config = QaConfig::default();
    config.checks.push(CheckKind::Spelling);
    let service = QaService::with_config(config);
    let speller = MockSpeller::failing();

    let report = service
        .run_checks_with_spelling(&segments, &speller, "de-DE")
        .await;

    // The deterministic findings are still there, spelling adds nothing
    assert_eq!(report.summary.get("numbers"), Some(&1));
    assert_eq!(report.summary.get("spelling"), None);
}

#[tokio::test]
async fn test_spellingCheck_withSlowBackend_shouldTimeOutQuickly() {
    let mut document = sample_document();
    let segments = document.extract_all();

    let config = QaConfig {
        enabled: true,
        checks: vec![CheckKind::Spelling],
        spelling_timeout_secs: 1,
    };
    let service = QaService::with_config(config);
    let speller = MockSpeller::slow(5_000);

    let started = std::time::Instant::now();
    let report = service
        .run_checks_with_spelling(&segments, &speller, "de-DE")
        .await;

    assert!(report.issues.is_empty());
    assert!(started.elapsed() < std::time::Duration::from_secs(4));
}
