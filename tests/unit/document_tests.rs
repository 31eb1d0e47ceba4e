/*!
 * Unit tests for the document store.
 */

use xliffedit::{ConfirmationLevel, DocumentError, DocumentLimits, UpdateStatus, XliffDocument};

use crate::common::{ACME_TAGGED, repetitions_xliff, sample_document, sample_xliff};

#[test]
fn test_extractAll_shouldReturnSegmentsInDocumentOrder() {
    let mut document = sample_document();

    let segments = document.extract_all();

    assert_eq!(segments.len(), 2);
    assert_eq!(segments[0].segment_id, "1");
    assert_eq!(segments[0].trans_unit_id, "tu1");
    assert_eq!(segments[1].segment_id, "2");
    assert_eq!(segments[1].trans_unit_id, "tu2");
}

#[test]
fn test_extractAll_shouldExposeCleanAndTaggedForms() {
    let mut document = sample_document();

    let segments = document.extract_all();

    assert_eq!(segments[0].source, "Acme& Events");
    assert_eq!(segments[0].source_tagged, ACME_TAGGED);
    assert_eq!(segments[0].target_tagged, ACME_TAGGED);
    assert!(segments[0].has_tags);

    assert_eq!(segments[1].source, "Version 2.0 (beta).");
    assert_eq!(segments[1].target, "Version (beta)");
    assert!(!segments[1].has_tags);
}

#[test]
fn test_extractAll_shouldExposeStatusAndLockFromSegDefs() {
    let mut document = sample_document();

    let segments = document.extract_all();

    assert_eq!(segments[0].status, Some(ConfirmationLevel::Translated));
    assert!(!segments[0].locked);
    assert_eq!(segments[1].status, Some(ConfirmationLevel::Draft));
    assert!(segments[1].locked);
}

#[test]
fn test_getSegment_shouldMatchExtractAllResult() {
    let mut document = sample_document();
    let from_extract = document.extract_all();

    for expected in &from_extract {
        let fetched = document
            .get_segment(&expected.segment_id)
            .expect("segment should be found");
        assert_eq!(fetched.segment_id, expected.segment_id);
        assert_eq!(fetched.trans_unit_id, expected.trans_unit_id);
        assert_eq!(fetched.source, expected.source);
        assert_eq!(fetched.source_tagged, expected.source_tagged);
        assert_eq!(fetched.target, expected.target);
        assert_eq!(fetched.target_tagged, expected.target_tagged);
        assert_eq!(fetched.has_tags, expected.has_tags);
        assert_eq!(fetched.status, expected.status);
        assert_eq!(fetched.locked, expected.locked);
    }
}

#[test]
fn test_extractAll_shouldComputeRepetitionCounts() {
    let mut document =
        XliffDocument::from_bytes(repetitions_xliff().as_bytes(), DocumentLimits::default())
            .expect("repetitions document should parse");

    let segments = document.extract_all();

    assert_eq!(segments.len(), 3);
    assert!(segments.iter().all(|s| s.repetitions == 3));
}

#[test]
fn test_updateSegment_withPlainSegment_shouldReplaceTextAndResetStatus() {
    let mut document = sample_document();

    let outcome = document.update_segment("2", "Version 2.0 (beta).", true);

    assert!(outcome.succeeded());
    let segment = document.get_segment("2").expect("segment should exist");
    assert_eq!(segment.target, "Version 2.0 (beta).");
    assert_eq!(segment.status, Some(ConfirmationLevel::RejectedTranslation));
}

#[test]
fn test_updateSegment_withDiscardTags_shouldDropInlineTags() {
    let mut document = sample_document();

    let outcome = document.update_segment("1", "Acme & Meetings", false);

    assert!(outcome.succeeded());
    let segment = document.get_segment("1").expect("segment should exist");
    assert_eq!(segment.target, "Acme & Meetings");
    assert_eq!(segment.target_tagged, "Acme & Meetings");
}

#[test]
fn test_updateSegment_withUnknownId_shouldReportNotFound() {
    let mut document = sample_document();

    let outcome = document.update_segment("999", "text", true);

    assert_eq!(outcome.status, UpdateStatus::NotFound);
    assert!(outcome.message.contains("'999'"));
}

#[test]
fn test_updateSegment_withOversizedText_shouldReportInputTooLarge() {
    let limits = DocumentLimits {
        max_file_size: 50 * 1024 * 1024,
        max_segment_text_size: 16,
    };
    let mut document =
        XliffDocument::from_bytes(sample_xliff().as_bytes(), limits).expect("should parse");

    let outcome = document.update_segment("2", "this text is longer than sixteen bytes", true);

    assert_eq!(outcome.status, UpdateStatus::InputTooLarge);
    // Tree untouched
    assert_eq!(
        document.get_segment("2").expect("segment").target,
        "Version (beta)"
    );
}

#[test]
fn test_updateSegment_shouldNotTouchOtherSegments() {
    let mut document = sample_document();
    let before = document.get_segment("1").expect("segment");

    document.update_segment("2", "Neue Version", true);

    let after = document.get_segment("1").expect("segment");
    assert_eq!(before, after);
}

#[test]
fn test_segmentCatalog_onceCaptured_shouldSurviveTreeMutation() {
    let mut document = sample_document();
    document.get_segment("1");
    let captured_before: Vec<String> = document
        .segment_catalog("1")
        .expect("catalog captured")
        .ids()
        .map(String::from)
        .collect();

    // Mutate the tree: strip all tags from the segment
    document.update_segment("1", "plain", false);

    let captured_after: Vec<String> = document
        .segment_catalog("1")
        .expect("catalog still present")
        .ids()
        .map(String::from)
        .collect();
    assert_eq!(captured_before, captured_after);

    // And the catalog still governs later updates
    let outcome = document.update_segment("1", "{5}Acme{/5}{6}&{/6}{7} Mtgs{/7}", true);
    assert_eq!(outcome.status, UpdateStatus::Updated);
}

#[test]
fn test_fromBytes_withMalformedXml_shouldFailFatally() {
    let result = XliffDocument::from_bytes(b"<xliff><unclosed>", DocumentLimits::default());

    assert!(matches!(result, Err(DocumentError::Malformed(_))));
}

#[test]
fn test_metadata_shouldReadFileLanguages() {
    let document = sample_document();

    let metadata = document.metadata();

    assert_eq!(metadata.source_language.as_deref(), Some("en-US"));
    assert_eq!(metadata.target_language.as_deref(), Some("de-DE"));
}

#[test]
fn test_statistics_shouldAggregateOverSegDefs() {
    let document = sample_document();

    let stats = document.statistics();

    assert_eq!(stats.total_segments, 2);
    assert_eq!(stats.status_counts.get("Translated"), Some(&1));
    assert_eq!(stats.status_counts.get("Draft"), Some(&1));
    assert_eq!(stats.locked_count, 1);
}

#[test]
fn test_isStale_onInMemoryDocument_shouldBeFalse() {
    let document = sample_document();

    assert!(!document.is_stale());
}
