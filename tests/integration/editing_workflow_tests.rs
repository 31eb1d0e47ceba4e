/*!
 * End-to-end segment editing workflows: read, edit, validate, rebuild.
 */

use xliffedit::{UpdateStatus, XliffDocument};

use crate::common::{ACME_TAGGED, sample_document, write_and_open};

#[test]
fn test_updateWithPreservedTags_shouldSucceedAndRestoreStructure() {
    let mut document = sample_document();
    let before = document.get_segment("1").expect("segment");
    assert_eq!(before.target_tagged, ACME_TAGGED);

    let outcome = document.update_segment("1", "{5}Acme{/5}{6}&{/6}{7} Meetings{/7}", true);

    assert_eq!(outcome.status, UpdateStatus::Updated);
    assert!(outcome.warnings.is_empty());

    let after = document.get_segment("1").expect("segment");
    assert_eq!(after.target_tagged, "{5}Acme{/5}{6}&{/6}{7} Meetings{/7}");
    assert_eq!(after.target, "Acme& Meetings");
}

#[test]
fn test_updateWithoutPlaceholders_onTaggedSegment_shouldRejectAndEchoCanonicalForm() {
    let mut document = sample_document();
    document.get_segment("1");

    let outcome = document.update_segment("1", "Acme & Meetings", true);

    assert_eq!(outcome.status, UpdateStatus::TagIntegrityViolation);
    assert!(
        outcome.message.contains(ACME_TAGGED),
        "message should echo the canonical tagged form: {}",
        outcome.message
    );

    // Document left unmodified
    let segment = document.get_segment("1").expect("segment");
    assert_eq!(segment.target_tagged, ACME_TAGGED);
}

#[test]
fn test_updateWithMissingTag_shouldRejectWithValidationDetails() {
    let mut document = sample_document();

    let outcome = document.update_segment("1", "{5}Acme{/5}{6}&{/6}", true);

    assert_eq!(outcome.status, UpdateStatus::TagIntegrityViolation);
    let validation = outcome.validation.expect("validation details expected");
    assert_eq!(validation.missing_tags, vec!["7".to_string()]);
    assert!(outcome.message.contains("Missing tags"));
    assert!(outcome.message.contains(ACME_TAGGED));
}

#[test]
fn test_updateWithPermutedTags_shouldSucceedWithWarningsAndCorrectNesting() {
    let mut document = sample_document();

    let outcome = document.update_segment("1", "{7} Meetings{/7}{5}Acme{/5}{6}&{/6}", true);

    assert_eq!(outcome.status, UpdateStatus::Updated);
    assert!(!outcome.warnings.is_empty());
    assert!(outcome.warnings[0].contains("Tag order changed"));

    let segment = document.get_segment("1").expect("segment");
    assert_eq!(segment.target_tagged, "{7} Meetings{/7}{5}Acme{/5}{6}&{/6}");
    assert_eq!(segment.target, "MeetingsAcme&");
}

#[test]
fn test_editedDocument_afterSaveAndReload_shouldPersistTheEdit() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (path, mut document) = write_and_open(dir.path());

    let outcome = document.update_segment("1", "{5}Acme{/5}{6}&{/6}{7} Meetings{/7}", true);
    assert!(outcome.succeeded());
    document.save(None).expect("save should succeed");

    let mut reloaded = XliffDocument::open(&path).expect("reload");
    let segment = reloaded.get_segment("1").expect("segment");
    assert_eq!(segment.target_tagged, "{5}Acme{/5}{6}&{/6}{7} Meetings{/7}");
    assert_eq!(
        segment.status,
        Some(xliffedit::ConfirmationLevel::RejectedTranslation)
    );
}

#[test]
fn test_updateTwice_shouldValidateAgainstFirstCapturedCatalog() {
    let mut document = sample_document();

    let first = document.update_segment("1", "{5}A{/5}{6}&{/6}{7}E{/7}", true);
    assert!(first.succeeded());

    // The same inventory applies after the first mutation
    let second = document.update_segment("1", "{5}B{/5}{6}+{/6}{7}F{/7}", true);
    assert!(second.succeeded());

    let rejected = document.update_segment("1", "{5}C{/5}", true);
    assert_eq!(rejected.status, UpdateStatus::TagIntegrityViolation);
}
