/*!
 * Save/reload fidelity tests: header bytes, atomicity, backups.
 */

use xliffedit::XliffDocument;

use crate::common::{sample_xliff, write_and_open};

#[test]
fn test_saveWithoutEdits_thenReload_shouldProduceIdenticalExtraction() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (path, mut document) = write_and_open(dir.path());
    let before = document.extract_all();

    document.save(None).expect("save should succeed");

    let mut reloaded = XliffDocument::open(&path).expect("reload");
    let after = reloaded.extract_all();
    assert_eq!(before, after);
}

#[test]
fn test_save_shouldPreserveBomAndDeclarationBytes() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (path, mut document) = write_and_open(dir.path());
    assert!(document.header().has_bom);

    document.save(None).expect("save should succeed");

    let bytes = std::fs::read(&path).expect("read saved file");
    assert!(bytes.starts_with(&[0xEF, 0xBB, 0xBF]), "BOM must survive");
    let text = String::from_utf8(bytes[3..].to_vec()).expect("utf-8");
    assert!(
        text.starts_with(r#"<?xml version="1.0" encoding="utf-8"?>"#),
        "declaration must survive byte-for-byte"
    );

    let reloaded = XliffDocument::open(&path).expect("reload");
    assert_eq!(reloaded.header(), document.header());
}

#[test]
fn test_save_withoutBom_shouldNotInventOne() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("plain.sdlxliff");
    std::fs::write(&path, sample_xliff()).expect("write");
    let mut document = XliffDocument::open(&path).expect("open");
    assert!(!document.header().has_bom);

    document.save(None).expect("save");

    let bytes = std::fs::read(&path).expect("read");
    assert!(!bytes.starts_with(&[0xEF, 0xBB, 0xBF]));
}

#[test]
fn test_save_toNewPath_shouldLeaveOriginalUntouched() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (path, mut document) = write_and_open(dir.path());
    let original_bytes = std::fs::read(&path).expect("read original");

    document.update_segment("2", "Neue Version", true);
    let copy_path = dir.path().join("copy.sdlxliff");
    document.save(Some(&copy_path)).expect("save copy");

    assert_eq!(std::fs::read(&path).expect("reread"), original_bytes);
    let mut copy = XliffDocument::open(&copy_path).expect("open copy");
    assert_eq!(copy.get_segment("2").expect("segment").target, "Neue Version");
}

#[test]
fn test_saveWithBackup_shouldKeepPriorFileAsSibling() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (path, document) = write_and_open(dir.path());
    let mut document = document.with_backup_on_save(true);
    let original_bytes = std::fs::read(&path).expect("read original");

    document.update_segment("2", "Neue Version", true);
    document.save(None).expect("save");

    let backups: Vec<_> = std::fs::read_dir(dir.path())
        .expect("read dir")
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().ends_with(".bak"))
        .collect();
    assert_eq!(backups.len(), 1, "exactly one backup expected");
    assert_eq!(
        std::fs::read(backups[0].path()).expect("read backup"),
        original_bytes
    );
}

#[test]
fn test_isStale_afterExternalModification_shouldDetectIt() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (path, document) = write_and_open(dir.path());
    assert!(!document.is_stale());

    // Simulate another process rewriting the file
    let mut bytes = std::fs::read(&path).expect("read");
    bytes.extend_from_slice(b" ");
    std::fs::write(&path, bytes).expect("rewrite");
    let future = std::time::SystemTime::now() + std::time::Duration::from_secs(5);
    let file = std::fs::OpenOptions::new()
        .write(true)
        .open(&path)
        .expect("open for touch");
    file.set_modified(future).expect("bump mtime");

    assert!(document.is_stale());
}
