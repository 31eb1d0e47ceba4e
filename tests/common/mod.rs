/*!
 * Common test utilities: sample bilingual documents and helpers.
 */

use std::path::{Path, PathBuf};

use xliffedit::{DocumentLimits, XliffDocument};

/// Canonical tagged form of the first sample segment
pub const ACME_TAGGED: &str = "{5}Acme{/5}{6}&{/6}{7} Events{/7}";

/// A small SDLXLIFF-style document with two translation units: one with
/// inline tags, one plain with a deliberate QA problem (missing number,
/// missing trailing punctuation)
pub fn sample_xliff() -> String {
    concat!(
        r#"<?xml version="1.0" encoding="utf-8"?>"#,
        r#"<xliff xmlns="urn:oasis:names:tc:xliff:document:1.2" xmlns:sdl="http://sdl.com/FileTypes/SdlXliff/1.0" version="1.2">"#,
        r#"<file original="demo.docx" source-language="en-US" target-language="de-DE">"#,
        r#"<body>"#,
        r#"<trans-unit id="tu1">"#,
        r#"<source>Acme &amp; Events</source>"#,
        r#"<seg-source><mrk mtype="seg" mid="1"><g id="5">Acme</g><g id="6">&amp;</g><g id="7"> Events</g></mrk></seg-source>"#,
        r#"<target><mrk mtype="seg" mid="1"><g id="5">Acme</g><g id="6">&amp;</g><g id="7"> Events</g></mrk></target>"#,
        r#"<sdl:seg-defs><sdl:seg id="1" conf="Translated"/></sdl:seg-defs>"#,
        r#"</trans-unit>"#,
        r#"<trans-unit id="tu2">"#,
        r#"<source>Version 2.0 (beta).</source>"#,
        r#"<seg-source><mrk mtype="seg" mid="2">Version 2.0 (beta).</mrk></seg-source>"#,
        r#"<target><mrk mtype="seg" mid="2">Version (beta)</mrk></target>"#,
        r#"<sdl:seg-defs><sdl:seg id="2" conf="Draft" locked="true"/></sdl:seg-defs>"#,
        r#"</trans-unit>"#,
        r#"</body>"#,
        r#"</file>"#,
        r#"</xliff>"#
    )
    .to_string()
}

/// The sample document prefixed with a UTF-8 BOM
pub fn sample_xliff_with_bom() -> Vec<u8> {
    let mut bytes = vec![0xEF, 0xBB, 0xBF];
    bytes.extend_from_slice(sample_xliff().as_bytes());
    bytes
}

/// A document whose source text repeats across three segments, with one
/// divergent translation
pub fn repetitions_xliff() -> String {
    let unit = |id: &str, mid: &str, target: &str| {
        format!(
            concat!(
                r#"<trans-unit id="{id}">"#,
                r#"<source>Save</source>"#,
                r#"<seg-source><mrk mtype="seg" mid="{mid}">Save</mrk></seg-source>"#,
                r#"<target><mrk mtype="seg" mid="{mid}">{target}</mrk></target>"#,
                r#"<sdl:seg-defs><sdl:seg id="{mid}" conf="Translated"/></sdl:seg-defs>"#,
                r#"</trans-unit>"#
            ),
            id = id,
            mid = mid,
            target = target
        )
    };
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="utf-8"?>"#,
            r#"<xliff xmlns="urn:oasis:names:tc:xliff:document:1.2" xmlns:sdl="http://sdl.com/FileTypes/SdlXliff/1.0" version="1.2">"#,
            r#"<file original="ui.docx" source-language="en-US" target-language="de-DE"><body>{u1}{u2}{u3}</body></file></xliff>"#
        ),
        u1 = unit("tu1", "1", "Speichern"),
        u2 = unit("tu2", "2", "Speichern"),
        u3 = unit("tu3", "3", "Sichern"),
    )
}

/// Parse the sample document from bytes
pub fn sample_document() -> XliffDocument {
    XliffDocument::from_bytes(sample_xliff().as_bytes(), DocumentLimits::default())
        .expect("sample document should parse")
}

/// Write the sample document into a directory and open it from there
pub fn write_and_open(dir: &Path) -> (PathBuf, XliffDocument) {
    let path = dir.join("sample.sdlxliff");
    std::fs::write(&path, sample_xliff_with_bom()).expect("write sample");
    let document = XliffDocument::open(&path).expect("open sample");
    (path, document)
}
