/*!
 * Unit tests for the segment codec: walking, decoding, rebuilding.
 */

use xliffedit::codec::{decode, encode, rebuild, walk_segment};
use xliffedit::xml_tree::parse_document;

use crate::common::ACME_TAGGED;

fn parse_root(xml: &str) -> xliffedit::xml_tree::Element {
    let (root, _) = parse_document(xml.as_bytes()).expect("fixture should parse");
    root
}

/// Round trip: walking, decoding, and rebuilding a mixed-content subtree
/// yields a tree whose re-walk produces the same clean text and the same
/// tag inventory, at every nesting depth used here.
#[test]
fn test_roundTrip_overNestingDepths_shouldPreserveCleanTextAndTags() {
    let fixtures = [
        r#"<mrk mid="1">plain only</mrk>"#,
        r#"<mrk mid="1"><g id="1">one level</g></mrk>"#,
        r#"<mrk mid="1"><g id="1">a<g id="2">b</g>c</g>d</mrk>"#,
        r#"<mrk mid="1"><g id="1"><g id="2"><g id="3">deep</g></g></g></mrk>"#,
        r#"<mrk mid="1">pre<x id="9"/><g id="1">mid<x id="8"/></g>post</mrk>"#,
    ];

    for xml in fixtures {
        let container = parse_root(xml);
        let walked = walk_segment(&container);

        let tokens = decode(&walked.tagged_text);
        let rebuilt = rebuild(&container, &tokens, &walked.catalog);
        let rewalked = walk_segment(&rebuilt);

        assert_eq!(rewalked.clean_text, walked.clean_text, "fixture: {}", xml);
        assert_eq!(rewalked.tagged_text, walked.tagged_text, "fixture: {}", xml);
        let original_ids: Vec<&str> = walked.catalog.ids().collect();
        let rebuilt_ids: Vec<&str> = rewalked.catalog.ids().collect();
        assert_eq!(rebuilt_ids, original_ids, "fixture: {}", xml);
    }
}

/// Idempotence: re-encoding a tree produced by the rebuilder from valid
/// placeholder text yields exactly that same placeholder text.
#[test]
fn test_rebuildThenRewalk_withEditedText_shouldBeIdempotent() {
    let container = parse_root(
        r#"<mrk mid="1"><g id="5">Acme</g><g id="6">&amp;</g><g id="7"> Events</g></mrk>"#,
    );
    let walked = walk_segment(&container);
    assert_eq!(walked.tagged_text, ACME_TAGGED);

    let edited = "{5}Acme{/5}{6}&{/6}{7} Meetings{/7}";
    let rebuilt = rebuild(&container, &decode(edited), &walked.catalog);
    let rewalked = walk_segment(&rebuilt);

    assert_eq!(rewalked.tagged_text, edited);

    // A second pass through the codec is a fixed point
    let rebuilt_again = rebuild(&rebuilt, &decode(&rewalked.tagged_text), &walked.catalog);
    assert_eq!(walk_segment(&rebuilt_again).tagged_text, edited);
}

#[test]
fn test_decode_isTotal_onAdversarialInput() {
    // None of these may panic or drop characters
    let inputs = [
        "",
        "{",
        "}",
        "{}",
        "{{}}",
        "{x:}",
        "{/}",
        "{x:5",
        "no braces at all",
        "{5}{/5}{x:1}{weird}{x:two}",
    ];

    for input in inputs {
        let tokens = decode(input);
        let reencoded = encode(&tokens);
        assert_eq!(reencoded, input, "input: {}", input);
    }
}

#[test]
fn test_walkSegment_withPassThroughWrapper_shouldStillCatalogInnerTags() {
    let container = parse_root(r#"<mrk mid="1"><wrapper><g id="4">inner</g></wrapper></mrk>"#);

    let walked = walk_segment(&container);

    assert_eq!(walked.tagged_text, "{4}inner{/4}");
    assert!(walked.catalog.contains("4"));
}

#[test]
fn test_walkSegment_selfClosingContributesNothingToCleanText() {
    let container = parse_root(r#"<mrk mid="1">a<x id="2"/>b</mrk>"#);

    let walked = walk_segment(&container);

    assert_eq!(walked.clean_text, "ab");
    assert_eq!(walked.tagged_text, "a{x:2}b");
}
