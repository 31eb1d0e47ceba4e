/*!
 * Tag validator for edited placeholder text.
 *
 * Checks a decoded token stream against a segment's captured tag catalog:
 * - stack discipline: every paired tag must close in order
 * - set conservation: every original tag must be present, no new ids
 * - order: top-level tag order changes are a warning, not an error,
 *   because target-language word order may legitimately reorder spans
 *
 * Validation never throws; failures are returned as data so a caller can
 * retry with corrected text.
 */

use std::collections::HashSet;

use serde::Serialize;

use crate::codec::tokens::{Token, top_level_order};
use crate::codec::walker::TagCatalog;

/// Outcome of validating a token stream against a tag catalog
#[derive(Debug, Clone, Default, Serialize)]
pub struct TagValidation {
    /// Whether validation passed
    pub valid: bool,
    /// Validation error messages
    pub errors: Vec<String>,
    /// Warning messages (e.g. tag order changes)
    pub warnings: Vec<String>,
    /// Tag ids from the catalog that the text does not touch
    pub missing_tags: Vec<String>,
    /// Tag ids in the text that the catalog does not know
    pub extra_tags: Vec<String>,
}

impl TagValidation {
    /// A trivially passing validation
    pub fn passed() -> Self {
        TagValidation {
            valid: true,
            ..Default::default()
        }
    }
}

/// Validate a decoded token stream against a captured catalog.
///
/// A segment with an empty catalog always validates trivially.
pub fn validate(tokens: &[Token], catalog: &TagCatalog) -> TagValidation {
    if catalog.is_empty() {
        return TagValidation::passed();
    }

    let mut result = TagValidation::passed();
    let mut touched: HashSet<&str> = HashSet::new();
    let mut stack: Vec<&str> = Vec::new();

    for token in tokens {
        match token {
            Token::Open(id) => {
                touched.insert(id.as_str());
                stack.push(id.as_str());
            }
            Token::Close(id) => {
                touched.insert(id.as_str());
                if stack.last() == Some(&id.as_str()) {
                    stack.pop();
                } else {
                    result.errors.push(format!("Mismatched closing tag {{/{}}}", id));
                    result.valid = false;
                }
            }
            Token::SelfClosing(id) => {
                touched.insert(id.as_str());
            }
            Token::Text(_) => {}
        }
    }

    if !stack.is_empty() {
        result.errors.push(format!("Unclosed tags: {}", join_braced(&stack)));
        result.valid = false;
    }

    let mut missing: Vec<String> = catalog
        .ids()
        .filter(|id| !touched.contains(id))
        .map(|id| id.to_string())
        .collect();
    sort_tag_ids(&mut missing);
    if !missing.is_empty() {
        result.errors.push(format!(
            "Missing tags: {}. All original tags must be preserved in the translation.",
            join_braced(&missing)
        ));
        result.missing_tags = missing;
        result.valid = false;
    }

    let mut extra: Vec<String> = touched
        .iter()
        .filter(|id| !catalog.contains(id))
        .map(|id| id.to_string())
        .collect();
    sort_tag_ids(&mut extra);
    if !extra.is_empty() {
        result.errors.push(format!(
            "Unknown tags: {}. Only tags from the original segment can be used.",
            join_braced(&extra)
        ));
        result.extra_tags = extra;
        result.valid = false;
    }

    // Order is only worth reporting on an otherwise valid stream
    if result.valid {
        let new_order = top_level_order(tokens);
        if new_order != catalog.canonical_order() {
            result.warnings.push(format!(
                "Tag order changed from original. This may be intentional for word order differences. Original: {}, New: {}",
                join_braced(catalog.canonical_order()),
                join_braced(&new_order)
            ));
        }
    }

    result
}

fn sort_tag_ids(ids: &mut [String]) {
    ids.sort_by(|a, b| match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        _ => a.cmp(b),
    });
}

fn join_braced<S: AsRef<str>>(ids: &[S]) -> String {
    ids.iter()
        .map(|id| format!("{{{}}}", id.as_ref()))
        .collect::<Vec<_>>()
        .join(", ")
}
