/*!
 * Tree rebuilder: materializes an element subtree from a validated token
 * stream and the segment's tag catalog.
 *
 * The rebuilt subtree keeps the original container's tag name and
 * attributes. Inline tags are instantiated from their catalog templates
 * (name, attributes, namespace prefix). The rebuilder never panics on
 * malformed input even though the validator is expected to have rejected
 * it: unknown ids are skipped, surplus closes are ignored, and unclosed
 * tags are closed at end of stream.
 */

use crate::codec::tokens::Token;
use crate::codec::walker::TagCatalog;
use crate::xml_tree::{Element, Node};

/// Build a replacement subtree for a segment container from decoded
/// placeholder tokens.
pub fn rebuild(container: &Element, tokens: &[Token], catalog: &TagCatalog) -> Element {
    let root = Element::with_attributes(container.name.clone(), container.attributes.clone());
    let mut stack: Vec<Element> = vec![root];

    for token in tokens {
        match token {
            Token::Text(text) => {
                if let Some(top) = stack.last_mut() {
                    top.push_text(text);
                }
            }
            Token::Open(id) => {
                if let Some(template) = catalog.get(id) {
                    stack.push(instantiate(&template.element));
                }
            }
            Token::Close(_) => {
                // Defensive no-op at the root: never pop the container
                if stack.len() > 1 {
                    close_top(&mut stack);
                }
            }
            Token::SelfClosing(id) => {
                if let Some(template) = catalog.get(id) {
                    if let Some(top) = stack.last_mut() {
                        top.children.push(Node::Element(instantiate(&template.element)));
                    }
                }
            }
        }
    }

    // Close anything the stream left open
    while stack.len() > 1 {
        close_top(&mut stack);
    }

    stack.pop().unwrap_or_else(|| Element::new(container.name.clone()))
}

/// Instantiate a fresh, empty element from a catalog template
fn instantiate(template: &Element) -> Element {
    Element::with_attributes(template.name.clone(), template.attributes.clone())
}

fn close_top(stack: &mut Vec<Element>) {
    if let Some(finished) = stack.pop() {
        if let Some(parent) = stack.last_mut() {
            parent.children.push(Node::Element(finished));
        }
    }
}
