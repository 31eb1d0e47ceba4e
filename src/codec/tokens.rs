/*!
 * Placeholder token stream for human-editable segment text.
 *
 * Segment text is edited as plain text with tag placeholders:
 * - `{5}text{/5}` for a paired inline tag
 * - `{x:5}` for a self-closing inline tag
 *
 * `decode` is total: any brace sequence that does not match the
 * placeholder grammar is kept as literal text, so malformed input is
 * never rejected here. Rejection is the validator's job.
 */

use once_cell::sync::Lazy;
use regex::Regex;

/// Regex detecting whether a string contains at least one placeholder
static PLACEHOLDER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{(?:/?\d+|x:\d+)\}").expect("Invalid placeholder regex")
});

/// One token of decoded placeholder text.
///
/// Tag ids are kept as the exact digit strings that appeared in the text,
/// so ids like "07" keep their identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A run of literal characters
    Text(String),
    /// `{id}` - opens a paired inline tag
    Open(String),
    /// `{/id}` - closes a paired inline tag
    Close(String),
    /// `{x:id}` - a self-closing inline tag
    SelfClosing(String),
}

impl Token {
    /// The tag id this token carries, if any
    pub fn tag_id(&self) -> Option<&str> {
        match self {
            Token::Text(_) => None,
            Token::Open(id) | Token::Close(id) | Token::SelfClosing(id) => Some(id),
        }
    }
}

/// Decode placeholder text into an ordered token stream. Never fails.
pub fn decode(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut rest = text;

    while let Some(brace) = rest.find('{') {
        literal.push_str(&rest[..brace]);
        let candidate = &rest[brace..];

        match candidate.find('}') {
            Some(end) => {
                let inner = &candidate[1..end];
                if let Some(token) = classify_placeholder(inner) {
                    flush_literal(&mut literal, &mut tokens);
                    tokens.push(token);
                    rest = &candidate[end + 1..];
                } else {
                    // Not a placeholder: the brace is literal text and
                    // scanning resumes right after it
                    literal.push('{');
                    rest = &candidate[1..];
                }
            }
            None => {
                literal.push_str(candidate);
                rest = "";
            }
        }
    }

    literal.push_str(rest);
    flush_literal(&mut literal, &mut tokens);
    tokens
}

fn classify_placeholder(inner: &str) -> Option<Token> {
    if let Some(id) = inner.strip_prefix("x:") {
        if is_tag_id(id) {
            return Some(Token::SelfClosing(id.to_string()));
        }
    } else if let Some(id) = inner.strip_prefix('/') {
        if is_tag_id(id) {
            return Some(Token::Close(id.to_string()));
        }
    } else if is_tag_id(inner) {
        return Some(Token::Open(inner.to_string()));
    }
    None
}

fn is_tag_id(candidate: &str) -> bool {
    !candidate.is_empty() && candidate.bytes().all(|b| b.is_ascii_digit())
}

fn flush_literal(literal: &mut String, tokens: &mut Vec<Token>) {
    if !literal.is_empty() {
        tokens.push(Token::Text(std::mem::take(literal)));
    }
}

/// Check whether text contains at least one placeholder token
pub fn contains_placeholder(text: &str) -> bool {
    PLACEHOLDER_REGEX.is_match(text)
}

/// Left-to-right order of open/self-closing tag ids at placeholder
/// nesting depth zero. Used for the canonical-order warning.
pub fn top_level_order(tokens: &[Token]) -> Vec<String> {
    let mut order = Vec::new();
    let mut depth: usize = 0;

    for token in tokens {
        match token {
            Token::Open(id) => {
                if depth == 0 {
                    order.push(id.clone());
                }
                depth += 1;
            }
            Token::Close(_) => {
                depth = depth.saturating_sub(1);
            }
            Token::SelfClosing(id) => {
                if depth == 0 {
                    order.push(id.clone());
                }
            }
            Token::Text(_) => {}
        }
    }

    order
}

/// Re-encode a token stream back into placeholder text
pub fn encode(tokens: &[Token]) -> String {
    let mut out = String::new();
    for token in tokens {
        match token {
            Token::Text(text) => out.push_str(text),
            Token::Open(id) => out.push_str(&format!("{{{}}}", id)),
            Token::Close(id) => out.push_str(&format!("{{/{}}}", id)),
            Token::SelfClosing(id) => out.push_str(&format!("{{x:{}}}", id)),
        }
    }
    out
}
