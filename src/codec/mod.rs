/*!
 * Segment codec: converts mixed-content segment elements to and from a
 * flat, human-editable placeholder text form.
 *
 * # Architecture
 *
 * - `walker`: linearizes an element into clean text, tagged text, and a
 *   tag catalog (the read direction)
 * - `tokens`: total tokenizer for edited placeholder text
 * - `validator`: checks a token stream against the captured catalog
 * - `rebuilder`: materializes a new element subtree from validated tokens
 *
 * Read path: walker -> caller. Write path: tokens -> validator ->
 * rebuilder -> document store.
 */

pub mod rebuilder;
pub mod tokens;
pub mod validator;
pub mod walker;

// Re-export main types
pub use rebuilder::rebuild;
pub use tokens::{Token, contains_placeholder, decode, encode, top_level_order};
pub use validator::{TagValidation, validate};
pub use walker::{InlineTagKind, TagCatalog, TagTemplate, WalkedSegment, walk_segment};
