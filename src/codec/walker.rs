/*!
 * Content walker: linearizes a mixed-content segment element into clean
 * text, placeholder text, and a tag catalog.
 *
 * The walk is a pure function over the element. Recognized inline tags
 * become placeholders and are registered in the catalog with a deep copy
 * of their original element, so a later rebuild can reproduce the exact
 * tag name, attributes, and namespace prefix.
 */

use crate::codec::tokens::{decode, top_level_order};
use crate::xml_tree::{Element, Node};

/// Marker type attribute value for position/location annotations that
/// carry no translatable text of their own
pub const METADATA_MARKER_TYPE: &str = "x-sdl-location";

// Matches the parse-time depth cap; the walker stops rather than recurse
// past it
const MAX_WALK_DEPTH: usize = 128;

/// Recognized inline tag kinds, by local element name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InlineTagKind {
    /// `<g>` - generic paired formatting span
    G,
    /// `<x>` - standalone placeholder
    X,
    /// `<bx>` - begin of a span that closes in another segment
    Bx,
    /// `<ex>` - end of a span opened in another segment
    Ex,
    /// `<ph>` - native placeholder code
    Ph,
    /// `<bpt>` - begin paired tag
    Bpt,
    /// `<ept>` - end paired tag
    Ept,
    /// `<it>` - isolated tag
    It,
}

impl InlineTagKind {
    /// Map a local element name to a recognized kind
    pub fn from_local_name(name: &str) -> Option<Self> {
        match name {
            "g" => Some(Self::G),
            "x" => Some(Self::X),
            "bx" => Some(Self::Bx),
            "ex" => Some(Self::Ex),
            "ph" => Some(Self::Ph),
            "bpt" => Some(Self::Bpt),
            "ept" => Some(Self::Ept),
            "it" => Some(Self::It),
            _ => None,
        }
    }

    /// Whether this kind is emitted as a `{x:id}` placeholder
    pub fn is_self_closing(self) -> bool {
        matches!(self, Self::X | Self::Bx | Self::Ex | Self::Ph)
    }
}

/// How a child element participates in the walk
enum ChildDisposition {
    /// Position/location annotation: contributes no text of its own
    MetadataMarker,
    /// Recognized inline tag carrying an id: becomes a placeholder
    Inline(InlineTagKind, String),
    /// Anything else: structure is passed through without a placeholder
    PassThrough,
}

fn classify(child: &Element) -> ChildDisposition {
    if child.attr("mtype") == Some(METADATA_MARKER_TYPE) {
        return ChildDisposition::MetadataMarker;
    }
    match (
        InlineTagKind::from_local_name(child.local_name()),
        child.attr("id"),
    ) {
        (Some(kind), Some(id)) => ChildDisposition::Inline(kind, id.to_string()),
        _ => ChildDisposition::PassThrough,
    }
}

/// Template for rebuilding one inline tag
#[derive(Debug, Clone)]
pub struct TagTemplate {
    /// Deep copy of the original inline element
    pub element: Element,
    /// Recognized kind of the tag
    pub kind: InlineTagKind,
}

/// Per-segment inventory of inline tags, captured the first time a
/// segment is read and immutable for the document's lifetime.
#[derive(Debug, Clone, Default)]
pub struct TagCatalog {
    /// id -> template, in first-seen order
    entries: Vec<(String, TagTemplate)>,
    /// Canonical left-to-right order of top-level open/self-closing ids
    canonical_order: Vec<String>,
    /// Canonical tagged text of the segment at capture time
    canonical_tagged: String,
}

impl TagCatalog {
    /// Whether the catalog holds no tags
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct tag ids
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Look up the template for a tag id
    pub fn get(&self, id: &str) -> Option<&TagTemplate> {
        self.entries
            .iter()
            .find(|(entry_id, _)| entry_id == id)
            .map(|(_, template)| template)
    }

    /// Whether the catalog holds the given id
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Iterate over tag ids in first-seen order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(id, _)| id.as_str())
    }

    /// Canonical top-level order recorded at capture time
    pub fn canonical_order(&self) -> &[String] {
        &self.canonical_order
    }

    /// Canonical tagged text recorded at capture time
    pub fn canonical_tagged_text(&self) -> &str {
        &self.canonical_tagged
    }

    /// Register a template. First occurrence wins: a duplicate id is not
    /// re-registered (documented limitation).
    fn register(&mut self, id: String, template: TagTemplate) {
        if !self.contains(&id) {
            self.entries.push((id, template));
        }
    }
}

/// Result of walking one segment element
#[derive(Debug, Clone)]
pub struct WalkedSegment {
    /// Plain text without any tags
    pub clean_text: String,
    /// Text with placeholders for tags
    pub tagged_text: String,
    /// Inventory of inline tags found
    pub catalog: TagCatalog,
    /// Whether any inline tags were found
    pub has_tags: bool,
}

/// Walk a mixed-content segment element into its editable representations.
///
/// Both output streams are trimmed of leading/trailing whitespace
/// independently; this is an explicit, tested invariant.
pub fn walk_segment(container: &Element) -> WalkedSegment {
    let mut catalog = TagCatalog::default();
    let mut clean = String::new();
    let mut tagged = String::new();

    walk_into(container, 0, &mut catalog, &mut clean, &mut tagged);

    let clean_text = clean.trim().to_string();
    let tagged_text = tagged.trim().to_string();
    catalog.canonical_order = top_level_order(&decode(&tagged_text));
    catalog.canonical_tagged = tagged_text.clone();
    let has_tags = !catalog.is_empty();

    WalkedSegment {
        clean_text,
        tagged_text,
        catalog,
        has_tags,
    }
}

fn walk_into(
    elem: &Element,
    depth: usize,
    catalog: &mut TagCatalog,
    clean: &mut String,
    tagged: &mut String,
) {
    if depth > MAX_WALK_DEPTH {
        return;
    }

    for node in &elem.children {
        match node {
            Node::Text(text) => {
                clean.push_str(text);
                tagged.push_str(text);
            }
            Node::Element(child) => match classify(child) {
                // Tail text after the marker survives as the following
                // text node, so nothing to do here
                ChildDisposition::MetadataMarker => {}
                ChildDisposition::Inline(kind, id) => {
                    catalog.register(
                        id.clone(),
                        TagTemplate {
                            element: child.clone(),
                            kind,
                        },
                    );
                    if kind.is_self_closing() {
                        tagged.push_str(&format!("{{x:{}}}", id));
                    } else {
                        tagged.push_str(&format!("{{{}}}", id));
                        walk_into(child, depth + 1, catalog, clean, tagged);
                        tagged.push_str(&format!("{{/{}}}", id));
                    }
                }
                ChildDisposition::PassThrough => {
                    walk_into(child, depth + 1, catalog, clean, tagged);
                }
            },
        }
    }
}
