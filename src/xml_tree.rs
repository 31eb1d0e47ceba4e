/*!
 * Owned XML element tree for mixed-content documents.
 *
 * This module wraps quick-xml with a small owned tree model suited to
 * bilingual documents: every element keeps its qualified name as written,
 * its attributes in document order, and an ordered list of child nodes
 * (text or element). Text between sibling elements is significant and is
 * preserved verbatim.
 *
 * Parsing is defensive: nesting depth and total node count are capped,
 * and entity references that are not one of the XML built-ins fail the
 * parse instead of being expanded.
 */

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

use crate::errors::DocumentError;

/// Hard cap on element nesting depth during parse
pub const MAX_ELEMENT_DEPTH: usize = 128;

/// Hard cap on the total number of tree nodes accepted during parse
pub const MAX_NODE_COUNT: usize = 1_000_000;

/// UTF-8 byte order mark
pub const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// A node in the mixed-content tree
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A child element
    Element(Element),
    /// A run of character data (kept verbatim, unescaped)
    Text(String),
}

/// An XML element with its qualified name, ordered attributes, and children
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Qualified tag name exactly as written in the source (e.g. "sdl:seg")
    pub name: String,
    /// Attributes in document order, values unescaped
    pub attributes: Vec<(String, String)>,
    /// Ordered mixed content
    pub children: Vec<Node>,
}

impl Element {
    /// Create an empty element
    pub fn new(name: impl Into<String>) -> Self {
        Element {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Create an empty element carrying the given attributes
    pub fn with_attributes(name: impl Into<String>, attributes: Vec<(String, String)>) -> Self {
        Element {
            name: name.into(),
            attributes,
            children: Vec::new(),
        }
    }

    /// Local part of the qualified name (after any namespace prefix)
    pub fn local_name(&self) -> &str {
        match self.name.rfind(':') {
            Some(idx) => &self.name[idx + 1..],
            None => &self.name,
        }
    }

    /// Look up an attribute value by exact key
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing an existing value or appending a new one
    pub fn set_attr(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(entry) = self.attributes.iter_mut().find(|(k, _)| k == key) {
            entry.1 = value;
        } else {
            self.attributes.push((key.to_string(), value));
        }
    }

    /// Iterate over direct child elements, in document order
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(child) => Some(child),
            Node::Text(_) => None,
        })
    }

    /// Find the first direct child element with the given local name
    pub fn find_child(&self, local_name: &str) -> Option<&Element> {
        self.child_elements()
            .find(|child| child.local_name() == local_name)
    }

    /// Iterate over all descendant elements in document order (self excluded)
    pub fn descendants(&self) -> Descendants<'_> {
        let mut stack = Vec::new();
        for node in self.children.iter().rev() {
            if let Node::Element(child) = node {
                stack.push(child);
            }
        }
        Descendants { stack }
    }

    /// Concatenated character data of this element and all descendants,
    /// in document order
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }

    /// Append character data at the current insertion point: merged into a
    /// trailing text node if one exists, otherwise as a new text node
    pub fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(Node::Text(existing)) = self.children.last_mut() {
            existing.push_str(text);
        } else {
            self.children.push(Node::Text(text.to_string()));
        }
    }
}

fn collect_text(elem: &Element, out: &mut String) {
    for node in &elem.children {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Element(child) => collect_text(child, out),
        }
    }
}

/// Document-order iterator over descendant elements, driven by an explicit
/// stack so arbitrarily deep input cannot overflow the call stack
pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        for node in current.children.iter().rev() {
            if let Node::Element(child) = node {
                self.stack.push(child);
            }
        }
        Some(current)
    }
}

/// Byte-level header facts observed on load and replayed verbatim on save
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentHeader {
    /// Whether the original file started with a UTF-8 BOM
    pub has_bom: bool,
    /// The literal `<?xml ...?>` declaration text, if one was present
    pub declaration: Option<String>,
}

/// Strip a UTF-8 BOM if present, reporting whether one was found
pub fn strip_bom(bytes: &[u8]) -> (&[u8], bool) {
    if bytes.starts_with(UTF8_BOM) {
        (&bytes[UTF8_BOM.len()..], true)
    } else {
        (bytes, false)
    }
}

/// Capture the literal XML declaration from the start of the document text
fn capture_declaration(text: &str) -> Option<String> {
    let trimmed = text.trim_start();
    if !trimmed.starts_with("<?xml") {
        return None;
    }
    trimmed.find("?>").map(|end| trimmed[..end + 2].to_string())
}

/// Parse a document into an element tree, capturing header facts.
///
/// Rejects input that exceeds the depth or node caps, contains undefined
/// entity references, or is not well-formed. Never resolves external
/// entities or touches the network.
pub fn parse_document(bytes: &[u8]) -> Result<(Element, DocumentHeader), DocumentError> {
    let (body, has_bom) = strip_bom(bytes);
    let text = std::str::from_utf8(body)
        .map_err(|e| DocumentError::Malformed(format!("Invalid UTF-8: {}", e)))?;

    let header = DocumentHeader {
        has_bom,
        declaration: capture_declaration(text),
    };

    let mut reader = Reader::from_str(text);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;
    let mut node_count: usize = 0;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| DocumentError::Malformed(e.to_string()))?;

        match event {
            Event::Start(start) => {
                if stack.len() >= MAX_ELEMENT_DEPTH {
                    return Err(DocumentError::Malformed(format!(
                        "Element nesting exceeds maximum depth of {}",
                        MAX_ELEMENT_DEPTH
                    )));
                }
                node_count = bump_node_count(node_count)?;
                stack.push(element_from_start(&start)?);
            }
            Event::Empty(start) => {
                node_count = bump_node_count(node_count)?;
                let element = element_from_start(&start)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let finished = stack.pop().ok_or_else(|| {
                    DocumentError::Malformed("Closing tag without matching opening tag".to_string())
                })?;
                attach(&mut stack, &mut root, finished)?;
            }
            Event::Text(text_event) => {
                let unescaped = text_event
                    .unescape()
                    .map_err(|e| DocumentError::Malformed(e.to_string()))?;
                if let Some(parent) = stack.last_mut() {
                    node_count = bump_node_count(node_count)?;
                    parent.children.push(Node::Text(unescaped.into_owned()));
                }
            }
            Event::CData(cdata) => {
                let content = String::from_utf8(cdata.into_inner().into_owned())
                    .map_err(|e| DocumentError::Malformed(format!("Invalid UTF-8 in CDATA: {}", e)))?;
                if let Some(parent) = stack.last_mut() {
                    node_count = bump_node_count(node_count)?;
                    parent.children.push(Node::Text(content));
                }
            }
            // Declaration is captured literally above; comments, processing
            // instructions, and doctype internals carry no segment content
            Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_) => {}
            Event::Eof => break,
        }
    }

    if !stack.is_empty() {
        return Err(DocumentError::Malformed(
            "Unexpected end of document inside an open element".to_string(),
        ));
    }

    root.ok_or_else(|| DocumentError::Malformed("Document has no root element".to_string()))
        .map(|element| (element, header))
}

fn bump_node_count(count: usize) -> Result<usize, DocumentError> {
    let next = count + 1;
    if next > MAX_NODE_COUNT {
        return Err(DocumentError::Malformed(format!(
            "Document exceeds maximum node count of {}",
            MAX_NODE_COUNT
        )));
    }
    Ok(next)
}

fn element_from_start(start: &BytesStart) -> Result<Element, DocumentError> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| DocumentError::Malformed(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| DocumentError::Malformed(e.to_string()))?
            .into_owned();
        attributes.push((key, value));
    }
    Ok(Element::with_attributes(name, attributes))
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), DocumentError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(Node::Element(element));
        Ok(())
    } else if root.is_none() {
        *root = Some(element);
        Ok(())
    } else {
        Err(DocumentError::Malformed(
            "Multiple root elements in document".to_string(),
        ))
    }
}

/// Serialize an element tree back to XML bytes (no declaration, no BOM).
///
/// Attribute order is preserved; text and attribute values are re-escaped.
pub fn serialize_element(root: &Element) -> Result<Vec<u8>, DocumentError> {
    let mut writer = Writer::new(Vec::new());
    write_element(&mut writer, root)?;
    Ok(writer.into_inner())
}

fn write_element(writer: &mut Writer<Vec<u8>>, elem: &Element) -> Result<(), DocumentError> {
    let mut start = BytesStart::new(elem.name.as_str());
    for (key, value) in &elem.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if elem.children.is_empty() {
        writer
            .write_event(Event::Empty(start))
            .map_err(|e| DocumentError::Io(e.to_string()))?;
        return Ok(());
    }

    writer
        .write_event(Event::Start(start))
        .map_err(|e| DocumentError::Io(e.to_string()))?;

    for node in &elem.children {
        match node {
            Node::Text(text) => {
                writer
                    .write_event(Event::Text(BytesText::new(text)))
                    .map_err(|e| DocumentError::Io(e.to_string()))?;
            }
            Node::Element(child) => write_element(writer, child)?,
        }
    }

    writer
        .write_event(Event::End(BytesEnd::new(elem.name.as_str())))
        .map_err(|e| DocumentError::Io(e.to_string()))?;
    Ok(())
}
