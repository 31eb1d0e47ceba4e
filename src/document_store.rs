/*!
 * Document store for bilingual XLIFF documents.
 *
 * Owns the parsed tree and orchestrates the segment codec for reading and
 * updating segments. Segments are views computed by walking the tree, not
 * an independently persisted structure. The store is single-owner: a host
 * must serialize access per open document and can use `is_stale` to
 * detect on-disk changes behind its back.
 *
 * Saving is crash-atomic: the serialized tree is written to a temporary
 * file in the destination directory and renamed into place, so a crash
 * mid-save never corrupts the original file.
 */

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::anyhow;
use chrono::Local;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::codec::{
    TagCatalog, TagValidation, contains_placeholder, decode, rebuild, validate, walk_segment,
};
use crate::errors::DocumentError;
use crate::xml_tree::{self, DocumentHeader, Element, Node, UTF8_BOM};

/// Default cap on document size, checked before parsing
pub const MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// Default cap on replacement segment text, checked before any mutation
pub const MAX_SEGMENT_TEXT_SIZE: usize = 100 * 1024;

/// Marker type attribute value identifying a segment
const SEGMENT_MARKER_TYPE: &str = "seg";

/// Review/approval state of a segment. Closed enumeration: these six
/// values are the only ones the store will write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfirmationLevel {
    /// Initial, unreviewed translation
    Draft,
    /// Translated, awaiting review
    Translated,
    /// Translation rejected by a reviewer
    RejectedTranslation,
    /// Translation approved by a reviewer
    ApprovedTranslation,
    /// Rejected at sign-off
    RejectedSignOff,
    /// Approved at sign-off
    ApprovedSignOff,
}

impl ConfirmationLevel {
    /// Attribute value as written in the document
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Translated => "Translated",
            Self::RejectedTranslation => "RejectedTranslation",
            Self::ApprovedTranslation => "ApprovedTranslation",
            Self::RejectedSignOff => "RejectedSignOff",
            Self::ApprovedSignOff => "ApprovedSignOff",
        }
    }
}

impl std::fmt::Display for ConfirmationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ConfirmationLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Draft" => Ok(Self::Draft),
            "Translated" => Ok(Self::Translated),
            "RejectedTranslation" => Ok(Self::RejectedTranslation),
            "ApprovedTranslation" => Ok(Self::ApprovedTranslation),
            "RejectedSignOff" => Ok(Self::RejectedSignOff),
            "ApprovedSignOff" => Ok(Self::ApprovedSignOff),
            other => Err(anyhow!("Invalid confirmation level: {}", other)),
        }
    }
}

/// One editable segment, as returned to callers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    /// Unique segment id (the marker's mid)
    pub segment_id: String,
    /// Id of the owning translation unit
    pub trans_unit_id: String,
    /// Clean source text
    pub source: String,
    /// Source text with tag placeholders
    pub source_tagged: String,
    /// Clean target text
    pub target: String,
    /// Target text with tag placeholders
    pub target_tagged: String,
    /// Whether source or target carries inline tags
    pub has_tags: bool,
    /// Review state, if the document records one
    pub status: Option<ConfirmationLevel>,
    /// Whether the segment is locked (read-only, derived from the tree)
    pub locked: bool,
    /// Number of segments in this document sharing the same non-empty
    /// source text (1 when unique; populated by `extract_all`)
    pub repetitions: usize,
}

/// Closed set of update outcomes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UpdateStatus {
    /// The segment was updated and its status forced to needs-re-review
    Updated,
    /// The candidate text failed tag validation; the tree is unmodified
    TagIntegrityViolation,
    /// No segment with the given id exists
    NotFound,
    /// The candidate text exceeds the size cap; rejected before mutation
    InputTooLarge,
}

/// Result of an update attempt, returned as data rather than an error so
/// a caller can retry with corrected text without reopening the document
#[derive(Debug, Clone, Serialize)]
pub struct UpdateOutcome {
    /// What happened
    pub status: UpdateStatus,
    /// Human-readable success or rejection message
    pub message: String,
    /// Warnings that did not block the update (e.g. tag order changes)
    pub warnings: Vec<String>,
    /// Validation details when tag validation ran
    pub validation: Option<TagValidation>,
}

impl UpdateOutcome {
    /// Whether the update was applied
    pub fn succeeded(&self) -> bool {
        self.status == UpdateStatus::Updated
    }

    fn rejected(status: UpdateStatus, message: String) -> Self {
        UpdateOutcome {
            status,
            message,
            warnings: Vec::new(),
            validation: None,
        }
    }
}

/// Size limits enforced by the store
#[derive(Debug, Clone, Copy)]
pub struct DocumentLimits {
    /// Cap on document size in bytes
    pub max_file_size: u64,
    /// Cap on replacement segment text in bytes
    pub max_segment_text_size: usize,
}

impl Default for DocumentLimits {
    fn default() -> Self {
        DocumentLimits {
            max_file_size: MAX_FILE_SIZE,
            max_segment_text_size: MAX_SEGMENT_TEXT_SIZE,
        }
    }
}

/// File-level metadata
#[derive(Debug, Clone, Serialize)]
pub struct FileMetadata {
    /// Source language code (e.g. "en-US")
    pub source_language: Option<String>,
    /// Target language code (e.g. "de-DE")
    pub target_language: Option<String>,
}

/// Aggregate statistics over the whole document
#[derive(Debug, Clone, Serialize)]
pub struct DocumentStatistics {
    /// Source language code
    pub source_language: Option<String>,
    /// Target language code
    pub target_language: Option<String>,
    /// Total number of segments
    pub total_segments: usize,
    /// Segment counts per confirmation level ("unknown" when absent)
    pub status_counts: HashMap<String, usize>,
    /// Number of locked segments
    pub locked_count: usize,
}

/// Catalog captured the first time a segment was read
#[derive(Debug, Clone)]
struct CapturedSegment {
    trans_unit_id: String,
    catalog: TagCatalog,
}

/// An open bilingual document: the parsed tree plus everything needed to
/// read, update, and save it faithfully
#[derive(Debug)]
pub struct XliffDocument {
    path: Option<PathBuf>,
    root: Element,
    header: DocumentHeader,
    namespaces: HashMap<String, String>,
    catalogs: HashMap<String, CapturedSegment>,
    loaded_mtime: Option<SystemTime>,
    limits: DocumentLimits,
    backup_on_save: bool,
}

impl XliffDocument {
    /// Open a document from an already-validated absolute path
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        Self::open_with_limits(path, DocumentLimits::default())
    }

    /// Open a document with custom size limits
    pub fn open_with_limits(
        path: impl AsRef<Path>,
        limits: DocumentLimits,
    ) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let file_meta = fs::metadata(path)
            .map_err(|e| DocumentError::Io(format!("Cannot stat {}: {}", path.display(), e)))?;
        if file_meta.len() > limits.max_file_size {
            return Err(DocumentError::FileTooLarge {
                size: file_meta.len(),
                max: limits.max_file_size,
            });
        }

        let bytes = fs::read(path)
            .map_err(|e| DocumentError::Io(format!("Cannot read {}: {}", path.display(), e)))?;
        let mut document = Self::from_bytes(&bytes, limits)?;
        document.path = Some(path.to_path_buf());
        document.loaded_mtime = file_meta.modified().ok();
        debug!(
            "Loaded document {} ({} bytes, BOM: {})",
            path.display(),
            bytes.len(),
            document.header.has_bom
        );
        Ok(document)
    }

    /// Parse a document from bytes (no path attached; `save` will require
    /// an explicit destination)
    pub fn from_bytes(bytes: &[u8], limits: DocumentLimits) -> Result<Self, DocumentError> {
        if bytes.len() as u64 > limits.max_file_size {
            return Err(DocumentError::FileTooLarge {
                size: bytes.len() as u64,
                max: limits.max_file_size,
            });
        }

        let (root, header) = xml_tree::parse_document(bytes)?;
        let namespaces = collect_namespaces(&root);
        Ok(XliffDocument {
            path: None,
            root,
            header,
            namespaces,
            catalogs: HashMap::new(),
            loaded_mtime: None,
            limits,
            backup_on_save: false,
        })
    }

    /// Enable or disable keeping a timestamped sibling backup on save
    pub fn with_backup_on_save(mut self, enabled: bool) -> Self {
        self.backup_on_save = enabled;
        self
    }

    /// Namespace bindings declared on the root element (prefix -> URI;
    /// the default namespace uses an empty prefix)
    pub fn namespaces(&self) -> &HashMap<String, String> {
        &self.namespaces
    }

    /// Header facts observed on load (BOM presence, literal declaration)
    pub fn header(&self) -> &DocumentHeader {
        &self.header
    }

    /// The catalog captured for a segment, if it has been read
    pub fn segment_catalog(&self, segment_id: &str) -> Option<&TagCatalog> {
        self.catalogs.get(segment_id).map(|c| &c.catalog)
    }

    /// Whether the backing file changed on disk since this document was
    /// loaded. A host should reload rather than trust a stale tree.
    pub fn is_stale(&self) -> bool {
        match (&self.path, self.loaded_mtime) {
            (Some(path), Some(loaded)) => fs::metadata(path)
                .and_then(|m| m.modified())
                .map(|current| current != loaded)
                .unwrap_or(true),
            _ => false,
        }
    }

    /// Get a single segment by id. `None` is the expected lookup-miss
    /// outcome, not an error. Captures the segment's tag catalog on
    /// first read.
    pub fn get_segment(&mut self, segment_id: &str) -> Option<Segment> {
        let mrk_path = self.find_mrk_path(segment_id)?;
        let mrk = element_at_path(&self.root, &mrk_path)?;
        let trans_unit = self.trans_unit_on_path(&mrk_path);
        let trans_unit_id = trans_unit
            .and_then(|tu| tu.attr("id"))
            .unwrap_or("")
            .to_string();

        let target_walk = walk_segment(mrk);

        // Segmented source for the same mid, falling back to the
        // unsegmented source text
        let mut source_clean = String::new();
        let mut source_tagged = String::new();
        let mut source_has_tags = false;
        if let Some(tu) = trans_unit {
            if let Some(seg_source) = tu.find_child("seg-source") {
                for source_mrk in seg_source.descendants().filter(|e| is_segment_marker(e)) {
                    if source_mrk.attr("mid") == Some(segment_id) {
                        let walked = walk_segment(source_mrk);
                        source_clean = walked.clean_text;
                        source_tagged = walked.tagged_text;
                        source_has_tags = walked.has_tags;
                        break;
                    }
                }
            }
            if source_clean.is_empty() {
                if let Some(source_elem) = tu.find_child("source") {
                    let text = source_elem.text_content();
                    source_clean = text.clone();
                    source_tagged = text;
                    source_has_tags = false;
                }
            }
        }

        let (status, locked) = self.segment_status(segment_id);
        let has_tags = source_has_tags || target_walk.has_tags;
        let catalog = target_walk.catalog.clone();
        let captured_unit_id = trans_unit_id.clone();
        self.catalogs
            .entry(segment_id.to_string())
            .or_insert_with(|| CapturedSegment {
                trans_unit_id: captured_unit_id,
                catalog,
            });

        Some(Segment {
            segment_id: segment_id.to_string(),
            trans_unit_id,
            source: source_clean,
            source_tagged,
            target: target_walk.clean_text,
            target_tagged: target_walk.tagged_text,
            has_tags,
            status,
            locked,
            repetitions: 1,
        })
    }

    /// Extract every segment in document order, walking each translation
    /// unit. Captures tag catalogs for all target segments and computes
    /// repetition counts over identical non-empty source texts.
    pub fn extract_all(&mut self) -> Vec<Segment> {
        let mut segments = Vec::new();
        let mut captures: Vec<(String, String, TagCatalog)> = Vec::new();

        let trans_units: Vec<&Element> = self
            .root
            .descendants()
            .filter(|e| e.local_name() == "trans-unit")
            .collect();
        for trans_unit in trans_units {
            extract_from_trans_unit(trans_unit, &mut segments, &mut captures);
        }

        for (segment_id, trans_unit_id, catalog) in captures {
            self.catalogs
                .entry(segment_id)
                .or_insert(CapturedSegment {
                    trans_unit_id,
                    catalog,
                });
        }

        // Repetition counts across the whole document
        let mut source_counts: HashMap<&str, usize> = HashMap::new();
        for segment in &segments {
            if !segment.source.is_empty() {
                *source_counts.entry(segment.source.as_str()).or_insert(0) += 1;
            }
        }
        let counts: HashMap<String, usize> = source_counts
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        for segment in &mut segments {
            segment.repetitions = counts.get(&segment.source).copied().unwrap_or(1).max(1);
        }

        debug!("Extracted {} segments", segments.len());
        segments
    }

    /// Update a segment's target text.
    ///
    /// With `preserve_tags` and a non-empty catalog, the candidate text
    /// must carry placeholders and pass tag validation; only then is the
    /// subtree rebuilt and swapped in as a single replacement. With
    /// `preserve_tags` false the target becomes plain text, discarding
    /// inline tags. On success the segment's confirmation level is forced
    /// to `RejectedTranslation` so it gets re-reviewed. No other segment
    /// is ever touched.
    pub fn update_segment(
        &mut self,
        segment_id: &str,
        target_text: &str,
        preserve_tags: bool,
    ) -> UpdateOutcome {
        if target_text.len() > self.limits.max_segment_text_size {
            return UpdateOutcome::rejected(
                UpdateStatus::InputTooLarge,
                format!(
                    "Target text too large: {} characters (max: {})",
                    target_text.len(),
                    self.limits.max_segment_text_size
                ),
            );
        }

        let Some(mrk_path) = self.find_mrk_path(segment_id) else {
            return UpdateOutcome::rejected(
                UpdateStatus::NotFound,
                format!("Segment '{}' not found", segment_id),
            );
        };

        let mut warnings = Vec::new();
        let mut validation_result = None;

        if preserve_tags {
            self.capture_catalog_if_absent(segment_id, &mrk_path);
            let catalog = self
                .catalogs
                .get(segment_id)
                .map(|c| c.catalog.clone())
                .unwrap_or_default();

            if !catalog.is_empty() {
                if !contains_placeholder(target_text) {
                    return UpdateOutcome::rejected(
                        UpdateStatus::TagIntegrityViolation,
                        format!(
                            "Segment contains formatting tags but no placeholders were provided. \
                             Expected format: {}. If you want to remove all tags, set \
                             preserve_tags=false.",
                            catalog.canonical_tagged_text()
                        ),
                    );
                }

                let tokens = decode(target_text);
                let validation = validate(&tokens, &catalog);
                if !validation.valid {
                    let message = format!(
                        "Tag validation failed: {}. Original tagged text: {}",
                        validation.errors.join("; "),
                        catalog.canonical_tagged_text()
                    );
                    return UpdateOutcome {
                        status: UpdateStatus::TagIntegrityViolation,
                        message,
                        warnings: validation.warnings.clone(),
                        validation: Some(validation),
                    };
                }

                for warning in &validation.warnings {
                    warn!("Segment {}: {}", segment_id, warning);
                }
                warnings = validation.warnings.clone();

                let replacement = match element_at_path(&self.root, &mrk_path) {
                    Some(mrk) => rebuild(mrk, &tokens, &catalog),
                    None => {
                        return UpdateOutcome::rejected(
                            UpdateStatus::NotFound,
                            format!("Segment '{}' not found", segment_id),
                        );
                    }
                };
                self.replace_at_path(&mrk_path, replacement);
                validation_result = Some(validation);
            } else {
                self.replace_with_plain_text(&mrk_path, target_text);
            }
        } else {
            self.replace_with_plain_text(&mrk_path, target_text);
        }

        // Edited content always goes back through review
        self.set_confirmation(segment_id, ConfirmationLevel::RejectedTranslation);
        debug!("Updated segment {}", segment_id);

        UpdateOutcome {
            status: UpdateStatus::Updated,
            message: format!("Successfully updated segment '{}'", segment_id),
            warnings,
            validation: validation_result,
        }
    }

    /// Update a segment's confirmation level without touching its text
    pub fn set_segment_status(&mut self, segment_id: &str, status: ConfirmationLevel) -> bool {
        self.set_confirmation(segment_id, status)
    }

    /// Save the document, preserving the BOM and literal declaration
    /// observed on load. Writes to a temporary file in the destination
    /// directory and renames it into place; either the final file fully
    /// reflects the tree or the original is left untouched.
    pub fn save(&mut self, output_path: Option<&Path>) -> Result<(), DocumentError> {
        let destination = match output_path {
            Some(path) => path.to_path_buf(),
            None => self.path.clone().ok_or_else(|| {
                DocumentError::Io(
                    "No destination path: document was loaded from bytes".to_string(),
                )
            })?,
        };

        let body = xml_tree::serialize_element(&self.root)?;

        if self.backup_on_save && destination.exists() {
            let backup = backup_path(&destination);
            fs::copy(&destination, &backup)
                .map_err(|e| DocumentError::Io(format!("Backup failed: {}", e)))?;
            debug!("Wrote backup {}", backup.display());
        }

        let directory = destination
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut temp = NamedTempFile::new_in(directory)
            .map_err(|e| DocumentError::Io(format!("Cannot create temporary file: {}", e)))?;

        if self.header.has_bom {
            temp.write_all(UTF8_BOM)
                .map_err(|e| DocumentError::Io(e.to_string()))?;
        }
        if let Some(declaration) = &self.header.declaration {
            temp.write_all(declaration.as_bytes())
                .map_err(|e| DocumentError::Io(e.to_string()))?;
        }
        temp.write_all(&body)
            .map_err(|e| DocumentError::Io(e.to_string()))?;
        temp.flush().map_err(|e| DocumentError::Io(e.to_string()))?;

        temp.persist(&destination)
            .map_err(|e| DocumentError::Io(format!("Cannot rename into place: {}", e)))?;

        if self.path.as_deref() == Some(destination.as_path()) {
            self.loaded_mtime = fs::metadata(&destination)
                .and_then(|m| m.modified())
                .ok();
        }
        debug!("Saved document to {}", destination.display());
        Ok(())
    }

    /// File-level metadata (source/target language)
    pub fn metadata(&self) -> FileMetadata {
        let file_elem = self.root.descendants().find(|e| e.local_name() == "file");
        FileMetadata {
            source_language: file_elem
                .and_then(|f| f.attr("source-language"))
                .map(String::from),
            target_language: file_elem
                .and_then(|f| f.attr("target-language"))
                .map(String::from),
        }
    }

    /// Aggregate statistics over segment definitions
    pub fn statistics(&self) -> DocumentStatistics {
        let metadata = self.metadata();
        let mut status_counts: HashMap<String, usize> = HashMap::new();
        let mut locked_count = 0;
        let mut total = 0;

        for seg in self.root.descendants().filter(|e| e.local_name() == "seg") {
            total += 1;
            let key = seg.attr("conf").unwrap_or("unknown").to_string();
            *status_counts.entry(key).or_insert(0) += 1;
            if seg.attr("locked") == Some("true") {
                locked_count += 1;
            }
        }

        DocumentStatistics {
            source_language: metadata.source_language,
            target_language: metadata.target_language,
            total_segments: total,
            status_counts,
            locked_count,
        }
    }

    // --- internal helpers ---

    fn capture_catalog_if_absent(&mut self, segment_id: &str, mrk_path: &[usize]) {
        if self.catalogs.contains_key(segment_id) {
            return;
        }
        let trans_unit_id = self
            .trans_unit_on_path(mrk_path)
            .and_then(|tu| tu.attr("id"))
            .unwrap_or("")
            .to_string();
        if let Some(mrk) = element_at_path(&self.root, mrk_path) {
            let catalog = walk_segment(mrk).catalog;
            self.catalogs.insert(
                segment_id.to_string(),
                CapturedSegment {
                    trans_unit_id,
                    catalog,
                },
            );
        }
    }

    /// Path (child indices from the root) of the target-side segment
    /// marker with the given mid
    fn find_mrk_path(&self, mid: &str) -> Option<Vec<usize>> {
        let mut path = Vec::new();
        if find_mrk_in(&self.root, mid, false, &mut path) {
            Some(path)
        } else {
            None
        }
    }

    fn find_seg_def_path(&self, seg_id: &str) -> Option<Vec<usize>> {
        let mut path = Vec::new();
        if find_path_by(
            &self.root,
            &|e| e.local_name() == "seg" && e.attr("id") == Some(seg_id),
            &mut path,
        ) {
            Some(path)
        } else {
            None
        }
    }

    /// The innermost trans-unit element along a path
    fn trans_unit_on_path(&self, path: &[usize]) -> Option<&Element> {
        let mut current = &self.root;
        let mut found = None;
        for &index in path {
            match current.children.get(index) {
                Some(Node::Element(child)) => {
                    if child.local_name() == "trans-unit" {
                        found = Some(child);
                    }
                    current = child;
                }
                _ => return None,
            }
        }
        found
    }

    fn segment_status(&self, segment_id: &str) -> (Option<ConfirmationLevel>, bool) {
        let seg = self
            .root
            .descendants()
            .find(|e| e.local_name() == "seg" && e.attr("id") == Some(segment_id));
        match seg {
            Some(seg) => (
                seg.attr("conf").and_then(|c| c.parse().ok()),
                seg.attr("locked") == Some("true"),
            ),
            None => (None, false),
        }
    }

    fn set_confirmation(&mut self, segment_id: &str, level: ConfirmationLevel) -> bool {
        if let Some(path) = self.find_seg_def_path(segment_id) {
            if let Some(seg) = element_at_path_mut(&mut self.root, &path) {
                seg.set_attr("conf", level.as_str());
                return true;
            }
        }
        false
    }

    /// Swap the element at `path` for a replacement in one assignment
    fn replace_at_path(&mut self, path: &[usize], replacement: Element) -> bool {
        let Some((&last, parent_path)) = path.split_last() else {
            return false;
        };
        if let Some(parent) = element_at_path_mut(&mut self.root, parent_path) {
            if let Some(node) = parent.children.get_mut(last) {
                if matches!(node, Node::Element(_)) {
                    *node = Node::Element(replacement);
                    return true;
                }
            }
        }
        false
    }

    fn replace_with_plain_text(&mut self, path: &[usize], text: &str) {
        if let Some(mrk) = element_at_path_mut(&mut self.root, path) {
            mrk.children.clear();
            if !text.is_empty() {
                mrk.children.push(Node::Text(text.to_string()));
            }
        }
    }
}

fn is_segment_marker(elem: &Element) -> bool {
    elem.local_name() == "mrk" && elem.attr("mtype") == Some(SEGMENT_MARKER_TYPE)
}

fn collect_namespaces(root: &Element) -> HashMap<String, String> {
    let mut namespaces = HashMap::new();
    for (key, value) in &root.attributes {
        if key == "xmlns" {
            namespaces.insert(String::new(), value.clone());
        } else if let Some(prefix) = key.strip_prefix("xmlns:") {
            namespaces.insert(prefix.to_string(), value.clone());
        }
    }
    namespaces
}

fn element_at_path<'a>(root: &'a Element, path: &[usize]) -> Option<&'a Element> {
    let mut current = root;
    for &index in path {
        match current.children.get(index) {
            Some(Node::Element(child)) => current = child,
            _ => return None,
        }
    }
    Some(current)
}

fn element_at_path_mut<'a>(root: &'a mut Element, path: &[usize]) -> Option<&'a mut Element> {
    let mut current = root;
    for &index in path {
        match current.children.get_mut(index) {
            Some(Node::Element(child)) => current = child,
            _ => return None,
        }
    }
    Some(current)
}

fn find_mrk_in(elem: &Element, mid: &str, inside_target: bool, path: &mut Vec<usize>) -> bool {
    for (index, node) in elem.children.iter().enumerate() {
        if let Node::Element(child) = node {
            path.push(index);
            if inside_target && is_segment_marker(child) && child.attr("mid") == Some(mid) {
                return true;
            }
            let next_inside = inside_target || child.local_name() == "target";
            if find_mrk_in(child, mid, next_inside, path) {
                return true;
            }
            path.pop();
        }
    }
    false
}

fn find_path_by(
    elem: &Element,
    predicate: &dyn Fn(&Element) -> bool,
    path: &mut Vec<usize>,
) -> bool {
    for (index, node) in elem.children.iter().enumerate() {
        if let Node::Element(child) = node {
            path.push(index);
            if predicate(child) {
                return true;
            }
            if find_path_by(child, predicate, path) {
                return true;
            }
            path.pop();
        }
    }
    false
}

fn extract_from_trans_unit(
    trans_unit: &Element,
    segments: &mut Vec<Segment>,
    captures: &mut Vec<(String, String, TagCatalog)>,
) {
    let tu_id = trans_unit.attr("id").unwrap_or("").to_string();

    // Segmented source, preferred for aligned source/target
    let mut source_map: HashMap<String, (String, String, bool)> = HashMap::new();
    if let Some(seg_source) = trans_unit.find_child("seg-source") {
        for mrk in seg_source.descendants().filter(|e| is_segment_marker(e)) {
            if let Some(mid) = mrk.attr("mid") {
                let walked = walk_segment(mrk);
                source_map.insert(
                    mid.to_string(),
                    (walked.clean_text, walked.tagged_text, walked.has_tags),
                );
            }
        }
    }

    let fallback_source = trans_unit
        .find_child("source")
        .map(|s| s.text_content())
        .unwrap_or_default();

    // Status/lock lookup from segment definitions
    let mut seg_map: HashMap<String, (Option<ConfirmationLevel>, bool)> = HashMap::new();
    if let Some(seg_defs) = trans_unit.find_child("seg-defs") {
        for seg in seg_defs.child_elements().filter(|e| e.local_name() == "seg") {
            if let Some(seg_id) = seg.attr("id") {
                seg_map.insert(
                    seg_id.to_string(),
                    (
                        seg.attr("conf").and_then(|c| c.parse().ok()),
                        seg.attr("locked") == Some("true"),
                    ),
                );
            }
        }
    }

    let Some(target) = trans_unit.find_child("target") else {
        // No target: expose the unit with an empty target
        segments.push(Segment {
            segment_id: tu_id.clone(),
            trans_unit_id: tu_id,
            source: fallback_source.clone(),
            source_tagged: fallback_source,
            target: String::new(),
            target_tagged: String::new(),
            has_tags: false,
            status: None,
            locked: false,
            repetitions: 1,
        });
        return;
    };

    let marker_elements: Vec<&Element> = target
        .descendants()
        .filter(|e| is_segment_marker(e))
        .collect();

    if marker_elements.is_empty() {
        // No segment markers: the whole target is a single segment
        let target_text = target.text_content();
        let (status, locked) = seg_map.get("1").copied().unwrap_or((None, false));
        segments.push(Segment {
            segment_id: tu_id.clone(),
            trans_unit_id: tu_id,
            source: fallback_source.clone(),
            source_tagged: fallback_source,
            target: target_text.clone(),
            target_tagged: target_text,
            has_tags: false,
            status,
            locked,
            repetitions: 1,
        });
        return;
    }

    for mrk in marker_elements {
        let mid = mrk.attr("mid").unwrap_or("").to_string();
        let target_walk = walk_segment(mrk);
        captures.push((mid.clone(), tu_id.clone(), target_walk.catalog.clone()));

        let (source, source_tagged, source_has_tags) = match source_map.get(&mid) {
            Some((clean, tagged, has)) => (clean.clone(), tagged.clone(), *has),
            None => (fallback_source.clone(), fallback_source.clone(), false),
        };
        let has_tags = source_has_tags || target_walk.has_tags;
        let (status, locked) = seg_map.get(&mid).copied().unwrap_or((None, false));

        segments.push(Segment {
            segment_id: mid,
            trans_unit_id: tu_id.clone(),
            source,
            source_tagged,
            target: target_walk.clean_text,
            target_tagged: target_walk.tagged_text,
            has_tags,
            status,
            locked,
            repetitions: 1,
        });
    }
}

fn backup_path(destination: &Path) -> PathBuf {
    let timestamp = Local::now().format("%Y%m%d-%H%M%S");
    let file_name = destination
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    destination.with_file_name(format!("{}.{}.bak", file_name, timestamp))
}
