//! # Nested Form Parser
//!
//! Converts the flat field/file mappings of one multipart submission into
//! the nested [`ParsedSubmission`] tree.
//!
//! Text keys follow the bracket grammar from [`super::key`]:
//! - `firstName` assigns a scalar at the top level;
//! - `education[ssc]` assigns a scalar inside the `education` map;
//! - `experience[0][company]` grows the `experience` list to at least one
//!   entry (independent of arrival order) and sets `company` on entry 0;
//! - `education[ssc][school]` sets `school` inside the `ssc` sub-map.
//!
//! File keys follow the same grammar but route through the
//! [`FileStore`](super::files::FileStore) instead of direct assignment.
//! Exactly one field in the known schema (`experience[i][salarySlips]`)
//! collects every file submitted under its key; all other file fields keep
//! the first file and the surplus is logged as ignored. Save failures are
//! collected into the returned error set rather than aborting other fields.
//!
//! Malformed text keys degrade to pass-through under their literal name so
//! nothing is silently dropped; the parser never fails.

use super::files::{FileCategory, FileStore};
use super::key::{parse_key, FormKey, Segment};
use super::validate::ValidationErrors;
use common::model::form::{FormValue, ParsedSubmission};
use log::warn;
use std::collections::BTreeMap;

/// Guard against hostile indices forcing huge list allocations. Keys beyond
/// this bound are treated as malformed and pass through literally.
const MAX_LIST_INDEX: usize = 100;

/// The flat text fields of one submission, in arrival order.
#[derive(Debug, Default)]
pub struct RawForm {
    fields: Vec<(String, String)>,
}

impl RawForm {
    pub fn new() -> RawForm {
        RawForm::default()
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.push((key.into(), value.into()));
    }

    /// Whether the key was present at all. HTML checkboxes submit their key
    /// only when checked, so presence doubles as the toggle state.
    pub fn contains(&self, key: &str) -> bool {
        self.fields.iter().any(|(k, _)| k == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// One uploaded file part, buffered in memory.
#[derive(Debug)]
pub struct UploadedFile {
    /// The form field key the file arrived under.
    pub field: String,
    /// The client-supplied filename, unsanitized.
    pub original_name: String,
    pub bytes: Vec<u8>,
}

/// The parse result: the nested tree plus any per-field file-save failures.
#[derive(Debug)]
pub struct ParseOutcome {
    pub tree: ParsedSubmission,
    pub file_errors: ValidationErrors,
}

/// Parses one flat submission into its nested document structure, storing
/// uploaded files along the way.
pub fn parse_submission(
    form: &RawForm,
    files: Vec<UploadedFile>,
    store: &FileStore,
) -> ParseOutcome {
    let mut tree = ParsedSubmission::new();
    let mut file_errors = ValidationErrors::new();

    for (raw_key, value) in form.iter() {
        match parse_key(raw_key) {
            Some(key) => assign_text(&mut tree, &key, raw_key, value),
            None => {
                // Pass-through keeps malformed keys under their literal name.
                tree.insert(raw_key.to_string(), FormValue::Text(value.to_string()));
            }
        }
    }

    for (raw_key, group) in group_by_field(files) {
        attach_files(&mut tree, &mut file_errors, store, &raw_key, group);
    }

    ParseOutcome { tree, file_errors }
}

fn assign_text(tree: &mut ParsedSubmission, key: &FormKey, raw_key: &str, value: &str) {
    let value = FormValue::Text(value.to_string());
    match (&key.segment, &key.field) {
        (None, _) => {
            tree.insert(key.name.clone(), value);
        }
        (Some(segment), None) => {
            // Single-segment keys are map entries regardless of numeric form.
            ensure_map(tree, &key.name).insert(segment_key(segment), value);
        }
        (Some(Segment::Index(index)), Some(field)) => {
            let Some(entry) = list_entry(tree, &key.name, *index) else {
                warn!("List index out of bounds for key '{}'; keeping literal", raw_key);
                tree.insert(raw_key.to_string(), value);
                return;
            };
            entry.insert(field.clone(), value);
        }
        (Some(Segment::Key(section_key)), Some(field)) => {
            ensure_nested_map(tree, &key.name, section_key).insert(field.clone(), value);
        }
    }
}

fn attach_files(
    tree: &mut ParsedSubmission,
    file_errors: &mut ValidationErrors,
    store: &FileStore,
    raw_key: &str,
    group: Vec<UploadedFile>,
) {
    let Some(key) = parse_key(raw_key) else {
        warn!("File key '{}' does not match the expected pattern; skipping", raw_key);
        return;
    };

    match (&key.segment, &key.field) {
        (None, _) => {
            // Top-level files: idProof, resume, signedDocument.
            if group.len() > 1 {
                warn!(
                    "Multiple files received for '{}'; ignoring {} surplus file(s)",
                    raw_key,
                    group.len() - 1
                );
            }
            let file = &group[0];
            let category = FileCategory::from_section(&key.name);
            match store.save(&file.original_name, &file.bytes, category, &key.name) {
                Ok(path) => {
                    tree.insert(key.name.clone(), FormValue::File(path));
                }
                Err(e) => {
                    warn!("Failed to save file for '{}': {}", raw_key, e);
                    file_errors.add(raw_key, e.to_string());
                }
            }
        }
        (Some(_), None) => {
            warn!(
                "File key '{}' lacks a field specifier in brackets; skipping",
                raw_key
            );
        }
        (Some(segment), Some(field)) => {
            let category = FileCategory::from_section(&key.name);
            let multiple = key.name == "experience" && field == "salarySlips";
            let mut saved = Vec::new();
            if !multiple && group.len() > 1 {
                warn!(
                    "Multiple files received for '{}'; ignoring {} surplus file(s)",
                    raw_key,
                    group.len() - 1
                );
            }
            let keep = if multiple { group.len() } else { 1 };
            for file in group.iter().take(keep) {
                match store.save(&file.original_name, &file.bytes, category, field) {
                    Ok(path) => saved.push(path),
                    Err(e) => {
                        warn!("Failed to save a file for '{}': {}", raw_key, e);
                        file_errors.add(raw_key, e.to_string());
                    }
                }
            }
            if saved.is_empty() {
                return;
            }
            let value = if multiple {
                FormValue::Files(saved)
            } else {
                FormValue::File(saved.remove(0))
            };
            match segment {
                Segment::Index(index) => {
                    let Some(entry) = list_entry(tree, &key.name, *index) else {
                        warn!("List index out of bounds for file key '{}'; skipping", raw_key);
                        return;
                    };
                    entry.insert(field.clone(), value);
                }
                Segment::Key(section_key) => {
                    ensure_nested_map(tree, &key.name, section_key).insert(field.clone(), value);
                }
            }
        }
    }
}

/// Groups files by field key, preserving first-arrival order of the keys and
/// dropping parts with no filename (an empty file input submits one).
fn group_by_field(files: Vec<UploadedFile>) -> Vec<(String, Vec<UploadedFile>)> {
    let mut groups: Vec<(String, Vec<UploadedFile>)> = Vec::new();
    for file in files {
        if file.original_name.is_empty() {
            continue;
        }
        match groups.iter_mut().find(|(key, _)| *key == file.field) {
            Some((_, group)) => group.push(file),
            None => groups.push((file.field.clone(), vec![file])),
        }
    }
    groups
}

fn segment_key(segment: &Segment) -> String {
    match segment {
        Segment::Index(index) => index.to_string(),
        Segment::Key(key) => key.clone(),
    }
}

/// Returns the map stored under `name`, replacing any other kind of value.
fn ensure_map<'a>(
    tree: &'a mut ParsedSubmission,
    name: &str,
) -> &'a mut BTreeMap<String, FormValue> {
    let slot = tree
        .entry(name.to_string())
        .or_insert_with(|| FormValue::Map(BTreeMap::new()));
    if !matches!(slot, FormValue::Map(_)) {
        *slot = FormValue::Map(BTreeMap::new());
    }
    match slot {
        FormValue::Map(map) => map,
        _ => unreachable!("slot was just set to a map"),
    }
}

fn ensure_nested_map<'a>(
    tree: &'a mut ParsedSubmission,
    name: &str,
    section_key: &str,
) -> &'a mut BTreeMap<String, FormValue> {
    let outer = ensure_map(tree, name);
    let slot = outer
        .entry(section_key.to_string())
        .or_insert_with(|| FormValue::Map(BTreeMap::new()));
    if !matches!(slot, FormValue::Map(_)) {
        *slot = FormValue::Map(BTreeMap::new());
    }
    match slot {
        FormValue::Map(map) => map,
        _ => unreachable!("slot was just set to a map"),
    }
}

/// Grows the list under `name` so entry `index` exists (untouched entries
/// stay empty maps) and returns that entry. `None` when the index exceeds
/// the allocation guard.
fn list_entry<'a>(
    tree: &'a mut ParsedSubmission,
    name: &str,
    index: usize,
) -> Option<&'a mut BTreeMap<String, FormValue>> {
    if index > MAX_LIST_INDEX {
        return None;
    }
    let slot = tree
        .entry(name.to_string())
        .or_insert_with(|| FormValue::List(Vec::new()));
    if !matches!(slot, FormValue::List(_)) {
        *slot = FormValue::List(Vec::new());
    }
    match slot {
        FormValue::List(entries) => {
            while entries.len() <= index {
                entries.push(BTreeMap::new());
            }
            Some(&mut entries[index])
        }
        _ => unreachable!("slot was just set to a list"),
    }
}
