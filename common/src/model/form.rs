use serde::Serialize;
use std::collections::BTreeMap;

/// One slot in a parsed submission tree.
///
/// Serialization is untagged, so a tree serializes to the plain JSON document
/// that ends up in the record store: text and stored-file references become
/// strings, coerced checkboxes become booleans, sections become objects and
/// repeatable sections become arrays of objects.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FormValue {
    /// A plain text field value.
    Text(String),
    /// A checkbox or toggle coerced to a boolean before persistence.
    Bool(bool),
    /// Relative path of a single stored upload, e.g. `documents/<token>_id.png`.
    File(String),
    /// Ordered stored-upload paths for a field that accepts multiple files.
    Files(Vec<String>),
    /// Named sub-sections, e.g. `education[ssc]` / `education[grad]`.
    Map(BTreeMap<String, FormValue>),
    /// Repeatable entries, e.g. `experience[0]`, `experience[1]`.
    List(Vec<BTreeMap<String, FormValue>>),
}

/// The nested result of parsing one flat form submission.
pub type ParsedSubmission = BTreeMap<String, FormValue>;

impl FormValue {
    /// Whether this slot resolved to at least one stored-file reference.
    pub fn is_file(&self) -> bool {
        match self {
            FormValue::File(path) => !path.is_empty(),
            FormValue::Files(paths) => !paths.is_empty(),
            _ => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FormValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, FormValue>> {
        match self {
            FormValue::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[BTreeMap<String, FormValue>]> {
        match self {
            FormValue::List(entries) => Some(entries),
            _ => None,
        }
    }
}
