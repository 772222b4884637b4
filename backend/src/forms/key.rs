//! Recursive-descent tokenizer for bracket-notation form keys.
//!
//! The grammar is `name`, `name[segment]` or `name[segment][field]`, where
//! `name` consists of word characters, `segment` is either a non-negative
//! integer (list semantics) or an arbitrary string (map semantics), and
//! `field` is any string. Anything outside the grammar is malformed and the
//! caller keeps the literal key instead of dropping the value.

/// One bracketed segment, classified by list versus map semantics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Index(usize),
    Key(String),
}

/// A well-formed form key.
///
/// `field` can only be present when `segment` is; `parse_key` never produces
/// the inverse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormKey {
    pub name: String,
    pub segment: Option<Segment>,
    pub field: Option<String>,
}

/// Parses a raw field name against the bracket grammar.
///
/// Returns `None` for malformed keys: an empty or non-word name, an unclosed
/// bracket, more than two bracket groups, or trailing characters after the
/// last group.
pub fn parse_key(raw: &str) -> Option<FormKey> {
    let mut rest = raw;

    let name_len = rest
        .char_indices()
        .find(|(_, c)| !c.is_alphanumeric() && *c != '_')
        .map(|(i, _)| i)
        .unwrap_or(rest.len());
    if name_len == 0 {
        return None;
    }
    let name = &rest[..name_len];
    rest = &rest[name_len..];

    let mut groups: Vec<String> = Vec::new();
    while !rest.is_empty() {
        if groups.len() == 2 || !rest.starts_with('[') {
            return None;
        }
        let close = rest.find(']')?;
        groups.push(rest[1..close].to_string());
        rest = &rest[close + 1..];
    }

    let mut groups = groups.into_iter();
    let segment = groups.next().map(classify);
    let field = groups.next();
    Some(FormKey {
        name: name.to_string(),
        segment,
        field,
    })
}

fn classify(group: String) -> Segment {
    if !group.is_empty() && group.bytes().all(|b| b.is_ascii_digit()) {
        match group.parse() {
            Ok(index) => Segment::Index(index),
            Err(_) => Segment::Key(group),
        }
    } else {
        Segment::Key(group)
    }
}
