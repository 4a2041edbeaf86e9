//! Minimal frontmatter parsing for `SKILL.md` files.
//!
//! One `key: value` per line, with `[a, b]` values read as lists. Values
//! are taken verbatim; malformed input yields an empty record.

use std::collections::BTreeMap;

const DELIMITER: &str = "---";

/// A single frontmatter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Raw string value.
    Text(String),
    /// Bracketed, comma-separated list.
    List(Vec<String>),
}

impl FieldValue {
    /// Returns the value if it is text.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::List(_) => None,
        }
    }

    /// Returns the items if the value is a list.
    #[must_use]
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::Text(_) => None,
            Self::List(items) => Some(items),
        }
    }
}

/// Parsed frontmatter record, keyed by field name.
pub type Frontmatter = BTreeMap<String, FieldValue>;

/// Parses the leading `---` delimited block of `content`.
///
/// Returns an empty record when the text does not open with a delimiter
/// line or the block is never closed.
///
/// # Examples
///
/// ```
/// use skillpin::{parse_frontmatter, FieldValue};
///
/// let fm = parse_frontmatter("---\nname: pdf\ntags: [docs, files]\n---\n# PDF\n");
/// assert_eq!(fm["name"], FieldValue::Text("pdf".into()));
/// assert_eq!(fm["tags"], FieldValue::List(vec!["docs".into(), "files".into()]));
/// ```
#[must_use]
pub fn parse_frontmatter(content: &str) -> Frontmatter {
    let mut record = Frontmatter::new();
    let mut lines = content.lines().map(|l| l.trim_end_matches('\r'));

    if lines.next().map(str::trim_end) != Some(DELIMITER) {
        return record;
    }

    let mut block = Vec::new();
    let mut closed = false;
    for line in lines {
        if line.trim_end() == DELIMITER {
            closed = true;
            break;
        }
        block.push(line);
    }
    if !closed {
        return record;
    }

    for line in block {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        record.insert(key.to_string(), parse_value(value.trim()));
    }
    record
}

fn parse_value(raw: &str) -> FieldValue {
    match raw.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
        Some(inner) => FieldValue::List(
            inner
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(String::from)
                .collect(),
        ),
        None => FieldValue::Text(raw.to_string()),
    }
}
