use std::{collections::HashMap, fmt};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::collation::markup::MarkupNode;

// Canonical short name of a witness, or the raw reference that had none
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case", tag = "type", content = "value")]
pub enum Siglum {
    Resolved(String),
    Unresolved(String),
}

impl Siglum {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Siglum::Resolved(_))
    }
}

impl fmt::Display for Siglum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Siglum::Resolved(siglum) => write!(f, "{}", siglum),
            Siglum::Unresolved(raw) => write!(f, "unresolved_{}", raw),
        }
    }
}

// External witness id (`sameAs` of a `<witness>`) -> canonical siglum
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct SiglaMap {
    entries: HashMap<String, String>,
}

impl SiglaMap {
    pub fn new() -> Self {
        SiglaMap::default()
    }

    // Lookups never fail; a miss is carried as `Siglum::Unresolved`
    pub fn resolve(&self, raw: &str) -> Siglum {
        match self.entries.get(raw) {
            Some(siglum) => Siglum::Resolved(siglum.clone()),
            None => Siglum::Unresolved(raw.to_owned()),
        }
    }

    pub fn get(&self, raw: &str) -> Option<&str> {
        self.entries.get(raw).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    // <listWit>
    //   <witness sameAs="M12"><abbr>A <hi>pc</hi></abbr></witness>
    // </listWit>
    pub fn register_witness_list(&mut self, list_wit: &MarkupNode) {
        for witness in list_wit.children_named("witness") {
            let key = witness.attribute("sameAs").unwrap_or("").trim();
            if key.is_empty() {
                tracing::debug!("skipping witness without sameAs");
                continue;
            }

            let mut labels = Vec::new();
            for abbr in witness.children_named("abbr") {
                labels.extend(normalize_label(&abbr.text));
                for extension in abbr.children_named("hi") {
                    labels.extend(normalize_label(&extension.text));
                }
            }

            let siglum = labels.join("_");
            tracing::debug!(witness = key, siglum = %siglum, "registered siglum");
            self.entries.insert(key.to_owned(), siglum);
        }
    }
}

impl FromIterator<(String, String)> for SiglaMap {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        SiglaMap {
            entries: iter.into_iter().collect(),
        }
    }
}

// "^!" marks a note witness
static NOTE_MARKER: &str = "^!";

// U+2006 SIX-PER-EM SPACE survives the whitespace collapse below
static NARROW_SPACE: char = '\u{2006}';

pub fn normalize_label(raw: &str) -> Option<String> {
    static REGEX_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t\r\n\x0C]+").unwrap());

    let label = raw.replace(NOTE_MARKER, "Note");
    let label = label.replace(['(', ')'], "");
    let label = REGEX_WHITESPACE.replace_all(label.trim(), "_");
    let label = label.replace(NARROW_SPACE, "");

    if label.is_empty() {
        None
    } else {
        Some(label)
    }
}
