use std::fmt;

use serde::{Serialize, Serializer};

// Working chapter label before the first chapter milestone
pub const PRELIM_CHAPTER: &str = "prelim";

// Chapter assumed when an apparatus shows up before any chapter milestone
pub const DEFAULT_CHAPTER: &str = "3.1.1";

// `<chapter>.<index>`, index is 1-based within the chapter
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LemmaUrn {
    pub chapter: String,
    pub index: usize,
}

impl LemmaUrn {
    pub fn new(chapter: &str, index: usize) -> Self {
        LemmaUrn {
            chapter: chapter.to_owned(),
            index,
        }
    }
}

impl fmt::Display for LemmaUrn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.chapter, self.index)
    }
}

impl Serialize for LemmaUrn {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Lemma {
    pub urn: LemmaUrn,
    pub base_text: String,
}
