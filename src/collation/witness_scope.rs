use std::collections::{BTreeMap, HashMap};

use anyhow::Result;
use quick_xml::{events::Event, Reader};
use serde::Serialize;

use crate::collation::{
    lemma::{DEFAULT_CHAPTER, PRELIM_CHAPTER},
    markup::{read_element, MarkupNode},
};

// Apparatus type carrying witness start/end markers
pub const SCOPE_APPARATUS: &str = "a1";

const WITNESS_START: &str = "witStart";
const WITNESS_END: &str = "witEnd";

// Witness presence (true: collated) as of the last anchor of each chapter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct WitnessScope {
    chapters: HashMap<String, BTreeMap<String, bool>>,
}

impl WitnessScope {
    pub fn chapter(&self, chapter: &str) -> Option<&BTreeMap<String, bool>> {
        self.chapters.get(chapter)
    }

    pub fn active_in<'a>(&'a self, chapter: &str) -> impl Iterator<Item = &'a str> {
        self.chapters
            .get(chapter)
            .into_iter()
            .flat_map(|presence| presence.iter())
            .filter(|(_, active)| **active)
            .map(|(witness, _)| witness.as_str())
    }

    pub fn chapters(&self) -> impl Iterator<Item = (&str, &BTreeMap<String, bool>)> {
        self.chapters.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeMarker {
    Start,
    End,
}

impl ScopeMarker {
    fn of(name: &str) -> Option<Self> {
        match name {
            WITNESS_START => Some(ScopeMarker::Start),
            WITNESS_END => Some(ScopeMarker::End),
            _ => None,
        }
    }
}

// "#M12 #M7a," -> ["M12", "M7a"]
// An id is '#', letters, at least one digit, then anything up to a separator.
pub fn extract_witness_ids(references: &str) -> Vec<String> {
    references
        .split(|c: char| c.is_whitespace() || c == ',' || c == '"' || c == '\'')
        .filter_map(|token| token.strip_prefix('#'))
        .filter(|code| is_witness_code(code))
        .map(|code| code.to_owned())
        .collect()
}

fn is_witness_code(code: &str) -> bool {
    let prefix_len = code
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .count();
    prefix_len > 0
        && code[prefix_len..]
            .chars()
            .next()
            .map_or(false, |c| c.is_ascii_digit())
}

// Markers found in the readings of one apparatus, in document order
pub fn scope_markers(app: &MarkupNode) -> Vec<(ScopeMarker, Vec<String>)> {
    let mut markers = Vec::new();

    for reading in app
        .descendants()
        .into_iter()
        .filter(|node| node.name == "rdg" || node.name == "lem")
    {
        let witnesses = extract_witness_ids(reading.attribute("wit").unwrap_or(""));
        for node in reading.descendants().into_iter().skip(1) {
            if let Some(marker) = ScopeMarker::of(&node.name) {
                markers.push((marker, witnesses.clone()));
            }
        }
    }

    markers
}

struct ScopeTracker {
    chapter: String,
    apparatus_open: bool,
    presence: BTreeMap<String, bool>,
    scope: WitnessScope,
}

impl ScopeTracker {
    fn new() -> Self {
        ScopeTracker {
            chapter: PRELIM_CHAPTER.to_owned(),
            apparatus_open: false,
            presence: BTreeMap::new(),
            scope: WitnessScope::default(),
        }
    }

    fn on_milestone(&mut self, unit: Option<&str>, n: Option<&str>) {
        if unit == Some("chapter") {
            self.chapter = n.unwrap_or("").to_owned();
        }
    }

    fn on_anchor(&mut self) {
        self.scope
            .chapters
            .insert(self.chapter.clone(), self.presence.clone());
        self.apparatus_open = false;
    }

    fn on_apparatus_start(&mut self) {
        if !self.apparatus_open && self.chapter == PRELIM_CHAPTER {
            self.chapter = DEFAULT_CHAPTER.to_owned();
        }
        self.apparatus_open = true;
    }

    fn on_apparatus(&mut self, app: &MarkupNode) {
        if app.attribute("type") != Some(SCOPE_APPARATUS) {
            return;
        }

        for (marker, witnesses) in scope_markers(app) {
            match marker {
                ScopeMarker::Start => {
                    tracing::info!(chapter = %self.chapter, ?witnesses, "witness start");
                }
                ScopeMarker::End => {
                    tracing::info!(chapter = %self.chapter, ?witnesses, "witness end");
                }
            }
            for witness in witnesses {
                self.presence.insert(witness, marker == ScopeMarker::Start);
            }
        }
    }
}

// First pass over the document: which witnesses are collated where
pub fn track_witness_scope(xml: &str) -> Result<WitnessScope> {
    tracing::info!("establishing witness range...");

    let mut reader = Reader::from_str(xml);
    // end tag mismatches surface in the fragment parse of the enclosing element
    reader.check_end_names(false);
    let mut tracker = ScopeTracker::new();

    loop {
        let (start, is_empty) = match reader.read_event() {
            Ok(Event::Start(start)) => (start, false),
            Ok(Event::Empty(start)) => (start, true),
            Ok(Event::Eof) => break,
            Ok(_) => continue,
            Err(err) => {
                tracing::warn!(
                    position = reader.buffer_position(),
                    %err,
                    "malformed markup, witness range scan stops here"
                );
                break;
            }
        };

        match start.local_name().as_ref() {
            b"milestone" => match read_element(&mut reader, xml, &start, is_empty) {
                Ok(milestone) => {
                    tracker.on_milestone(milestone.attribute("unit"), milestone.attribute("n"))
                }
                Err(err) => tracing::warn!(%err, "skipping malformed milestone"),
            },

            b"anchor" => tracker.on_anchor(),

            b"app" => {
                tracker.on_apparatus_start();
                match read_element(&mut reader, xml, &start, is_empty) {
                    Ok(app) => tracker.on_apparatus(&app),
                    Err(err) => tracing::warn!(%err, "skipping malformed apparatus"),
                }
            }

            _ => continue,
        }
    }

    tracing::info!(chapters = tracker.scope.len(), "witness range done");

    Ok(tracker.scope)
}
