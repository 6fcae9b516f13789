use std::mem;

use quick_xml::{events::Event, Reader};

use crate::collation::{
    lemma::{Lemma, LemmaUrn, DEFAULT_CHAPTER, PRELIM_CHAPTER},
    markup::{read_element, text_content, MarkupNode},
    sigla::SiglaMap,
    variant::{resolve_apparatus, Apparatus, VariantTables},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Prelim,    // before the first chapter milestone, nothing is captured
    InChapter, // running text is base text
}

// Output of the main pass
#[derive(Debug, Default)]
pub struct ScanOutput {
    pub sigla: SiglaMap,
    pub lemmata: Vec<Lemma>,
    pub variants: VariantTables,
}

pub struct CollationScanner {
    state: ScanState,
    chapter: String,
    lemma_index: usize,
    body_open: bool,
    note_open: bool,
    // URN of the apparatus group at the current lemma, if one is open
    apparatus: Option<LemmaUrn>,
    buffer: String,
    output: ScanOutput,
}

impl CollationScanner {
    pub fn new() -> Self {
        CollationScanner {
            state: ScanState::Prelim,
            chapter: PRELIM_CHAPTER.to_owned(),
            lemma_index: 1,
            body_open: false,
            note_open: false,
            apparatus: None,
            buffer: String::new(),
            output: ScanOutput::default(),
        }
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn chapter(&self) -> &str {
        &self.chapter
    }

    // <milestone unit="chapter" n="3.1.2"/>
    pub fn on_milestone(&mut self, milestone: &MarkupNode) {
        if milestone.attribute("unit") != Some("chapter") {
            return;
        }

        self.chapter = milestone.attribute("n").unwrap_or("").to_owned();
        self.lemma_index = 1;
        self.state = ScanState::InChapter;

        tracing::debug!(chapter = %self.chapter, "chapter start");
    }

    pub fn on_anchor(&mut self) {
        if self.state != ScanState::InChapter {
            return;
        }

        self.flush();
        self.lemma_index += 1;
        self.apparatus = None;
    }

    // Returns the URN the apparatus readings belong to
    pub fn open_apparatus(&mut self) -> LemmaUrn {
        if let Some(urn) = &self.apparatus {
            return urn.clone();
        }

        if self.chapter == PRELIM_CHAPTER {
            tracing::warn!(
                chapter = DEFAULT_CHAPTER,
                "apparatus before any chapter milestone, assuming default chapter"
            );
            self.chapter = DEFAULT_CHAPTER.to_owned();
        }

        let urn = LemmaUrn::new(&self.chapter, self.lemma_index);
        self.apparatus = Some(urn.clone());
        urn
    }

    pub fn on_apparatus(&mut self, urn: &LemmaUrn, app: &MarkupNode) {
        let apparatus = Apparatus::from_node(app);
        resolve_apparatus(
            &apparatus,
            urn,
            &self.output.sigla,
            &mut self.output.variants,
        );
    }

    // Witness lists are declared in the header; inside <body> they are not sigla
    pub fn accepts_witness_list(&self) -> bool {
        !self.body_open
    }

    pub fn on_witness_list(&mut self, list_wit: &MarkupNode) {
        self.output.sigla.register_witness_list(list_wit);
        tracing::info!(sigla = self.output.sigla.len(), "witness list registered");
    }

    pub fn set_note_open(&mut self, open: bool) {
        self.note_open = open;
    }

    pub fn set_body_open(&mut self, open: bool) {
        self.body_open = open;
    }

    pub fn on_text(&mut self, text: &str) {
        if self.state != ScanState::InChapter || !self.body_open || self.note_open {
            return;
        }
        self.buffer.push_str(&text.replace('\n', " "));
    }

    fn flush(&mut self) {
        let urn = LemmaUrn::new(&self.chapter, self.lemma_index);
        let base_text = mem::take(&mut self.buffer);
        tracing::debug!(lemma = %urn, "lemma");
        self.output.lemmata.push(Lemma { urn, base_text });
    }

    // Trailing text after the last anchor becomes one more lemma
    pub fn finish(mut self) -> ScanOutput {
        self.flush();
        self.output
    }

    pub fn scan(mut self, xml: &str) -> ScanOutput {
        let mut reader = Reader::from_str(xml);
        // end tag mismatches surface in the fragment parse of the enclosing element
        reader.check_end_names(false);

        loop {
            let event = match reader.read_event() {
                Ok(event) => event,
                Err(err) => {
                    tracing::warn!(
                        position = reader.buffer_position(),
                        %err,
                        "malformed markup, collation scan stops here"
                    );
                    break;
                }
            };

            let (start, is_empty) = match event {
                Event::Start(start) => (start, false),
                Event::Empty(start) => (start, true),

                Event::End(end) => {
                    match end.local_name().as_ref() {
                        b"note" => self.set_note_open(false),
                        b"body" => self.set_body_open(false),
                        _ => {}
                    }
                    continue;
                }

                Event::Text(text) => {
                    self.on_text(&text_content(&text));
                    continue;
                }
                Event::CData(data) => {
                    self.on_text(&String::from_utf8_lossy(&data));
                    continue;
                }

                Event::Eof => break,
                _ => continue,
            };

            match start.local_name().as_ref() {
                b"listWit" if !is_empty && self.accepts_witness_list() => {
                    match read_element(&mut reader, xml, &start, is_empty) {
                        Ok(list_wit) => self.on_witness_list(&list_wit),
                        Err(err) => tracing::warn!(%err, "skipping malformed witness list"),
                    }
                }

                b"milestone" => match read_element(&mut reader, xml, &start, is_empty) {
                    Ok(milestone) => self.on_milestone(&milestone),
                    Err(err) => tracing::warn!(%err, "skipping malformed milestone"),
                },

                b"anchor" => {
                    if let Err(err) = read_element(&mut reader, xml, &start, is_empty) {
                        tracing::warn!(%err, "malformed anchor");
                    }
                    self.on_anchor();
                }

                b"app" => {
                    let urn = self.open_apparatus();
                    match read_element(&mut reader, xml, &start, is_empty) {
                        Ok(app) => self.on_apparatus(&urn, &app),
                        Err(err) => {
                            tracing::warn!(lemma = %urn, %err, "skipping malformed apparatus")
                        }
                    }
                }

                b"note" if !is_empty => self.set_note_open(true),
                b"body" if !is_empty => self.set_body_open(true),

                _ => {}
            }
        }

        self.finish()
    }
}

impl Default for CollationScanner {
    fn default() -> Self {
        CollationScanner::new()
    }
}
