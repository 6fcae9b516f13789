use std::{
    collections::{HashMap, HashSet},
    fmt,
};

use serde::{Serialize, Serializer};

use crate::{
    collation::{
        lemma::LemmaUrn,
        markup::MarkupNode,
        sigla::{SiglaMap, Siglum},
    },
    utility::str::strip_chars,
};

// Reading text of a witness that attests an omission
pub const OMISSION: &str = "[[om.]]";

// Apparatus type whose "vl" details count as authoritative readings
pub const VARIANT_LEMMA_APPARATUS: &str = "a6";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WitnessState {
    PostCorrection,  // _pc
    VariantLemma,    // _vl
    LaterCorrection, // _2pc
}

impl WitnessState {
    pub fn suffix(&self) -> &'static str {
        match self {
            WitnessState::PostCorrection => "pc",
            WitnessState::VariantLemma => "vl",
            WitnessState::LaterCorrection => "2pc",
        }
    }
}

// A witness as it is attested at one apparatus: its siglum plus an optional
// correction state. "A" and "A_pc" are different witnesses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WitnessId {
    pub siglum: Siglum,
    pub state: Option<WitnessState>,
}

impl WitnessId {
    pub fn plain(siglum: Siglum) -> Self {
        WitnessId {
            siglum,
            state: None,
        }
    }

    pub fn with_state(siglum: Siglum, state: WitnessState) -> Self {
        WitnessId {
            siglum,
            state: Some(state),
        }
    }
}

impl fmt::Display for WitnessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.state {
            Some(state) => write!(f, "{}_{}", self.siglum, state.suffix()),
            None => write!(f, "{}", self.siglum),
        }
    }
}

impl Serialize for WitnessId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reading {
    Text(String),
    Omitted,
}

impl Reading {
    // Line breaks are dropped, a blank reading is an omission
    pub fn from_variant_text(raw: &str) -> Self {
        let text = raw.replace('\n', "");
        if text.trim().is_empty() {
            Reading::Omitted
        } else {
            Reading::Text(text)
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Reading::Text(text) => text,
            Reading::Omitted => OMISSION,
        }
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Reading {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadingTable {
    Primary,
    Secondary, // not authoritative, never aligned
}

pub type ReadingsByWitness = HashMap<WitnessId, Reading>;

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantTables {
    primary: HashMap<LemmaUrn, ReadingsByWitness>,
    secondary: HashMap<LemmaUrn, ReadingsByWitness>,
    witnesses: HashSet<WitnessId>,
    secondary_witnesses: HashSet<WitnessId>,
    // "<raw>_<suffix>" -> suffixed witness
    derived_sigla: HashMap<String, WitnessId>,
}

impl VariantTables {
    pub fn new() -> Self {
        VariantTables::default()
    }

    // Last write wins on a repeated (lemma, witness) pair
    pub fn insert(
        &mut self,
        table: ReadingTable,
        urn: &LemmaUrn,
        witness: WitnessId,
        reading: Reading,
    ) -> Option<Reading> {
        let (readings, witnesses) = match table {
            ReadingTable::Primary => (&mut self.primary, &mut self.witnesses),
            ReadingTable::Secondary => (&mut self.secondary, &mut self.secondary_witnesses),
        };

        witnesses.insert(witness.clone());

        let previous = readings
            .entry(urn.clone())
            .or_default()
            .insert(witness.clone(), reading);

        if let Some(previous) = &previous {
            tracing::debug!(
                lemma = %urn,
                witness = %witness,
                previous = %previous,
                "witness re-attested, keeping latest reading"
            );
        }

        previous
    }

    pub fn register_derived_siglum(&mut self, raw: &str, witness: &WitnessId) {
        if let Some(state) = witness.state {
            self.derived_sigla
                .insert(format!("{}_{}", raw, state.suffix()), witness.clone());
        }
    }

    pub fn reading(&self, urn: &LemmaUrn, witness: &WitnessId) -> Option<&Reading> {
        self.primary.get(urn).and_then(|readings| readings.get(witness))
    }

    pub fn secondary_reading(&self, urn: &LemmaUrn, witness: &WitnessId) -> Option<&Reading> {
        self.secondary
            .get(urn)
            .and_then(|readings| readings.get(witness))
    }

    pub fn readings_at(&self, urn: &LemmaUrn) -> Option<&ReadingsByWitness> {
        self.primary.get(urn)
    }

    pub fn secondary_readings_at(&self, urn: &LemmaUrn) -> Option<&ReadingsByWitness> {
        self.secondary.get(urn)
    }

    // Every witness that has a primary reading somewhere, in no particular order
    pub fn witnesses(&self) -> &HashSet<WitnessId> {
        &self.witnesses
    }

    pub fn secondary_witnesses(&self) -> &HashSet<WitnessId> {
        &self.secondary_witnesses
    }

    pub fn derived_sigla(&self) -> &HashMap<String, WitnessId> {
        &self.derived_sigla
    }
}

// <rdg wit="#M1 #M2">text</rdg> or <rdg xml:id="r1">text</rdg>
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantReading {
    pub witnesses: String,
    pub id: Option<String>,
    pub text: String,
}

// <witDetail target="r1" wit="#M1">pc</witDetail>
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WitnessDetail {
    pub target: String,
    pub witness: String,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Apparatus {
    pub kind: String,
    pub readings: Vec<VariantReading>,
    pub details: Vec<WitnessDetail>,
}

impl Apparatus {
    pub fn from_node(app: &MarkupNode) -> Self {
        let readings = app
            .children_named("rdg")
            .map(|rdg| VariantReading {
                witnesses: rdg.attribute("wit").unwrap_or("").to_owned(),
                id: rdg
                    .attribute("id")
                    .filter(|id| !id.is_empty())
                    .map(|id| id.to_owned()),
                text: rdg.text.clone(),
            })
            .collect();

        let details = app
            .children_named("witDetail")
            .map(|detail| WitnessDetail {
                target: detail.attribute("target").unwrap_or("").to_owned(),
                witness: detail.attribute("wit").unwrap_or("").to_owned(),
                detail: detail.text.clone(),
            })
            .collect();

        Apparatus {
            kind: app.attribute("type").unwrap_or("").to_owned(),
            readings,
            details,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum DetailClass {
    PostCorrection,
    VariantLemma,
    Other { correction: bool },
}

impl DetailClass {
    fn of(detail: &str) -> Self {
        match detail.trim() {
            "pc" => DetailClass::PostCorrection,
            "vl" => DetailClass::VariantLemma,
            detail => DetailClass::Other {
                correction: detail.contains("pc"),
            },
        }
    }

    fn route(&self, apparatus_kind: &str) -> (ReadingTable, Option<WitnessState>) {
        match self {
            DetailClass::PostCorrection => {
                (ReadingTable::Secondary, Some(WitnessState::PostCorrection))
            }
            DetailClass::VariantLemma if apparatus_kind == VARIANT_LEMMA_APPARATUS => {
                (ReadingTable::Primary, Some(WitnessState::VariantLemma))
            }
            DetailClass::VariantLemma => (ReadingTable::Secondary, Some(WitnessState::VariantLemma)),
            DetailClass::Other { correction: true } => {
                (ReadingTable::Primary, Some(WitnessState::LaterCorrection))
            }
            DetailClass::Other { correction: false } => (ReadingTable::Primary, None),
        }
    }
}

// "#M12\n" -> "M12"
pub fn normalize_reference(raw: &str) -> String {
    strip_chars(raw, &[' ', '#', '\n'])
}

fn targets(detail: &WitnessDetail, id: &str) -> bool {
    detail.target.trim().trim_start_matches('#') == id
}

// Writes the readings of one apparatus into `tables` under `urn`
pub fn resolve_apparatus(
    apparatus: &Apparatus,
    urn: &LemmaUrn,
    sigla: &SiglaMap,
    tables: &mut VariantTables,
) {
    for variant in &apparatus.readings {
        let reading = Reading::from_variant_text(&variant.text);

        match &variant.id {
            Some(id) => {
                for detail in apparatus.details.iter().filter(|d| targets(d, id)) {
                    let raw = normalize_reference(&detail.witness);
                    if raw.is_empty() {
                        tracing::debug!(lemma = %urn, "witDetail without witness, skipped");
                        continue;
                    }

                    let siglum = resolve(sigla, &raw, urn);
                    let (table, state) = DetailClass::of(&detail.detail).route(&apparatus.kind);
                    let witness = WitnessId { siglum, state };

                    tables.register_derived_siglum(&raw, &witness);
                    tables.insert(table, urn, witness, reading.clone());
                }
            }

            None => {
                for raw in variant.witnesses.split(' ') {
                    let raw = normalize_reference(raw);
                    if raw.is_empty() {
                        continue;
                    }

                    let witness = WitnessId::plain(resolve(sigla, &raw, urn));
                    tables.insert(ReadingTable::Primary, urn, witness, reading.clone());
                }
            }
        }
    }
}

fn resolve(sigla: &SiglaMap, raw: &str, urn: &LemmaUrn) -> Siglum {
    let siglum = sigla.resolve(raw);
    if !siglum.is_resolved() {
        tracing::warn!(lemma = %urn, witness = raw, "witness is not in the witness list");
    }
    siglum
}
