// Reading a TEI collation: the witness list, chapter milestones, anchors
// between lemmata, and <app> elements carrying the variant readings.
//
// The document is read twice, forward only: once for the witness range
// (witStart/witEnd markers), once for lemmata, sigla and readings.

pub mod lemma;
pub mod markup;
pub mod scanner;
pub mod sigla;
pub mod variant;
pub mod witness_scope;

use anyhow::{ensure, Result};
use serde::Serialize;

use crate::collation::{
    lemma::Lemma,
    scanner::CollationScanner,
    sigla::SiglaMap,
    variant::VariantTables,
    witness_scope::{track_witness_scope, WitnessScope},
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Collation {
    pub sigla: SiglaMap,
    pub scope: WitnessScope,
    pub lemmata: Vec<Lemma>,
    pub variants: VariantTables,
}

pub fn collate(xml: &str) -> Result<Collation> {
    ensure!(!xml.trim().is_empty(), "Document is empty");

    let scope = track_witness_scope(xml)?;

    tracing::info!("collating...");
    let output = CollationScanner::new().scan(xml);
    tracing::info!(
        lemmata = output.lemmata.len(),
        witnesses = output.variants.witnesses().len(),
        "collation done"
    );

    Ok(Collation {
        sigla: output.sigla,
        scope,
        lemmata: output.lemmata,
        variants: output.variants,
    })
}
