// Plain-text dump of what was read, for eyeballing a collation run

use std::fmt::Write;

use anyhow::Result;

use crate::{
    alignment::builder::{AlignmentSet, NOT_ATTESTED},
    collation::Collation,
};

const LEMMA_SEPARATOR: &str = "---------------------------------------------";
const CHAPTER_SEPARATOR: &str = "______________________________";

pub fn render_report(collation: &Collation, alignments: &AlignmentSet) -> Result<String> {
    let mut out = String::new();

    for lemma in &collation.lemmata {
        writeln!(out, "{}", LEMMA_SEPARATOR)?;
        writeln!(out, "Position: {} Reading: {}", lemma.urn, lemma.base_text)?;
        writeln!(out, "Variants:")?;
        for witness in collation.variants.witnesses() {
            let reading = collation
                .variants
                .reading(&lemma.urn, witness)
                .map(|reading| reading.as_str())
                .unwrap_or(NOT_ATTESTED);
            writeln!(out, "{} Reading: {}", witness, reading)?;
        }
        if let Some(readings) = collation.variants.secondary_readings_at(&lemma.urn) {
            for (witness, reading) in readings {
                writeln!(out, "{} (secondary) Reading: {}", witness, reading)?;
            }
        }
    }

    for (key, siglum) in collation.sigla.iter() {
        writeln!(out, "key: {} value: {}", key, siglum)?;
    }
    for (key, witness) in collation.variants.derived_sigla() {
        writeln!(out, "key: {} value: {}", key, witness)?;
    }

    writeln!(out, "Parsed {} lemmata...", alignments.alignments.len())?;

    for (chapter, presence) in collation.scope.chapters() {
        writeln!(out, "{}", CHAPTER_SEPARATOR)?;
        writeln!(out, "Passage: {}", chapter)?;
        for (witness, active) in presence {
            writeln!(out, "key: {} value: {}", witness, active)?;
        }
    }

    Ok(out)
}
