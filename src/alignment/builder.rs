use std::collections::HashMap;

use serde::Serialize;

use crate::{
    alignment::tokenizer::tokenize,
    citation::CitationScheme,
    collation::{
        lemma::Lemma,
        variant::{VariantTables, WitnessId},
    },
};

// Reading used for a witness with no entry at a lemma
pub const NOT_ATTESTED: &str = "[[NA]]";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub urn: String,
    pub text: String,
}

// Base tokens first, then one group per witness
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alignment {
    pub urn: String,
    pub tokens: Vec<Token>,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlignmentSet {
    pub alignments: Vec<Alignment>,
    // edition URN -> its tokens in lemma order
    pub editions: HashMap<String, Vec<Token>>,
    // base edition first, witness editions after it
    pub edition_order: Vec<String>,
}

impl AlignmentSet {
    pub fn edition(&self, edition_urn: &str) -> Option<&[Token]> {
        self.editions.get(edition_urn).map(|tokens| tokens.as_slice())
    }

    pub fn token_count(&self) -> usize {
        self.editions.values().map(|tokens| tokens.len()).sum()
    }
}

pub struct AlignmentBuilder<'a> {
    scheme: &'a CitationScheme,
    variants: &'a VariantTables,
    // witness edition URN -> every witness printed under it, in `Ord` order
    witness_editions: Vec<(String, Vec<&'a WitnessId>)>,
    set: AlignmentSet,
}

impl<'a> AlignmentBuilder<'a> {
    pub fn new(scheme: &'a CitationScheme, variants: &'a VariantTables) -> Self {
        let mut witness_editions: Vec<(String, Vec<&'a WitnessId>)> = Vec::new();
        for witness in variants.witnesses() {
            let edition_urn = scheme.witness_edition_urn(witness);
            match witness_editions
                .iter_mut()
                .find(|(urn, _)| *urn == edition_urn)
            {
                Some((_, witnesses)) => {
                    tracing::warn!(
                        edition = %edition_urn,
                        "distinct witnesses share one edition, their readings are merged"
                    );
                    witnesses.push(witness);
                    witnesses.sort();
                }
                None => witness_editions.push((edition_urn, vec![witness])),
            }
        }

        let mut set = AlignmentSet::default();
        set.edition_order.push(scheme.base_edition_urn());
        set.edition_order
            .extend(witness_editions.iter().map(|(urn, _)| urn.clone()));

        AlignmentBuilder {
            scheme,
            variants,
            witness_editions,
            set,
        }
    }

    pub fn align(&mut self, lemma: &Lemma) {
        let mut tokens = edition_tokens(
            &mut self.set,
            &self.scheme.base_edition_urn(),
            lemma,
            &lemma.base_text,
        );

        for (edition_urn, witnesses) in &self.witness_editions {
            // the first witness of a shared edition with a reading wins
            let reading = witnesses
                .iter()
                .find_map(|witness| self.variants.reading(&lemma.urn, witness))
                .map(|reading| reading.as_str())
                .unwrap_or(NOT_ATTESTED);

            tokens.extend(edition_tokens(&mut self.set, edition_urn, lemma, reading));
        }

        self.set.alignments.push(Alignment {
            urn: self.scheme.alignment_urn(&lemma.urn),
            tokens,
        });
    }

    pub fn finish(self) -> AlignmentSet {
        self.set
    }
}

fn edition_tokens(
    set: &mut AlignmentSet,
    edition_urn: &str,
    lemma: &Lemma,
    text: &str,
) -> Vec<Token> {
    let tokens: Vec<Token> = tokenize(text)
        .into_iter()
        .enumerate()
        .map(|(i, text)| Token {
            urn: CitationScheme::token_urn(edition_urn, &lemma.urn, i + 1),
            text,
        })
        .collect();

    set.editions
        .entry(edition_urn.to_owned())
        .or_default()
        .extend(tokens.iter().cloned());

    tokens
}

pub fn build_alignments(
    scheme: &CitationScheme,
    lemmata: &[Lemma],
    variants: &VariantTables,
) -> AlignmentSet {
    let mut builder = AlignmentBuilder::new(scheme, variants);
    for lemma in lemmata {
        builder.align(lemma);
    }
    builder.finish()
}
