// URN prefixes and catalog labels of the exported editions

use serde::Serialize;

use crate::collation::{lemma::LemmaUrn, variant::WitnessId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CitationScheme {
    pub passage_base: String,         // urn:cts:<namespace>:<group>.<work>.
    pub base_edition: String,         // version label of the base text
    pub alignment_collection: String, // urn:cite2:...:
    pub library_name: String,
    pub library_urn: String,
    pub library_license: String,
    pub citation_scheme: String,
    pub group_name: String,
    pub work_title: String,
    pub version_label: String,
    pub exemplar_label: String,
    pub language: String,
    pub editor: String,
    pub date: String,
}

impl Default for CitationScheme {
    fn default() -> Self {
        CitationScheme {
            passage_base: "urn:cts:sktlit:skt0001.nyaya002.".to_owned(),
            base_edition: "DFG".to_owned(),
            alignment_collection: "urn:cite2:ducat:alignments.temp:".to_owned(),
            library_name: "CITE Library generated by Brucheion".to_owned(),
            library_urn: "urn:cite2:cex:brucheion.version1:123".to_owned(),
            library_license: "CC Share Alike.".to_owned(),
            citation_scheme: "NyayaScheme".to_owned(),
            group_name: "GroupName".to_owned(),
            work_title: "WorkTitle".to_owned(),
            version_label: "VersionLabel".to_owned(),
            exemplar_label: "Brucheion-Tokenised".to_owned(),
            language: "san".to_owned(),
            editor: "Brucheion User".to_owned(),
            date: "Sun, 19 Apr 2020 12:30:32 GMT".to_owned(),
        }
    }
}

impl CitationScheme {
    pub fn base_edition_urn(&self) -> String {
        format!("{}{}.token:", self.passage_base, self.base_edition)
    }

    pub fn witness_edition_urn(&self, witness: &WitnessId) -> String {
        format!("{}{}.token:", self.passage_base, witness)
    }

    pub fn alignment_urn(&self, lemma: &LemmaUrn) -> String {
        format!("{}{}", self.alignment_collection, lemma)
    }

    pub fn token_urn(edition_urn: &str, lemma: &LemmaUrn, index: usize) -> String {
        format!("{}{}_{}", edition_urn, lemma, index)
    }
}
