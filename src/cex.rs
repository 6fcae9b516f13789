// CITE exchange (CEX) output: '#'-delimited records under "#!section" headers

use anyhow::{anyhow, Context, Result};

use crate::{alignment::builder::AlignmentSet, citation::CitationScheme, collation::Collation};

pub const CEX_VERSION: &str = "3.0";

const ALIGNMENT_MODEL: &str = "urn:cite2:cite:datamodels.v1:alignment";
const ALIGNS_VERB: &str = "urn:cite2:cite:verbs.v1:aligns";

struct CexSection {
    header: &'static str,
    writer: csv::Writer<Vec<u8>>,
}

impl CexSection {
    fn new(header: &'static str) -> Self {
        let writer = csv::WriterBuilder::new()
            .delimiter(b'#')
            .quote_style(csv::QuoteStyle::Never)
            .terminator(csv::Terminator::Any(b'\n'))
            .has_headers(false)
            .flexible(true)
            .from_writer(Vec::new());

        CexSection { header, writer }
    }

    fn record<I, T>(&mut self, fields: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        self.writer
            .write_record(fields)
            .with_context(|| format!("Failed to write record in {}", self.header))
    }

    fn finish(self, out: &mut String) -> Result<()> {
        let header = self.header;
        let bytes = self
            .writer
            .into_inner()
            .map_err(|err| anyhow!("Failed to flush {}: {}", header, err))?;

        out.push_str("#!");
        out.push_str(header);
        out.push('\n');
        out.push_str(&String::from_utf8(bytes).with_context(|| format!("{} is not UTF-8", header))?);
        out.push('\n');

        Ok(())
    }
}

fn catalog_row<'a>(scheme: &'a CitationScheme, edition_urn: &'a str) -> [&'a str; 8] {
    [
        edition_urn,
        &scheme.citation_scheme,
        &scheme.group_name,
        &scheme.work_title,
        &scheme.version_label,
        &scheme.exemplar_label,
        "TRUE",
        &scheme.language,
    ]
}

pub fn write_cex(
    scheme: &CitationScheme,
    collation: &Collation,
    alignments: &AlignmentSet,
) -> Result<String> {
    tracing::debug!(
        lemmata = collation.lemmata.len(),
        witnesses = collation.variants.witnesses().len(),
        editions = alignments.edition_order.len(),
        "writing CEX"
    );

    let mut out = String::new();

    let mut section = CexSection::new("cexversion");
    section.record([CEX_VERSION])?;
    section.finish(&mut out)?;

    let mut section = CexSection::new("citelibrary");
    section.record(["name", scheme.library_name.as_str()])?;
    section.record(["urn", scheme.library_urn.as_str()])?;
    section.record(["license", scheme.library_license.as_str()])?;
    section.finish(&mut out)?;

    let mut section = CexSection::new("ctscatalog");
    section.record([
        "urn",
        "citationScheme",
        "groupName",
        "workTitle",
        "versionLabel",
        "exemplarLabel",
        "online",
        "language",
    ])?;
    for edition_urn in &alignments.edition_order {
        section.record(catalog_row(scheme, edition_urn))?;
    }
    section.finish(&mut out)?;

    let mut section = CexSection::new("ctsdata");
    for edition_urn in &alignments.edition_order {
        for token in alignments.edition(edition_urn).unwrap_or(&[]) {
            section.record([token.urn.as_str(), token.text.as_str()])?;
        }
    }
    section.finish(&mut out)?;

    let collection = scheme.alignment_collection.as_str();

    let mut section = CexSection::new("datamodels");
    section.record(["Collection", "Model", "Label", "Description"])?;
    section.record([
        collection,
        ALIGNMENT_MODEL,
        "Text Alignment Model",
        "The CITE model for text alignment. See documentation at <https://eumaeus.github.io/citealign/>.",
    ])?;
    section.finish(&mut out)?;

    let property = |name: &str| format!("{}{}:", collection.trim_end_matches(':'), name);

    let mut section = CexSection::new("citecollections");
    section.record([
        "URN",
        "Description",
        "Labelling property",
        "Ordering property",
        "License",
    ])?;
    section.record([
        collection,
        "Citation Alignments",
        property(".label").as_str(),
        "",
        "CC-BY 3.0",
    ])?;
    section.finish(&mut out)?;

    let mut section = CexSection::new("citeproperties");
    section.record(["Property", "Label", "Type", "Authority list"])?;
    section.record([property(".urn").as_str(), "Alignment Record", "Cite2Urn", ""])?;
    section.record([property(".label").as_str(), "Label", "String", ""])?;
    section.record([property(".description").as_str(), "Description", "String", ""])?;
    section.record([property(".editor").as_str(), "Editor", "String", ""])?;
    section.record([property(".date").as_str(), "Date", "String", ""])?;
    section.finish(&mut out)?;

    let mut section = CexSection::new("citedata");
    section.record(["urn", "label", "description", "editor", "date"])?;
    for (i, alignment) in alignments.alignments.iter().enumerate() {
        section.record([
            alignment.urn.as_str(),
            format!("Alignment {}", i + 1).as_str(),
            "Textual Alignment",
            scheme.editor.as_str(),
            scheme.date.as_str(),
        ])?;
    }
    section.finish(&mut out)?;

    let mut section = CexSection::new("relations");
    for alignment in &alignments.alignments {
        for token in &alignment.tokens {
            section.record([alignment.urn.as_str(), ALIGNS_VERB, token.urn.as_str()])?;
        }
    }
    section.finish(&mut out)?;

    Ok(out)
}
