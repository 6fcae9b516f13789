use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressIterator, ProgressStyle};
use serde::Serialize;
use std::{env, fs, path::PathBuf};
use tracing_subscriber::{filter::LevelFilter, EnvFilter};

use collation_cex::{
    alignment::builder::{AlignmentBuilder, AlignmentSet},
    cex::write_cex,
    citation::CitationScheme,
    collation::{collate, Collation},
    report::render_report,
    utility::encoding::read_markup,
};

static DEFAULT_INPUT: &str = "2020_02_19_Collation_NBh 3.xml";
static DEFAULT_OUTPUT: &str = "output.cex";
static DEFAULT_REPORT: &str = "report.txt";

#[derive(Serialize)]
struct ExportedTables<'a> {
    scheme: &'a CitationScheme,
    collation: &'a Collation,
    alignments: &'a AlignmentSet,
}

struct Args {
    input_path: PathBuf,
    output_path: PathBuf,
    report_path: PathBuf,
    json_path: Option<PathBuf>,
}

fn get_args() -> Result<Option<Args>> {
    let args: Vec<String> = env::args().skip(1).collect();

    let mut opts = getopts::Options::new();
    opts.optopt("o", "output", "CEX output file", "FILE");
    opts.optopt("r", "report", "diagnostic report file", "FILE");
    opts.optopt("j", "json", "also dump the lookup tables as JSON", "FILE");
    opts.optflag("h", "help", "print this help");

    let matches = match opts.parse(&args) {
        Ok(m) => m,
        Err(f) => bail!(f),
    };

    if matches.opt_present("h") {
        let brief = "Usage: collation-cex [options] [COLLATION.xml]";
        print!("{}", opts.usage(brief));
        return Ok(None);
    }

    let input_path = PathBuf::from(matches.free.get(0).map_or(DEFAULT_INPUT, |s| s.as_str()));
    let output_path = PathBuf::from(matches.opt_str("o").as_deref().unwrap_or(DEFAULT_OUTPUT));
    let report_path = PathBuf::from(matches.opt_str("r").as_deref().unwrap_or(DEFAULT_REPORT));
    let json_path = matches.opt_str("j").map(PathBuf::from);

    Ok(Some(Args {
        input_path,
        output_path,
        report_path,
        json_path,
    }))
}

fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .with_env_var("LOG")
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    init_logging();

    let args = match get_args()? {
        Some(args) => args,
        None => return Ok(()),
    };

    let xml = read_markup(&args.input_path)?;

    let collation = collate(&xml)
        .with_context(|| format!("Failed to collate {}", args.input_path.display()))?;

    let scheme = CitationScheme::default();

    tracing::info!("aligning...");
    let alignments = {
        let mut builder = AlignmentBuilder::new(&scheme, &collation.variants);
        let pb = create_progress_bar(collation.lemmata.len() as u64);
        for lemma in collation.lemmata.iter().progress_with(pb) {
            builder.align(lemma);
        }
        builder.finish()
    };
    tracing::info!(
        alignments = alignments.alignments.len(),
        tokens = alignments.token_count(),
        "parsed lemmata"
    );

    // everything is rendered before the first file is written
    let report = render_report(&collation, &alignments).context("Failed to render report")?;
    let cex = write_cex(&scheme, &collation, &alignments).context("Failed to render CEX")?;
    let json = match &args.json_path {
        Some(_) => Some(serde_json::to_string_pretty(&ExportedTables {
            scheme: &scheme,
            collation: &collation,
            alignments: &alignments,
        })?),
        None => None,
    };

    fs::write(&args.report_path, report)
        .with_context(|| format!("Failed to write {}", args.report_path.display()))?;
    fs::write(&args.output_path, cex)
        .with_context(|| format!("Failed to write {}", args.output_path.display()))?;
    if let (Some(json_path), Some(json)) = (&args.json_path, json) {
        fs::write(json_path, json)
            .with_context(|| format!("Failed to write {}", json_path.display()))?;
    }

    tracing::info!(output = %args.output_path.display(), "finished");

    Ok(())
}

fn create_progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::with_template(
            "{percent:>3}% [{wide_bar:.cyan/blue}] {pos}/{len} [{elapsed_precise} < {eta_precise}]",
        )
        .unwrap()
        .progress_chars("#-"),
    );
    pb
}
