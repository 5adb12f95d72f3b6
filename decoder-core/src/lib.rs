//! Decoder for Adventure Communist `game.sav` files plus an experiment
//! ROI analyzer on top of the decoded snapshot. The format is
//! undocumented; the decoder is a best-effort scraper built on positional
//! heuristics and plausibility filters, tolerant of drift between save
//! revisions.

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use thiserror::Error;

pub mod cards;
pub mod experiments;
pub mod report;
pub mod save;

pub use save::{
    decode_save, decode_save_with, CardRecord, OrderedMap, ScanConfig, ScientistCandidate,
    Snapshot, MAGIC,
};

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("not an Adventure Communist save (missing ADCM tag at offset 4)")]
    InvalidFormat,
    #[error("JSON export error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DecodeError>;

#[derive(Debug, Clone)]
pub struct DecoderSettings {
    pub save_path: PathBuf,
    /// Write `decoded_save.json` next to the input on success.
    pub write_json: bool,
    /// Append the experiment ROI analysis to the report.
    pub analyze: bool,
    /// Experiment names already researched in-game. The save does not
    /// record which experiments are owned, only how many, so this comes
    /// from the caller.
    pub researched: Vec<String>,
    /// Recommendation list length.
    pub top_n: usize,
}

impl Default for DecoderSettings {
    fn default() -> Self {
        Self {
            save_path: PathBuf::from("game.sav"),
            write_json: true,
            analyze: false,
            researched: Vec::new(),
            top_n: 20,
        }
    }
}

pub struct RunOutput {
    pub snapshot: Snapshot,
    pub report: String,
    /// Present when the JSON export was written.
    pub json_path: Option<PathBuf>,
}

/// Read, decode and format one save file. A failed decode (unreadable
/// file, bad tag) returns an error and writes nothing; a partially-empty
/// decode still produces a full report with its empty sections marked.
pub fn run(settings: &DecoderSettings) -> Result<RunOutput> {
    let data = fs::read(&settings.save_path)?;
    let snapshot = save::decode_save(&data)?;

    let mut report = report::format_snapshot(&snapshot, &settings.save_path.display().to_string());

    if settings.analyze {
        let researched: HashSet<String> = settings.researched.iter().cloned().collect();
        let (recommendations, scientists) =
            experiments::analyze_experiments(&snapshot, &researched);
        let production = experiments::industry_production(&snapshot);

        report.push('\n');
        report.push_str(&report::format_recommendations(
            &recommendations,
            scientists,
            &production,
            settings.top_n,
        ));
    }

    let json_path = if settings.write_json {
        let path = settings.save_path.with_file_name("decoded_save.json");
        let export = report::SaveExport::from_snapshot(&snapshot);
        fs::write(&path, serde_json::to_string_pretty(&export)?)?;
        Some(path)
    } else {
        None
    };

    Ok(RunOutput {
        snapshot,
        report,
        json_path,
    })
}
