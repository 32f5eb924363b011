// ============================================================
// Layer 2 — Batch Use Case
// ============================================================
// Analyses every png/jpg/jpeg in a directory with one analyzer
// and writes comparison_report.json:
//
//   {
//     "total": 3, "succeeded": 2, "failed": 1,
//     "average_score": 71.4,
//     "best":  { "rank": 1, "file": "a.png", "score": 80.2 },
//     "worst": { "rank": 2, "file": "b.png", "score": 62.6 },
//     "ranking": [...],
//     "results": [...]          ← one entry per file, in file order
//   }
//
// A failing file is recorded with its error and the batch moves
// on to the next one.
//
// Artefacts are named after the file stem. When two inputs share
// a stem (a.png and a.jpg), both are named after the full file
// name instead (a_png, a_jpg) so neither overwrites the other.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use crate::data::loader::list_images;
use crate::domain::report::rounded;
use crate::domain::traits::DesignAnalyzer;
use crate::infra::report_writer::ReportWriter;

pub const COMPARISON_FILE: &str = "comparison_report.json";

/// Outcome for one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchEntry {
    pub file:            String,
    pub success:         bool,
    pub score:           Option<f64>,
    pub saliency_source: Option<String>,
    pub issue_count:     Option<usize>,
    pub error:           Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedDesign {
    /// 1 = highest score
    pub rank:  usize,
    pub file:  String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub total:         usize,
    pub succeeded:     usize,
    pub failed:        usize,
    pub average_score: Option<f64>,
    pub best:          Option<RankedDesign>,
    pub worst:         Option<RankedDesign>,
    pub ranking:       Vec<RankedDesign>,
    pub results:       Vec<BatchEntry>,
}

impl ComparisonReport {
    pub fn from_entries(results: Vec<BatchEntry>) -> Self {
        let mut scored: Vec<(&str, f64)> = results
            .iter()
            .filter_map(|e| e.score.map(|s| (e.file.as_str(), s)))
            .collect();
        // highest first; file name breaks ties
        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        let ranking: Vec<RankedDesign> = scored
            .iter()
            .enumerate()
            .map(|(i, (file, score))| RankedDesign { rank: i + 1, file: file.to_string(), score: *score })
            .collect();

        let average_score = (!ranking.is_empty()).then(|| {
            rounded(ranking.iter().map(|r| r.score).sum::<f64>() / ranking.len() as f64, 2)
        });
        let succeeded = results.iter().filter(|e| e.success).count();

        Self {
            total:  results.len(),
            succeeded,
            failed: results.len() - succeeded,
            average_score,
            best:   ranking.first().cloned(),
            worst:  ranking.last().cloned(),
            ranking,
            results,
        }
    }
}

pub struct BatchUseCase<A: DesignAnalyzer> {
    analyzer:   A,
    input_dir:  PathBuf,
    output_dir: PathBuf,
}

impl<A: DesignAnalyzer> BatchUseCase<A> {
    pub fn new(analyzer: A, input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            analyzer,
            input_dir:  input_dir.into(),
            output_dir: output_dir.into(),
        }
    }

    pub fn execute(&self) -> Result<ComparisonReport> {
        let images = list_images(&self.input_dir)?;
        if images.is_empty() {
            tracing::warn!("No images found in '{}'", self.input_dir.display());
        } else {
            tracing::info!("Batch analysing {} images from '{}'", images.len(), self.input_dir.display());
        }

        let names = output_names(&images);
        let results: Vec<BatchEntry> = images
            .iter()
            .zip(&names)
            .map(|(path, name)| self.analyze_one(path, name))
            .collect();
        let report = ComparisonReport::from_entries(results);

        let path = ReportWriter::new(&self.output_dir)?.write_json(COMPARISON_FILE, &report)?;
        tracing::info!(
            "Batch done: {} succeeded, {} failed; comparison written to '{}'",
            report.succeeded,
            report.failed,
            path.display()
        );
        Ok(report)
    }

    fn analyze_one(&self, path: &Path, name: &str) -> BatchEntry {
        let file = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        match self.analyzer.analyze_file_as(path, name) {
            Ok(report) => BatchEntry {
                file,
                success:         true,
                score:           Some(report.score),
                saliency_source: Some(report.saliency_source),
                issue_count:     Some(report.issues.len()),
                error:           None,
            },
            Err(e) => {
                tracing::warn!("Skipping '{}': {e:#}", path.display());
                BatchEntry {
                    file,
                    success:         false,
                    score:           None,
                    saliency_source: None,
                    issue_count:     None,
                    error:           Some(format!("{e:#}")),
                }
            }
        }
    }
}

/// Artefact name per image: the stem, or the file name with its
/// dot replaced when another image shares the stem.
fn output_names(images: &[PathBuf]) -> Vec<String> {
    let stem = |p: &PathBuf| p.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();

    let mut counts: HashMap<String, usize> = HashMap::new();
    for path in images {
        *counts.entry(stem(path)).or_default() += 1;
    }

    images
        .iter()
        .map(|path| {
            let s = stem(path);
            if counts[&s] > 1 {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().replace('.', "_"))
                    .unwrap_or_default();
                tracing::warn!("'{}' shares its stem with another input; writing outputs as '{name}'", path.display());
                name
            } else {
                s
            }
        })
        .collect()
}
