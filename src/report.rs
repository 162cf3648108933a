//! Rendering of an [`AnalysisReport`] for the outside world.

use std::io::Write;

use serde::Serialize;

use crate::data::loader::{ABSORBANCE_COLUMN, WAVENUMBER_COLUMN};
use crate::pipeline::{AnalysisReport, Outcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    Text,
    Json,
    Csv,
}

/// Peak row as shown to users: absorbance rounded to 4 places.
#[derive(Debug, Serialize)]
struct PeakRow {
    index: usize,
    wavenumber: f64,
    absorbance: f64,
    prominence: f64,
    width: f64,
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    samples: usize,
    num_peaks: usize,
    peaks: Vec<PeakRow>,
    groups: &'a [String],
    distinct_groups: Vec<&'a str>,
    matched: Option<&'a str>,
    outcome: &'a Outcome,
}

fn peak_rows(report: &AnalysisReport) -> Vec<PeakRow> {
    report
        .peaks
        .iter()
        .map(|p| PeakRow {
            index: p.index,
            wavenumber: p.wavenumber,
            absorbance: p.display_absorbance(),
            prominence: p.prominence,
            width: p.width,
        })
        .collect()
}

pub fn render(report: &AnalysisReport, format: ReportFormat) -> anyhow::Result<String> {
    match format {
        ReportFormat::Text => Ok(format_text(report)),
        ReportFormat::Json => format_json(report),
        ReportFormat::Csv => format_csv(report),
    }
}

/// Human-readable table.
pub fn format_text(report: &AnalysisReport) -> String {
    let mut output = String::new();
    output.push_str(&format!("FTIR analysis ({} samples)\n", report.spectrum.len()));
    output.push_str(&"═".repeat(60));
    output.push('\n');

    if report.peaks.is_empty() {
        output.push_str("  No peaks found\n");
    } else {
        output.push_str(&format!(
            "{:>4}  {:>7}  {:>16}  {:>10}  {:>8}\n",
            "#", "Index", "Wavenumber (cm⁻¹)", "Absorbance", "Width"
        ));
        output.push_str(&"─".repeat(60));
        output.push('\n');
        for (i, p) in report.peaks.iter().enumerate() {
            output.push_str(&format!(
                "{:>4}  {:>7}  {:>16.2}  {:>10.4}  {:>8.2}\n",
                i + 1,
                p.index,
                p.wavenumber,
                p.display_absorbance(),
                p.width
            ));
        }
    }

    output.push('\n');
    let distinct = report.distinct_groups();
    if distinct.is_empty() {
        output.push_str("Functional groups: none\n");
    } else {
        output.push_str("Functional groups:\n");
        for g in distinct {
            output.push_str(&format!("  - {g}\n"));
        }
    }
    output.push_str(&format!("Result: {}\n", report.outcome));
    output
}

pub fn format_json(report: &AnalysisReport) -> anyhow::Result<String> {
    let view = JsonReport {
        samples: report.spectrum.len(),
        num_peaks: report.peaks.len(),
        peaks: peak_rows(report),
        groups: &report.groups,
        distinct_groups: report.distinct_groups(),
        matched: report.matched.as_deref(),
        outcome: &report.outcome,
    };
    Ok(serde_json::to_string_pretty(&view)?)
}

/// One row per peak.
pub fn format_csv(report: &AnalysisReport) -> anyhow::Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in peak_rows(report) {
        writer.serialize(row)?;
    }
    if report.peaks.is_empty() {
        writer.write_record(["index", "wavenumber", "absorbance", "prominence", "width"])?;
    }
    let bytes = writer.into_inner().map_err(|e| anyhow::anyhow!("{e}"))?;
    Ok(String::from_utf8(bytes)?)
}

/// Write raw, corrected and smoothed signals side by side.
pub fn write_signals<W: Write>(report: &AnalysisReport, out: W) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record([WAVENUMBER_COLUMN, ABSORBANCE_COLUMN, "Corrected", "Smoothed"])?;
    let sp = &report.spectrum;
    for i in 0..sp.len() {
        writer.write_record(&[
            sp.wavenumbers()[i].to_string(),
            sp.absorbance()[i].to_string(),
            report.corrected[i].to_string(),
            report.smoothed[i].to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
