//! Human-readable coverage reporting and improvement suggestions

use serde::Serialize;
use std::cmp::Ordering;
use std::fs;
use std::path::Path;

use crate::coverage::{CoverageData, CoverageError};

/// Default line-coverage percentage below which a module counts as low.
pub const LOW_COVERAGE_THRESHOLD: f64 = 70.0;

/// How many low-coverage modules the suggestion list covers.
const SUGGESTION_LIMIT: usize = 5;

/// A module flagged for low line coverage.
#[derive(Debug, Clone, Serialize)]
pub struct LowCoverageArea {
    pub module: String,
    pub line_coverage: f64,
    pub missing_lines: Vec<u32>,
    pub lines_covered: u32,
    pub lines_valid: u32,
}

/// Modules whose line coverage is strictly below `threshold`, sorted
/// ascending by coverage (ties keep document order).
pub fn identify_low_coverage_areas(data: &CoverageData, threshold: f64) -> Vec<LowCoverageArea> {
    let mut areas: Vec<LowCoverageArea> = data
        .modules
        .iter()
        .filter(|module| module.line_rate < threshold)
        .map(|module| LowCoverageArea {
            module: module.name.clone(),
            line_coverage: module.line_rate,
            missing_lines: module.missing_lines.clone(),
            lines_covered: module.lines_covered,
            lines_valid: module.lines_valid,
        })
        .collect();

    areas.sort_by(|a, b| {
        a.line_coverage
            .partial_cmp(&b.line_coverage)
            .unwrap_or(Ordering::Equal)
    });

    areas
}

/// Render the dataset as a fixed-width plain-text table.
///
/// The full text is returned; when `output_path` is given it is also
/// written there, overwriting any existing file.
pub fn generate_coverage_report(
    data: &CoverageData,
    output_path: Option<&Path>,
) -> Result<String, CoverageError> {
    let overall = &data.overall;

    let mut report = Vec::new();
    report.push("Coverage Report".to_string());
    report.push("=".repeat(80));
    report.push(format!(
        "Overall line coverage: {:.2}% ({}/{})",
        overall.line_rate, overall.lines_covered, overall.lines_valid
    ));
    report.push(format!(
        "Overall branch coverage: {:.2}% ({}/{})",
        overall.branch_rate, overall.branches_covered, overall.branches_valid
    ));
    report.push(String::new());
    report.push("Module Coverage".to_string());
    report.push("-".repeat(80));
    report.push(format!("{:<50} {:<10} {:<10}", "Module", "Line", "Branch"));
    report.push("-".repeat(80));

    let mut sorted: Vec<_> = data.modules.iter().collect();
    sorted.sort_by(|a, b| a.name.cmp(&b.name));

    for module in sorted {
        let line_coverage = format!("{:.2}%", module.line_rate);
        let branch_coverage = if module.branches_valid > 0 {
            format!("{:.2}%", module.branch_rate)
        } else {
            "N/A".to_string()
        };
        report.push(format!(
            "{:<50} {:<10} {:<10}",
            module.name, line_coverage, branch_coverage
        ));
    }

    let report_text = report.join("\n");

    if let Some(path) = output_path {
        fs::write(path, &report_text)?;
    }

    Ok(report_text)
}

/// One actionable suggestion for each of the lowest-coverage modules,
/// lowest first, capped at five.
pub fn suggest_improvements(data: &CoverageData) -> Vec<String> {
    identify_low_coverage_areas(data, LOW_COVERAGE_THRESHOLD)
        .into_iter()
        .take(SUGGESTION_LIMIT)
        .map(|area| {
            format!(
                "Improve coverage for {} (currently {:.2}%) by adding tests for {} missing lines",
                area.module,
                area.line_coverage,
                area.missing_lines.len()
            )
        })
        .collect()
}

/// Serialize the dataset as pretty-printed JSON.
pub fn export_json(data: &CoverageData) -> Result<String, CoverageError> {
    Ok(serde_json::to_string_pretty(data)?)
}
