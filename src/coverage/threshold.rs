//! Coverage threshold validation

use colored::Colorize;

use super::CoverageData;
use crate::config::CoverageThresholds;

/// Result of threshold validation
#[derive(Debug, Clone)]
pub struct ThresholdResult {
    pub passed: bool,
    pub failures: Vec<String>,
}

impl ThresholdResult {
    pub fn print_summary(&self) {
        if self.passed {
            println!("  {} All coverage thresholds met", "✓".green());
        } else {
            println!("{}", "Coverage thresholds not met:".red());
            for failure in &self.failures {
                println!("  - {}", failure);
            }
        }
    }
}

/// Check a coverage dataset against thresholds.
///
/// Overall rates are checked first, then every module in document order.
/// Critical modules (name starts with a configured prefix) are held to the
/// critical floors; modules with zero valid branches skip the branch check.
pub fn check_thresholds(data: &CoverageData, thresholds: &CoverageThresholds) -> ThresholdResult {
    let mut failures = Vec::new();
    let overall = &data.overall;

    if overall.line_rate < thresholds.line_threshold {
        failures.push(format!(
            "Overall line coverage ({:.2}%) is below threshold ({:.2}%)",
            overall.line_rate, thresholds.line_threshold
        ));
    }

    if overall.branch_rate < thresholds.branch_threshold {
        failures.push(format!(
            "Overall branch coverage ({:.2}%) is below threshold ({:.2}%)",
            overall.branch_rate, thresholds.branch_threshold
        ));
    }

    for module in &data.modules {
        let is_critical = thresholds
            .critical_modules
            .iter()
            .any(|prefix| module.name.starts_with(prefix.as_str()));

        let (line_floor, branch_floor) = if is_critical {
            (
                thresholds.critical_line_threshold,
                thresholds.critical_branch_threshold,
            )
        } else {
            (
                thresholds.module_line_threshold,
                thresholds.module_branch_threshold,
            )
        };

        if module.line_rate < line_floor {
            failures.push(format!(
                "Module {} line coverage ({:.2}%) is below threshold ({:.2}%)",
                module.name, module.line_rate, line_floor
            ));
        }

        if module.branches_valid > 0 && module.branch_rate < branch_floor {
            failures.push(format!(
                "Module {} branch coverage ({:.2}%) is below threshold ({:.2}%)",
                module.name, module.branch_rate, branch_floor
            ));
        }
    }

    ThresholdResult {
        passed: failures.is_empty(),
        failures,
    }
}
