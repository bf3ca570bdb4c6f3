//! Coverage enforcement orchestration
//!
//! Wires parser, evaluator and presenter into a single pass/fail check,
//! bootstrapping the XML report via the test runner when it is absent.
//! Process exit codes are the CLI adapter's concern; everything here
//! returns a plain boolean.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::CoverageThresholds;
use crate::coverage::{check_thresholds, CoverageReport, DEFAULT_XML_PATH};
use crate::report;

/// Default source directory the test runner measures.
pub const DEFAULT_SOURCE_DIR: &str = "automated_security_helper";

/// Enforces coverage thresholds against a report file.
#[derive(Debug)]
pub struct CoverageEnforcer {
    thresholds: CoverageThresholds,
    report: CoverageReport,
}

impl CoverageEnforcer {
    pub fn new(thresholds: CoverageThresholds, xml_path: Option<PathBuf>) -> Self {
        Self {
            thresholds,
            report: CoverageReport::new(xml_path),
        }
    }

    /// Check thresholds, printing the summary. Returns whether all were met.
    pub fn enforce(&mut self) -> Result<bool> {
        let data = self.report.coverage_data()?;
        let result = check_thresholds(data, &self.thresholds);
        result.print_summary();
        Ok(result.passed)
    }

    /// Suggestions for the lowest-coverage modules.
    pub fn suggest_improvements(&mut self) -> Result<Vec<String>> {
        let data = self.report.coverage_data()?;
        Ok(report::suggest_improvements(data))
    }
}

/// Parameters for a full coverage check.
#[derive(Debug, Clone)]
pub struct CheckOptions {
    /// Source directory passed to the test runner when regenerating the report.
    pub source_dir: String,
    /// Path to the Cobertura XML report.
    pub xml_path: PathBuf,
    pub thresholds: CoverageThresholds,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            source_dir: DEFAULT_SOURCE_DIR.to_string(),
            xml_path: PathBuf::from(DEFAULT_XML_PATH),
            thresholds: CoverageThresholds::default(),
        }
    }
}

/// Build the pytest invocation that regenerates the XML report.
fn coverage_command(source_dir: &str, xml_path: &Path) -> Command {
    let mut cmd = Command::new("pytest");
    cmd.arg(format!("--cov={}", source_dir));
    cmd.arg(format!("--cov-report=xml:{}", xml_path.display()));
    cmd.arg("--cov-report=term");
    cmd
}

/// Run the full coverage check.
///
/// If the XML report is missing, the test runner is invoked once to produce
/// it; a failed run prints the captured stderr and yields `Ok(false)`
/// without evaluating. Otherwise thresholds are enforced and, on failure,
/// improvement suggestions are printed. Never terminates the process.
pub fn run_coverage_check(opts: &CheckOptions) -> Result<bool> {
    if !opts.xml_path.exists() {
        println!("Coverage report not found at {}", opts.xml_path.display());
        println!("Running pytest with coverage...");

        let output = coverage_command(&opts.source_dir, &opts.xml_path)
            .output()
            .context("Failed to run pytest")?;

        if !output.status.success() {
            println!("{}", "Error running pytest:".red());
            print!("{}", String::from_utf8_lossy(&output.stderr));
            return Ok(false);
        }
    }

    let mut enforcer = CoverageEnforcer::new(opts.thresholds.clone(), Some(opts.xml_path.clone()));
    let passed = enforcer.enforce()?;

    if !passed {
        println!("\nSuggestions for improving coverage:");
        for suggestion in enforcer.suggest_improvements()? {
            println!("  - {}", suggestion);
        }
    }

    Ok(passed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const PASSING_XML: &str = r#"<coverage line-rate="0.95" branch-rate="0.9" lines-covered="95" lines-valid="100">
        <packages>
            <package name="app">
                <classes>
                    <class name="mod" line-rate="0.95" branch-rate="0.9">
                        <lines><line number="1" hits="1"/></lines>
                    </class>
                </classes>
            </package>
        </packages>
    </coverage>"#;

    const FAILING_XML: &str = r#"<coverage line-rate="0.4" branch-rate="0.3">
        <packages>
            <package name="app">
                <classes>
                    <class name="mod" line-rate="0.4">
                        <lines>
                            <line number="1" hits="0"/>
                            <line number="2" hits="1"/>
                        </lines>
                    </class>
                </classes>
            </package>
        </packages>
    </coverage>"#;

    fn write_report(dir: &tempfile::TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("coverage.xml");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_coverage_command_arguments() {
        let cmd = coverage_command("mysrc", Path::new("out/cov.xml"));

        assert_eq!(cmd.get_program(), "pytest");
        let args: Vec<String> = cmd
            .get_args()
            .map(|a| a.to_string_lossy().to_string())
            .collect();
        assert_eq!(
            args,
            vec!["--cov=mysrc", "--cov-report=xml:out/cov.xml", "--cov-report=term"]
        );
    }

    #[test]
    fn test_enforce_passes_with_good_coverage() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_report(&dir, PASSING_XML);

        let mut enforcer = CoverageEnforcer::new(CoverageThresholds::default(), Some(path));
        assert!(enforcer.enforce().unwrap());
    }

    #[test]
    fn test_enforce_fails_without_exiting() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_report(&dir, FAILING_XML);

        let mut enforcer = CoverageEnforcer::new(CoverageThresholds::default(), Some(path));
        assert!(!enforcer.enforce().unwrap());

        let suggestions = enforcer.suggest_improvements().unwrap();
        assert_eq!(suggestions.len(), 1);
        assert!(suggestions[0].contains("app.mod"));
        assert!(suggestions[0].contains("40.00%"));
        assert!(suggestions[0].contains("1 missing lines"));
    }

    #[test]
    fn test_run_coverage_check_with_existing_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_report(&dir, PASSING_XML);

        let opts = CheckOptions {
            xml_path: path,
            ..Default::default()
        };
        assert!(run_coverage_check(&opts).unwrap());
    }

    #[test]
    fn test_run_coverage_check_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_report(&dir, FAILING_XML);

        let opts = CheckOptions {
            xml_path: path,
            ..Default::default()
        };
        assert!(!run_coverage_check(&opts).unwrap());
    }

    #[test]
    fn test_missing_report_error_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let mut enforcer = CoverageEnforcer::new(
            CoverageThresholds::default(),
            Some(dir.path().join("nope.xml")),
        );
        assert!(enforcer.enforce().is_err());
    }
}
