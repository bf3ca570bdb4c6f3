//! Covcheck - coverage threshold enforcement
//!
//! A library and CLI for enforcing code coverage thresholds:
//! - Cobertura XML report parsing with per-module line and branch detail
//! - Global and per-module floors with critical-module overrides
//! - Plain-text coverage tables, JSON export, and improvement suggestions
//! - Optional bootstrap of the report via `pytest --cov`

pub mod config;
pub mod coverage;
pub mod enforcer;
pub mod report;

pub use config::CoverageThresholds;
pub use coverage::{
    check_thresholds, parse_cobertura, parse_cobertura_str, CoverageData, CoverageError,
    CoverageReport, ModuleCoverage, OverallCoverage, ThresholdResult, DEFAULT_XML_PATH,
};
pub use enforcer::{run_coverage_check, CheckOptions, CoverageEnforcer, DEFAULT_SOURCE_DIR};
pub use report::{
    export_json, generate_coverage_report, identify_low_coverage_areas, suggest_improvements,
    LowCoverageArea, LOW_COVERAGE_THRESHOLD,
};
