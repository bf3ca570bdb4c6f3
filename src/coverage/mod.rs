//! Coverage module
//!
//! Provides:
//! - Cobertura XML parsing with per-module line and branch detail
//! - Threshold validation with critical-module overrides

mod cobertura;
mod threshold;

pub use cobertura::*;
pub use threshold::*;

use serde::Serialize;

/// Default location the test runner writes the XML report to.
pub const DEFAULT_XML_PATH: &str = "test-results/pytest.coverage.xml";

/// Parsed coverage dataset: overall totals plus per-module detail.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CoverageData {
    pub overall: OverallCoverage,
    /// Per-module records in XML document order.
    pub modules: Vec<ModuleCoverage>,
}

/// Aggregate coverage read from the root `<coverage>` element.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OverallCoverage {
    /// Line coverage as a percentage (0-100).
    pub line_rate: f64,
    /// Branch coverage as a percentage (0-100).
    pub branch_rate: f64,
    pub lines_covered: u32,
    pub lines_valid: u32,
    pub branches_covered: u32,
    pub branches_valid: u32,
}

/// Coverage detail for a single module (`package.class` in the XML).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModuleCoverage {
    /// Fully-qualified module name.
    pub name: String,
    /// Line coverage as a percentage (0-100), from the class attribute.
    pub line_rate: f64,
    /// Branch coverage as a percentage (0-100), from the class attribute.
    pub branch_rate: f64,
    pub lines_covered: u32,
    pub lines_valid: u32,
    pub branches_covered: u32,
    pub branches_valid: u32,
    /// 1-based numbers of lines with zero hits, in document order.
    pub missing_lines: Vec<u32>,
}

impl CoverageData {
    /// Insert a module record. A repeated name replaces the earlier record
    /// in place, keeping its original position.
    pub fn insert_module(&mut self, module: ModuleCoverage) {
        if let Some(existing) = self.modules.iter_mut().find(|m| m.name == module.name) {
            *existing = module;
        } else {
            self.modules.push(module);
        }
    }

    /// Look up a module by its fully-qualified name.
    pub fn module(&self, name: &str) -> Option<&ModuleCoverage> {
        self.modules.iter().find(|m| m.name == name)
    }
}
