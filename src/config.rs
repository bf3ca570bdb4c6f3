use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Coverage thresholds applied during enforcement.
///
/// Global and per-module floors are independent checks; a module floor may
/// be lower or higher than the global one.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CoverageThresholds {
    /// Overall line coverage floor (percentage).
    pub line_threshold: f64,
    /// Overall branch coverage floor (percentage).
    pub branch_threshold: f64,
    /// Line coverage floor for non-critical modules.
    pub module_line_threshold: f64,
    /// Branch coverage floor for non-critical modules.
    pub module_branch_threshold: f64,
    /// Module-name prefixes that require stricter coverage.
    pub critical_modules: Vec<String>,
    /// Line coverage floor for critical modules.
    pub critical_line_threshold: f64,
    /// Branch coverage floor for critical modules.
    pub critical_branch_threshold: f64,
}

impl Default for CoverageThresholds {
    fn default() -> Self {
        Self {
            line_threshold: 80.0,
            branch_threshold: 70.0,
            module_line_threshold: 75.0,
            module_branch_threshold: 65.0,
            critical_modules: Vec::new(),
            critical_line_threshold: 90.0,
            critical_branch_threshold: 80.0,
        }
    }
}

/// On-disk shape of the optional config file (a `[thresholds]` table).
#[derive(Debug, Default, Deserialize)]
struct ThresholdFile {
    #[serde(default)]
    thresholds: CoverageThresholds,
}

impl CoverageThresholds {
    /// Load thresholds from a TOML config file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let file: ThresholdFile = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        file.thresholds.validate()?;

        Ok(file.thresholds)
    }

    /// Reject thresholds outside the 0-100 percentage range.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("line_threshold", self.line_threshold),
            ("branch_threshold", self.branch_threshold),
            ("module_line_threshold", self.module_line_threshold),
            ("module_branch_threshold", self.module_branch_threshold),
            ("critical_line_threshold", self.critical_line_threshold),
            ("critical_branch_threshold", self.critical_branch_threshold),
        ];

        for (name, value) in fields {
            if !(0.0..=100.0).contains(&value) {
                anyhow::bail!(
                    "Threshold '{}' must be between 0 and 100, got {}",
                    name,
                    value
                );
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thresholds() {
        let thresholds = CoverageThresholds::default();
        assert_eq!(thresholds.line_threshold, 80.0);
        assert_eq!(thresholds.branch_threshold, 70.0);
        assert_eq!(thresholds.module_line_threshold, 75.0);
        assert_eq!(thresholds.module_branch_threshold, 65.0);
        assert_eq!(thresholds.critical_line_threshold, 90.0);
        assert_eq!(thresholds.critical_branch_threshold, 80.0);
        assert!(thresholds.critical_modules.is_empty());
    }

    #[test]
    fn test_parse_config_file() {
        let toml_content = r#"
[thresholds]
line_threshold = 85.0
branch_threshold = 75.0
critical_modules = ["core", "core.security"]
critical_line_threshold = 95.0
"#;

        let file: ThresholdFile = toml::from_str(toml_content).unwrap();
        let thresholds = file.thresholds;
        assert_eq!(thresholds.line_threshold, 85.0);
        assert_eq!(thresholds.branch_threshold, 75.0);
        assert_eq!(thresholds.critical_line_threshold, 95.0);
        // Unspecified fields keep their defaults
        assert_eq!(thresholds.module_line_threshold, 75.0);
        assert_eq!(
            thresholds.critical_modules,
            vec!["core".to_string(), "core.security".to_string()]
        );
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let thresholds = CoverageThresholds {
            line_threshold: 120.0,
            ..Default::default()
        };
        assert!(thresholds.validate().is_err());

        let thresholds = CoverageThresholds {
            module_branch_threshold: -5.0,
            ..Default::default()
        };
        assert!(thresholds.validate().is_err());

        assert!(CoverageThresholds::default().validate().is_ok());
    }
}
