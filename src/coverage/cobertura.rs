//! Cobertura XML format parser

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::{CoverageData, ModuleCoverage, OverallCoverage, DEFAULT_XML_PATH};

/// Errors raised while producing a coverage dataset.
#[derive(Debug, Error)]
pub enum CoverageError {
    #[error("Coverage report not found at {}", .0.display())]
    ReportNotFound(PathBuf),
    #[error("Invalid coverage XML: {0}")]
    InvalidXml(#[from] quick_xml::Error),
    #[error("Coverage report I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to serialize coverage data: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parser for a Cobertura XML coverage report, with a cached dataset.
///
/// The dataset is rebuilt on every `parse()` call; `coverage_data()` reuses
/// the cached result from the first parse.
#[derive(Debug)]
pub struct CoverageReport {
    xml_path: PathBuf,
    data: Option<CoverageData>,
}

impl CoverageReport {
    pub fn new(xml_path: Option<PathBuf>) -> Self {
        Self {
            xml_path: xml_path.unwrap_or_else(|| PathBuf::from(DEFAULT_XML_PATH)),
            data: None,
        }
    }

    pub fn xml_path(&self) -> &Path {
        &self.xml_path
    }

    /// Parse the report from disk, replacing any cached dataset.
    pub fn parse(&mut self) -> Result<&CoverageData, CoverageError> {
        if !self.xml_path.exists() {
            return Err(CoverageError::ReportNotFound(self.xml_path.clone()));
        }

        let content = fs::read_to_string(&self.xml_path)?;
        let data = parse_cobertura_str(&content)?;
        Ok(self.data.insert(data))
    }

    /// The cached dataset, parsing first if not yet parsed.
    pub fn coverage_data(&mut self) -> Result<&CoverageData, CoverageError> {
        if self.data.is_none() {
            self.parse()?;
        }
        match &self.data {
            Some(data) => Ok(data),
            None => Err(CoverageError::ReportNotFound(self.xml_path.clone())),
        }
    }
}

/// Parse a Cobertura XML file
pub fn parse_cobertura(path: &Path) -> Result<CoverageData, CoverageError> {
    let content = fs::read_to_string(path)?;
    parse_cobertura_str(&content)
}

/// Parse Cobertura XML content from a string
pub fn parse_cobertura_str(content: &str) -> Result<CoverageData, CoverageError> {
    let mut reader = Reader::from_str(content);
    reader.trim_text(true);

    let mut data = CoverageData::default();
    let mut package_name = String::new();
    let mut current_module: Option<ModuleCoverage> = None;

    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"coverage" => read_overall_attrs(e, &mut data.overall),
                b"package" => package_name = attr_value(e, b"name").unwrap_or_default(),
                b"class" => current_module = Some(module_from_attrs(e, &package_name)),
                b"line" => {
                    if let Some(module) = current_module.as_mut() {
                        record_line(e, module);
                    }
                }
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                b"coverage" => read_overall_attrs(e, &mut data.overall),
                // A self-closing class has no line children; record it as-is
                b"class" => data.insert_module(module_from_attrs(e, &package_name)),
                b"line" => {
                    if let Some(module) = current_module.as_mut() {
                        record_line(e, module);
                    }
                }
                _ => {}
            },
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"class" => {
                    if let Some(module) = current_module.take() {
                        data.insert_module(module);
                    }
                }
                b"package" => package_name.clear(),
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(CoverageError::InvalidXml(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(data)
}

fn attr_value(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .filter_map(|a| a.ok())
        .find(|a| a.key.as_ref() == key)
        .map(|a| String::from_utf8_lossy(&a.value).to_string())
}

fn read_overall_attrs(e: &BytesStart, overall: &mut OverallCoverage) {
    for attr in e.attributes().filter_map(|a| a.ok()) {
        match attr.key.as_ref() {
            b"line-rate" => {
                if let Ok(rate) = String::from_utf8_lossy(&attr.value).parse::<f64>() {
                    overall.line_rate = rate * 100.0;
                }
            }
            b"branch-rate" => {
                if let Ok(rate) = String::from_utf8_lossy(&attr.value).parse::<f64>() {
                    overall.branch_rate = rate * 100.0;
                }
            }
            b"lines-covered" => {
                if let Ok(count) = String::from_utf8_lossy(&attr.value).parse::<u32>() {
                    overall.lines_covered = count;
                }
            }
            b"lines-valid" => {
                if let Ok(count) = String::from_utf8_lossy(&attr.value).parse::<u32>() {
                    overall.lines_valid = count;
                }
            }
            b"branches-covered" => {
                if let Ok(count) = String::from_utf8_lossy(&attr.value).parse::<u32>() {
                    overall.branches_covered = count;
                }
            }
            b"branches-valid" => {
                if let Ok(count) = String::from_utf8_lossy(&attr.value).parse::<u32>() {
                    overall.branches_valid = count;
                }
            }
            _ => {}
        }
    }
}

fn module_from_attrs(e: &BytesStart, package_name: &str) -> ModuleCoverage {
    let mut module = ModuleCoverage::default();

    for attr in e.attributes().filter_map(|a| a.ok()) {
        match attr.key.as_ref() {
            b"name" => {
                module.name = String::from_utf8_lossy(&attr.value).to_string();
            }
            b"line-rate" => {
                if let Ok(rate) = String::from_utf8_lossy(&attr.value).parse::<f64>() {
                    module.line_rate = rate * 100.0;
                }
            }
            b"branch-rate" => {
                if let Ok(rate) = String::from_utf8_lossy(&attr.value).parse::<f64>() {
                    module.branch_rate = rate * 100.0;
                }
            }
            _ => {}
        }
    }

    if !package_name.is_empty() {
        module.name = format!("{}.{}", package_name, module.name);
    }

    module
}

fn record_line(e: &BytesStart, module: &mut ModuleCoverage) {
    let mut number = 0u32;
    let mut hits = 0u32;
    let mut is_branch = false;
    let mut condition = String::new();

    for attr in e.attributes().filter_map(|a| a.ok()) {
        match attr.key.as_ref() {
            b"number" => {
                if let Ok(n) = String::from_utf8_lossy(&attr.value).parse::<u32>() {
                    number = n;
                }
            }
            b"hits" => {
                if let Ok(h) = String::from_utf8_lossy(&attr.value).parse::<u32>() {
                    hits = h;
                }
            }
            b"branch" => {
                is_branch = attr.value.as_ref() == b"true";
            }
            b"condition-coverage" => {
                condition = String::from_utf8_lossy(&attr.value).to_string();
            }
            _ => {}
        }
    }

    module.lines_valid += 1;
    if hits > 0 {
        module.lines_covered += 1;
    } else {
        module.missing_lines.push(number);
    }

    if is_branch {
        if let Some((covered, total)) = parse_condition_ratio(&condition) {
            module.branches_covered += covered;
            module.branches_valid += total;
        }
    }
}

/// Extract the first "covered/total" pair from a condition-coverage value
/// such as `"50% (1/2)"`. Anything without a digits/digits token yields None.
fn parse_condition_ratio(value: &str) -> Option<(u32, u32)> {
    let bytes = value.as_bytes();

    for (idx, _) in value.match_indices('/') {
        let mut start = idx;
        while start > 0 && bytes[start - 1].is_ascii_digit() {
            start -= 1;
        }
        let mut end = idx + 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
        if start == idx || end == idx + 1 {
            continue;
        }
        if let (Ok(covered), Ok(total)) = (value[start..idx].parse(), value[idx + 1..end].parse()) {
            return Some((covered, total));
        }
    }

    None
}
