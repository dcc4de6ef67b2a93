pub mod errors;
pub mod unified;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::graph::DependencyGraph;
use crate::structure::{ClassInfo, FunctionInfo};

/// Source span, 1-based inclusive on both ends.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SourceLocation {
    pub start_line: usize,
    pub start_column: usize,
    pub end_line: usize,
    pub end_column: usize,
}

impl SourceLocation {
    pub fn new(start_line: usize, start_column: usize, end_line: usize, end_column: usize) -> Self {
        Self {
            start_line,
            start_column,
            end_line,
            end_column,
        }
    }

    /// Build a location from a tree-sitter node's position spans.
    pub fn from_node(node: &tree_sitter::Node) -> Self {
        let start = node.start_position();
        let end = node.end_position();
        Self {
            start_line: start.row + 1,
            start_column: start.column + 1,
            end_line: end.row + 1,
            end_column: end.column + 1,
        }
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.start_line, self.start_column)
    }
}

/// Finding severity, ordered so that `Error` sorts greatest for reporting.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        static DISPLAY_STRINGS: &[(Severity, &str)] = &[
            (Severity::Info, "info"),
            (Severity::Warning, "warning"),
            (Severity::Error, "error"),
        ];

        let display_str = DISPLAY_STRINGS
            .iter()
            .find(|(s, _)| s == self)
            .map(|(_, s)| *s)
            .unwrap_or("unknown");

        write!(f, "{display_str}")
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum FindingKind {
    Metric,
    RuleViolation,
    CodeSmell,
    Architecture,
    SyntaxError,
}

impl std::fmt::Display for FindingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        static DISPLAY_STRINGS: &[(FindingKind, &str)] = &[
            (FindingKind::Metric, "Metric"),
            (FindingKind::RuleViolation, "Rule Violation"),
            (FindingKind::CodeSmell, "Code Smell"),
            (FindingKind::Architecture, "Architecture"),
            (FindingKind::SyntaxError, "Syntax Error"),
        ];

        let display_str = DISPLAY_STRINGS
            .iter()
            .find(|(k, _)| k == self)
            .map(|(_, s)| *s)
            .unwrap_or("Unknown");

        write!(f, "{display_str}")
    }
}

/// A single observation: a metric exceedance, a cycle, a syntax error.
///
/// `id` is a dotted identifier such as `complexity.cyclomatic.exceeded`.
/// `details` is an open attribute bag; threshold findings carry at least
/// `metricName`, `value`, `threshold`, and `filePath`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Finding {
    pub id: String,
    pub kind: FindingKind,
    pub message: String,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub details: serde_json::Map<String, serde_json::Value>,
}

impl Finding {
    pub fn new(
        id: impl Into<String>,
        kind: FindingKind,
        message: impl Into<String>,
        severity: Severity,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            message: message.into(),
            severity,
            location: None,
            details: serde_json::Map::new(),
        }
    }

    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.details.insert(key.into(), value);
        self
    }
}

/// Per-file analysis snapshot: the metric map, raw import specifiers as
/// written in source, extracted structure, and file-level findings.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FileAnalysisResult {
    pub path: PathBuf,
    pub language: crate::parsers::Language,
    pub metrics: HashMap<String, f64>,
    pub findings: Vec<Finding>,
    pub dependencies: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub functions: Vec<FunctionInfo>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<ClassInfo>,
}

impl FileAnalysisResult {
    pub fn metric(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).copied()
    }
}

/// Afferent/efferent coupling and the derived stability score.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct StabilityMetric {
    pub afferent: usize,
    pub efferent: usize,
    pub stability: f64,
}

/// Immutable whole-project snapshot.
///
/// Incremental analysis produces a new snapshot that shares unchanged
/// [`FileAnalysisResult`] values by `Arc` identity with its predecessor.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AnalysisResult {
    pub root: PathBuf,
    pub files: Vec<Arc<FileAnalysisResult>>,
    pub findings: Vec<Finding>,
    pub graph: DependencyGraph,
    pub stability: HashMap<PathBuf, StabilityMetric>,
    pub risk_scores: HashMap<PathBuf, f64>,
}

impl AnalysisResult {
    pub fn file(&self, path: &std::path::Path) -> Option<&Arc<FileAnalysisResult>> {
        self.files.iter().find(|f| f.path == path)
    }

    pub fn summary(&self) -> AnalysisSummary {
        let mut by_severity: HashMap<Severity, usize> = HashMap::new();
        for finding in &self.findings {
            *by_severity.entry(finding.severity).or_insert(0) += 1;
        }

        let complexities: Vec<f64> = self
            .files
            .iter()
            .filter_map(|f| f.metric("cyclomaticComplexity"))
            .collect();
        let average_complexity = if complexities.is_empty() {
            0.0
        } else {
            complexities.iter().sum::<f64>() / complexities.len() as f64
        };
        let max_complexity = complexities.iter().cloned().fold(0.0_f64, f64::max);

        AnalysisSummary {
            total_files: self.files.len(),
            total_findings: self.findings.len(),
            errors: by_severity.get(&Severity::Error).copied().unwrap_or(0),
            warnings: by_severity.get(&Severity::Warning).copied().unwrap_or(0),
            infos: by_severity.get(&Severity::Info).copied().unwrap_or(0),
            average_complexity,
            max_complexity,
            circular_dependency_count: self.graph.circular_dependencies().len(),
        }
    }
}

/// Aggregate counts derived from a snapshot, for report consumers.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AnalysisSummary {
    pub total_files: usize,
    pub total_findings: usize,
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
    pub average_complexity: f64,
    pub max_complexity: f64,
    pub circular_dependency_count: usize,
}
