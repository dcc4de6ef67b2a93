//! File-level metric threshold rule.

use serde_json::json;

use super::{Rule, RuleLevel};
use crate::core::errors::Result;
use crate::core::{FileAnalysisResult, Finding, FindingKind, Severity};

/// Fires when `metrics[metric] > threshold`, yielding one finding with id
/// `<ruleId>.exceeded` and a details bag carrying the metric name, value,
/// threshold, and file path.
pub struct MetricThresholdRule {
    id: String,
    metric: String,
    threshold: f64,
    severity: Severity,
}

impl MetricThresholdRule {
    pub fn new(id: &str, metric: &str, threshold: f64, severity: Severity) -> Self {
        Self {
            id: id.to_string(),
            metric: metric.to_string(),
            threshold,
            severity,
        }
    }
}

impl Rule for MetricThresholdRule {
    fn id(&self) -> &str {
        &self.id
    }

    fn level(&self) -> RuleLevel {
        RuleLevel::File
    }

    fn evaluate_file(&self, file: &FileAnalysisResult) -> Result<Vec<Finding>> {
        let Some(value) = file.metric(&self.metric) else {
            return Ok(Vec::new());
        };
        if value <= self.threshold {
            return Ok(Vec::new());
        }

        let finding = Finding::new(
            format!("{}.exceeded", self.id),
            FindingKind::Metric,
            format!(
                "{} is {value} (threshold {}) in {}",
                self.metric,
                self.threshold,
                file.path.display()
            ),
            self.severity,
        )
        .with_detail("metricName", json!(self.metric))
        .with_detail("value", json!(value))
        .with_detail("threshold", json!(self.threshold))
        .with_detail("filePath", json!(file.path.display().to_string()));

        Ok(vec![finding])
    }
}
