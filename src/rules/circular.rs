//! Project-level circular dependency rule.

use std::sync::Arc;

use serde_json::json;

use super::{Rule, RuleLevel, CIRCULAR_DEPENDENCY_RULE_ID};
use crate::core::errors::Result;
use crate::core::{FileAnalysisResult, Finding, FindingKind, Severity};
use crate::graph::DependencyGraph;

/// Emits one finding per detected cycle. Works from the supplied graph, or
/// reconstructs one from the raw dependency lists when none is passed.
pub struct CircularDependencyRule {
    severity: Severity,
}

impl CircularDependencyRule {
    pub fn new(severity: Severity) -> Self {
        Self { severity }
    }
}

impl Rule for CircularDependencyRule {
    fn id(&self) -> &str {
        CIRCULAR_DEPENDENCY_RULE_ID
    }

    fn level(&self) -> RuleLevel {
        RuleLevel::Project
    }

    fn evaluate_project(
        &self,
        files: &[Arc<FileAnalysisResult>],
        graph: Option<&DependencyGraph>,
    ) -> Result<Vec<Finding>> {
        let rebuilt;
        let graph = match graph {
            Some(graph) => graph,
            None => {
                rebuilt = DependencyGraph::build(files);
                &rebuilt
            }
        };

        let findings = graph
            .circular_dependencies()
            .into_iter()
            .map(|cycle| {
                let rendered = cycle
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(" -> ");
                Finding::new(
                    CIRCULAR_DEPENDENCY_RULE_ID,
                    FindingKind::Architecture,
                    format!("found cycle: {rendered}"),
                    self.severity,
                )
                .with_detail("cycle", json!(cycle
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()))
            })
            .collect();

        Ok(findings)
    }
}
