//! Rule engine: file-level and project-level rules built from
//! configuration.
//!
//! A rule is any object exposing an id, a level, and the matching evaluate
//! method. The factory recognizes metric-threshold rules (both `metric`
//! and `threshold` present) and the circular-dependency rule by id;
//! anything else is logged and skipped.

pub mod circular;
pub mod threshold;

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::RuleConfig;
use crate::core::errors::Result;
use crate::core::{FileAnalysisResult, Finding};
use crate::graph::DependencyGraph;

pub use circular::CircularDependencyRule;
pub use threshold::MetricThresholdRule;

pub const CIRCULAR_DEPENDENCY_RULE_ID: &str = "module.circularDependency";
pub const SYNTAX_ERROR_RULE_ID: &str = "syntax.error";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RuleLevel {
    File,
    Project,
}

pub trait Rule: Send + Sync {
    fn id(&self) -> &str;

    fn level(&self) -> RuleLevel;

    fn evaluate_file(&self, _file: &FileAnalysisResult) -> Result<Vec<Finding>> {
        Ok(Vec::new())
    }

    fn evaluate_project(
        &self,
        _files: &[Arc<FileAnalysisResult>],
        _graph: Option<&DependencyGraph>,
    ) -> Result<Vec<Finding>> {
        Ok(Vec::new())
    }
}

pub struct RuleEngine {
    file_rules: Vec<Box<dyn Rule>>,
    project_rules: Vec<Box<dyn Rule>>,
}

impl RuleEngine {
    /// Build rule instances from configuration, in key order.
    ///
    /// The `syntax.error` entry configures the parse stage rather than a
    /// dispatched rule, so it is not instantiated here.
    pub fn from_config(rules: &BTreeMap<String, RuleConfig>) -> Self {
        let mut engine = Self {
            file_rules: Vec::new(),
            project_rules: Vec::new(),
        };

        for (id, config) in rules {
            if !config.enabled {
                continue;
            }
            match build_rule(id, config) {
                Some(rule) => engine.register(rule),
                None if id == SYNTAX_ERROR_RULE_ID => {}
                None => log::warn!("unknown rule type: {id}"),
            }
        }

        engine
    }

    pub fn register(&mut self, rule: Box<dyn Rule>) {
        match rule.level() {
            RuleLevel::File => self.file_rules.push(rule),
            RuleLevel::Project => self.project_rules.push(rule),
        }
    }

    pub fn file_rule_count(&self) -> usize {
        self.file_rules.len()
    }

    pub fn project_rule_count(&self) -> usize {
        self.project_rules.len()
    }

    /// Run every file rule in registration order; a failing rule is logged
    /// and skipped, never aborting the batch.
    pub fn evaluate_file(&self, file: &FileAnalysisResult) -> Vec<Finding> {
        let mut findings = Vec::new();
        for rule in &self.file_rules {
            match rule.evaluate_file(file) {
                Ok(mut emitted) => findings.append(&mut emitted),
                Err(err) => log::warn!(
                    "rule {} failed on {}: {err}",
                    rule.id(),
                    file.path.display()
                ),
            }
        }
        findings
    }

    pub fn evaluate_project(
        &self,
        files: &[Arc<FileAnalysisResult>],
        graph: Option<&DependencyGraph>,
    ) -> Vec<Finding> {
        let mut findings = Vec::new();
        for rule in &self.project_rules {
            match rule.evaluate_project(files, graph) {
                Ok(mut emitted) => findings.append(&mut emitted),
                Err(err) => log::warn!("rule {} failed: {err}", rule.id()),
            }
        }
        findings
    }
}

fn build_rule(id: &str, config: &RuleConfig) -> Option<Box<dyn Rule>> {
    if let (Some(metric), Some(threshold)) = (&config.metric, config.threshold) {
        return Some(Box::new(MetricThresholdRule::new(
            id,
            metric,
            threshold,
            config.severity,
        )));
    }
    if id == CIRCULAR_DEPENDENCY_RULE_ID {
        return Some(Box::new(CircularDependencyRule::new(config.severity)));
    }
    None
}
