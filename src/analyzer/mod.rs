//! Analysis orchestration: the full project path and the incremental path.
//!
//! Full analysis enumerates files, analyzes each, then derives the
//! dependency graph, stability metrics, risk scores, and project findings.
//! Incremental analysis re-runs only the 1-hop neighborhood of the changed
//! paths, retains every other per-file result by identity, and rebuilds
//! the derived data from the merged file list. Any internal failure on the
//! incremental path falls back to a full re-analysis.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;
use serde_json::json;

use crate::complexity::{calculate_cognitive, calculate_cyclomatic};
use crate::config::AnalysisConfig;
use crate::core::errors::Result;
use crate::core::{AnalysisResult, FileAnalysisResult, Finding, FindingKind};
use crate::graph::DependencyGraph;
use crate::io::ProjectWalker;
use crate::metrics::{count_loc, halstead_volume, maintainability_index, CommentStyle};
use crate::parsers::ParserRegistry;
use crate::rules::{RuleEngine, SYNTAX_ERROR_RULE_ID};
use crate::stability::{risk_scores, stability_metrics};
use crate::structure;

pub struct Analyzer {
    config: AnalysisConfig,
    registry: ParserRegistry,
    engine: RuleEngine,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}

impl Analyzer {
    /// Construct with a (possibly partial) configuration, deep-merged over
    /// the defaults.
    pub fn new(config: AnalysisConfig) -> Self {
        let config = config.merged_over_defaults();
        let engine = RuleEngine::from_config(&config.rules);
        Self {
            config,
            registry: ParserRegistry::new(),
            engine,
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze one file. `content` skips the file-system read, which also
    /// allows analyzing unsaved editor buffers.
    pub fn analyze_file(&self, path: &Path, content: Option<&str>) -> Result<FileAnalysisResult> {
        let owned;
        let content = match content {
            Some(content) => content,
            None => {
                owned = std::fs::read_to_string(path)?;
                &owned
            }
        };

        let language = self.registry.detect_language(path);
        let parsed = self.registry.parse(content, language, path)?;

        let mut metrics: HashMap<String, f64> = HashMap::new();
        metrics.insert("syntaxErrorRatio".to_string(), parsed.error_ratio);

        let mut findings = Vec::new();
        let syntax_rule = self
            .config
            .rule(SYNTAX_ERROR_RULE_ID)
            .filter(|rule| rule.enabled);

        if parsed.has_errors {
            if let Some(rule) = syntax_rule {
                let threshold = rule.threshold.unwrap_or(0.2);
                let mut finding = Finding::new(
                    SYNTAX_ERROR_RULE_ID,
                    FindingKind::SyntaxError,
                    format!(
                        "syntax errors in {} ({:.1}% of nodes)",
                        path.display(),
                        parsed.error_ratio * 100.0
                    ),
                    rule.severity,
                )
                .with_detail("metricName", json!("syntaxErrorRatio"))
                .with_detail("value", json!(parsed.error_ratio))
                .with_detail("threshold", json!(threshold));
                if let Some(location) = crate::parsers::first_error_location(&parsed.tree) {
                    finding = finding.with_location(location);
                }
                findings.push(finding);

                // Heavily broken files keep only the syntax finding: the
                // remaining metrics would describe garbage.
                if parsed.error_ratio > threshold {
                    let mut result = FileAnalysisResult {
                        path: path.to_path_buf(),
                        language,
                        metrics,
                        findings,
                        dependencies: Vec::new(),
                        functions: Vec::new(),
                        classes: Vec::new(),
                    };
                    let rule_findings = self.engine.evaluate_file(&result);
                    result.findings.extend(rule_findings);
                    return Ok(result);
                }
            }
        }

        let root = parsed.tree.root_node();
        let style = CommentStyle::for_language(language);

        let functions = structure::analyze_functions(root, content, language);
        let classes = structure::analyze_classes(root, content, language);
        let dependencies = structure::analyze_module_dependencies(root, content, language);

        let cyclomatic = calculate_cyclomatic(root, content, language) as f64;
        let cognitive = calculate_cognitive(root, language) as f64;
        let loc = count_loc(content, style) as f64;
        let volume = halstead_volume(content, style);

        metrics.insert("cyclomaticComplexity".to_string(), cyclomatic);
        metrics.insert("cognitiveComplexity".to_string(), cognitive);
        metrics.insert("linesOfCode".to_string(), loc);
        metrics.insert("halsteadVolume".to_string(), volume);
        metrics.insert(
            "maintainabilityIndex".to_string(),
            maintainability_index(volume, cyclomatic, loc),
        );
        metrics.insert("functionCount".to_string(), functions.len() as f64);
        metrics.insert("classCount".to_string(), classes.len() as f64);
        metrics.insert("dependencyCount".to_string(), dependencies.len() as f64);

        let mut result = FileAnalysisResult {
            path: path.to_path_buf(),
            language,
            metrics,
            findings,
            dependencies,
            functions,
            classes,
        };
        let rule_findings = self.engine.evaluate_file(&result);
        result.findings.extend(rule_findings);
        Ok(result)
    }

    /// Full project analysis under `root`, excluding `extra_excludes` on
    /// top of the configured exclusions.
    pub fn analyze_project(&self, root: &Path, extra_excludes: &[String]) -> Result<AnalysisResult> {
        let root = absolute(root);
        let mut excludes = self.config.exclude_paths.clone();
        excludes.extend(extra_excludes.iter().cloned());

        let walker = ProjectWalker::new(&root, &self.config.analyze_paths, &excludes)?;
        let paths = walker.walk()?;
        log::debug!(
            "[Analyzer] analyzing {} files under {}",
            paths.len(),
            root.display()
        );

        let mut files: Vec<Arc<FileAnalysisResult>> = paths
            .par_iter()
            .filter_map(|path| match self.analyze_file(path, None) {
                Ok(result) => Some(Arc::new(result)),
                Err(err) => {
                    log::warn!("skipping {}: {err}", path.display());
                    None
                }
            })
            .collect();
        files.sort_by(|a, b| a.path.cmp(&b.path));

        Ok(self.assemble(root, files))
    }

    /// Incremental analysis: re-run the changed paths plus their direct
    /// graph neighbors, retain everything else by identity, and rebuild
    /// the derived data.
    pub fn analyze_files(
        &self,
        changed_paths: &[PathBuf],
        prev: &AnalysisResult,
    ) -> Result<AnalysisResult> {
        match self.try_incremental(changed_paths, prev) {
            Ok(result) => Ok(result),
            Err(err) => {
                log::error!("incremental analysis failed ({err}); running full analysis");
                self.analyze_project(&prev.root, &[])
            }
        }
    }

    fn try_incremental(
        &self,
        changed_paths: &[PathBuf],
        prev: &AnalysisResult,
    ) -> Result<AnalysisResult> {
        let changed: Vec<PathBuf> = changed_paths
            .iter()
            .map(|path| {
                if path.is_absolute() {
                    path.clone()
                } else {
                    prev.root.join(path)
                }
            })
            .collect();

        let mut impacted: BTreeSet<PathBuf> = changed.iter().cloned().collect();
        for path in &changed {
            for neighbor in prev.graph.neighbors(path) {
                impacted.insert(neighbor);
            }
        }
        log::debug!(
            "[Analyzer] incremental scope: {} changed, {} impacted",
            changed.len(),
            impacted.len()
        );

        let retained: Vec<Arc<FileAnalysisResult>> = prev
            .files
            .iter()
            .filter(|file| !impacted.contains(&file.path))
            .cloned()
            .collect();

        let mut files = retained;
        for path in &impacted {
            if !path.exists() {
                log::debug!("[Analyzer] dropping deleted file {}", path.display());
                continue;
            }
            files.push(Arc::new(self.analyze_file(path, None)?));
        }
        files.sort_by(|a, b| a.path.cmp(&b.path));

        Ok(self.assemble(prev.root.clone(), files))
    }

    /// Build the dependency graph for an arbitrary set of file results.
    pub fn generate_dependency_graph(
        &self,
        files: &[Arc<FileAnalysisResult>],
    ) -> DependencyGraph {
        DependencyGraph::build(files)
    }

    /// Derive graph, stability, risk, and the flattened findings list.
    /// Shared by the full and incremental paths so both produce identical
    /// snapshots for identical file sets.
    fn assemble(&self, root: PathBuf, files: Vec<Arc<FileAnalysisResult>>) -> AnalysisResult {
        let graph = DependencyGraph::build(&files);
        let stability = stability_metrics(&graph);
        let risk = risk_scores(&graph, &stability);

        let mut findings: Vec<Finding> = files
            .iter()
            .flat_map(|file| file.findings.iter().cloned())
            .collect();
        findings.extend(self.engine.evaluate_project(&files, Some(&graph)));

        AnalysisResult {
            root,
            files,
            findings,
            graph,
            stability,
            risk_scores: risk,
        }
    }
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    }
}
