//! # Codegauge
//!
//! A static code intelligence core that continuously evaluates source-code
//! quality for a project: it parses TypeScript, JavaScript, and Python
//! sources into concrete syntax trees, derives per-file complexity metrics,
//! extracts structural entities, builds a project-wide module dependency
//! graph, and computes architectural health indicators together with
//! rule-based findings.
//!
//! ## Quick Start
//!
//! ```rust
//! use codegauge::{AnalysisConfig, Analyzer};
//! use std::path::Path;
//!
//! let analyzer = Analyzer::new(AnalysisConfig::default());
//! let source = r#"
//!     import { helper } from './util';
//!
//!     export function greet(name: string): string {
//!         return name ? helper(name) : 'hello';
//!     }
//! "#;
//! let result = analyzer
//!     .analyze_file(Path::new("greet.ts"), Some(source))
//!     .unwrap();
//!
//! assert_eq!(result.dependencies, vec!["./util"]);
//! assert!(result.metric("cyclomaticComplexity").unwrap() >= 2.0);
//! ```
//!
//! ## Incremental Analysis
//!
//! [`Analyzer::analyze_files`] consumes a set of changed paths together
//! with the previous [`AnalysisResult`] snapshot and re-analyzes only the
//! changed files plus their direct dependency-graph neighbors. Every other
//! per-file result is carried into the new snapshot by `Arc` identity, so
//! consumers can detect unchanged entries with [`std::sync::Arc::ptr_eq`].
//!
//! ## Architecture
//!
//! ```text
//! files -> parsers (grammar registry) -> adapters (unified nodes)
//!       -> complexity + metrics + structure -> per-file result
//!       -> rules (file level) -> graph -> stability/risk
//!       -> rules (project level) -> AnalysisResult
//! ```
//!
//! The core has no on-disk state and no global process state; logging goes
//! through the `log` facade and configuration arrives as a structured
//! record ([`AnalysisConfig`]).

pub mod adapters;
pub mod analyzer;
pub mod complexity;
pub mod config;
pub mod core;
pub mod graph;
pub mod io;
pub mod metrics;
pub mod parsers;
pub mod rules;
pub mod stability;
pub mod structure;

// Re-export commonly used types
pub use crate::analyzer::Analyzer;
pub use crate::config::{AnalysisConfig, IncrementalConfig, LogLevel, RuleConfig};
pub use crate::core::errors::{Error, Result};
pub use crate::core::unified::{NodeData, NodeId, UnifiedAst, UnifiedNode};
pub use crate::core::{
    AnalysisResult, AnalysisSummary, FileAnalysisResult, Finding, FindingKind, Severity,
    SourceLocation, StabilityMetric,
};
pub use crate::graph::{DependencyGraph, DependencyNode};
pub use crate::parsers::{Language, ParseResult, ParserRegistry};
pub use crate::rules::{
    CircularDependencyRule, MetricThresholdRule, Rule, RuleEngine, RuleLevel,
};
pub use crate::stability::{impacted_by, risk_scores, stability_metrics};
pub use crate::structure::{
    analyze_classes, analyze_functions, analyze_module_dependencies, ClassInfo, FunctionInfo,
    MethodInfo,
};
