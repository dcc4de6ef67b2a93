//! Configuration records for the analysis core.
//!
//! The core never reads configuration files; the host hands in a structured
//! record (typically deserialized from JSON). Every field defaults, so a
//! partial record deep-merges over [`AnalysisConfig::default`]: absent
//! top-level fields take their defaults, and rule entries are overlaid onto
//! the default rule set id-by-id.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::Severity;

/// Root configuration for an [`crate::Analyzer`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisConfig {
    /// Glob patterns selecting files to analyze, relative to the project root.
    pub analyze_paths: Vec<String>,

    /// Glob patterns excluded from analysis.
    pub exclude_paths: Vec<String>,

    /// Rule configurations keyed by rule id.
    pub rules: BTreeMap<String, RuleConfig>,

    /// Incremental analysis settings. `debounce_seconds` is carried for the
    /// host's watcher; the core itself only honors `enabled`.
    pub incremental: IncrementalConfig,

    /// Log verbosity. When unset, the legacy `debug_mode` flag selects
    /// between `Info` and `Debug`.
    pub log_level: Option<LogLevel>,

    /// Legacy alias: `debugMode: true` means `logLevel: debug` when
    /// `logLevel` is absent.
    pub debug_mode: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            analyze_paths: vec!["**/*".to_string()],
            exclude_paths: vec![
                "**/node_modules/**".to_string(),
                "**/dist/**".to_string(),
                "**/build/**".to_string(),
                "**/.git/**".to_string(),
            ],
            rules: default_rules(),
            incremental: IncrementalConfig::default(),
            log_level: None,
            debug_mode: false,
        }
    }
}

impl AnalysisConfig {
    /// Overlay this (possibly partial) configuration on the defaults.
    ///
    /// Scalar fields already defaulted during deserialization; the rule map
    /// still needs the default entries that the partial record did not
    /// mention.
    pub fn merged_over_defaults(mut self) -> Self {
        for (id, rule) in default_rules() {
            self.rules.entry(id).or_insert(rule);
        }
        self
    }

    /// Effective log level after applying the `debug_mode` alias.
    pub fn effective_log_level(&self) -> LogLevel {
        match self.log_level {
            Some(level) => level,
            None if self.debug_mode => LogLevel::Debug,
            None => LogLevel::Info,
        }
    }

    pub fn rule(&self, id: &str) -> Option<&RuleConfig> {
        self.rules.get(id)
    }
}

/// Per-rule configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RuleConfig {
    pub enabled: bool,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metric: Option<String>,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            severity: Severity::Warning,
            threshold: None,
            metric: None,
        }
    }
}

impl RuleConfig {
    pub fn threshold_rule(metric: &str, threshold: f64, severity: Severity) -> Self {
        Self {
            enabled: true,
            severity,
            threshold: Some(threshold),
            metric: Some(metric.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct IncrementalConfig {
    pub enabled: bool,
    pub debounce_seconds: f64,
}

impl Default for IncrementalConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            debounce_seconds: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Silent,
    Info,
    Warn,
    Debug,
}

impl LogLevel {
    /// Map onto the `log` facade's filter so the host can configure its
    /// logger implementation from the same record.
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Silent => log::LevelFilter::Off,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Debug => log::LevelFilter::Debug,
        }
    }
}

fn default_rules() -> BTreeMap<String, RuleConfig> {
    let mut rules = BTreeMap::new();
    rules.insert(
        "complexity.cyclomatic".to_string(),
        RuleConfig::threshold_rule("cyclomaticComplexity", 10.0, Severity::Warning),
    );
    rules.insert(
        "complexity.cognitive".to_string(),
        RuleConfig::threshold_rule("cognitiveComplexity", 15.0, Severity::Warning),
    );
    rules.insert(
        "module.circularDependency".to_string(),
        RuleConfig {
            enabled: true,
            severity: Severity::Error,
            threshold: None,
            metric: None,
        },
    );
    rules.insert(
        "syntax.error".to_string(),
        RuleConfig {
            enabled: true,
            severity: Severity::Error,
            threshold: Some(0.2),
            metric: None,
        },
    );
    rules
}
