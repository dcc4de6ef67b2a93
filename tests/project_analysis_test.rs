//! End-to-end project analysis scenarios.

use codegauge::{AnalysisConfig, Analyzer, FindingKind, RuleConfig, Severity};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, content: &str) {
    let path = dir.path().join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

#[test]
fn empty_project_yields_empty_snapshot() {
    let dir = TempDir::new().unwrap();
    let analyzer = Analyzer::default();
    let result = analyzer.analyze_project(dir.path(), &[]).unwrap();

    assert!(result.files.is_empty());
    assert!(result.findings.is_empty());
    assert!(result.graph.is_empty());
    assert!(result.stability.is_empty());
    assert!(result.risk_scores.is_empty());
}

#[test]
fn single_file_without_imports() {
    let dir = TempDir::new().unwrap();
    write(&dir, "solo.ts", "export const solo = 1;\n");

    let analyzer = Analyzer::default();
    let result = analyzer.analyze_project(dir.path(), &[]).unwrap();

    assert_eq!(result.files.len(), 1);
    assert_eq!(result.graph.len(), 1);

    let path = &result.files[0].path;
    let stability = &result.stability[path];
    assert_eq!(stability.afferent, 0);
    assert_eq!(stability.efferent, 0);
    assert_eq!(stability.stability, 0.0);
    assert_eq!(result.risk_scores[path], 0.0);
}

#[test]
fn mutual_imports_form_one_normalized_cycle() {
    let dir = TempDir::new().unwrap();
    write(&dir, "a.ts", "import { b } from './b';\nexport const a = () => b;\n");
    write(&dir, "b.ts", "import { a } from './a';\nexport const b = () => a;\n");

    let analyzer = Analyzer::default();
    let result = analyzer.analyze_project(dir.path(), &[]).unwrap();

    let cycles = result.graph.circular_dependencies();
    assert_eq!(cycles.len(), 1);

    let cycle = &cycles[0];
    assert_eq!(cycle.len(), 3);
    assert_eq!(cycle.first(), cycle.last());
    // Rotation starts at the lexicographically smaller path.
    assert!(cycle[0].ends_with("a.ts"));
    assert!(cycle[1].ends_with("b.ts"));

    // Both members import one and are imported by one.
    for file in &result.files {
        assert_eq!(result.stability[&file.path].stability, 0.5);
    }

    // The project rule reports the cycle as an architecture finding.
    let circular: Vec<_> = result
        .findings
        .iter()
        .filter(|f| f.id == "module.circularDependency")
        .collect();
    assert_eq!(circular.len(), 1);
    assert_eq!(circular[0].kind, FindingKind::Architecture);
    assert_eq!(circular[0].severity, Severity::Error);
    assert!(circular[0].message.starts_with("found cycle: "));
}

#[test]
fn chain_has_no_cycles_and_descending_stability() {
    let dir = TempDir::new().unwrap();
    write(&dir, "a.ts", "import './b';\n");
    write(&dir, "b.ts", "import './c';\n");
    write(&dir, "c.ts", "export const c = 3;\n");

    let analyzer = Analyzer::default();
    let result = analyzer.analyze_project(dir.path(), &[]).unwrap();

    assert!(result.graph.circular_dependencies().is_empty());

    let by_name = |name: &str| {
        let file = result.files.iter().find(|f| f.path.ends_with(name)).unwrap();
        result.stability[&file.path].stability
    };
    assert_eq!(by_name("a.ts"), 1.0);
    assert_eq!(by_name("b.ts"), 0.5);
    assert_eq!(by_name("c.ts"), 0.0);
}

#[test]
fn edge_symmetry_holds_across_the_project() {
    let dir = TempDir::new().unwrap();
    write(&dir, "app.ts", "import './lib/util';\nimport './lib/fmt';\n");
    write(&dir, "lib/util.ts", "import './fmt';\n");
    write(&dir, "lib/fmt.ts", "export const fmt = 0;\n");

    let analyzer = Analyzer::default();
    let result = analyzer.analyze_project(dir.path(), &[]).unwrap();

    for node in result.graph.nodes() {
        for import in &node.imports {
            let target = result.graph.node(import).expect("import target in graph");
            assert!(target.imported_by.contains(&node.path));
        }
        for importer in &node.imported_by {
            let source = result.graph.node(importer).expect("importer in graph");
            assert!(source.imports.contains(&node.path));
        }
    }
}

#[test]
fn custom_threshold_rule_emits_exactly_one_finding() {
    let dir = TempDir::new().unwrap();
    let mut source = String::from("export function dense(x: number): number {\n");
    for i in 0..14 {
        source.push_str(&format!("    if (x > {i}) {{ x -= {i}; }}\n"));
    }
    source.push_str("    return x;\n}\n");
    write(&dir, "dense.ts", &source);

    let mut config: AnalysisConfig = serde_json::from_str(
        r#"{
            "rules": {
                "complexity.cyclomatic": { "enabled": false },
                "complexity.cognitive": { "enabled": false },
                "function.complexity": {
                    "enabled": true,
                    "severity": "warning",
                    "threshold": 10,
                    "metric": "cyclomaticComplexity"
                }
            }
        }"#,
    )
    .unwrap();
    config.analyze_paths = vec!["**/*".to_string()];

    let analyzer = Analyzer::new(config);
    let result = analyzer.analyze_project(dir.path(), &[]).unwrap();

    let hits: Vec<_> = result
        .findings
        .iter()
        .filter(|f| f.id == "function.complexity.exceeded")
        .collect();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].severity, Severity::Warning);
    assert_eq!(hits[0].details["metricName"], serde_json::json!("cyclomaticComplexity"));
    assert_eq!(hits[0].details["threshold"], serde_json::json!(10.0));
    assert_eq!(hits[0].details["value"], serde_json::json!(15.0));
}

#[test]
fn repeated_analysis_is_value_equal() {
    let dir = TempDir::new().unwrap();
    write(&dir, "a.ts", "import './b';\nexport function a() { return 1; }\n");
    write(&dir, "b.ts", "export function b(x) { return x ? 1 : 2; }\n");

    let analyzer = Analyzer::default();
    let first = analyzer.analyze_project(dir.path(), &[]).unwrap();
    let second = analyzer.analyze_project(dir.path(), &[]).unwrap();

    assert_eq!(first, second);
}

#[test]
fn failing_file_is_skipped_not_fatal() {
    let dir = TempDir::new().unwrap();
    write(&dir, "good.ts", "export const ok = true;\n");
    // Invalid UTF-8 makes the read fail for this file only.
    fs::write(dir.path().join("bad.ts"), [0xff, 0xfe, 0x00, 0x01]).unwrap();

    let analyzer = Analyzer::default();
    let result = analyzer.analyze_project(dir.path(), &[]).unwrap();

    assert_eq!(result.files.len(), 1);
    assert!(result.files[0].path.ends_with("good.ts"));
}

#[test]
fn extra_excludes_apply_on_top_of_config() {
    let dir = TempDir::new().unwrap();
    write(&dir, "keep.ts", "export const keep = 1;\n");
    write(&dir, "generated/skip.ts", "export const skip = 1;\n");

    let analyzer = Analyzer::default();
    let result = analyzer
        .analyze_project(dir.path(), &["generated/**".to_string()])
        .unwrap();

    assert_eq!(result.files.len(), 1);
    assert!(result.files[0].path.ends_with("keep.ts"));
}

#[test]
fn mixed_language_project() {
    let dir = TempDir::new().unwrap();
    write(&dir, "web.ts", "import './shared';\nexport const web = 1;\n");
    write(&dir, "shared.ts", "export const shared = 1;\n");
    write(&dir, "tool.py", "import os\n\ndef run():\n    return os.name\n");

    let analyzer = Analyzer::default();
    let result = analyzer.analyze_project(dir.path(), &[]).unwrap();

    assert_eq!(result.files.len(), 3);
    let python = result
        .files
        .iter()
        .find(|f| f.path.ends_with("tool.py"))
        .unwrap();
    assert_eq!(python.language, codegauge::Language::Python);
    assert_eq!(python.dependencies, vec!["os"]);
    assert_eq!(python.metric("functionCount"), Some(1.0));
}

#[test]
fn summary_aggregates_counts() {
    let dir = TempDir::new().unwrap();
    write(&dir, "a.ts", "import './b';\n");
    write(&dir, "b.ts", "import './a';\n");

    let analyzer = Analyzer::default();
    let result = analyzer.analyze_project(dir.path(), &[]).unwrap();
    let summary = result.summary();

    assert_eq!(summary.total_files, 2);
    assert_eq!(summary.circular_dependency_count, 1);
    assert!(summary.errors >= 1);
}

#[test]
fn disabled_circular_rule_suppresses_findings_but_not_graph() {
    let dir = TempDir::new().unwrap();
    write(&dir, "a.ts", "import './b';\n");
    write(&dir, "b.ts", "import './a';\n");

    let mut config = AnalysisConfig::default();
    config.rules.insert(
        "module.circularDependency".to_string(),
        RuleConfig {
            enabled: false,
            severity: Severity::Error,
            threshold: None,
            metric: None,
        },
    );

    let analyzer = Analyzer::new(config);
    let result = analyzer.analyze_project(dir.path(), &[]).unwrap();

    assert!(result
        .findings
        .iter()
        .all(|f| f.id != "module.circularDependency"));
    assert_eq!(result.graph.circular_dependencies().len(), 1);
}

#[test]
fn findings_are_ordered_file_first_then_project() {
    let dir = TempDir::new().unwrap();
    let mut dense = String::from("export function dense(x: number): number {\n");
    for i in 0..14 {
        dense.push_str(&format!("    if (x > {i}) {{ x -= {i}; }}\n"));
    }
    dense.push_str("    return x;\n}\nimport './zz';\n");
    write(&dir, "aa.ts", &dense);
    write(&dir, "zz.ts", "import './aa';\n");

    let analyzer = Analyzer::default();
    let result = analyzer.analyze_project(dir.path(), &[]).unwrap();

    let cyclomatic_pos = result
        .findings
        .iter()
        .position(|f| f.id == "complexity.cyclomatic.exceeded")
        .expect("file finding present");
    let circular_pos = result
        .findings
        .iter()
        .position(|f| f.id == "module.circularDependency")
        .expect("project finding present");
    assert!(cyclomatic_pos < circular_pos);
}

fn _assert_send_sync<T: Send + Sync>() {}

#[test]
fn analyzer_is_shareable_across_threads() {
    _assert_send_sync::<Analyzer>();
    _assert_send_sync::<codegauge::AnalysisResult>();
}

#[test]
fn generate_dependency_graph_from_snapshot_files() {
    let dir = TempDir::new().unwrap();
    write(&dir, "a.ts", "import './b';\n");
    write(&dir, "b.ts", "export const b = 1;\n");

    let analyzer = Analyzer::default();
    let result = analyzer.analyze_project(dir.path(), &[]).unwrap();

    let graph = analyzer.generate_dependency_graph(&result.files);
    assert_eq!(graph, result.graph);
}

#[test]
fn default_excludes_skip_node_modules() {
    let dir = TempDir::new().unwrap();
    write(&dir, "app.ts", "export const app = 1;\n");
    write(&dir, "node_modules/lib/index.js", "module.exports = 1;\n");

    let analyzer = Analyzer::default();
    let result = analyzer.analyze_project(dir.path(), &[]).unwrap();

    assert_eq!(result.files.len(), 1);
    assert!(result.files[0].path.ends_with(Path::new("app.ts")));
}
