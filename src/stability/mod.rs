//! Stability and change-impact scoring over the dependency graph.
//!
//! A file is risky when editing it can ripple through many stable (heavily
//! depended-upon) modules; closer dependents weigh more.

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};

use crate::core::StabilityMetric;
use crate::graph::DependencyGraph;

/// `stability = ce / (ca + ce)`, 0 for isolated nodes.
pub fn stability_metrics(graph: &DependencyGraph) -> HashMap<PathBuf, StabilityMetric> {
    graph
        .nodes()
        .map(|node| {
            let efferent = node.imports.len();
            let afferent = node.imported_by.len();
            let stability = if afferent + efferent == 0 {
                0.0
            } else {
                efferent as f64 / (afferent + efferent) as f64
            };
            (
                node.path.clone(),
                StabilityMetric {
                    afferent,
                    efferent,
                    stability,
                },
            )
        })
        .collect()
}

/// Reverse-reachability from `path`: every transitive dependent with its
/// BFS depth (> 0).
pub fn impacted_by(graph: &DependencyGraph, path: &Path) -> Vec<(PathBuf, usize)> {
    let mut impacted = Vec::new();
    let mut seen: HashSet<PathBuf> = HashSet::new();
    let mut queue: VecDeque<(PathBuf, usize)> = VecDeque::new();

    seen.insert(path.to_path_buf());
    queue.push_back((path.to_path_buf(), 0));

    while let Some((current, depth)) = queue.pop_front() {
        if depth > 0 {
            impacted.push((current.clone(), depth));
        }
        let Some(node) = graph.node(&current) else {
            continue;
        };
        for dependent in &node.imported_by {
            if seen.insert(dependent.clone()) {
                queue.push_back((dependent.clone(), depth + 1));
            }
        }
    }

    impacted
}

/// `risk(f) = sum over impacted n of (1 - stability(n)) / (depth(n) + 1)`.
pub fn risk_scores(
    graph: &DependencyGraph,
    stability: &HashMap<PathBuf, StabilityMetric>,
) -> HashMap<PathBuf, f64> {
    graph
        .paths()
        .map(|path| {
            let score = impacted_by(graph, path)
                .into_iter()
                .map(|(impacted, depth)| {
                    let node_stability = stability
                        .get(&impacted)
                        .map(|m| m.stability)
                        .unwrap_or(0.0);
                    (1.0 - node_stability) / (depth as f64 + 1.0)
                })
                .sum();
            (path.clone(), score)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FileAnalysisResult;
    use crate::parsers::Language;
    use std::sync::Arc;

    fn file(path: &str, deps: &[&str]) -> Arc<FileAnalysisResult> {
        Arc::new(FileAnalysisResult {
            path: PathBuf::from(path),
            language: Language::TypeScript,
            metrics: HashMap::new(),
            findings: Vec::new(),
            dependencies: deps.iter().map(|d| d.to_string()).collect(),
            functions: Vec::new(),
            classes: Vec::new(),
        })
    }

    fn chain_graph() -> DependencyGraph {
        // a -> b -> c
        DependencyGraph::build(&[
            file("/p/a.ts", &["./b"]),
            file("/p/b.ts", &["./c"]),
            file("/p/c.ts", &[]),
        ])
    }

    #[test]
    fn chain_stability_descends() {
        let graph = chain_graph();
        let stability = stability_metrics(&graph);

        assert_eq!(stability[Path::new("/p/a.ts")].stability, 1.0);
        assert_eq!(stability[Path::new("/p/b.ts")].stability, 0.5);
        assert_eq!(stability[Path::new("/p/c.ts")].stability, 0.0);
        assert_eq!(stability[Path::new("/p/c.ts")].afferent, 1);
        assert_eq!(stability[Path::new("/p/c.ts")].efferent, 0);
    }

    #[test]
    fn stability_is_bounded() {
        let graph = chain_graph();
        for metric in stability_metrics(&graph).values() {
            assert!((0.0..=1.0).contains(&metric.stability));
        }
    }

    #[test]
    fn impact_walks_reverse_edges_with_depth() {
        let graph = chain_graph();
        let mut impacted = impacted_by(&graph, Path::new("/p/c.ts"));
        impacted.sort();

        assert_eq!(
            impacted,
            vec![
                (PathBuf::from("/p/a.ts"), 2),
                (PathBuf::from("/p/b.ts"), 1),
            ]
        );
    }

    #[test]
    fn leaf_with_no_dependents_has_zero_risk() {
        let graph = chain_graph();
        let stability = stability_metrics(&graph);
        let risk = risk_scores(&graph, &stability);

        assert_eq!(risk[Path::new("/p/a.ts")], 0.0);
    }

    #[test]
    fn deeply_depended_on_file_carries_highest_risk() {
        // hub <- 15 feature modules <- 15 pages; hub imports nothing.
        let mut files = vec![file("/p/hub.ts", &[])];
        for i in 0..15 {
            files.push(file(&format!("/p/feature{i:02}.ts"), &["./hub"]));
            files.push(file(
                &format!("/p/page{i:02}.ts"),
                &[&format!("./feature{i:02}")],
            ));
        }
        let graph = DependencyGraph::build(&files);
        let stability = stability_metrics(&graph);
        let risk = risk_scores(&graph, &stability);

        assert_eq!(stability[Path::new("/p/hub.ts")].stability, 0.0);

        // Features sit mid-chain (ca = ce = 1), so each contributes
        // (1 - 0.5)/2 to the hub; pages are fully unstable and add nothing.
        let hub_risk = risk[Path::new("/p/hub.ts")];
        assert!((hub_risk - 15.0 * 0.25).abs() < 1e-9);

        let max_other = risk
            .iter()
            .filter(|(p, _)| p.as_path() != Path::new("/p/hub.ts"))
            .map(|(_, r)| *r)
            .fold(0.0_f64, f64::max);
        assert!(hub_risk > max_other);
    }

    #[test]
    fn risk_weights_near_dependents_more() {
        let graph = chain_graph();
        let stability = stability_metrics(&graph);
        let risk = risk_scores(&graph, &stability);

        // c's dependents: b at depth 1 (stability 0.5), a at depth 2
        // (stability 1.0): (1-0.5)/2 + (1-1)/3 = 0.25.
        assert!((risk[Path::new("/p/c.ts")] - 0.25).abs() < 1e-9);
        // b's dependent: a at depth 1: (1-1)/2 = 0.
        assert_eq!(risk[Path::new("/p/b.ts")], 0.0);
    }
}
