//! Project dependency graph: import resolution, coupling edges, and
//! circular dependency detection.
//!
//! Nodes own their neighbor lists as path keys rather than references,
//! which keeps the `imports`/`imported_by` pair acyclic and gives O(1)
//! lookup. Node order is the `BTreeMap` key order, so every derived
//! computation is deterministic.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use crate::core::FileAnalysisResult;
use crate::parsers::Language;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DependencyNode {
    pub path: PathBuf,
    pub imports: Vec<PathBuf>,
    pub imported_by: Vec<PathBuf>,
    pub instability: f64,
}

impl DependencyNode {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            imports: Vec::new(),
            imported_by: Vec::new(),
            instability: 0.0,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct DependencyGraph {
    nodes: BTreeMap<PathBuf, DependencyNode>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the graph from per-file results.
    ///
    /// Every analyzed file is pre-seeded as a node; raw specifiers resolve
    /// against the importing file's directory; specifiers that do not land
    /// on an analyzed file are dropped.
    pub fn build(files: &[Arc<FileAnalysisResult>]) -> Self {
        let mut graph = Self::new();

        for file in files {
            graph.add_node(file.path.clone());
        }
        let analyzed: HashSet<PathBuf> = files.iter().map(|f| f.path.clone()).collect();

        for file in files {
            for specifier in &file.dependencies {
                let Some(resolved) = resolve_specifier(&file.path, file.language, specifier)
                else {
                    log::debug!(
                        "[DependencyGraph] external specifier ignored: {specifier} (from {})",
                        file.path.display()
                    );
                    continue;
                };
                if !analyzed.contains(&resolved) {
                    log::debug!(
                        "[DependencyGraph] unresolved specifier dropped: {specifier} -> {}",
                        resolved.display()
                    );
                    continue;
                }
                graph.add_edge(&file.path, &resolved);
            }
        }

        graph.compute_instability();
        graph
    }

    pub fn add_node(&mut self, path: PathBuf) {
        self.nodes.entry(path.clone()).or_insert_with(|| {
            log::debug!("[DependencyGraph] added node: {}", path.display());
            DependencyNode::new(path)
        });
    }

    /// Insert a deduplicated symmetric edge `from -> to`.
    pub fn add_edge(&mut self, from: &Path, to: &Path) {
        self.add_node(from.to_path_buf());
        self.add_node(to.to_path_buf());

        let from_node = self.nodes.get_mut(from).expect("node pre-seeded");
        if !from_node.imports.iter().any(|p| p == to) {
            from_node.imports.push(to.to_path_buf());
        }
        let to_node = self.nodes.get_mut(to).expect("node pre-seeded");
        if !to_node.imported_by.iter().any(|p| p == from) {
            to_node.imported_by.push(from.to_path_buf());
        }
    }

    /// `instability = ce / (ca + ce)`; isolated nodes are maximally stable.
    pub fn compute_instability(&mut self) {
        for node in self.nodes.values_mut() {
            let ce = node.imports.len();
            let ca = node.imported_by.len();
            node.instability = if ca + ce == 0 {
                0.0
            } else {
                ce as f64 / (ca + ce) as f64
            };
        }
    }

    pub fn node(&self, path: &Path) -> Option<&DependencyNode> {
        self.nodes.get(path)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.nodes.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &DependencyNode> {
        self.nodes.values()
    }

    pub fn paths(&self) -> impl Iterator<Item = &PathBuf> {
        self.nodes.keys()
    }

    /// Direct neighborhood of a node: its imports and importers.
    pub fn neighbors(&self, path: &Path) -> Vec<PathBuf> {
        let Some(node) = self.nodes.get(path) else {
            return Vec::new();
        };
        let mut neighbors = node.imports.clone();
        for importer in &node.imported_by {
            if !neighbors.contains(importer) {
                neighbors.push(importer.clone());
            }
        }
        neighbors
    }

    /// Detect circular dependencies.
    ///
    /// Each cycle is rotated to start at its lexicographically smallest
    /// member and closed by repeating that member, then deduplicated, so
    /// the output is independent of visitation order.
    pub fn circular_dependencies(&self) -> Vec<Vec<PathBuf>> {
        let mut visited: HashSet<&Path> = HashSet::new();
        let mut cycles: Vec<Vec<PathBuf>> = Vec::new();
        let mut seen_cycles: HashSet<String> = HashSet::new();

        for start in self.nodes.keys() {
            if !visited.contains(start.as_path()) {
                let mut stack: Vec<&Path> = Vec::new();
                let mut on_stack: HashSet<&Path> = HashSet::new();
                self.dfs_cycles(
                    start,
                    &mut visited,
                    &mut stack,
                    &mut on_stack,
                    &mut seen_cycles,
                    &mut cycles,
                );
            }
        }

        cycles
    }

    fn dfs_cycles<'a>(
        &'a self,
        node: &'a Path,
        visited: &mut HashSet<&'a Path>,
        stack: &mut Vec<&'a Path>,
        on_stack: &mut HashSet<&'a Path>,
        seen_cycles: &mut HashSet<String>,
        cycles: &mut Vec<Vec<PathBuf>>,
    ) {
        visited.insert(node);
        stack.push(node);
        on_stack.insert(node);

        if let Some(entry) = self.nodes.get(node) {
            for dep in &entry.imports {
                if on_stack.contains(dep.as_path()) {
                    // Back-edge: the slice from `dep` to the stack top is a cycle.
                    let pos = stack
                        .iter()
                        .position(|p| *p == dep.as_path())
                        .expect("back-edge target on stack");
                    let cycle = normalize_cycle(&stack[pos..]);
                    let key = cycle
                        .iter()
                        .map(|p| p.display().to_string())
                        .collect::<Vec<_>>()
                        .join(" -> ");
                    if seen_cycles.insert(key) {
                        cycles.push(cycle);
                    }
                } else if !visited.contains(dep.as_path()) && self.nodes.contains_key(dep) {
                    self.dfs_cycles(dep, visited, stack, on_stack, seen_cycles, cycles);
                }
            }
        }

        stack.pop();
        on_stack.remove(node);
    }
}

/// Rotate so the lexicographically smallest member leads, then close the
/// ring by repeating it.
fn normalize_cycle(members: &[&Path]) -> Vec<PathBuf> {
    let min_index = members
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.cmp(b))
        .map(|(i, _)| i)
        .unwrap_or(0);

    let mut cycle: Vec<PathBuf> = members[min_index..]
        .iter()
        .chain(members[..min_index].iter())
        .map(|p| p.to_path_buf())
        .collect();
    cycle.push(cycle[0].clone());
    cycle
}

/// Resolve a raw import specifier to a project file path.
///
/// Relative specifiers resolve lexically against the importing file's
/// directory; `/` and `~` prefixed specifiers pass through as written;
/// bare package names are external and dropped. Extension-less results get
/// the importing language's source extension appended.
pub fn resolve_specifier(importer: &Path, language: Language, specifier: &str) -> Option<PathBuf> {
    let resolved = if specifier.starts_with('.') {
        let dir = importer.parent().unwrap_or_else(|| Path::new(""));
        normalize_path(&dir.join(specifier))
    } else if specifier.starts_with('/') || specifier.starts_with('~') {
        PathBuf::from(specifier)
    } else {
        return None;
    };

    Some(apply_default_extension(resolved, language))
}

fn apply_default_extension(path: PathBuf, language: Language) -> PathBuf {
    match path.extension().and_then(|e| e.to_str()) {
        None => match language {
            Language::TypeScript => path.with_extension("ts"),
            Language::JavaScript => path.with_extension("js"),
            Language::Python => path,
        },
        // `./types.d` resolves to the declaration file `./types.d.ts`.
        Some("d") if language == Language::TypeScript => path.with_extension("d.ts"),
        Some(_) => path,
    }
}

/// Lexical normalization: fold `.` and `..` components without touching
/// the file system.
fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}
