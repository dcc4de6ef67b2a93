//! Project file enumeration.
//!
//! Walks the root honoring gitignore, keeps files whose extension belongs
//! to a supported language and whose root-relative path matches the
//! include globs minus the exclude globs, and returns absolute paths in
//! lexicographic order.

use anyhow::Result;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

use crate::parsers::Language;

pub struct ProjectWalker {
    root: PathBuf,
    include: Vec<glob::Pattern>,
    exclude: Vec<glob::Pattern>,
}

impl ProjectWalker {
    pub fn new(
        root: &Path,
        analyze_paths: &[String],
        exclude_paths: &[String],
    ) -> Result<Self> {
        Ok(Self {
            root: root.to_path_buf(),
            include: compile_patterns(analyze_paths)?,
            exclude: compile_patterns(exclude_paths)?,
        })
    }

    pub fn walk(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let walker = WalkBuilder::new(&self.root)
            .hidden(false)
            .git_ignore(true)
            .build();

        for entry in walker {
            let entry = entry?;
            let path = entry.path();
            if path.is_file() && self.should_process(path) {
                files.push(absolute(path));
            }
        }

        files.sort();
        files.dedup();
        Ok(files)
    }

    fn should_process(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        let supported = [Language::TypeScript, Language::JavaScript, Language::Python]
            .iter()
            .any(|lang| lang.extensions().contains(&ext));
        if !supported {
            return false;
        }

        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        if !self.include.iter().any(|p| p.matches_path(relative)) {
            return false;
        }
        if self.exclude.iter().any(|p| p.matches_path(relative)) {
            return false;
        }
        true
    }
}

fn compile_patterns(patterns: &[String]) -> Result<Vec<glob::Pattern>> {
    patterns
        .iter()
        .map(|p| glob::Pattern::new(p).map_err(anyhow::Error::from))
        .collect()
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
