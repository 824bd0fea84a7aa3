//! Workspace content access for training-time harvesting

use anyhow::Context;
use async_trait::async_trait;
use globset::Glob;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// Read access to the files of a project
#[async_trait]
pub trait WorkspaceProvider: Send + Sync {
    async fn read_file(&self, path: &Path) -> anyhow::Result<String>;

    /// Files whose workspace-relative path matches `glob`, sorted
    async fn list_files(&self, glob: &str) -> anyhow::Result<Vec<PathBuf>>;
}

/// Local directory tree
pub struct FsWorkspace {
    root: PathBuf,
}

impl FsWorkspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() { path.to_path_buf() } else { self.root.join(path) }
    }
}

fn is_ignored(entry: &DirEntry) -> bool {
    if entry.depth() == 0 {
        return false;
    }
    let name = entry.file_name();
    name.to_str().is_some_and(|n| n.starts_with('.'))
        || [OsStr::new("node_modules"), OsStr::new("target"), OsStr::new("dist"), OsStr::new("vendor")]
            .contains(&name)
}

#[async_trait]
impl WorkspaceProvider for FsWorkspace {
    async fn read_file(&self, path: &Path) -> anyhow::Result<String> {
        let full = self.resolve(path);
        tokio::fs::read_to_string(&full)
            .await
            .with_context(|| format!("Failed to read {}", full.display()))
    }

    async fn list_files(&self, glob: &str) -> anyhow::Result<Vec<PathBuf>> {
        let matcher = Glob::new(glob).with_context(|| format!("Invalid glob '{}'", glob))?.compile_matcher();

        let mut files = Vec::new();
        for entry in WalkDir::new(&self.root).follow_links(false).into_iter().filter_entry(|e| !is_ignored(e)) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry.path().strip_prefix(&self.root).unwrap_or(entry.path());
            if matcher.is_match(relative) {
                files.push(relative.to_path_buf());
            }
        }

        files.sort();
        debug!("Glob {} matched {} files under {}", glob, files.len(), self.root.display());
        Ok(files)
    }
}
