//! boundary for the external compiler driver
//!
//! the compiler consumes the working tree through a narrow file-access
//! surface and writes outputs back through it. the engine never sees the
//! compiler's own API.

use std::path::{Path, PathBuf};

use crate::repo::Repo;

/// configuration handed to the compiler collaborator
#[derive(Clone, Debug)]
pub struct CompilerConfig {
    /// engine root the compiler resolves source paths against
    pub root: PathBuf,
    /// host-side package cache consulted for bare module specifiers
    pub package_cache: PathBuf,
}

/// file access capabilities the compiler drives
pub trait CompilerHost {
    fn file_exists(&self, path: &str) -> bool;
    fn read_file(&self, path: &str) -> Option<String>;
    fn write_file(&mut self, path: &str, content: &str);
    fn current_dir(&self) -> &Path;
    /// resolve a module specifier from the importing file to a loadable
    /// path, or `None` when nothing matches
    fn resolve_module(&self, specifier: &str, referrer: &str) -> Option<String>;
}

/// compiler host backed by the version engine
pub struct RepoHost<'a> {
    repo: &'a mut Repo,
    config: CompilerConfig,
}

impl<'a> RepoHost<'a> {
    pub fn new(repo: &'a mut Repo, config: CompilerConfig) -> Self {
        Self { repo, config }
    }
}

impl CompilerHost for RepoHost<'_> {
    fn file_exists(&self, path: &str) -> bool {
        self.repo.read(path).is_some()
    }

    fn read_file(&self, path: &str) -> Option<String> {
        self.repo.read(path).map(|f| f.content.clone())
    }

    fn write_file(&mut self, path: &str, content: &str) {
        self.repo.write(path, content);
    }

    fn current_dir(&self) -> &Path {
        &self.config.root
    }

    fn resolve_module(&self, specifier: &str, referrer: &str) -> Option<String> {
        if specifier.starts_with("./") || specifier.starts_with("../") {
            let base = match referrer.rfind('/') {
                Some(i) => &referrer[..i],
                None => "",
            };
            let joined = normalize_segments(base, specifier);
            for suffix in ["", ".ts", ".js", "/index.ts"] {
                let candidate = format!("{}{}", joined, suffix);
                if self.file_exists(&candidate) {
                    return Some(candidate);
                }
            }
            return None;
        }

        // bare specifier: point at the host package cache
        Some(
            self.config
                .package_cache
                .join(specifier)
                .to_string_lossy()
                .into_owned(),
        )
    }
}

/// join a relative specifier onto a base directory, folding `.` and `..`
fn normalize_segments(base: &str, specifier: &str) -> String {
    let mut segments: Vec<&str> = base.split('/').filter(|s| !s.is_empty()).collect();
    for part in specifier.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}
