use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

/// language detected from a file extension, advisory only
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Language {
    TypeScript,
    JavaScript,
    Rust,
    Python,
    Json,
    Html,
    Css,
    Markdown,
}

/// advisory metadata derived from file content
///
/// recomputed from content alone on every change and never part of any
/// hash. the compiler collaborator may ignore it entirely.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FileContext {
    pub language: Option<Language>,
    /// imported module specifiers
    pub imports: Vec<String>,
    /// exported symbol names and re-export specifiers
    pub exports: Vec<String>,
}

/// a live file in the working tree
#[derive(Clone, Debug)]
pub struct FileEntry {
    /// absolute path under the engine root
    pub path: PathBuf,
    pub content: String,
    /// bumped strictly on content change; identical writes are no-ops
    pub version: u64,
    pub context: FileContext,
}

/// the mutable set of live files, keyed by absolute path
pub struct WorkTree {
    root: PathBuf,
    files: BTreeMap<PathBuf, FileEntry>,
}

impl WorkTree {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            files: BTreeMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// resolve a path against the root
    ///
    /// relative paths are joined onto the root; absolute paths are kept.
    /// `.` and `..` components are folded away lexically.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        let joined = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        };

        let mut out = PathBuf::new();
        for comp in joined.components() {
            match comp {
                Component::CurDir => {}
                Component::ParentDir => {
                    out.pop();
                }
                other => out.push(other),
            }
        }
        out
    }

    /// relative forward-slash form of an absolute path under the root
    pub fn rel_path(&self, abs: &Path) -> String {
        let rel = abs.strip_prefix(&self.root).unwrap_or(abs);
        rel.components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// create or update a file, bumping its version only on content change
    pub fn write(&mut self, path: impl AsRef<Path>, content: impl Into<String>) {
        let abs = self.resolve(path);
        let content = content.into();

        match self.files.entry(abs) {
            Entry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();
                if entry.content != content {
                    entry.version += 1;
                    entry.context = derive_context(&content, &entry.path);
                    entry.content = content;
                }
            }
            Entry::Vacant(vacant) => {
                let path = vacant.key().clone();
                let context = derive_context(&content, &path);
                vacant.insert(FileEntry {
                    path,
                    content,
                    version: 0,
                    context,
                });
            }
        }
    }

    /// remove a file; absent paths are a silent no-op
    pub fn delete(&mut self, path: impl AsRef<Path>) {
        let abs = self.resolve(path);
        self.files.remove(&abs);
    }

    pub fn read(&self, path: impl AsRef<Path>) -> Option<&FileEntry> {
        let abs = self.resolve(path);
        self.files.get(&abs)
    }

    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.read(path).is_some()
    }

    /// all live files, ordered by path
    pub fn files(&self) -> impl Iterator<Item = &FileEntry> {
        self.files.values()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// drop every file
    pub fn clear(&mut self) {
        self.files.clear();
    }

    /// relative paths (to `dir`) of every descendant file, sorted
    pub fn descendants(&self, dir: impl AsRef<Path>) -> Vec<String> {
        let dir = self.resolve(dir);
        let mut out = Vec::new();
        for abs in self.files.keys() {
            if let Ok(rel) = abs.strip_prefix(&dir) {
                let rel: Vec<_> = rel
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect();
                if !rel.is_empty() {
                    out.push(rel.join("/"));
                }
            }
        }
        out
    }
}

/// recompute advisory context from content
fn derive_context(content: &str, path: &Path) -> FileContext {
    let language = detect_language(path);
    let scan = matches!(
        language,
        Some(Language::TypeScript) | Some(Language::JavaScript)
    );
    FileContext {
        language,
        imports: if scan { scan_imports(content) } else { vec![] },
        exports: if scan { scan_exports(content) } else { vec![] },
    }
}

fn detect_language(path: &Path) -> Option<Language> {
    match path.extension()?.to_str()? {
        "ts" | "tsx" => Some(Language::TypeScript),
        "js" | "jsx" | "mjs" | "cjs" => Some(Language::JavaScript),
        "rs" => Some(Language::Rust),
        "py" => Some(Language::Python),
        "json" => Some(Language::Json),
        "html" | "htm" => Some(Language::Html),
        "css" => Some(Language::Css),
        "md" => Some(Language::Markdown),
        _ => None,
    }
}

/// pull the quoted specifier out of an `import`/`export ... from`/`require`
/// line, if any
fn quoted_specifier(line: &str) -> Option<String> {
    let idx = line.find(|c| c == '\'' || c == '"')?;
    let quote = line.as_bytes()[idx] as char;
    let rest = &line[idx + 1..];
    let end = rest.find(quote)?;
    Some(rest[..end].to_string())
}

fn scan_imports(content: &str) -> Vec<String> {
    let mut imports = Vec::new();
    for line in content.lines() {
        let line = line.trim_start();
        let is_import = line.starts_with("import ") || line.starts_with("import\"")
            || line.starts_with("import'");
        let is_require = line.contains("require(");
        if is_import || is_require {
            if let Some(spec) = quoted_specifier(line) {
                if !imports.contains(&spec) {
                    imports.push(spec);
                }
            }
        }
    }
    imports
}

fn scan_exports(content: &str) -> Vec<String> {
    let mut exports = Vec::new();
    for line in content.lines() {
        let line = line.trim_start();
        let Some(rest) = line.strip_prefix("export ") else {
            continue;
        };

        // re-export: `export ... from '<spec>'`
        if rest.contains(" from ") {
            if let Some(spec) = quoted_specifier(rest) {
                exports.push(spec);
            }
            continue;
        }

        // declaration: `export const x`, `export function f`, ...
        let rest = rest.strip_prefix("default ").unwrap_or(rest);
        for keyword in ["const ", "let ", "var ", "function ", "class ", "interface ", "type "] {
            if let Some(decl) = rest.strip_prefix(keyword) {
                let name: String = decl
                    .chars()
                    .take_while(|c| c.is_alphanumeric() || *c == '_' || *c == '$')
                    .collect();
                if !name.is_empty() {
                    exports.push(name);
                }
                break;
            }
        }
    }
    exports
}
