use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use super::ignore::IgnoreRules;
use crate::config::ScanConfig;
use crate::error::{Result, ScanError};
use crate::parsers::Language;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub path: PathBuf,
    pub language: Language,
    pub extension: String,
}

/// Lists analyzable files under a root.
pub struct FileScanner {
    excluded_dirs: Vec<String>,
    ignore: IgnoreRules,
}

impl FileScanner {
    pub fn new(excluded_dirs: Vec<String>, ignore: IgnoreRules) -> Self {
        Self {
            excluded_dirs,
            ignore,
        }
    }

    /// Scanner for `root` honoring its `.gitignore` and the given config.
    pub fn for_root(root: &Path, config: &ScanConfig) -> Self {
        Self::new(config.excluded_dirs(), IgnoreRules::load(root, &config.ignore))
    }

    fn keep_entry(&self, root: &Path, entry: &DirEntry) -> bool {
        if entry.depth() == 0 {
            return true;
        }
        let name = entry.file_name().to_string_lossy();
        let is_dir = entry.file_type().is_dir();
        if is_dir && (name.starts_with('.') || self.excluded_dirs.iter().any(|d| *d == name)) {
            return false;
        }
        let relative = relative_slash_path(root, entry.path());
        !self.ignore.is_ignored(&relative, &name, is_dir)
    }

    /// Files with a registered extension, sorted by path.
    pub fn scan_directory(&self, root: &Path) -> Result<Vec<FileInfo>> {
        let mut files = Vec::new();

        let walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| self.keep_entry(root, entry));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) if err.depth() == 0 => {
                    return Err(ScanError::Walk {
                        path: root.to_path_buf(),
                        source: err,
                    });
                }
                Err(err) => {
                    warn!("Skipping unreadable entry: {err}");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let Some(language) = Language::from_path(path) else {
                continue;
            };
            let extension = path
                .extension()
                .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
                .unwrap_or_default();
            files.push(FileInfo {
                path: path.to_path_buf(),
                language,
                extension,
            });
        }

        files.sort_by(|a, b| a.path.cmp(&b.path));
        debug!("Listed {} source files under {}", files.len(), root.display());
        Ok(files)
    }
}

/// `path` relative to `root`, joined with `/` on every platform.
pub fn relative_slash_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

const ROOT_MARKERS: &[&str] = &[
    ".git",
    "package.json",
    "tsconfig.json",
    "pyproject.toml",
    "pom.xml",
    "build.gradle",
];

pub struct ProjectRoot;

impl ProjectRoot {
    /// Canonical form of `path`, which must be an existing directory.
    pub fn canonicalize(path: &Path) -> Result<PathBuf> {
        let canonical = path
            .canonicalize()
            .map_err(|source| ScanError::RootInaccessible {
                path: path.to_path_buf(),
                source,
            })?;
        if !canonical.is_dir() {
            return Err(ScanError::NotADirectory { path: canonical });
        }
        Ok(canonical)
    }

    /// Nearest directory at or above `start` holding a project marker, or
    /// `start` itself when none does.
    pub fn detect(start: &Path) -> PathBuf {
        for dir in start.ancestors() {
            if Self::has_marker(dir) {
                debug!("Detected project root at {}", dir.display());
                return dir.to_path_buf();
            }
        }
        start.to_path_buf()
    }

    fn has_marker(dir: &Path) -> bool {
        if ROOT_MARKERS.iter().any(|marker| dir.join(marker).exists()) {
            return true;
        }
        std::fs::read_dir(dir)
            .map(|entries| {
                entries.filter_map(|e| e.ok()).any(|e| {
                    e.path()
                        .extension()
                        .is_some_and(|ext| ext.eq_ignore_ascii_case("sln"))
                })
            })
            .unwrap_or(false)
    }
}
