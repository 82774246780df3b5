//! Maps raw dependency strings to files of the scanned project.
//!
//! Strategies run in a fixed order and the first hit wins:
//!
//! 1. external filter (URLs, runtime built-ins, standard libraries, framework namespaces)
//! 2. namespace / package lookup (C#, Java)
//! 3. path aliases (script files)
//! 4. relative specifiers
//! 5. bare name in the importing file's directory
//! 6. sub-path from the importing file's directory
//! 7. path from the project root
//!
//! A miss is never an error; the dependency simply produces no edge.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use tracing::trace;

use super::aliases::AliasTable;
use super::graph::SourceFile;
use super::namespaces::{NamespaceTable, TypeTable};
use crate::parsers::{Language, LanguageFamily};

const NODE_BUILTINS: &[&str] = &[
    "assert", "async_hooks", "buffer", "child_process", "cluster", "console", "constants",
    "crypto", "dgram", "diagnostics_channel", "dns", "domain", "events", "fs", "http", "http2",
    "https", "inspector", "module", "net", "os", "path", "perf_hooks", "process", "punycode",
    "querystring", "readline", "repl", "stream", "string_decoder", "sys", "timers", "tls",
    "trace_events", "tty", "url", "util", "v8", "vm", "wasi", "worker_threads", "zlib",
];

/// Host editor API modules.
const HOST_MODULES: &[&str] = &["vscode"];

const PYTHON_STDLIB: &[&str] = &[
    "__future__", "abc", "argparse", "array", "ast", "asyncio", "base64", "bisect", "builtins",
    "calendar", "codecs", "collections", "concurrent", "configparser", "contextlib", "copy",
    "csv", "ctypes", "dataclasses", "datetime", "decimal", "difflib", "dis", "doctest", "email",
    "enum", "fnmatch", "fractions", "functools", "getpass", "gettext", "glob", "gzip",
    "hashlib", "heapq", "hmac", "html", "http", "importlib", "inspect", "io", "ipaddress",
    "itertools", "json", "locale", "logging", "math", "mimetypes", "multiprocessing",
    "numbers", "operator", "os", "pathlib", "pdb", "pickle", "platform", "pprint", "queue",
    "random", "re", "secrets", "select", "selectors", "shlex", "shutil", "signal", "site",
    "socket", "sqlite3", "ssl", "statistics", "string", "struct", "subprocess", "sys",
    "sysconfig", "tarfile", "tempfile", "textwrap", "threading", "time", "timeit", "tkinter",
    "traceback", "types", "typing", "unicodedata", "unittest", "urllib", "uuid", "venv",
    "warnings", "weakref", "xml", "zipfile", "zlib", "zoneinfo",
];

const FRAMEWORK_NAMESPACES: &[&str] = &[
    "System", "Microsoft", "Windows", "Newtonsoft", "NUnit", "Xunit", "Moq", "java", "javax",
    "jakarta", "android", "androidx", "kotlin", "kotlinx", "lombok", "org.junit",
    "org.springframework", "org.apache", "org.slf4j", "com.google", "com.fasterxml",
];

const SCRIPT_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx", "mjs", "cjs", "mts", "cts", "vue"];
const PYTHON_EXTENSIONS: &[&str] = &["py", "pyw"];

/// Fold `.` and `..` components without touching the filesystem.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

fn first_segment(specifier: &str, separator: char) -> &str {
    specifier.split(separator).next().unwrap_or(specifier)
}

fn is_url(specifier: &str) -> bool {
    specifier.starts_with("http://")
        || specifier.starts_with("https://")
        || specifier.starts_with("//")
        || specifier.starts_with("data:")
}

fn is_relative(specifier: &str) -> bool {
    specifier.starts_with("./")
        || specifier.starts_with("../")
        || specifier == "."
        || specifier == ".."
}

fn has_namespace_root(specifier: &str, roots: &[&str]) -> bool {
    roots.iter().any(|root| {
        specifier == *root
            || specifier
                .strip_prefix(root)
                .is_some_and(|rest| rest.starts_with('.'))
    })
}

/// `.a.b` → `./a/b`, `..a` → `../a`, `.` → `./`.
fn python_relative_to_path(specifier: &str) -> String {
    let dots = specifier.chars().take_while(|c| *c == '.').count();
    let module = specifier[dots..].replace('.', "/");
    let prefix = if dots <= 1 {
        "./".to_string()
    } else {
        "../".repeat(dots - 1)
    };
    format!("{prefix}{module}")
}

/// Per-scan state shared by every resolution: written once after the
/// extraction pass, read-only afterwards.
#[derive(Debug, Clone)]
pub struct ScanContext {
    pub root: PathBuf,
    pub aliases: AliasTable,
    pub namespaces: NamespaceTable,
    pub types: TypeTable,
    files: HashSet<PathBuf>,
    dirs: HashSet<PathBuf>,
}

impl ScanContext {
    pub fn new(root: PathBuf, aliases: AliasTable, files: &[SourceFile]) -> Self {
        let mut dirs = HashSet::new();
        for file in files {
            for ancestor in file.path.ancestors().skip(1) {
                if !dirs.insert(ancestor.to_path_buf()) || ancestor == root {
                    break;
                }
            }
        }
        Self {
            namespaces: NamespaceTable::build(files),
            types: TypeTable::build(files),
            files: files.iter().map(|file| file.path.clone()).collect(),
            dirs,
            root,
            aliases,
        }
    }

    pub fn file_exists(&self, path: &Path) -> bool {
        self.files.contains(path)
    }

    pub fn dir_exists(&self, path: &Path) -> bool {
        self.dirs.contains(path)
    }
}

pub struct ModuleResolver<'a> {
    ctx: &'a ScanContext,
}

impl<'a> ModuleResolver<'a> {
    pub fn new(ctx: &'a ScanContext) -> Self {
        Self { ctx }
    }

    /// Resolve `dependency` as written in `from`.
    pub fn resolve(&self, dependency: &str, from: &SourceFile) -> Option<PathBuf> {
        let dependency = dependency.trim();
        let family = from.language.family();

        if dependency.is_empty() || self.is_external(dependency, family) {
            trace!("{dependency} from {} is external", from.path.display());
            return None;
        }

        let resolved = match family {
            LanguageFamily::Namespace => self
                .resolve_namespace(dependency, from)
                .or_else(|| self.resolve_path(dependency, from)),
            LanguageFamily::Script => self
                .resolve_alias(dependency, from)
                .or_else(|| self.resolve_path(dependency, from)),
            LanguageFamily::Python => self.resolve_path(dependency, from),
        };

        if resolved.is_none() {
            trace!("Unresolved {dependency} from {}", from.path.display());
        }
        resolved
    }

    fn is_external(&self, dependency: &str, family: LanguageFamily) -> bool {
        if is_url(dependency) || dependency.starts_with("node:") {
            return true;
        }
        match family {
            LanguageFamily::Script => {
                if is_relative(dependency) || self.ctx.aliases.covers(dependency) {
                    return false;
                }
                let head = first_segment(dependency, '/');
                if NODE_BUILTINS.contains(&head) || HOST_MODULES.contains(&head) {
                    return true;
                }
                // scoped packages and bare package names
                dependency.starts_with('@') || !(dependency.contains('/') || dependency.contains('.'))
            }
            LanguageFamily::Python => {
                !dependency.starts_with('.')
                    && PYTHON_STDLIB.contains(&first_segment(dependency, '.'))
            }
            LanguageFamily::Namespace => has_namespace_root(dependency, FRAMEWORK_NAMESPACES),
        }
    }

    fn resolve_namespace(&self, dependency: &str, from: &SourceFile) -> Option<PathBuf> {
        let dependency = dependency.strip_suffix(".*").unwrap_or(dependency);
        let ctx = self.ctx;

        if !dependency.contains('.') {
            return ctx
                .namespaces
                .get(dependency)
                .or_else(|| ctx.types.visible_from(dependency, from))
                .map(Path::to_path_buf);
        }

        if let Some(path) = ctx
            .namespaces
            .get(dependency)
            .or_else(|| ctx.types.qualified(dependency, from.language))
        {
            return Some(path.to_path_buf());
        }

        // `a.b.Type.member` and `a.b.Sub` fall back to the longest known prefix
        let mut prefix = dependency;
        while let Some((head, _)) = prefix.rsplit_once('.') {
            if let Some(path) = ctx
                .types
                .qualified(head, from.language)
                .or_else(|| ctx.namespaces.get(head))
            {
                return Some(path.to_path_buf());
            }
            prefix = head;
        }
        None
    }

    fn resolve_alias(&self, dependency: &str, from: &SourceFile) -> Option<PathBuf> {
        let expanded = self.ctx.aliases.expand(dependency)?;
        self.find_candidate(&expanded, from.language, false)
    }

    /// Steps 4 to 7: relative, same directory, sub-path, project root.
    fn resolve_path(&self, dependency: &str, from: &SourceFile) -> Option<PathBuf> {
        let dir = from.directory();
        let python = from.language.family() == LanguageFamily::Python;

        if python && dependency.starts_with('.') {
            let relative = python_relative_to_path(dependency);
            let package_only = relative.ends_with('/');
            return self.find_candidate(&dir.join(&relative), from.language, package_only);
        }
        if is_relative(dependency) {
            let package_only = dependency.ends_with('/') || dependency == "." || dependency == "..";
            return self.find_candidate(&dir.join(dependency), from.language, package_only);
        }

        let dependency = if python {
            dependency.replace('.', "/")
        } else {
            dependency.to_string()
        };

        let from_dir = self.find_candidate(&dir.join(&dependency), from.language, false);
        if from_dir.is_some() {
            return from_dir;
        }
        self.find_candidate(&self.ctx.root.join(&dependency), from.language, false)
    }

    /// Extensions tried for a path written without one: the declaring
    /// family's first, then the rest (namespace languages only their own).
    fn appended_extensions(language: Language) -> Vec<&'static str> {
        let own: Vec<&'static str> = match language.family() {
            LanguageFamily::Script => SCRIPT_EXTENSIONS.to_vec(),
            LanguageFamily::Python => PYTHON_EXTENSIONS.to_vec(),
            LanguageFamily::Namespace => return language.extensions().collect(),
        };
        let rest: Vec<&'static str> = Language::all_extensions()
            .filter(|ext| !own.contains(ext))
            .collect();
        own.into_iter().chain(rest).collect()
    }

    /// Extensions that may replace a written one (`./b.js` → `b.ts`).
    fn compatible_extensions(language: Language) -> Vec<&'static str> {
        match language.family() {
            LanguageFamily::Script => SCRIPT_EXTENSIONS.to_vec(),
            LanguageFamily::Python => PYTHON_EXTENSIONS.to_vec(),
            LanguageFamily::Namespace => language.extensions().collect(),
        }
    }

    fn find_candidate(&self, candidate: &Path, language: Language, package_only: bool) -> Option<PathBuf> {
        let candidate = normalize_path(candidate);
        let ctx = self.ctx;
        let found = |path: PathBuf| ctx.file_exists(&path).then_some(path);

        if !package_only {
            if Language::from_path(&candidate).is_some() {
                if ctx.file_exists(&candidate) {
                    return Some(candidate);
                }
                let stem = candidate.with_extension("");
                if let Some(hit) = Self::compatible_extensions(language)
                    .into_iter()
                    .find_map(|ext| found(stem.with_extension(ext)))
                {
                    return Some(hit);
                }
            } else {
                let base = candidate.as_os_str().to_string_lossy();
                if let Some(hit) = Self::appended_extensions(language)
                    .into_iter()
                    .find_map(|ext| found(PathBuf::from(format!("{base}.{ext}"))))
                {
                    return Some(hit);
                }
            }
        }

        if ctx.dir_exists(&candidate) {
            let stems: &[&str] = match language.family() {
                LanguageFamily::Python => &["__init__", "index"],
                _ => &["index"],
            };
            let extensions = Self::appended_extensions(language);
            for stem in stems {
                if let Some(hit) = extensions
                    .iter()
                    .find_map(|ext| found(candidate.join(format!("{stem}.{ext}"))))
                {
                    return Some(hit);
                }
            }
        }
        None
    }
}
