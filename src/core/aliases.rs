//! Path aliases from the compiler config (`tsconfig.json` / `jsconfig.json`)
//! and the bundler config (`vite.config.*`).
//!
//! Both are read once per scan. Compiler aliases override bundler aliases
//! with the same token; when neither defines anything, `@` falls back to the
//! anchor directory's `src/` if it exists.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::resolver::normalize_path;
use crate::parsers::common::{balanced_block, mask_comments, CommentStyle};

const COMPILER_CONFIGS: &[&str] = &["tsconfig.json", "jsconfig.json"];

const BUNDLER_CONFIGS: &[&str] = &[
    "vite.config.js",
    "vite.config.ts",
    "vite.config.mjs",
    "vite.config.mts",
];

const SEARCH_SKIP_DIRS: &[&str] = &[
    "node_modules",
    "dist",
    "build",
    "out",
    "coverage",
    "tmp",
    "temp",
];

const DESCENDANT_DEPTH: usize = 5;
const ANCESTOR_DEPTH: usize = 3;

/// Alias token → absolute base directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    entries: BTreeMap<String, PathBuf>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// A trailing `/` on the token (`'@/': './src/'`) is dropped.
    pub fn insert(&mut self, alias: impl Into<String>, base: impl Into<PathBuf>) {
        let mut alias = alias.into();
        while alias.len() > 1 && alias.ends_with('/') {
            alias.pop();
        }
        self.entries.insert(alias, base.into());
    }

    pub fn get(&self, alias: &str) -> Option<&Path> {
        self.entries.get(alias).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.entries
            .iter()
            .map(|(alias, base)| (alias.as_str(), base.as_path()))
    }

    /// Entries of `other` replace entries of `self` with the same token.
    pub fn override_with(&mut self, other: AliasTable) {
        self.entries.extend(other.entries);
    }

    /// The longest alias that equals `specifier` or prefixes it followed by `/`.
    fn matching(&self, specifier: &str) -> Option<(&str, &Path)> {
        self.iter()
            .filter(|(alias, _)| {
                specifier == *alias
                    || specifier
                        .strip_prefix(alias)
                        .is_some_and(|rest| rest.starts_with('/'))
            })
            .max_by_key(|(alias, _)| alias.len())
    }

    pub fn covers(&self, specifier: &str) -> bool {
        self.matching(specifier).is_some()
    }

    /// Expand `specifier` through the best alias. The result still needs probing.
    pub fn expand(&self, specifier: &str) -> Option<PathBuf> {
        let (alias, base) = self.matching(specifier)?;
        let rest = specifier[alias.len()..].trim_start_matches('/');
        if rest.is_empty() {
            Some(base.to_path_buf())
        } else {
            Some(normalize_path(&base.join(rest)))
        }
    }

    /// Load and merge every alias source for `root`.
    pub fn load(root: &Path) -> Self {
        let compiler = load_compiler_aliases(root);

        let (mut table, anchor) = match find_bundler_config(root) {
            Some(config_path) => {
                let anchor = config_path
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| root.to_path_buf());
                if anchor != root {
                    debug!(
                        "Using bundler config {}, re-anchoring aliases to {}",
                        config_path.display(),
                        anchor.display()
                    );
                }
                let table = match std::fs::read_to_string(&config_path) {
                    Ok(content) => parse_bundler_config(&content, &anchor),
                    Err(err) => {
                        warn!("Failed to read {}: {err}", config_path.display());
                        AliasTable::new()
                    }
                };
                (table, anchor)
            }
            None => (AliasTable::new(), root.to_path_buf()),
        };

        table.override_with(compiler);

        if table.is_empty() {
            let src = anchor.join("src");
            if src.is_dir() {
                debug!("No aliases configured, defaulting @ to {}", src.display());
                table.insert("@", src);
            }
        }

        for (alias, base) in table.iter() {
            debug!("Alias {alias} -> {}", base.display());
        }
        table
    }
}

static TRAILING_COMMA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r",(\s*[}\]])").expect("valid trailing comma regex"));

/// Make JSON-with-comments parseable: comments blanked, trailing commas dropped.
pub fn relax_json(content: &str) -> String {
    let masked = mask_comments(content, CommentStyle::CLike);
    TRAILING_COMMA.replace_all(&masked, "$1").into_owned()
}

/// Aliases from the first compiler config present in `root`.
pub fn load_compiler_aliases(root: &Path) -> AliasTable {
    let Some(config_path) = COMPILER_CONFIGS
        .iter()
        .map(|name| root.join(name))
        .find(|path| path.is_file())
    else {
        return AliasTable::new();
    };

    let content = match std::fs::read_to_string(&config_path) {
        Ok(content) => content,
        Err(err) => {
            warn!("Failed to read {}: {err}", config_path.display());
            return AliasTable::new();
        }
    };

    match parse_compiler_config(&content, root) {
        Ok(table) => table,
        Err(err) => {
            warn!("Failed to parse {}: {err}", config_path.display());
            AliasTable::new()
        }
    }
}

/// `compilerOptions.paths` resolved against `compilerOptions.baseUrl`
/// (default `.`). Only the first target of each alias is used and `/*`
/// suffixes are stripped from keys and targets.
pub fn parse_compiler_config(content: &str, config_dir: &Path) -> serde_json::Result<AliasTable> {
    let json: Value = serde_json::from_str(&relax_json(content))?;
    let mut table = AliasTable::new();

    let Some(options) = json.get("compilerOptions") else {
        return Ok(table);
    };
    let base_url = options
        .get("baseUrl")
        .and_then(Value::as_str)
        .unwrap_or(".");
    let base = config_dir.join(base_url);

    let Some(paths) = options.get("paths").and_then(Value::as_object) else {
        return Ok(table);
    };
    for (key, targets) in paths {
        let alias = key.strip_suffix("/*").unwrap_or(key);
        if alias.is_empty() || alias.contains('*') {
            continue;
        }
        let Some(target) = targets
            .as_array()
            .and_then(|targets| targets.first())
            .and_then(Value::as_str)
        else {
            continue;
        };
        let target = target.strip_suffix("/*").unwrap_or(target);
        let target = target.strip_suffix('*').unwrap_or(target);
        table.insert(alias, normalize_path(&base.join(target)));
    }
    Ok(table)
}

const ALIAS_VALUE: &str = r#"(?:(?:path\s*\.\s*)?(?:resolve|join)\s*\(\s*__dirname\s*,\s*['"]([^'"\n]+)['"]\s*\)|fileURLToPath\s*\(\s*new\s+URL\s*\(\s*['"]([^'"\n]+)['"]\s*,\s*import\.meta\.url\s*\)\s*\)|['"]([^'"\n]+)['"])"#;

static RESOLVE_ALIAS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"resolve\s*:\s*\{[^{}]*?\balias\s*:\s*([\[{])").expect("valid resolve.alias regex")
});

static OBJECT_ENTRY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r#"(?:'([^'\n]+)'|"([^"\n]+)"|([A-Za-z_$][\w$]*))\s*:\s*{ALIAS_VALUE}"#
    ))
    .expect("valid alias entry regex")
});

static ARRAY_ENTRY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r#"\bfind\s*:\s*['"]([^'"\n]+)['"]\s*,\s*replacement\s*:\s*{ALIAS_VALUE}"#
    ))
    .expect("valid alias array regex")
});

fn alias_target(config_dir: &Path, raw: &str) -> PathBuf {
    normalize_path(&config_dir.join(raw))
}

/// Lexical read of `resolve.alias` from a Vite config. Both the object form
/// and the `[{ find, replacement }]` array form are understood.
pub fn parse_bundler_config(content: &str, config_dir: &Path) -> AliasTable {
    let code = mask_comments(content, CommentStyle::CLike);
    let mut table = AliasTable::new();

    let Some(open) = RESOLVE_ALIAS.captures(&code).and_then(|caps| caps.get(1)) else {
        return table;
    };
    let block = &code[balanced_block(&code, open.start())];

    let (regex, first_value) = if block.starts_with('[') {
        (&*ARRAY_ENTRY, 2)
    } else {
        (&*OBJECT_ENTRY, 4)
    };

    for caps in regex.captures_iter(block) {
        let key = (1..first_value).find_map(|idx| caps.get(idx));
        let value = (first_value..first_value + 3).find_map(|idx| caps.get(idx));
        if let (Some(key), Some(value)) = (key, value) {
            table.insert(key.as_str(), alias_target(config_dir, value.as_str()));
        }
    }
    table
}

fn is_skipped_dir(name: &str) -> bool {
    name.starts_with('.') || SEARCH_SKIP_DIRS.contains(&name)
}

fn bundler_config_in(dir: &Path) -> Option<PathBuf> {
    BUNDLER_CONFIGS
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

fn search_down(dir: &Path, depth: usize, visited: &mut HashSet<PathBuf>) -> Option<PathBuf> {
    if depth == 0 || !visited.insert(dir.to_path_buf()) {
        return None;
    }
    if let Some(found) = bundler_config_in(dir) {
        return Some(found);
    }

    let mut children: Vec<PathBuf> = match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_ok_and(|t| t.is_dir()))
            .filter(|entry| !is_skipped_dir(&entry.file_name().to_string_lossy()))
            .map(|entry| entry.path())
            .collect(),
        Err(err) => {
            debug!("Cannot read {}: {err}", dir.display());
            return None;
        }
    };
    children.sort();

    children
        .iter()
        .find_map(|child| search_down(child, depth - 1, visited))
}

/// The root's own bundler config, else the first one found below it, else
/// one found near an ancestor. The upward walk never leaves a repository root
/// or a directory holding both `package.json` and `node_modules`.
pub fn find_bundler_config(root: &Path) -> Option<PathBuf> {
    if let Some(found) = bundler_config_in(root) {
        return Some(found);
    }

    let mut visited = HashSet::new();
    if let Some(found) = search_down(root, DESCENDANT_DEPTH, &mut visited) {
        return Some(found);
    }

    let mut current = root;
    while !is_project_boundary(current) {
        let parent = current.parent()?;
        if let Some(found) = search_down(parent, ANCESTOR_DEPTH, &mut visited) {
            return Some(found);
        }
        current = parent;
    }
    None
}

/// A repository root, or an installed package root.
fn is_project_boundary(dir: &Path) -> bool {
    dir.join(".git").exists() || (dir.join("package.json").exists() && dir.join("node_modules").exists())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn compiler_paths_strip_wildcards_and_use_base_url() {
        let config = r#"{
            // comment
            "compilerOptions": {
                "baseUrl": "./",
                "paths": {
                    "@/*": ["src/*", "other/*"],
                    "@components/*": ["src/ui/components/*"],
                    "~lib": ["lib/index.ts"],
                },
            },
        }"#;
        let table = parse_compiler_config(config, Path::new("/proj")).unwrap();
        assert_eq!(table.get("@"), Some(Path::new("/proj/src")));
        assert_eq!(table.get("@components"), Some(Path::new("/proj/src/ui/components")));
        assert_eq!(table.get("~lib"), Some(Path::new("/proj/lib/index.ts")));
    }

    #[test]
    fn urls_in_json_strings_survive_comment_stripping() {
        let config = r#"{ "$schema": "https://json.schemastore.org/tsconfig", "compilerOptions": { "paths": { "x/*": ["y/*"] } } }"#;
        let table = parse_compiler_config(config, Path::new("/p")).unwrap();
        assert_eq!(table.get("x"), Some(Path::new("/p/y")));
    }

    #[test]
    fn bundler_object_form() {
        let config = r#"
import { fileURLToPath, URL } from 'node:url'
export default defineConfig({
  plugins: [vue()],
  resolve: {
    alias: {
      '@': fileURLToPath(new URL('./src', import.meta.url)),
      "@assets": path.resolve(__dirname, 'src/assets'),
      shared: '../shared',
      // '@old': './legacy',
    },
  },
})
"#;
        let table = parse_bundler_config(config, Path::new("/app/web"));
        assert_eq!(table.len(), 3);
        assert_eq!(table.get("@"), Some(Path::new("/app/web/src")));
        assert_eq!(table.get("@assets"), Some(Path::new("/app/web/src/assets")));
        assert_eq!(table.get("shared"), Some(Path::new("/app/shared")));
    }

    #[test]
    fn bundler_array_form() {
        let config = "export default { resolve: { alias: [ { find: '@', replacement: path.resolve(__dirname, 'src') } ] } }";
        let table = parse_bundler_config(config, Path::new("/w"));
        assert_eq!(table.get("@"), Some(Path::new("/w/src")));
    }

    #[test]
    fn trailing_slash_keys_match_like_bare_ones() {
        let table = parse_bundler_config(
            "export default { resolve: { alias: { '@/': './src/', '~c/': './src/components' } } }",
            Path::new("/w"),
        );
        assert_eq!(table.get("@"), Some(Path::new("/w/src")));
        assert_eq!(table.expand("@/x"), Some(PathBuf::from("/w/src/x")));
        assert_eq!(table.expand("~c/Nav"), Some(PathBuf::from("/w/src/components/Nav")));
    }

    #[test]
    fn longest_alias_prefix_wins() {
        let mut table = AliasTable::new();
        table.insert("@", "/root/src");
        table.insert("@/components", "/root/special");

        assert_eq!(
            table.expand("@/components/Foo"),
            Some(PathBuf::from("/root/special/Foo"))
        );
        assert_eq!(table.expand("@/utils/x"), Some(PathBuf::from("/root/src/utils/x")));
        assert_eq!(table.expand("@"), Some(PathBuf::from("/root/src")));
        assert!(!table.covers("@scope/pkg"));
    }

    #[test]
    fn compiler_aliases_override_bundler_and_default_applies_when_empty() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src")).unwrap();
        fs::create_dir_all(root.join(".git")).unwrap();

        let table = AliasTable::load(root);
        assert_eq!(table.get("@"), Some(root.join("src").as_path()));

        fs::write(
            root.join("vite.config.ts"),
            "export default { resolve: { alias: { '@': './app', '#': './hash' } } }",
        )
        .unwrap();
        fs::write(
            root.join("tsconfig.json"),
            r#"{ "compilerOptions": { "paths": { "@/*": ["./client/*"] } } }"#,
        )
        .unwrap();

        let table = AliasTable::load(root);
        assert_eq!(table.get("@"), Some(root.join("client").as_path()));
        assert_eq!(table.get("#"), Some(root.join("hash").as_path()));
    }

    #[test]
    fn bundler_config_in_a_subdirectory_re_anchors_the_default() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        let web = root.join("packages").join("web");
        fs::create_dir_all(web.join("src")).unwrap();
        fs::write(web.join("vite.config.js"), "export default {}").unwrap();

        assert_eq!(find_bundler_config(root), Some(web.join("vite.config.js")));
        let table = AliasTable::load(root);
        assert_eq!(table.get("@"), Some(web.join("src").as_path()));
    }

    #[test]
    fn malformed_compiler_config_yields_empty_table() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("tsconfig.json"), "{ not json").unwrap();
        assert!(load_compiler_aliases(dir.path()).is_empty());
    }
}
