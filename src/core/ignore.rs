use regex::Regex;
use std::path::Path;
use tracing::{debug, warn};

/// Directory names that are never scanned, as whole path segments.
const BUILTIN_SEGMENTS: &[&str] = &["node_modules", ".git", ".vscode", "out", "dist", "build"];

/// Generated artifacts that are never analyzed.
const BUILTIN_SUFFIXES: &[&str] = &[r"\.vsix$", r"\.map$", r"\.min\.js$", r"\.d\.ts$"];

/// `.gitignore`-style exclusion rules compiled to regexes.
///
/// Each rule is tested against the root-relative path (always `/`-separated)
/// and, unless anchored with a leading `/`, against the bare file name; a hit
/// on either excludes the entry.
#[derive(Debug, Clone)]
pub struct IgnoreRules {
    patterns: Vec<Rule>,
}

#[derive(Debug, Clone)]
struct Rule {
    regex: Regex,
    /// Root-anchored rules never match on the bare file name.
    anchored: bool,
}

impl Rule {
    fn new(regex: Regex) -> Self {
        let anchored = regex.as_str().starts_with('^');
        Self { regex, anchored }
    }
}

impl IgnoreRules {
    /// Only the built-in rules.
    pub fn builtin() -> Self {
        let mut patterns = Vec::new();
        for segment in BUILTIN_SEGMENTS {
            let source = format!("(^|/){}(/|$)", regex::escape(segment));
            patterns.extend(Regex::new(&source).ok().map(Rule::new));
        }
        for suffix in BUILTIN_SUFFIXES {
            patterns.extend(Regex::new(suffix).ok().map(Rule::new));
        }
        Self { patterns }
    }

    /// Built-ins plus the given gitignore-style lines.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut rules = Self::builtin();
        for line in lines {
            rules.add_line(line.as_ref());
        }
        rules
    }

    /// Reads `<root>/.gitignore` when present and appends `extra` patterns.
    /// An unreadable ignore file leaves only the built-ins and `extra`.
    pub fn load(root: &Path, extra: &[String]) -> Self {
        let gitignore = root.join(".gitignore");
        let mut rules = Self::builtin();

        if gitignore.is_file() {
            match std::fs::read_to_string(&gitignore) {
                Ok(content) => content.lines().for_each(|line| rules.add_line(line)),
                Err(err) => warn!("Failed to read {}: {err}", gitignore.display()),
            }
        }
        for line in extra {
            rules.add_line(line);
        }

        debug!("Loaded {} ignore rules", rules.patterns.len());
        rules
    }

    fn add_line(&mut self, line: &str) {
        let Some(source) = translate(line) else {
            return;
        };
        match Regex::new(&source) {
            Ok(regex) => self.patterns.push(Rule::new(regex)),
            Err(err) => warn!("Skipping invalid ignore pattern {:?}: {err}", line.trim()),
        }
    }

    /// `relative` uses `/` separators. Directories are also tested with a
    /// trailing `/` so that `build/` style rules prune them.
    pub fn is_ignored(&self, relative: &str, name: &str, is_dir: bool) -> bool {
        let dir_form = is_dir.then(|| format!("{relative}/"));
        self.patterns.iter().any(|rule| {
            rule.regex.is_match(relative)
                || (!rule.anchored && rule.regex.is_match(name))
                || dir_form.as_deref().is_some_and(|dir| rule.regex.is_match(dir))
        })
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl Default for IgnoreRules {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Gitignore line → regex source. `None` for blanks, comments and negations.
///
/// Patterns match whole path segments. A leading or inner `/` anchors the
/// pattern at the root; otherwise it may start at any segment. `*` and `?`
/// stay within one segment, `**` crosses them.
pub fn translate(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
        return None;
    }

    let (rooted, body) = match line.strip_prefix('/') {
        Some(rest) => (true, rest),
        None => (false, line),
    };
    let body = body.trim_end_matches('/');
    // `**/name` is the same as a bare `name`
    let (floating, body) = match body.strip_prefix("**/") {
        Some(rest) => (true, rest),
        None => (!rooted && !body.contains('/'), body),
    };
    if body.is_empty() {
        return None;
    }

    let mut source = String::with_capacity(body.len() + 16);
    source.push_str(if floating { "(^|/)" } else { "^" });

    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' if chars.peek() == Some(&'*') => {
                chars.next();
                source.push_str(".*");
            }
            '*' => source.push_str("[^/]*"),
            '?' => source.push_str("[^/]"),
            '.' | '+' | '(' | ')' | '|' | '^' | '$' | '{' | '}' | '\\' => {
                source.push('\\');
                source.push(c);
            }
            _ => source.push(c),
        }
    }
    source.push_str("(/|$)");
    Some(source)
}
