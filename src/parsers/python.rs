use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

use super::common::{dedupe, mask_comments, CommentStyle, LineIndex};
use super::{AnalysisResult, ImportKind, ImportRecord, Language, LanguageParser};

// Statements start a line or follow a `;` on the same line.
static IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)(?:^|;)[ \t]*import[ \t]+([^\n;]+)").expect("valid import regex")
});

static FROM_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)(?:^|;)[ \t]*from[ \t]+([\w.]+)[ \t]+import\b")
        .expect("valid from-import regex")
});

static DEF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^([ \t]*)(?:async[ \t]+)?def[ \t]+(\w+)[ \t]*\(").expect("valid def regex")
});

static CLASS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^([ \t]*)class[ \t]+(\w+)[ \t]*[(:]").expect("valid class regex")
});

static ASSIGNMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^([A-Za-z_]\w*)[ \t]*(?::[^=\n]+)?=[^=]").expect("valid assignment regex")
});

static DUNDER_ALL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^__all__[ \t]*(?::[^=\n]+)?=[ \t]*[\[(]([^\])]*)[\])]")
        .expect("valid __all__ regex")
});

const KEYWORDS: &[&str] = &[
    "def", "class", "import", "from", "if", "elif", "else", "for", "while", "try", "except",
    "finally", "with", "return", "lambda", "global", "nonlocal", "pass", "raise", "yield",
];

pub struct PythonParser;

impl PythonParser {
    fn extract_imports(code: &str, lines: &LineIndex, result: &mut AnalysisResult) {
        let mut found: Vec<(usize, ImportRecord)> = Vec::new();

        for caps in IMPORT.captures_iter(code) {
            let (Some(whole), Some(list)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let line = lines.line_of(whole.start());
            // `import a, b as c` declares one dependency per module
            for (idx, item) in list.as_str().split(',').enumerate() {
                let module = item.split_whitespace().next().unwrap_or_default();
                let module = module.trim_matches(|c| c == '(' || c == ')' || c == '\\');
                if module.is_empty() {
                    continue;
                }
                found.push((
                    whole.start() + idx,
                    ImportRecord::new(module, ImportKind::Import, line, module.starts_with('.')),
                ));
            }
        }

        for caps in FROM_IMPORT.captures_iter(code) {
            let (Some(whole), Some(module)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let module = module.as_str();
            found.push((
                whole.start(),
                ImportRecord::new(
                    module,
                    ImportKind::Import,
                    lines.line_of(whole.start()),
                    module.starts_with('.'),
                ),
            ));
        }

        found.sort_by_key(|(offset, _)| *offset);
        for (_, record) in found {
            result.push_import(record);
        }
    }

    /// Returns the names defined at module level, in order of appearance.
    fn extract_declarations(code: &str, result: &mut AnalysisResult) -> Vec<String> {
        let mut top_level: Vec<(usize, String)> = Vec::new();

        for caps in DEF.captures_iter(code) {
            let name = caps[2].to_string();
            if caps[1].is_empty() {
                top_level.push((caps.get(0).map_or(0, |m| m.start()), name.clone()));
            }
            result.functions.push(name);
        }

        for caps in CLASS.captures_iter(code) {
            let name = caps[2].to_string();
            if caps[1].is_empty() {
                top_level.push((caps.get(0).map_or(0, |m| m.start()), name.clone()));
            }
            result.classes.push(name);
        }

        for caps in ASSIGNMENT.captures_iter(code) {
            let name = &caps[1];
            if KEYWORDS.contains(&name)
                || result.functions.iter().any(|f| f == name)
                || result.classes.iter().any(|c| c == name)
            {
                continue;
            }
            top_level.push((caps.get(0).map_or(0, |m| m.start()), name.to_string()));
            result.variables.push(name.to_string());
        }

        top_level.sort_by_key(|(offset, _)| *offset);
        top_level.into_iter().map(|(_, name)| name).collect()
    }

    fn extract_exports(code: &str, top_level: Vec<String>, result: &mut AnalysisResult) {
        if let Some(caps) = DUNDER_ALL.captures(code) {
            result.exports.extend(
                caps[1]
                    .split(',')
                    .map(|item| item.trim().trim_matches(|c| c == '"' || c == '\'').trim())
                    .filter(|item| !item.is_empty())
                    .map(str::to_string),
            );
            return;
        }

        result
            .exports
            .extend(top_level.into_iter().filter(|name| !name.starts_with('_')));
    }
}

impl LanguageParser for PythonParser {
    fn analyze(&self, content: &str, _file_path: &Path) -> AnalysisResult {
        let code = mask_comments(content, CommentStyle::Hash);
        let lines = LineIndex::new(content);
        let mut result = AnalysisResult::default();

        Self::extract_imports(&code, &lines, &mut result);
        let top_level = Self::extract_declarations(&code, &mut result);
        Self::extract_exports(&code, top_level, &mut result);

        dedupe(&mut result.exports);
        dedupe(&mut result.functions);
        dedupe(&mut result.classes);
        dedupe(&mut result.variables);
        result
    }

    fn language(&self) -> Language {
        Language::Python
    }
}
