use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::path::Path;

use super::common::{
    balanced_block, dedupe, mask_comments, mask_comments_and_strings, CommentStyle,
};
use super::ecmascript::{analyze_script, ScriptDialect};
use super::{AnalysisResult, Language, LanguageParser};

static SCRIPT_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<script\b([^>]*)>(.*?)</script\s*>").expect("valid script block regex")
});

static TS_LANG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\blang\s*=\s*["']tsx?["']"#).expect("valid lang attribute regex")
});

static COMPONENT_OPEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:\bexport\s+default\s*(?:defineComponent\s*\(\s*)?|\bdefineComponent\s*\(\s*|\bdefineOptions\s*\(\s*)\{",
    )
    .expect("valid component options regex")
});

static NAME_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\bname\s*:\s*["']([^"'\n]+)["']"#).expect("valid component name regex")
});

/// Single-file components. Only the `<script>` blocks are analyzed; everything
/// else is blanked so offsets, and with them line numbers, stay file-relative.
pub struct VueParser;

impl VueParser {
    fn dialect(typed: bool) -> ScriptDialect {
        ScriptDialect {
            typed,
            commonjs: false,
            references: false,
            skip_urls: true,
        }
    }

    /// Returns the script-only view of `content` and whether any block is TypeScript.
    fn script_view(content: &str) -> Option<(String, bool)> {
        let mut keep = vec![false; content.len()];
        let mut typed = false;
        let mut any = false;

        for caps in SCRIPT_BLOCK.captures_iter(content) {
            let Some(body) = caps.get(2) else { continue };
            any = true;
            typed |= TS_LANG.is_match(&caps[1]);
            keep[body.range()].iter_mut().for_each(|k| *k = true);
        }
        if !any {
            return None;
        }

        let view: Vec<u8> = content
            .bytes()
            .zip(keep)
            .map(|(b, kept)| if kept || b == b'\n' { b } else { b' ' })
            .collect();
        let view = String::from_utf8(view).unwrap_or_else(|_| content.to_string());
        Some((view, typed))
    }
}

impl VueParser {
    /// `name` declared at the top level of the component options object.
    fn component_name(view: &str) -> Option<String> {
        let code = mask_comments(view, CommentStyle::CLike);
        // braces inside string literals must not move the nesting depth
        let shape = mask_comments_and_strings(view, CommentStyle::CLike);

        for open in COMPONENT_OPEN.find_iter(&shape) {
            let block = balanced_block(&shape, open.end() - 1);
            let options = &code[block.clone()];
            for caps in NAME_KEY.captures_iter(options) {
                let Some(key) = caps.get(0) else { continue };
                let at = block.start + key.start();
                if !shape[at..].starts_with("name") {
                    continue;
                }
                let before = &shape[block.start..at];
                let depth = before
                    .matches('{')
                    .count()
                    .saturating_sub(before.matches('}').count());
                if depth == 1 {
                    return Some(caps[1].to_string());
                }
            }
        }
        None
    }
}

impl LanguageParser for VueParser {
    fn analyze(&self, content: &str, _file_path: &Path) -> AnalysisResult {
        let Some((view, typed)) = Self::script_view(content) else {
            return AnalysisResult::default();
        };
        let mut result = analyze_script(&view, Self::dialect(typed));

        if let Some(name) = Self::component_name(&view) {
            result.exports.push(name);
        }

        let mut seen = HashSet::new();
        result.imports.retain(|record| seen.insert(record.target.clone()));
        result.dependencies = result.imports.iter().map(|r| r.target.clone()).collect();
        dedupe(&mut result.exports);
        dedupe(&mut result.functions);
        dedupe(&mut result.classes);
        dedupe(&mut result.variables);
        result
    }

    fn language(&self) -> Language {
        Language::Vue
    }
}
