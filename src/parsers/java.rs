use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

use super::common::{dedupe, mask_comments, mask_comments_and_strings, CommentStyle, LineIndex};
use super::type_refs::{blank_matches, mine_type_references, JAVA_BUILTINS};
use super::{AnalysisResult, ImportKind, ImportRecord, Language, LanguageParser};

static IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*import[ \t]+(?:static[ \t]+)?([\w.]+(?:\.\*)?)[ \t]*;")
        .expect("valid import regex")
});

static PACKAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*package[ \t]+([\w.]+)[ \t]*;").expect("valid package regex")
});

static TYPE_DECL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)^[ \t]*(?:@\w+(?:\([^)\n]*\))?[ \t]+)*((?:(?:public|private|protected|static|final|abstract|sealed|non-sealed|strictfp)[ \t]+)*)(class|interface|enum|record|@interface)[ \t]+(\w+)",
    )
    .expect("valid type declaration regex")
});

static METHOD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)^[ \t]*((?:(?:public|private|protected|static|final|abstract|synchronized|native|default)[ \t]+)+)(?:<[^>\n]+>[ \t]+)?([\w<>\[\],.?]+)[ \t]+(\w+)[ \t]*\(",
    )
    .expect("valid method regex")
});

static FIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)^[ \t]*((?:(?:public|private|protected|static|final|transient|volatile)[ \t]+)+)([\w<>\[\],.?]+)[ \t]+(\w+)[ \t]*[=;]",
    )
    .expect("valid field regex")
});

static DIRECTIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:import|package)[ \t]+[^;\n]*;").expect("valid directive regex")
});

const DECLARATION_KEYWORDS: &[&str] = &["class", "interface", "enum", "record", "@interface", "return", "new"];

pub struct JavaParser;

impl JavaParser {
    fn extract_imports(code: &str, lines: &LineIndex, result: &mut AnalysisResult) {
        for caps in IMPORT.captures_iter(code) {
            let (Some(whole), Some(target)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            result.push_import(ImportRecord::new(
                target.as_str(),
                ImportKind::Import,
                lines.line_of(whole.start()),
                false,
            ));
        }
    }

    fn extract_types(code: &str, result: &mut AnalysisResult) {
        for caps in TYPE_DECL.captures_iter(code) {
            let name = caps[3].to_string();
            if caps[1].contains("public") {
                result.exports.push(name.clone());
            }
            result.classes.push(name);
        }
    }

    fn extract_members(code: &str, result: &mut AnalysisResult) {
        let is_member = |caps: &regex::Captures<'_>| !DECLARATION_KEYWORDS.contains(&&caps[2]);

        for caps in METHOD.captures_iter(code).filter(is_member) {
            result.functions.push(caps[3].to_string());
        }
        for caps in FIELD.captures_iter(code).filter(is_member) {
            result.variables.push(caps[3].to_string());
        }
    }
}

impl LanguageParser for JavaParser {
    fn analyze(&self, content: &str, _file_path: &Path) -> AnalysisResult {
        let code = mask_comments(content, CommentStyle::CLike);
        let lines = LineIndex::new(content);
        let mut result = AnalysisResult::default();

        Self::extract_imports(&code, &lines, &mut result);
        result.namespace = PACKAGE.captures(&code).map(|caps| caps[1].to_string());
        Self::extract_types(&code, &mut result);
        Self::extract_members(&code, &mut result);

        let bare = blank_matches(
            &mask_comments_and_strings(content, CommentStyle::CLike),
            &DIRECTIVE,
        );
        let declared = result.classes.clone();
        for record in mine_type_references(&bare, &lines, JAVA_BUILTINS, &declared) {
            result.push_import(record);
        }

        dedupe(&mut result.exports);
        dedupe(&mut result.functions);
        dedupe(&mut result.classes);
        dedupe(&mut result.variables);
        result
    }

    fn language(&self) -> Language {
        Language::Java
    }
}
