use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

use super::common::{dedupe, mask_comments, mask_comments_and_strings, CommentStyle, LineIndex};
use super::type_refs::{blank_matches, mine_type_references, CSHARP_BUILTINS};
use super::{AnalysisResult, ImportKind, ImportRecord, Language, LanguageParser};

static USING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:global[ \t]+)?using[ \t]+(?:static[ \t]+)?([\w.]+)[ \t]*;")
        .expect("valid using regex")
});

static USING_ALIAS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)^[ \t]*(?:global[ \t]+)?using[ \t]+\w+[ \t]*=[ \t]*([\w.]+)(?:<[^>\n]*>)?[ \t]*;",
    )
    .expect("valid using alias regex")
});

static FILE_SCOPED_NAMESPACE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*namespace[ \t]+([\w.]+)[ \t]*;").expect("valid namespace regex")
});

static BLOCK_NAMESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bnamespace\s+([\w.]+)\s*\{").expect("valid namespace regex"));

static TYPE_DECL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)^[ \t]*(?:\[[^\]\n]*\][ \t]*)*((?:(?:public|internal|private|protected|static|abstract|sealed|partial|readonly|unsafe|new|file|ref)[ \t]+)*)(class|interface|struct|enum|record(?:[ \t]+(?:class|struct))?)[ \t]+(\w+)",
    )
    .expect("valid type declaration regex")
});

static DELEGATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)^[ \t]*((?:(?:public|internal|private|protected|unsafe|new)[ \t]+)*)delegate[ \t]+[\w<>\[\],.?]+[ \t]+(\w+)[ \t]*(?:<[^>\n]*>)?[ \t]*\(",
    )
    .expect("valid delegate regex")
});

static METHOD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)^[ \t]*((?:(?:public|internal|private|protected|static|virtual|override|abstract|async|sealed|extern|new|partial|unsafe)[ \t]+)+)([\w<>\[\],.?]+)[ \t]+(\w+)[ \t]*(?:<[^>\n]*>)?[ \t]*\(",
    )
    .expect("valid method regex")
});

static PROPERTY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)^[ \t]*((?:(?:public|internal|private|protected|static|virtual|override|abstract|required|new)[ \t]+)+)([\w<>\[\],.?]+)[ \t]+(\w+)[ \t]*\{",
    )
    .expect("valid property regex")
});

static FIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)^[ \t]*((?:(?:public|internal|private|protected|static|readonly|const|volatile|new)[ \t]+)+)([\w<>\[\],.?]+)[ \t]+(\w+)[ \t]*[=;]",
    )
    .expect("valid field regex")
});

static DIRECTIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:global[ \t]+)?using[ \t]+[^;(\n]*;|\bnamespace\s+[\w.]+")
        .expect("valid directive regex")
});

/// Words that land in the "type" slot of the member patterns but start a
/// type declaration instead.
const DECLARATION_KEYWORDS: &[&str] = &[
    "class", "interface", "struct", "enum", "record", "delegate", "event", "namespace", "return",
];

pub struct CSharpParser;

impl CSharpParser {
    fn extract_usings(code: &str, lines: &LineIndex, result: &mut AnalysisResult) {
        let mut found: Vec<(usize, ImportRecord)> = Vec::new();
        for regex in [&*USING, &*USING_ALIAS] {
            for caps in regex.captures_iter(code) {
                let (Some(whole), Some(target)) = (caps.get(0), caps.get(1)) else {
                    continue;
                };
                found.push((
                    whole.start(),
                    ImportRecord::new(
                        target.as_str(),
                        ImportKind::NamespaceUse,
                        lines.line_of(whole.start()),
                        false,
                    ),
                ));
            }
        }
        found.sort_by_key(|(offset, _)| *offset);
        for (_, record) in found {
            result.push_import(record);
        }
    }

    fn extract_namespace(code: &str) -> Option<String> {
        FILE_SCOPED_NAMESPACE
            .captures(code)
            .or_else(|| BLOCK_NAMESPACE.captures(code))
            .map(|caps| caps[1].to_string())
    }

    fn extract_types(code: &str, result: &mut AnalysisResult) {
        let mut exported: Vec<(usize, String)> = Vec::new();

        for caps in TYPE_DECL.captures_iter(code) {
            let name = caps[3].to_string();
            if caps[1].contains("public") {
                exported.push((caps.get(0).map_or(0, |m| m.start()), name.clone()));
            }
            result.classes.push(name);
        }

        for caps in DELEGATE.captures_iter(code) {
            if caps[1].contains("public") {
                exported.push((caps.get(0).map_or(0, |m| m.start()), caps[2].to_string()));
            }
        }

        exported.sort_by_key(|(offset, _)| *offset);
        result.exports.extend(exported.into_iter().map(|(_, name)| name));
    }

    fn extract_members(code: &str, result: &mut AnalysisResult) {
        let is_member = |caps: &regex::Captures<'_>| !DECLARATION_KEYWORDS.contains(&&caps[2]);

        for caps in METHOD.captures_iter(code).filter(is_member) {
            result.functions.push(caps[3].to_string());
        }
        for caps in PROPERTY.captures_iter(code).filter(is_member) {
            result.variables.push(caps[3].to_string());
        }
        for caps in FIELD.captures_iter(code).filter(is_member) {
            result.variables.push(caps[3].to_string());
        }
    }
}

impl LanguageParser for CSharpParser {
    fn analyze(&self, content: &str, _file_path: &Path) -> AnalysisResult {
        let code = mask_comments(content, CommentStyle::CLike);
        let lines = LineIndex::new(content);
        let mut result = AnalysisResult::default();

        Self::extract_usings(&code, &lines, &mut result);
        result.namespace = Self::extract_namespace(&code);
        Self::extract_types(&code, &mut result);
        Self::extract_members(&code, &mut result);

        let mut declared = result.classes.clone();
        declared.extend(
            DELEGATE
                .captures_iter(&code)
                .map(|caps| caps[2].to_string()),
        );
        let bare = blank_matches(
            &mask_comments_and_strings(content, CommentStyle::CLike),
            &DIRECTIVE,
        );
        for record in mine_type_references(&bare, &lines, CSHARP_BUILTINS, &declared) {
            result.push_import(record);
        }

        dedupe(&mut result.exports);
        dedupe(&mut result.functions);
        dedupe(&mut result.classes);
        dedupe(&mut result.variables);
        result
    }

    fn language(&self) -> Language {
        Language::CSharp
    }
}
