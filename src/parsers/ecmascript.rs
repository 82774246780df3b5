use once_cell::sync::Lazy;
use regex::Regex;

use super::common::{
    dedupe, is_identifier, mask_comments, mask_comments_and_strings, split_export_list,
    CommentStyle, LineIndex,
};
use super::{AnalysisResult, ImportKind, ImportRecord};

/// Knobs separating the TypeScript, JavaScript and Vue flavours of the
/// ES-module rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptDialect {
    /// `interface` / `type` / `enum` / `namespace` declarations count as exports.
    pub typed: bool,
    /// `module.exports` / `exports.x` idioms count as exports.
    pub commonjs: bool,
    /// `/// <reference path="..." />` directives are recorded as includes.
    pub references: bool,
    /// Drop `http…` and protocol-relative specifiers.
    pub skip_urls: bool,
}

static ES_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"\bimport\s+(?:type\s+)?(?:(?:\{[^}]*\}|\*\s*as\s+[\w$]+|[\w$]+)(?:\s*,\s*(?:\{[^}]*\}|\*\s*as\s+[\w$]+|[\w$]+))*\s*from\s*)?["']([^"'\n]+)["']"#,
    )
    .expect("valid import regex")
});

static REEXPORT_FROM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"\bexport\s+(?:type\s+)?(?:\*(?:\s*as\s+[\w$]+)?|\{[^}]*\})\s*from\s*["']([^"'\n]+)["']"#,
    )
    .expect("valid re-export regex")
});

static DYNAMIC_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\bimport\s*\(\s*["'`]([^"'`\n]+)["'`]\s*\)"#).expect("valid dynamic import regex")
});

static REQUIRE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\brequire\s*\(\s*["'`]([^"'`\n]+)["'`]\s*\)"#).expect("valid require regex")
});

static REFERENCE_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^[ \t]*///\s*<reference\s+path\s*=\s*["']([^"'\n]+)["']"#)
        .expect("valid reference regex")
});

static EXPORT_DECL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\bexport\s+(?:declare\s+)?(?:abstract\s+)?(?:async\s+)?(function\*?|class|const|let|var|interface|type|enum|namespace)\s+([\w$]+)",
    )
    .expect("valid export declaration regex")
});

static EXPORT_DEFAULT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\bexport\s+default\b\s*(?:(?:abstract\s+)?(?:async\s+)?(?:function\b\*?\s*([\w$]*)|class\b\s*([\w$]*))|([\w$]+)(\s*\()?)?",
    )
    .expect("valid default export regex")
});

static EXPORT_LIST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bexport\s*(?:type\s*)?\{([^}]*)\}").expect("valid export list regex")
});

static CJS_MODULE_IDENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bmodule\.exports\s*=\s*([\w$]+)").expect("valid module.exports regex")
});

static CJS_MODULE_OBJECT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bmodule\.exports\s*=\s*\{([^}]*)\}").expect("valid module.exports object regex")
});

static CJS_NAMED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:module\.)?exports\.([\w$]+)\s*=[^=]").expect("valid exports.x regex")
});

static FUNCTION_DECL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bfunction\b\*?\s*([\w$]+)").expect("valid function regex")
});

static FUNCTION_BINDING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(?:const|let|var)\s+([\w$]+)\s*(?::[^=\n]+)?=\s*(?:async\s+)?(?:function\b|(?:<[^>\n]*>\s*)?\([^)]*\)\s*(?::[^=\n]+?)?\s*=>|[\w$]+\s*=>)",
    )
    .expect("valid function binding regex")
});

static CLASS_DECL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bclass\s+([\w$]+)").expect("valid class regex"));

static TOP_LEVEL_BINDING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^(?:export\s+)?(?:declare\s+)?(?:const|let|var)\s+([\w$]+)")
        .expect("valid binding regex")
});

const ANONYMOUS_DEFAULT: &[&str] = &["extends", "implements", "new", "await", "async"];

pub fn is_relative_specifier(specifier: &str) -> bool {
    specifier.starts_with("./") || specifier.starts_with("../")
}

fn is_url(specifier: &str) -> bool {
    specifier.starts_with("http") || specifier.starts_with("//")
}

/// A `.` right before the keyword means a member call such as `loader.require(...)`.
fn is_member_access(text: &str, start: usize) -> bool {
    text[..start].trim_end().ends_with('.')
}

/// Run the ES-module extraction over `content`. Offsets are kept, so callers
/// may pass text with non-script regions blanked out and still get line
/// numbers relative to the whole file.
pub fn analyze_script(content: &str, dialect: ScriptDialect) -> AnalysisResult {
    let code = mask_comments(content, CommentStyle::CLike);
    let lines = LineIndex::new(content);
    let mut result = AnalysisResult::default();

    collect_imports(content, &code, &lines, dialect, &mut result);
    collect_exports(&code, dialect, &mut result);
    collect_declarations(&code, &mut result);

    dedupe(&mut result.exports);
    dedupe(&mut result.functions);
    dedupe(&mut result.classes);
    dedupe(&mut result.variables);
    result
}

fn collect_imports(
    raw: &str,
    code: &str,
    lines: &LineIndex,
    dialect: ScriptDialect,
    result: &mut AnalysisResult,
) {
    let mut found: Vec<(usize, ImportRecord)> = Vec::new();

    // Statements are matched with string contents blanked; the specifier is
    // read back from the same offsets of the unblanked text.
    let blanked = mask_comments_and_strings(raw, CommentStyle::CLike);

    let mut scan = |regex: &Regex, text: &str, source: &str, kind: ImportKind| {
        for caps in regex.captures_iter(text) {
            let (Some(whole), Some(spec)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if is_member_access(text, whole.start()) {
                continue;
            }
            let Some(specifier) = source.get(spec.range()).map(str::trim) else {
                continue;
            };
            if specifier.is_empty() || (dialect.skip_urls && is_url(specifier)) {
                continue;
            }
            let record = ImportRecord::new(
                specifier,
                kind,
                lines.line_of(whole.start()),
                is_relative_specifier(specifier),
            );
            found.push((whole.start(), record));
        }
    };

    scan(&ES_IMPORT, &blanked, code, ImportKind::Import);
    scan(&REEXPORT_FROM, &blanked, code, ImportKind::Import);
    scan(&DYNAMIC_IMPORT, &blanked, code, ImportKind::Import);
    scan(&REQUIRE, &blanked, code, ImportKind::Require);
    if dialect.references {
        // triple-slash directives live in comments, so they are read from the raw text
        scan(&REFERENCE_PATH, raw, raw, ImportKind::Include);
    }

    found.sort_by_key(|(offset, _)| *offset);
    found.dedup_by_key(|(offset, _)| *offset);
    for (_, record) in found {
        result.push_import(record);
    }
}

fn collect_exports(code: &str, dialect: ScriptDialect, result: &mut AnalysisResult) {
    let mut found: Vec<(usize, String)> = Vec::new();

    for caps in EXPORT_DECL.captures_iter(code) {
        let keyword = &caps[1];
        let typed_only = matches!(keyword, "interface" | "type" | "enum" | "namespace");
        if typed_only && !dialect.typed {
            continue;
        }
        found.push((caps.get(0).map_or(0, |m| m.start()), caps[2].to_string()));
    }

    for caps in EXPORT_DEFAULT.captures_iter(code) {
        let start = caps.get(0).map_or(0, |m| m.start());
        // `export default wrap(...)` exports a call result, not a binding
        let ident = caps.get(3).filter(|_| caps.get(4).is_none());
        let name = [caps.get(1), caps.get(2), ident]
            .into_iter()
            .flatten()
            .map(|m| m.as_str())
            .find(|name| !name.is_empty() && !ANONYMOUS_DEFAULT.contains(name))
            .filter(|name| *name != "function" && *name != "class");
        found.push((start, name.unwrap_or("default").to_string()));
    }

    for caps in EXPORT_LIST.captures_iter(code) {
        let start = caps.get(0).map_or(0, |m| m.start());
        for name in split_export_list(&caps[1]) {
            found.push((start, name));
        }
    }

    if dialect.commonjs {
        for caps in CJS_MODULE_IDENT.captures_iter(code) {
            let name = &caps[1];
            if !matches!(name, "function" | "class" | "require" | "new") {
                found.push((caps.get(0).map_or(0, |m| m.start()), name.to_string()));
            }
        }
        for caps in CJS_MODULE_OBJECT.captures_iter(code) {
            let start = caps.get(0).map_or(0, |m| m.start());
            for entry in caps[1].split(',') {
                let key = entry
                    .split(|c| c == ':' || c == '(')
                    .next()
                    .unwrap_or_default()
                    .trim();
                if is_identifier(key) {
                    found.push((start, key.to_string()));
                }
            }
        }
        for caps in CJS_NAMED.captures_iter(code) {
            found.push((caps.get(0).map_or(0, |m| m.start()), caps[1].to_string()));
        }
    }

    found.sort_by_key(|(offset, _)| *offset);
    result.exports.extend(found.into_iter().map(|(_, name)| name));
}

fn collect_declarations(code: &str, result: &mut AnalysisResult) {
    for caps in FUNCTION_DECL.captures_iter(code) {
        result.functions.push(caps[1].to_string());
    }

    let mut function_bindings = Vec::new();
    for caps in FUNCTION_BINDING.captures_iter(code) {
        function_bindings.push(caps[1].to_string());
    }
    result.functions.extend(function_bindings.iter().cloned());

    for caps in CLASS_DECL.captures_iter(code) {
        result.classes.push(caps[1].to_string());
    }

    for caps in TOP_LEVEL_BINDING.captures_iter(code) {
        let name = &caps[1];
        if !function_bindings.iter().any(|f| f == name) {
            result.variables.push(name.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn targets(result: &AnalysisResult) -> Vec<&str> {
        result.imports.iter().map(|i| i.target.as_str()).collect()
    }

    #[test]
    fn records_follow_source_order_across_patterns() {
        let src = "const fs = require('fs');\nimport a from './a';\nconst lazy = import('../lazy');\nimport './side-effect';\n";
        let result = analyze_script(src, ScriptDialect::default());
        assert_eq!(targets(&result), vec!["fs", "./a", "../lazy", "./side-effect"]);
        assert_eq!(result.dependencies, vec!["fs", "./a", "../lazy", "./side-effect"]);
        let lines: Vec<usize> = result.imports.iter().map(|i| i.line).collect();
        assert_eq!(lines, vec![1, 2, 3, 4]);
        assert_eq!(result.imports[0].kind, ImportKind::Require);
        assert!(!result.imports[0].is_relative);
        assert!(result.imports[2].is_relative);
    }

    #[test]
    fn multiline_named_imports_report_the_statement_line() {
        let src = "\n\nimport {\n  a,\n  b,\n} from './things';\n";
        let result = analyze_script(src, ScriptDialect::default());
        assert_eq!(result.imports.len(), 1);
        assert_eq!(result.imports[0].line, 3);
    }

    #[test]
    fn commented_imports_are_ignored() {
        let src = "// import x from './x';\n/* require('./y') */\nimport z from './z';\n";
        let result = analyze_script(src, ScriptDialect::default());
        assert_eq!(result.dependencies, vec!["./z"]);
    }

    #[test]
    fn import_text_inside_strings_is_ignored() {
        let src = "const s = \"import x from './gen'\";\nconst t = `require('./tpl')`;\nimport real from './real';\n";
        let result = analyze_script(src, ScriptDialect::default());
        assert_eq!(result.dependencies, vec!["./real"]);
        assert_eq!(result.imports[0].line, 3);
    }

    #[test]
    fn member_require_calls_are_not_imports() {
        let src = "loader.require('./nope');\nrequire('./yes');\n";
        let result = analyze_script(src, ScriptDialect::default());
        assert_eq!(result.dependencies, vec!["./yes"]);
    }

    #[test]
    fn default_exports_name_or_fall_back() {
        let named = analyze_script("export default function App() {}", ScriptDialect::default());
        assert_eq!(named.exports, vec!["App"]);
        let anonymous = analyze_script("export default class extends Base {}", ScriptDialect::default());
        assert_eq!(anonymous.exports, vec!["default"]);
        let ident = analyze_script("const x = 1;\nexport default x;", ScriptDialect::default());
        assert_eq!(ident.exports, vec!["x"]);
        let call = analyze_script("export default defineConfig({});", ScriptDialect::default());
        assert_eq!(call.exports, vec!["default"]);
    }

    #[test]
    fn commonjs_exports_need_the_dialect_flag() {
        let src = "module.exports = { alpha, beta: b, gamma() {} };\nexports.delta = 4;\n";
        let plain = analyze_script(src, ScriptDialect::default());
        assert!(plain.exports.is_empty());
        let cjs = analyze_script(
            src,
            ScriptDialect {
                commonjs: true,
                ..ScriptDialect::default()
            },
        );
        assert_eq!(cjs.exports, vec!["alpha", "beta", "gamma", "delta"]);
    }

    #[test]
    fn declarations_split_functions_from_variables() {
        let src = "function one() {}\nconst two = async (a, b) => a + b;\nconst three = 3;\nclass Four {}\nlet five = function () {};\n";
        let result = analyze_script(src, ScriptDialect::default());
        assert_eq!(result.functions, vec!["one", "two", "five"]);
        assert_eq!(result.variables, vec!["three"]);
        assert_eq!(result.classes, vec!["Four"]);
    }
}
