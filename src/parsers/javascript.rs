use std::path::Path;

use super::ecmascript::{analyze_script, ScriptDialect};
use super::{AnalysisResult, Language, LanguageParser};

/// Plain JavaScript in both module systems (`.js`, `.jsx`, `.mjs`, `.cjs`).
pub struct JavaScriptParser;

impl JavaScriptParser {
    pub const DIALECT: ScriptDialect = ScriptDialect {
        typed: false,
        commonjs: true,
        references: false,
        skip_urls: false,
    };
}

impl LanguageParser for JavaScriptParser {
    fn analyze(&self, content: &str, _file_path: &Path) -> AnalysisResult {
        analyze_script(content, Self::DIALECT)
    }

    fn language(&self) -> Language {
        Language::JavaScript
    }
}
