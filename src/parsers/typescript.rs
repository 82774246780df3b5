use std::path::Path;

use super::ecmascript::{analyze_script, ScriptDialect};
use super::{AnalysisResult, Language, LanguageParser};

/// TypeScript sources (`.ts`, `.tsx`, `.mts`, `.cts`).
pub struct TypeScriptParser;

impl TypeScriptParser {
    pub const DIALECT: ScriptDialect = ScriptDialect {
        typed: true,
        commonjs: false,
        references: true,
        skip_urls: false,
    };
}

impl LanguageParser for TypeScriptParser {
    fn analyze(&self, content: &str, _file_path: &Path) -> AnalysisResult {
        analyze_script(content, Self::DIALECT)
    }

    fn language(&self) -> Language {
        Language::TypeScript
    }
}
