pub mod common;
pub mod csharp;
pub mod ecmascript;
pub mod java;
pub mod javascript;
pub mod python;
pub mod type_refs;
pub mod typescript;
pub mod vue;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// How a dependency was declared in source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImportKind {
    Import,
    Require,
    Include,
    NamespaceUse,
    TypeReference,
}

impl ImportKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ImportKind::Import => "import",
            ImportKind::Require => "require",
            ImportKind::Include => "include",
            ImportKind::NamespaceUse => "namespace-use",
            ImportKind::TypeReference => "type-reference",
        }
    }
}

impl fmt::Display for ImportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One raw import occurrence, exactly as written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRecord {
    pub target: String,
    pub kind: ImportKind,
    pub line: usize,
    pub is_relative: bool,
}

impl ImportRecord {
    pub fn new(target: impl Into<String>, kind: ImportKind, line: usize, is_relative: bool) -> Self {
        Self {
            target: target.into(),
            kind,
            line,
            is_relative,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub dependencies: Vec<String>,
    pub exports: Vec<String>,
    pub imports: Vec<ImportRecord>,
    pub functions: Vec<String>,
    pub classes: Vec<String>,
    pub variables: Vec<String>,
    pub namespace: Option<String>,
}

impl AnalysisResult {
    /// Append an import and keep `dependencies` in lockstep with `imports`.
    pub fn push_import(&mut self, record: ImportRecord) {
        self.dependencies.push(record.target.clone());
        self.imports.push(record);
    }
}

/// Uniform extractor contract. Implementations are pure: no I/O, no failure.
pub trait LanguageParser {
    fn analyze(&self, content: &str, file_path: &Path) -> AnalysisResult;
    fn language(&self) -> Language;
}

/// Resolution behaviour shared by groups of languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LanguageFamily {
    /// ES-module style imports (TypeScript, JavaScript, Vue single-file components).
    Script,
    /// Indentation-block modules (Python).
    Python,
    /// Namespace/package languages (C#, Java).
    Namespace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    TypeScript,
    JavaScript,
    Vue,
    Python,
    CSharp,
    Java,
}

/// Static extension registry. One extractor may serve several extensions.
const EXTENSIONS: &[(&str, Language)] = &[
    ("ts", Language::TypeScript),
    ("tsx", Language::TypeScript),
    ("mts", Language::TypeScript),
    ("cts", Language::TypeScript),
    ("js", Language::JavaScript),
    ("jsx", Language::JavaScript),
    ("mjs", Language::JavaScript),
    ("cjs", Language::JavaScript),
    ("vue", Language::Vue),
    ("py", Language::Python),
    ("pyw", Language::Python),
    ("cs", Language::CSharp),
    ("java", Language::Java),
];

pub const DEFAULT_COLOR: &str = "#6c757d";

impl Language {
    pub const ALL: [Language; 6] = [
        Language::TypeScript,
        Language::JavaScript,
        Language::Vue,
        Language::Python,
        Language::CSharp,
        Language::Java,
    ];

    pub fn from_extension(extension: &str) -> Option<Self> {
        let extension = extension.to_ascii_lowercase();
        EXTENSIONS
            .iter()
            .find(|(ext, _)| *ext == extension)
            .map(|(_, language)| *language)
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Every extension known to the registry, in declaration order.
    pub fn all_extensions() -> impl Iterator<Item = &'static str> {
        EXTENSIONS.iter().map(|(ext, _)| *ext)
    }

    pub fn extensions(self) -> impl Iterator<Item = &'static str> {
        EXTENSIONS
            .iter()
            .filter(move |(_, language)| *language == self)
            .map(|(ext, _)| *ext)
    }

    pub fn family(self) -> LanguageFamily {
        match self {
            Language::TypeScript | Language::JavaScript | Language::Vue => LanguageFamily::Script,
            Language::Python => LanguageFamily::Python,
            Language::CSharp | Language::Java => LanguageFamily::Namespace,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Language::TypeScript => "typescript",
            Language::JavaScript => "javascript",
            Language::Vue => "vue",
            Language::Python => "python",
            Language::CSharp => "csharp",
            Language::Java => "java",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Language::TypeScript => "TypeScript",
            Language::JavaScript => "JavaScript",
            Language::Vue => "Vue.js",
            Language::Python => "Python",
            Language::CSharp => "C#",
            Language::Java => "Java",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Language::TypeScript => "#3178c6",
            Language::JavaScript => "#f7df1e",
            Language::Vue => "#4fc08d",
            Language::Python => "#3776ab",
            Language::CSharp => "#239120",
            Language::Java => "#ed8b00",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub struct ParserFactory;

impl ParserFactory {
    pub fn new() -> Self {
        Self
    }

    pub fn get_parser(&self, language: Language) -> &'static (dyn LanguageParser + Send + Sync) {
        match language {
            Language::TypeScript => &typescript::TypeScriptParser,
            Language::JavaScript => &javascript::JavaScriptParser,
            Language::Vue => &vue::VueParser,
            Language::Python => &python::PythonParser,
            Language::CSharp => &csharp::CSharpParser,
            Language::Java => &java::JavaParser,
        }
    }

    /// Extension dispatch. `None` means the file is not analyzed at all.
    pub fn parser_for_path(&self, path: &Path) -> Option<&'static (dyn LanguageParser + Send + Sync)> {
        Language::from_path(path).map(|language| self.get_parser(language))
    }
}

impl Default for ParserFactory {
    fn default() -> Self {
        Self::new()
    }
}
