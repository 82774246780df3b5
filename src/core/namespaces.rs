use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::graph::SourceFile;
use crate::parsers::{ImportKind, Language, LanguageFamily};

/// Namespace / package → the single file that represents it.
///
/// Files must be fed in path order; the first declarer of a namespace keeps it.
#[derive(Debug, Clone, Default)]
pub struct NamespaceTable {
    entries: BTreeMap<String, PathBuf>,
}

impl NamespaceTable {
    pub fn build(files: &[SourceFile]) -> Self {
        let mut entries: BTreeMap<String, PathBuf> = BTreeMap::new();
        for file in files {
            let Some(namespace) = &file.namespace else {
                continue;
            };
            match entries.get(namespace) {
                Some(owner) => debug!(
                    "Namespace {namespace} already owned by {}, ignoring {}",
                    owner.display(),
                    file.path.display()
                ),
                None => {
                    entries.insert(namespace.clone(), file.path.clone());
                }
            }
        }
        Self { entries }
    }

    pub fn get(&self, namespace: &str) -> Option<&Path> {
        self.entries.get(namespace).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone)]
struct TypeEntry {
    namespace: Option<String>,
    language: Language,
    path: PathBuf,
}

/// Public types of the namespace languages, by simple and qualified name.
#[derive(Debug, Clone, Default)]
pub struct TypeTable {
    by_name: BTreeMap<String, Vec<TypeEntry>>,
    by_qualified: BTreeMap<String, Vec<TypeEntry>>,
}

impl TypeTable {
    pub fn build(files: &[SourceFile]) -> Self {
        let mut table = Self::default();
        for file in files {
            if file.language.family() != LanguageFamily::Namespace {
                continue;
            }
            for name in &file.exports {
                let entry = TypeEntry {
                    namespace: file.namespace.clone(),
                    language: file.language,
                    path: file.path.clone(),
                };
                let qualified = match &file.namespace {
                    Some(namespace) => format!("{namespace}.{name}"),
                    None => name.clone(),
                };
                table.by_qualified.entry(qualified).or_default().push(entry.clone());
                table.by_name.entry(name.clone()).or_default().push(entry);
            }
        }
        table
    }

    pub fn len(&self) -> usize {
        self.by_qualified.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_qualified.is_empty()
    }

    /// File declaring the fully-qualified type `namespace.Type`.
    pub fn qualified(&self, name: &str, language: Language) -> Option<&Path> {
        self.by_qualified
            .get(name)?
            .iter()
            .find(|entry| entry.language == language)
            .map(|entry| entry.path.as_path())
    }

    /// File declaring the simple type `name` as seen from `from`: the type's
    /// namespace must be the file's own namespace or one of its ancestors, be
    /// imported by the file (whole or for this one type), or be global.
    pub fn visible_from(&self, name: &str, from: &SourceFile) -> Option<&Path> {
        let visible = visible_namespaces(from);
        self.by_name
            .get(name)?
            .iter()
            .filter(|entry| entry.language == from.language)
            .find(|entry| match &entry.namespace {
                None => true,
                Some(namespace) => visible
                    .iter()
                    .any(|v| v == namespace || is_single_type_import(v, namespace, name)),
            })
            .map(|entry| entry.path.as_path())
    }
}

/// `import a.b.Type;` makes `Type` from `a.b` visible.
fn is_single_type_import(import: &str, namespace: &str, name: &str) -> bool {
    import
        .strip_prefix(namespace)
        .and_then(|rest| rest.strip_prefix('.'))
        .is_some_and(|rest| rest == name)
}

/// Namespaces whose types a file can name without qualification.
fn visible_namespaces(file: &SourceFile) -> Vec<String> {
    let mut visible = Vec::new();
    if let Some(namespace) = &file.namespace {
        let mut current = namespace.as_str();
        visible.push(current.to_string());
        while let Some((parent, _)) = current.rsplit_once('.') {
            visible.push(parent.to_string());
            current = parent;
        }
    }
    for record in &file.imports {
        if !matches!(record.kind, ImportKind::NamespaceUse | ImportKind::Import) {
            continue;
        }
        let target = record.target.strip_suffix(".*").unwrap_or(&record.target);
        visible.push(target.to_string());
    }
    visible
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::{AnalysisResult, ImportRecord};

    fn cs_file(path: &str, namespace: Option<&str>, exports: &[&str], usings: &[&str]) -> SourceFile {
        let mut analysis = AnalysisResult {
            namespace: namespace.map(str::to_string),
            exports: exports.iter().map(|e| e.to_string()).collect(),
            ..AnalysisResult::default()
        };
        for (idx, using) in usings.iter().enumerate() {
            analysis.push_import(ImportRecord::new(*using, ImportKind::NamespaceUse, idx + 1, false));
        }
        SourceFile::new(PathBuf::from(path), Language::CSharp, 1, analysis)
    }

    #[test]
    fn first_declarer_in_path_order_owns_the_namespace() {
        let files = vec![
            cs_file("/p/A/First.cs", Some("App.Shared"), &[], &[]),
            cs_file("/p/B/Second.cs", Some("App.Shared"), &[], &[]),
            cs_file("/p/B/Other.cs", Some("App.Other"), &[], &[]),
        ];
        let table = NamespaceTable::build(&files);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("App.Shared"), Some(Path::new("/p/A/First.cs")));
        assert_eq!(table.get("App"), None);
    }

    #[test]
    fn qualified_types_resolve_per_language() {
        let files = vec![cs_file("/p/Order.cs", Some("App.Orders"), &["Order"], &[])];
        let types = TypeTable::build(&files);
        assert_eq!(
            types.qualified("App.Orders.Order", Language::CSharp),
            Some(Path::new("/p/Order.cs"))
        );
        assert_eq!(types.qualified("App.Orders.Order", Language::Java), None);
    }

    #[test]
    fn simple_names_need_a_visible_namespace() {
        let files = vec![
            cs_file("/p/Billing/Invoice.cs", Some("App.Billing"), &["Invoice"], &[]),
            cs_file("/p/Core/Entity.cs", Some("App"), &["Entity"], &[]),
            cs_file("/p/Global.cs", None, &["Helper"], &[]),
        ];
        let types = TypeTable::build(&files);

        let plain = cs_file("/p/Orders/Service.cs", Some("App.Orders"), &[], &[]);
        assert_eq!(types.visible_from("Invoice", &plain), None);
        assert_eq!(types.visible_from("Entity", &plain), Some(Path::new("/p/Core/Entity.cs")));
        assert_eq!(types.visible_from("Helper", &plain), Some(Path::new("/p/Global.cs")));

        let importing = cs_file("/p/Orders/Service.cs", Some("App.Orders"), &[], &["App.Billing"]);
        assert_eq!(
            types.visible_from("Invoice", &importing),
            Some(Path::new("/p/Billing/Invoice.cs"))
        );
    }

    #[test]
    fn single_type_imports_expose_only_that_type() {
        let mut model = AnalysisResult {
            namespace: Some("com.acme.model".to_string()),
            exports: vec!["User".to_string(), "Role".to_string()],
            ..AnalysisResult::default()
        };
        model.classes = model.exports.clone();
        let files = vec![SourceFile::new(PathBuf::from("/p/User.java"), Language::Java, 1, model)];
        let types = TypeTable::build(&files);

        let mut app = AnalysisResult {
            namespace: Some("com.acme.app".to_string()),
            ..AnalysisResult::default()
        };
        app.push_import(ImportRecord::new("com.acme.model.User", ImportKind::Import, 3, false));
        let app = SourceFile::new(PathBuf::from("/p/App.java"), Language::Java, 1, app);

        assert_eq!(types.visible_from("User", &app), Some(Path::new("/p/User.java")));
        assert_eq!(types.visible_from("Role", &app), None);
    }
}
