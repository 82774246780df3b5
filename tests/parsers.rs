use mappath::parsers::{AnalysisResult, ImportKind, Language, ParserFactory};
use std::path::Path;

fn analyze(path: &str, content: &str) -> AnalysisResult {
    let path = Path::new(path);
    ParserFactory::new()
        .parser_for_path(path)
        .unwrap()
        .analyze(content, path)
}

fn summary(result: &AnalysisResult) -> Vec<(&str, usize, bool)> {
    result
        .imports
        .iter()
        .map(|i| (i.target.as_str(), i.line, i.is_relative))
        .collect()
}

#[test]
fn typescript_import_only_file() {
    let src = "import a from './a';\nimport type { B } from '../types/b';\nimport * as c from 'lib-c';\nexport * from './d';\nconst e = await import('./e');\n";
    let result = analyze("/p/src/index.ts", src);
    assert_eq!(
        summary(&result),
        vec![
            ("./a", 1, true),
            ("../types/b", 2, true),
            ("lib-c", 3, false),
            ("./d", 4, true),
            ("./e", 5, true),
        ]
    );
    assert!(result.imports.iter().all(|i| i.kind == ImportKind::Import));
    assert_eq!(result.dependencies.len(), result.imports.len());
}

#[test]
fn javascript_require_and_import() {
    let src = "// import './commented';\nconst x = require('./x');\nimport y from 'y';\n";
    let result = analyze("/p/main.cjs", src);
    assert_eq!(summary(&result), vec![("./x", 2, true), ("y", 3, false)]);
    assert_eq!(result.imports[0].kind, ImportKind::Require);
    assert_eq!(result.imports[1].kind, ImportKind::Import);
}

#[test]
fn python_import_only_file() {
    let src = "import os\nfrom .models import User\n# import hidden\nfrom ..pkg import thing\n";
    let result = analyze("/p/app/views.py", src);
    assert_eq!(
        summary(&result),
        vec![("os", 1, false), (".models", 2, true), ("..pkg", 4, true)]
    );
}

#[test]
fn csharp_usings_are_namespace_uses() {
    let src = "using System;\nusing App.Orders;\n// using App.Hidden;\nusing static App.Util.Math;\n";
    let result = analyze("/p/Program.cs", src);
    assert_eq!(
        summary(&result),
        vec![
            ("System", 1, false),
            ("App.Orders", 2, false),
            ("App.Util.Math", 4, false)
        ]
    );
    assert!(result
        .imports
        .iter()
        .all(|i| i.kind == ImportKind::NamespaceUse));
}

#[test]
fn java_imports_keep_their_written_form() {
    let src = "package com.acme;\n\nimport java.util.List;\nimport static com.acme.Util.pad;\nimport com.acme.model.*;\n";
    let result = analyze("/p/App.java", src);
    assert_eq!(
        summary(&result),
        vec![
            ("java.util.List", 3, false),
            ("com.acme.Util.pad", 4, false),
            ("com.acme.model.*", 5, false)
        ]
    );
    assert_eq!(result.namespace.as_deref(), Some("com.acme"));
}

#[test]
fn vue_lines_count_from_the_top_of_the_component() {
    let src = "<template>\n  <Child/>\n</template>\n<script setup>\nimport Child from './Child.vue'\n</script>\n";
    let result = analyze("/p/src/Page.vue", src);
    assert_eq!(summary(&result), vec![("./Child.vue", 5, true)]);
}

#[test]
fn every_language_has_a_color() {
    for language in Language::ALL {
        assert!(language.color().starts_with('#'));
        assert!(language.extensions().count() >= 1);
    }
}
