use mappath::core::{ProjectAnalyzer, ProjectGraph};
use mappath::parsers::ImportKind;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn project(files: &[(&str, &str)]) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join(".git")).unwrap();
    for (path, content) in files {
        let full = dir.path().join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, content).unwrap();
    }
    let root = dir.path().canonicalize().unwrap();
    (dir, root)
}

/// Targets of `from`, relative to the root, in edge order.
fn targets(graph: &ProjectGraph, root: &Path, from: &str) -> Vec<(String, ImportKind)> {
    let from = root.join(from).to_string_lossy().into_owned();
    graph
        .edges
        .iter()
        .filter(|e| e.from == from)
        .map(|e| {
            let to = Path::new(&e.to).strip_prefix(root).unwrap();
            (to.to_string_lossy().replace('\\', "/"), e.kind)
        })
        .collect()
}

async fn analyze(root: &Path) -> ProjectGraph {
    ProjectAnalyzer::new().analyze_project(root).await.unwrap()
}

#[tokio::test]
async fn longest_compiler_alias_wins() {
    let (_dir, root) = project(&[
        (
            "tsconfig.json",
            r#"{
                "compilerOptions": {
                    "baseUrl": ".",
                    // more specific mapping first
                    "paths": {
                        "@/components/*": ["special/*"],
                        "@/*": ["src/*"],
                    }
                }
            }"#,
        ),
        (
            "src/main.ts",
            "import Foo from '@/components/Foo';\nimport { api } from '@/api';\n",
        ),
        ("src/api.ts", "export const api = {};\n"),
        ("src/components/Foo.ts", "export default 1;\n"),
        ("special/Foo.ts", "export default 2;\n"),
    ]);

    let graph = analyze(&root).await;
    assert_eq!(
        targets(&graph, &root, "src/main.ts"),
        vec![
            ("special/Foo.ts".to_string(), ImportKind::Import),
            ("src/api.ts".to_string(), ImportKind::Import),
        ]
    );
}

#[tokio::test]
async fn bundler_aliases_resolve_vue_components() {
    let (_dir, root) = project(&[
        (
            "vite.config.ts",
            "import { fileURLToPath, URL } from 'node:url'\n\
             export default defineConfig({\n\
               resolve: { alias: { '@': fileURLToPath(new URL('./src', import.meta.url)) } },\n\
             })\n",
        ),
        (
            "src/App.vue",
            "<template><Header/></template>\n\
             <script setup lang=\"ts\">\n\
             import Header from '@/components/Header.vue'\n\
             import { useStore } from '@/stores'\n\
             </script>\n",
        ),
        ("src/components/Header.vue", "<template><h1/></template>\n"),
        ("src/stores/index.ts", "export function useStore() {}\n"),
    ]);

    let graph = analyze(&root).await;
    assert_eq!(
        targets(&graph, &root, "src/App.vue"),
        vec![
            ("src/components/Header.vue".to_string(), ImportKind::Import),
            ("src/stores/index.ts".to_string(), ImportKind::Import),
        ]
    );
}

#[tokio::test]
async fn bundler_config_above_the_scanned_folder_is_found() {
    let (_dir, repo) = project(&[
        (
            "web/vite.config.ts",
            "export default { resolve: { alias: { '@': './app/src', '~ui': './app/src/components' } } }\n",
        ),
        (
            "web/app/src/main.ts",
            "import { fmt } from '@/util/fmt';\nimport Nav from '~ui/Nav.vue';\n",
        ),
        ("web/app/src/util/fmt.ts", "export const fmt = 1;\n"),
        ("web/app/src/components/Nav.vue", "<template><nav/></template>\n"),
    ]);
    let root = repo.join("web/app");

    let graph = analyze(&root).await;
    assert_eq!(
        targets(&graph, &root, "src/main.ts"),
        vec![
            ("src/util/fmt.ts".to_string(), ImportKind::Import),
            ("src/components/Nav.vue".to_string(), ImportKind::Import),
        ]
    );
}

#[tokio::test]
async fn bundler_search_stops_at_the_repository_root() {
    let (_dir, outer) = project(&[
        (
            "vite.config.ts",
            "export default { resolve: { alias: { '@': './elsewhere' } } }\n",
        ),
        ("elsewhere/util.ts", "export const wrong = 1;\n"),
        ("inner/src/main.ts", "import { util } from '@/util';\n"),
        ("inner/src/util.ts", "export const util = 1;\n"),
    ]);
    let root = outer.join("inner");
    fs::create_dir(root.join(".git")).unwrap();

    let graph = analyze(&root).await;
    assert_eq!(
        targets(&graph, &root, "src/main.ts"),
        vec![("src/util.ts".to_string(), ImportKind::Import)]
    );
}

#[tokio::test]
async fn written_extensions_fall_back_to_sources() {
    let (_dir, root) = project(&[
        ("src/a.ts", "import { b } from './b.js';\nexport * from '../lib';\n"),
        ("src/b.ts", "export const b = 1;\n"),
        ("lib/index.js", "module.exports = {};\n"),
    ]);

    let graph = analyze(&root).await;
    assert_eq!(
        targets(&graph, &root, "src/a.ts"),
        vec![
            ("src/b.ts".to_string(), ImportKind::Import),
            ("lib/index.js".to_string(), ImportKind::Import),
        ]
    );
}

#[tokio::test]
async fn python_packages_and_relative_imports() {
    let (_dir, root) = project(&[
        ("app/__init__.py", ""),
        (
            "app/main.py",
            "import os\nimport json\nfrom . import models\nfrom .services.billing import charge\nfrom app.util import helper\n",
        ),
        ("app/models.py", "class User:\n    pass\n"),
        ("app/services/__init__.py", ""),
        ("app/services/billing.py", "def charge():\n    pass\n"),
        ("app/util.py", "def helper():\n    pass\n"),
    ]);

    let graph = analyze(&root).await;
    assert_eq!(
        targets(&graph, &root, "app/main.py"),
        vec![
            ("app/__init__.py".to_string(), ImportKind::Import),
            ("app/services/billing.py".to_string(), ImportKind::Import),
            ("app/util.py".to_string(), ImportKind::Import),
        ]
    );
}

#[tokio::test]
async fn exact_namespace_beats_prefix() {
    let (_dir, root) = project(&[
        ("Data/Repository.cs", "namespace App.Data\n{\n    public class Repository { }\n}\n"),
        ("Data/Sql/SqlStore.cs", "namespace App.Data.Sql;\n\npublic class SqlStore { }\n"),
        (
            "Web/Controller.cs",
            "using App.Data.Sql;\nusing App.Data.Sql.Migrations;\n\nnamespace App.Web;\n\npublic class Controller { }\n",
        ),
    ]);

    let graph = analyze(&root).await;
    assert_eq!(
        targets(&graph, &root, "Web/Controller.cs"),
        vec![("Data/Sql/SqlStore.cs".to_string(), ImportKind::NamespaceUse)]
    );
}

#[tokio::test]
async fn csharp_type_references_follow_visible_namespaces() {
    let (_dir, root) = project(&[
        ("Domain/Order.cs", "namespace Shop.Domain\n{\n    public class Order { }\n}\n"),
        ("Domain/Customer.cs", "namespace Shop.Domain\n{\n    public class Customer { }\n}\n"),
        (
            "Domain/Invoice.cs",
            "namespace Shop.Domain\n{\n    public class Invoice\n    {\n        private Customer customer = new Customer();\n        public List<Order> Lines { get; set; }\n    }\n}\n",
        ),
    ]);

    let graph = analyze(&root).await;
    let edges = targets(&graph, &root, "Domain/Invoice.cs");
    assert!(edges.contains(&("Domain/Customer.cs".to_string(), ImportKind::TypeReference)));
    assert!(edges.contains(&("Domain/Order.cs".to_string(), ImportKind::TypeReference)));
}

#[tokio::test]
async fn java_imports_resolve_to_declaring_files() {
    let (_dir, root) = project(&[
        (
            "src/main/java/com/acme/model/User.java",
            "package com.acme.model;\n\npublic class User { }\n",
        ),
        (
            "src/main/java/com/acme/app/App.java",
            "package com.acme.app;\n\nimport java.util.List;\nimport com.acme.model.User;\n\npublic class App {\n    private List<User> users;\n}\n",
        ),
    ]);

    let graph = analyze(&root).await;
    let edges = targets(&graph, &root, "src/main/java/com/acme/app/App.java");
    assert!(edges.contains(&(
        "src/main/java/com/acme/model/User.java".to_string(),
        ImportKind::Import
    )));
    assert!(edges
        .iter()
        .all(|(to, _)| to == "src/main/java/com/acme/model/User.java"));
}
