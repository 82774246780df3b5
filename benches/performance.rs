use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mappath::core::ProjectAnalyzer;
use mappath::parsers::{Language, ParserFactory};
use std::path::Path;
use tempfile::TempDir;

fn write_project(root: &Path, modules: usize) {
    let src = root.join("src");
    std::fs::create_dir_all(src.join("components")).unwrap();
    std::fs::write(
        root.join("tsconfig.json"),
        r#"{ "compilerOptions": { "baseUrl": ".", "paths": { "@/*": ["src/*"] } } }"#,
    )
    .unwrap();

    for i in 0..modules {
        let content = format!(
            r#"
import {{ ref }} from 'vue';
import Button{next} from '@/components/Button{next}';
import type {{ Props }} from './types';

export interface Data{i} {{
    value: number;
}}

export function createService{i}(value: number): Data{i} {{
    const loader = () => import('./lazy_{i}');
    return {{ value }};
}}
"#,
            i = i,
            next = (i + 1) % modules
        );
        std::fs::write(src.join(format!("service_{i}.ts")), content).unwrap();
        std::fs::write(
            src.join("components").join(format!("Button{i}.vue")),
            format!(
                "<template><button/></template>\n<script setup lang=\"ts\">\nimport {{ createService{i} }} from '../service_{i}';\n</script>\n"
            ),
        )
        .unwrap();
    }
    std::fs::write(src.join("types.ts"), "export type Props = {};\n").unwrap();

    let py = root.join("app");
    std::fs::create_dir_all(&py).unwrap();
    std::fs::write(py.join("__init__.py"), "").unwrap();
    for i in 0..modules {
        std::fs::write(
            py.join(format!("mod_{i}.py")),
            format!("import os\nfrom . import mod_{}\nfrom .util import helper\n", (i + 1) % modules),
        )
        .unwrap();
    }
    std::fs::write(py.join("util.py"), "def helper():\n    return 1\n").unwrap();

    let cs = root.join("Domain");
    std::fs::create_dir_all(&cs).unwrap();
    for i in 0..modules {
        std::fs::write(
            cs.join(format!("Entity{i}.cs")),
            format!(
                "using System;\nusing App.Domain;\nnamespace App.Domain.E{i}\n{{\n    public class Entity{i} : Entity{} {{ }}\n}}\n",
                (i + 1) % modules
            ),
        )
        .unwrap();
    }
}

fn benchmark_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("project_analysis");
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();

    let small = TempDir::new().unwrap();
    write_project(small.path(), 10);
    group.bench_function("small_project", |b| {
        b.iter(|| {
            let analyzer = ProjectAnalyzer::new();
            let result = runtime.block_on(analyzer.analyze_project(black_box(small.path())));
            black_box(result)
        });
    });

    let large = TempDir::new().unwrap();
    write_project(large.path(), 100);
    group.bench_function("large_project", |b| {
        b.iter(|| {
            let analyzer = ProjectAnalyzer::new();
            let result = runtime.block_on(analyzer.analyze_project(black_box(large.path())));
            black_box(result)
        });
    });

    group.finish();
}

fn benchmark_extractors(c: &mut Criterion) {
    let mut group = c.benchmark_group("extractors");
    let factory = ParserFactory::new();

    let typescript: String = (0..200)
        .map(|i| format!("import {{ a{i} }} from './mod_{i}';\nexport const v{i} = require('pkg{i}');\n"))
        .collect();
    let csharp: String = format!(
        "using System;\nnamespace App.Bench\n{{\n{}}}\n",
        (0..200)
            .map(|i| format!("    public class C{i} : Base{i} {{ private Dep{i} dep = new Dep{i}(); }}\n"))
            .collect::<String>()
    );

    group.bench_function("typescript", |b| {
        let parser = factory.get_parser(Language::TypeScript);
        b.iter(|| black_box(parser.analyze(black_box(&typescript), Path::new("bench.ts"))));
    });
    group.bench_function("csharp", |b| {
        let parser = factory.get_parser(Language::CSharp);
        b.iter(|| black_box(parser.analyze(black_box(&csharp), Path::new("Bench.cs"))));
    });

    group.finish();
}

criterion_group!(benches, benchmark_analysis, benchmark_extractors);
criterion_main!(benches);
