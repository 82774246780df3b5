use anyhow::Result;
use petgraph::visit::EdgeRef;
use std::collections::BTreeMap;
use std::fmt::Write;
use std::path::Path;

use crate::core::scanner::relative_slash_path;
use crate::core::ProjectGraph;
use crate::parsers::{ImportKind, Language};

/// Mermaid flowchart: one subgraph per folder, one node per file, edges
/// labelled with their import kind.
pub struct MermaidFormatter {
    direction: &'static str,
}

impl MermaidFormatter {
    pub fn new() -> Self {
        Self { direction: "TB" }
    }

    pub fn left_to_right(mut self) -> Self {
        self.direction = "LR";
        self
    }

    pub fn format_graph(&self, project: &ProjectGraph) -> Result<String> {
        let graph = project.to_dependency_graph();
        let mut out = String::new();
        writeln!(out, "flowchart {}", self.direction)?;

        let mut by_folder: BTreeMap<String, Vec<_>> = BTreeMap::new();
        for idx in graph.node_indices() {
            let folder = relative_slash_path(&project.root_path, Path::new(&graph[idx].group));
            by_folder.entry(folder).or_default().push(idx);
        }

        for (position, (folder, members)) in by_folder.iter().enumerate() {
            let label = if folder.is_empty() { "." } else { folder.as_str() };
            writeln!(out, "  subgraph d{position}[\"{}\"]", escape_mermaid_label(label))?;
            for idx in members {
                let node = &graph[*idx];
                writeln!(
                    out,
                    "    n{}[\"{}\"]:::{}",
                    idx.index(),
                    escape_mermaid_label(&node.label),
                    node.language.name()
                )?;
            }
            writeln!(out, "  end")?;
        }

        for edge in graph.edge_references() {
            let arrow = match edge.weight() {
                ImportKind::TypeReference => "-.->",
                _ => "-->",
            };
            writeln!(
                out,
                "  n{} {arrow}|{}| n{}",
                edge.source().index(),
                edge.weight(),
                edge.target().index()
            )?;
        }

        for language in Language::ALL {
            writeln!(
                out,
                "  classDef {} fill:{},stroke:#333,color:#fff",
                language.name(),
                language.color()
            )?;
        }

        Ok(out)
    }
}

impl Default for MermaidFormatter {
    fn default() -> Self {
        Self::new()
    }
}

/// Quotes and brackets inside labels break the syntax.
fn escape_mermaid_label(s: &str) -> String {
    s.replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('{', "&#123;")
        .replace('}', "&#125;")
}
