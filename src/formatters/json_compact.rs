use anyhow::Result;
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use serde_json::json;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::core::scanner::relative_slash_path;
use crate::core::ProjectGraph;
use crate::parsers::{ImportKind, Language};

/// Index-compressed JSON: files and folders are listed once and referenced by
/// position everywhere else.
pub struct JsonCompactFormatter {
    /// Nodes and edges only
    minimal: bool,
}

impl JsonCompactFormatter {
    pub fn new() -> Self {
        Self { minimal: true }
    }

    pub fn with_details(mut self) -> Self {
        self.minimal = false;
        self
    }

    pub fn format_graph(&self, project: &ProjectGraph) -> Result<String> {
        let graph = project.to_dependency_graph();
        let node_indices: Vec<NodeIndex> = graph.node_indices().collect();

        // Folder table, referenced by nodes through "d"
        let mut folder_map: HashMap<String, usize> = HashMap::new();
        let mut folders = Vec::new();
        for &idx in &node_indices {
            let group = &graph[idx].group;
            if !folder_map.contains_key(group) {
                folder_map.insert(group.clone(), folders.len());
                let folder = relative_slash_path(&project.root_path, Path::new(group));
                folders.push(if folder.is_empty() { ".".to_string() } else { folder });
            }
        }

        let mut nodes = Vec::with_capacity(node_indices.len());
        let mut node_id_map = HashMap::new();
        for (position, &idx) in node_indices.iter().enumerate() {
            let node = &graph[idx];
            node_id_map.insert(idx, position);

            let mut node_json = json!({
                "n": relative_slash_path(&project.root_path, Path::new(&node.id)),
                "l": language_code(node.language),
                "d": folder_map[&node.group],
            });
            if !self.minimal {
                node_json["s"] = json!(node.size);
            }
            nodes.push(node_json);
        }

        let mut edges = Vec::with_capacity(graph.edge_count());
        for edge_ref in graph.edge_references() {
            if let (Some(&src_id), Some(&tgt_id)) = (
                node_id_map.get(&edge_ref.source()),
                node_id_map.get(&edge_ref.target()),
            ) {
                edges.push(json!([src_id, tgt_id, kind_code(*edge_ref.weight())]));
            }
        }

        let mut output = json!({
            "meta": {
                "nodes": graph.node_count(),
                "edges": graph.edge_count(),
                "format": if self.minimal { "compact" } else { "detailed" },
                "languages": Language::ALL.iter().map(|l| l.name()).collect::<Vec<_>>(),
                "kinds": KINDS.iter().map(|k| k.as_str()).collect::<Vec<_>>(),
            },
            "folders": folders,
            "nodes": nodes,
            "edges": edges
        });

        if !self.minimal {
            let tree: BTreeMap<&str, &[String]> = project
                .folders
                .iter()
                .filter(|(_, entry)| !entry.subfolders.is_empty())
                .map(|(name, entry)| (name.as_str(), entry.subfolders.as_slice()))
                .collect();
            output["tree"] = json!(tree);
            output["colors"] = json!(project.language_colors);
        }

        Ok(serde_json::to_string(&output)?)
    }
}

impl Default for JsonCompactFormatter {
    fn default() -> Self {
        Self::new()
    }
}

const KINDS: [ImportKind; 5] = [
    ImportKind::Import,
    ImportKind::Require,
    ImportKind::Include,
    ImportKind::NamespaceUse,
    ImportKind::TypeReference,
];

fn kind_code(kind: ImportKind) -> u8 {
    match kind {
        ImportKind::Import => 0,
        ImportKind::Require => 1,
        ImportKind::Include => 2,
        ImportKind::NamespaceUse => 3,
        ImportKind::TypeReference => 4,
    }
}

fn language_code(language: Language) -> u8 {
    match language {
        Language::TypeScript => 0,
        Language::JavaScript => 1,
        Language::Vue => 2,
        Language::Python => 3,
        Language::CSharp => 4,
        Language::Java => 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_line_up_with_meta_tables() {
        for (position, kind) in KINDS.iter().enumerate() {
            assert_eq!(kind_code(*kind) as usize, position);
        }
        for (position, language) in Language::ALL.iter().enumerate() {
            assert_eq!(language_code(*language) as usize, position);
        }
    }
}
