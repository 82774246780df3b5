use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::{Directed, Graph};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::parsers::{AnalysisResult, ImportKind, ImportRecord, Language, DEFAULT_COLOR};

/// One analyzed file. Built once per scan from its extractor's output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    pub path: PathBuf,
    pub name: String,
    pub language: Language,
    pub extension: String,
    pub size: u64,
    pub raw_dependencies: Vec<String>,
    pub imports: Vec<ImportRecord>,
    pub exports: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

impl SourceFile {
    pub fn new(path: PathBuf, language: Language, size: u64, analysis: AnalysisResult) -> Self {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        Self {
            path,
            name,
            language,
            extension,
            size,
            raw_dependencies: analysis.dependencies,
            imports: analysis.imports,
            exports: analysis.exports,
            namespace: analysis.namespace,
        }
    }

    pub fn directory(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }

    pub fn id(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Absolute path; unique per graph.
    pub id: String,
    pub label: String,
    /// Containing directory.
    pub group: String,
    pub language: Language,
    pub size: u64,
}

impl GraphNode {
    pub fn from_file(file: &SourceFile) -> Self {
        Self {
            id: file.id(),
            label: file.name.clone(),
            group: file.directory().to_string_lossy().into_owned(),
            language: file.language,
            size: file.size,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GraphEdge {
    pub from: String,
    pub to: String,
    pub kind: ImportKind,
}

impl GraphEdge {
    pub fn new(from: impl Into<String>, to: impl Into<String>, kind: ImportKind) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderEntry {
    pub files: Vec<String>,
    pub subfolders: Vec<String>,
    pub total_files: usize,
}

/// Directory relative to the root (`.` for the root itself) → contents.
pub type FolderIndex = BTreeMap<String, FolderEntry>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectGraph {
    pub root_path: PathBuf,
    pub files: Vec<SourceFile>,
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub folders: FolderIndex,
    pub language_colors: BTreeMap<String, String>,
}

impl ProjectGraph {
    /// petgraph view of the file graph, for traversal by consumers.
    pub fn to_dependency_graph(&self) -> DependencyGraph {
        let mut builder = GraphBuilder::new();
        for node in &self.nodes {
            builder.add_node(node.clone());
        }
        for edge in &self.edges {
            builder.add_edge(edge.clone());
        }
        builder.build()
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|node| node.id == id)
    }
}

pub type DependencyGraph = Graph<GraphNode, ImportKind, Directed>;

pub struct GraphBuilder {
    graph: DependencyGraph,
    node_map: HashMap<String, NodeIndex>,
    edge_set: HashSet<(NodeIndex, NodeIndex, ImportKind)>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self {
            graph: Graph::new(),
            node_map: HashMap::new(),
            edge_set: HashSet::new(),
        }
    }

    /// Adds `node` unless a node with the same id is already present.
    pub fn add_node(&mut self, node: GraphNode) -> NodeIndex {
        if let Some(index) = self.node_map.get(&node.id) {
            return *index;
        }
        let id = node.id.clone();
        let index = self.graph.add_node(node);
        self.node_map.insert(id, index);
        index
    }

    /// Returns `None` when an endpoint is unknown, for self-edges and for
    /// repeats of an existing `(from, to, kind)` triple.
    pub fn add_edge(&mut self, edge: GraphEdge) -> Option<EdgeIndex> {
        let source_idx = *self.node_map.get(&edge.from)?;
        let target_idx = *self.node_map.get(&edge.to)?;
        if source_idx == target_idx || !self.edge_set.insert((source_idx, target_idx, edge.kind)) {
            return None;
        }
        Some(self.graph.add_edge(source_idx, target_idx, edge.kind))
    }

    pub fn build(self) -> DependencyGraph {
        self.graph
    }

    /// Nodes in insertion order and edges as endpoint ids.
    pub fn into_parts(self) -> (Vec<GraphNode>, Vec<GraphEdge>) {
        let (nodes, edges) = self.graph.into_nodes_edges();
        let nodes: Vec<GraphNode> = nodes.into_iter().map(|node| node.weight).collect();
        let edges = edges
            .into_iter()
            .map(|edge| {
                GraphEdge::new(
                    nodes[edge.source().index()].id.clone(),
                    nodes[edge.target().index()].id.clone(),
                    edge.weight,
                )
            })
            .collect();
        (nodes, edges)
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn relative_dir(root: &Path, dir: &Path) -> String {
    match dir.strip_prefix(root) {
        Ok(rel) if rel.as_os_str().is_empty() => ".".to_string(),
        Ok(rel) => rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/"),
        Err(_) => dir.to_string_lossy().into_owned(),
    }
}

fn parent_dir(rel: &str) -> Option<&str> {
    match rel {
        "." => None,
        _ => Some(rel.rsplit_once('/').map_or(".", |(parent, _)| parent)),
    }
}

/// Group files by directory relative to `root` and link every directory to
/// its parent. Directories without files of their own still appear when a
/// descendant holds files, so the tree stays connected.
pub fn build_folder_index(root: &Path, files: &[SourceFile]) -> FolderIndex {
    let mut index = FolderIndex::new();

    for file in files {
        let rel = relative_dir(root, file.directory());
        let entry = index.entry(rel).or_default();
        entry.files.push(file.id());
        entry.total_files += 1;
    }

    let mut pending: Vec<String> = index.keys().cloned().collect();
    while let Some(folder) = pending.pop() {
        let Some(parent) = parent_dir(&folder).map(str::to_string) else {
            continue;
        };
        if !index.contains_key(&parent) {
            pending.push(parent.clone());
        }
        let entry = index.entry(parent).or_default();
        if !entry.subfolders.contains(&folder) {
            entry.subfolders.push(folder);
        }
    }

    for entry in index.values_mut() {
        entry.subfolders.sort();
    }
    index
}

/// One color per language plus `default`.
pub fn language_colors() -> BTreeMap<String, String> {
    Language::ALL
        .iter()
        .map(|language| (language.name().to_string(), language.color().to_string()))
        .chain(std::iter::once(("default".to_string(), DEFAULT_COLOR.to_string())))
        .collect()
}
