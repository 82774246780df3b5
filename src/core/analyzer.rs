use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::aliases::AliasTable;
use super::graph::{
    build_folder_index, language_colors, GraphBuilder, GraphEdge, GraphNode, ProjectGraph,
    SourceFile,
};
use super::resolver::{ModuleResolver, ScanContext};
use super::scanner::{FileInfo, FileScanner};
use crate::config::ScanConfig;
use crate::error::{Result, ScanError};
use crate::parsers::ParserFactory;

/// Scans a project tree and assembles its file dependency graph.
///
/// Extraction runs for every file before any dependency is resolved, so the
/// namespace and type tables are complete when resolution starts.
pub struct ProjectAnalyzer {
    parser_factory: ParserFactory,
    config: Option<ScanConfig>,
}

impl ProjectAnalyzer {
    /// Analyzer that reads `mappath.toml` from each scanned root.
    pub fn new() -> Self {
        Self {
            parser_factory: ParserFactory::new(),
            config: None,
        }
    }

    /// Analyzer with an explicit configuration; `mappath.toml` is not read.
    pub fn with_config(config: ScanConfig) -> Self {
        Self {
            parser_factory: ParserFactory::new(),
            config: Some(config),
        }
    }

    pub async fn analyze_project(&self, root: &Path) -> Result<ProjectGraph> {
        let root = canonical_root(root).await?;
        info!("Scanning {}", root.display());

        let config = self
            .config
            .clone()
            .unwrap_or_else(|| ScanConfig::load(&root));
        let listed = FileScanner::for_root(&root, &config).scan_directory(&root)?;
        info!("Found {} files to analyze", listed.len());

        let mut files = Vec::with_capacity(listed.len());
        for info in &listed {
            if let Some(file) = self.extract(info).await {
                files.push(file);
            }
        }
        info!("Extracted {} files", files.len());

        let aliases = AliasTable::load(&root);
        let ctx = ScanContext::new(root.clone(), aliases, &files);
        debug!(
            "Scan context: {} aliases, {} namespaces, {} public types",
            ctx.aliases.len(),
            ctx.namespaces.len(),
            ctx.types.len()
        );

        let (nodes, edges) = build_edges(&ctx, &files);
        info!("Built graph with {} nodes and {} edges", nodes.len(), edges.len());

        Ok(ProjectGraph {
            folders: build_folder_index(&root, &files),
            language_colors: language_colors(),
            root_path: root,
            files,
            nodes,
            edges,
        })
    }

    /// Read, stat and analyze one file. I/O failures exclude the file.
    async fn extract(&self, info: &FileInfo) -> Option<SourceFile> {
        let metadata = match tokio::fs::metadata(&info.path).await {
            Ok(metadata) => metadata,
            Err(err) => {
                warn!("Failed to stat {}: {err}", info.path.display());
                return None;
            }
        };
        let bytes = match tokio::fs::read(&info.path).await {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!("Failed to read {}: {err}", info.path.display());
                return None;
            }
        };
        let content = String::from_utf8_lossy(&bytes);

        let parser = self.parser_factory.get_parser(info.language);
        let analysis = parser.analyze(&content, &info.path);
        debug!(
            "{}: {} dependencies, {} exports",
            info.path.display(),
            analysis.dependencies.len(),
            analysis.exports.len()
        );
        Some(SourceFile::new(
            info.path.clone(),
            info.language,
            metadata.len(),
            analysis,
        ))
    }
}

impl Default for ProjectAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

async fn canonical_root(root: &Path) -> Result<PathBuf> {
    let canonical = tokio::fs::canonicalize(root)
        .await
        .map_err(|source| ScanError::RootInaccessible {
            path: root.to_path_buf(),
            source,
        })?;
    let metadata = tokio::fs::metadata(&canonical)
        .await
        .map_err(|source| ScanError::RootInaccessible {
            path: canonical.clone(),
            source,
        })?;
    if !metadata.is_dir() {
        return Err(ScanError::NotADirectory { path: canonical });
    }
    Ok(canonical)
}

/// One node per file, one edge per resolved import record.
fn build_edges(ctx: &ScanContext, files: &[SourceFile]) -> (Vec<GraphNode>, Vec<GraphEdge>) {
    let mut builder = GraphBuilder::new();
    for file in files {
        builder.add_node(GraphNode::from_file(file));
    }

    let resolver = ModuleResolver::new(ctx);
    for file in files {
        let from = file.id();
        for record in &file.imports {
            let Some(target) = resolver.resolve(&record.target, file) else {
                continue;
            };
            let to = target.to_string_lossy().into_owned();
            if builder
                .add_edge(GraphEdge::new(from.clone(), to, record.kind))
                .is_some()
            {
                debug!("{} -> {} ({})", file.name, target.display(), record.kind);
            }
        }
    }
    builder.into_parts()
}
