pub mod aliases;
pub mod analyzer;
pub mod graph;
pub mod ignore;
pub mod namespaces;
pub mod resolver;
pub mod scanner;

pub use aliases::AliasTable;
pub use analyzer::ProjectAnalyzer;
pub use graph::{
    DependencyGraph, FolderEntry, FolderIndex, GraphBuilder, GraphEdge, GraphNode, ProjectGraph,
    SourceFile,
};
pub use ignore::IgnoreRules;
pub use namespaces::{NamespaceTable, TypeTable};
pub use resolver::{ModuleResolver, ScanContext};
pub use scanner::{FileInfo, FileScanner, ProjectRoot};
