//! # MAPPATH
//!
//! File-level dependency mapping for mixed-language source trees.
//!
//! MAPPATH walks a project, extracts import statements with per-language pattern
//! extractors and resolves each one to a file inside the project, producing a
//! directed graph of files with a folder index and per-language colors.
//!
//! ## Resolution
//!
//! Imports are resolved against bundler/compiler path aliases (`vite.config.*`,
//! `tsconfig.json`, `jsconfig.json`), relative paths, Python packages and
//! C#/Java namespaces. Anything that cannot be mapped to a project file is
//! treated as external and left out of the graph.
//!
//! ## Output Formats
//!
//! - **JSON**: the full graph, pretty-printed
//! - **JSON-Compact**: index-compressed nodes and edges
//! - **Mermaid**: flowchart text
//!
//! ## Supported Languages
//!
//! TypeScript, JavaScript, Vue, Python, C#, Java

pub mod config;
pub mod core;
pub mod error;
pub mod formatters;
pub mod parsers;

pub use crate::core::{ProjectAnalyzer, ProjectGraph};
pub use crate::error::ScanError;
