pub mod json;
pub mod json_compact;
pub mod mermaid;

pub use json::JsonFormatter;
pub use json_compact::JsonCompactFormatter;
pub use mermaid::MermaidFormatter;
