use anyhow::Result;

use crate::core::ProjectGraph;

/// Full graph as pretty-printed JSON, field names as in [`ProjectGraph`].
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn format_graph(&self, graph: &ProjectGraph) -> Result<String> {
        let content = if self.pretty {
            serde_json::to_string_pretty(graph)?
        } else {
            serde_json::to_string(graph)?
        };
        Ok(content)
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}
