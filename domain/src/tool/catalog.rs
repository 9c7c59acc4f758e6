//! Tool catalog: the set of tools advertised by the connected server

use super::entities::ToolDescriptor;
use std::collections::HashMap;

/// Ordered, name-unique collection of tool descriptors.
///
/// Keeps the server's listing order for display and prompts.
#[derive(Debug, Clone, Default)]
pub struct ToolCatalog {
    tools: Vec<ToolDescriptor>,
    index: HashMap<String, usize>,
}

impl ToolCatalog {
    /// Build a catalog, keeping the first descriptor for any repeated name.
    pub fn new(tools: impl IntoIterator<Item = ToolDescriptor>) -> Self {
        let mut catalog = Self::default();
        for tool in tools {
            if catalog.index.contains_key(&tool.name) {
                continue;
            }
            catalog.index.insert(tool.name.clone(), catalog.tools.len());
            catalog.tools.push(tool);
        }
        catalog
    }

    pub fn lookup(&self, name: &str) -> Option<&ToolDescriptor> {
        self.index.get(name).map(|&i| &self.tools[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn all(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.iter().map(|t| t.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
