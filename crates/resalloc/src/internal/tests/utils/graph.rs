use serde_json::{Value, json};

use crate::internal::common::Map;

/// Builds a graph description in which vertex ids are assigned in insertion order,
/// starting with the `cluster` root (id 0).
pub struct GraphBuilder {
    nodes: Vec<Value>,
    edges: Vec<Value>,
    paths: Vec<String>,
    counters: Map<String, i64>,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphBuilder {
    pub fn new() -> GraphBuilder {
        let mut builder = GraphBuilder {
            nodes: Vec::new(),
            edges: Vec::new(),
            paths: Vec::new(),
            counters: Map::default(),
        };
        builder.add_vertex(None, "cluster", 1);
        builder
    }

    pub fn root(&self) -> u64 {
        0
    }

    pub fn add(&mut self, parent: u64, resource_type: &str, size: u64) -> u64 {
        self.add_vertex(Some(parent), resource_type, size)
    }

    fn add_vertex(&mut self, parent: Option<u64>, resource_type: &str, size: u64) -> u64 {
        let id = self.nodes.len() as u64;
        let counter = self.counters.entry(resource_type.to_string()).or_default();
        let logical_id = *counter;
        *counter += 1;

        let name = format!("{resource_type}{logical_id}");
        let path = match parent {
            Some(parent) => format!("{}/{name}", self.paths[parent as usize]),
            None => format!("/{name}"),
        };
        self.nodes.push(json!({
            "id": id.to_string(),
            "metadata": {
                "type": resource_type,
                "basename": resource_type,
                "name": name,
                "id": logical_id,
                "uniq_id": id,
                "rank": -1,
                "exclusive": false,
                "unit": if resource_type == "memory" { "GB" } else { "" },
                "size": size,
                "paths": {"containment": path},
            }
        }));
        self.paths.push(path);
        if let Some(parent) = parent {
            self.edges.push(json!({
                "source": parent.to_string(),
                "target": id.to_string(),
                "metadata": {"name": {"containment": "contains"}}
            }));
        }
        id
    }

    pub fn build(&self) -> String {
        json!({"graph": {"nodes": self.nodes, "edges": self.edges}}).to_string()
    }
}

/// cluster -> `nodes` x node -> `cores` x core
pub fn simple_cluster(nodes: usize, cores: usize) -> String {
    let mut builder = GraphBuilder::new();
    for _ in 0..nodes {
        let node = builder.add(builder.root(), "node", 1);
        for _ in 0..cores {
            builder.add(node, "core", 1);
        }
    }
    builder.build()
}
