use serde::{Deserialize, Serialize};
use std::fmt;

use crate::internal::common::Map;
use crate::internal::common::error::AllocError;
use crate::internal::common::ids::{ResourceTypeId, VertexId, VertexIdx};
use crate::internal::common::index::IndexVec;
use crate::internal::graph::planner::Planner;
use crate::internal::graph::store::ResourceGraph;
use crate::internal::graph::types::ResourceTypeMap;
use crate::internal::graph::vertex::ResourceVertex;

pub const CONTAINMENT_SUBSYSTEM: &str = "containment";
pub const CONTAINS_RELATION: &str = "contains";

/// Resource graph in JSON Graph Format.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GraphDescription {
    pub graph: GraphBody,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct GraphBody {
    #[serde(default)]
    pub nodes: Vec<NodeDescription>,
    #[serde(default)]
    pub edges: Vec<EdgeDescription>,
}

/// Key of a node inside a description, JGF writers emit both strings and numbers.
#[derive(Serialize, Deserialize, Debug, Clone, Eq, PartialEq, Hash)]
#[serde(untagged)]
pub enum NodeKey {
    Number(u64),
    Text(String),
}

impl NodeKey {
    fn as_vertex_id(&self) -> Option<VertexId> {
        match self {
            NodeKey::Number(n) => Some(VertexId::new(*n)),
            NodeKey::Text(s) => s.parse().ok(),
        }
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKey::Number(n) => write!(f, "{n}"),
            NodeKey::Text(s) => write!(f, "{s}"),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct NodeDescription {
    pub id: NodeKey,
    pub metadata: VertexMetadata,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct VertexPaths {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub containment: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct VertexMetadata {
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Logical id of the vertex among its siblings of the same type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uniq_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusive: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paths: Option<VertexPaths>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct EdgeMetadata {
    /// Relation name per subsystem, e.g. `{"containment": "contains"}`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Map<String, String>>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct EdgeDescription {
    pub source: NodeKey,
    pub target: NodeKey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<EdgeMetadata>,
}

impl EdgeDescription {
    pub fn containment(source: NodeKey, target: NodeKey) -> Self {
        let mut name = Map::default();
        name.insert(
            CONTAINMENT_SUBSYSTEM.to_string(),
            CONTAINS_RELATION.to_string(),
        );
        EdgeDescription {
            source,
            target,
            metadata: Some(EdgeMetadata { name: Some(name) }),
        }
    }

    /// Edges without a relation name are treated as containment edges;
    /// reverse (`in`) edges and other subsystems are skipped.
    fn is_containment(&self) -> bool {
        match self.metadata.as_ref().and_then(|m| m.name.as_ref()) {
            None => true,
            Some(names) => names
                .get(CONTAINMENT_SUBSYSTEM)
                .is_some_and(|rel| rel == CONTAINS_RELATION),
        }
    }
}

fn load_error<T>(message: impl Into<String>) -> crate::Result<T> {
    Err(AllocError::GraphLoadError(message.into()))
}

impl GraphDescription {
    pub fn parse(text: &str) -> crate::Result<Self> {
        serde_json::from_str(text).map_err(|e| AllocError::GraphLoadError(e.to_string()))
    }

    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn into_graph(self) -> crate::Result<ResourceGraph> {
        let GraphBody { nodes, edges } = self.graph;
        if nodes.is_empty() {
            return load_error("graph has no vertices");
        }

        let mut types = ResourceTypeMap::default();
        let mut vertices: IndexVec<VertexIdx, ResourceVertex> = Default::default();
        // Numeric and textual keys of the same number refer to the same node
        let mut keys: Map<String, VertexIdx> = Map::default();
        let mut ids: Map<VertexId, VertexIdx> = Map::default();

        for node in nodes {
            let metadata = node.metadata;
            if metadata.resource_type.is_empty() {
                return load_error(format!("vertex {} has no type", node.id));
            }
            let size = metadata.size.unwrap_or(1);
            if size <= 0 {
                return load_error(format!(
                    "vertex {} has impossible capacity {size}",
                    node.id
                ));
            }
            let Some(id) = metadata.uniq_id.map(VertexId::new).or(node.id.as_vertex_id()) else {
                return load_error(format!("vertex {} has no numeric id", node.id));
            };
            let key = node.id.to_string();
            if ids.contains_key(&id) || keys.contains_key(&key) {
                return load_error(format!("vertex {} defined twice", node.id));
            }

            let type_id = types.get_or_allocate(&metadata.resource_type);
            let logical_id = metadata.id.unwrap_or(-1);
            let basename = metadata
                .basename
                .unwrap_or_else(|| metadata.resource_type.clone());
            let name = metadata.name.unwrap_or_else(|| {
                if logical_id >= 0 {
                    format!("{basename}{logical_id}")
                } else {
                    basename.clone()
                }
            });
            let idx = vertices.push_idx(ResourceVertex {
                id,
                type_id,
                basename,
                name,
                logical_id,
                rank: metadata.rank.unwrap_or(-1),
                unit: metadata.unit.unwrap_or_default(),
                path: metadata.paths.and_then(|p| p.containment),
                parent: None,
                children: Vec::new(),
                subtree_capacity: Map::default(),
                planner: Planner::new(size as u64),
            });
            keys.insert(key, idx);
            ids.insert(id, idx);
        }

        let mut n_edges = 0;
        for edge in edges.iter().filter(|e| e.is_containment()) {
            let (Some(&source), Some(&target)) = (
                keys.get(&edge.source.to_string()),
                keys.get(&edge.target.to_string()),
            ) else {
                return load_error(format!(
                    "edge {} -> {} references an unknown vertex",
                    edge.source, edge.target
                ));
            };
            if source == target {
                return load_error(format!("vertex {} contains itself", edge.source));
            }
            if vertices[target].parent.is_some() {
                return load_error(format!("vertex {} has more than one parent", edge.target));
            }
            vertices[target].parent = Some(source);
            vertices[source].children.push(target);
            n_edges += 1;
        }

        let mut roots = vertices.indices().filter(|idx| vertices[*idx].parent.is_none());
        let root = match (roots.next(), roots.next()) {
            (Some(root), None) => root,
            (None, _) => return load_error("graph has no root vertex"),
            (Some(_), Some(_)) => return load_error("graph has more than one root vertex"),
        };

        let order = preorder(&vertices, root);
        if order.len() != vertices.len() {
            return load_error("graph contains a cycle");
        }
        for idx in order.into_iter().rev() {
            let mut capacity: Map<ResourceTypeId, u64> = Map::default();
            capacity.insert(vertices[idx].type_id, vertices[idx].size());
            for child in &vertices[idx].children {
                for (type_id, size) in &vertices[*child].subtree_capacity {
                    let total = capacity.entry(*type_id).or_default();
                    let Some(sum) = total.checked_add(*size) else {
                        return load_error(format!(
                            "capacity of type '{}' overflows",
                            types.get_name(*type_id)
                        ));
                    };
                    *total = sum;
                }
            }
            vertices[idx].subtree_capacity = capacity;
        }

        log::debug!(
            "Resource graph loaded: {} vertices, {} edges, {} types",
            vertices.len(),
            n_edges,
            types.len()
        );
        Ok(ResourceGraph::new(vertices, root, types, n_edges))
    }
}

fn preorder(vertices: &IndexVec<VertexIdx, ResourceVertex>, root: VertexIdx) -> Vec<VertexIdx> {
    let mut order = Vec::with_capacity(vertices.len());
    let mut stack = vec![root];
    while let Some(idx) = stack.pop() {
        order.push(idx);
        stack.extend(vertices[idx].children.iter().rev().copied());
    }
    order
}
