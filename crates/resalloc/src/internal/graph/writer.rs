use crate::internal::common::Map;
use crate::internal::common::ids::VertexIdx;
use crate::internal::graph::reader::{
    EdgeDescription, GraphBody, GraphDescription, NodeDescription, NodeKey, VertexMetadata,
    VertexPaths,
};
use crate::internal::graph::store::ResourceGraph;
use crate::internal::graph::vertex::ResourceVertex;
use crate::internal::matcher::Claim;

fn vertex_key(vertex: &ResourceVertex) -> NodeKey {
    NodeKey::Text(vertex.id.to_string())
}

fn describe_vertex(graph: &ResourceGraph, vertex: &ResourceVertex, size: u64) -> NodeDescription {
    NodeDescription {
        id: vertex_key(vertex),
        metadata: VertexMetadata {
            resource_type: graph.types().get_name(vertex.type_id).to_string(),
            basename: Some(vertex.basename.clone()),
            name: Some(vertex.name.clone()),
            id: Some(vertex.logical_id),
            uniq_id: Some(vertex.id.as_num()),
            rank: Some(vertex.rank),
            exclusive: None,
            unit: (!vertex.unit.is_empty()).then(|| vertex.unit.clone()),
            size: Some(size as i64),
            paths: vertex.path.as_ref().map(|path| VertexPaths {
                containment: Some(path.clone()),
            }),
        },
    }
}

/// Writes the whole graph in the same format it was loaded from.
pub(crate) fn describe_graph(graph: &ResourceGraph) -> crate::Result<String> {
    let mut body = GraphBody::default();
    for idx in graph.subtree(graph.root()) {
        let vertex = graph.vertex(idx);
        body.nodes.push(describe_vertex(graph, vertex, vertex.size()));
        if let Some(parent) = vertex.parent {
            body.edges.push(EdgeDescription::containment(
                vertex_key(graph.vertex(parent)),
                vertex_key(vertex),
            ));
        }
    }
    GraphDescription { graph: body }.to_json()
}

/// Writes the subgraph touched by an allocation: claimed vertices and all their ancestors.
///
/// Vertices that took capacity carry the claimed amount as their size, the others size 1,
/// so the result can be loaded again as a graph.
pub(crate) fn describe_subgraph(graph: &ResourceGraph, claims: &[Claim]) -> crate::Result<String> {
    let mut amounts: Map<VertexIdx, u64> = Map::default();
    for claim in claims {
        *amounts.entry(claim.vertex).or_default() += claim.amount;
        let mut current = graph.vertex(claim.vertex).parent;
        while let Some(idx) = current {
            amounts.entry(idx).or_default();
            current = graph.vertex(idx).parent;
        }
    }

    let mut body = GraphBody::default();
    for idx in graph.subtree(graph.root()) {
        let Some(&amount) = amounts.get(&idx) else {
            continue;
        };
        let vertex = graph.vertex(idx);
        body.nodes.push(describe_vertex(graph, vertex, amount.max(1)));
        if let Some(parent) = vertex.parent {
            body.edges.push(EdgeDescription::containment(
                vertex_key(graph.vertex(parent)),
                vertex_key(vertex),
            ));
        }
    }
    GraphDescription { graph: body }.to_json()
}
