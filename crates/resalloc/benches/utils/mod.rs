use resalloc::Context;
use resalloc::graph::{
    EdgeDescription, GraphBody, GraphDescription, NodeDescription, NodeKey, VertexMetadata,
};

fn vertex(id: u64, resource_type: &str, logical_id: i64) -> NodeDescription {
    NodeDescription {
        id: NodeKey::Text(id.to_string()),
        metadata: VertexMetadata {
            resource_type: resource_type.to_string(),
            id: Some(logical_id),
            uniq_id: Some(id),
            ..Default::default()
        },
    }
}

/// cluster -> `nodes` x node -> `cores` x core
pub fn cluster_description(nodes: u64, cores: u64) -> String {
    let mut body = GraphBody::default();
    body.nodes.push(vertex(0, "cluster", 0));
    let mut next_id = 1;
    for n in 0..nodes {
        let node_id = next_id;
        next_id += 1;
        body.nodes.push(vertex(node_id, "node", n as i64));
        body.edges.push(EdgeDescription::containment(
            NodeKey::Text("0".to_string()),
            NodeKey::Text(node_id.to_string()),
        ));
        for c in 0..cores {
            body.nodes.push(vertex(next_id, "core", (n * cores + c) as i64));
            body.edges.push(EdgeDescription::containment(
                NodeKey::Text(node_id.to_string()),
                NodeKey::Text(next_id.to_string()),
            ));
            next_id += 1;
        }
    }
    GraphDescription { graph: body }.to_json().unwrap()
}

pub fn core_jobspec(count: u64) -> String {
    format!(r#"{{"version": 1, "resources": [{{"type": "core", "count": {count}}}]}}"#)
}

pub fn create_context(nodes: u64, cores: u64) -> Context {
    let context = Context::create();
    context
        .initialize(&cluster_description(nodes, cores))
        .unwrap();
    context
}
