use crate::internal::context::Context;
use crate::internal::graph::Timestamp;

/// Context initialized with the given graph description.
pub fn create_test_context(graph: &str) -> Context {
    let context = Context::create();
    context.initialize(graph).unwrap();
    context
}

pub fn free_cores(context: &Context, at: Timestamp) -> u64 {
    context.available("core", at).unwrap()
}

/// Checks that no vertex is used over its capacity at any instant.
pub fn check_capacity(context: &Context) {
    context.with_graph(|graph| {
        graph.validate();
        for vertex in graph.vertices() {
            let planner = vertex.planner();
            for span in planner.spans() {
                assert!(
                    planner.used_at(span.start) <= vertex.size(),
                    "vertex {} overcommitted at {}",
                    vertex.id(),
                    span.start
                );
            }
        }
    });
}
