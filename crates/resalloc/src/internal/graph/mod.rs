mod planner;
mod reader;
mod store;
mod types;
mod vertex;
mod writer;

pub use planner::{Planner, Span, Timestamp};
pub use reader::{
    EdgeDescription, EdgeMetadata, GraphBody, GraphDescription, NodeDescription, NodeKey,
    VertexMetadata, VertexPaths,
};
pub use store::ResourceGraph;
pub use types::ResourceTypeMap;
pub use vertex::ResourceVertex;
pub(crate) use writer::{describe_graph, describe_subgraph};
