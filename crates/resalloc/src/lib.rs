#[macro_use]
pub mod internal;

pub use crate::internal::common::ids::{JobId, ResourceTypeId, VertexId, VertexIdx};
pub use crate::internal::common::utils::format_comma_delimited;
pub use crate::internal::common::{Map, Set};

pub use crate::internal::configuration::{
    MatchPolicy, MatcherConfiguration, MatcherConfigurationBuilder,
};
pub use crate::internal::context::{Context, ContextStats, JobInfo, MatchResult};

pub type Error = internal::common::error::AllocError;
pub type Result<T> = std::result::Result<T, Error>;

pub mod graph {
    pub use crate::internal::graph::{
        EdgeDescription, EdgeMetadata, GraphBody, GraphDescription, NodeDescription, NodeKey,
        Planner, ResourceGraph, ResourceTypeMap, ResourceVertex, Span, Timestamp,
        VertexMetadata, VertexPaths,
    };
}

pub mod jobspec {
    pub use crate::internal::jobspec::{
        CountSpec, DemandNode, Jobspec, JobspecDocument, ResourceEntry, normalize,
    };
}

pub mod ledger {
    pub use crate::internal::ledger::{JobLedger, JobRecord, JobState, MatchStatistics};
}
