mod traverser;

use crate::internal::common::error::AllocError;
use crate::internal::common::ids::{ResourceTypeId, VertexIdx};
use crate::internal::configuration::MatcherConfiguration;
use crate::internal::graph::{ResourceGraph, ResourceTypeMap, Timestamp};
use crate::internal::jobspec::DemandNode;

pub(crate) use traverser::Traverser;

/// Part of a vertex taken by a match.
///
/// Container vertices that were only traversed through carry `amount == 0`.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) struct Claim {
    pub vertex: VertexIdx,
    pub amount: u64,
    pub exclusive: bool,
}

/// Demand with its resource type resolved against a concrete graph.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedDemand {
    pub type_id: ResourceTypeId,
    pub count: u64,
    pub exclusive: bool,
    pub with: Vec<ResolvedDemand>,
}

impl ResolvedDemand {
    pub fn resolve(demand: &DemandNode, types: &ResourceTypeMap) -> crate::Result<Self> {
        let Some(type_id) = types.get_index(&demand.resource_type) else {
            return Err(AllocError::UnknownResourceType(
                demand.resource_type.clone(),
            ));
        };
        Ok(ResolvedDemand {
            type_id,
            count: demand.count,
            exclusive: demand.exclusive,
            with: demand
                .with
                .iter()
                .map(|child| Self::resolve(child, types))
                .collect::<crate::Result<_>>()?,
        })
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.with.is_empty()
    }
}

pub(crate) fn resolve_demands(
    demands: &[DemandNode],
    types: &ResourceTypeMap,
) -> crate::Result<Vec<ResolvedDemand>> {
    demands
        .iter()
        .map(|d| ResolvedDemand::resolve(d, types))
        .collect()
}

#[derive(Debug)]
pub(crate) struct MatchOutcome {
    pub claims: Vec<Claim>,
    pub start: Timestamp,
    pub reserved: bool,
    /// Number of vertices considered as candidates by the traversal
    pub visits: u64,
}

/// Finds a placement for the demands, either right now or (if `or_else_reserve`)
/// at the earliest moment when some committed span ends and the demands fit.
///
/// The graph is not modified.
pub(crate) fn match_demands(
    graph: &ResourceGraph,
    configuration: &MatcherConfiguration,
    demands: &[ResolvedDemand],
    duration: Timestamp,
    or_else_reserve: bool,
) -> crate::Result<MatchOutcome> {
    let horizon = configuration.horizon_secs();
    if duration > horizon {
        return Err(AllocError::InsufficientResources(format!(
            "duration {duration}s exceeds the planning horizon {horizon}s"
        )));
    }

    let mut visits = 0;
    let try_at = |start: Timestamp, visits: &mut u64| {
        let mut traverser = Traverser::new(graph, configuration.policy, start, start + duration);
        let claims = traverser.run(demands);
        *visits += traverser.visits();
        claims
    };

    if let Some(claims) = try_at(0, &mut visits) {
        return Ok(MatchOutcome {
            claims,
            start: 0,
            reserved: false,
            visits,
        });
    }
    if or_else_reserve {
        for start in graph
            .span_end_times()
            .into_iter()
            .filter(|t| *t > 0 && *t <= horizon - duration)
        {
            if let Some(claims) = try_at(start, &mut visits) {
                return Ok(MatchOutcome {
                    claims,
                    start,
                    reserved: true,
                    visits,
                });
            }
        }
    }
    Err(AllocError::InsufficientResources(if or_else_reserve {
        "no placement available within the planning horizon".to_string()
    } else {
        "no placement available now".to_string()
    }))
}
