use smallvec::SmallVec;
use std::cmp::Reverse;

use crate::internal::common::Map;
use crate::internal::common::ids::{ResourceTypeId, VertexIdx};
use crate::internal::configuration::MatchPolicy;
use crate::internal::graph::{ResourceGraph, Timestamp};
use crate::internal::matcher::{Claim, ResolvedDemand};

/// What the current match has already taken from a vertex.
#[derive(Debug, Default, Clone, Copy)]
struct PendingUse {
    amount: u64,
    claims: u32,
    exclusive: u32,
}

/// Depth-first matcher of demands against a graph within one time window.
///
/// Claims are only collected; the graph is never modified. Vertices are visited in a
/// fixed order given by [`MatchPolicy`], so the same graph and demands always lead to
/// the same claims.
pub(crate) struct Traverser<'a> {
    graph: &'a ResourceGraph,
    policy: MatchPolicy,
    start: Timestamp,
    end: Timestamp,
    claims: Vec<Claim>,
    pending: Map<VertexIdx, PendingUse>,
    visits: u64,
}

impl<'a> Traverser<'a> {
    pub fn new(
        graph: &'a ResourceGraph,
        policy: MatchPolicy,
        start: Timestamp,
        end: Timestamp,
    ) -> Self {
        Traverser {
            graph,
            policy,
            start,
            end,
            claims: Vec::new(),
            pending: Map::default(),
            visits: 0,
        }
    }

    #[inline]
    pub fn visits(&self) -> u64 {
        self.visits
    }

    /// Returns claims satisfying all demands, or `None` if they do not fit.
    pub fn run(&mut self, demands: &[ResolvedDemand]) -> Option<Vec<Claim>> {
        let root = self.graph.root();
        for demand in demands {
            if !self.match_demand(root, true, demand) {
                self.rollback(0);
                return None;
            }
        }
        Some(std::mem::take(&mut self.claims))
    }

    fn ordered_children(&self, idx: VertexIdx) -> SmallVec<[VertexIdx; 16]> {
        let graph = self.graph;
        let mut children: SmallVec<[VertexIdx; 16]> =
            graph.vertex(idx).children().iter().copied().collect();
        match self.policy {
            MatchPolicy::First => {}
            MatchPolicy::Low => children.sort_by_key(|c| graph.vertex(*c).id()),
            MatchPolicy::High => children.sort_by_key(|c| Reverse(graph.vertex(*c).id())),
        }
        children
    }

    fn is_blocked(&self, idx: VertexIdx) -> bool {
        self.graph
            .vertex(idx)
            .planner()
            .has_exclusive(self.start, self.end)
            || self.pending.get(&idx).is_some_and(|p| p.exclusive > 0)
    }

    /// Nearest vertices of the given type below `scope`, in traversal order.
    /// Subtrees without such a type or held exclusively are skipped.
    fn candidates(
        &self,
        scope: VertexIdx,
        include_scope: bool,
        type_id: ResourceTypeId,
    ) -> Vec<VertexIdx> {
        let mut result = Vec::new();
        let mut stack: Vec<VertexIdx> = if include_scope {
            vec![scope]
        } else {
            self.ordered_children(scope).into_iter().rev().collect()
        };
        while let Some(idx) = stack.pop() {
            let vertex = self.graph.vertex(idx);
            if vertex.subtree_capacity(type_id) == 0 || self.is_blocked(idx) {
                continue;
            }
            if vertex.type_id() == type_id {
                result.push(idx);
                continue;
            }
            stack.extend(self.ordered_children(idx).into_iter().rev());
        }
        result
    }

    /// True if nothing in the subtree is used during the window, neither by committed
    /// jobs nor by this match.
    fn is_whole_idle(&self, idx: VertexIdx) -> bool {
        self.graph.subtree(idx).into_iter().all(|v| {
            self.graph.vertex(v).planner().is_idle(self.start, self.end)
                && !self.pending.contains_key(&v)
        })
    }

    fn free_amount(&self, idx: VertexIdx) -> u64 {
        let available = self
            .graph
            .vertex(idx)
            .planner()
            .available_during(self.start, self.end);
        available.saturating_sub(self.pending.get(&idx).map(|p| p.amount).unwrap_or(0))
    }

    fn push_claim(&mut self, vertex: VertexIdx, amount: u64, exclusive: bool) {
        let pending = self.pending.entry(vertex).or_default();
        pending.amount += amount;
        pending.claims += 1;
        if exclusive {
            pending.exclusive += 1;
        }
        self.claims.push(Claim {
            vertex,
            amount,
            exclusive,
        });
    }

    fn rollback(&mut self, mark: usize) {
        for claim in self.claims.drain(mark..) {
            let is_empty = match self.pending.get_mut(&claim.vertex) {
                Some(pending) => {
                    pending.amount -= claim.amount;
                    pending.claims -= 1;
                    if claim.exclusive {
                        pending.exclusive -= 1;
                    }
                    pending.claims == 0
                }
                None => false,
            };
            if is_empty {
                self.pending.remove(&claim.vertex);
            }
        }
    }

    fn match_demand(
        &mut self,
        scope: VertexIdx,
        include_scope: bool,
        demand: &ResolvedDemand,
    ) -> bool {
        let graph = self.graph;
        let mark = self.claims.len();
        let mut remaining = demand.count;

        for candidate in self.candidates(scope, include_scope, demand.type_id) {
            if remaining == 0 {
                break;
            }
            self.visits += 1;
            let vertex = graph.vertex(candidate);

            if demand.is_leaf() {
                if demand.exclusive || !vertex.is_leaf() {
                    // Whole vertex including everything it contains
                    if !self.is_whole_idle(candidate) {
                        continue;
                    }
                    self.push_claim(candidate, vertex.size(), true);
                    remaining = remaining.saturating_sub(vertex.size());
                } else {
                    let free = self.free_amount(candidate);
                    if free == 0 {
                        continue;
                    }
                    let take = free.min(remaining);
                    self.push_claim(candidate, take, false);
                    remaining -= take;
                }
                continue;
            }

            if self.pending.contains_key(&candidate)
                || (demand.exclusive && !self.is_whole_idle(candidate))
            {
                continue;
            }
            let inner_mark = self.claims.len();
            if demand
                .with
                .iter()
                .all(|child| self.match_demand(candidate, false, child))
            {
                let amount = if demand.exclusive { vertex.size() } else { 0 };
                self.push_claim(candidate, amount, demand.exclusive);
                remaining -= 1;
            } else {
                self.rollback(inner_mark);
            }
        }

        if remaining > 0 {
            log::debug!(
                "Demand for {} x type {} not satisfied in window [{}, {})",
                demand.count,
                demand.type_id,
                self.start,
                self.end
            );
            self.rollback(mark);
            false
        } else {
            true
        }
    }
}
