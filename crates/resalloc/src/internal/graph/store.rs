use crate::internal::common::Map;
use crate::internal::common::ids::{JobId, ResourceTypeId, VertexId, VertexIdx};
use crate::internal::common::index::IndexVec;
use crate::internal::graph::planner::{Span, Timestamp};
use crate::internal::graph::types::ResourceTypeMap;
use crate::internal::graph::vertex::ResourceVertex;
use crate::internal::matcher::Claim;

/// Containment tree of resource vertices.
///
/// The graph owns all vertices in a single arena; parents refer to their children by
/// arena index. `index` maps the public vertex id to the arena slot.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ResourceGraph {
    vertices: IndexVec<VertexIdx, ResourceVertex>,
    root: VertexIdx,
    index: Map<VertexId, VertexIdx>,
    types: ResourceTypeMap,
    n_edges: usize,
}

impl ResourceGraph {
    pub(crate) fn new(
        vertices: IndexVec<VertexIdx, ResourceVertex>,
        root: VertexIdx,
        types: ResourceTypeMap,
        n_edges: usize,
    ) -> Self {
        let index = vertices
            .iter()
            .enumerate()
            .map(|(i, v)| (v.id, VertexIdx::new(i as u32)))
            .collect();
        ResourceGraph {
            vertices,
            root,
            index,
            types,
            n_edges,
        }
    }

    #[inline]
    pub fn root(&self) -> VertexIdx {
        self.root
    }

    #[inline]
    pub fn vertex(&self, idx: VertexIdx) -> &ResourceVertex {
        &self.vertices[idx]
    }

    #[inline]
    pub fn vertices(&self) -> impl Iterator<Item = &ResourceVertex> {
        self.vertices.iter()
    }

    #[inline]
    pub fn lookup(&self, id: VertexId) -> Option<VertexIdx> {
        self.index.get(&id).copied()
    }

    #[inline]
    pub fn types(&self) -> &ResourceTypeMap {
        &self.types
    }

    #[inline]
    pub fn n_vertices(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn n_edges(&self) -> usize {
        self.n_edges
    }

    /// Vertices of the subtree rooted in `idx` in depth-first pre-order.
    pub fn subtree(&self, idx: VertexIdx) -> Vec<VertexIdx> {
        let mut result = Vec::new();
        let mut stack = vec![idx];
        while let Some(idx) = stack.pop() {
            result.push(idx);
            stack.extend(self.vertices[idx].children.iter().rev().copied());
        }
        result
    }

    /// All distinct moments at which some committed span ends, ascending.
    pub fn span_end_times(&self) -> Vec<Timestamp> {
        let mut times: Vec<Timestamp> = self
            .vertices
            .iter()
            .flat_map(|v| v.planner.end_times())
            .collect();
        times.sort_unstable();
        times.dedup();
        times
    }

    /// Free units of the given type at the instant `at`.
    /// Subtrees held exclusively by some job do not count as free.
    pub fn available(&self, type_id: ResourceTypeId, at: Timestamp) -> u64 {
        let mut free = 0;
        let mut stack = vec![self.root];
        while let Some(idx) = stack.pop() {
            let vertex = &self.vertices[idx];
            if vertex.subtree_capacity(type_id) == 0 || vertex.planner.has_exclusive_at(at) {
                continue;
            }
            if vertex.type_id == type_id {
                free += vertex.size().saturating_sub(vertex.planner.used_at(at));
            }
            stack.extend(vertex.children.iter().copied());
        }
        free
    }

    pub(crate) fn commit(
        &mut self,
        job_id: JobId,
        claims: &[Claim],
        start: Timestamp,
        end: Timestamp,
    ) {
        for claim in claims.iter().filter(|c| c.amount > 0) {
            self.vertices[claim.vertex].planner.add_span(Span {
                job_id,
                start,
                end,
                amount: claim.amount,
                exclusive: claim.exclusive,
            });
        }
    }

    /// Drops every span of the job from the given vertices.
    pub(crate) fn release(&mut self, job_id: JobId, vertices: &[VertexId]) -> usize {
        let mut removed = 0;
        for vertex_id in vertices {
            match self.index.get(vertex_id) {
                Some(&idx) => removed += self.vertices[idx].planner.remove_job(job_id),
                None => log::warn!("Releasing job {job_id} from unknown vertex {vertex_id}"),
            }
        }
        removed
    }

    pub fn validate(&self) {
        #[cfg(debug_assertions)]
        for (i, vertex) in self.vertices.iter().enumerate() {
            vertex.planner.validate();
            for child in &vertex.children {
                assert_eq!(self.vertices[*child].parent, Some(VertexIdx::new(i as u32)));
            }
        }
    }
}
