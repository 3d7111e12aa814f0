use crate::internal::common::Map;
use crate::internal::common::ids::{ResourceTypeId, VertexId, VertexIdx};
use crate::internal::graph::planner::Planner;

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ResourceVertex {
    pub(crate) id: VertexId,
    pub(crate) type_id: ResourceTypeId,
    pub(crate) basename: String,
    pub(crate) name: String,
    pub(crate) logical_id: i64,
    pub(crate) rank: i64,
    pub(crate) unit: String,
    pub(crate) path: Option<String>,

    pub(crate) parent: Option<VertexIdx>,
    pub(crate) children: Vec<VertexIdx>,

    /// Total size of each resource type in the subtree rooted here (including this vertex).
    /// It does not change after the graph is loaded.
    pub(crate) subtree_capacity: Map<ResourceTypeId, u64>,

    pub(crate) planner: Planner,
}

impl ResourceVertex {
    #[inline]
    pub fn id(&self) -> VertexId {
        self.id
    }

    #[inline]
    pub fn type_id(&self) -> ResourceTypeId {
        self.type_id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn size(&self) -> u64 {
        self.planner.size()
    }

    #[inline]
    pub fn parent(&self) -> Option<VertexIdx> {
        self.parent
    }

    #[inline]
    pub fn children(&self) -> &[VertexIdx] {
        &self.children
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    #[inline]
    pub fn planner(&self) -> &Planner {
        &self.planner
    }

    #[inline]
    pub fn subtree_capacity(&self, type_id: ResourceTypeId) -> u64 {
        self.subtree_capacity.get(&type_id).copied().unwrap_or(0)
    }
}
