use crate::internal::common::Map;
use crate::internal::common::ids::ResourceTypeId;

/// Interned names of resource types present in a graph.
#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct ResourceTypeMap {
    names: Vec<String>,
    ids: Map<String, ResourceTypeId>,
}

impl ResourceTypeMap {
    pub fn get_or_allocate(&mut self, name: &str) -> ResourceTypeId {
        match self.ids.get(name) {
            Some(&id) => id,
            None => {
                let id = ResourceTypeId::new(self.names.len() as u32);
                log::debug!("New resource type registered '{name}' as {id}");
                self.names.push(name.to_string());
                self.ids.insert(name.to_string(), id);
                id
            }
        }
    }

    #[inline]
    pub fn get_index(&self, name: &str) -> Option<ResourceTypeId> {
        self.ids.get(name).copied()
    }

    #[inline]
    pub fn get_name(&self, id: ResourceTypeId) -> &str {
        &self.names[id.as_num() as usize]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(|s| s.as_str())
    }
}
