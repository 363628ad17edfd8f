//! Arena of immutable part templates.

use std::collections::HashMap;
use std::sync::Arc;

use slotmap::{new_key_type, SlotMap};

use crate::node::MeshNode;

new_key_type! {
    /// Handle to a cached template.
    pub struct TemplateId;
}

/// Built part templates keyed by canonical name.
///
/// A template is inserted only once its whole subtree built successfully,
/// so a failed build never leaves an entry behind.
#[derive(Debug, Default)]
pub struct TemplateCache {
    arena: SlotMap<TemplateId, Arc<MeshNode>>,
    by_name: HashMap<String, TemplateId>,
}

impl TemplateCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Template for a canonical name.
    pub fn get(&self, name: &str) -> Option<&Arc<MeshNode>> {
        self.by_name.get(name).and_then(|id| self.arena.get(*id))
    }

    /// Template by handle.
    pub fn get_by_id(&self, id: TemplateId) -> Option<&Arc<MeshNode>> {
        self.arena.get(id)
    }

    /// Handle for a canonical name.
    pub fn id(&self, name: &str) -> Option<TemplateId> {
        self.by_name.get(name).copied()
    }

    /// Whether a template exists for `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Store a template, replacing any previous one with the same name.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        template: impl Into<Arc<MeshNode>>,
    ) -> TemplateId {
        let name = name.into();
        if let Some(old) = self.by_name.remove(&name) {
            self.arena.remove(old);
        }
        let id = self.arena.insert(template.into());
        self.by_name.insert(name, id);
        id
    }

    /// Drop the template for `name`.
    pub fn remove(&mut self, name: &str) -> Option<Arc<MeshNode>> {
        let id = self.by_name.remove(name)?;
        self.arena.remove(id)
    }

    /// Number of templates.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Names of all templates, unordered.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brickmesh_library::PartKind;

    #[test]
    fn test_insert_get_remove() {
        let mut cache = TemplateCache::new();
        let id = cache.insert("a.dat", MeshNode::new("a.dat", PartKind::Part));
        assert_eq!(cache.id("a.dat"), Some(id));
        assert_eq!(cache.get("a.dat").unwrap().name, "a.dat");
        assert!(cache.get_by_id(id).is_some());

        let replaced = cache.insert("a.dat", MeshNode::new("a2", PartKind::Part));
        assert_ne!(replaced, id);
        assert!(cache.get_by_id(id).is_none());
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("a.dat").unwrap().name, "a2");

        assert!(cache.remove("a.dat").is_some());
        assert!(cache.is_empty());
        assert!(cache.remove("a.dat").is_none());
    }
}
