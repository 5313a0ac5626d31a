//! Element to render-object association.

use std::collections::HashMap;

use crate::element::ElementId;
use crate::surface::ObjectId;

/// Side table mapping elements to their render objects.
///
/// Entries are rebuilt by the refresh routine; the model never holds object
/// handles itself.
#[derive(Debug, Clone, Default)]
pub struct ObjectTable {
    by_element: HashMap<ElementId, ObjectId>,
}

impl ObjectTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, element: ElementId) -> Option<ObjectId> {
        self.by_element.get(&element).copied()
    }

    /// Associate an object, returning the one it replaced.
    pub fn insert(&mut self, element: ElementId, object: ObjectId) -> Option<ObjectId> {
        self.by_element.insert(element, object)
    }

    pub fn remove(&mut self, element: ElementId) -> Option<ObjectId> {
        self.by_element.remove(&element)
    }

    /// Reverse lookup.
    pub fn element_for(&self, object: ObjectId) -> Option<ElementId> {
        self.by_element
            .iter()
            .find(|(_, o)| **o == object)
            .map(|(e, _)| *e)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ElementId, ObjectId)> + '_ {
        self.by_element.iter().map(|(e, o)| (*e, *o))
    }

    pub fn len(&self) -> usize {
        self.by_element.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_element.is_empty()
    }

    /// Drop every association, returning the old objects.
    pub fn drain(&mut self) -> Vec<(ElementId, ObjectId)> {
        self.by_element.drain().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_both_ways() {
        let mut table = ObjectTable::new();
        let element = ElementId::new();
        let object = ObjectId::from_raw(7);
        assert_eq!(table.insert(element, object), None);
        assert_eq!(table.get(element), Some(object));
        assert_eq!(table.element_for(object), Some(element));

        assert_eq!(
            table.insert(element, ObjectId::from_raw(8)),
            Some(object)
        );
        assert_eq!(table.element_for(object), None);
        assert_eq!(table.drain().len(), 1);
        assert!(table.is_empty());
    }
}
