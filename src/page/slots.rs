//! Handle table for host elements.

use super::NodeRef;

/// Append-only table mapping [`NodeRef`]s to host elements.
///
/// Releasing a handle drops the element but keeps its index retired, so a
/// handle held past removal resolves to nothing instead of to a newer element.
#[derive(Debug, Clone)]
pub struct Slots<E> {
    items: Vec<Option<E>>,
}

impl<E> Default for Slots<E> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<E> Slots<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `element` under a fresh handle.
    pub fn insert(&mut self, element: E) -> NodeRef {
        let node = NodeRef::new(self.items.len() as u32);
        self.items.push(Some(element));
        node
    }

    pub fn get(&self, node: NodeRef) -> Option<&E> {
        self.items.get(node.index())?.as_ref()
    }

    /// Drops the table's hold on `node`, returning the element.
    pub fn release(&mut self, node: NodeRef) -> Option<E> {
        self.items.get_mut(node.index())?.take()
    }

    /// Number of elements still held.
    pub fn live(&self) -> usize {
        self.items.iter().flatten().count()
    }
}
