//! Pending edits, keyed by the node they apply to.

use jsmorph_syntax::NodeId;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InsertPosition {
    Before,
    After,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Insertion {
    pub position: InsertPosition,
    pub statement: NodeId,
}

/// The three pending-edit tables consumed by one apply.
///
/// A node is never both replaced and deleted: deleting drops any pending
/// replacement, and a replacement queued against a node already marked
/// for deletion is ignored.
#[derive(Debug, Default)]
pub struct MutationQueue {
    pub(crate) replacements: FxHashMap<NodeId, NodeId>,
    pub(crate) deletions: FxHashSet<NodeId>,
    pub(crate) insertions: FxHashMap<NodeId, Vec<Insertion>>,
}

impl MutationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.replacements.is_empty() && self.deletions.is_empty() && self.insertions.is_empty()
    }

    /// Returns `false` when the target is already queued for deletion.
    pub fn replace(&mut self, target: NodeId, replacement: NodeId) -> bool {
        if self.deletions.contains(&target) {
            debug!(?target, "ignoring replacement of a node queued for deletion");
            return false;
        }
        self.replacements.insert(target, replacement);
        true
    }

    pub fn delete(&mut self, target: NodeId) {
        self.replacements.remove(&target);
        self.deletions.insert(target);
    }

    /// Several insertions against one anchor keep their queuing order.
    pub fn insert(&mut self, anchor: NodeId, position: InsertPosition, statement: NodeId) {
        self.insertions
            .entry(anchor)
            .or_default()
            .push(Insertion { position, statement });
    }

    pub fn pending_replacement(&self, target: NodeId) -> Option<NodeId> {
        self.replacements.get(&target).copied()
    }

    pub fn is_deletion_pending(&self, target: NodeId) -> bool {
        self.deletions.contains(&target)
    }

    pub fn len(&self) -> usize {
        self.replacements.len()
            + self.deletions.len()
            + self.insertions.values().map(Vec::len).sum::<usize>()
    }

    pub fn clear(&mut self) {
        self.replacements.clear();
        self.deletions.clear();
        self.insertions.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsmorph_syntax::{Ast, Node};

    fn ids(count: usize) -> Vec<NodeId> {
        let mut ast = Ast::new();
        (0..count).map(|_| ast.alloc(Node::EmptyStatement)).collect()
    }

    #[test]
    fn test_delete_drops_pending_replacement() {
        let ids = ids(2);
        let mut queue = MutationQueue::new();
        assert!(queue.replace(ids[0], ids[1]));
        queue.delete(ids[0]);
        assert_eq!(queue.pending_replacement(ids[0]), None);
        assert!(queue.is_deletion_pending(ids[0]));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_replace_after_delete_is_ignored() {
        let ids = ids(2);
        let mut queue = MutationQueue::new();
        queue.delete(ids[0]);
        assert!(!queue.replace(ids[0], ids[1]));
        assert_eq!(queue.pending_replacement(ids[0]), None);
    }

    #[test]
    fn test_last_replacement_wins() {
        let ids = ids(3);
        let mut queue = MutationQueue::new();
        queue.replace(ids[0], ids[1]);
        queue.replace(ids[0], ids[2]);
        assert_eq!(queue.pending_replacement(ids[0]), Some(ids[2]));
    }

    #[test]
    fn test_clear() {
        let ids = ids(2);
        let mut queue = MutationQueue::new();
        queue.insert(ids[0], InsertPosition::After, ids[1]);
        assert!(!queue.is_empty());
        queue.clear();
        assert!(queue.is_empty());
    }
}
