//! Materializes a [`MutationQueue`] in one bottom-up pass.
//!
//! Each reachable node is visited once, children first. When a node is
//! left, the rules run in this order: empty declarations are pruned, a
//! pending replacement is substituted, pending insertions around the node's
//! children are spliced into the statement list that holds them, and a
//! pending deletion removes the node. Replacement subtrees are taken as
//! given and not visited.

use jsmorph_syntax::ast::SlotMut;
use jsmorph_syntax::{Ast, Node, NodeId};
use rustc_hash::FxHashMap;
use serde::Serialize;
use tracing::{debug, warn};

use super::queue::{InsertPosition, Insertion, MutationQueue};

/// What one apply did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    pub replaced: usize,
    pub deleted: usize,
    pub inserted: usize,
    /// Emptied variable declarations removed along the way.
    pub pruned: usize,
    /// Queued edits that could not be carried out.
    pub dropped: usize,
}

impl ApplyReport {
    pub fn is_noop(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Keep(NodeId),
    Remove,
}

struct Applier<'a> {
    ast: &'a mut Ast,
    queue: MutationQueue,
    outcomes: FxHashMap<NodeId, Outcome>,
    report: ApplyReport,
}

/// Applies `queue` to the tree at `root` and returns the new root.
pub(crate) fn apply_queue(
    ast: &mut Ast,
    root: NodeId,
    queue: MutationQueue,
) -> (NodeId, ApplyReport) {
    let mut applier = Applier {
        ast,
        queue,
        outcomes: FxHashMap::default(),
        report: ApplyReport::default(),
    };
    let new_root = match applier.process(root) {
        Outcome::Keep(id) => id,
        Outcome::Remove => applier.ast.alloc(Node::Script {
            statements: Vec::new(),
        }),
    };
    applier.drop_leftovers();
    (new_root, applier.report)
}

impl Applier<'_> {
    fn process(&mut self, id: NodeId) -> Outcome {
        if let Some(outcome) = self.outcomes.get(&id) {
            return *outcome;
        }

        let mut node = self.ast[id].clone();
        let statement_list = node.has_statement_list();
        let is_declaration_statement = matches!(node, Node::VariableDeclarationStatement { .. });
        let mut prune = false;

        for slot in node.slots_mut() {
            match slot {
                SlotMut::Required(child) => match self.process(*child) {
                    Outcome::Keep(new) => *child = new,
                    Outcome::Remove if is_declaration_statement => prune = true,
                    Outcome::Remove if self.ast[*child].is_statement() => {
                        *child = self.ast.alloc(Node::EmptyStatement);
                    }
                    Outcome::Remove => {
                        warn!(
                            parent = %self.ast.kind(id),
                            child = %self.ast.kind(*child),
                            "cannot remove a required child; keeping it"
                        );
                        self.report.dropped += 1;
                    }
                },
                SlotMut::Optional(child) => {
                    if let Some(old) = *child {
                        *child = match self.process(old) {
                            Outcome::Keep(new) => Some(new),
                            Outcome::Remove => None,
                        };
                    }
                }
                SlotMut::List(children) => {
                    let old = std::mem::take(children);
                    for child in old {
                        let insertions = if statement_list {
                            self.queue.insertions.remove(&child).unwrap_or_default()
                        } else {
                            Vec::new()
                        };
                        self.splice(&insertions, InsertPosition::Before, children);
                        if let Outcome::Keep(new) = self.process(child) {
                            children.push(new);
                        }
                        self.splice(&insertions, InsertPosition::After, children);
                    }
                }
                SlotMut::SparseList(children) => {
                    let old = std::mem::take(children);
                    for child in old {
                        match child.map(|c| self.process(c)) {
                            None => children.push(None),
                            Some(Outcome::Keep(new)) => children.push(Some(new)),
                            Some(Outcome::Remove) => {}
                        }
                    }
                }
            }
        }

        if matches!(&node, Node::VariableDeclaration { declarators, .. } if declarators.is_empty()) {
            prune = true;
        }
        self.ast[id] = node;

        let outcome = if prune {
            self.report.pruned += 1;
            Outcome::Remove
        } else if let Some(replacement) = self.queue.replacements.remove(&id) {
            self.report.replaced += 1;
            self.outcomes
                .get(&replacement)
                .copied()
                .unwrap_or(Outcome::Keep(replacement))
        } else if self.queue.deletions.remove(&id) {
            self.report.deleted += 1;
            Outcome::Remove
        } else {
            Outcome::Keep(id)
        };
        // A pruned declaration may still carry a queued edit of its own.
        if prune {
            self.queue.replacements.remove(&id);
            self.queue.deletions.remove(&id);
        }

        self.outcomes.insert(id, outcome);
        outcome
    }

    fn splice(&mut self, insertions: &[Insertion], position: InsertPosition, out: &mut Vec<NodeId>) {
        for insertion in insertions.iter().filter(|i| i.position == position) {
            out.push(insertion.statement);
            self.report.inserted += 1;
        }
    }

    fn drop_leftovers(&mut self) {
        for (anchor, insertions) in self.queue.insertions.drain() {
            debug!(
                anchor = %self.ast.kind(anchor),
                count = insertions.len(),
                "insertion anchor is not in a statement list; dropping"
            );
            self.report.dropped += insertions.len();
        }
        let unreached = self.queue.replacements.len() + self.queue.deletions.len();
        if unreached > 0 {
            debug!(count = unreached, "edits queued against nodes outside the tree");
            self.report.dropped += unreached;
        }
        self.queue.clear();
    }
}
