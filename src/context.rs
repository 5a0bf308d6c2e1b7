use crate::{Blackboard, Clock, NodeId, Scope, Symbol, SystemClock, TreeId};
use rand::RngCore;
use std::time::Duration;

/// Everything a node can see while a tree is being ticked.
///
/// A context borrows the subject and its blackboard for as long as it lives, and may
/// be reused for several consecutive ticks through [`crate::BehaviorTree::tick_with`].
/// Besides those borrows it records which nodes were entered during the current
/// tick; the tree compares that record with the previous tick's to find nodes that
/// must be closed.
pub struct TickContext<'a, S> {
    tree_id: TreeId,
    subject: &'a mut S,
    blackboard: &'a mut Blackboard,
    rng: Box<dyn RngCore + 'a>,
    clock: &'a dyn Clock,
    open_nodes: Vec<NodeId>,
    node_count: usize,
}

impl<'a, S> TickContext<'a, S> {
    pub fn new(tree_id: TreeId, subject: &'a mut S, blackboard: &'a mut Blackboard) -> Self {
        Self {
            tree_id,
            subject,
            blackboard,
            rng: Box::new(rand::thread_rng()),
            clock: &SystemClock,
            open_nodes: vec![],
            node_count: 0,
        }
    }

    /// Replaces the random source used by `RandomSelectorNode`.
    pub fn with_rng(mut self, rng: impl RngCore + 'a) -> Self {
        self.rng = Box::new(rng);
        self
    }

    pub fn with_clock(mut self, clock: &'a dyn Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn tree_id(&self) -> TreeId {
        self.tree_id
    }

    pub fn subject(&self) -> &S {
        &*self.subject
    }

    pub fn subject_mut(&mut self) -> &mut S {
        &mut *self.subject
    }

    pub fn blackboard(&self) -> &Blackboard {
        &*self.blackboard
    }

    pub fn blackboard_mut(&mut self) -> &mut Blackboard {
        &mut *self.blackboard
    }

    pub fn rng(&mut self) -> &mut (dyn RngCore + 'a) {
        &mut *self.rng
    }

    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    /// Nodes entered during this tick that have not been closed yet, in enter order.
    pub fn open_nodes(&self) -> &[NodeId] {
        &self.open_nodes
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Reads a value from the memory of `node` within the tree being ticked.
    pub fn get<T: 'static>(&self, node: NodeId, key: impl Into<Symbol>) -> Option<&T> {
        self.blackboard.get(key, Scope::Node(self.tree_id, node))
    }

    /// Writes a value to the memory of `node` within the tree being ticked.
    pub fn set<T: 'static>(&mut self, node: NodeId, key: impl Into<Symbol>, val: T) {
        self.blackboard.set(key, val, Scope::Node(self.tree_id, node));
    }

    pub fn is_open(&self, node: NodeId) -> bool {
        self.blackboard.is_open(self.tree_id, node)
    }

    pub(crate) fn begin(&mut self, tree_id: TreeId) {
        self.tree_id = tree_id;
        self.open_nodes.clear();
        self.node_count = 0;
    }

    pub(crate) fn enter_node(&mut self, node: NodeId) {
        self.node_count += 1;
        self.open_nodes.push(node);
    }

    pub(crate) fn open_node(&mut self, node: NodeId) {
        self.blackboard.set_open(self.tree_id, node, true);
    }

    pub(crate) fn close_node(&mut self, node: NodeId) {
        // The node closing is normally the most recently entered one still open.
        if let Some(pos) = self.open_nodes.iter().rposition(|open| *open == node) {
            self.open_nodes.remove(pos);
        }
        self.blackboard.set_open(self.tree_id, node, false);
    }

    pub(crate) fn finish(&mut self) {
        self.blackboard
            .record_tick(self.tree_id, self.open_nodes.clone(), self.node_count);
    }
}
