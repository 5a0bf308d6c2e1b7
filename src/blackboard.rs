use crate::{NodeId, Symbol, TreeId};
use std::any::Any;
use std::collections::HashMap;

/// A bucket of user-defined values, keyed by interned names.
pub type Memory = HashMap<Symbol, Box<dyn Any>>;

/// Which bucket of the [`Blackboard`] an access addresses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Visible to every tree that shares the blackboard.
    Global,
    /// Private to one tree.
    Tree(TreeId),
    /// Private to one node within one tree.
    Node(TreeId, NodeId),
}

#[derive(Default)]
pub struct TreeMemory {
    /// Nodes still open at the end of the last tick, in enter order.
    pub(crate) open_nodes: Vec<NodeId>,
    /// Nodes entered during the last tick.
    pub(crate) node_count: usize,
    values: Memory,
    nodes: HashMap<NodeId, NodeMemory>,
}

#[derive(Default)]
pub struct NodeMemory {
    is_open: bool,
    values: Memory,
}

/// Scoped key/value storage belonging to one subject.
///
/// All run-time state of a tree lives here rather than in the nodes, which is what
/// allows a single [`crate::BehaviorTree`] to be ticked for many subjects: each
/// subject owns a blackboard, and each blackboard keeps a separate section per tree
/// id and per node id.
///
/// Reads never fail and never allocate. A read of a missing bucket, a missing key or
/// a value stored with another type yields `None`. Writes create the tree and node
/// buckets on demand. Tree sections are only removed by [`Blackboard::clear_tree`].
#[derive(Default)]
pub struct Blackboard {
    base: Memory,
    trees: HashMap<TreeId, TreeMemory>,
}

impl Blackboard {
    pub fn new() -> Self {
        Self::default()
    }

    fn memory(&self, scope: Scope) -> Option<&Memory> {
        match scope {
            Scope::Global => Some(&self.base),
            Scope::Tree(tree) => self.trees.get(&tree).map(|mem| &mem.values),
            Scope::Node(tree, node) => self
                .trees
                .get(&tree)
                .and_then(|mem| mem.nodes.get(&node))
                .map(|mem| &mem.values),
        }
    }

    fn memory_mut(&mut self, scope: Scope) -> &mut Memory {
        match scope {
            Scope::Global => &mut self.base,
            Scope::Tree(tree) => &mut self.tree_memory_mut(tree).values,
            Scope::Node(tree, node) => &mut self.node_memory_mut(tree, node).values,
        }
    }

    fn tree_memory_mut(&mut self, tree: TreeId) -> &mut TreeMemory {
        self.trees.entry(tree).or_default()
    }

    fn node_memory_mut(&mut self, tree: TreeId, node: NodeId) -> &mut NodeMemory {
        self.tree_memory_mut(tree).nodes.entry(node).or_default()
    }

    pub fn get<T: 'static>(&self, key: impl Into<Symbol>, scope: Scope) -> Option<&T> {
        self.memory(scope)?
            .get(&key.into())
            .and_then(|val| val.downcast_ref())
    }

    pub fn get_mut<T: 'static>(&mut self, key: impl Into<Symbol>, scope: Scope) -> Option<&mut T> {
        let key = key.into();
        let memory = match scope {
            Scope::Global => &mut self.base,
            Scope::Tree(tree) => &mut self.trees.get_mut(&tree)?.values,
            Scope::Node(tree, node) => {
                &mut self.trees.get_mut(&tree)?.nodes.get_mut(&node)?.values
            }
        };
        memory.get_mut(&key).and_then(|val| val.downcast_mut())
    }

    pub fn set<T: 'static>(&mut self, key: impl Into<Symbol>, val: T, scope: Scope) {
        self.memory_mut(scope).insert(key.into(), Box::new(val));
    }

    pub fn contains(&self, key: impl Into<Symbol>, scope: Scope) -> bool {
        self.memory(scope)
            .map_or(false, |mem| mem.contains_key(&key.into()))
    }

    /// Removes a value, returning whether one was present.
    pub fn remove(&mut self, key: impl Into<Symbol>, scope: Scope) -> bool {
        let key = key.into();
        match scope {
            Scope::Global => self.base.remove(&key).is_some(),
            Scope::Tree(tree) => self
                .trees
                .get_mut(&tree)
                .map_or(false, |mem| mem.values.remove(&key).is_some()),
            Scope::Node(tree, node) => self
                .trees
                .get_mut(&tree)
                .and_then(|mem| mem.nodes.get_mut(&node))
                .map_or(false, |mem| mem.values.remove(&key).is_some()),
        }
    }

    /// Drops everything recorded for `tree`, including its open-node bookkeeping.
    pub fn clear_tree(&mut self, tree: TreeId) -> bool {
        self.trees.remove(&tree).is_some()
    }

    /// Nodes that were still open when `tree` last finished a tick.
    pub fn open_nodes(&self, tree: TreeId) -> &[NodeId] {
        self.trees
            .get(&tree)
            .map(|mem| mem.open_nodes.as_slice())
            .unwrap_or(&[])
    }

    /// Number of nodes entered during the last tick of `tree`.
    pub fn node_count(&self, tree: TreeId) -> usize {
        self.trees.get(&tree).map_or(0, |mem| mem.node_count)
    }

    pub fn is_open(&self, tree: TreeId, node: NodeId) -> bool {
        self.trees
            .get(&tree)
            .and_then(|mem| mem.nodes.get(&node))
            .map_or(false, |mem| mem.is_open)
    }

    pub(crate) fn set_open(&mut self, tree: TreeId, node: NodeId, is_open: bool) {
        self.node_memory_mut(tree, node).is_open = is_open;
    }

    pub(crate) fn record_tick(&mut self, tree: TreeId, open_nodes: Vec<NodeId>, node_count: usize) {
        let mem = self.tree_memory_mut(tree);
        mem.open_nodes = open_nodes;
        mem.node_count = node_count;
    }
}

impl std::fmt::Debug for Blackboard {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        fmt.debug_struct("Blackboard")
            .field("global_keys", &self.base.keys().collect::<Vec<_>>())
            .field("trees", &self.trees.keys().collect::<Vec<_>>())
            .finish()
    }
}
