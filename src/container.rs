use tracing::trace;

use crate::{
    error::{AddChildError, AddChildResult},
    BehaviorNode, NodeId, NumChildren, Status, TickContext,
};

/// Owns one node together with its identity and its children, and drives it through
/// the enter / open / tick / close / exit protocol.
pub struct BehaviorNodeContainer<S> {
    /// Name of the type of the node
    pub(crate) name: String,
    pub(crate) id: NodeId,
    pub(crate) node: Box<dyn BehaviorNode<S>>,
    pub(crate) child_nodes: Vec<BehaviorNodeContainer<S>>,
}

impl<S> BehaviorNodeContainer<S> {
    pub fn new<T: BehaviorNode<S> + 'static>(node: T) -> Self {
        Self::new_raw_with_name(Box::new(node), short_type_name::<T>().to_owned())
    }

    pub fn new_raw(node: Box<dyn BehaviorNode<S>>) -> Self {
        Self::new_raw_with_name(node, String::new())
    }

    pub fn new_raw_with_name(node: Box<dyn BehaviorNode<S>>, name: String) -> Self {
        Self {
            name,
            id: NodeId::new(),
            node,
            child_nodes: vec![],
        }
    }

    /// Builds a container with the given children, without checking them against
    /// [`BehaviorNode::max_children`]. A decorator built this way with the wrong
    /// number of children ticks as [`Status::Error`].
    pub fn with_children<T: BehaviorNode<S> + 'static>(
        node: T,
        children: Vec<BehaviorNodeContainer<S>>,
    ) -> Self {
        let mut ret = Self::new(node);
        ret.child_nodes = children;
        ret
    }

    pub fn add_child(&mut self, child: BehaviorNodeContainer<S>) -> AddChildResult {
        if NumChildren::Finite(self.child_nodes.len()) < self.node.max_children() {
            self.child_nodes.push(child);
            Ok(())
        } else {
            Err(AddChildError::TooManyNodes)
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn children(&self) -> &[BehaviorNodeContainer<S>] {
        &self.child_nodes
    }

    /// The only child, or `None` when there are zero or several.
    pub fn single_child(&self) -> Option<&BehaviorNodeContainer<S>> {
        match self.child_nodes.as_slice() {
            [child] => Some(child),
            _ => None,
        }
    }

    /// Finds this node or one of its descendants by id.
    pub fn find(&self, id: NodeId) -> Option<&BehaviorNodeContainer<S>> {
        if self.id == id {
            return Some(self);
        }
        self.child_nodes.iter().find_map(|child| child.find(id))
    }

    /// Runs a full visit of this node and returns its status.
    pub fn execute(&self, ctx: &mut TickContext<S>) -> Status {
        self.enter(ctx);

        if !ctx.is_open(self.id) {
            self.open(ctx);
        }

        let status = self.tick(ctx);

        if status != Status::Running {
            self.close(ctx);
        }

        self.exit(ctx);

        status
    }

    fn enter(&self, ctx: &mut TickContext<S>) {
        trace!(node = %self.name, id = %self.id, "enter");
        ctx.enter_node(self.id);
        self.node.enter(self, ctx);
    }

    fn open(&self, ctx: &mut TickContext<S>) {
        trace!(node = %self.name, id = %self.id, "open");
        ctx.open_node(self.id);
        self.node.open(self, ctx);
    }

    /// Runs only the tick phase, leaving the open/closed bookkeeping untouched.
    pub fn tick(&self, ctx: &mut TickContext<S>) -> Status {
        trace!(node = %self.name, id = %self.id, "tick");
        self.node.tick(self, ctx)
    }

    pub(crate) fn close(&self, ctx: &mut TickContext<S>) {
        trace!(node = %self.name, id = %self.id, "close");
        ctx.close_node(self.id);
        self.node.close(self, ctx);
    }

    fn exit(&self, ctx: &mut TickContext<S>) {
        trace!(node = %self.name, id = %self.id, "exit");
        self.node.exit(self, ctx);
    }
}

impl<S> std::fmt::Debug for BehaviorNodeContainer<S> {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        fmt.debug_struct("BehaviorNodeContainer")
            .field("name", &self.name)
            .field("id", &self.id)
            .field("child_nodes", &self.child_nodes)
            .finish()
    }
}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
