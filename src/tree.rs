use tracing::{debug, warn};

use crate::{BehaviorNodeContainer, Blackboard, Status, TickContext, TreeId};

/// A root node with a stable identity.
///
/// Ticking only borrows the tree, so the same tree can be ticked for any number of
/// blackboards. Ticks against one blackboard must not overlap, which the
/// `&mut Blackboard` borrow already guarantees.
pub struct BehaviorTree<S> {
    id: TreeId,
    root: BehaviorNodeContainer<S>,
}

impl<S> BehaviorTree<S> {
    pub fn new(root: BehaviorNodeContainer<S>) -> Self {
        Self {
            id: TreeId::new(),
            root,
        }
    }

    pub fn id(&self) -> TreeId {
        self.id
    }

    pub fn root(&self) -> &BehaviorNodeContainer<S> {
        &self.root
    }

    /// A fresh context bound to this tree, for use with [`BehaviorTree::tick_with`].
    pub fn context<'a>(&self, subject: &'a mut S, blackboard: &'a mut Blackboard) -> TickContext<'a, S> {
        TickContext::new(self.id, subject, blackboard)
    }

    /// Runs one tick with a new context using the default random source and clock.
    pub fn tick(&self, subject: &mut S, blackboard: &mut Blackboard) -> Status {
        let mut ctx = self.context(subject, blackboard);
        self.tick_with(&mut ctx)
    }

    /// Runs one tick with a caller-provided context, which may have been used for
    /// earlier ticks.
    ///
    /// After the root returns, nodes left open by the previous tick that are not
    /// at the same position in this tick's open list are closed, deepest first.
    pub fn tick_with(&self, ctx: &mut TickContext<S>) -> Status {
        ctx.begin(self.id);

        let status = self.root.execute(ctx);

        let last_open = ctx.blackboard().open_nodes(self.id).to_vec();
        let start = last_open
            .iter()
            .zip(ctx.open_nodes())
            .take_while(|(last, curr)| last == curr)
            .count();

        let mut closed = 0;
        for id in last_open[start..].iter().rev() {
            // Already closed by this tick's own traversal
            if !ctx.is_open(*id) {
                continue;
            }
            match self.root.find(*id) {
                Some(node) => {
                    node.close(ctx);
                    closed += 1;
                }
                None => warn!(tree = %self.id, node = %id, "open node does not belong to this tree"),
            }
        }

        ctx.finish();

        debug!(
            tree = %self.id,
            ?status,
            node_count = ctx.node_count(),
            open = ctx.open_nodes().len(),
            closed,
            "tick"
        );

        status
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{NodeId, RunningNode};

    #[test]
    fn test_unknown_open_node_is_skipped() {
        let tree = BehaviorTree::<()>::new(BehaviorNodeContainer::new(RunningNode));
        let mut blackboard = Blackboard::new();
        let stray = NodeId::new();
        blackboard.record_tick(tree.id(), vec![stray], 1);
        blackboard.set_open(tree.id(), stray, true);

        assert_eq!(tree.tick(&mut (), &mut blackboard), Status::Running);
        assert_eq!(blackboard.open_nodes(tree.id()), &[tree.root().id()]);
        assert!(blackboard.is_open(tree.id(), stray));
    }
}
