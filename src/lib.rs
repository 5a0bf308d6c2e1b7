//! # shared-behavior-tree (Rust crate)
//!
//! A behavior tree engine whose nodes hold no per-subject state.
//!
//!
//! ## Overview
//!
//! A behavior tree is evaluated once per control cycle ("tick") to decide what a
//! subject, such as a game character or a robot, should do next.
//! Each node returns a [`Status`]; `Running` means "not finished, call me again next
//! tick".
//!
//! The defining property of this crate is that one tree can drive any number of
//! subjects at the same time.
//! Nodes never store which child they are resuming, when they started waiting or
//! how many loops they have done. All of that goes into a [`Blackboard`] owned by
//! the subject, scoped by tree id and node id.
//! Ticking a tree therefore only needs `&self`.
//!
//!
//! ## How it looks like
//!
//! Build a tree out of containers, then tick it with a subject and a blackboard.
//!
//! ```rust
//! use shared_behavior_tree::*;
//!
//! let root = BehaviorNodeContainer::with_children(
//!     MemSequenceNode,
//!     vec![
//!         BehaviorNodeContainer::new(WaitTicksNode::new(2)),
//!         BehaviorNodeContainer::new(SuccessNode),
//!     ],
//! );
//! let tree = BehaviorTree::new(root);
//!
//! let mut subject = ();
//! let mut blackboard = Blackboard::new();
//! assert_eq!(tree.tick(&mut subject, &mut blackboard), Status::Running);
//! assert_eq!(tree.tick(&mut subject, &mut blackboard), Status::Success);
//! ```
//!
//! A second blackboard ticks the very same tree from the beginning, without
//! interfering with the first one.
//!
//!
//! ## How to define your own node
//!
//! Implement [`BehaviorNode`] for your type. Only `tick` is required; `enter`,
//! `open`, `close` and `exit` default to doing nothing.
//!
//! Every visit of a node goes through five phases:
//!
//! 1. `enter`, unconditionally.
//! 2. `open`, only if the node was not left open by a previous tick.
//! 3. `tick`, which returns the status.
//! 4. `close`, only if the status is not `Running`.
//! 5. `exit`, unconditionally.
//!
//! State that must survive between ticks goes into node-scoped memory through
//! [`TickContext::get`] and [`TickContext::set`].
//!
//! ```rust
//! use shared_behavior_tree::*;
//!
//! struct Guard {
//!     alarms: u32,
//! }
//!
//! struct RaiseAlarm;
//!
//! impl BehaviorNode<Guard> for RaiseAlarm {
//!     fn open(&self, node: &BehaviorNodeContainer<Guard>, ctx: &mut TickContext<Guard>) {
//!         ctx.set(node.id(), "attempts", 0_u32);
//!     }
//!
//!     fn tick(&self, node: &BehaviorNodeContainer<Guard>, ctx: &mut TickContext<Guard>) -> Status {
//!         let attempts = ctx.get::<u32>(node.id(), "attempts").copied().unwrap_or(0) + 1;
//!         ctx.set(node.id(), "attempts", attempts);
//!         if attempts < 3 {
//!             return Status::Running;
//!         }
//!         ctx.subject_mut().alarms += 1;
//!         Status::Success
//!     }
//! }
//!
//! let tree = BehaviorTree::new(BehaviorNodeContainer::new(RaiseAlarm));
//! let mut guard = Guard { alarms: 0 };
//! let mut blackboard = Blackboard::new();
//! for _ in 0..3 {
//!     tree.tick(&mut guard, &mut blackboard);
//! }
//! assert_eq!(guard.alarms, 1);
//! ```
//!
//!
//! ## Closing nodes that are no longer reached
//!
//! A node that returned `Running` stays open.
//! If the next tick takes another branch and never visits it, nobody would ever
//! run its `close` hook.
//! The tree takes care of that: after each tick, it compares the nodes that were
//! open at the end of the previous tick with the ones open now, and closes the
//! ones after their longest common prefix, deepest first.
//! The lists are persisted in tree-scoped memory and can be inspected with
//! [`Blackboard::open_nodes`] and [`Blackboard::node_count`].
//!
//!
//! ## Loading the tree structure from a file
//!
//! Trees can also be described in a small text format and instantiated through a
//! [`Registry`] of node types.
//!
//! ```text
//! # Patrol until something shows up
//! tree main = MemSequence {
//!     WaitTicks (duration = 3)
//!     Repeater (maxLoop = 2) {
//!         Success
//!     }
//!     Fallback
//! }
//!
//! tree Fallback = Selector {
//!     Failure
//!     Success
//! }
//! ```
//!
//! ```rust
//! # use shared_behavior_tree::*;
//! # let source_string = "tree main = Success";
//! # (|| -> Result<(), Box<dyn std::error::Error>> {
//! let tree_source = parse_file(source_string)?;
//! let registry = Registry::<()>::default();
//! let tree = load(&tree_source, &registry)?;
//! # Ok(())
//! # })().unwrap();
//! ```
//!
//! A name that is not a registered node type but names another `tree` in the same
//! source is expanded in place as a subtree. Parameters are written as
//! `name = value` pairs, where the value is an integer, a float, `true`, `false` or a
//! double quoted string.
//!
//! The same AST can be produced from YAML with [`parse_yaml`]:
//!
//! ```yaml
//! behavior_tree:
//!   main:
//!     type: Sequence
//!     children:
//!     - type: WaitTicks
//!       params:
//!         duration: 3
//!     - type: Success
//! ```

mod agent;
mod blackboard;
mod clock;
mod container;
mod context;
pub mod error;
mod id;
mod nodes;
pub mod parser;
mod registry;
mod symbol;
mod tree;

pub use crate::agent::Agent;
pub use crate::blackboard::{Blackboard, Memory, NodeMemory, Scope, TreeMemory};
pub use crate::clock::{Clock, ManualClock, SystemClock};
pub use crate::container::BehaviorNodeContainer;
pub use crate::context::TickContext;
pub use crate::id::{NodeId, TreeId};
pub use crate::nodes::{
    ConditionNode, ErrorNode, FailerNode, FailureNode, InverterNode, LimiterTicksNode,
    LimiterTimeNode, MemSelectorNode, MemSequenceNode, RandomSelectorNode,
    RepeatUntilFailureNode, RepeatUntilSuccessNode, RepeaterNode, RunnerNode, RunningNode,
    SelectorNode, SequenceNode, SucceederNode, SuccessNode, WaitTicksNode, WaitTimeNode,
};
pub use crate::symbol::Symbol;
pub use crate::tree::BehaviorTree;
pub use crate::{
    parser::{load, parse_file, parse_yaml, ParamValue, Params, TreeDef, TreeRootDef, TreeSource},
    registry::{boxify, boxify_with, Constructor, Registry},
};
pub use ::once_cell::sync::Lazy;

/// The result of one visit of a node.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash)]
pub enum Status {
    Failure,
    Success,
    /// The node should keep running in the next tick
    Running,
    /// The tree is malformed, e.g. a decorator without exactly one child
    Error,
}

impl Status {
    /// Everything but `Running` ends the visit and closes the node.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Status::Running)
    }
}

#[derive(PartialEq, Eq, Debug)]
pub enum NumChildren {
    Finite(usize),
    Infinite,
}

impl PartialOrd for NumChildren {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(match (self, other) {
            (NumChildren::Finite(_), NumChildren::Infinite) => std::cmp::Ordering::Less,
            (NumChildren::Infinite, NumChildren::Finite(_)) => std::cmp::Ordering::Greater,
            (NumChildren::Finite(lhs), NumChildren::Finite(rhs)) => lhs.cmp(rhs),
            (NumChildren::Infinite, NumChildren::Infinite) => return None,
        })
    }
}

/// A unit of behavior, generic over the subject type `S` it controls.
///
/// Implementations are shared between every subject ticking the same tree, so the
/// hooks take `&self`. Anything that varies per subject belongs in the blackboard.
/// `node` is the container holding this node; it gives access to the node id and
/// to the children.
pub trait BehaviorNode<S> {
    fn enter(&self, _node: &BehaviorNodeContainer<S>, _ctx: &mut TickContext<S>) {}

    fn open(&self, _node: &BehaviorNodeContainer<S>, _ctx: &mut TickContext<S>) {}

    fn tick(&self, node: &BehaviorNodeContainer<S>, ctx: &mut TickContext<S>) -> Status;

    fn close(&self, _node: &BehaviorNodeContainer<S>, _ctx: &mut TickContext<S>) {}

    fn exit(&self, _node: &BehaviorNodeContainer<S>, _ctx: &mut TickContext<S>) {}

    /// Upper bound enforced by [`BehaviorNodeContainer::add_child`].
    fn max_children(&self) -> NumChildren {
        NumChildren::Finite(0)
    }
}
