use rand::RngCore;
use std::rc::Rc;

use crate::{BehaviorTree, Blackboard, Clock, Status, SystemClock};

/// Binds one subject to one tree and one blackboard so it can be ticked without
/// arguments.
pub struct Agent<S> {
    subject: S,
    tree: Rc<BehaviorTree<S>>,
    blackboard: Blackboard,
    rng: Box<dyn RngCore>,
    clock: Box<dyn Clock>,
}

impl<S> Agent<S> {
    pub fn new(subject: S, tree: Rc<BehaviorTree<S>>, blackboard: Blackboard) -> Self {
        Self {
            subject,
            tree,
            blackboard,
            rng: Box::new(rand::thread_rng()),
            clock: Box::new(SystemClock),
        }
    }

    /// An agent with a blackboard of its own.
    pub fn dedicated(subject: S, tree: Rc<BehaviorTree<S>>) -> Self {
        Self::new(subject, tree, Blackboard::new())
    }

    pub fn with_rng(mut self, rng: impl RngCore + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn tick(&mut self) -> Status {
        let mut ctx = self
            .tree
            .context(&mut self.subject, &mut self.blackboard)
            .with_rng(&mut *self.rng)
            .with_clock(&*self.clock);
        self.tree.tick_with(&mut ctx)
    }

    pub fn subject(&self) -> &S {
        &self.subject
    }

    pub fn subject_mut(&mut self) -> &mut S {
        &mut self.subject
    }

    pub fn tree(&self) -> &Rc<BehaviorTree<S>> {
        &self.tree
    }

    pub fn blackboard(&self) -> &Blackboard {
        &self.blackboard
    }

    pub fn blackboard_mut(&mut self) -> &mut Blackboard {
        &mut self.blackboard
    }

    pub fn into_parts(self) -> (S, Blackboard) {
        (self.subject, self.blackboard)
    }
}
