use rand::Rng;
use std::time::Duration;

use crate::{
    BehaviorNode, BehaviorNodeContainer, Lazy, NumChildren, Status, Symbol, TickContext,
};

static RUNNING_CHILD: Lazy<Symbol> = Lazy::new(|| "runningChild".into());
static START_TIME: Lazy<Symbol> = Lazy::new(|| "startTime".into());
static ELAPSED_TICKS: Lazy<Symbol> = Lazy::new(|| "elapsedTicks".into());
static LOOP_COUNT: Lazy<Symbol> = Lazy::new(|| "i".into());

/// Ticks children in order and stops at the first one that does not succeed.
///
/// Starts over from the first child on every tick, even if a later child returned
/// `Running` last time. Use [`MemSequenceNode`] to resume instead.
#[derive(Default, Debug, Clone, Copy)]
pub struct SequenceNode;

impl<S> BehaviorNode<S> for SequenceNode {
    fn tick(&self, node: &BehaviorNodeContainer<S>, ctx: &mut TickContext<S>) -> Status {
        for child in node.children() {
            let status = child.execute(ctx);
            if status != Status::Success {
                return status;
            }
        }
        Status::Success
    }

    fn max_children(&self) -> NumChildren {
        NumChildren::Infinite
    }
}

/// Ticks children in order and stops at the first one that does not fail.
///
/// Like [`SequenceNode`], it starts over from the first child on every tick.
#[derive(Default, Debug, Clone, Copy)]
pub struct SelectorNode;

impl<S> BehaviorNode<S> for SelectorNode {
    fn tick(&self, node: &BehaviorNodeContainer<S>, ctx: &mut TickContext<S>) -> Status {
        for child in node.children() {
            let status = child.execute(ctx);
            if status != Status::Failure {
                return status;
            }
        }
        Status::Failure
    }

    fn max_children(&self) -> NumChildren {
        NumChildren::Infinite
    }
}

/// A sequence that remembers which child returned `Running` and resumes from it on
/// the next tick, without ticking the earlier children again.
#[derive(Default, Debug, Clone, Copy)]
pub struct MemSequenceNode;

impl<S> BehaviorNode<S> for MemSequenceNode {
    fn open(&self, node: &BehaviorNodeContainer<S>, ctx: &mut TickContext<S>) {
        ctx.set(node.id(), *RUNNING_CHILD, 0_usize);
    }

    fn tick(&self, node: &BehaviorNodeContainer<S>, ctx: &mut TickContext<S>) -> Status {
        let from = ctx
            .get::<usize>(node.id(), *RUNNING_CHILD)
            .copied()
            .unwrap_or(0);
        for (i, child) in node.children().iter().enumerate().skip(from) {
            let status = child.execute(ctx);
            if status != Status::Success {
                if status == Status::Running {
                    ctx.set(node.id(), *RUNNING_CHILD, i);
                }
                return status;
            }
        }
        Status::Success
    }

    fn max_children(&self) -> NumChildren {
        NumChildren::Infinite
    }
}

/// A selector that resumes from the child that returned `Running` last time.
#[derive(Default, Debug, Clone, Copy)]
pub struct MemSelectorNode;

impl<S> BehaviorNode<S> for MemSelectorNode {
    fn open(&self, node: &BehaviorNodeContainer<S>, ctx: &mut TickContext<S>) {
        ctx.set(node.id(), *RUNNING_CHILD, 0_usize);
    }

    fn tick(&self, node: &BehaviorNodeContainer<S>, ctx: &mut TickContext<S>) -> Status {
        let from = ctx
            .get::<usize>(node.id(), *RUNNING_CHILD)
            .copied()
            .unwrap_or(0);
        for (i, child) in node.children().iter().enumerate().skip(from) {
            let status = child.execute(ctx);
            if status != Status::Failure {
                if status == Status::Running {
                    ctx.set(node.id(), *RUNNING_CHILD, i);
                }
                return status;
            }
        }
        Status::Failure
    }

    fn max_children(&self) -> NumChildren {
        NumChildren::Infinite
    }
}

/// Ticks exactly one child, picked uniformly at random on every tick with the
/// context's random source, and returns its status. A failing child is not
/// followed by another pick.
#[derive(Default, Debug, Clone, Copy)]
pub struct RandomSelectorNode;

impl<S> BehaviorNode<S> for RandomSelectorNode {
    fn tick(&self, node: &BehaviorNodeContainer<S>, ctx: &mut TickContext<S>) -> Status {
        let children = node.children();
        if children.is_empty() {
            return Status::Failure;
        }
        let index = ctx.rng().gen_range(0..children.len());
        children[index].execute(ctx)
    }

    fn max_children(&self) -> NumChildren {
        NumChildren::Infinite
    }
}

#[derive(Default, Debug, Clone, Copy)]
pub struct InverterNode;

impl<S> BehaviorNode<S> for InverterNode {
    fn tick(&self, node: &BehaviorNodeContainer<S>, ctx: &mut TickContext<S>) -> Status {
        let Some(child) = node.single_child() else {
            return Status::Error;
        };
        match child.execute(ctx) {
            Status::Success => Status::Failure,
            Status::Failure => Status::Success,
            status => status,
        }
    }

    fn max_children(&self) -> NumChildren {
        NumChildren::Finite(1)
    }
}

/// Fails without ticking its child once more than `max_time` has passed since it
/// was opened.
#[derive(Debug, Clone, Copy)]
pub struct LimiterTimeNode {
    max_time: Duration,
}

impl LimiterTimeNode {
    pub fn new(max_time: Duration) -> Self {
        Self { max_time }
    }
}

impl<S> BehaviorNode<S> for LimiterTimeNode {
    fn open(&self, node: &BehaviorNodeContainer<S>, ctx: &mut TickContext<S>) {
        let now = ctx.now();
        ctx.set(node.id(), *START_TIME, now);
    }

    fn tick(&self, node: &BehaviorNodeContainer<S>, ctx: &mut TickContext<S>) -> Status {
        let Some(child) = node.single_child() else {
            return Status::Error;
        };
        let start = ctx
            .get::<Duration>(node.id(), *START_TIME)
            .copied()
            .unwrap_or_default();
        if ctx.now().saturating_sub(start) > self.max_time {
            return Status::Failure;
        }
        child.execute(ctx)
    }

    fn max_children(&self) -> NumChildren {
        NumChildren::Finite(1)
    }
}

/// Forwards its child's status for `max_ticks` ticks after being opened, then fails
/// once without ticking the child and starts counting again.
#[derive(Debug, Clone, Copy)]
pub struct LimiterTicksNode {
    max_ticks: u32,
}

impl LimiterTicksNode {
    pub fn new(max_ticks: u32) -> Self {
        Self { max_ticks }
    }
}

impl<S> BehaviorNode<S> for LimiterTicksNode {
    fn open(&self, node: &BehaviorNodeContainer<S>, ctx: &mut TickContext<S>) {
        ctx.set(node.id(), *ELAPSED_TICKS, 0_u32);
    }

    fn tick(&self, node: &BehaviorNodeContainer<S>, ctx: &mut TickContext<S>) -> Status {
        let Some(child) = node.single_child() else {
            return Status::Error;
        };
        let elapsed = ctx
            .get::<u32>(node.id(), *ELAPSED_TICKS)
            .copied()
            .unwrap_or(0)
            + 1;
        if elapsed > self.max_ticks {
            ctx.set(node.id(), *ELAPSED_TICKS, 0_u32);
            return Status::Failure;
        }
        ctx.set(node.id(), *ELAPSED_TICKS, elapsed);
        child.execute(ctx)
    }

    fn max_children(&self) -> NumChildren {
        NumChildren::Finite(1)
    }
}

/// Shared loop of the repeat decorators: re-executes the child within the same tick
/// while `keep_going` accepts its status and the loop budget lasts.
fn repeat<S>(
    node: &BehaviorNodeContainer<S>,
    ctx: &mut TickContext<S>,
    max_loop: Option<u32>,
    initial: Status,
    keep_going: impl Fn(Status) -> bool,
) -> Status {
    let Some(child) = node.single_child() else {
        return Status::Error;
    };
    let mut i = ctx.get::<u32>(node.id(), *LOOP_COUNT).copied().unwrap_or(0);
    let mut status = initial;
    while max_loop.map_or(true, |max| i < max) {
        status = child.execute(ctx);
        if keep_going(status) {
            i += 1;
        } else {
            break;
        }
    }
    ctx.set(node.id(), *LOOP_COUNT, i);
    status
}

/// Repeats its child within one tick as long as it finishes, up to `max_loop` times.
///
/// With no limit and a child that always finishes, the tick never returns.
#[derive(Debug, Clone, Copy, Default)]
pub struct RepeaterNode {
    max_loop: Option<u32>,
}

impl RepeaterNode {
    pub fn new(max_loop: u32) -> Self {
        Self {
            max_loop: Some(max_loop),
        }
    }

    pub fn unbounded() -> Self {
        Self { max_loop: None }
    }
}

impl<S> BehaviorNode<S> for RepeaterNode {
    fn open(&self, node: &BehaviorNodeContainer<S>, ctx: &mut TickContext<S>) {
        ctx.set(node.id(), *LOOP_COUNT, 0_u32);
    }

    fn tick(&self, node: &BehaviorNodeContainer<S>, ctx: &mut TickContext<S>) -> Status {
        repeat(node, ctx, self.max_loop, Status::Success, |status| {
            matches!(status, Status::Success | Status::Failure)
        })
    }

    fn max_children(&self) -> NumChildren {
        NumChildren::Finite(1)
    }
}

/// Repeats its child while it succeeds, up to `max_loop` times.
#[derive(Debug, Clone, Copy, Default)]
pub struct RepeatUntilFailureNode {
    max_loop: Option<u32>,
}

impl RepeatUntilFailureNode {
    pub fn new(max_loop: u32) -> Self {
        Self {
            max_loop: Some(max_loop),
        }
    }

    pub fn unbounded() -> Self {
        Self { max_loop: None }
    }
}

impl<S> BehaviorNode<S> for RepeatUntilFailureNode {
    fn open(&self, node: &BehaviorNodeContainer<S>, ctx: &mut TickContext<S>) {
        ctx.set(node.id(), *LOOP_COUNT, 0_u32);
    }

    fn tick(&self, node: &BehaviorNodeContainer<S>, ctx: &mut TickContext<S>) -> Status {
        repeat(node, ctx, self.max_loop, Status::Success, |status| {
            status == Status::Success
        })
    }

    fn max_children(&self) -> NumChildren {
        NumChildren::Finite(1)
    }
}

/// Repeats its child while it fails, up to `max_loop` times.
#[derive(Debug, Clone, Copy, Default)]
pub struct RepeatUntilSuccessNode {
    max_loop: Option<u32>,
}

impl RepeatUntilSuccessNode {
    pub fn new(max_loop: u32) -> Self {
        Self {
            max_loop: Some(max_loop),
        }
    }

    pub fn unbounded() -> Self {
        Self { max_loop: None }
    }
}

impl<S> BehaviorNode<S> for RepeatUntilSuccessNode {
    fn open(&self, node: &BehaviorNodeContainer<S>, ctx: &mut TickContext<S>) {
        ctx.set(node.id(), *LOOP_COUNT, 0_u32);
    }

    fn tick(&self, node: &BehaviorNodeContainer<S>, ctx: &mut TickContext<S>) -> Status {
        repeat(node, ctx, self.max_loop, Status::Failure, |status| {
            status == Status::Failure
        })
    }

    fn max_children(&self) -> NumChildren {
        NumChildren::Finite(1)
    }
}

/// Executes the only child and reports `result` whatever the child returned.
fn force<S>(node: &BehaviorNodeContainer<S>, ctx: &mut TickContext<S>, result: Status) -> Status {
    match node.single_child() {
        Some(child) => {
            child.execute(ctx);
            result
        }
        None => Status::Error,
    }
}

#[derive(Default, Debug, Clone, Copy)]
pub struct FailerNode;

impl<S> BehaviorNode<S> for FailerNode {
    fn tick(&self, node: &BehaviorNodeContainer<S>, ctx: &mut TickContext<S>) -> Status {
        force(node, ctx, Status::Failure)
    }

    fn max_children(&self) -> NumChildren {
        NumChildren::Finite(1)
    }
}

#[derive(Default, Debug, Clone, Copy)]
pub struct RunnerNode;

impl<S> BehaviorNode<S> for RunnerNode {
    fn tick(&self, node: &BehaviorNodeContainer<S>, ctx: &mut TickContext<S>) -> Status {
        force(node, ctx, Status::Running)
    }

    fn max_children(&self) -> NumChildren {
        NumChildren::Finite(1)
    }
}

#[derive(Default, Debug, Clone, Copy)]
pub struct SucceederNode;

impl<S> BehaviorNode<S> for SucceederNode {
    fn tick(&self, node: &BehaviorNodeContainer<S>, ctx: &mut TickContext<S>) -> Status {
        force(node, ctx, Status::Success)
    }

    fn max_children(&self) -> NumChildren {
        NumChildren::Finite(1)
    }
}

#[derive(Default, Debug, Clone, Copy)]
pub struct ErrorNode;

impl<S> BehaviorNode<S> for ErrorNode {
    fn tick(&self, _node: &BehaviorNodeContainer<S>, _ctx: &mut TickContext<S>) -> Status {
        Status::Error
    }
}

#[derive(Default, Debug, Clone, Copy)]
pub struct FailureNode;

impl<S> BehaviorNode<S> for FailureNode {
    fn tick(&self, _node: &BehaviorNodeContainer<S>, _ctx: &mut TickContext<S>) -> Status {
        Status::Failure
    }
}

#[derive(Default, Debug, Clone, Copy)]
pub struct RunningNode;

impl<S> BehaviorNode<S> for RunningNode {
    fn tick(&self, _node: &BehaviorNodeContainer<S>, _ctx: &mut TickContext<S>) -> Status {
        Status::Running
    }
}

#[derive(Default, Debug, Clone, Copy)]
pub struct SuccessNode;

impl<S> BehaviorNode<S> for SuccessNode {
    fn tick(&self, _node: &BehaviorNodeContainer<S>, _ctx: &mut TickContext<S>) -> Status {
        Status::Success
    }
}

/// Runs until `duration` has passed since it was opened.
#[derive(Debug, Clone, Copy, Default)]
pub struct WaitTimeNode {
    duration: Duration,
}

impl WaitTimeNode {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }
}

impl<S> BehaviorNode<S> for WaitTimeNode {
    fn open(&self, node: &BehaviorNodeContainer<S>, ctx: &mut TickContext<S>) {
        let now = ctx.now();
        ctx.set(node.id(), *START_TIME, now);
    }

    fn tick(&self, node: &BehaviorNodeContainer<S>, ctx: &mut TickContext<S>) -> Status {
        let start = ctx
            .get::<Duration>(node.id(), *START_TIME)
            .copied()
            .unwrap_or_default();
        if ctx.now().saturating_sub(start) >= self.duration {
            Status::Success
        } else {
            Status::Running
        }
    }
}

/// Runs for `duration` ticks, counting the tick it was opened on.
#[derive(Debug, Clone, Copy, Default)]
pub struct WaitTicksNode {
    duration: u32,
}

impl WaitTicksNode {
    pub fn new(duration: u32) -> Self {
        Self { duration }
    }
}

impl<S> BehaviorNode<S> for WaitTicksNode {
    fn open(&self, node: &BehaviorNodeContainer<S>, ctx: &mut TickContext<S>) {
        ctx.set(node.id(), *ELAPSED_TICKS, 0_u32);
    }

    fn tick(&self, node: &BehaviorNodeContainer<S>, ctx: &mut TickContext<S>) -> Status {
        let elapsed = ctx
            .get::<u32>(node.id(), *ELAPSED_TICKS)
            .copied()
            .unwrap_or(0)
            + 1;
        if elapsed >= self.duration {
            ctx.set(node.id(), *ELAPSED_TICKS, 0_u32);
            Status::Success
        } else {
            ctx.set(node.id(), *ELAPSED_TICKS, elapsed);
            Status::Running
        }
    }
}

/// Chooses between its two children with a predicate over the tick context.
///
/// Only the tick phase of the chosen child is run: it is neither entered nor opened,
/// and it does not show up among the open nodes.
pub struct ConditionNode<S> {
    predicate: Box<dyn Fn(&TickContext<S>) -> bool>,
}

impl<S> ConditionNode<S> {
    pub fn new(predicate: impl Fn(&TickContext<S>) -> bool + 'static) -> Self {
        Self {
            predicate: Box::new(predicate),
        }
    }
}

impl<S: 'static> ConditionNode<S> {
    /// Builds the container with `on_true` and `on_false` as its two children.
    pub fn build(
        predicate: impl Fn(&TickContext<S>) -> bool + 'static,
        on_true: BehaviorNodeContainer<S>,
        on_false: BehaviorNodeContainer<S>,
    ) -> BehaviorNodeContainer<S> {
        BehaviorNodeContainer::with_children(Self::new(predicate), vec![on_true, on_false])
    }
}

impl<S> BehaviorNode<S> for ConditionNode<S> {
    fn tick(&self, node: &BehaviorNodeContainer<S>, ctx: &mut TickContext<S>) -> Status {
        let [on_true, on_false] = node.children() else {
            return Status::Error;
        };
        if (self.predicate)(&*ctx) {
            on_true.tick(ctx)
        } else {
            on_false.tick(ctx)
        }
    }

    fn max_children(&self) -> NumChildren {
        NumChildren::Finite(2)
    }
}
