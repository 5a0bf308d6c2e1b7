use shared_behavior_tree::{
    boxify, load, parse_file, Agent, BehaviorNode, BehaviorNodeContainer, BehaviorTree,
    Blackboard, ConditionNode, MemSequenceNode, NumChildren, Registry, Scope, SelectorNode,
    SequenceNode, Status, SuccessNode, TickContext, WaitTicksNode,
};
use rand::{rngs::StdRng, SeedableRng};
use std::rc::Rc;

type Log = Vec<String>;

/// Logs every lifecycle hook into the subject.
///
/// With a child, it returns whatever the child returns. Without one, the status is
/// fixed, or read from the global blackboard entry named after the probe.
struct Probe {
    name: &'static str,
    status: Option<Status>,
}

impl Probe {
    fn log(&self, ctx: &mut TickContext<Log>, hook: &str) {
        ctx.subject_mut().push(format!("{}:{hook}", self.name));
    }
}

impl BehaviorNode<Log> for Probe {
    fn enter(&self, _node: &BehaviorNodeContainer<Log>, ctx: &mut TickContext<Log>) {
        self.log(ctx, "enter");
    }

    fn open(&self, _node: &BehaviorNodeContainer<Log>, ctx: &mut TickContext<Log>) {
        self.log(ctx, "open");
    }

    fn tick(&self, node: &BehaviorNodeContainer<Log>, ctx: &mut TickContext<Log>) -> Status {
        self.log(ctx, "tick");
        if let Some(child) = node.single_child() {
            return child.execute(ctx);
        }
        self.status.unwrap_or_else(|| {
            ctx.blackboard()
                .get::<Status>(self.name, Scope::Global)
                .copied()
                .unwrap_or(Status::Failure)
        })
    }

    fn close(&self, _node: &BehaviorNodeContainer<Log>, ctx: &mut TickContext<Log>) {
        self.log(ctx, "close");
    }

    fn exit(&self, _node: &BehaviorNodeContainer<Log>, ctx: &mut TickContext<Log>) {
        self.log(ctx, "exit");
    }

    fn max_children(&self) -> NumChildren {
        NumChildren::Finite(1)
    }
}

fn probe(name: &'static str, status: Status) -> BehaviorNodeContainer<Log> {
    BehaviorNodeContainer::new(Probe {
        name,
        status: Some(status),
    })
}

fn gate(name: &'static str) -> BehaviorNodeContainer<Log> {
    BehaviorNodeContainer::new(Probe { name, status: None })
}

fn wrap(name: &'static str, child: BehaviorNodeContainer<Log>) -> BehaviorNodeContainer<Log> {
    BehaviorNodeContainer::with_children(Probe { name, status: None }, vec![child])
}

fn events<'a>(log: &'a Log, hook: &str) -> Vec<&'a str> {
    let suffix = format!(":{hook}");
    log.iter()
        .filter_map(|event| event.strip_suffix(suffix.as_str()))
        .collect()
}

fn tick(tree: &BehaviorTree<Log>, blackboard: &mut Blackboard) -> (Status, Log) {
    let mut log = vec![];
    let status = tree.tick(&mut log, blackboard);
    (status, log)
}

#[test]
fn test_lifecycle_order() {
    let tree = BehaviorTree::new(probe("a", Status::Success));
    let (_, log) = tick(&tree, &mut Blackboard::new());
    assert_eq!(log, vec!["a:enter", "a:open", "a:tick", "a:close", "a:exit"]);

    let tree = BehaviorTree::new(probe("a", Status::Running));
    let mut blackboard = Blackboard::new();
    let (_, log) = tick(&tree, &mut blackboard);
    assert_eq!(log, vec!["a:enter", "a:open", "a:tick", "a:exit"]);
    assert!(blackboard.is_open(tree.id(), tree.root().id()));

    // Resumes without opening again
    let (_, log) = tick(&tree, &mut blackboard);
    assert_eq!(log, vec!["a:enter", "a:tick", "a:exit"]);
}

#[test]
fn test_stale_node_is_closed() {
    let root = BehaviorNodeContainer::with_children(
        SelectorNode,
        vec![gate("g"), probe("a", Status::Running)],
    );
    let root_id = root.id();
    let gate_id = root.children()[0].id();
    let a_id = root.children()[1].id();
    let tree = BehaviorTree::new(root);
    let mut blackboard = Blackboard::new();

    let (status, _) = tick(&tree, &mut blackboard);
    assert_eq!(status, Status::Running);
    assert_eq!(blackboard.open_nodes(tree.id()), &[root_id, a_id]);

    blackboard.set("g", Status::Running, Scope::Global);
    let (status, log) = tick(&tree, &mut blackboard);
    assert_eq!(status, Status::Running);
    assert_eq!(events(&log, "close"), vec!["a"]);
    assert!(events(&log, "tick").iter().all(|name| *name == "g"));
    assert!(!blackboard.is_open(tree.id(), a_id));
    assert_eq!(blackboard.open_nodes(tree.id()), &[root_id, gate_id]);
}

#[test]
fn test_stale_nodes_close_deepest_first() {
    let tree = BehaviorTree::new(BehaviorNodeContainer::with_children(
        SelectorNode,
        vec![gate("g"), wrap("outer", probe("inner", Status::Running))],
    ));
    let mut blackboard = Blackboard::new();
    tick(&tree, &mut blackboard);

    blackboard.set("g", Status::Success, Scope::Global);
    let (status, log) = tick(&tree, &mut blackboard);
    assert_eq!(status, Status::Success);
    assert_eq!(events(&log, "close"), vec!["g", "inner", "outer"]);
    assert!(blackboard.open_nodes(tree.id()).is_empty());
}

#[test]
fn test_common_prefix_is_kept_open() {
    let tree = BehaviorTree::new(BehaviorNodeContainer::with_children(
        MemSequenceNode,
        vec![probe("a", Status::Success), wrap("outer", gate("g"))],
    ));
    let mut blackboard = Blackboard::new();
    blackboard.set("g", Status::Running, Scope::Global);

    tick(&tree, &mut blackboard);
    let open = blackboard.open_nodes(tree.id()).to_vec();
    assert_eq!(open.len(), 3);

    for _ in 0..3 {
        let (status, log) = tick(&tree, &mut blackboard);
        assert_eq!(status, Status::Running);
        assert!(events(&log, "close").is_empty());
        assert!(events(&log, "open").is_empty());
        assert_eq!(blackboard.open_nodes(tree.id()), open.as_slice());
    }
}

#[test]
fn test_sibling_status_changes_keep_running_node_open() {
    let tree = BehaviorTree::new(BehaviorNodeContainer::with_children(
        SequenceNode,
        vec![
            BehaviorNodeContainer::with_children(SelectorNode, vec![gate("g1"), gate("g2")]),
            probe("x", Status::Running),
        ],
    ));
    let mut blackboard = Blackboard::new();
    blackboard.set("g1", Status::Success, Scope::Global);
    blackboard.set("g2", Status::Failure, Scope::Global);
    let (status, log) = tick(&tree, &mut blackboard);
    assert_eq!(status, Status::Running);
    assert_eq!(events(&log, "open"), vec!["g1", "x"]);

    for (g1, g2) in [
        (Status::Failure, Status::Success),
        (Status::Success, Status::Failure),
        (Status::Failure, Status::Success),
    ] {
        blackboard.set("g1", g1, Scope::Global);
        blackboard.set("g2", g2, Scope::Global);
        let (status, log) = tick(&tree, &mut blackboard);
        assert_eq!(status, Status::Running);
        assert_eq!(events(&log, "tick").last(), Some(&"x"));
        assert!(!events(&log, "close").contains(&"x"));
        assert!(!events(&log, "open").contains(&"x"));
        assert!(blackboard.is_open(tree.id(), tree.root().children()[1].id()));
    }
}

#[test]
fn test_terminal_tree_is_idempotent() {
    let tree = BehaviorTree::new(BehaviorNodeContainer::with_children(
        SequenceNode,
        vec![probe("a", Status::Success), probe("b", Status::Success)],
    ));
    let mut blackboard = Blackboard::new();

    let first = tick(&tree, &mut blackboard);
    assert_eq!(blackboard.node_count(tree.id()), 3);
    assert!(blackboard.open_nodes(tree.id()).is_empty());

    let second = tick(&tree, &mut blackboard);
    assert_eq!(first, second);
    assert_eq!(blackboard.node_count(tree.id()), 3);
    assert!(blackboard.open_nodes(tree.id()).is_empty());
}

fn waiting_tree() -> BehaviorTree<Log> {
    BehaviorTree::new(BehaviorNodeContainer::with_children(
        MemSequenceNode,
        vec![
            BehaviorNodeContainer::new(WaitTicksNode::new(2)),
            probe("done", Status::Success),
        ],
    ))
}

#[test]
fn test_one_tree_many_blackboards() {
    let tree = waiting_tree();
    let mut first = Blackboard::new();
    let mut second = Blackboard::new();

    assert_eq!(tick(&tree, &mut first).0, Status::Running);

    assert_eq!(tick(&tree, &mut second).0, Status::Running);
    let (status, log) = tick(&tree, &mut second);
    assert_eq!(status, Status::Success);
    assert_eq!(events(&log, "tick"), vec!["done"]);

    // The first subject is still halfway
    assert_eq!(blackboard_open(&tree, &first), 2);
    assert_eq!(blackboard_open(&tree, &second), 0);
    assert_eq!(tick(&tree, &mut first).0, Status::Success);
}

fn blackboard_open(tree: &BehaviorTree<Log>, blackboard: &Blackboard) -> usize {
    blackboard.open_nodes(tree.id()).len()
}

#[test]
fn test_many_trees_one_blackboard() {
    let first = waiting_tree();
    let second = waiting_tree();
    let mut blackboard = Blackboard::new();
    blackboard.set("shared", 1_i32, Scope::Global);

    tick(&first, &mut blackboard);
    assert_eq!(blackboard_open(&first, &blackboard), 2);
    assert_eq!(blackboard_open(&second, &blackboard), 0);

    assert_eq!(tick(&second, &mut blackboard).0, Status::Running);
    assert_eq!(tick(&first, &mut blackboard).0, Status::Success);
    assert_eq!(blackboard_open(&second, &blackboard), 2);

    assert!(blackboard.clear_tree(second.id()));
    assert_eq!(blackboard_open(&second, &blackboard), 0);
    assert_eq!(blackboard.get::<i32>("shared", Scope::Global), Some(&1));
    assert_eq!(tick(&second, &mut blackboard).0, Status::Running);
}

#[test]
fn test_agent() {
    let tree = Rc::new(waiting_tree());
    let mut agent = Agent::dedicated(vec![], tree.clone());
    let mut other = Agent::new(vec![], tree, Blackboard::new());

    assert_eq!(agent.tick(), Status::Running);
    assert_eq!(agent.tick(), Status::Success);
    assert_eq!(agent.subject(), &vec!["done:enter", "done:open", "done:tick", "done:close", "done:exit"]);

    assert_eq!(other.tick(), Status::Running);
    assert!(other.subject().is_empty());

    let (subject, blackboard) = agent.into_parts();
    assert_eq!(subject.len(), 5);
    assert_eq!(blackboard.node_count(other.tree().id()), 3);
}

#[test]
fn test_agent_seeded_rng() {
    let source = parse_file(
        "tree main = RandomSelector {
            Running
            Success
            Failure
        }",
    )
    .unwrap();
    let tree = Rc::new(load(&source, &Registry::<()>::default()).unwrap());

    let run = |seed| {
        let mut agent = Agent::dedicated((), tree.clone()).with_rng(StdRng::seed_from_u64(seed));
        (0..16).map(|_| agent.tick()).collect::<Vec<_>>()
    };
    assert_eq!(run(3), run(3));
}

#[test]
fn test_registered_condition() {
    let mut registry = Registry::<Log>::default();
    registry.register(
        "IsArmed",
        boxify(|| {
            ConditionNode::new(|ctx: &TickContext<Log>| {
                ctx.blackboard()
                    .get::<bool>("armed", Scope::Global)
                    .copied()
                    .unwrap_or(false)
            })
        }),
    );
    let source = parse_file(
        r#"
tree main = Sequence {
    IsArmed {
        Success
        Failure
    }
    Repeater (maxLoop = 2) {
        WaitTicks (duration = 1)
    }
}
"#,
    )
    .unwrap();
    let tree = load(&source, &registry).unwrap();
    let mut blackboard = Blackboard::new();

    assert_eq!(tick(&tree, &mut blackboard).0, Status::Failure);
    blackboard.set("armed", true, Scope::Global);
    assert_eq!(tick(&tree, &mut blackboard).0, Status::Success);
}

#[test]
fn test_tick_with_reuses_context() {
    let tree = BehaviorTree::new(BehaviorNodeContainer::<Log>::new(SuccessNode));
    let mut log = vec![];
    let mut blackboard = Blackboard::new();
    let mut ctx = tree.context(&mut log, &mut blackboard);
    for _ in 0..3 {
        assert_eq!(tree.tick_with(&mut ctx), Status::Success);
        assert_eq!(ctx.node_count(), 1);
        assert!(ctx.open_nodes().is_empty());
    }
}
