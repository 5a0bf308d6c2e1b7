use ::shared_behavior_tree::{
    Agent, BehaviorNode, BehaviorNodeContainer, BehaviorTree, Blackboard, ConditionNode, Lazy,
    MemSequenceNode, Scope, SequenceNode, Status, Symbol, TickContext, WaitTicksNode,
};
use std::rc::Rc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug)]
struct Guard {
    name: String,
    position: i32,
    alarms: u32,
}

static INTRUDER_SYM: Lazy<Symbol> = Lazy::new(|| "intruder".into());

/// Walks one step further on every tick and succeeds after `steps` steps.
struct WalkNode {
    steps: u32,
}

impl BehaviorNode<Guard> for WalkNode {
    fn open(&self, node: &BehaviorNodeContainer<Guard>, ctx: &mut TickContext<Guard>) {
        ctx.set(node.id(), "walked", 0_u32);
    }

    fn tick(&self, node: &BehaviorNodeContainer<Guard>, ctx: &mut TickContext<Guard>) -> Status {
        let walked = ctx.get::<u32>(node.id(), "walked").copied().unwrap_or(0) + 1;
        ctx.set(node.id(), "walked", walked);
        let guard = ctx.subject_mut();
        guard.position += 1;
        println!("{} walks to {}", guard.name, guard.position);
        if walked < self.steps {
            Status::Running
        } else {
            Status::Success
        }
    }
}

struct RaiseAlarmNode;

impl BehaviorNode<Guard> for RaiseAlarmNode {
    fn tick(&self, _node: &BehaviorNodeContainer<Guard>, ctx: &mut TickContext<Guard>) -> Status {
        let guard = ctx.subject_mut();
        guard.alarms += 1;
        println!("{} raises the alarm!", guard.name);
        Status::Success
    }
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();

    let patrol = BehaviorNodeContainer::with_children(
        MemSequenceNode,
        vec![
            BehaviorNodeContainer::new(WalkNode { steps: 3 }),
            BehaviorNodeContainer::new(WaitTicksNode::new(2)),
        ],
    );
    let alarm = BehaviorNodeContainer::with_children(
        SequenceNode,
        vec![BehaviorNodeContainer::new(RaiseAlarmNode)],
    );
    let root = ConditionNode::build(
        |ctx: &TickContext<Guard>| {
            ctx.blackboard()
                .get::<bool>(*INTRUDER_SYM, Scope::Global)
                .copied()
                .unwrap_or(false)
        },
        alarm,
        patrol,
    );
    let tree = Rc::new(BehaviorTree::new(root));

    let mut alice = Agent::dedicated(
        Guard {
            name: "Alice".to_owned(),
            position: 0,
            alarms: 0,
        },
        tree.clone(),
    );

    let mut bob_blackboard = Blackboard::new();
    bob_blackboard.set(*INTRUDER_SYM, false, Scope::Global);
    let mut bob = Agent::new(
        Guard {
            name: "Bob".to_owned(),
            position: 10,
            alarms: 0,
        },
        tree,
        bob_blackboard,
    );

    for round in 0..6 {
        if round == 4 {
            bob.blackboard_mut().set(*INTRUDER_SYM, true, Scope::Global);
        }
        let alice_status = alice.tick();
        let bob_status = bob.tick();
        println!("round {round}: Alice {alice_status:?}, Bob {bob_status:?}");
    }

    for guard in [alice.subject(), bob.subject()] {
        println!(
            "{} ended at {} with {} alarms: {guard:?}",
            guard.name, guard.position, guard.alarms
        );
    }
    println!("Total symbols: {}", Symbol::count());
}
