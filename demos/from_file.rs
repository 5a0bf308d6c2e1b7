use ::shared_behavior_tree::{
    boxify_with, error::ParamError, load, parse_file, parse_yaml, BehaviorNode,
    BehaviorNodeContainer, Blackboard, Registry, Status, TickContext, TreeSource,
};
use std::fs;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

struct SayNode {
    text: String,
}

impl BehaviorNode<Vec<String>> for SayNode {
    fn tick(
        &self,
        _node: &BehaviorNodeContainer<Vec<String>>,
        ctx: &mut TickContext<Vec<String>>,
    ) -> Status {
        println!("{}", self.text);
        let text = self.text.clone();
        ctx.subject_mut().push(text);
        Status::Success
    }
}

/// Reads a tree source, picking the format from the file extension.
fn read_source(path: &str) -> anyhow::Result<TreeSource> {
    let text = fs::read_to_string(path)?;
    let source = if path.ends_with(".yaml") || path.ends_with(".yml") {
        parse_yaml(&text)?
    } else {
        parse_file(&text)?
    };
    Ok(source)
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();

    let mut registry = Registry::default();
    registry.register(
        "Say",
        boxify_with(|params| {
            Ok(SayNode {
                text: params
                    .str("text")?
                    .ok_or_else(|| ParamError::Missing("text".to_owned()))?
                    .to_owned(),
            })
        }),
    );

    let paths: Vec<String> = std::env::args().skip(1).collect();
    let paths = if paths.is_empty() {
        vec![
            concat!(env!("CARGO_MANIFEST_DIR"), "/demos/patrol.bt").to_owned(),
            concat!(env!("CARGO_MANIFEST_DIR"), "/demos/patrol.yaml").to_owned(),
        ]
    } else {
        paths
    };

    for path in &paths {
        let source = read_source(path)?;
        let tree = load(&source, &registry)?;

        let mut said = vec![];
        let mut blackboard = Blackboard::new();
        let mut ticks = 0;
        let result = loop {
            ticks += 1;
            let status = tree.tick(&mut said, &mut blackboard);
            if status.is_terminal() || ticks >= 20 {
                break status;
            }
        };

        eprintln!("{path}: {result:?} after {ticks} ticks, said {said:?}");
    }

    Ok(())
}
