use std::{collections::HashMap, time::Duration};

use crate::{
    error::ParamError,
    nodes::{
        ErrorNode, FailerNode, FailureNode, InverterNode, LimiterTicksNode, LimiterTimeNode,
        MemSelectorNode, MemSequenceNode, RandomSelectorNode, RepeatUntilFailureNode,
        RepeatUntilSuccessNode, RepeaterNode, RunnerNode, RunningNode, SelectorNode,
        SequenceNode, SucceederNode, SuccessNode, WaitTicksNode, WaitTimeNode,
    },
    parser::type_error,
    BehaviorNode, Params,
};

pub type Constructor<S> = Box<dyn Fn(&Params) -> Result<Box<dyn BehaviorNode<S>>, ParamError>>;

/// Wraps a constructor of a node type that takes no parameters.
pub fn boxify<S, T>(cons: impl (Fn() -> T) + 'static) -> Constructor<S>
where
    T: BehaviorNode<S> + 'static,
{
    Box::new(move |_: &Params| -> Result<Box<dyn BehaviorNode<S>>, ParamError> {
        Ok(Box::new(cons()))
    })
}

/// Wraps a constructor that reads its parameters.
pub fn boxify_with<S, T>(cons: impl (Fn(&Params) -> Result<T, ParamError>) + 'static) -> Constructor<S>
where
    T: BehaviorNode<S> + 'static,
{
    Box::new(
        move |params: &Params| -> Result<Box<dyn BehaviorNode<S>>, ParamError> {
            Ok(Box::new(cons(params)?))
        },
    )
}

/// Node types by the name used in tree sources.
pub struct Registry<S> {
    node_types: HashMap<String, Constructor<S>>,
}

impl<S> Default for Registry<S> {
    fn default() -> Self {
        let mut ret = Self::empty();
        ret.register("Sequence", boxify(|| SequenceNode));
        ret.register("Selector", boxify(|| SelectorNode));
        ret.register("MemSequence", boxify(|| MemSequenceNode));
        ret.register("MemSelector", boxify(|| MemSelectorNode));
        ret.register("RandomSelector", boxify(|| RandomSelectorNode));
        ret.register("Inverter", boxify(|| InverterNode));
        ret.register(
            "LimiterTime",
            boxify_with(|params| Ok(LimiterTimeNode::new(required(params, "maxTime", millis)?))),
        );
        ret.register(
            "LimiterTicks",
            boxify_with(|params| Ok(LimiterTicksNode::new(required(params, "maxTicks", count)?))),
        );
        ret.register(
            "Repeater",
            boxify_with(|params| {
                Ok(max_loop(params)?.map_or_else(RepeaterNode::unbounded, RepeaterNode::new))
            }),
        );
        ret.register(
            "RepeatUntilFailure",
            boxify_with(|params| {
                Ok(max_loop(params)?.map_or_else(
                    RepeatUntilFailureNode::unbounded,
                    RepeatUntilFailureNode::new,
                ))
            }),
        );
        ret.register(
            "RepeatUntilSuccess",
            boxify_with(|params| {
                Ok(max_loop(params)?.map_or_else(
                    RepeatUntilSuccessNode::unbounded,
                    RepeatUntilSuccessNode::new,
                ))
            }),
        );
        ret.register("Failer", boxify(|| FailerNode));
        ret.register("Runner", boxify(|| RunnerNode));
        ret.register("Succeeder", boxify(|| SucceederNode));
        ret.register("Error", boxify(|| ErrorNode));
        ret.register("Failure", boxify(|| FailureNode));
        ret.register("Running", boxify(|| RunningNode));
        ret.register("Success", boxify(|| SuccessNode));
        ret.register(
            "WaitTime",
            boxify_with(|params| {
                Ok(WaitTimeNode::new(millis(params, "duration")?.unwrap_or_default()))
            }),
        );
        ret.register(
            "WaitTicks",
            boxify_with(|params| Ok(WaitTicksNode::new(count(params, "duration")?.unwrap_or(0)))),
        );
        ret
    }
}

impl<S> Registry<S> {
    /// A registry without even the built-in node types.
    pub fn empty() -> Self {
        Self {
            node_types: HashMap::new(),
        }
    }

    pub fn register(&mut self, type_name: impl ToString, constructor: Constructor<S>) {
        self.node_types.insert(type_name.to_string(), constructor);
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.node_types.contains_key(type_name)
    }

    /// Returns `None` if the type is not registered.
    pub fn build(
        &self,
        type_name: &str,
        params: &Params,
    ) -> Option<Result<Box<dyn BehaviorNode<S>>, ParamError>> {
        self.node_types
            .get(type_name)
            .map(|constructor| constructor(params))
    }
}

fn required<T>(
    params: &Params,
    name: &str,
    get: impl Fn(&Params, &str) -> Result<Option<T>, ParamError>,
) -> Result<T, ParamError> {
    get(params, name)?.ok_or_else(|| ParamError::Missing(name.to_owned()))
}

/// A non-negative number of milliseconds.
fn millis(params: &Params, name: &str) -> Result<Option<Duration>, ParamError> {
    match params.float(name)? {
        // `Duration` holds fewer than 2^64 whole seconds
        Some(ms) if ms.is_finite() && ms >= 0. && ms / 1000. < u64::MAX as f64 => {
            Ok(Some(Duration::from_secs_f64(ms / 1000.)))
        }
        Some(ms) if ms.is_finite() && ms >= 0. => {
            Err(type_error(name, "a number of milliseconds within range"))
        }
        Some(_) => Err(type_error(name, "a non-negative number of milliseconds")),
        None => Ok(None),
    }
}

fn count(params: &Params, name: &str) -> Result<Option<u32>, ParamError> {
    match params.int(name)? {
        Some(val) => u32::try_from(val)
            .map(Some)
            .map_err(|_| type_error(name, "a non-negative integer")),
        None => Ok(None),
    }
}

/// `maxLoop`, where a negative value means no limit.
fn max_loop(params: &Params) -> Result<Option<u32>, ParamError> {
    match params.int("maxLoop")? {
        Some(val) if val < 0 => Ok(None),
        Some(val) => u32::try_from(val)
            .map(Some)
            .map_err(|_| type_error("maxLoop", "an integer within u32")),
        None => Ok(None),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ParamValue;

    #[test]
    fn test_builtin_names() {
        let registry = Registry::<()>::default();
        for name in [
            "Sequence", "Selector", "MemSequence", "MemSelector", "RandomSelector", "Inverter",
            "Repeater", "RepeatUntilFailure", "RepeatUntilSuccess", "Failer", "Runner",
            "Succeeder", "Error", "Failure", "Running", "Success", "WaitTime", "WaitTicks",
        ] {
            assert!(
                matches!(registry.build(name, &Params::new()), Some(Ok(_))),
                "{name} should build without parameters"
            );
        }
        assert!(registry.build("Condition", &Params::new()).is_none());
        assert!(!Registry::<()>::empty().contains("Sequence"));
    }

    #[test]
    fn test_param_errors() {
        let registry = Registry::<()>::default();
        assert_eq!(
            registry.build("LimiterTicks", &Params::new()).unwrap().err(),
            Some(ParamError::Missing("maxTicks".to_owned()))
        );

        let params: Params = [("maxTicks", ParamValue::Int(-1))].into_iter().collect();
        assert!(matches!(
            registry.build("LimiterTicks", &params),
            Some(Err(ParamError::Type { .. }))
        ));

        let params: Params = [("maxTime", ParamValue::Str("soon".into()))]
            .into_iter()
            .collect();
        assert!(matches!(
            registry.build("LimiterTime", &params),
            Some(Err(ParamError::Type { .. }))
        ));

        let params: Params = [("maxLoop", ParamValue::Int(-1))].into_iter().collect();
        assert!(matches!(registry.build("Repeater", &params), Some(Ok(_))));
    }

    #[test]
    fn test_param_conversions() {
        let params: Params = [
            ("duration", ParamValue::Float(1.5)),
            ("maxLoop", ParamValue::Int(-3)),
            ("maxTicks", ParamValue::Int(7)),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            millis(&params, "duration"),
            Ok(Some(Duration::from_micros(1500)))
        );
        assert_eq!(max_loop(&params), Ok(None));
        assert_eq!(count(&params, "maxTicks"), Ok(Some(7)));
        assert_eq!(count(&params, "absent"), Ok(None));
    }

    #[test]
    fn test_durations_out_of_range() {
        let registry = Registry::<()>::default();
        for (type_name, name) in [("LimiterTime", "maxTime"), ("WaitTime", "duration")] {
            let params: Params = [(name, ParamValue::Float(1e30))].into_iter().collect();
            assert_eq!(
                registry.build(type_name, &params).unwrap().err(),
                Some(ParamError::Type {
                    name: name.to_owned(),
                    expected: "a number of milliseconds within range",
                }),
                "{type_name}"
            );

            let params: Params = [(name, ParamValue::Float(1e15))].into_iter().collect();
            assert!(matches!(registry.build(type_name, &params), Some(Ok(_))), "{type_name}");
        }
    }
}
