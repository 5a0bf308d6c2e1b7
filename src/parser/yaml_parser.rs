use serde::Deserialize;
use std::collections::BTreeMap;

use super::{TreeDef, TreeRootDef, TreeSource};
use crate::error::ParseError;

#[derive(Deserialize)]
struct YamlSource {
    behavior_tree: BTreeMap<String, TreeDef>,
}

/// Parses trees given as a `behavior_tree` mapping from tree names to nodes.
///
/// Each node has a `type`, and optionally `params` and `children`:
///
/// ```yaml
/// behavior_tree:
///   main:
///     type: Repeater
///     params:
///       maxLoop: 3
///     children:
///     - type: Success
/// ```
pub fn parse_yaml(yaml: &str) -> Result<TreeSource, ParseError> {
    let source: YamlSource = serde_yaml::from_str(yaml)?;
    Ok(TreeSource {
        tree_defs: source
            .behavior_tree
            .into_iter()
            .map(|(name, root)| TreeRootDef { name, root })
            .collect(),
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ParamValue;

    #[test]
    fn test_yaml_tree() {
        let source = parse_yaml(
            r#"
behavior_tree:
  main:
    type: Sequence
    children:
    - type: WaitTicks
      params:
        duration: 2
    - type: LimiterTime
      params:
        maxTime: 1.5
        label: "slow"
        strict: true
    - Patrol
  Patrol:
    type: Success
"#,
        );
        // A child must be a mapping with a type
        assert!(matches!(source, Err(ParseError::Yaml(_))));

        let source = parse_yaml(
            r#"
behavior_tree:
  main:
    type: Sequence
    children:
    - type: WaitTicks
      params:
        duration: 2
    - type: LimiterTime
      params:
        maxTime: 1.5
        label: "slow"
        strict: true
    - type: Patrol
  Patrol:
    type: Success
"#,
        )
        .unwrap();

        let main = source.find("main").unwrap();
        assert_eq!(main.ty, "Sequence");
        assert_eq!(main.children.len(), 3);
        assert_eq!(
            main.children[0].params.get("duration"),
            Some(&ParamValue::Int(2))
        );
        let limiter = &main.children[1].params;
        assert_eq!(limiter.get("maxTime"), Some(&ParamValue::Float(1.5)));
        assert_eq!(limiter.get("label"), Some(&ParamValue::Str("slow".into())));
        assert_eq!(limiter.get("strict"), Some(&ParamValue::Bool(true)));
        assert_eq!(source.find("Patrol"), Some(&TreeDef::new("Success")));
    }

    #[test]
    fn test_yaml_missing_root() {
        assert!(parse_yaml("trees: {}").is_err());
    }
}
