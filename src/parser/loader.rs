use tracing::debug;

use super::{TreeDef, TreeSource};
use crate::{error::LoadError, BehaviorNodeContainer, BehaviorTree, Registry};

/// Instantiate a behavior tree from the `main` tree of a source.
///
/// A type name that the registry does not know is looked up among the other trees of
/// the source and expanded in place, with its own node instances at every use.
pub fn load<S>(tree_source: &TreeSource, registry: &Registry<S>) -> Result<BehaviorTree<S>, LoadError> {
    let main = tree_source.find("main").ok_or(LoadError::MissingTree)?;

    let top = TreeStack {
        name: "main",
        parent: None,
    };

    let root = load_recurse(main, registry, tree_source, &top)?;
    let tree = BehaviorTree::new(root);
    debug!(tree = %tree.id(), "loaded tree");
    Ok(tree)
}

/// The chain of subtree names being expanded, kept on the call stack, to detect
/// a subtree that contains itself.
///
/// Recursive subtrees would need lazy instantiation while ticking, which the
/// `&self` tick of a shared tree cannot do, so they are an error.
struct TreeStack<'a, 'src> {
    name: &'src str,
    parent: Option<&'a TreeStack<'a, 'src>>,
}

impl<'a, 'src> TreeStack<'a, 'src> {
    fn find(&self, name: &str) -> bool {
        if self.name == name {
            true
        } else if let Some(parent) = self.parent {
            parent.find(name)
        } else {
            false
        }
    }
}

fn load_recurse<S>(
    def: &TreeDef,
    registry: &Registry<S>,
    tree_source: &TreeSource,
    parent_stack: &TreeStack,
) -> Result<BehaviorNodeContainer<S>, LoadError> {
    let mut ret = if let Some(node) = registry.build(&def.ty, &def.params) {
        let node = node.map_err(|source| LoadError::Param {
            node: def.ty.clone(),
            source,
        })?;
        let container = BehaviorNodeContainer::new_raw_with_name(node, def.ty.clone());
        debug!(node = %def.ty, id = %container.id(), "loaded node");
        container
    } else {
        let tree = tree_source
            .find(&def.ty)
            .ok_or_else(|| LoadError::MissingNode(def.ty.clone()))?;

        // Prevent infinite recursion
        if parent_stack.find(&def.ty) {
            return Err(LoadError::InfiniteRecursion {
                node: def.ty.clone(),
            });
        }
        let tree_stack = TreeStack {
            name: &def.ty,
            parent: Some(parent_stack),
        };
        debug!(subtree = %def.ty, "expanding subtree");
        load_recurse(tree, registry, tree_source, &tree_stack)?
    };

    for child in &def.children {
        let child_node = load_recurse(child, registry, tree_source, parent_stack)?;
        ret.add_child(child_node)
            .map_err(|e| LoadError::AddChildError(e, def.ty.clone()))?;
    }

    Ok(ret)
}
