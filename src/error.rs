use thiserror::Error;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AddChildError {
    #[error("Attempted to add too many nodes")]
    TooManyNodes,
}

pub type AddChildResult = Result<(), AddChildError>;

/// A node parameter given in a tree source could not be used by the constructor.
#[derive(Error, Debug, PartialEq)]
#[non_exhaustive]
pub enum ParamError {
    #[error("Missing parameter {0:?}")]
    Missing(String),
    #[error("Parameter {name:?} should be {expected}")]
    Type { name: String, expected: &'static str },
}

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ParseError {
    #[error("Syntax error at {0:?}")]
    Syntax(String),
    #[error("Unparsed trailing input: {0:?}")]
    Incomplete(String),
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum LoadError {
    #[error("The main tree does not exist")]
    MissingTree,
    #[error("Node type or subtree name not found {0:?}")]
    MissingNode(String),
    #[error("Infinite recursion detected in subtree {node:?}")]
    InfiniteRecursion { node: String },
    #[error("{0} to {1}")]
    AddChildError(AddChildError, String),
    #[error("{source} in node {node}")]
    Param { node: String, source: ParamError },
}
