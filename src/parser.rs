//! Tree sources: the AST shared by the text format and YAML, and the loader that
//! turns it into a [`crate::BehaviorTree`].

mod loader;
mod nom_parser;
mod yaml_parser;

use serde::Deserialize;
use std::collections::BTreeMap;

use crate::error::ParamError;

pub use self::{loader::load, nom_parser::parse_file, yaml_parser::parse_yaml};

/// A literal parameter value.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

/// Parameters given to a node constructor, by name.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Params(BTreeMap<String, ParamValue>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: ParamValue) -> Option<ParamValue> {
        self.0.insert(name.into(), value)
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn int(&self, name: &str) -> Result<Option<i64>, ParamError> {
        match self.get(name) {
            None => Ok(None),
            Some(ParamValue::Int(val)) => Ok(Some(*val)),
            Some(_) => Err(type_error(name, "an integer")),
        }
    }

    /// Integers are accepted as floats.
    pub fn float(&self, name: &str) -> Result<Option<f64>, ParamError> {
        match self.get(name) {
            None => Ok(None),
            Some(ParamValue::Int(val)) => Ok(Some(*val as f64)),
            Some(ParamValue::Float(val)) => Ok(Some(*val)),
            Some(_) => Err(type_error(name, "a number")),
        }
    }

    pub fn bool(&self, name: &str) -> Result<Option<bool>, ParamError> {
        match self.get(name) {
            None => Ok(None),
            Some(ParamValue::Bool(val)) => Ok(Some(*val)),
            Some(_) => Err(type_error(name, "a boolean")),
        }
    }

    pub fn str(&self, name: &str) -> Result<Option<&str>, ParamError> {
        match self.get(name) {
            None => Ok(None),
            Some(ParamValue::Str(val)) => Ok(Some(val)),
            Some(_) => Err(type_error(name, "a string")),
        }
    }
}

impl<K: Into<String>> FromIterator<(K, ParamValue)> for Params {
    fn from_iter<T: IntoIterator<Item = (K, ParamValue)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

pub(crate) fn type_error(name: &str, expected: &'static str) -> ParamError {
    ParamError::Type {
        name: name.to_owned(),
        expected,
    }
}

/// One node of a tree source: a node type name, or the name of another tree.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TreeDef {
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub params: Params,
    #[serde(default)]
    pub children: Vec<TreeDef>,
}

impl TreeDef {
    pub fn new(ty: impl Into<String>) -> Self {
        Self {
            ty: ty.into(),
            params: Params::new(),
            children: vec![],
        }
    }

    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    pub fn with_children(mut self, children: Vec<TreeDef>) -> Self {
        self.children = children;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TreeRootDef {
    pub name: String,
    pub root: TreeDef,
}

/// All the named trees of one source. `main` is the entry point for [`load`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TreeSource {
    pub tree_defs: Vec<TreeRootDef>,
}

impl TreeSource {
    /// The first tree with the given name.
    pub fn find(&self, name: &str) -> Option<&TreeDef> {
        self.tree_defs
            .iter()
            .find(|tree| tree.name == name)
            .map(|tree| &tree.root)
    }
}
