//! Declarative component schemas.
//!
//! A [`SchemaNode`] tree describes the per-entity fields of a store. It is
//! input only: compiling it into a store never mutates or retains it.
//!
//! # Data grammar
//!
//! With the `serde` feature, schemas deserialize from the plain-data form
//! used by component definitions:
//!
//! ```text
//! "f32"                          -> Scalar(F32)
//! { "type": "f32", "length": 3 } -> Array { ty: F32, length: 3 }
//! [{ "type": "f32", "length": 3 }] (legacy single-element form, same as above)
//! { "x": "f32", "y": "f32" }     -> Group
//! ```

use indexmap::IndexMap;

use crate::error::ConfigError;
use crate::id::{display_path, FieldPath};
use crate::types::PrimitiveType;

/// One node of a component schema.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "repr::Repr"))]
pub enum SchemaNode {
    /// Named children, compiled in insertion order.
    Group(IndexMap<String, SchemaNode>),
    /// One primitive value per entity.
    Scalar(PrimitiveType),
    /// `length` primitive values per entity.
    ///
    /// A `length` of zero means no length was declared and is rejected
    /// when the schema is compiled.
    Array {
        /// Element type.
        ty: PrimitiveType,
        /// Slots per entity.
        length: u32,
    },
}

impl SchemaNode {
    /// An empty group.
    pub fn group() -> Self {
        Self::Group(IndexMap::new())
    }

    /// A scalar leaf.
    pub fn scalar(ty: PrimitiveType) -> Self {
        Self::Scalar(ty)
    }

    /// An array leaf.
    pub fn array(ty: PrimitiveType, length: u32) -> Self {
        Self::Array { ty, length }
    }

    /// A scalar leaf from a catalog name.
    pub fn parse_scalar(name: &str) -> Result<Self, ConfigError> {
        Ok(Self::Scalar(name.parse()?))
    }

    /// An array leaf from a catalog name.
    pub fn parse_array(name: &str, length: u32) -> Result<Self, ConfigError> {
        Ok(Self::Array {
            ty: name.parse()?,
            length,
        })
    }

    /// Add a named child to a group.
    ///
    /// # Panics
    ///
    /// Panics if `self` is a leaf.
    #[must_use]
    pub fn with(self, name: impl Into<String>, child: SchemaNode) -> Self {
        match self {
            Self::Group(mut children) => {
                children.insert(name.into(), child);
                Self::Group(children)
            }
            leaf => panic!("cannot add a child to leaf node {leaf:?}"),
        }
    }

    /// Number of `Array` leaves anywhere in the tree.
    ///
    /// Scalars do not count. A bare `Array` root counts as one.
    pub fn array_field_count(&self) -> usize {
        match self {
            Self::Group(children) => children.values().map(Self::array_field_count).sum(),
            Self::Scalar(_) => 0,
            Self::Array { .. } => 1,
        }
    }

    /// Every leaf with its path, depth-first in compile order.
    pub fn leaves(&self) -> Vec<(FieldPath, &SchemaNode)> {
        let mut out = Vec::new();
        let mut path = FieldPath::new();
        self.collect_leaves(&mut path, &mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, path: &mut FieldPath, out: &mut Vec<(FieldPath, &'a SchemaNode)>) {
        match self {
            Self::Group(children) => {
                for (name, child) in children {
                    path.push(name.clone());
                    child.collect_leaves(path, out);
                    path.pop();
                }
            }
            leaf => out.push((path.clone(), leaf)),
        }
    }

    /// Check that every `Array` leaf declares a length.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (path, leaf) in self.leaves() {
            if let Self::Array { length: 0, .. } = leaf {
                return Err(ConfigError::MissingLength {
                    path: display_path(&path),
                });
            }
        }
        Ok(())
    }

    /// Follow `path` down from this node.
    pub fn get(&self, path: &[&str]) -> Option<&SchemaNode> {
        let mut node = self;
        for key in path {
            match node {
                Self::Group(children) => node = children.get(*key)?,
                _ => return None,
            }
        }
        Some(node)
    }
}

#[cfg(feature = "serde")]
mod repr {
    use indexmap::IndexMap;
    use serde::Deserialize;

    use super::SchemaNode;
    use crate::error::ConfigError;

    #[derive(Deserialize)]
    #[serde(deny_unknown_fields)]
    pub(super) struct ArrayRepr {
        #[serde(rename = "type")]
        ty: String,
        length: u32,
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    pub(super) enum Repr {
        Name(String),
        Array(ArrayRepr),
        Legacy([ArrayRepr; 1]),
        Group(IndexMap<String, Repr>),
    }

    impl TryFrom<Repr> for SchemaNode {
        type Error = ConfigError;

        fn try_from(repr: Repr) -> Result<Self, Self::Error> {
            match repr {
                Repr::Name(name) => SchemaNode::parse_scalar(&name),
                Repr::Array(a) | Repr::Legacy([a]) => SchemaNode::parse_array(&a.ty, a.length),
                Repr::Group(children) => children
                    .into_iter()
                    .map(|(k, v)| Ok((k, SchemaNode::try_from(v)?)))
                    .collect::<Result<IndexMap<_, _>, ConfigError>>()
                    .map(SchemaNode::Group),
            }
        }
    }
}
