//! Configuration errors raised while compiling a schema.
//!
//! Every variant aborts the current compile or pack step immediately;
//! no partially built store is ever handed back.

use thiserror::Error;

/// A schema or capacity that cannot be turned into a store.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// An `Array` leaf declared no length (or a length of zero).
    #[error("array field '{path}' must define a length")]
    MissingLength {
        /// Dotted path of the offending leaf.
        path: String,
    },
    /// A leaf named a type that is not in the primitive catalog.
    #[error("invalid component property type '{name}'")]
    UnknownType {
        /// The unrecognised type name.
        name: String,
    },
    /// A store was requested with room for zero entities.
    #[error("store capacity must be at least 1")]
    ZeroCapacity,
    /// A buffer size computation does not fit in the address space.
    #[error("buffer size overflow while sizing {what}")]
    Overflow {
        /// What was being sized when the overflow happened.
        what: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offender() {
        let err = ConfigError::MissingLength {
            path: "body.position".into(),
        };
        assert_eq!(
            err.to_string(),
            "array field 'body.position' must define a length"
        );

        let err = ConfigError::UnknownType { name: "u128".into() };
        assert!(err.to_string().contains("u128"));
    }
}
