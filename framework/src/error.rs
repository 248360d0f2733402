//! Container-wide error types
//!
//! Every fallible operation of the container returns [`ContainerError`]; loading a
//! configuration tree returns [`LoadError`], which wraps container errors raised
//! while registering the definitions it describes.

use std::path::PathBuf;
use thiserror::Error;

use crate::primitive::PrimitiveKind;

/// Errors raised while defining, resolving or building components
///
/// # Example
///
/// ```rust,ignore
/// use rivet::{Container, ContainerError};
///
/// fn car(container: &Container) -> Result<Arc<ElectricCar>, ContainerError> {
///     container.make::<ElectricCar>("tesla")
/// }
/// ```
#[derive(Debug, Clone, Error)]
pub enum ContainerError {
    /// A parameter or definition is malformed
    #[error("invalid definition '{subject}': {reason}")]
    InvalidDefinition {
        /// The parameter or component the problem was found on
        subject: String,
        /// What is wrong with it
        reason: String,
    },

    /// A literal does not parse as its declared primitive kind
    #[error("parameter '{parameter}': cannot read '{literal}' as {kind}: {reason}")]
    TypeCoercion {
        parameter: String,
        literal: String,
        kind: PrimitiveKind,
        reason: String,
    },

    /// A reference names neither a stored instance nor a registered definition
    #[error("parameter '{parameter}' references '{reference}', which is not registered")]
    ReferenceNotFound { parameter: String, reference: String },

    /// No matching constructor or mutator, or the construction itself failed
    #[error("cannot construct '{component}' of type '{target_type}': {reason}")]
    Construction {
        component: String,
        target_type: String,
        reason: String,
    },

    /// A component depends on itself, directly or transitively
    #[error("circular reference: {}", path.join(" -> "))]
    CircularReference {
        /// Component names along the cycle, first and last entries are equal
        path: Vec<String>,
    },

    /// A component requested by name is not registered
    #[error("component '{name}' not registered in container")]
    ComponentNotFound { name: String },

    /// A component exists but is not of the requested type
    #[error("component '{name}' is not a '{expected}'")]
    TypeMismatch {
        name: String,
        expected: &'static str,
    },
}

impl ContainerError {
    /// Create an InvalidDefinition error
    pub fn invalid(subject: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDefinition {
            subject: subject.into(),
            reason: reason.into(),
        }
    }

    /// Create a TypeCoercion error
    pub fn coercion(
        parameter: impl Into<String>,
        literal: impl Into<String>,
        kind: PrimitiveKind,
        reason: impl Into<String>,
    ) -> Self {
        Self::TypeCoercion {
            parameter: parameter.into(),
            literal: literal.into(),
            kind,
            reason: reason.into(),
        }
    }

    /// Create a ReferenceNotFound error
    pub fn reference_not_found(parameter: impl Into<String>, reference: impl Into<String>) -> Self {
        Self::ReferenceNotFound {
            parameter: parameter.into(),
            reference: reference.into(),
        }
    }

    /// Create a Construction error
    pub fn construction(
        component: impl Into<String>,
        target_type: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Construction {
            component: component.into(),
            target_type: target_type.into(),
            reason: reason.into(),
        }
    }

    /// Create a ComponentNotFound error
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::ComponentNotFound { name: name.into() }
    }

    /// Create a TypeMismatch error for the requested type
    pub fn type_mismatch<T: ?Sized>(name: impl Into<String>) -> Self {
        Self::TypeMismatch {
            name: name.into(),
            expected: std::any::type_name::<T>(),
        }
    }

    /// Check if this error reports a missing reference
    pub fn is_reference_not_found(&self) -> bool {
        matches!(self, Self::ReferenceNotFound { .. })
    }
}

/// Errors raised while loading component definitions from a configuration tree
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("expected <{expected}> element, found <{found}>")]
    UnexpectedElement {
        expected: &'static str,
        found: String,
    },

    #[error("<{element}> element is missing attribute '{attribute}'")]
    MissingAttribute {
        element: String,
        attribute: &'static str,
    },

    #[error(transparent)]
    Definition(#[from] ContainerError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_message_lists_path() {
        let err = ContainerError::CircularReference {
            path: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(err.to_string(), "circular reference: a -> b -> a");
    }

    #[test]
    fn test_coercion_message() {
        let err = ContainerError::coercion("number", "abc", PrimitiveKind::Integer, "invalid digit");
        assert_eq!(
            err.to_string(),
            "parameter 'number': cannot read 'abc' as i32: invalid digit"
        );
    }
}
