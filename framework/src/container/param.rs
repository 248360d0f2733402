//! Constructor and setter parameters
//!
//! A [`Parameter`] is a named, typed slot that resolves either from a literal
//! (coerced into one of the primitive kinds) or from a reference to another
//! component. The invariants are checked once, at construction:
//!
//! - name and declared type are present
//! - literal and reference are mutually exclusive
//! - a non-primitive type can only be satisfied by a reference

use std::fmt;

use crate::container::catalog::InjectableField;
use crate::container::Resolution;
use crate::error::ContainerError;
use crate::primitive::{PrimitiveKind, TypeRef, Value};

/// Where a parameter's value comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Text coerced into the declared primitive kind
    Literal { kind: PrimitiveKind, text: String },
    /// Name of another component
    Reference(String),
    /// Neither literal nor reference was given
    Unset,
}

/// A resolvable, immutable parameter slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    name: String,
    declared_type: TypeRef,
    source: Source,
    optional: bool,
}

impl Parameter {
    /// Create a parameter, enforcing the literal/reference invariants
    ///
    /// # Example
    /// ```rust,ignore
    /// let charge = Parameter::new("charge_left", "f64", Some("40.0".into()), None)?;
    /// let battery = Parameter::new("battery", "Battery", None, Some("battery".into()))?;
    /// ```
    pub fn new(
        name: impl Into<String>,
        declared_type: impl Into<String>,
        literal: Option<String>,
        reference: Option<String>,
    ) -> Result<Self, ContainerError> {
        let name = name.into();
        let declared_type = declared_type.into();

        if name.trim().is_empty() {
            return Err(ContainerError::invalid(
                format!("<parameter of type {}>", declared_type),
                "parameter name is required",
            ));
        }
        if declared_type.trim().is_empty() {
            return Err(ContainerError::invalid(&name, "parameter type is required"));
        }

        let declared_type = TypeRef::new(declared_type);
        let source = match (literal, reference) {
            (Some(_), Some(_)) => {
                return Err(ContainerError::invalid(
                    &name,
                    "only one of value or ref may be given",
                ))
            }
            (None, Some(reference)) if reference.trim().is_empty() => {
                return Err(ContainerError::invalid(&name, "ref must not be empty"))
            }
            (None, Some(reference)) => Source::Reference(reference),
            (literal, None) => match declared_type.primitive() {
                Some(kind) => match literal {
                    Some(text) => Source::Literal { kind, text },
                    None => Source::Unset,
                },
                None => {
                    return Err(ContainerError::invalid(
                        &name,
                        format!(
                            "type '{}' is not primitive and can only be given by ref",
                            declared_type
                        ),
                    ))
                }
            },
        };

        Ok(Self {
            name,
            declared_type,
            source,
            optional: false,
        })
    }

    /// Create a literal parameter
    pub fn literal(
        name: impl Into<String>,
        declared_type: impl Into<String>,
        text: impl Into<String>,
    ) -> Result<Self, ContainerError> {
        Self::new(name, declared_type, Some(text.into()), None)
    }

    /// Create a reference parameter
    pub fn reference(
        name: impl Into<String>,
        declared_type: impl Into<String>,
        reference: impl Into<String>,
    ) -> Result<Self, ContainerError> {
        Self::new(name, declared_type, None, Some(reference.into()))
    }

    /// Reference-only parameter for an injectable field, named after the field
    pub(crate) fn injected(field: &InjectableField) -> Self {
        Self {
            name: field.name.clone(),
            declared_type: field.field_type.clone(),
            source: Source::Reference(field.name.clone()),
            optional: field.optional,
        }
    }

    /// Tolerate a missing reference when this parameter feeds a setter
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declared_type(&self) -> &TypeRef {
        &self.declared_type
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn literal_text(&self) -> Option<&str> {
        match &self.source {
            Source::Literal { text, .. } => Some(text),
            _ => None,
        }
    }

    pub fn reference_name(&self) -> Option<&str> {
        match &self.source {
            Source::Reference(reference) => Some(reference),
            _ => None,
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self.source, Source::Literal { .. })
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Resolve this parameter into a value
    ///
    /// Literals are coerced to their declared kind; references are resolved
    /// through the container, building the referenced component if needed.
    pub(crate) fn resolve(&self, cx: &mut Resolution<'_>) -> Result<Value, ContainerError> {
        match &self.source {
            Source::Literal { kind, text } => kind
                .parse(text)
                .map_err(|reason| ContainerError::coercion(&self.name, text, *kind, reason)),
            Source::Reference(reference) => cx
                .resolve(reference)?
                .map(Value::Component)
                .ok_or_else(|| ContainerError::reference_not_found(&self.name, reference)),
            Source::Unset => Err(ContainerError::invalid(
                &self.name,
                "neither value nor ref was given",
            )),
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<param name=\"{}\" type=\"{}\"", self.name, self.declared_type)?;
        match &self.source {
            Source::Literal { text, .. } => write!(f, " value=\"{}\"", text)?,
            Source::Reference(reference) => write!(f, " ref=\"{}\"", reference)?,
            Source::Unset => {}
        }
        if self.optional {
            f.write_str(" optional=\"true\"")?;
        }
        f.write_str(" />")
    }
}
