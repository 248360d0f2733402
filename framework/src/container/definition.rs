//! Component definitions and the build protocol
//!
//! A [`ComponentDefinition`] is the blueprint for one named component: its
//! target type, ordered constructor parameters and setter parameters keyed by
//! field. Building one runs in three steps:
//!
//! 1. construct, through the constructor matching the declared parameter
//!    types or through the default constructor
//! 2. apply every setter parameter, explicit ones first, then injected fields
//! 3. hand the finished instance to the store
//!
//! Setters run after the constructor, so a field given both ways ends up with
//! the setter's value.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::container::catalog::{ConstructorSpec, SetterSpec, TypeCatalog, TypeDescriptor};
use crate::container::param::Parameter;
use crate::container::scanner;
use crate::container::Resolution;
use crate::error::ContainerError;
use crate::primitive::{Instance, TypeRef, Value};

/// Conventional mutator name for a field
pub fn mutator_name(field: &str) -> String {
    format!("set_{}", field)
}

/// Blueprint for one named component
#[derive(Clone)]
pub struct ComponentDefinition {
    name: String,
    target_type: TypeRef,
    descriptor: Arc<TypeDescriptor>,
    constructor_params: Vec<Parameter>,
    setter_params: IndexMap<String, Parameter>,
}

impl ComponentDefinition {
    /// Create a definition for a type known to `catalog`
    ///
    /// Setter parameters are keyed by parameter name; a later parameter for the
    /// same field replaces an earlier one. Injectable fields of the target type
    /// that have no explicit setter parameter get a synthesized reference
    /// parameter named after the field.
    pub fn new(
        name: impl Into<String>,
        target_type: impl Into<String>,
        constructor_params: Vec<Parameter>,
        setter_params: Vec<Parameter>,
        catalog: &TypeCatalog,
    ) -> Result<Self, ContainerError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ContainerError::invalid(
                "<unnamed component>",
                "component name is required",
            ));
        }

        let target_type = TypeRef::new(target_type);
        let descriptor = catalog.get(&target_type).cloned().ok_or_else(|| {
            ContainerError::invalid(&name, format!("unknown component type '{}'", target_type))
        })?;

        let mut setters = IndexMap::new();
        for param in setter_params {
            setters.insert(param.name().to_string(), param);
        }
        scanner::merge_injectables(&mut setters, &descriptor);

        Ok(Self {
            name,
            target_type,
            descriptor,
            constructor_params,
            setter_params: setters,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target_type(&self) -> &TypeRef {
        &self.target_type
    }

    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    pub fn constructor_params(&self) -> &[Parameter] {
        &self.constructor_params
    }

    pub fn setter_params(&self) -> &IndexMap<String, Parameter> {
        &self.setter_params
    }

    pub fn setter_param(&self, field: &str) -> Option<&Parameter> {
        self.setter_params.get(field)
    }

    /// Names of every component this definition references
    pub fn references(&self) -> impl Iterator<Item = &str> {
        self.constructor_params
            .iter()
            .chain(self.setter_params.values())
            .filter_map(Parameter::reference_name)
    }

    /// Check that the target type has the constructor and mutators this
    /// definition needs, without building anything
    pub fn check(&self) -> Result<(), ContainerError> {
        if self.constructor_params.is_empty() {
            if !self.descriptor.has_default_constructor() {
                return Err(self.construction_error("no default constructor"));
            }
        } else {
            self.matching_constructor()?;
        }

        for (field, param) in &self.setter_params {
            self.matching_setter(field, param)?;
        }
        Ok(())
    }

    /// Build a fresh instance
    ///
    /// Caching the result is up to the caller, see
    /// [`Container::resolve`](crate::Container::resolve).
    pub(crate) fn construct(&self, cx: &mut Resolution<'_>) -> Result<Instance, ContainerError> {
        tracing::debug!(
            component = %self.name,
            target_type = %self.target_type,
            "building component"
        );

        let mut object = if self.constructor_params.is_empty() {
            self.descriptor
                .construct_default()
                .ok_or_else(|| self.construction_error("no default constructor"))?
        } else {
            let constructor = self.matching_constructor()?;
            let args = self
                .constructor_params
                .iter()
                .map(|param| param.resolve(cx))
                .collect::<Result<Vec<_>, _>>()?;
            constructor
                .invoke(args)
                .map_err(|reason| self.construction_error(reason))?
        };

        self.apply_setters(object.as_mut(), cx)?;
        Ok(Instance::from(object))
    }

    fn apply_setters(
        &self,
        target: &mut (dyn Any + Send + Sync),
        cx: &mut Resolution<'_>,
    ) -> Result<(), ContainerError> {
        for (field, param) in &self.setter_params {
            let setter = self.matching_setter(field, param)?;

            if param.is_optional() {
                if let Some(reference) = param.reference_name() {
                    if cx.cached(param.name()).is_none() && !cx.is_known(reference) {
                        tracing::warn!(
                            component = %self.name,
                            field = %field,
                            reference,
                            "optional reference not registered, leaving field at its default"
                        );
                        continue;
                    }
                }
            }

            let value = self.setter_value(param, cx)?;
            setter.invoke(target, value).map_err(|reason| {
                self.construction_error(format!("{}: {}", mutator_name(field), reason))
            })?;
        }
        Ok(())
    }

    /// An instance already stored under the parameter's own name is used in
    /// preference to resolving its reference. Literals always use their text.
    fn setter_value(&self, param: &Parameter, cx: &mut Resolution<'_>) -> Result<Value, ContainerError> {
        if !param.is_literal() {
            if let Some(instance) = cx.cached(param.name()) {
                tracing::trace!(component = %self.name, field = param.name(), "using stored instance");
                return Ok(Value::Component(instance));
            }
        }
        param.resolve(cx)
    }

    fn matching_constructor(&self) -> Result<&ConstructorSpec, ContainerError> {
        let types: Vec<&TypeRef> = self
            .constructor_params
            .iter()
            .map(Parameter::declared_type)
            .collect();
        self.descriptor.constructor_for(&types).ok_or_else(|| {
            let signature = types
                .iter()
                .map(|t| t.name())
                .collect::<Vec<_>>()
                .join(", ");
            self.construction_error(format!("no constructor taking ({})", signature))
        })
    }

    fn matching_setter(
        &self,
        field: &str,
        param: &Parameter,
    ) -> Result<&SetterSpec, ContainerError> {
        let setter = self.descriptor.setter(field).ok_or_else(|| {
            self.construction_error(format!(
                "no mutator {}({})",
                mutator_name(field),
                param.declared_type()
            ))
        })?;
        if setter.field_type() != param.declared_type() {
            return Err(self.construction_error(format!(
                "{} takes {}, parameter declares {}",
                mutator_name(field),
                setter.field_type(),
                param.declared_type()
            )));
        }
        Ok(setter)
    }

    fn construction_error(&self, reason: impl Into<String>) -> ContainerError {
        ContainerError::construction(&self.name, self.target_type.name(), reason)
    }
}

impl fmt::Debug for ComponentDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentDefinition")
            .field("name", &self.name)
            .field("target_type", &self.target_type)
            .field("constructor_params", &self.constructor_params)
            .field("setter_params", &self.setter_params)
            .finish()
    }
}

impl fmt::Display for ComponentDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "component '{}' ({})", self.name, self.target_type)?;
        for param in &self.constructor_params {
            writeln!(f, "  constructor {}", param)?;
        }
        for param in self.setter_params.values() {
            writeln!(f, "  setter {}", param)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::Container;
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct Sign {
        text: String,
        size: i32,
    }

    fn catalog() -> TypeCatalog {
        let mut catalog = TypeCatalog::new();
        catalog.register(
            TypeDescriptor::of::<Sign>("Sign")
                .default_constructor()
                .constructor(vec![TypeRef::of::<String>()], |args| {
                    Ok(Sign {
                        text: args.next()?,
                        size: 1,
                    })
                })
                .setter("text", |s: &mut Sign, v: String| s.text = v)
                .setter("size", |s: &mut Sign, v: i32| s.size = v)
                .build(),
        );
        catalog
    }

    fn text(name: &str, value: &str) -> Parameter {
        Parameter::literal(name, "String", value).unwrap()
    }

    #[test]
    fn test_unknown_type_is_invalid() {
        let err = ComponentDefinition::new("x", "Nope", vec![], vec![], &catalog()).unwrap_err();
        assert!(matches!(err, ContainerError::InvalidDefinition { .. }));
    }

    #[test]
    fn test_setter_overrides_constructor() {
        let catalog = catalog();
        let def = ComponentDefinition::new(
            "sign",
            "Sign",
            vec![text("text", "A")],
            vec![text("text", "B")],
            &catalog,
        )
        .unwrap();

        let container = Container::new(catalog);
        let instance = def.construct(&mut Resolution::new(&container)).unwrap();
        let sign = instance.downcast_ref::<Sign>().unwrap();
        assert_eq!(sign.text, "B");
        assert_eq!(sign.size, 1);
    }

    #[test]
    fn test_no_matching_constructor() {
        let catalog = catalog();
        let def = ComponentDefinition::new(
            "sign",
            "Sign",
            vec![Parameter::literal("size", "i32", "3").unwrap()],
            vec![],
            &catalog,
        )
        .unwrap();

        let err = def.check().unwrap_err();
        assert_eq!(
            err.to_string(),
            "cannot construct 'sign' of type 'Sign': no constructor taking (i32)"
        );
    }

    #[test]
    fn test_missing_and_mistyped_mutators() {
        let catalog = catalog();
        let missing =
            ComponentDefinition::new("a", "Sign", vec![], vec![text("colour", "red")], &catalog)
                .unwrap();
        assert_eq!(
            missing.check().unwrap_err().to_string(),
            "cannot construct 'a' of type 'Sign': no mutator set_colour(String)"
        );

        let mistyped =
            ComponentDefinition::new("b", "Sign", vec![], vec![text("size", "3")], &catalog)
                .unwrap();
        assert_eq!(
            mistyped.check().unwrap_err().to_string(),
            "cannot construct 'b' of type 'Sign': set_size takes i32, parameter declares String"
        );
    }

    #[test]
    fn test_later_setter_param_replaces_earlier() {
        let def = ComponentDefinition::new(
            "sign",
            "Sign",
            vec![],
            vec![text("text", "first"), text("text", "second")],
            &catalog(),
        )
        .unwrap();
        assert_eq!(def.setter_params().len(), 1);
        assert_eq!(def.setter_param("text").unwrap().literal_text(), Some("second"));
    }

    #[test]
    fn test_display_lists_params() {
        let def = ComponentDefinition::new(
            "sign",
            "Sign",
            vec![text("text", "A")],
            vec![Parameter::literal("size", "i32", "2").unwrap()],
            &catalog(),
        )
        .unwrap();
        assert_eq!(
            def.to_string(),
            "component 'sign' (Sign)\n  constructor <param name=\"text\" type=\"String\" value=\"A\" />\n  setter <param name=\"size\" type=\"i32\" value=\"2\" />\n"
        );
    }
}
