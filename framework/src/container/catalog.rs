//! Type catalog: the explicit factory registry
//!
//! Each component type is described by a [`TypeDescriptor`] holding its
//! construction closures: an optional default constructor, any number of typed
//! constructors, one setter per assignable field and the table of fields marked
//! for injection. Definitions look their target type up here instead of
//! inspecting types at runtime.
//!
//! # Example
//!
//! ```rust,ignore
//! use rivet::{TypeCatalog, TypeDescriptor, TypeRef};
//!
//! let battery = TypeDescriptor::of::<Battery>("Battery")
//!     .default_constructor()
//!     .constructor(
//!         vec![TypeRef::of::<String>(), TypeRef::of::<f64>()],
//!         |args| Ok(Battery::new(args.next()?, args.next()?)),
//!     )
//!     .setter("name", |b: &mut Battery, name: String| b.name = name)
//!     .build();
//!
//! let mut catalog = TypeCatalog::new();
//! catalog.register(battery);
//! ```

use std::any::{type_name, Any};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::container::provider;
use crate::primitive::{FromValue, TypeRef, Value};

/// A type-erased instance under construction, before it is shared
pub type Object = Box<dyn Any + Send + Sync>;

type ConstructFn = Arc<dyn Fn(&mut Arguments) -> Result<Object, String> + Send + Sync>;
type DefaultFn = Arc<dyn Fn() -> Object + Send + Sync>;
type SetterFn = Arc<dyn Fn(&mut (dyn Any + Send + Sync), Value) -> Result<(), String> + Send + Sync>;

/// A type the container can build, usually implemented by `#[derive(Component)]`
pub trait Component: Any + Send + Sync + Sized {
    /// Name the type is registered under in the catalog
    const TYPE_NAME: &'static str;

    /// Describe how to construct and assign this type
    fn describe() -> TypeDescriptor;
}

/// Resolved constructor arguments, consumed in declaration order
pub struct Arguments {
    values: std::vec::IntoIter<Value>,
    position: usize,
}

impl Arguments {
    pub(crate) fn new(values: Vec<Value>) -> Self {
        Self {
            values: values.into_iter(),
            position: 0,
        }
    }

    /// Take the next argument, converted to `T`
    #[allow(clippy::should_implement_trait)]
    pub fn next<T: FromValue>(&mut self) -> Result<T, String> {
        let position = self.position;
        self.position += 1;
        let value = self
            .values
            .next()
            .ok_or_else(|| format!("missing constructor argument #{}", position))?;
        T::from_value(value).map_err(|received| {
            format!(
                "constructor argument #{} expected {}, received {}",
                position,
                T::type_ref(),
                received.describe()
            )
        })
    }
}

/// A constructor taking arguments of the listed types, in order
#[derive(Clone)]
pub struct ConstructorSpec {
    params: Vec<TypeRef>,
    construct: ConstructFn,
}

impl ConstructorSpec {
    pub fn params(&self) -> &[TypeRef] {
        &self.params
    }

    pub(crate) fn invoke(&self, args: Vec<Value>) -> Result<Object, String> {
        (self.construct)(&mut Arguments::new(args))
    }
}

/// The mutator for one field
#[derive(Clone)]
pub struct SetterSpec {
    field: String,
    field_type: TypeRef,
    apply: SetterFn,
}

impl SetterSpec {
    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn field_type(&self) -> &TypeRef {
        &self.field_type
    }

    pub(crate) fn invoke(&self, target: &mut (dyn Any + Send + Sync), value: Value) -> Result<(), String> {
        (self.apply)(target, value)
    }
}

/// A field marked for automatic reference-based wiring
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectableField {
    pub name: String,
    pub field_type: TypeRef,
    /// Leave the field at its default when no component of that name exists
    pub optional: bool,
}

/// Everything the container needs to know to build one type
#[derive(Clone)]
pub struct TypeDescriptor {
    name: TypeRef,
    rust_type: &'static str,
    default_constructor: Option<DefaultFn>,
    constructors: Vec<ConstructorSpec>,
    setters: IndexMap<String, SetterSpec>,
    injectables: Vec<InjectableField>,
}

impl TypeDescriptor {
    /// Start describing `T`, registered under `name`
    pub fn of<T: Any + Send + Sync>(name: impl Into<String>) -> DescriptorBuilder<T> {
        DescriptorBuilder {
            descriptor: TypeDescriptor {
                name: TypeRef::new(name),
                rust_type: type_name::<T>(),
                default_constructor: None,
                constructors: Vec::new(),
                setters: IndexMap::new(),
                injectables: Vec::new(),
            },
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &TypeRef {
        &self.name
    }

    /// The Rust type this descriptor builds
    pub fn rust_type(&self) -> &'static str {
        self.rust_type
    }

    pub fn has_default_constructor(&self) -> bool {
        self.default_constructor.is_some()
    }

    pub(crate) fn construct_default(&self) -> Option<Object> {
        self.default_constructor.as_ref().map(|construct| construct())
    }

    pub fn constructors(&self) -> &[ConstructorSpec] {
        &self.constructors
    }

    /// Find the constructor whose parameter types equal `types`, in order
    pub fn constructor_for(&self, types: &[&TypeRef]) -> Option<&ConstructorSpec> {
        self.constructors.iter().find(|c| {
            c.params.len() == types.len() && c.params.iter().zip(types).all(|(a, b)| a == *b)
        })
    }

    pub fn setter(&self, field: &str) -> Option<&SetterSpec> {
        self.setters.get(field)
    }

    pub fn setters(&self) -> impl Iterator<Item = &SetterSpec> {
        self.setters.values()
    }

    pub fn injectable_fields(&self) -> &[InjectableField] {
        &self.injectables
    }
}

impl std::fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("rust_type", &self.rust_type)
            .field("default_constructor", &self.default_constructor.is_some())
            .field(
                "constructors",
                &self.constructors.iter().map(|c| &c.params).collect::<Vec<_>>(),
            )
            .field("setters", &self.setters.keys().collect::<Vec<_>>())
            .field("injectables", &self.injectables)
            .finish()
    }
}

/// Typed builder for [`TypeDescriptor`]
pub struct DescriptorBuilder<T> {
    descriptor: TypeDescriptor,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Any + Send + Sync> DescriptorBuilder<T> {
    /// Build with `Default::default()` when a definition has no constructor parameters
    pub fn default_constructor(mut self) -> Self
    where
        T: Default,
    {
        self.descriptor.default_constructor = Some(Arc::new(|| Box::new(T::default()) as Object));
        self
    }

    /// Add a constructor taking arguments of the given types
    pub fn constructor<F>(mut self, params: Vec<TypeRef>, construct: F) -> Self
    where
        F: Fn(&mut Arguments) -> Result<T, String> + Send + Sync + 'static,
    {
        let construct: ConstructFn =
            Arc::new(move |args: &mut Arguments| construct(args).map(|t| Box::new(t) as Object));
        self.descriptor.constructors.push(ConstructorSpec { params, construct });
        self
    }

    /// Add the mutator for `field`, accepting values convertible to `V`
    pub fn setter<V, F>(mut self, field: &str, apply: F) -> Self
    where
        V: FromValue + 'static,
        F: Fn(&mut T, V) + Send + Sync + 'static,
    {
        let apply: SetterFn = Arc::new(move |target: &mut (dyn Any + Send + Sync), value: Value| {
            let target = target
                .downcast_mut::<T>()
                .ok_or_else(|| format!("target is not a {}", type_name::<T>()))?;
            let value = V::from_value(value).map_err(|received| {
                format!("expected {}, received {}", V::type_ref(), received.describe())
            })?;
            apply(target, value);
            Ok(())
        });
        self.descriptor.setters.insert(
            field.to_string(),
            SetterSpec {
                field: field.to_string(),
                field_type: V::type_ref(),
                apply,
            },
        );
        self
    }

    /// Mark `field` for injection by name
    pub fn injectable(mut self, field: &str, field_type: TypeRef, optional: bool) -> Self {
        self.descriptor.injectables.push(InjectableField {
            name: field.to_string(),
            field_type,
            optional,
        });
        self
    }

    pub fn build(self) -> TypeDescriptor {
        self.descriptor
    }
}

/// Registry of buildable types, keyed by type name
#[derive(Debug, Clone, Default)]
pub struct TypeCatalog {
    types: HashMap<TypeRef, Arc<TypeDescriptor>>,
}

impl TypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog of every type registered through `#[derive(Component)]`
    pub fn discover() -> Self {
        let mut catalog = Self::new();
        for entry in provider::entries() {
            tracing::trace!(component_type = entry.name, "discovered component type");
            catalog.register((entry.describe)());
        }
        catalog
    }

    /// Register a descriptor, replacing any previous one of the same name
    pub fn register(&mut self, descriptor: TypeDescriptor) {
        self.types
            .insert(descriptor.name.clone(), Arc::new(descriptor));
    }

    /// Register a [`Component`] type
    pub fn register_type<T: Component>(&mut self) {
        self.register(T::describe());
    }

    pub fn get(&self, name: &TypeRef) -> Option<&Arc<TypeDescriptor>> {
        self.types.get(name)
    }

    pub fn contains(&self, name: &TypeRef) -> bool {
        self.types.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
