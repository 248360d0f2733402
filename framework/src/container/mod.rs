//! Component container
//!
//! This module provides the name-keyed wiring container:
//! - Definitions: blueprints registered by name, usually from a configuration file
//! - Lazy resolution: a component is built on first demand, then cached
//! - Singletons: every name maps to at most one instance, shared by all lookups
//! - Injection: references between components resolve recursively by name
//!
//! # Example
//!
//! ```rust,ignore
//! use rivet::{Container, Parameter};
//!
//! let container = Container::discover();
//! container.register_definition(
//!     "battery",
//!     "Battery",
//!     vec![
//!         Parameter::literal("name", "String", "Amaron")?,
//!         Parameter::literal("charge_left", "f64", "40.0")?,
//!     ],
//!     vec![],
//! )?;
//! container.register_definition("tesla", "ElectricCar", vec![], vec![
//!     Parameter::literal("name", "String", "Tesla")?,
//! ])?;
//!
//! // Builds the battery on the way, through the car's injected field
//! let tesla: Arc<ElectricCar> = container.make("tesla")?;
//! ```

pub mod catalog;
pub mod definition;
pub mod graph;
pub mod param;
pub mod provider;
pub mod scanner;

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use once_cell::sync::OnceCell;

use crate::container::catalog::TypeCatalog;
use crate::container::definition::ComponentDefinition;
use crate::container::param::Parameter;
use crate::error::ContainerError;
use crate::primitive::Instance;

/// Where a name stands in the container's lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentState {
    /// Neither a definition nor an instance exists
    Unregistered,
    /// A definition exists, nothing has been built yet
    Defined,
    /// An instance is stored and will be returned by every lookup
    Built,
}

/// The main component container
///
/// Holds the definition registry and the instance store. Each stored name has
/// its own slot, so concurrent first lookups of one name build it once while
/// lookups of other names proceed.
pub struct Container {
    catalog: TypeCatalog,
    definitions: RwLock<HashMap<String, Arc<ComponentDefinition>>>,
    instances: RwLock<HashMap<String, Arc<OnceCell<Instance>>>>,
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

impl Container {
    /// Create an empty container able to build the types in `catalog`
    pub fn new(catalog: TypeCatalog) -> Self {
        Self {
            catalog,
            definitions: RwLock::new(HashMap::new()),
            instances: RwLock::new(HashMap::new()),
        }
    }

    /// Create an empty container for every type registered with `#[derive(Component)]`
    pub fn discover() -> Self {
        Self::new(TypeCatalog::discover())
    }

    pub fn catalog(&self) -> &TypeCatalog {
        &self.catalog
    }

    /// Register a component definition
    ///
    /// # Example
    /// ```rust,ignore
    /// container.register_definition(
    ///     "tesla",
    ///     "ElectricCar",
    ///     vec![],
    ///     vec![Parameter::literal("name", "String", "Tesla")?],
    /// )?;
    /// ```
    pub fn register_definition(
        &self,
        name: impl Into<String>,
        target_type: impl Into<String>,
        constructor_params: Vec<Parameter>,
        setter_params: Vec<Parameter>,
    ) -> Result<Arc<ComponentDefinition>, ContainerError> {
        let definition = ComponentDefinition::new(
            name,
            target_type,
            constructor_params,
            setter_params,
            &self.catalog,
        )?;
        self.add_definition(definition)
    }

    /// Register an already constructed definition
    ///
    /// Fails if the name is taken or if the definition closes a reference cycle.
    pub fn add_definition(
        &self,
        definition: ComponentDefinition,
    ) -> Result<Arc<ComponentDefinition>, ContainerError> {
        let name = definition.name().to_string();
        let definition = Arc::new(definition);

        let mut definitions = write(&self.definitions);
        if definitions.contains_key(&name) {
            return Err(ContainerError::invalid(&name, "a component with this name is already defined"));
        }
        definitions.insert(name.clone(), definition.clone());

        if let Some(path) = graph::cycle_through(&definitions, &name) {
            definitions.remove(&name);
            return Err(ContainerError::CircularReference { path });
        }

        tracing::debug!(component = %name, target_type = %definition.target_type(), "registered definition");
        Ok(definition)
    }

    /// Store a pre-built instance under `name`
    ///
    /// # Example
    /// ```rust,ignore
    /// container.singleton("randomDouble", 42.0_f64)?;
    /// ```
    pub fn singleton<T: Any + Send + Sync>(
        &self,
        name: impl Into<String>,
        instance: T,
    ) -> Result<(), ContainerError> {
        self.store(name, Arc::new(instance))
    }

    /// Store an already shared instance under `name`
    pub fn store(&self, name: impl Into<String>, instance: Instance) -> Result<(), ContainerError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ContainerError::invalid("<unnamed instance>", "instance name is required"));
        }
        self.slot(&name).set(instance).map_err(|_| {
            ContainerError::invalid(&name, "an instance is already stored under this name")
        })
    }

    /// Look up a component, building it on first access
    ///
    /// Returns `Ok(None)` when the name has neither an instance nor a definition.
    pub fn resolve(&self, name: &str) -> Result<Option<Instance>, ContainerError> {
        Resolution::new(self).resolve(name)
    }

    /// Look up a component as a concrete type
    ///
    /// # Example
    /// ```rust,ignore
    /// let battery: Option<Arc<Battery>> = container.get("battery")?;
    /// ```
    pub fn get<T: Any + Send + Sync>(&self, name: &str) -> Result<Option<Arc<T>>, ContainerError> {
        match self.resolve(name)? {
            Some(instance) => instance
                .downcast::<T>()
                .map(Some)
                .map_err(|_| ContainerError::type_mismatch::<T>(name)),
            None => Ok(None),
        }
    }

    /// Look up a component as a concrete type, returning an error if not found
    ///
    /// # Example
    /// ```rust,ignore
    /// let tesla = container.make::<ElectricCar>("tesla")?;
    /// ```
    pub fn make<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>, ContainerError> {
        self.get::<T>(name)?
            .ok_or_else(|| ContainerError::not_found(name))
    }

    /// Build `definition` and store the result under its name
    ///
    /// The definition does not need to be registered. If an instance is already
    /// stored under that name, it is returned unchanged. A definition that is
    /// not itself registered may not reuse the name of a registered one.
    pub fn build(&self, definition: &ComponentDefinition) -> Result<Instance, ContainerError> {
        let name = definition.name();
        if let Some(instance) = self.cached(name) {
            return Ok(instance);
        }
        if let Some(registered) = self.definition(name) {
            if !std::ptr::eq(Arc::as_ptr(&registered), definition) {
                return Err(ContainerError::invalid(
                    name,
                    "a different definition is registered under this name",
                ));
            }
        }
        Resolution::new(self).build(definition)
    }

    /// Build every registered definition that has not been built yet
    ///
    /// Returns the number of stored instances afterwards.
    pub fn instantiate_all(&self) -> Result<usize, ContainerError> {
        for name in self.definition_names() {
            self.resolve(&name)?;
        }
        Ok(self.len())
    }

    /// Check every definition without building anything
    ///
    /// Each target type must offer the constructor and mutators its definition
    /// needs, and every reference must name a registered definition or a
    /// stored instance. Setter references are also satisfied by an instance
    /// stored under the parameter's own name, or skipped when optional;
    /// constructor references are always resolved.
    pub fn validate(&self) -> Result<(), ContainerError> {
        let mut definitions: Vec<_> = read(&self.definitions).values().cloned().collect();
        definitions.sort_by(|a, b| a.name().cmp(b.name()));

        for definition in definitions {
            definition.check()?;

            for param in definition.constructor_params() {
                if let Some(reference) = param.reference_name() {
                    if !self.is_known(reference) {
                        return Err(ContainerError::reference_not_found(param.name(), reference));
                    }
                }
            }

            for param in definition.setter_params().values() {
                let Some(reference) = param.reference_name() else {
                    continue;
                };
                if !param.is_optional() && !self.is_known(reference) && !self.is_built(param.name()) {
                    return Err(ContainerError::reference_not_found(param.name(), reference));
                }
            }
        }
        Ok(())
    }

    /// Remove every definition and every stored instance
    pub fn reset(&self) {
        let mut definitions = write(&self.definitions);
        let mut instances = write(&self.instances);
        tracing::debug!(
            definitions = definitions.len(),
            instances = instances.len(),
            "resetting container"
        );
        definitions.clear();
        instances.clear();
    }

    pub fn state(&self, name: &str) -> ComponentState {
        if self.is_built(name) {
            ComponentState::Built
        } else if read(&self.definitions).contains_key(name) {
            ComponentState::Defined
        } else {
            ComponentState::Unregistered
        }
    }

    pub fn definition(&self, name: &str) -> Option<Arc<ComponentDefinition>> {
        read(&self.definitions).get(name).cloned()
    }

    /// Names of all registered definitions, sorted
    pub fn definition_names(&self) -> Vec<String> {
        let mut names: Vec<_> = read(&self.definitions).keys().cloned().collect();
        names.sort();
        names
    }

    /// Names of all stored instances, sorted
    pub fn instance_names(&self) -> Vec<String> {
        let mut names: Vec<_> = read(&self.instances)
            .iter()
            .filter(|(_, slot)| slot.get().is_some())
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }

    pub fn is_built(&self, name: &str) -> bool {
        self.cached(name).is_some()
    }

    /// Whether `name` has a stored instance or a definition
    pub fn is_known(&self, name: &str) -> bool {
        self.is_built(name) || read(&self.definitions).contains_key(name)
    }

    /// Number of stored instances
    pub fn len(&self) -> usize {
        read(&self.instances)
            .values()
            .filter(|slot| slot.get().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn cached(&self, name: &str) -> Option<Instance> {
        read(&self.instances)
            .get(name)
            .and_then(|slot| slot.get().cloned())
    }

    fn slot(&self, name: &str) -> Arc<OnceCell<Instance>> {
        if let Some(slot) = read(&self.instances).get(name) {
            return slot.clone();
        }
        write(&self.instances)
            .entry(name.to_string())
            .or_default()
            .clone()
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new(TypeCatalog::new())
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("types", &self.catalog.len())
            .field("definitions", &self.definition_names())
            .field("instances", &self.instance_names())
            .finish()
    }
}

/// One top-level lookup and the chain of components it is currently building
pub(crate) struct Resolution<'c> {
    container: &'c Container,
    path: Vec<String>,
}

impl<'c> Resolution<'c> {
    pub(crate) fn new(container: &'c Container) -> Self {
        Self {
            container,
            path: Vec::new(),
        }
    }

    pub(crate) fn cached(&self, name: &str) -> Option<Instance> {
        self.container.cached(name)
    }

    pub(crate) fn is_known(&self, name: &str) -> bool {
        self.container.is_known(name)
    }

    pub(crate) fn resolve(&mut self, name: &str) -> Result<Option<Instance>, ContainerError> {
        if let Some(instance) = self.container.cached(name) {
            tracing::trace!(component = name, "resolved from store");
            return Ok(Some(instance));
        }
        match self.container.definition(name) {
            Some(definition) => self.build(&definition).map(Some),
            None => Ok(None),
        }
    }

    pub(crate) fn build(&mut self, definition: &ComponentDefinition) -> Result<Instance, ContainerError> {
        let name = definition.name();
        if self.path.iter().any(|building| building == name) {
            let mut path = self.path.clone();
            path.push(name.to_string());
            return Err(ContainerError::CircularReference { path });
        }

        let slot = self.container.slot(name);
        self.path.push(name.to_string());
        let built = slot.get_or_try_init(|| definition.construct(self)).cloned();
        self.path.pop();
        built
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::catalog::TypeDescriptor;
    use crate::primitive::TypeRef;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default, Debug)]
    struct Engine {
        power: i32,
    }

    impl crate::container::catalog::Component for Engine {
        const TYPE_NAME: &'static str = "Engine";

        fn describe() -> TypeDescriptor {
            TypeDescriptor::of::<Engine>(Self::TYPE_NAME)
                .default_constructor()
                .build()
        }
    }

    #[derive(Default, Debug)]
    struct Truck {
        model: String,
        engine: Option<Arc<Engine>>,
        trailer: Option<Arc<Engine>>,
    }

    fn catalog(engine_builds: Arc<AtomicUsize>) -> TypeCatalog {
        let mut catalog = TypeCatalog::new();
        catalog.register(
            TypeDescriptor::of::<Engine>("Engine")
                .constructor(vec![TypeRef::of::<i32>()], move |args| {
                    engine_builds.fetch_add(1, Ordering::SeqCst);
                    Ok(Engine { power: args.next()? })
                })
                .build(),
        );
        catalog.register(
            TypeDescriptor::of::<Truck>("Truck")
                .default_constructor()
                .constructor(vec![TypeRef::new("Engine")], |args| {
                    Ok(Truck {
                        engine: args.next()?,
                        ..Default::default()
                    })
                })
                .setter("model", |t: &mut Truck, v: String| t.model = v)
                .setter("engine", |t: &mut Truck, v: Option<Arc<Engine>>| t.engine = v)
                .setter("trailer", |t: &mut Truck, v: Option<Arc<Engine>>| t.trailer = v)
                .injectable("engine", TypeRef::new("Engine"), false)
                .injectable("trailer", TypeRef::new("Engine"), true)
                .build(),
        );
        catalog
    }

    fn container() -> (Container, Arc<AtomicUsize>) {
        let builds = Arc::new(AtomicUsize::new(0));
        (Container::new(catalog(builds.clone())), builds)
    }

    fn define_engine(container: &Container, name: &str) {
        container
            .register_definition(
                name,
                "Engine",
                vec![Parameter::literal("power", "i32", "400").unwrap()],
                vec![],
            )
            .unwrap();
    }

    #[test]
    fn test_resolve_unknown_is_absent() {
        let (container, _) = container();
        assert!(container.resolve("nothing").unwrap().is_none());
        assert!(matches!(
            container.make::<Engine>("nothing").unwrap_err(),
            ContainerError::ComponentNotFound { .. }
        ));
    }

    #[test]
    fn test_resolve_is_cached() {
        let (container, builds) = container();
        define_engine(&container, "engine");

        assert_eq!(container.state("engine"), ComponentState::Defined);
        let first = container.resolve("engine").unwrap().unwrap();
        let second = container.resolve("engine").unwrap().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(builds.load(Ordering::SeqCst), 1);
        assert_eq!(container.state("engine"), ComponentState::Built);
    }

    #[test]
    fn test_injected_reference_builds_dependency() {
        let (container, _) = container();
        define_engine(&container, "engine");
        container
            .register_definition(
                "truck",
                "Truck",
                vec![],
                vec![Parameter::literal("model", "String", "Semi").unwrap()],
            )
            .unwrap();

        let truck = container.make::<Truck>("truck").unwrap();
        let engine = container.make::<Engine>("engine").unwrap();

        assert_eq!(truck.model, "Semi");
        assert!(Arc::ptr_eq(truck.engine.as_ref().unwrap(), &engine));
        assert!(truck.trailer.is_none());
        assert_eq!(container.instance_names(), vec!["engine", "truck"]);
    }

    #[test]
    fn test_missing_required_injection_fails_build() {
        let (container, _) = container();
        container
            .register_definition("truck", "Truck", vec![], vec![])
            .unwrap();

        let err = container.resolve("truck").unwrap_err();
        assert!(err.is_reference_not_found(), "{err}");
        assert_eq!(container.state("truck"), ComponentState::Defined);
        assert!(container.validate().is_err());
    }

    #[test]
    fn test_stored_instance_under_field_name_wins() {
        let (container, _) = container();
        container.singleton("engine", Engine { power: 1 }).unwrap();
        define_engine(&container, "big");
        container
            .register_definition(
                "truck",
                "Truck",
                vec![],
                vec![Parameter::reference("engine", "Engine", "big").unwrap()],
            )
            .unwrap();

        let truck = container.make::<Truck>("truck").unwrap();
        assert_eq!(truck.engine.as_ref().unwrap().power, 1);
        assert!(!container.is_built("big"));
    }

    #[test]
    fn test_wrong_type_requested() {
        let (container, _) = container();
        define_engine(&container, "engine");
        assert!(matches!(
            container.make::<Truck>("engine").unwrap_err(),
            ContainerError::TypeMismatch { .. }
        ));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let (container, _) = container();
        define_engine(&container, "engine");
        let err = container
            .register_definition("engine", "Engine", vec![], vec![])
            .unwrap_err();
        assert!(matches!(err, ContainerError::InvalidDefinition { .. }));

        container.singleton("spare", Engine::default()).unwrap();
        assert!(container.singleton("spare", Engine::default()).is_err());
    }

    #[test]
    fn test_cycle_rejected_at_registration() {
        let (container, _) = container();
        container
            .register_definition(
                "a",
                "Truck",
                vec![],
                vec![Parameter::reference("engine", "Engine", "b").unwrap()],
            )
            .unwrap();
        let err = container
            .register_definition(
                "b",
                "Truck",
                vec![],
                vec![Parameter::reference("engine", "Engine", "a").unwrap()],
            )
            .unwrap_err();

        match err {
            ContainerError::CircularReference { path } => assert_eq!(path, vec!["b", "a", "b"]),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(container.definition_names(), vec!["a"]);
    }

    #[test]
    fn test_build_rejects_shadowing_definition() {
        let (container, builds) = container();
        define_engine(&container, "b");

        let shadow = ComponentDefinition::new(
            "b",
            "Truck",
            vec![],
            vec![Parameter::reference("engine", "Engine", "a").unwrap()],
            container.catalog(),
        )
        .unwrap();

        let err = container.build(&shadow).unwrap_err();
        assert!(matches!(err, ContainerError::InvalidDefinition { .. }), "{err}");
        assert_eq!(container.state("b"), ComponentState::Defined);

        let registered = container.definition("b").unwrap();
        container.build(&registered).unwrap();
        assert_eq!(builds.load(Ordering::SeqCst), 1);

        // Once built, any definition of that name returns the stored instance
        let stored = container.build(&shadow).unwrap();
        assert!(Arc::ptr_eq(&stored, &container.resolve("b").unwrap().unwrap()));
    }

    #[test]
    fn test_validate_constructor_reference_ignores_stored_field_name() {
        let (container, _) = container();
        container.singleton("engine", Engine { power: 1 }).unwrap();
        container
            .register_definition(
                "truck",
                "Truck",
                vec![Parameter::reference("engine", "Engine", "missing").unwrap()],
                vec![],
            )
            .unwrap();

        match container.validate().unwrap_err() {
            ContainerError::ReferenceNotFound { parameter, reference } => {
                assert_eq!(parameter, "engine");
                assert_eq!(reference, "missing");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(container.resolve("truck").unwrap_err().is_reference_not_found());
    }

    #[test]
    fn test_validate_setter_reference_satisfied_by_stored_field_name() {
        let (container, _) = container();
        container.singleton("engine", Engine { power: 1 }).unwrap();
        container
            .register_definition(
                "truck",
                "Truck",
                vec![],
                vec![Parameter::reference("engine", "Engine", "missing").unwrap()],
            )
            .unwrap();

        container.validate().unwrap();
        let truck = container.make::<Truck>("truck").unwrap();
        assert_eq!(truck.engine.as_ref().unwrap().power, 1);
    }

    #[test]
    fn test_cycle_check_counts_setter_references_covered_by_store() {
        let (container, _) = container();
        container.singleton("engine", Engine::default()).unwrap();
        container
            .register_definition(
                "a",
                "Truck",
                vec![],
                vec![Parameter::reference("engine", "Engine", "b").unwrap()],
            )
            .unwrap();

        // Would build from the stored "engine", still closes a reference cycle
        let err = container
            .register_definition(
                "b",
                "Truck",
                vec![],
                vec![Parameter::reference("engine", "Engine", "a").unwrap()],
            )
            .unwrap_err();
        assert!(matches!(err, ContainerError::CircularReference { .. }), "{err}");
    }

    #[test]
    fn test_store_shared_instance() {
        let (container, _) = container();
        let engine: Instance = Arc::new(Engine { power: 7 });
        container.store("engine", engine.clone()).unwrap();

        assert!(Arc::ptr_eq(&container.resolve("engine").unwrap().unwrap(), &engine));
        assert!(container.store(" ", engine).is_err());
    }

    #[test]
    fn test_reset_clears_everything() {
        let (container, _) = container();
        define_engine(&container, "engine");
        container.resolve("engine").unwrap();
        container.singleton("spare", Engine::default()).unwrap();

        container.reset();

        assert!(container.is_empty());
        assert!(container.definition_names().is_empty());
        assert_eq!(container.state("engine"), ComponentState::Unregistered);
    }

    #[test]
    fn test_instantiate_all() {
        let (container, builds) = container();
        define_engine(&container, "engine");
        define_engine(&container, "spare");
        container
            .register_definition("truck", "Truck", vec![], vec![])
            .unwrap();

        assert_eq!(container.instantiate_all().unwrap(), 3);
        assert_eq!(builds.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_concurrent_first_access_builds_once() {
        let (container, builds) = container();
        define_engine(&container, "engine");

        let instances: Vec<Instance> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| container.resolve("engine").unwrap().unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(builds.load(Ordering::SeqCst), 1);
        assert!(instances.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }
}
