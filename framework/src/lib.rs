//! Lazy, name-keyed component container
//!
//! Components are described by definitions (target type, constructor and
//! setter parameters), built on first lookup and cached as singletons.
//! Types become buildable through `#[derive(Component)]`, which records their
//! constructors, mutators and `#[inject]` fields in a [`TypeCatalog`].

extern crate self as rivet;

pub mod config;
pub mod container;
pub mod error;
pub mod primitive;

pub use config::{ConfigNode, ContainerConfig, ContainerConfigBuilder, Environment};
pub use container::catalog::{
    Arguments, Component, ConstructorSpec, DescriptorBuilder, InjectableField, SetterSpec,
    TypeCatalog, TypeDescriptor,
};
pub use container::definition::ComponentDefinition;
pub use container::param::{Parameter, Source};
pub use container::{ComponentState, Container};
pub use error::{ContainerError, LoadError};
pub use primitive::{FromValue, Instance, PrimitiveKind, TypeRef, Value, DATE_FORMAT};

// Derive macro, shares its name with the trait
pub use rivet_macros::Component;

#[doc(hidden)]
pub use inventory;
