//! Component type auto-registration
//!
//! `#[derive(Component)]` submits a [`ComponentTypeEntry`] for every type it is
//! applied to. [`TypeCatalog::discover`](crate::TypeCatalog::discover) collects
//! them, so a configuration file can name any derived type without further
//! registration code.
//!
//! # Example
//!
//! ```rust,ignore
//! use rivet::Component;
//!
//! #[derive(Component, Default)]
//! pub struct Battery {
//!     pub name: String,
//!     pub charge_left: f64,
//! }
//!
//! // Available to every container built with:
//! let container = Container::discover();
//! ```

use crate::container::catalog::TypeDescriptor;

/// Entry for inventory-collected component types
///
/// Used internally by the `#[derive(Component)]` macro.
pub struct ComponentTypeEntry {
    /// Function producing the type's descriptor
    pub describe: fn() -> TypeDescriptor,
    /// Type name for debugging/logging
    pub name: &'static str,
}

inventory::collect!(ComponentTypeEntry);

/// Every component type registered through the derive macro
pub fn entries() -> impl Iterator<Item = &'static ComponentTypeEntry> {
    inventory::iter::<ComponentTypeEntry>.into_iter()
}
