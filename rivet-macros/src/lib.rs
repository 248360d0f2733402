//! Procedural macros for the rivet component container
//!
//! This crate provides `#[derive(Component)]`, which makes a struct buildable
//! by the container: it records the struct's constructors, one mutator per
//! field and its `#[inject]` fields, and registers the type for discovery.

use proc_macro::TokenStream;

mod component;

/// Derive macro making a struct available to the container
///
/// # Attributes
///
/// On the struct:
/// - `#[component(name = "Battery")]`: type name used by definitions, defaults to the ident
/// - `#[component(constructor(name, charge_left))]`: a constructor taking those
///   fields in order, remaining fields start from `Default`. Repeatable.
/// - `#[component(no_default)]`: do not offer a default constructor
///
/// On fields:
/// - `#[inject]`: resolve the component registered under the field's name
/// - `#[inject(optional)]`: same, but leave the field alone when nothing is registered
/// - `#[component(skip)]`: no mutator for this field
///
/// # Example
///
/// ```rust,ignore
/// use rivet::Component;
///
/// #[derive(Default, Component)]
/// #[component(constructor(name, charge_left))]
/// pub struct Battery {
///     name: String,
///     charge_left: f64,
/// }
///
/// #[derive(Default, Component)]
/// pub struct ElectricCar {
///     name: String,
///     #[inject]
///     battery: Option<Arc<Battery>>,
/// }
/// ```
#[proc_macro_derive(Component, attributes(component, inject))]
pub fn derive_component(input: TokenStream) -> TokenStream {
    component::derive_component_impl(input)
}
