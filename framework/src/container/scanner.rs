//! Injectable field discovery
//!
//! Fields marked with `#[inject]` are recorded in their type's descriptor. For
//! each of them a reference-only parameter named after the field is
//! synthesized: an injected field expects a component registered under the
//! same name as the field.

use indexmap::IndexMap;

use crate::container::catalog::TypeDescriptor;
use crate::container::param::Parameter;

/// Reference-only parameters for every injectable field of `descriptor`
pub fn injectable_params(descriptor: &TypeDescriptor) -> Vec<Parameter> {
    descriptor
        .injectable_fields()
        .iter()
        .map(Parameter::injected)
        .collect()
}

/// Merge synthesized parameters into explicit setter parameters
///
/// Explicit entries are kept as they are; synthesized ones are appended for
/// fields not already present.
pub fn merge_injectables(setters: &mut IndexMap<String, Parameter>, descriptor: &TypeDescriptor) {
    for param in injectable_params(descriptor) {
        if setters.contains_key(param.name()) {
            tracing::trace!(field = param.name(), "explicit setter overrides injection");
            continue;
        }
        setters.insert(param.name().to_string(), param);
    }
}
