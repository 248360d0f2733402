//! Registers definitions described by a configuration tree

use crate::config::tree::ConfigNode;
use crate::container::param::Parameter;
use crate::container::Container;
use crate::error::LoadError;

const ROOT: &str = "beans";
const COMPONENT: &str = "bean";

/// Register every `bean` element below a `beans` root
///
/// Returns the number of definitions registered. Unknown elements are skipped
/// with a warning; a malformed element stops loading at that element, leaving
/// the definitions before it registered.
pub fn load_definitions(container: &Container, root: &ConfigNode) -> Result<usize, LoadError> {
    if root.tag != ROOT {
        return Err(LoadError::UnexpectedElement {
            expected: ROOT,
            found: root.tag.clone(),
        });
    }

    let mut registered = 0;
    for node in &root.children {
        if node.tag != COMPONENT {
            tracing::warn!(element = %node.tag, "skipping unknown element below <beans>");
            continue;
        }
        load_component(container, node)?;
        registered += 1;
    }

    tracing::debug!(registered, "loaded definitions");
    Ok(registered)
}

fn load_component(container: &Container, node: &ConfigNode) -> Result<(), LoadError> {
    let name = required(node, "name")?;
    let target_type = required(node, "type")?;

    let mut constructor_params = Vec::new();
    let mut setter_params = Vec::new();
    for child in &node.children {
        match child.tag.as_str() {
            "constructor-param" | "cons-param" => constructor_params.push(parameter(child)?),
            "setter-param" => setter_params.push(parameter(child)?),
            other => {
                tracing::warn!(component = name, element = other, "skipping unknown parameter element");
            }
        }
    }

    container.register_definition(name, target_type, constructor_params, setter_params)?;
    Ok(())
}

fn parameter(node: &ConfigNode) -> Result<Parameter, LoadError> {
    let param = Parameter::new(
        required(node, "name")?,
        required(node, "type")?,
        node.attribute("value").map(str::to_string),
        node.attribute("ref").map(str::to_string),
    )?;

    Ok(match node.attribute("optional") {
        Some(flag) if flag.eq_ignore_ascii_case("true") => param.optional(),
        _ => param,
    })
}

fn required<'n>(node: &'n ConfigNode, attribute: &'static str) -> Result<&'n str, LoadError> {
    node.attribute(attribute)
        .ok_or_else(|| LoadError::MissingAttribute {
            element: node.tag.clone(),
            attribute,
        })
}
