//! Reference graph checks over registered definitions

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::container::definition::ComponentDefinition;

/// Find a chain of references leading from `start` back to itself
///
/// Returns the component names along the cycle, beginning and ending with
/// `start`. References to names without a definition end the search along
/// that branch.
///
/// Every reference counts as an edge, including setter references that an
/// instance stored under the parameter's name would satisfy at build time.
/// Such wiring is rejected even though it could be built.
pub fn cycle_through(
    definitions: &HashMap<String, Arc<ComponentDefinition>>,
    start: &str,
) -> Option<Vec<String>> {
    let mut path = vec![start.to_string()];
    let mut seen = HashSet::new();
    visit(definitions, start, start, &mut path, &mut seen).then_some(path)
}

fn visit(
    definitions: &HashMap<String, Arc<ComponentDefinition>>,
    current: &str,
    start: &str,
    path: &mut Vec<String>,
    seen: &mut HashSet<String>,
) -> bool {
    let Some(definition) = definitions.get(current) else {
        return false;
    };

    for reference in definition.references() {
        if reference == start {
            path.push(start.to_string());
            return true;
        }
        if seen.insert(reference.to_string()) {
            path.push(reference.to_string());
            if visit(definitions, reference, start, path, seen) {
                return true;
            }
            path.pop();
        }
    }
    false
}
