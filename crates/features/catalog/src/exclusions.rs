use crate::model::Project;
use std::collections::BTreeSet;

/// Merges the global omissions with the project's own exclusions.
///
/// The result is the duplicate-free union sorted lexicographically (byte order),
/// so it does not depend on the order or repetition of either input.
#[must_use]
pub fn effective_exclusions(project: &Project, global: &[String]) -> Vec<String> {
    global.iter().chain(project.exclude_paths()).cloned().collect::<BTreeSet<_>>().into_iter().collect()
}
