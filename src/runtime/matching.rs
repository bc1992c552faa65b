//! Container name matching.
//!
//! Compose-style orchestrators prefix container names with the project name
//! and suffix a replica index (`paladium-rtsp-server-1`). A configured
//! container name `id` matches a runtime name when the runtime name contains
//! `-{id}-` or ends with `-{id}-1`. The leading `/` Docker puts on names is
//! ignored. Swap this module out if the naming scheme changes.

use super::RuntimeContainer;

/// Returns true if `runtime_name` refers to the logical container `id`.
pub fn container_name_matches(runtime_name: &str, id: &str) -> bool {
    let name = runtime_name.trim_start_matches('/');
    name.contains(&format!("-{}-", id)) || name.ends_with(&format!("-{}-1", id))
}

/// Find the container for `id`, preferring the first running match.
pub fn find_container<'a>(
    containers: &'a [RuntimeContainer],
    id: &str,
) -> Option<&'a RuntimeContainer> {
    let mut matches = containers
        .iter()
        .filter(|c| c.names.iter().any(|name| container_name_matches(name, id)));

    let first = matches.next()?;
    if first.is_running() {
        return Some(first);
    }
    Some(matches.find(|c| c.is_running()).unwrap_or(first))
}
