use fanout_core::metadata::{AUTHORITY, TARGETS};
use fanout_core::{Metadata, Target};

/// Targets of one invocation
///
/// An explicit non-empty `targets` list wins; otherwise the call goes to the
/// node named by `:authority`. Empty values are ignored, so a call carrying
/// neither resolves to no targets at all.
pub fn resolve_targets(metadata: &Metadata) -> Vec<Target> {
    let explicit: Vec<Target> = metadata
        .get_all(TARGETS)
        .iter()
        .filter(|target| !target.is_empty())
        .map(|target| Target::new(target.as_str()))
        .collect();

    if !explicit.is_empty() {
        return explicit;
    }

    metadata
        .get_all(AUTHORITY)
        .iter()
        .find(|authority| !authority.is_empty())
        .map(|authority| vec![Target::new(authority.as_str())])
        .unwrap_or_default()
}
