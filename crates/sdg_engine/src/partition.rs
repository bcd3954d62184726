//! Partition calculation (spec §3 "Partition", §4.11): turns a record
//! type's `Partitioning` config entry plus the run's scaling factor into a
//! global cardinality, then splits `[0, cardinality)` into the contiguous
//! `[begin, end)` slice owned by one node.

use std::collections::BTreeMap;

use sdg_io::config::Partitioning;

use crate::error::EngineError;
use crate::interval::Interval;

/// The global cardinality of record type `name`, given every other type's
/// already-resolved cardinality (needed only for `Nested`).
pub fn cardinality_for(
    name: &str,
    partitioning: &BTreeMap<String, Partitioning>,
    scaling_factor: f64,
    resolved: &BTreeMap<String, u64>,
) -> Result<u64, EngineError> {
    let entry = partitioning.get(name).ok_or_else(|| {
        EngineError::InvariantViolation(format!("no partitioning entry for record type '{name}'"))
    })?;

    Ok(match entry {
        Partitioning::Fixed { cardinality } => *cardinality,
        Partitioning::Linear { base_cardinality } => {
            (scaling_factor * *base_cardinality as f64).round() as u64
        }
        Partitioning::Nested { parent_type, factor } => {
            let parent_cardinality = *resolved.get(parent_type).ok_or_else(|| {
                EngineError::InvariantViolation(format!(
                    "parent type '{parent_type}' not yet resolved for nested partitioning of '{name}'"
                ))
            })?;
            (parent_cardinality as f64 * factor).round() as u64
        }
    })
}

/// Resolves every type's cardinality in dependency order, so `Nested`
/// entries can be resolved regardless of the order they appear in the
/// config map. Errors on an unresolvable (cyclic or dangling-parent) entry.
pub fn resolve_all(
    partitioning: &BTreeMap<String, Partitioning>,
    scaling_factor: f64,
) -> Result<BTreeMap<String, u64>, EngineError> {
    let mut resolved: BTreeMap<String, u64> = BTreeMap::new();
    let mut remaining: Vec<String> = partitioning.keys().cloned().collect();

    while !remaining.is_empty() {
        let before = remaining.len();
        remaining.retain(|name| match cardinality_for(name, partitioning, scaling_factor, &resolved) {
            Ok(c) => {
                resolved.insert(name.clone(), c);
                false
            }
            Err(_) => true,
        });
        if remaining.len() == before {
            return Err(EngineError::InvariantViolation(format!(
                "unresolved or cyclic partitioning dependency among: {remaining:?}"
            )));
        }
    }

    Ok(resolved)
}

/// The `[begin, end)` slice of `cardinality` owned by `node_id` out of
/// `node_count` nodes. `Fixed` partitioning always lands entirely on node 0
/// regardless of `node_count` (spec.md §3); every other kind splits evenly,
/// with any remainder distributed one-per-node starting from node 0 so the
/// slices stay contiguous and every node still gets a maximally balanced
/// share.
pub fn node_range(
    name: &str,
    partitioning: &BTreeMap<String, Partitioning>,
    cardinality: u64,
    node_id: u32,
    node_count: u32,
) -> Interval {
    if matches!(partitioning.get(name), Some(Partitioning::Fixed { .. })) {
        return if node_id == 0 {
            Interval::full(cardinality)
        } else {
            Interval::empty()
        };
    }

    let node_count = node_count.max(1) as u64;
    let id = node_id as u64;
    let base = cardinality / node_count;
    let remainder = cardinality % node_count;
    let start = id * base + id.min(remainder);
    let extra = if id < remainder { 1 } else { 0 };
    Interval::new(start, start + base + extra)
}
