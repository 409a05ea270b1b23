//! Snapshot reconciliation.
//!
//! Given two point-in-time enumerations of the same object path, classify
//! every instance as unchanged, changed, created or deleted. Pairing is
//! greedy first-match: for each previous instance, the first current
//! instance that is not `Different` wins, and ties are broken by
//! current-snapshot order. That order-determinism is part of the contract,
//! not an accident of implementation.

use crate::CimInstance;
use crate::DiffEntry;
use crate::IndicationType;

/// Relation between two instance records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceRelation {
    /// Keys and all ordinary properties match
    Same,
    /// Keys match, but property counts or ordinary values differ
    Changed,
    /// Key sets differ in count, type or value; no relation between the two
    Different,
}

/// Compare two instances.
///
/// Key comparison is order-independent (lookup by property name). A missing
/// key, a key type mismatch or a key value mismatch makes the records
/// `Different`; once keys match, any property-count mismatch or ordinary
/// property difference is a `Changed`.
pub fn compare_instances(
    a: &CimInstance,
    b: &CimInstance,
) -> InstanceRelation {
    if a.key_count() != b.key_count() {
        return InstanceRelation::Different;
    }
    for key in a.key_properties() {
        match b.property(&key.name) {
            Some(other) if other.is_key && other.value == key.value => {}
            _ => return InstanceRelation::Different,
        }
    }

    if a.property_count() != b.property_count() {
        return InstanceRelation::Changed;
    }
    for prop in a.properties() {
        match b.property(&prop.name) {
            Some(other) if other.value == prop.value => {}
            _ => return InstanceRelation::Changed,
        }
    }

    InstanceRelation::Same
}

/// Reconcile two snapshots into the diff entries matching `ty`.
///
/// Emission order: modifications in previous-snapshot order, deletions in
/// previous-snapshot order, creations in current-snapshot order. Comparing
/// a snapshot to itself yields no entries.
pub fn gen_diffs(
    previous: &[CimInstance],
    current: &[CimInstance],
    ty: IndicationType,
) -> Vec<DiffEntry> {
    let mut used_previous = vec![false; previous.len()];
    let mut used_current = vec![false; current.len()];
    let mut diffs = Vec::new();

    for (i, prev) in previous.iter().enumerate() {
        for (j, cur) in current.iter().enumerate() {
            if used_current[j] {
                continue;
            }
            match compare_instances(prev, cur) {
                InstanceRelation::Different => continue,
                InstanceRelation::Same => {
                    used_previous[i] = true;
                    used_current[j] = true;
                    break;
                }
                InstanceRelation::Changed => {
                    used_previous[i] = true;
                    used_current[j] = true;
                    if ty == IndicationType::Modification {
                        diffs.push(DiffEntry::changed(prev.clone(), cur.clone()));
                    }
                    break;
                }
            }
        }
    }

    match ty {
        IndicationType::Deletion => {
            for (i, prev) in previous.iter().enumerate() {
                if !used_previous[i] {
                    diffs.push(DiffEntry::deleted(prev.clone()));
                }
            }
        }
        IndicationType::Creation => {
            for (j, cur) in current.iter().enumerate() {
                if !used_current[j] {
                    diffs.push(DiffEntry::created(cur.clone()));
                }
            }
        }
        IndicationType::Modification => {}
    }

    diffs
}
