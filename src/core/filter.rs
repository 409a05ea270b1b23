//! Filter and enumeration-pair bookkeeping.
//!
//! ## Key Responsibilities
//! - Holds the set of active subscription filters in insertion order
//! - Maintains one reference-counted enumeration pair per distinct watched
//!   object path (polling mode only)
//! - Records the watched class name from the first added filter; reused for
//!   indication construction
//!
//! All mutation happens under the manager mutex; the registry itself is a
//! plain data structure.

use std::collections::BTreeMap;

use crate::CimInstance;
use crate::FilterError;
use crate::ObjectPath;
use crate::Result;
use crate::SelectExpression;

/// A registered subscription filter.
#[derive(Debug, Clone)]
pub struct Filter {
    pub expression: SelectExpression,
    pub path: ObjectPath,
}

/// The (previous, current) snapshots of instances at one watched object
/// path. Exists while at least one filter references the path
/// (`ref_count >= 1`).
#[derive(Debug)]
pub struct EnumerationPair {
    pub path: ObjectPath,
    ref_count: usize,
    pub previous: Option<Vec<CimInstance>>,
    pub current: Option<Vec<CimInstance>>,
}

impl EnumerationPair {
    fn new(path: ObjectPath) -> Self {
        Self {
            path,
            ref_count: 0,
            previous: None,
            current: None,
        }
    }

    pub fn ref_count(&self) -> usize {
        self.ref_count
    }

    /// True once a first enumeration populated the pair.
    pub fn has_baseline(&self) -> bool {
        self.previous.is_some()
    }

    /// Rotate current into previous at the end of a poll step.
    pub fn rotate(&mut self) {
        if self.current.is_some() {
            self.previous = self.current.take();
        }
    }
}

/// Outcome of an `add_filter` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddOutcome {
    /// Path of a newly created enumeration pair, when this filter was the
    /// first one watching it. The manager baseline-enumerates it right away
    /// if the worker is already running.
    pub created_pair: Option<ObjectPath>,
}

#[derive(Debug)]
pub struct FilterRegistry {
    polling: bool,
    class_name: Option<String>,
    filters: Vec<Filter>,
    pairs: BTreeMap<String, EnumerationPair>,
}

impl FilterRegistry {
    pub fn new(polling: bool) -> Self {
        Self {
            polling,
            class_name: None,
            filters: Vec::new(),
            pairs: BTreeMap::new(),
        }
    }

    /// Register a filter. Duplicate queries are permitted; each occupies its
    /// own slot and its own pair reference.
    pub fn add_filter(
        &mut self,
        expression: SelectExpression,
        path: ObjectPath,
    ) -> AddOutcome {
        if self.class_name.is_none() {
            self.class_name = Some(expression.isa_class().to_string());
        }

        let mut created_pair = None;
        if self.polling {
            let pair = self
                .pairs
                .entry(path.canonical())
                .or_insert_with(|| EnumerationPair::new(path.clone()));
            pair.ref_count += 1;
            if pair.ref_count == 1 {
                created_pair = Some(path.clone());
            }
        }

        self.filters.push(Filter { expression, path });
        AddOutcome { created_pair }
    }

    /// Unregister the first filter whose raw query text matches exactly
    /// (case-sensitive). Decrements the pair reference count and drops the
    /// pair when it reaches zero.
    pub fn remove_filter(
        &mut self,
        query: &str,
    ) -> Result<()> {
        let position = self
            .filters
            .iter()
            .position(|f| f.expression.raw() == query)
            .ok_or_else(|| FilterError::NotFound(query.to_string()))?;
        let filter = self.filters.remove(position);

        if self.polling {
            let canonical = filter.path.canonical();
            if let Some(pair) = self.pairs.get_mut(&canonical) {
                pair.ref_count -= 1;
                if pair.ref_count == 0 {
                    self.pairs.remove(&canonical);
                }
            }
        }
        Ok(())
    }

    /// Tear down every filter and enumeration pair (manager destruction and
    /// cancellation cleanup).
    pub fn remove_all(&mut self) {
        self.filters.clear();
        self.pairs.clear();
    }

    /// Discard all snapshots while keeping filters and pairs registered.
    /// The next worker cycle re-baselines every pair.
    pub fn clear_snapshots(&mut self) {
        for pair in self.pairs.values_mut() {
            pair.previous = None;
            pair.current = None;
        }
    }

    /// Install a first snapshot for the pair at `path`, if still present.
    pub fn baseline(
        &mut self,
        path: &ObjectPath,
        snapshot: Vec<CimInstance>,
    ) {
        if let Some(pair) = self.pairs.get_mut(&path.canonical()) {
            pair.previous = Some(snapshot);
        }
    }

    /// Watched class recorded from the first added filter.
    pub fn class_name(&self) -> Option<&str> {
        self.class_name.as_deref()
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn filter_count(&self) -> usize {
        self.filters.len()
    }

    pub fn pair(
        &self,
        path: &ObjectPath,
    ) -> Option<&EnumerationPair> {
        self.pairs.get(&path.canonical())
    }

    pub fn pair_mut(
        &mut self,
        path: &ObjectPath,
    ) -> Option<&mut EnumerationPair> {
        self.pairs.get_mut(&path.canonical())
    }

    pub fn pairs(&self) -> impl Iterator<Item = &EnumerationPair> {
        self.pairs.values()
    }

    pub fn pair_count(&self) -> usize {
        self.pairs.len()
    }

    pub fn watched_paths(&self) -> Vec<ObjectPath> {
        self.pairs.values().map(|p| p.path.clone()).collect()
    }
}
