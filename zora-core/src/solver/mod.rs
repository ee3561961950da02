//! Solvers (spec.md §4.5, C5) — the hardest subsystem.
//!
//! One contract, three backends (`cp`, `backtracking`, `rejection`) behind a
//! single trait, selected through `factory::make_backend` rather than by
//! conditional imports (spec.md §9 "Pluggable solver" Design Note). Grounded
//! structurally on `rando/src/state.rs`'s `BTreeMap`/`BTreeSet`
//! "unplaced items vs. unassigned checks" bookkeeping, generalized from one
//! fixed assignment strategy into three interchangeable ones sharing a
//! `Problem` description.

pub mod backtracking;
pub mod cp;
pub mod factory;
pub mod rejection;

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

pub use factory::{make_backend, BackendKind};

/// A permutation problem: assign every key in `keys` a value drawn from the
/// multiset `values`, subject to `forbid`/`require`/`at_least_one_of`
/// constraints (spec.md §4.5).
#[derive(Clone, Debug)]
pub struct Problem<K: Ord + Clone, V: Ord + Clone> {
    keys: Vec<K>,
    values: Vec<V>,
    forbids: BTreeSet<(K, V)>,
    requires: BTreeMap<K, V>,
    at_least_one_of: Vec<(Vec<K>, Vec<V>)>,
    forbidden_solutions: Vec<BTreeMap<K, V>>,
}

impl<K: Ord + Clone, V: Ord + Clone> Problem<K, V> {
    pub fn add_permutation_problem(keys: Vec<K>, values: Vec<V>) -> Self {
        Self {
            keys,
            values,
            forbids: BTreeSet::new(),
            requires: BTreeMap::new(),
            at_least_one_of: Vec::new(),
            forbidden_solutions: Vec::new(),
        }
    }

    /// `value` may not be placed at `key`.
    pub fn forbid(&mut self, key: K, value: V) {
        self.forbids.insert((key, value));
    }

    /// `value` must be placed at `key`; removed from the available pool
    /// exactly once.
    pub fn require(&mut self, key: K, value: V) {
        self.requires.insert(key, value);
    }

    /// Cross-product forbid over `keys` × `values`.
    pub fn forbid_all(&mut self, keys: &[K], values: &[V]) {
        for k in keys {
            for v in values {
                self.forbids.insert((k.clone(), v.clone()));
            }
        }
    }

    /// For every distinct value `v` appearing `n` times in `values`, at
    /// least `n` distinct keys among `keys` must be assigned `v`. With a
    /// single, non-repeated value this is the plain existential
    /// `∃ k∈keys, v∈values: assign(k)=v`; repeating a value models the
    /// "distinct-by-index" reading used for e.g. two level-9 hearts
    /// (spec.md §4.6).
    pub fn at_least_one_of(&mut self, keys: Vec<K>, values: Vec<V>) {
        self.at_least_one_of.push((keys, values));
    }

    /// Blacklists an exact whole-solution assignment.
    pub fn add_forbidden_solution_map(&mut self, map: BTreeMap<K, V>) {
        self.forbidden_solutions.push(map);
    }

    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    /// Keys not already pinned by `require`.
    pub(crate) fn unassigned_keys(&self) -> Vec<K> {
        self.keys
            .iter()
            .filter(|k| !self.requires.contains_key(k))
            .cloned()
            .collect()
    }

    /// Remaining value multiset after removing one occurrence per `require`.
    pub(crate) fn remaining_pool(&self) -> BTreeMap<V, u32> {
        let mut pool = BTreeMap::new();
        for v in &self.values {
            *pool.entry(v.clone()).or_insert(0) += 1;
        }
        for v in self.requires.values() {
            if let Some(count) = pool.get_mut(v) {
                if *count > 0 {
                    *count -= 1;
                }
            }
        }
        pool
    }

    pub(crate) fn requires_snapshot(&self) -> BTreeMap<K, V> {
        self.requires.clone()
    }

    /// Failure mode (i) from spec.md §4.5: `require` demands more
    /// occurrences of some value than the value multiset actually holds.
    pub(crate) fn requires_oversubscribed(&self) -> bool {
        let mut total: BTreeMap<&V, u32> = BTreeMap::new();
        for v in &self.values {
            *total.entry(v).or_insert(0) += 1;
        }
        let mut required: BTreeMap<&V, u32> = BTreeMap::new();
        for v in self.requires.values() {
            *required.entry(v).or_insert(0) += 1;
        }
        required.iter().any(|(v, &n)| n > *total.get(v).unwrap_or(&0))
    }

    pub(crate) fn is_forbidden(&self, key: &K, value: &V) -> bool {
        self.forbids.contains(&(key.clone(), value.clone()))
    }

    pub(crate) fn is_blacklisted(&self, assignment: &BTreeMap<K, V>) -> bool {
        self.forbidden_solutions.iter().any(|m| m == assignment)
    }

    /// Whether `assignment` satisfies `forbid`/`require`/`at_least_one_of`,
    /// ignoring the whole-solution blacklist. Backend B's search treats the
    /// blacklist as a post-hoc restart trigger rather than a per-step
    /// constraint (spec.md §4.5); this is what its inner search consults.
    pub(crate) fn satisfies_constraints(&self, assignment: &BTreeMap<K, V>) -> bool {
        for (k, v) in assignment {
            if self.is_forbidden(k, v) {
                return false;
            }
        }
        for (k, v) in &self.requires {
            if assignment.get(k) != Some(v) {
                return false;
            }
        }
        for (keys, values) in &self.at_least_one_of {
            let mut required: BTreeMap<&V, usize> = BTreeMap::new();
            for v in values {
                *required.entry(v).or_insert(0) += 1;
            }
            for (v, need) in required {
                let have = keys.iter().filter(|k| assignment.get(k) == Some(v)).count();
                if have < need {
                    return false;
                }
            }
        }
        true
    }

    /// Whether `assignment` (expected to cover every key) satisfies every
    /// constraint registered on this problem, including the blacklist.
    pub(crate) fn satisfies(&self, assignment: &BTreeMap<K, V>) -> bool {
        self.satisfies_constraints(assignment) && !self.is_blacklisted(assignment)
    }
}

/// Shared contract for all three backends (spec.md §4.5). Two calls on the
/// same `(problem, seed)` MUST return identical assignments.
pub trait SolverBackend<K: Ord + Clone, V: Ord + Clone> {
    fn solve(&self, problem: &Problem<K, V>, seed: u64, time_limit: Duration) -> Option<BTreeMap<K, V>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn satisfies_rejects_forbidden_pair() {
        let mut p = Problem::add_permutation_problem(vec!["a", "b"], vec![1, 2]);
        p.forbid("a", 1);
        let mut assignment = BTreeMap::new();
        assignment.insert("a", 1);
        assignment.insert("b", 2);
        assert!(!p.satisfies(&assignment));
    }

    #[test]
    fn satisfies_accepts_distinct_at_least_one_of() {
        let mut p = Problem::add_permutation_problem(vec!["a", "b", "c"], vec![1, 1, 2]);
        p.at_least_one_of(vec!["a", "b", "c"], vec![1, 1]);
        let mut assignment = BTreeMap::new();
        assignment.insert("a", 1);
        assignment.insert("b", 1);
        assignment.insert("c", 2);
        assert!(p.satisfies(&assignment));

        let mut short = BTreeMap::new();
        short.insert("a", 1);
        short.insert("b", 2);
        short.insert("c", 2);
        assert!(!p.satisfies(&short));
    }
}
