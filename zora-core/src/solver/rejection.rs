//! Backend C — Rejection Sampling (spec.md §4.5).
//!
//! Repeatedly shuffle the value multiset, zip it with the keys, and check
//! every constraint as a batch; no partial-state machinery. Fastest when
//! solution density is high. Resolves spec.md §9 Open Question (b): the
//! cap is a hard ceiling — on exhaustion this returns absent rather than
//! exceeding it, even when `at_least_one_of` binds tightly.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use crate::rng::Rng;

use super::{Problem, SolverBackend};

pub const REJECTION_SAMPLING_ATTEMPT_CAP: u32 = 10_000;

pub struct RejectionBackend;

impl<K: Ord + Clone, V: Ord + Clone> SolverBackend<K, V> for RejectionBackend {
    fn solve(&self, problem: &Problem<K, V>, seed: u64, time_limit: Duration) -> Option<BTreeMap<K, V>> {
        if problem.requires_oversubscribed() {
            return None;
        }
        let start = Instant::now();
        let mut rng = Rng::from_seed(seed);
        let keys = problem.unassigned_keys();
        let pool = problem.remaining_pool();

        let mut values: Vec<V> = Vec::new();
        for (v, count) in &pool {
            for _ in 0..*count {
                values.push(v.clone());
            }
        }
        if values.len() != keys.len() {
            return None;
        }

        for _ in 0..REJECTION_SAMPLING_ATTEMPT_CAP {
            if start.elapsed() > time_limit {
                return None;
            }
            let mut candidate = values.clone();
            rng.shuffle(&mut candidate);

            let mut assignment = problem.requires_snapshot();
            for (k, v) in keys.iter().zip(candidate.into_iter()) {
                assignment.insert(k.clone(), v);
            }

            if problem.satisfies(&assignment) {
                return Some(assignment);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_a_feasible_assignment() {
        let problem = Problem::add_permutation_problem(vec![1, 2, 3], vec!["x", "y", "z"]);
        let result = RejectionBackend.solve(&problem, 21, Duration::from_secs(1));
        assert_eq!(result.unwrap().len(), 3);
    }

    #[test]
    fn same_seed_is_deterministic() {
        let problem = Problem::add_permutation_problem(vec![1, 2, 3], vec!["x", "y", "z"]);
        let a = RejectionBackend.solve(&problem, 21, Duration::from_secs(1));
        let b = RejectionBackend.solve(&problem, 21, Duration::from_secs(1));
        assert_eq!(a, b);
    }

    #[test]
    fn an_infeasible_require_returns_none_without_panicking() {
        let mut problem = Problem::add_permutation_problem(vec![1, 2], vec!["x", "y"]);
        problem.require(1, "x");
        problem.require(2, "x");
        assert_eq!(RejectionBackend.solve(&problem, 1, Duration::from_secs(5)), None);
    }

    #[test]
    fn different_seeds_explore_independently() {
        let problem = Problem::add_permutation_problem(
            (0..8).collect::<Vec<_>>(),
            vec!["a", "b", "c", "d", "e", "f", "g", "h"],
        );
        let mut distinct = std::collections::HashSet::new();
        for seed in 0..20u64 {
            if let Some(a) = RejectionBackend.solve(&problem, seed, Duration::from_secs(1)) {
                let mut v: Vec<_> = a.into_iter().collect();
                v.sort();
                distinct.insert(v);
            }
        }
        assert!(distinct.len() >= 19);
    }
}
