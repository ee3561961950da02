//! Backend B — Randomized Backtracking (spec.md §4.5).
//!
//! Shuffle keys, apply `require`, then draw valid values uniformly at
//! random in most-constrained-first order, backtracking up to a bounded
//! depth; after `GREEDY_ROUND_CAP` failed greedy attempts, fall back to an
//! unbounded backtrack. A result that matches a blacklisted whole-solution
//! map restarts the entire process with a fresh sub-seed derived from the
//! attempt number (spec.md §4.1 `derive_seed`).

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use crate::rng::Rng;

use super::{Problem, SolverBackend};

const GREEDY_ROUND_CAP: u32 = 100;
const BACKTRACK_DEPTH_BOUND: i64 = 5;

pub struct BacktrackingBackend;

impl<K: Ord + Clone, V: Ord + Clone> SolverBackend<K, V> for BacktrackingBackend {
    fn solve(&self, problem: &Problem<K, V>, seed: u64, time_limit: Duration) -> Option<BTreeMap<K, V>> {
        if problem.requires_oversubscribed() {
            return None;
        }
        let start = Instant::now();
        let mut attempt = 0u32;
        let mut current_seed = seed;

        loop {
            if start.elapsed() > time_limit {
                return None;
            }
            let mut rng = Rng::from_seed(current_seed);
            let mut keys = problem.unassigned_keys();
            rng.shuffle(&mut keys);

            let found = greedy_bounded(problem, &keys, &mut rng, &start, time_limit)
                .or_else(|| full_backtrack(problem, &keys, &mut rng, &start, time_limit));

            match found {
                Some(assignment) if !problem.is_blacklisted(&assignment) => return Some(assignment),
                Some(_) => {
                    attempt += 1;
                    current_seed = Rng::derive_seed(seed, attempt);
                }
                None => return None,
            }
        }
    }
}

fn greedy_bounded<K: Ord + Clone, V: Ord + Clone>(
    problem: &Problem<K, V>,
    keys: &[K],
    rng: &mut Rng,
    start: &Instant,
    time_limit: Duration,
) -> Option<BTreeMap<K, V>> {
    for _ in 0..GREEDY_ROUND_CAP {
        if start.elapsed() > time_limit {
            return None;
        }
        let mut assignment = problem.requires_snapshot();
        let mut pool = problem.remaining_pool();
        let mut remaining: Vec<K> = keys.to_vec();
        let mut budget = BACKTRACK_DEPTH_BOUND;
        if assign(problem, &mut remaining, &mut pool, &mut assignment, rng, &mut budget) {
            return Some(assignment);
        }
    }
    None
}

fn full_backtrack<K: Ord + Clone, V: Ord + Clone>(
    problem: &Problem<K, V>,
    keys: &[K],
    rng: &mut Rng,
    start: &Instant,
    time_limit: Duration,
) -> Option<BTreeMap<K, V>> {
    if start.elapsed() > time_limit {
        return None;
    }
    let mut assignment = problem.requires_snapshot();
    let mut pool = problem.remaining_pool();
    let mut remaining: Vec<K> = keys.to_vec();
    let mut budget = i64::MAX;
    if assign(problem, &mut remaining, &mut pool, &mut assignment, rng, &mut budget) {
        Some(assignment)
    } else {
        None
    }
}

/// Most-constrained-first recursive assignment with a shared backtrack
/// budget; each undo-and-retry consumes one unit of `budget`.
fn assign<K: Ord + Clone, V: Ord + Clone>(
    problem: &Problem<K, V>,
    remaining: &mut Vec<K>,
    pool: &mut BTreeMap<V, u32>,
    assignment: &mut BTreeMap<K, V>,
    rng: &mut Rng,
    budget: &mut i64,
) -> bool {
    if remaining.is_empty() {
        return problem.satisfies_constraints(assignment);
    }

    let idx = most_constrained_index(problem, remaining, pool);
    let key = remaining.remove(idx);

    let mut candidates: Vec<V> = pool
        .iter()
        .filter(|(v, &count)| count > 0 && !problem.is_forbidden(&key, v))
        .map(|(v, _)| v.clone())
        .collect();
    candidates.sort();
    rng.shuffle(&mut candidates);

    for value in candidates {
        *pool.get_mut(&value).unwrap() -= 1;
        assignment.insert(key.clone(), value.clone());

        if assign(problem, remaining, pool, assignment, rng, budget) {
            return true;
        }

        assignment.remove(&key);
        *pool.get_mut(&value).unwrap() += 1;

        *budget -= 1;
        if *budget < 0 {
            remaining.insert(idx, key);
            return false;
        }
    }
    remaining.insert(idx, key);
    false
}

fn most_constrained_index<K: Ord + Clone, V: Ord + Clone>(
    problem: &Problem<K, V>,
    remaining: &[K],
    pool: &BTreeMap<V, u32>,
) -> usize {
    remaining
        .iter()
        .enumerate()
        .min_by_key(|(_, k)| {
            pool.iter()
                .filter(|(v, &count)| count > 0 && !problem.is_forbidden(k, v))
                .count()
        })
        .map(|(i, _)| i)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_a_feasible_assignment() {
        let problem = Problem::add_permutation_problem(vec![1, 2, 3], vec!["x", "y", "z"]);
        let result = BacktrackingBackend.solve(&problem, 11, Duration::from_secs(1));
        assert_eq!(result.unwrap().len(), 3);
    }

    #[test]
    fn same_seed_is_deterministic() {
        let problem = Problem::add_permutation_problem(vec![1, 2, 3, 4], vec!["a", "b", "c", "d"]);
        let a = BacktrackingBackend.solve(&problem, 5, Duration::from_secs(1));
        let b = BacktrackingBackend.solve(&problem, 5, Duration::from_secs(1));
        assert_eq!(a, b);
    }

    #[test]
    fn over_subscribed_require_is_infeasible() {
        let mut problem = Problem::add_permutation_problem(vec![1, 2], vec!["x"]);
        problem.require(1, "x");
        problem.require(2, "x");
        assert_eq!(
            BacktrackingBackend.solve(&problem, 1, Duration::from_secs(1)),
            None
        );
    }

    #[test]
    fn respects_forbid_constraints() {
        let mut problem = Problem::add_permutation_problem(vec![1, 2], vec!["x", "y"]);
        problem.forbid(1, "x");
        let assignment = BacktrackingBackend
            .solve(&problem, 3, Duration::from_secs(1))
            .unwrap();
        assert_ne!(assignment[&1], "x");
    }
}
