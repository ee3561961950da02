//! Solver factory (spec.md §9 "Pluggable solver" Design Note): select a
//! backend by configuration value, not by conditional compilation.

use super::{backtracking::BacktrackingBackend, cp::CpBackend, rejection::RejectionBackend, SolverBackend};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendKind {
    Cp,
    Backtracking,
    Rejection,
}

impl Default for BackendKind {
    /// Default is Backend C for the production problem size (spec.md §4.6:
    /// "~200 locations, ~30 distinct item kinds").
    fn default() -> Self {
        BackendKind::Rejection
    }
}

pub fn make_backend<K, V>(kind: BackendKind) -> Box<dyn SolverBackend<K, V>>
where
    K: Ord + Clone + 'static,
    V: Ord + Clone + 'static,
{
    match kind {
        BackendKind::Cp => Box::new(CpBackend),
        BackendKind::Backtracking => Box::new(BacktrackingBackend),
        BackendKind::Rejection => Box::new(RejectionBackend),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::Problem;
    use std::time::Duration;

    #[test]
    fn every_backend_solves_the_same_trivial_problem() {
        let problem = Problem::add_permutation_problem(vec![1, 2, 3], vec!["x", "y", "z"]);
        for kind in [BackendKind::Cp, BackendKind::Backtracking, BackendKind::Rejection] {
            let backend = make_backend::<i32, &str>(kind);
            let result = backend.solve(&problem, 9, Duration::from_secs(1));
            assert_eq!(result.unwrap().len(), 3, "backend {:?} failed", kind);
        }
    }
}
