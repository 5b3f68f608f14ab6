#![cfg(test)]

use approx::assert_abs_diff_eq;

use crate::builder::build_tableau;
use crate::config::SolverOptions;
use crate::problem::Status;
use crate::tableau::Tableau;
use crate::test_util::DenseProblem;

const SEEDS: [u64; 6] = [13, 37, 58, 23, 101, 4242];

fn options() -> SolverOptions {
    SolverOptions::new().max_iterations(500)
}

fn assert_optimal(tableau: &Tableau) {
    let objective = tableau.row(tableau.objective_row());
    for &v in objective[..tableau.constant_col()].iter() {
        assert!(v >= -1.0e-9, "negative reduced cost {} at optimum", v);
    }
    assert!(tableau.has_canonical_basis(1.0e-7));
}

#[test]
fn single_phase_dense_8x12() {
    for &seed in SEEDS.iter() {
        let problem = DenseProblem::seeded(8, 12, seed);
        let mut tableau = build_tableau(&problem.less_equal(), &problem.objective(), None)
            .expect("Build should not fail");
        let status = tableau.solve_with(&options()).expect("Solve should not fail");
        assert_eq!(status, Status::Solved);
        assert_optimal(&tableau);

        let solution = tableau.read_solution();
        let x = solution.structural_vector(12);
        assert!(problem.is_feasible(&x, 1.0e-7));
        assert_abs_diff_eq!(problem.value(&x), solution.objective_value, epsilon = 1.0e-7);
    }
}

#[test]
fn two_phase_matches_single_phase() {
    // Test that both start procedures reach the same optimal value
    for &seed in SEEDS.iter() {
        let problem = DenseProblem::seeded(6, 10, seed);

        let mut direct = build_tableau(&problem.less_equal(), &problem.objective(), None)
            .expect("Build should not fail");
        assert_eq!(direct.solve_with(&options()).expect("Solve should not fail"),
                   Status::Solved);

        let mut two_phase = build_tableau(&problem.greater_equal(), &problem.objective(), None)
            .expect("Build should not fail");
        assert!(two_phase.needs_phase_one());
        assert_eq!(two_phase.solve_two_phase_with(&options()).expect("Solve should not fail"),
                   Status::Solved);
        assert_optimal(&two_phase);

        let expected = direct.read_solution().objective_value;
        let actual = two_phase.read_solution();
        assert_abs_diff_eq!(actual.objective_value, expected, epsilon = 1.0e-7);
        assert!(problem.is_feasible(&actual.structural_vector(10), 1.0e-7));
    }
}

#[test]
fn stepping_matches_single_solve() {
    for &seed in SEEDS.iter() {
        let problem = DenseProblem::seeded(5, 7, seed);
        let mut direct = build_tableau(&problem.less_equal(), &problem.objective(), None)
            .expect("Build should not fail");
        direct.solve_with(&options()).expect("Solve should not fail");

        let mut stepped = build_tableau(&problem.less_equal(), &problem.objective(), None)
            .expect("Build should not fail");
        let mut status = Status::NotSolved;
        for _ in 0..500 {
            status = stepped.solve(Some(1)).expect("Solve should not fail");
            assert!(stepped.has_canonical_basis(1.0e-7));
            if status.is_terminal() {
                break;
            }
        }
        assert_eq!(status, Status::Solved);
        assert_eq!(stepped.basis(), direct.basis());
        for (a, b) in stepped.data().iter().zip(direct.data()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1.0e-12);
        }
    }
}
