// Two-phase method. Phase 1 minimizes the sum of one artificial
// variable per constraint row on an auxiliary tableau; a zero optimum
// gives a feasible basis, which is copied back before phase 2 optimizes
// the real objective.

use log::debug;

#[cfg(test)]
use approx::assert_abs_diff_eq;

use crate::builder::Direction;
use crate::config::SolverOptions;
use crate::error::Error;
use crate::problem::Status;
use crate::tableau::Tableau;

impl Tableau {
    pub fn solve_two_phase(&mut self) -> Result<Status, Error> {
        self.solve_two_phase_with(&SolverOptions::default())
    }

    // Both phases get the full iteration budget. If phase 1 does not
    // finish, or finds the problem infeasible, this tableau is left as
    // it was.
    pub fn solve_two_phase_with(&mut self, options: &SolverOptions) -> Result<Status, Error> {
        options.validate()?;

        let mut auxiliary = self.auxiliary_tableau()?;
        let rhs_total: f64 = (0..auxiliary.constraint_count())
            .map(|i| auxiliary.get(i, auxiliary.constant_col()))
            .sum();

        let phase_one = auxiliary.optimize(options)?;
        if phase_one == Status::NotSolved {
            debug!("phase one did not finish within {} pivots", options.max_iterations);
            return Ok(Status::NotSolved);
        }

        // The auxiliary objective is minimized, so its value is the
        // negated constant.
        let artificial_sum = -auxiliary.objective_constant();
        debug!("phase one: {}, sum of artificial variables {}", phase_one, artificial_sum);
        if artificial_sum > options.tolerance * (1.0 + rhs_total) {
            return Ok(Status::Infeasible);
        }

        auxiliary.drive_out_artificials(self.constant_col(), options.tolerance)?;
        self.transplant(&auxiliary);
        self.price_objective();
        self.set_needs_phase_one(false);

        debug!("starting phase two");
        self.optimize(options)
    }

    // Same constraint rows plus an identity block of artificial columns,
    // with rows negated where needed so every right-hand side is
    // non-negative. The objective row is the sum of the artificial
    // variables, already reduced against the starting artificial basis.
    fn auxiliary_tableau(&self) -> Result<Tableau, Error> {
        let constraints = self.constraint_count();
        let original_cols = self.constant_col();

        let mut auxiliary = Tableau::new(constraints, original_cols, constraints)?;
        auxiliary.set_direction(Direction::Minimize);
        for (col, name) in self.variable_names().iter().enumerate() {
            auxiliary.set_name(col, name.clone());
        }
        for i in 0..constraints {
            auxiliary.set_name(original_cols + i, format!("a{}", i + 1));
        }

        let constant_col = auxiliary.constant_col();
        let objective_row = auxiliary.objective_row();
        for i in 0..constraints {
            let sign = if self.get(i, original_cols) < 0.0 { -1.0 } else { 1.0 };
            for j in 0..original_cols {
                auxiliary.set(i, j, sign * self.get(i, j));
            }
            auxiliary.set(i, original_cols + i, 1.0);
            auxiliary.set(i, constant_col, sign * self.get(i, original_cols));
        }

        for j in original_cols..constant_col {
            auxiliary.set(objective_row, j, 1.0);
        }
        for j in 0..auxiliary.cols() {
            let column_sum: f64 = (0..constraints).map(|i| auxiliary.get(i, j)).sum();
            let value = auxiliary.get(objective_row, j) - column_sum;
            auxiliary.set(objective_row, j, value);
        }
        Ok(auxiliary)
    }

    // Replaces artificial variables left basic at zero by an original
    // column with a non-zero entry in the same row. A row with no such
    // entry is a redundant constraint and loses its basic variable.
    fn drive_out_artificials(&mut self, original_cols: usize, tolerance: f64)
        -> Result<(), Error> {
        for row in 0..self.constraint_count() {
            match self.basis()[row] {
                Some(col) if col >= original_cols => {},
                _ => continue,
            }
            let replacement = (0..original_cols)
                .find(|&j| self.get(row, j).abs() > tolerance);
            match replacement {
                Some(col) => {
                    debug!("driving artificial variable out of row {}", row);
                    self.pivot(row, col)?;
                },
                None => {
                    debug!("row {} is redundant", row);
                    self.set_basic(row, None);
                },
            }
        }
        Ok(())
    }

    // Copies the constraint rows and their basic variables from the
    // phase 1 tableau, dropping the artificial columns. The objective
    // row is not touched.
    fn transplant(&mut self, auxiliary: &Tableau) {
        let original_cols = self.constant_col();
        let auxiliary_constant = auxiliary.constant_col();
        for i in 0..self.constraint_count() {
            {
                let row = self.row_mut(i);
                row[..original_cols].copy_from_slice(&auxiliary.row(i)[..original_cols]);
                row[original_cols] = auxiliary.get(i, auxiliary_constant);
            }
            self.set_basic(i, auxiliary.basis()[i]);
        }
    }

    // Eliminates the basic columns from the objective row so its entries
    // are reduced costs with respect to the transplanted basis.
    fn price_objective(&mut self) {
        let objective_row = self.objective_row();
        for i in 0..self.constraint_count() {
            let col = match self.basis()[i] {
                Some(col) => col,
                None => continue,
            };
            let factor = self.get(objective_row, col);
            if factor == 0.0 {
                continue;
            }
            let basic_row = self.row(i).to_vec();
            for (value, r) in self.row_mut(objective_row).iter_mut().zip(basic_row.iter()) {
                *value -= factor * r;
            }
            self.set(objective_row, col, 0.0);
        }
    }
}

#[cfg(test)]
use crate::builder::{build_tableau, Constraint, Objective, Operator};

#[cfg(test)]
fn constraint(coefficients: Vec<f64>, operator: Operator, constant: f64) -> Constraint {
    Constraint::new(coefficients, operator, constant).expect("Constraint is valid")
}

// min 4x1 + x2 st 3x1 + x2 = 3, 4x1 + 3x2 >= 6, x1 + 2x2 <= 4
#[cfg(test)]
fn textbook() -> Tableau {
    let constraints = vec![
        constraint(vec![3.0, 1.0], Operator::Equal, 3.0),
        constraint(vec![4.0, 3.0], Operator::GreaterEqual, 6.0),
        constraint(vec![1.0, 2.0], Operator::LessEqual, 4.0),
    ];
    let objective = Objective::minimize(vec![4.0, 1.0]).expect("Objective is valid");
    build_tableau(&constraints, &objective, None).expect("Build should not fail")
}

#[test]
fn auxiliary_layout() {
    let tableau = textbook();
    let auxiliary = tableau.auxiliary_tableau().expect("Auxiliary should build");
    assert_eq!(auxiliary.rows(), 4);
    assert_eq!(auxiliary.cols(), 8);
    assert_eq!(auxiliary.basis(), &[Some(4), Some(5), Some(6), None]);
    assert_eq!(auxiliary.row(0), &[3.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 3.0]);
    assert_eq!(auxiliary.row(3), &[-8.0, -6.0, 1.0, -1.0, 0.0, 0.0, 0.0, -13.0]);
    assert_eq!(auxiliary.variable_names()[4], "a1");
    assert!(auxiliary.has_canonical_basis(1.0e-12));
}

#[test]
fn test_feasible_phase1() {
    let tableau = textbook();
    let mut auxiliary = tableau.auxiliary_tableau().expect("Auxiliary should build");
    let status = auxiliary.optimize(&SolverOptions::default())
        .expect("Phase 1 should not fail");
    assert_eq!(status, Status::Solved);
    assert_abs_diff_eq!(auxiliary.objective_constant(), 0.0, epsilon = 1.0e-9);
    for basic in auxiliary.basis().iter().take(3) {
        assert!(basic.map_or(false, |col| col < tableau.constant_col()));
    }
}

#[test]
fn test_solve() {
    let mut tableau = textbook();
    let status = tableau.solve_two_phase().expect("Solve should not fail");
    assert_eq!(status, Status::Solved);
    assert!(!tableau.needs_phase_one());
    assert!(tableau.has_canonical_basis(1.0e-9));
    // Minimization: the constant holds -z.
    assert_abs_diff_eq!(tableau.objective_constant(), -3.4, epsilon = 1.0e-9);

    let constant_col = tableau.constant_col();
    let expected = [0.4, 1.8, 1.0];
    for (row, basic) in tableau.basis().iter().enumerate() {
        if let Some(col) = *basic {
            if col < 3 {
                assert_abs_diff_eq!(tableau.get(row, constant_col), expected[col], epsilon = 1.0e-9);
            }
        }
    }
}

#[test]
fn test_solve_infeasible() {
    let constraints = vec![
        constraint(vec![1.0], Operator::LessEqual, 1.0),
        constraint(vec![1.0], Operator::GreaterEqual, 3.0),
    ];
    let objective = Objective::maximize(vec![1.0]).expect("Objective is valid");
    let mut tableau = build_tableau(&constraints, &objective, None)
        .expect("Build should not fail");
    let before = tableau.clone();

    let status = tableau.solve_two_phase().expect("Solve should not fail");
    assert_eq!(status, Status::Infeasible);
    assert_eq!(tableau.data(), before.data());
    assert_eq!(tableau.basis(), before.basis());
    assert!(tableau.needs_phase_one());
}

#[test]
fn negative_constant_is_normalized() {
    // min x1 st -x1 <= -2
    let constraints = vec![constraint(vec![-1.0], Operator::LessEqual, -2.0)];
    let objective = Objective::minimize(vec![1.0]).expect("Objective is valid");
    let mut tableau = build_tableau(&constraints, &objective, None)
        .expect("Build should not fail");

    let status = tableau.solve_two_phase().expect("Solve should not fail");
    assert_eq!(status, Status::Solved);
    assert_eq!(tableau.basis()[0], Some(0));
    assert_abs_diff_eq!(tableau.get(0, tableau.constant_col()), 2.0, epsilon = 1.0e-9);
    assert_abs_diff_eq!(tableau.objective_constant(), -2.0, epsilon = 1.0e-9);
}

#[test]
fn redundant_equality_loses_its_basic_variable() {
    // max x1 st x1 + x2 = 2, 2x1 + 2x2 = 4
    let constraints = vec![
        constraint(vec![1.0, 1.0], Operator::Equal, 2.0),
        constraint(vec![2.0, 2.0], Operator::Equal, 4.0),
    ];
    let objective = Objective::maximize(vec![1.0]).expect("Objective is valid");
    let mut tableau = build_tableau(&constraints, &objective, None)
        .expect("Build should not fail");

    let status = tableau.solve_two_phase().expect("Solve should not fail");
    assert_eq!(status, Status::Solved);
    assert_eq!(tableau.basis(), &[Some(0), None, None]);
    assert!(tableau.has_canonical_basis(1.0e-9));
    assert_abs_diff_eq!(tableau.objective_constant(), 2.0, epsilon = 1.0e-9);
}

#[test]
fn unfinished_phase_one_leaves_tableau() {
    let mut tableau = textbook();
    let before = tableau.clone();
    let options = SolverOptions::new().max_iterations(1);
    let status = tableau.solve_two_phase_with(&options).expect("Solve should not fail");
    assert_eq!(status, Status::NotSolved);
    assert_eq!(tableau.data(), before.data());
    assert!(tableau.needs_phase_one());
}

#[test]
fn single_phase_solve_allowed_after_two_phase() {
    let mut tableau = textbook();
    assert_eq!(tableau.solve_two_phase().expect("Solve should not fail"), Status::Solved);
    let before = tableau.clone();

    assert_eq!(tableau.solve(None).expect("Solve should not fail"), Status::Solved);
    assert_eq!(tableau.data(), before.data());
    assert_eq!(tableau.basis(), before.basis());
}

#[test]
fn zero_artificial_is_pivoted_out() {
    // max x1 st x1 + x2 = 2, -x2 = 0
    let constraints = vec![
        constraint(vec![1.0, 1.0], Operator::Equal, 2.0),
        constraint(vec![0.0, -1.0], Operator::Equal, 0.0),
    ];
    let objective = Objective::maximize(vec![1.0]).expect("Objective is valid");
    let mut tableau = build_tableau(&constraints, &objective, None)
        .expect("Build should not fail");
    let original_cols = tableau.constant_col();

    // Phase 1 ends with a2 still basic at zero in the second row.
    let mut auxiliary = tableau.auxiliary_tableau().expect("Auxiliary should build");
    let status = auxiliary.optimize(&SolverOptions::default())
        .expect("Phase 1 should not fail");
    assert_eq!(status, Status::Solved);
    assert_eq!(auxiliary.basis(), &[Some(0), Some(3), None]);

    auxiliary.drive_out_artificials(original_cols, 1.0e-9)
        .expect("Pivot should not fail");
    assert_eq!(auxiliary.basis(), &[Some(0), Some(1), None]);
    assert!(auxiliary.has_canonical_basis(1.0e-9));

    let status = tableau.solve_two_phase().expect("Solve should not fail");
    assert_eq!(status, Status::Solved);
    assert_eq!(tableau.basis(), &[Some(0), Some(1), None]);
    assert!(tableau.basis().iter().all(|b| b.map_or(true, |col| col < original_cols)));
    assert!(tableau.has_canonical_basis(1.0e-9));
    assert_abs_diff_eq!(tableau.objective_constant(), 2.0, epsilon = 1.0e-9);
    assert_abs_diff_eq!(tableau.get(0, original_cols), 2.0, epsilon = 1.0e-9);
    assert_abs_diff_eq!(tableau.get(1, original_cols), 0.0, epsilon = 1.0e-9);
}

#[test]
fn phase_two_reports_unbounded() {
    // min -x1 st x1 >= 1
    let constraints = vec![constraint(vec![1.0], Operator::GreaterEqual, 1.0)];
    let objective = Objective::minimize(vec![-1.0]).expect("Objective is valid");
    let mut tableau = build_tableau(&constraints, &objective, None)
        .expect("Build should not fail");

    let status = tableau.solve_two_phase().expect("Solve should not fail");
    assert_eq!(status, Status::Unbounded);
    assert!(!tableau.needs_phase_one());
    assert_eq!(tableau.basis(), &[Some(0), None]);
    assert_eq!(tableau.row(tableau.objective_row()), &[0.0, -1.0, 1.0]);
}
