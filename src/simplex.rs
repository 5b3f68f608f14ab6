// Single-phase tableau simplex: Dantzig's entering rule, minimum ratio
// leaving rule, Gauss-Jordan pivots. There is no anti-cycling rule; the
// iteration budget is the only bound on degenerate cycling.

use log::{debug, trace};

#[cfg(test)]
use approx::assert_abs_diff_eq;

use crate::config::SolverOptions;
use crate::error::Error;
use crate::problem::Status;
use crate::tableau::Tableau;

#[derive(Debug, Clone, Copy, PartialEq)]
enum PivotResult {
    Done(Status),
    Pivot(usize, usize),
}

impl Tableau {
    // Runs at most max_iterations pivots (None for the default budget).
    // Solving again after NotSolved resumes from the current tableau.
    pub fn solve(&mut self, max_iterations: Option<usize>) -> Result<Status, Error> {
        self.solve_with(&SolverOptions::with_budget(max_iterations))
    }

    pub fn solve_with(&mut self, options: &SolverOptions) -> Result<Status, Error> {
        options.validate()?;
        if self.needs_phase_one() {
            return Err(Error::InvalidConfiguration(
                "the slack basis is not feasible; use the two-phase solve".to_string()));
        }
        self.optimize(options)
    }

    pub(crate) fn optimize(&mut self, options: &SolverOptions) -> Result<Status, Error> {
        let mut remaining = options.max_iterations;
        loop {
            match self.next_pivot(options.tolerance) {
                PivotResult::Done(status) => {
                    debug!("simplex finished: {} ({} pivots)",
                           status, options.max_iterations - remaining);
                    return Ok(status);
                },
                PivotResult::Pivot(row, col) => {
                    if remaining == 0 {
                        debug!("iteration budget of {} exhausted", options.max_iterations);
                        return Ok(Status::NotSolved);
                    }
                    self.pivot(row, col)?;
                    remaining -= 1;
                },
            }
        }
    }

    fn next_pivot(&self, tolerance: f64) -> PivotResult {
        let col = match self.entering_column(tolerance) {
            Some(col) => col,
            None => return PivotResult::Done(Status::Solved),
        };
        match self.leaving_row(col, tolerance) {
            Some(row) => PivotResult::Pivot(row, col),
            None => PivotResult::Done(Status::Unbounded),
        }
    }

    // Most negative reduced cost; the lowest column wins ties.
    pub(crate) fn entering_column(&self, tolerance: f64) -> Option<usize> {
        let objective = self.row(self.objective_row());
        trace!("reduced costs: {:?}", &objective[..self.constant_col()]);

        let mut entering = None;
        let mut min_value = -tolerance;
        for (col, &value) in objective[..self.constant_col()].iter().enumerate() {
            if value < min_value {
                min_value = value;
                entering = Some(col);
            }
        }
        entering
    }

    // Minimum ratio test over rows with a positive entry in col; the
    // lowest row wins ties. Ratios are clamped at zero so a constant that
    // drifted slightly negative counts as a degenerate row.
    pub(crate) fn leaving_row(&self, col: usize, tolerance: f64) -> Option<usize> {
        let constant_col = self.constant_col();
        let mut leaving = None;
        let mut limiting_ratio = None;
        for row in 0..self.constraint_count() {
            let entry = self.get(row, col);
            if entry > tolerance {
                let ratio = (self.get(row, constant_col) / entry).max(0.0);
                match limiting_ratio {
                    None => {
                        leaving = Some(row);
                        limiting_ratio = Some(ratio);
                    },
                    Some(r) => {
                        if ratio < r {
                            leaving = Some(row);
                            limiting_ratio = Some(ratio);
                        }
                    },
                }
            }
        }
        leaving
    }

    // Makes col basic in row: scales the row so the pivot is 1 and
    // eliminates col from every other row, objective row included.
    pub fn pivot(&mut self, row: usize, col: usize) -> Result<(), Error> {
        if row >= self.constraint_count() || col >= self.constant_col() {
            return Err(Error::InvalidConfiguration(
                format!("pivot position ({}, {}) is outside the constraint block", row, col)));
        }
        let pivot = self.get(row, col);
        if pivot == 0.0 || !pivot.is_finite() {
            return Err(Error::DegeneratePivot { row: row, col: col });
        }
        debug!("pivot: {} enters at row {} (pivot {}, rhs {})",
               self.variable_names()[col], row, pivot,
               self.get(row, self.constant_col()));

        for value in self.row_mut(row).iter_mut() {
            *value /= pivot;
        }
        self.set(row, col, 1.0);
        let pivot_row = self.row(row).to_vec();

        let cols = self.cols();
        for (i, values) in self.data_mut().chunks_mut(cols).enumerate() {
            if i == row {
                continue;
            }
            let factor = values[col];
            if factor == 0.0 {
                continue;
            }
            for (value, p) in values.iter_mut().zip(pivot_row.iter()) {
                *value -= factor * p;
            }
            values[col] = 0.0;
        }
        self.set_basic(row, Some(col));
        Ok(())
    }
}

#[cfg(test)]
fn load(constraints: usize, structural: usize, slacks: usize, rows: &[Vec<f64>]) -> Tableau {
    let mut tableau = Tableau::new(constraints, structural, slacks)
        .expect("Dimensions are valid");
    tableau.load_matrix(rows).expect("Matrix covers the tableau");
    tableau
}

// max 3x1 + 5x2 st x1 <= 4, 2x2 <= 12, 3x1 + 2x2 <= 18
#[cfg(test)]
fn textbook() -> Tableau {
    load(3, 2, 3, &[
        vec![1.0, 0.0, 1.0, 0.0, 0.0, 4.0],
        vec![0.0, 2.0, 0.0, 1.0, 0.0, 12.0],
        vec![3.0, 2.0, 0.0, 0.0, 1.0, 18.0],
        vec![-3.0, -5.0, 0.0, 0.0, 0.0, 0.0],
    ])
}

#[test]
fn test_simplex() {
    let mut tableau = textbook();
    let status = tableau.solve(None).expect("Solve should not fail");
    assert_eq!(status, Status::Solved);
    assert_abs_diff_eq!(tableau.objective_constant(), 36.0, epsilon = 1.0e-9);

    let constant_col = tableau.constant_col();
    for (row, basic) in tableau.basis().iter().enumerate() {
        match *basic {
            Some(0) => assert_abs_diff_eq!(tableau.get(row, constant_col), 2.0, epsilon = 1.0e-9),
            Some(1) => assert_abs_diff_eq!(tableau.get(row, constant_col), 6.0, epsilon = 1.0e-9),
            _ => {},
        }
    }
    let objective = tableau.row(tableau.objective_row());
    assert!(objective[..constant_col].iter().all(|&v| v >= -1.0e-9));
}

#[test]
fn basis_stays_canonical() {
    let mut tableau = textbook();
    let options = SolverOptions::new().max_iterations(1);
    loop {
        let status = tableau.optimize(&options).expect("Pivot should not fail");
        assert!(tableau.has_canonical_basis(1.0e-9));
        if status.is_terminal() {
            break;
        }
    }
}

#[test]
fn entering_column_prefers_lowest_index() {
    let tableau = load(1, 3, 1, &[
        vec![1.0, 1.0, 1.0, 1.0, 1.0],
        vec![-1.0, -2.0, -2.0, 0.0, 0.0],
    ]);
    assert_eq!(tableau.entering_column(1.0e-9), Some(1));
}

#[test]
fn ratio_test_tie_takes_first_row() {
    let tableau = load(3, 1, 3, &[
        vec![1.0, 1.0, 0.0, 0.0, 2.0],
        vec![2.0, 0.0, 1.0, 0.0, 4.0],
        vec![-1.0, 0.0, 0.0, 1.0, 1.0],
        vec![-1.0, 0.0, 0.0, 0.0, 0.0],
    ]);
    assert_eq!(tableau.leaving_row(0, 1.0e-9), Some(0));
}

#[test]
fn ratio_test_takes_minimum() {
    let tableau = load(3, 1, 3, &[
        vec![1.0, 1.0, 0.0, 0.0, 9.0],
        vec![-4.0, 0.0, 1.0, 0.0, 1.0],
        vec![3.0, 0.0, 0.0, 1.0, 6.0],
        vec![-1.0, 0.0, 0.0, 0.0, 0.0],
    ]);
    assert_eq!(tableau.leaving_row(0, 1.0e-9), Some(2));
}

#[test]
fn ratio_test_ignores_negative_drift() {
    let tableau = load(2, 1, 2, &[
        vec![1.0, 1.0, 0.0, 0.0],
        vec![1.0, 0.0, 1.0, -1.0e-16],
        vec![-1.0, 0.0, 0.0, 0.0],
    ]);
    assert_eq!(tableau.leaving_row(0, 1.0e-9), Some(0));
}

#[test]
fn test_solve_unbounded() {
    // max x1 st x1 - x2 <= 1
    let mut tableau = load(1, 2, 1, &[
        vec![1.0, -1.0, 1.0, 1.0],
        vec![-1.0, 0.0, 0.0, 0.0],
    ]);
    let status = tableau.solve(None).expect("Solve should not fail");
    assert_eq!(status, Status::Unbounded);
}

#[test]
fn budget_counts_pivots() {
    let mut tableau = textbook();
    assert_eq!(tableau.solve(Some(1)).expect("Solve should not fail"), Status::NotSolved);
    assert_eq!(tableau.solve(Some(1)).expect("Solve should not fail"), Status::Solved);
    assert_abs_diff_eq!(tableau.objective_constant(), 36.0, epsilon = 1.0e-9);
}

#[test]
fn resumed_solve_matches_single_solve() {
    let mut stepped = textbook();
    let mut status = Status::NotSolved;
    for _ in 0..10 {
        status = stepped.solve(Some(1)).expect("Solve should not fail");
        if status.is_terminal() {
            break;
        }
    }
    assert_eq!(status, Status::Solved);

    let mut direct = textbook();
    assert_eq!(direct.solve(Some(10)).expect("Solve should not fail"), Status::Solved);
    assert_eq!(stepped.basis(), direct.basis());
    for (a, b) in stepped.data().iter().zip(direct.data()) {
        assert_abs_diff_eq!(*a, *b, epsilon = 1.0e-12);
    }
}

#[test]
fn reject_zero_budget() {
    let mut tableau = textbook();
    match tableau.solve(Some(0)) {
        Err(Error::InvalidConfiguration(_)) => {},
        other => panic!("Expected invalid configuration, got {:?}", other),
    }
}

#[test]
fn zero_pivot_is_an_error() {
    let mut tableau = textbook();
    match tableau.pivot(0, 1) {
        Err(Error::DegeneratePivot { row: 0, col: 1 }) => {},
        other => panic!("Expected degenerate pivot, got {:?}", other),
    }
    assert!(tableau.pivot(3, 0).is_err());
    assert!(tableau.pivot(0, 5).is_err());
}

#[test]
fn single_phase_refuses_infeasible_start() {
    use crate::builder::{build_tableau, Constraint, Objective, Operator};

    let constraints = vec![
        Constraint::new(vec![1.0], Operator::GreaterEqual, 1.0).expect("Valid"),
    ];
    let objective = Objective::minimize(vec![1.0]).expect("Valid");
    let mut tableau = build_tableau(&constraints, &objective, None)
        .expect("Build should not fail");
    match tableau.solve(None) {
        Err(Error::InvalidConfiguration(_)) => {},
        other => panic!("Expected invalid configuration, got {:?}", other),
    }
}
