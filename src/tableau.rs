// Dense simplex tableau.
//
// Layout, for m constraints, n structural and k slack variables:
//
//   row 0..m   : a_1 .. a_n | s_1 .. s_k | rhs
//   row m      : objective  |  0  ..  0  |  0
//
// The last row is the objective row, the last column the constant
// column. The basis maps each constraint row to the column of its basic
// variable; the objective row has none.

use std::fmt;

use log::debug;
use rulinalg::matrix::{BaseMatrix, Matrix};

use crate::builder::Direction;
use crate::error::Error;
#[cfg(test)]
use crate::problem::Status;

#[derive(Debug, Clone)]
pub struct Tableau {
    matrix: Matrix<f64>,
    basis: Vec<Option<usize>>,
    names: Vec<String>,
    structural: usize,
    direction: Direction,
    needs_phase_one: bool,
}

impl Tableau {
    pub fn new(constraints: usize, structural: usize, slacks: usize)
        -> Result<Tableau, Error> {
        if constraints == 0 {
            return Err(Error::InvalidConfiguration(
                "tableau needs at least one constraint row".to_string()));
        }
        if structural + slacks == 0 {
            return Err(Error::InvalidConfiguration(
                "tableau needs at least one variable column".to_string()));
        }
        let rows = constraints + 1;
        let cols = structural + slacks + 1;
        debug!("new tableau: {} rows, {} cols, {} structural", rows, cols, structural);

        let mut tableau = Tableau {
            matrix: Matrix::zeros(rows, cols),
            basis: Vec::new(),
            names: Vec::new(),
            structural: structural,
            direction: Direction::Maximize,
            needs_phase_one: false,
        };
        tableau.clear();
        Ok(tableau)
    }

    pub fn rows(&self) -> usize {
        self.matrix.rows()
    }

    pub fn cols(&self) -> usize {
        self.matrix.cols()
    }

    pub fn constraint_count(&self) -> usize {
        self.rows() - 1
    }

    pub fn structural_count(&self) -> usize {
        self.structural
    }

    pub fn slack_count(&self) -> usize {
        self.cols() - 1 - self.structural
    }

    pub fn objective_row(&self) -> usize {
        self.rows() - 1
    }

    pub fn constant_col(&self) -> usize {
        self.cols() - 1
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.matrix[[row, col]]
    }

    pub(crate) fn set(&mut self, row: usize, col: usize, value: f64) {
        self.matrix[[row, col]] = value;
    }

    pub fn row(&self, row: usize) -> &[f64] {
        let cols = self.cols();
        &self.matrix.data()[row * cols..(row + 1) * cols]
    }

    pub(crate) fn row_mut(&mut self, row: usize) -> &mut [f64] {
        let cols = self.cols();
        &mut self.matrix.mut_data()[row * cols..(row + 1) * cols]
    }

    // Row-major view of the whole tableau.
    pub fn data(&self) -> &[f64] {
        self.matrix.data()
    }

    pub(crate) fn data_mut(&mut self) -> &mut [f64] {
        self.matrix.mut_data()
    }

    pub fn basis(&self) -> &[Option<usize>] {
        &self.basis
    }

    pub(crate) fn set_basic(&mut self, row: usize, col: Option<usize>) {
        self.basis[row] = col;
    }

    pub fn variable_names(&self) -> &[String] {
        &self.names
    }

    pub(crate) fn set_name(&mut self, col: usize, name: String) {
        self.names[col] = name;
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub(crate) fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    // True while the initial slack basis is not a valid starting point,
    // i.e. until a two-phase solve has installed a feasible basis.
    pub fn needs_phase_one(&self) -> bool {
        self.needs_phase_one
    }

    pub(crate) fn set_needs_phase_one(&mut self, needs_phase_one: bool) {
        self.needs_phase_one = needs_phase_one;
    }

    // Raw entry of the objective row in the constant column. For a
    // minimization tableau this is the negated objective value.
    pub fn objective_constant(&self) -> f64 {
        self.get(self.objective_row(), self.constant_col())
    }

    // Zeroes the matrix and restores the slack basis, default names and
    // the maximize convention. Rows beyond the last slack column start
    // without a basic variable.
    pub fn clear(&mut self) -> &mut Tableau {
        let rows = self.rows();
        let cols = self.cols();
        self.matrix = Matrix::zeros(rows, cols);
        self.direction = Direction::Maximize;
        self.needs_phase_one = false;

        self.basis.clear();
        for i in 0..rows - 1 {
            let slack = self.structural + i;
            if slack < cols - 1 {
                self.basis.push(Some(slack));
            } else {
                self.basis.push(None);
            }
        }
        self.basis.push(None);

        self.names.clear();
        for i in 0..self.structural {
            self.names.push(format!("x{}", i + 1));
        }
        for i in self.structural..cols - 1 {
            self.names.push(format!("s{}", i - self.structural + 1));
        }
        self
    }

    // Overwrites structural variable names position by position; None
    // keeps the current name.
    pub fn set_variable_names<S: AsRef<str>>(&mut self, names: &[Option<S>])
        -> Result<&mut Tableau, Error> {
        if names.len() > self.structural {
            return Err(Error::DimensionMismatch {
                expected_rows: 1,
                expected_cols: self.structural,
                rows: 1,
                cols: names.len(),
            });
        }
        for (i, name) in names.iter().enumerate() {
            if let Some(name) = name {
                self.names[i] = name.as_ref().to_string();
            }
        }
        Ok(self)
    }

    // Copies a caller-supplied matrix into the tableau. Extra rows and
    // columns are ignored; missing ones are an error, and nothing is
    // written unless every row is long enough.
    pub fn load_matrix<R: AsRef<[f64]>>(&mut self, matrix: &[R])
        -> Result<&mut Tableau, Error> {
        let rows = self.rows();
        let cols = self.cols();
        let shortest = matrix.iter()
            .take(rows)
            .map(|row| row.as_ref().len())
            .min()
            .unwrap_or(0);
        if matrix.len() < rows || shortest < cols {
            return Err(Error::DimensionMismatch {
                expected_rows: rows,
                expected_cols: cols,
                rows: matrix.len(),
                cols: shortest,
            });
        }
        for (i, source) in matrix.iter().take(rows).enumerate() {
            self.row_mut(i).copy_from_slice(&source.as_ref()[..cols]);
        }
        Ok(self)
    }

    // Checks that every basic column restricted to the constraint rows
    // is a unit vector with its 1 in the row it is basic for.
    pub fn has_canonical_basis(&self, tolerance: f64) -> bool {
        let constraints = self.constraint_count();
        for (row, basic) in self.basis.iter().take(constraints).enumerate() {
            let col = match *basic {
                Some(col) => col,
                None => continue,
            };
            if col >= self.constant_col() {
                return false;
            }
            for i in 0..constraints {
                let expected = if i == row { 1.0 } else { 0.0 };
                if (self.get(i, col) - expected).abs() > tolerance {
                    return false;
                }
            }
        }
        true
    }
}

impl fmt::Display for Tableau {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:>6}", "")?;
        for name in self.names.iter() {
            write!(f, " {:>10}", name)?;
        }
        writeln!(f, " {:>10}", "rhs")?;
        for (i, basic) in self.basis.iter().enumerate() {
            let label = match *basic {
                Some(col) => self.names.get(col).map_or("?", |name| name.as_str()),
                None if i == self.objective_row() => "z",
                None => "-",
            };
            write!(f, "{:>6}", label)?;
            for value in self.row(i) {
                write!(f, " {:>10.4}", value)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[test]
fn new_tableau_defaults() {
    let tableau = Tableau::new(2, 3, 2).expect("Dimensions are valid");
    assert_eq!(tableau.rows(), 3);
    assert_eq!(tableau.cols(), 6);
    assert_eq!(tableau.structural_count(), 3);
    assert_eq!(tableau.slack_count(), 2);
    assert_eq!(tableau.basis(), &[Some(3), Some(4), None]);
    assert_eq!(tableau.variable_names(), &["x1", "x2", "x3", "s1", "s2"]);
    assert!(tableau.data().iter().all(|&v| v == 0.0));
    assert_eq!(tableau.direction(), Direction::Maximize);
}

#[test]
fn reject_empty_dimensions() {
    assert!(Tableau::new(0, 2, 2).is_err());
    assert!(Tableau::new(2, 0, 0).is_err());
}

#[test]
fn clear_resets_state() {
    let mut tableau = Tableau::new(1, 1, 1).expect("Dimensions are valid");
    tableau.load_matrix(&[vec![1.0, 1.0, 4.0], vec![-1.0, 0.0, 0.0]])
        .expect("Matrix covers the tableau");
    tableau.set_variable_names(&[Some("apples")])
        .expect("One structural variable");
    tableau.set_basic(0, Some(0));

    tableau.clear();
    assert!(tableau.data().iter().all(|&v| v == 0.0));
    assert_eq!(tableau.basis(), &[Some(1), None]);
    assert_eq!(tableau.variable_names(), &["x1", "s1"]);
}

#[test]
fn clear_drops_builder_state() {
    use crate::builder::{build_tableau, Constraint, Objective, Operator};

    let constraints = vec![
        Constraint::new(vec![1.0], Operator::Equal, 1.0).expect("Valid"),
        Constraint::new(vec![1.0, 1.0], Operator::LessEqual, 4.0).expect("Valid"),
    ];
    let objective = Objective::minimize(vec![1.0, 1.0]).expect("Valid");
    let mut tableau = build_tableau(&constraints, &objective, None)
        .expect("Build should not fail");
    assert!(tableau.needs_phase_one());

    tableau.clear();
    // One slack column for two rows: the second row has none.
    assert_eq!(tableau.basis(), &[Some(2), None, None]);
    assert!(!tableau.needs_phase_one());
    assert_eq!(tableau.direction(), Direction::Maximize);

    // max x1 + x2 st x1 + s1 = 2, x2 = 3
    tableau.load_matrix(&[
        vec![1.0, 0.0, 1.0, 2.0],
        vec![0.0, 1.0, 0.0, 3.0],
        vec![-1.0, -1.0, 0.0, 0.0],
    ]).expect("Matrix covers the tableau");
    assert_eq!(tableau.solve(None).expect("Solve should not fail"), Status::Solved);

    let solution = tableau.read_solution();
    assert_eq!(solution.objective_value, 5.0);
    assert_eq!(solution.structural_vector(2), vec![2.0, 3.0]);
    assert!(solution.slack.is_empty());
}

#[test]
fn basis_never_points_at_constant_column() {
    let tableau = Tableau::new(2, 1, 0).expect("Dimensions are valid");
    assert_eq!(tableau.cols(), 2);
    assert_eq!(tableau.basis(), &[None, None, None]);
    let solution = tableau.read_solution();
    assert!(solution.structural.is_empty());
    assert!(solution.slack.is_empty());
}

#[test]
fn set_names_keeps_absent_entries() {
    let mut tableau = Tableau::new(1, 3, 1).expect("Dimensions are valid");
    tableau.set_variable_names(&[Some("a"), None, Some("c")])
        .expect("Three structural variables");
    assert_eq!(tableau.variable_names(), &["a", "x2", "c", "s1"]);

    match tableau.set_variable_names(&[Some("a"), None, None, Some("d")]) {
        Err(Error::DimensionMismatch { .. }) => {},
        other => panic!("Expected dimension mismatch, got {:?}", other),
    }
}

#[test]
fn load_matrix_copies_values() {
    let mut tableau = Tableau::new(1, 1, 1).expect("Dimensions are valid");
    let mut source = vec![
        vec![2.0, 1.0, 8.0, 99.0],
        vec![-3.0, 0.0, 0.0, 99.0],
        vec![99.0, 99.0, 99.0, 99.0],
    ];
    tableau.load_matrix(&source).expect("Oversized matrix is accepted");
    source[0][0] = 42.0;
    assert_eq!(tableau.data(), &[2.0, 1.0, 8.0, -3.0, 0.0, 0.0]);
}

#[test]
fn load_matrix_rejects_undersized() {
    let mut tableau = Tableau::new(2, 1, 1).expect("Dimensions are valid");
    let too_few_rows = vec![vec![1.0, 1.0, 1.0], vec![1.0, 1.0, 1.0]];
    match tableau.load_matrix(&too_few_rows) {
        Err(Error::DimensionMismatch { expected_rows: 3, rows: 2, .. }) => {},
        other => panic!("Expected dimension mismatch, got {:?}", other),
    }

    let short_row = vec![vec![1.0, 1.0, 1.0], vec![1.0, 1.0], vec![1.0, 1.0, 1.0]];
    match tableau.load_matrix(&short_row) {
        Err(Error::DimensionMismatch { expected_cols: 3, cols: 2, .. }) => {},
        other => panic!("Expected dimension mismatch, got {:?}", other),
    }
    // Nothing was written by the failed loads.
    assert!(tableau.data().iter().all(|&v| v == 0.0));
}

#[test]
fn canonical_basis_check() {
    let mut tableau = Tableau::new(2, 1, 2).expect("Dimensions are valid");
    tableau.load_matrix(&[
        vec![1.0, 1.0, 0.0, 4.0],
        vec![2.0, 0.0, 1.0, 6.0],
        vec![-1.0, 0.0, 0.0, 0.0],
    ]).expect("Matrix covers the tableau");
    assert!(tableau.has_canonical_basis(1.0e-9));

    tableau.set_basic(0, Some(0));
    assert!(!tableau.has_canonical_basis(1.0e-9));
}

#[test]
fn display_lists_names_and_basis() {
    let tableau = Tableau::new(1, 2, 1).expect("Dimensions are valid");
    let text = tableau.to_string();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].contains("x1") && lines[0].contains("s1"));
    assert!(lines[1].trim_start().starts_with("s1"));
    assert!(lines[2].trim_start().starts_with('z'));
}
