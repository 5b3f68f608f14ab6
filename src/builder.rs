use log::debug;

use crate::config::SolverOptions;
use crate::error::Error;
use crate::problem::Status;
use crate::tableau::Tableau;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    LessEqual,
    Equal,
    GreaterEqual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Maximize,
    Minimize,
}

fn check_coefficients(what: &str, coefficients: &[f64]) -> Result<(), Error> {
    if coefficients.is_empty() {
        return Err(Error::InvalidConfiguration(
            format!("{} has no coefficients", what)));
    }
    if let Some(i) = coefficients.iter().position(|c| !c.is_finite()) {
        return Err(Error::InvalidConfiguration(
            format!("{} coefficient {} is not finite", what, i)));
    }
    Ok(())
}

// a_1*x_1 + ... + a_n*x_n (op) constant
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    coefficients: Vec<f64>,
    operator: Operator,
    constant: f64,
}

impl Constraint {
    pub fn new(coefficients: Vec<f64>, operator: Operator, constant: f64)
        -> Result<Constraint, Error> {
        check_coefficients("constraint", &coefficients)?;
        if !constant.is_finite() {
            return Err(Error::InvalidConfiguration(
                "constraint constant is not finite".to_string()));
        }
        Ok(Constraint {
            coefficients: coefficients,
            operator: operator,
            constant: constant,
        })
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn constant(&self) -> f64 {
        self.constant
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Objective {
    coefficients: Vec<f64>,
    direction: Direction,
}

impl Objective {
    pub fn new(coefficients: Vec<f64>, direction: Direction)
        -> Result<Objective, Error> {
        check_coefficients("objective", &coefficients)?;
        Ok(Objective {
            coefficients: coefficients,
            direction: direction,
        })
    }

    pub fn maximize(coefficients: Vec<f64>) -> Result<Objective, Error> {
        Objective::new(coefficients, Direction::Maximize)
    }

    pub fn minimize(coefficients: Vec<f64>) -> Result<Objective, Error> {
        Objective::new(coefficients, Direction::Minimize)
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }
}

// Lays the problem out as a tableau with one slack column per
// inequality. Shorter coefficient lists are zero-padded up to the
// longest one. The objective row holds -c when maximizing and c when
// minimizing, i.e. z - c'x = 0 or -z + c'x = 0.
pub fn build_tableau(constraints: &[Constraint],
                     objective: &Objective,
                     names: Option<&[Option<String>]>)
    -> Result<Tableau, Error> {
    if constraints.is_empty() {
        return Err(Error::InvalidConfiguration(
            "problem has no constraints".to_string()));
    }

    let mut structural = 0;
    let mut slacks = 0;
    for constraint in constraints.iter() {
        structural = structural.max(constraint.coefficients.len());
        match constraint.operator {
            Operator::LessEqual | Operator::GreaterEqual => {
                slacks += 1;
            },
            Operator::Equal => {},
        }
    }
    if objective.coefficients.len() > structural {
        return Err(Error::DimensionMismatch {
            expected_rows: 1,
            expected_cols: structural,
            rows: 1,
            cols: objective.coefficients.len(),
        });
    }

    let mut tableau = Tableau::new(constraints.len(), structural, slacks)?;
    let constant_col = tableau.constant_col();
    let objective_row = tableau.objective_row();

    let mut slack_col = structural;
    let mut needs_phase_one = false;
    for (i, constraint) in constraints.iter().enumerate() {
        for (j, &coeff) in constraint.coefficients.iter().enumerate() {
            tableau.set(i, j, coeff);
        }
        // Each row starts with its own slack column as basic variable;
        // equality rows have none.
        match constraint.operator {
            Operator::LessEqual => {
                tableau.set(i, slack_col, 1.0);
                tableau.set_basic(i, Some(slack_col));
                slack_col += 1;
            },
            Operator::GreaterEqual => {
                tableau.set(i, slack_col, -1.0);
                tableau.set_basic(i, Some(slack_col));
                slack_col += 1;
                needs_phase_one = true;
            },
            Operator::Equal => {
                tableau.set_basic(i, None);
                needs_phase_one = true;
            },
        }
        if constraint.constant < 0.0 {
            needs_phase_one = true;
        }
        tableau.set(i, constant_col, constraint.constant);
    }

    let sign = match objective.direction {
        Direction::Maximize => -1.0,
        Direction::Minimize => 1.0,
    };
    for (j, &coeff) in objective.coefficients.iter().enumerate() {
        tableau.set(objective_row, j, sign * coeff);
    }
    tableau.set_direction(objective.direction);
    tableau.set_needs_phase_one(needs_phase_one);

    if let Some(names) = names {
        tableau.set_variable_names(names)?;
    }

    debug!("built tableau for {} constraints, {} structural, {} slack, phase one needed: {}",
           constraints.len(), structural, slacks, needs_phase_one);
    Ok(tableau)
}

#[derive(Debug, Clone)]
pub struct Problem {
    constraints: Vec<Constraint>,
    objective: Objective,
    names: Vec<Option<String>>,
}

impl Problem {
    pub fn new(objective: Objective) -> Problem {
        Problem {
            constraints: Vec::new(),
            objective: objective,
            names: Vec::new(),
        }
    }

    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    pub fn set_objective(&mut self, objective: Objective) {
        self.objective = objective;
    }

    pub fn set_variable_name(&mut self, index: usize, name: &str) {
        if self.names.len() <= index {
            self.names.resize(index + 1, None);
        }
        self.names[index] = Some(name.to_string());
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn objective(&self) -> &Objective {
        &self.objective
    }

    pub fn tableau(&self) -> Result<Tableau, Error> {
        let names = if self.names.is_empty() {
            None
        } else {
            Some(self.names.as_slice())
        };
        build_tableau(&self.constraints, &self.objective, names)
    }

    // Solves directly when the slack basis is feasible, otherwise
    // through the two-phase method.
    pub fn solve(&self, options: &SolverOptions) -> Result<(Status, Tableau), Error> {
        let mut tableau = self.tableau()?;
        let status = if tableau.needs_phase_one() {
            tableau.solve_two_phase_with(options)?
        } else {
            tableau.solve_with(options)?
        };
        Ok((status, tableau))
    }
}

#[test]
fn build_constraint() {
    let constraint = Constraint::new(vec![1.0, 2.0], Operator::LessEqual, 5.0)
        .expect("Constraint is valid");
    assert_eq!(constraint.coefficients(), &[1.0, 2.0]);
    assert_eq!(constraint.operator(), Operator::LessEqual);
    assert_eq!(constraint.constant(), 5.0);
}

#[test]
fn reject_malformed_input() {
    match Constraint::new(vec![], Operator::Equal, 1.0) {
        Err(Error::InvalidConfiguration(_)) => {},
        other => panic!("Expected invalid configuration, got {:?}", other),
    }
    assert!(Constraint::new(vec![1.0, f64::NAN], Operator::Equal, 1.0).is_err());
    assert!(Constraint::new(vec![1.0], Operator::Equal, f64::INFINITY).is_err());
    assert!(Objective::maximize(vec![]).is_err());

    let objective = Objective::maximize(vec![1.0]).expect("Objective is valid");
    match build_tableau(&[], &objective, None) {
        Err(Error::InvalidConfiguration(_)) => {},
        other => panic!("Expected invalid configuration, got {:?}", other),
    }
}

#[test]
fn reject_objective_wider_than_constraints() {
    let constraints = vec![
        Constraint::new(vec![1.0], Operator::LessEqual, 1.0).expect("Valid"),
    ];
    let objective = Objective::maximize(vec![1.0, 1.0]).expect("Valid");
    match build_tableau(&constraints, &objective, None) {
        Err(Error::DimensionMismatch { .. }) => {},
        other => panic!("Expected dimension mismatch, got {:?}", other),
    }
}

#[test]
fn tableau_layout() {
    let constraints = vec![
        Constraint::new(vec![1.0, 2.0], Operator::LessEqual, 5.0).expect("Valid"),
        Constraint::new(vec![5.0], Operator::Equal, 10.0).expect("Valid"),
        Constraint::new(vec![0.0, 1.0], Operator::GreaterEqual, 2.0).expect("Valid"),
    ];
    let objective = Objective::maximize(vec![1.0, 3.0]).expect("Valid");
    let tableau = build_tableau(&constraints, &objective, None)
        .expect("Build should not fail");

    assert_eq!(tableau.rows(), 4);
    assert_eq!(tableau.cols(), 5);
    assert_eq!(tableau.structural_count(), 2);
    assert_eq!(tableau.slack_count(), 2);
    assert_eq!(tableau.data(),
               &[1.0, 2.0, 1.0, 0.0, 5.0,
                 5.0, 0.0, 0.0, 0.0, 10.0,
                 0.0, 1.0, 0.0, -1.0, 2.0,
                 -1.0, -3.0, 0.0, 0.0, 0.0]);
    assert_eq!(tableau.basis(), &[Some(2), None, Some(3), None]);
    assert!(tableau.needs_phase_one());
    assert_eq!(tableau.direction(), Direction::Maximize);
}

#[test]
fn minimize_keeps_objective_sign() {
    let constraints = vec![
        Constraint::new(vec![1.0, 1.0], Operator::LessEqual, 4.0).expect("Valid"),
    ];
    let objective = Objective::minimize(vec![2.0, -1.0]).expect("Valid");
    let tableau = build_tableau(&constraints, &objective, None)
        .expect("Build should not fail");
    assert_eq!(tableau.row(tableau.objective_row()), &[2.0, -1.0, 0.0, 0.0]);
    assert!(!tableau.needs_phase_one());
}

#[test]
fn negative_constant_needs_phase_one() {
    let constraints = vec![
        Constraint::new(vec![-1.0], Operator::LessEqual, -2.0).expect("Valid"),
    ];
    let objective = Objective::minimize(vec![1.0]).expect("Valid");
    let tableau = build_tableau(&constraints, &objective, None)
        .expect("Build should not fail");
    assert!(tableau.needs_phase_one());
}

#[test]
fn problem_applies_names() {
    let mut problem = Problem::new(Objective::maximize(vec![1.0, 1.0]).expect("Valid"));
    problem.add_constraint(
        Constraint::new(vec![1.0, 1.0], Operator::LessEqual, 3.0).expect("Valid"));
    problem.set_variable_name(1, "bread");
    let tableau = problem.tableau().expect("Build should not fail");
    assert_eq!(tableau.variable_names(), &["x1", "bread", "s1"]);
}
