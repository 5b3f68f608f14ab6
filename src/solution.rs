use crate::builder::Direction;
use crate::tableau::Tableau;

#[cfg(test)]
use approx::assert_abs_diff_eq;

#[derive(Debug, Clone, PartialEq)]
pub struct VariableValue {
    pub index: usize,
    pub name: String,
    pub value: f64,
}

// Values of the basic variables only. A variable that is not basic sits
// at zero and does not appear in either list.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub objective_value: f64,
    pub structural: Vec<VariableValue>,
    pub slack: Vec<VariableValue>,
}

impl Solution {
    // Dense structural values, with 0.0 for every non-basic variable.
    pub fn structural_vector(&self, len: usize) -> Vec<f64> {
        let mut x = Vec::new();
        x.resize(len, 0.0);
        for v in self.structural.iter() {
            if v.index < len {
                x[v.index] = v.value;
            }
        }
        x
    }

    // Value of a basic variable, structural or slack, by display name.
    pub fn value(&self, name: &str) -> Option<f64> {
        self.structural.iter()
            .chain(self.slack.iter())
            .find(|v| v.name == name)
            .map(|v| v.value)
    }
}

impl Tableau {
    // Reads the current basic solution. Meaningful after Solved; after
    // Unbounded or NotSolved it describes the last vertex visited.
    pub fn read_solution(&self) -> Solution {
        let constant_col = self.constant_col();
        let objective_row = self.objective_row();
        let structural_count = self.structural_count();

        let mut objective_value = 0.0;
        let mut structural = Vec::new();
        let mut slack = Vec::new();
        for (row, basic) in self.basis().iter().enumerate() {
            let value = self.get(row, constant_col);
            match *basic {
                None => {
                    if row == objective_row {
                        objective_value = match self.direction() {
                            Direction::Maximize => value,
                            Direction::Minimize => -value,
                        };
                    }
                },
                Some(col) => {
                    let name = self.variable_names().get(col)
                        .cloned()
                        .unwrap_or_else(|| format!("#{}", col));
                    let one = VariableValue {
                        index: col,
                        name: name,
                        value: value,
                    };
                    if col < structural_count {
                        structural.push(one);
                    } else {
                        slack.push(one);
                    }
                },
            }
        }
        structural.sort_by_key(|v| v.index);
        slack.sort_by_key(|v| v.index);

        Solution {
            objective_value: objective_value,
            structural: structural,
            slack: slack,
        }
    }
}

#[cfg(test)]
use crate::builder::{build_tableau, Constraint, Objective, Operator};

#[test]
fn read_maximum() {
    let constraints = vec![
        Constraint::new(vec![1.0], Operator::LessEqual, 4.0).expect("Valid"),
        Constraint::new(vec![0.0, 2.0], Operator::LessEqual, 12.0).expect("Valid"),
        Constraint::new(vec![3.0, 2.0], Operator::LessEqual, 18.0).expect("Valid"),
    ];
    let objective = Objective::maximize(vec![3.0, 5.0]).expect("Valid");
    let names = vec![Some("doors".to_string()), Some("windows".to_string())];
    let mut tableau = build_tableau(&constraints, &objective, Some(names.as_slice()))
        .expect("Build should not fail");
    tableau.solve(None).expect("Solve should not fail");

    let solution = tableau.read_solution();
    assert_abs_diff_eq!(solution.objective_value, 36.0, epsilon = 1.0e-9);
    assert_eq!(solution.structural.len(), 2);
    assert_eq!(solution.structural[0].index, 0);
    assert_eq!(solution.structural[0].name, "doors");
    assert_abs_diff_eq!(solution.structural[0].value, 2.0, epsilon = 1.0e-9);
    assert_eq!(solution.structural[1].name, "windows");
    assert_abs_diff_eq!(solution.structural[1].value, 6.0, epsilon = 1.0e-9);

    // Only s1 stays basic; s2 and s3 are binding and read as zero.
    assert_eq!(solution.slack.len(), 1);
    assert_eq!(solution.slack[0].index, 2);
    assert_eq!(solution.slack[0].name, "s1");
    assert_abs_diff_eq!(solution.slack[0].value, 2.0, epsilon = 1.0e-9);
    assert_eq!(solution.value("s2"), None);
}

#[test]
fn read_minimum_reports_true_objective() {
    let constraints = vec![
        Constraint::new(vec![3.0, 1.0], Operator::Equal, 3.0).expect("Valid"),
        Constraint::new(vec![4.0, 3.0], Operator::GreaterEqual, 6.0).expect("Valid"),
        Constraint::new(vec![1.0, 2.0], Operator::LessEqual, 4.0).expect("Valid"),
    ];
    let objective = Objective::minimize(vec![4.0, 1.0]).expect("Valid");
    let mut tableau = build_tableau(&constraints, &objective, None)
        .expect("Build should not fail");
    tableau.solve_two_phase().expect("Solve should not fail");

    let solution = tableau.read_solution();
    assert_abs_diff_eq!(solution.objective_value, 3.4, epsilon = 1.0e-9);
    let x = solution.structural_vector(2);
    assert_abs_diff_eq!(x[0], 0.4, epsilon = 1.0e-9);
    assert_abs_diff_eq!(x[1], 1.8, epsilon = 1.0e-9);
    assert_abs_diff_eq!(solution.value("s1").expect("s1 is basic"), 1.0, epsilon = 1.0e-9);
}

#[test]
fn unsolved_tableau_reads_slack_basis() {
    let constraints = vec![
        Constraint::new(vec![1.0, 1.0], Operator::LessEqual, 5.0).expect("Valid"),
        Constraint::new(vec![1.0, -1.0], Operator::LessEqual, 1.0).expect("Valid"),
    ];
    let objective = Objective::maximize(vec![1.0, 1.0]).expect("Valid");
    let tableau = build_tableau(&constraints, &objective, None)
        .expect("Build should not fail");

    let solution = tableau.read_solution();
    assert_eq!(solution.objective_value, 0.0);
    assert!(solution.structural.is_empty());
    assert_eq!(solution.slack.iter().map(|v| v.value).collect::<Vec<_>>(), vec![5.0, 1.0]);
    assert_eq!(solution.structural_vector(2), vec![0.0, 0.0]);
}
