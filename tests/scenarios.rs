use approx::assert_abs_diff_eq;

use tableau_lp::{build_tableau, Constraint, Error, Objective, Operator, Problem,
                 SolverOptions, Status, Tableau};

fn constraint(coefficients: Vec<f64>, operator: Operator, constant: f64) -> Constraint {
    Constraint::new(coefficients, operator, constant).expect("Constraint is valid")
}

#[test]
fn maximize_production() {
    let constraints = vec![
        constraint(vec![1.0, 0.0], Operator::LessEqual, 4.0),
        constraint(vec![0.0, 2.0], Operator::LessEqual, 12.0),
        constraint(vec![3.0, 2.0], Operator::LessEqual, 18.0),
    ];
    let objective = Objective::maximize(vec![3.0, 5.0]).expect("Objective is valid");
    let mut tableau = build_tableau(&constraints, &objective, None)
        .expect("Build should not fail");

    assert_eq!(tableau.solve(None).expect("Solve should not fail"), Status::Solved);
    let solution = tableau.read_solution();
    assert_abs_diff_eq!(solution.objective_value, 36.0, epsilon = 1.0e-9);
    let x = solution.structural_vector(2);
    assert_abs_diff_eq!(x[0], 2.0, epsilon = 1.0e-9);
    assert_abs_diff_eq!(x[1], 6.0, epsilon = 1.0e-9);

    let objective_row = tableau.row(tableau.objective_row());
    assert!(objective_row[..tableau.constant_col()].iter().all(|&v| v >= -1.0e-9));
}

#[test]
fn unbounded_direction() {
    let constraints = vec![constraint(vec![1.0, -1.0], Operator::LessEqual, 1.0)];
    let objective = Objective::maximize(vec![1.0]).expect("Objective is valid");
    let mut tableau = build_tableau(&constraints, &objective, None)
        .expect("Build should not fail");
    assert_eq!(tableau.solve(None).expect("Solve should not fail"), Status::Unbounded);
}

#[test]
fn two_phase_with_mixed_operators() {
    let constraints = vec![
        constraint(vec![3.0, 1.0], Operator::Equal, 3.0),
        constraint(vec![4.0, 3.0], Operator::GreaterEqual, 6.0),
        constraint(vec![1.0, 2.0], Operator::LessEqual, 4.0),
    ];
    let objective = Objective::minimize(vec![4.0, 1.0]).expect("Objective is valid");
    let mut tableau = build_tableau(&constraints, &objective, None)
        .expect("Build should not fail");

    assert_eq!(tableau.solve_two_phase().expect("Solve should not fail"), Status::Solved);
    let solution = tableau.read_solution();
    assert_abs_diff_eq!(solution.objective_value, 3.4, epsilon = 1.0e-9);
    let x = solution.structural_vector(2);
    assert_abs_diff_eq!(x[0], 0.4, epsilon = 1.0e-9);
    assert_abs_diff_eq!(x[1], 1.8, epsilon = 1.0e-9);
}

#[test]
fn contradictory_bounds_are_infeasible() {
    let constraints = vec![
        constraint(vec![1.0], Operator::LessEqual, 1.0),
        constraint(vec![1.0], Operator::GreaterEqual, 3.0),
    ];
    let objective = Objective::maximize(vec![1.0]).expect("Objective is valid");
    let mut tableau = build_tableau(&constraints, &objective, None)
        .expect("Build should not fail");
    assert_eq!(tableau.solve_two_phase().expect("Solve should not fail"), Status::Infeasible);
}

#[test]
fn exhausted_budget_resumes() {
    // Three pivots under Dantzig's rule, one per variable.
    let constraints = vec![
        constraint(vec![1.0], Operator::LessEqual, 1.0),
        constraint(vec![0.0, 1.0], Operator::LessEqual, 1.0),
        constraint(vec![0.0, 0.0, 1.0], Operator::LessEqual, 1.0),
    ];
    let objective = Objective::maximize(vec![1.0, 1.0, 1.0]).expect("Objective is valid");
    let mut tableau = build_tableau(&constraints, &objective, None)
        .expect("Build should not fail");

    assert_eq!(tableau.solve(Some(1)).expect("Solve should not fail"), Status::NotSolved);
    assert!(tableau.has_canonical_basis(1.0e-12));
    assert_eq!(tableau.solve(Some(2)).expect("Solve should not fail"), Status::Solved);
    assert_abs_diff_eq!(tableau.read_solution().objective_value, 3.0, epsilon = 1.0e-12);
}

#[test]
fn problem_routes_through_phase_one() {
    let mut problem = Problem::new(Objective::minimize(vec![1.0, 1.0]).expect("Valid"));
    problem.add_constraint(constraint(vec![1.0, 2.0], Operator::GreaterEqual, 4.0));
    problem.add_constraint(constraint(vec![3.0, 1.0], Operator::GreaterEqual, 6.0));
    problem.set_variable_name(0, "wheat");
    problem.set_variable_name(1, "corn");

    let (status, tableau) = problem.solve(&SolverOptions::default())
        .expect("Solve should not fail");
    assert_eq!(status, Status::Solved);
    let solution = tableau.read_solution();
    // Vertex of x1 + 2x2 = 4 and 3x1 + x2 = 6.
    assert_abs_diff_eq!(solution.objective_value, 2.8, epsilon = 1.0e-9);
    assert_abs_diff_eq!(solution.value("wheat").expect("wheat is basic"), 1.6, epsilon = 1.0e-9);
    assert_abs_diff_eq!(solution.value("corn").expect("corn is basic"), 1.2, epsilon = 1.0e-9);
}

#[test]
fn raw_tableau_round_trip() {
    let mut tableau = Tableau::new(2, 2, 2).expect("Dimensions are valid");
    tableau.set_variable_names(&[Some("a"), Some("b")]).expect("Two names fit");
    tableau.load_matrix(&[
        vec![1.0, 1.0, 1.0, 0.0, 4.0],
        vec![1.0, 3.0, 0.0, 1.0, 6.0],
        vec![-3.0, -2.0, 0.0, 0.0, 0.0],
    ]).expect("Matrix covers the tableau");

    assert_eq!(tableau.solve(None).expect("Solve should not fail"), Status::Solved);
    let solution = tableau.read_solution();
    assert_abs_diff_eq!(solution.objective_value, 12.0, epsilon = 1.0e-9);
    assert_eq!(solution.structural[0].name, "a");
    assert_abs_diff_eq!(solution.structural[0].value, 4.0, epsilon = 1.0e-9);
}

#[test]
fn malformed_input_is_rejected() {
    let mut tableau = Tableau::new(2, 2, 2).expect("Dimensions are valid");
    match tableau.load_matrix(&[vec![0.0; 5], vec![0.0; 5]]) {
        Err(Error::DimensionMismatch { .. }) => {},
        other => panic!("Expected dimension mismatch, got {:?}", other),
    }
    match tableau.solve(Some(0)) {
        Err(Error::InvalidConfiguration(_)) => {},
        other => panic!("Expected invalid configuration, got {:?}", other),
    }
    assert!(Objective::minimize(vec![]).is_err());
}

#[test]
fn tableau_can_move_between_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Tableau>();
}
