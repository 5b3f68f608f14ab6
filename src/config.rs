use crate::error::Error;

pub const DEFAULT_MAX_ITERATIONS: usize = 15;
pub const DEFAULT_TOLERANCE: f64 = 1.0e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverOptions {
    // Number of pivots a single solve may perform before giving up.
    pub max_iterations: usize,
    // Reduced costs above -tolerance count as non-negative, and pivot
    // column entries must exceed it to take part in the ratio test.
    pub tolerance: f64,
}

impl Default for SolverOptions {
    fn default() -> SolverOptions {
        SolverOptions {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl SolverOptions {
    pub fn new() -> SolverOptions {
        SolverOptions::default()
    }

    pub fn max_iterations(mut self, max_iterations: usize) -> SolverOptions {
        self.max_iterations = max_iterations;
        self
    }

    pub fn tolerance(mut self, tolerance: f64) -> SolverOptions {
        self.tolerance = tolerance;
        self
    }

    // None selects the default budget; an explicit zero is rejected
    // by validate().
    pub fn with_budget(max_iterations: Option<usize>) -> SolverOptions {
        match max_iterations {
            Some(n) => SolverOptions::default().max_iterations(n),
            None => SolverOptions::default(),
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.max_iterations == 0 {
            return Err(Error::InvalidConfiguration(
                "iteration budget must be positive".to_string()));
        }
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(Error::InvalidConfiguration(
                format!("tolerance must be finite and positive, got {}", self.tolerance)));
        }
        Ok(())
    }
}

#[test]
fn default_options() {
    let options = SolverOptions::default();
    assert_eq!(options.max_iterations, 15);
    assert_eq!(options.tolerance, 1.0e-9);
    assert!(options.validate().is_ok());
}

#[test]
fn budget_selection() {
    assert_eq!(SolverOptions::with_budget(None).max_iterations, 15);
    assert_eq!(SolverOptions::with_budget(Some(3)).max_iterations, 3);
    match SolverOptions::with_budget(Some(0)).validate() {
        Err(Error::InvalidConfiguration(_)) => {},
        other => panic!("Expected invalid configuration, got {:?}", other),
    }
}

#[test]
fn reject_bad_tolerance() {
    for &tol in [0.0, -1.0, f64::NAN, f64::INFINITY].iter() {
        let options = SolverOptions::new().tolerance(tol);
        assert!(options.validate().is_err());
    }
}
