use std::fmt;

// Terminal classification of a solve. These are outcomes of the
// algorithm, not failures; errors are reported through error::Error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    // No reduced cost in the objective row is negative.
    Solved,
    // The entering column has no positive entry in any constraint row.
    Unbounded,
    // The iteration budget ran out; solving again resumes from here.
    NotSolved,
    // Phase 1 ended with a positive sum of artificial variables.
    Infeasible,
}

impl Status {
    pub fn is_terminal(self) -> bool {
        match self {
            Status::NotSolved => false,
            _ => true,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let text = match *self {
            Status::Solved => "solved",
            Status::Unbounded => "unbounded",
            Status::NotSolved => "not solved",
            Status::Infeasible => "infeasible",
        };
        f.write_str(text)
    }
}

#[test]
fn terminal_statuses() {
    assert!(Status::Solved.is_terminal());
    assert!(Status::Unbounded.is_terminal());
    assert!(Status::Infeasible.is_terminal());
    assert!(!Status::NotSolved.is_terminal());
    assert_eq!(Status::NotSolved.to_string(), "not solved");
}
