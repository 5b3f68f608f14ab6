#![cfg(test)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::builder::{Constraint, Objective, Operator};

// Random dense problem: maximize c'x subject to Ax <= b, x >= 0.
// A has entries in [0.1, 1) so every variable is bounded, and b > 0 so
// the slack basis is feasible.
pub struct DenseProblem {
    pub a: Vec<Vec<f64>>,
    pub b: Vec<f64>,
    pub c: Vec<f64>,
}

impl DenseProblem {
    pub fn seeded(rows: usize, cols: usize, seed: u64) -> DenseProblem {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut a = Vec::new();
        for _ in 0..rows {
            let row: Vec<f64> = (0..cols).map(|_| rng.gen_range(0.1..1.0)).collect();
            a.push(row);
        }
        let b = (0..rows).map(|_| rng.gen_range(1.0..10.0)).collect();
        let c = (0..cols).map(|_| rng.gen_range(-1.0..2.0)).collect();
        DenseProblem { a: a, b: b, c: c }
    }

    pub fn objective(&self) -> Objective {
        Objective::maximize(self.c.clone())
            .expect("Generated objective is valid")
    }

    pub fn less_equal(&self) -> Vec<Constraint> {
        self.a.iter().zip(self.b.iter())
            .map(|(row, &b)| {
                Constraint::new(row.clone(), Operator::LessEqual, b)
                    .expect("Generated constraint is valid")
            })
            .collect()
    }

    // The same feasible region written as -Ax >= -b.
    pub fn greater_equal(&self) -> Vec<Constraint> {
        self.a.iter().zip(self.b.iter())
            .map(|(row, &b)| {
                let negated = row.iter().map(|v| -v).collect();
                Constraint::new(negated, Operator::GreaterEqual, -b)
                    .expect("Generated constraint is valid")
            })
            .collect()
    }

    pub fn is_feasible(&self, x: &[f64], tolerance: f64) -> bool {
        if x.iter().any(|&v| v < -tolerance) {
            return false;
        }
        self.a.iter().zip(self.b.iter()).all(|(row, &b)| {
            let lhs: f64 = row.iter().zip(x.iter()).map(|(a, x)| a * x).sum();
            lhs <= b + tolerance
        })
    }

    pub fn value(&self, x: &[f64]) -> f64 {
        self.c.iter().zip(x.iter()).map(|(c, x)| c * x).sum()
    }
}
