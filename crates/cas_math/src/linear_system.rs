//! Exact linear systems over the rationals.
//!
//! Two ways in:
//!
//! - [`LinearSystem::from_equations`]: symbolic equations understood as
//!   `expr = 0`, each linear in the named unknowns with rational
//!   coefficients. This is the public interface for callers holding
//!   expressions; the polynomial engine does not go through it.
//! - [`LinearSystem::from_matrix`]: a coefficient matrix and right-hand side.
//!   The engine's Kronecker split builds its Vandermonde interpolation
//!   systems this way, since every entry is already a rational.
//!
//! Both are solved with Gauss-Jordan elimination on the augmented matrix.

use crate::normal_form::{term_to_expr, Normalizer};
use cas_ast::Expr;
use num_rational::BigRational;
use num_traits::{One, Zero};
use std::rc::Rc;
use thiserror::Error;

/// Errors from [`LinearSystem`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SolveError {
    #[error("equation is not linear in the unknowns: {0}")]
    NonLinear(String),

    #[error("system is inconsistent")]
    Inconsistent,

    #[error("system is under-determined: rank {rank} for {unknowns} unknowns")]
    Underdetermined { rank: usize, unknowns: usize },

    /// Augmented rows do not match the number of unknowns
    #[error("malformed system: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone)]
pub struct LinearSystem {
    unknowns: Vec<String>,
    /// Augmented rows: `a_0 .. a_{n-1} | b`.
    rows: Vec<Vec<BigRational>>,
}

impl LinearSystem {
    /// Build from symbolic equations `lhs = 0`.
    pub fn from_equations(equations: &[Rc<Expr>], unknowns: &[&str]) -> Result<Self, SolveError> {
        let normalizer = Normalizer::default();
        let n = unknowns.len();
        let mut rows = Vec::with_capacity(equations.len());

        for eq in equations {
            let mut row = vec![BigRational::zero(); n + 1];
            for (mono, coeff) in normalizer.from_expr(eq).terms() {
                if mono.is_empty() {
                    row[n] -= coeff;
                    continue;
                }
                let index = match (mono.len(), mono.iter().next()) {
                    (1, Some((atom, exp))) if exp.is_one() => match &*atom.0 {
                        Expr::Variable(name) => unknowns.iter().position(|u| *u == name.as_str()),
                        _ => None,
                    },
                    _ => None,
                };
                match index {
                    Some(i) => row[i] += coeff,
                    None => return Err(SolveError::NonLinear(term_to_expr(coeff, mono).to_string())),
                }
            }
            rows.push(row);
        }

        Ok(LinearSystem {
            unknowns: unknowns.iter().map(|u| u.to_string()).collect(),
            rows,
        })
    }

    /// Build from a coefficient matrix and right-hand side.
    pub fn from_matrix(matrix: Vec<Vec<BigRational>>, rhs: Vec<BigRational>) -> Result<Self, SolveError> {
        if matrix.len() != rhs.len() {
            return Err(SolveError::Malformed(format!(
                "{} rows but {} right-hand sides",
                matrix.len(),
                rhs.len()
            )));
        }
        let n = matrix.first().map_or(0, Vec::len);
        let mut rows = Vec::with_capacity(matrix.len());
        for (mut row, b) in matrix.into_iter().zip(rhs) {
            if row.len() != n {
                return Err(SolveError::Malformed(format!("row of length {} (expected {})", row.len(), n)));
            }
            row.push(b);
            rows.push(row);
        }
        Ok(LinearSystem {
            unknowns: (0..n).map(|i| format!("c{}", i)).collect(),
            rows,
        })
    }

    pub fn unknowns(&self) -> &[String] {
        &self.unknowns
    }

    /// Unique solution, in the order of the unknowns.
    pub fn solve(&self) -> Result<Vec<BigRational>, SolveError> {
        let n = self.unknowns.len();
        let mut a = self.rows.clone();
        let mut rank = 0;

        for col in 0..n {
            let Some(pivot) = (rank..a.len()).find(|&r| !a[r][col].is_zero()) else {
                continue;
            };
            a.swap(rank, pivot);

            let p = a[rank][col].clone();
            for v in a[rank].iter_mut().skip(col) {
                *v /= &p;
            }
            for r in 0..a.len() {
                if r == rank || a[r][col].is_zero() {
                    continue;
                }
                let factor = a[r][col].clone();
                for c in col..=n {
                    let delta = &factor * &a[rank][c];
                    a[r][c] -= delta;
                }
            }
            rank += 1;
        }

        if a.iter().skip(rank).any(|row| !row[n].is_zero()) {
            return Err(SolveError::Inconsistent);
        }
        if rank < n {
            return Err(SolveError::Underdetermined { rank, unknowns: n });
        }
        Ok(a.into_iter().take(n).map(|row| row[n].clone()).collect())
    }

    /// Solution paired with the unknown names.
    pub fn solve_named(&self) -> Result<Vec<(String, BigRational)>, SolveError> {
        let values = self.solve()?;
        Ok(self.unknowns.iter().cloned().zip(values).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;

    fn q(n: i64) -> BigRational {
        BigRational::from_integer(BigInt::from(n))
    }

    #[test]
    fn solves_two_by_two() {
        // x + y - 3 = 0, x - y - 1 = 0
        let x = Expr::var("x");
        let y = Expr::var("y");
        let eqs = vec![
            Expr::sub(Expr::add(x.clone(), y.clone()), Expr::num(3)),
            Expr::sub(Expr::sub(x, y), Expr::num(1)),
        ];
        let sys = LinearSystem::from_equations(&eqs, &["x", "y"]).unwrap();
        let sol = sys.solve_named().unwrap();
        assert_eq!(sol, vec![("x".to_string(), q(2)), ("y".to_string(), q(1))]);
    }

    #[test]
    fn fractional_solution() {
        // 2x - 1 = 0
        let eqs = vec![Expr::sub(Expr::mul(Expr::num(2), Expr::var("x")), Expr::one())];
        let sol = LinearSystem::from_equations(&eqs, &["x"]).unwrap().solve().unwrap();
        assert_eq!(sol, vec![BigRational::new(BigInt::from(1), BigInt::from(2))]);
    }

    #[test]
    fn rejects_nonlinear() {
        let eqs = vec![Expr::sub(Expr::powi(Expr::var("x"), 2), Expr::one())];
        let err = LinearSystem::from_equations(&eqs, &["x"]).unwrap_err();
        assert!(matches!(err, SolveError::NonLinear(_)));
    }

    #[test]
    fn detects_inconsistent_and_underdetermined() {
        let m = vec![vec![q(1), q(1)], vec![q(2), q(2)]];
        let sys = LinearSystem::from_matrix(m.clone(), vec![q(1), q(3)]).unwrap();
        assert_eq!(sys.solve(), Err(SolveError::Inconsistent));
        let sys = LinearSystem::from_matrix(m, vec![q(1), q(2)]).unwrap();
        assert_eq!(
            sys.solve(),
            Err(SolveError::Underdetermined { rank: 1, unknowns: 2 })
        );
    }

    #[test]
    fn vandermonde_interpolation() {
        // p(0)=1, p(1)=2, p(2)=5 -> p = 1 + 0x + x^2
        let m = vec![
            vec![q(1), q(0), q(0)],
            vec![q(1), q(1), q(1)],
            vec![q(1), q(2), q(4)],
        ];
        let sol = LinearSystem::from_matrix(m, vec![q(1), q(2), q(5)]).unwrap().solve().unwrap();
        assert_eq!(sol, vec![q(1), q(0), q(1)]);
    }

    #[test]
    fn equations_match_matrix_form() {
        // c0 + c1*t = v at t = 0, 1: the same interpolation written both ways
        let c0 = Expr::var("c0");
        let c1 = Expr::var("c1");
        let eqs = vec![
            Expr::sub(c0.clone(), Expr::num(3)),
            Expr::sub(Expr::add(c0, c1), Expr::num(5)),
        ];
        let symbolic = LinearSystem::from_equations(&eqs, &["c0", "c1"]).unwrap();
        let dense = LinearSystem::from_matrix(
            vec![vec![q(1), q(0)], vec![q(1), q(1)]],
            vec![q(3), q(5)],
        )
        .unwrap();
        assert_eq!(symbolic.unknowns(), dense.unknowns());
        assert_eq!(symbolic.solve_named(), dense.solve_named());
        assert_eq!(dense.solve().unwrap(), vec![q(3), q(2)]);
    }
}
