// Clippy allows for patterns that are difficult to refactor safely
#![allow(clippy::needless_range_loop)] // Dense coefficient loops index several vectors

//! Univariate polynomial algebra over exact symbolic coefficients.
//!
//! The expression-level entry points below take an expression and a variable
//! name; the coefficient-level ones work on [`Polynomial`] directly.

pub mod budget;
pub mod closed_form;
pub mod coefficients;
pub mod error;
pub mod factor;
pub mod polynomial;
pub mod structure;

pub use budget::{AbortFlag, PolyBudget};
pub use coefficients::{expression_from_coefficients, get_coefficients};
pub use error::CasError;
pub use factor::{
    decompose_into_irreducible_factors, factor, factorize, try_decompose, Decomposition,
    Factorization,
};
pub use polynomial::Polynomial;
pub use structure::{antiperiod_of, degree, gcd_of_exponents, is_polynomial, order, period_of};

use cas_ast::Expr;
use std::rc::Rc;

// =============================================================================
// Coefficient-sequence arithmetic
// =============================================================================

pub fn polynomial_add(a: &Polynomial, b: &Polynomial) -> Polynomial {
    a.add(b)
}

pub fn polynomial_sub(a: &Polynomial, b: &Polynomial) -> Polynomial {
    a.sub(b)
}

pub fn polynomial_mul(a: &Polynomial, b: &Polynomial) -> Polynomial {
    a.mul(b)
}

/// `(quotient, remainder)` with `numerator = quotient * denominator + remainder`.
pub fn polynomial_divide(
    numerator: &Polynomial,
    denominator: &Polynomial,
) -> Result<(Polynomial, Polynomial), CasError> {
    numerator.div_rem(denominator)
}

/// Monic gcd; if either side is zero the other is returned unmodified.
pub fn gcd(a: &Polynomial, b: &Polynomial) -> Result<Polynomial, CasError> {
    a.gcd(b)
}

/// Bézout coefficients `(u, v)` with `u*a + v*b = gcd(a, b)`.
pub fn extended_gcd(a: &Polynomial, b: &Polynomial) -> Result<(Polynomial, Polynomial), CasError> {
    a.extended_gcd(b)
}

pub fn resultant(a: &Polynomial, b: &Polynomial) -> Result<Rc<Expr>, CasError> {
    a.resultant(b)
}

// =============================================================================
// Expression-level arithmetic
// =============================================================================

fn coefficients_of(expr: &Expr, var: &str, budget: &PolyBudget) -> Result<Polynomial, CasError> {
    get_coefficients(expr, var, budget)?
        .ok_or_else(|| CasError::PolynomialError(format!("{} is not a polynomial in {}", expr, var)))
}

/// Quotient and remainder of two polynomial expressions in `var`.
pub fn divide_expressions(
    numerator: &Expr,
    denominator: &Expr,
    var: &str,
    budget: &PolyBudget,
) -> Result<(Rc<Expr>, Rc<Expr>), CasError> {
    let n = coefficients_of(numerator, var, budget)?;
    let d = coefficients_of(denominator, var, budget)?;
    let (q, r) = n.div_rem(&d)?;
    Ok((q.to_expr(), r.to_expr()))
}

/// Monic gcd of two polynomial expressions in `var`.
pub fn gcd_expressions(
    a: &Expr,
    b: &Expr,
    var: &str,
    budget: &PolyBudget,
) -> Result<Rc<Expr>, CasError> {
    let pa = coefficients_of(a, var, budget)?;
    let pb = coefficients_of(b, var, budget)?;
    Ok(pa.gcd(&pb)?.to_expr())
}
