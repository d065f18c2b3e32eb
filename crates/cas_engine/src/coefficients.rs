//! Coefficient extraction: expression -> [`Polynomial`] in a given variable.

use crate::budget::PolyBudget;
use crate::error::CasError;
use crate::polynomial::Polynomial;
use crate::structure::{degree, is_polynomial};
use cas_ast::{Expr, ExprKey};
use cas_math::normal_form::{Monomial, NormalForm, Normalizer};
use num_traits::{Signed, ToPrimitive};
use std::rc::Rc;

/// Coefficients of `expr` in `var`.
///
/// `Ok(None)` if `expr` is not a polynomial in `var`; an error if its degree
/// exceeds `budget.max_degree`.
pub fn get_coefficients(
    expr: &Expr,
    var: &str,
    budget: &PolyBudget,
) -> Result<Option<Polynomial>, CasError> {
    if !is_polynomial(expr, var) {
        return Ok(None);
    }
    let bound = degree(expr, var);
    budget.check_degree(usize::try_from(bound).unwrap_or(usize::MAX))?;
    budget.check_abort()?;

    let expanded = Normalizer::new(budget.max_binomial_exponent).from_expr(expr);
    let key = ExprKey(Expr::var(var));
    let mut slots: Vec<NormalForm> = Vec::new();

    for (mono, coeff) in expanded.terms() {
        let mut rest: Monomial = mono.clone();
        let power = match rest.remove(&key) {
            None => 0,
            Some(e) if e.is_integer() && !e.is_negative() => e
                .to_integer()
                .to_usize()
                .ok_or_else(|| CasError::PolynomialError(format!("exponent {} out of range", e)))?,
            Some(e) => {
                return Err(CasError::PolynomialError(format!(
                    "non-integer power {} of {} after expansion",
                    e, var
                )))
            }
        };
        if rest.keys().any(|atom| atom.0.contains_var(var)) {
            return Err(CasError::PolynomialError(format!(
                "could not expand {} within the binomial exponent limit",
                expr
            )));
        }
        if slots.len() <= power {
            slots.resize(power + 1, NormalForm::zero());
        }
        slots[power].add_assign(&NormalForm::from_term(coeff.clone(), rest));
    }

    let coeffs: Vec<Rc<Expr>> = slots.iter().map(NormalForm::to_expr).collect();
    Ok(Some(Polynomial::new(coeffs, var)))
}

/// Inverse of [`get_coefficients`].
pub fn expression_from_coefficients(poly: &Polynomial) -> Rc<Expr> {
    poly.to_expr()
}
