//! Structure analysis: polynomial membership, degree/order bounds,
//! coefficient periodicity and exponent gcd.

use cas_ast::Expr;
use cas_math::{are_equivalent, rational_value};
use num_integer::Integer;
use num_traits::{Signed, ToPrimitive};
use std::rc::Rc;

/// Non-negative integer value of an exponent expression.
fn natural_exponent(e: &Expr) -> Option<i64> {
    let v = rational_value(e)?;
    if v.is_integer() && !v.is_negative() {
        v.to_integer().to_i64()
    } else {
        None
    }
}

/// True if `expr` is built from `var`, var-free subterms, `+ - *`, division by
/// var-free denominators and non-negative integer powers.
pub fn is_polynomial(expr: &Expr, var: &str) -> bool {
    if !expr.contains_var(var) {
        return true;
    }
    match expr {
        Expr::Variable(_) => true,
        Expr::Add(l, r) | Expr::Sub(l, r) | Expr::Mul(l, r) => {
            is_polynomial(l, var) && is_polynomial(r, var)
        }
        Expr::Neg(e) => is_polynomial(e, var),
        Expr::Div(l, r) => !r.contains_var(var) && is_polynomial(l, var),
        Expr::Pow(b, e) => {
            !e.contains_var(var) && natural_exponent(e).is_some() && is_polynomial(b, var)
        }
        _ => false,
    }
}

/// Upper bound on the degree in `var`, or -1 if `expr` is not a polynomial.
pub fn degree(expr: &Expr, var: &str) -> i64 {
    if !is_polynomial(expr, var) {
        return -1;
    }
    bound(expr, var, i64::max)
}

/// Lower bound on the order (lowest power) in `var`, or -1 if `expr` is not
/// a polynomial.
pub fn order(expr: &Expr, var: &str) -> i64 {
    if !is_polynomial(expr, var) {
        return -1;
    }
    bound(expr, var, i64::min)
}

fn bound(expr: &Expr, var: &str, pick: fn(i64, i64) -> i64) -> i64 {
    if !expr.contains_var(var) {
        return 0;
    }
    match expr {
        Expr::Variable(_) => 1,
        Expr::Add(l, r) | Expr::Sub(l, r) => pick(bound(l, var, pick), bound(r, var, pick)),
        Expr::Mul(l, r) => bound(l, var, pick) + bound(r, var, pick),
        Expr::Neg(e) | Expr::Div(e, _) => bound(e, var, pick),
        Expr::Pow(b, e) => bound(b, var, pick).saturating_mul(natural_exponent(e).unwrap_or(0)),
        _ => 0,
    }
}

/// Smallest block length `m < len` such that the coefficients, zero-padded to
/// a multiple of `m`, repeat their first `m` entries. `len` if none.
pub fn period_of(coeffs: &[Rc<Expr>]) -> usize {
    smallest_block(coeffs, false)
}

/// Like [`period_of`] but every other block is negated.
pub fn antiperiod_of(coeffs: &[Rc<Expr>]) -> usize {
    smallest_block(coeffs, true)
}

fn smallest_block(coeffs: &[Rc<Expr>], alternate: bool) -> usize {
    let len = coeffs.len();
    'blocks: for m in 1..len {
        let padded = len.div_ceil(m) * m;
        for i in m..padded {
            let reference = &coeffs[i % m];
            let ok = match coeffs.get(i) {
                None => reference.is_zero(),
                Some(c) if alternate && (i / m).is_odd() => {
                    are_equivalent(c, &Expr::neg(reference.clone()))
                }
                Some(c) => are_equivalent(c, reference),
            };
            if !ok {
                continue 'blocks;
            }
        }
        return m;
    }
    len
}

/// Gcd of the indices of non-zero coefficients above index 0
/// (0 when there are none).
pub fn gcd_of_exponents(coeffs: &[Rc<Expr>]) -> usize {
    coeffs
        .iter()
        .enumerate()
        .skip(1)
        .filter(|(_, c)| !c.is_zero())
        .fold(0, |acc, (i, _)| acc.gcd(&i))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x() -> Rc<Expr> {
        Expr::var("x")
    }

    fn nums(values: &[i64]) -> Vec<Rc<Expr>> {
        values.iter().map(|&v| Expr::num(v)).collect()
    }

    #[test]
    fn membership() {
        let e = Expr::div(Expr::powi(Expr::add(x(), Expr::num(1)), 3), Expr::var("a"));
        assert!(is_polynomial(&e, "x"));
        assert!(!is_polynomial(&Expr::div(Expr::one(), x()), "x"));
        assert!(!is_polynomial(&Expr::pow(x(), Expr::rational(1, 2)), "x"));
        assert!(!is_polynomial(&Expr::cos(x()), "x"));
        assert!(is_polynomial(&Expr::cos(Expr::var("y")), "x"));
    }

    #[test]
    fn degree_and_order() {
        // x^2 * (x + 1)^3 - 4x^2
        let e = Expr::sub(
            Expr::mul(Expr::powi(x(), 2), Expr::powi(Expr::add(x(), Expr::num(1)), 3)),
            Expr::mul(Expr::num(4), Expr::powi(x(), 2)),
        );
        assert_eq!(degree(&e, "x"), 5);
        assert_eq!(order(&e, "x"), 2);
        assert_eq!(degree(&Expr::num(7), "x"), 0);
        assert_eq!(degree(&Expr::sqrt(x()), "x"), -1);
        assert_eq!(order(&Expr::sqrt(x()), "x"), -1);
    }

    #[test]
    fn periodic_blocks() {
        assert_eq!(period_of(&nums(&[1, 0, 0, 1, 0, 0, 1])), 3);
        assert_eq!(period_of(&nums(&[2, 2, 2])), 1);
        assert_eq!(period_of(&nums(&[1, 2, 3])), 3);
        assert_eq!(period_of(&nums(&[1, 2, 1, 2])), 2);
    }

    #[test]
    fn antiperiodic_blocks() {
        assert_eq!(antiperiod_of(&nums(&[1, -1, 1, -1])), 1);
        assert_eq!(antiperiod_of(&nums(&[1, 2, -1, -2])), 2);
        assert_eq!(antiperiod_of(&nums(&[1, 2, 1, 2])), 4);
    }

    #[test]
    fn exponent_gcd() {
        assert_eq!(gcd_of_exponents(&nums(&[1, 0, 0, 1, 0, 0, 1])), 3);
        assert_eq!(gcd_of_exponents(&nums(&[1, 0, 2, 0, 4])), 2);
        assert_eq!(gcd_of_exponents(&nums(&[5])), 0);
    }
}
