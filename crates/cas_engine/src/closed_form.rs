//! Closed-form solvers: quadratics, cubics and products over roots of unity.
//!
//! All sign decisions go through the structural sign predicates
//! (always positive, always non-negative, always negative); when a sign
//! cannot be decided the solver reports `None` and the caller keeps the
//! polynomial as is.

use crate::polynomial::Polynomial;
use cas_ast::Expr;
use cas_math::{
    is_always_negative, is_always_non_negative, is_always_non_positive, sign_of, simplify, Sign,
};
use num_bigint::BigInt;
use num_rational::BigRational;
use std::rc::Rc;

/// `(factor, multiplicity)` pairs.
pub type RealFactors = Vec<(Polynomial, u32)>;

fn half(e: Rc<Expr>) -> Rc<Expr> {
    Expr::div(e, Expr::num(2))
}

/// `cos(2*pi*t/n)`
fn cos_of_turn(t: u64, n: u64) -> Rc<Expr> {
    let q = BigRational::new(BigInt::from(2 * t), BigInt::from(n));
    simplify(&Expr::cos(Expr::mul(Expr::number(q), Expr::pi())))
}

/// Real cube root with the sign of `e`, when that sign is known.
fn real_cbrt(e: &Rc<Expr>) -> Option<Rc<Expr>> {
    let third = Expr::rational(1, 3);
    if is_zero(e) {
        Some(Expr::zero())
    } else if is_always_non_negative(e) {
        Some(simplify(&Expr::pow(e.clone(), third)))
    } else if is_always_non_positive(e) {
        Some(simplify(&Expr::neg(Expr::pow(Expr::neg(e.clone()), third))))
    } else {
        None
    }
}

fn is_zero(e: &Rc<Expr>) -> bool {
    sign_of(e) == Some(Sign::Zero)
}

// =============================================================================
// Roots of unity
// =============================================================================

/// Real factors of `Π (var - radius * w^t)` over `w = exp(2*pi*i/n)` and the
/// `t in 0..n` accepted by `include`. `include` must be closed under
/// `t -> n - t` so conjugate roots fold into real quadratics.
pub fn unit_circle_factors(
    var: &str,
    n: u64,
    radius: &Rc<Expr>,
    include: impl Fn(u64) -> bool,
) -> Vec<Polynomial> {
    let mut out = Vec::new();
    let r_squared = Expr::powi(radius.clone(), 2);
    for t in 0..n {
        if !include(t) {
            continue;
        }
        if t == 0 {
            out.push(Polynomial::linear(radius.clone(), var));
        } else if 2 * t == n {
            out.push(Polynomial::linear(Expr::neg(radius.clone()), var));
        } else if 2 * t < n {
            // x^2 - 2 r cos(2 pi t / n) x + r^2
            let middle = Expr::mul(
                Expr::mul(Expr::num(-2), radius.clone()),
                cos_of_turn(t, n),
            );
            out.push(Polynomial::new(
                vec![r_squared.clone(), middle, Expr::one()],
                var,
            ));
        }
    }
    out
}

/// Factors of `var^n - a`.
///
/// Needs `a >= 0` or `a <= 0` to be provable, except for odd `n` where the
/// real n-th root of `a` exists whatever its sign. `None` otherwise.
pub fn cyclic_factors(var: &str, n: u64, a: &Rc<Expr>) -> Option<Vec<Polynomial>> {
    let exponent = Expr::rational(1, n as i64);
    if is_zero(a) {
        return Some(vec![Polynomial::monomial(Expr::one(), 1, var); n as usize]);
    }
    let odd = n % 2 == 1;
    if is_always_non_negative(a) || (odd && !is_always_negative(a)) {
        let radius = simplify(&Expr::pow(a.clone(), exponent));
        Some(unit_circle_factors(var, n, &radius, |_| true))
    } else if is_always_non_positive(a) {
        // roots are r * exp(i*pi*(2s+1)/n)
        let radius = simplify(&Expr::pow(Expr::neg(a.clone()), exponent));
        Some(unit_circle_factors(var, 2 * n, &radius, |t| t % 2 == 1))
    } else {
        None
    }
}

/// Factors of `1 + y + ... + y^(k-1)` with `y = var^m`.
pub fn periodic_connector(var: &str, m: u64, k: u64) -> Vec<Polynomial> {
    unit_circle_factors(var, k * m, &Expr::one(), |t| t % k != 0)
}

/// Factors of `1 - y + y^2 - ... ± y^(k-1)` with `y = var^m`.
pub fn antiperiodic_connector(var: &str, m: u64, k: u64) -> Vec<Polynomial> {
    unit_circle_factors(var, 2 * k * m, &Expr::one(), |t| {
        (t + k) % 2 == 0 && !(t % k == 0 && (t / k) % 2 == 1)
    })
}

// =============================================================================
// Quadratic
// =============================================================================

/// Real factorization of the monic quadratic `var^2 + b var + c`.
///
/// A discriminant that is only known to be non-negative still gives the
/// real pair. `None` when it is negative (irreducible) or undecided.
pub fn solve_quadratic(var: &str, b: &Rc<Expr>, c: &Rc<Expr>) -> Option<RealFactors> {
    let disc = simplify(&Expr::sub(
        Expr::powi(b.clone(), 2),
        Expr::mul(Expr::num(4), c.clone()),
    ));
    let minus_b = Expr::neg(b.clone());
    if is_zero(&disc) {
        return Some(vec![(Polynomial::linear(half(minus_b), var), 2)]);
    }
    if !is_always_non_negative(&disc) {
        return None;
    }
    let root = Expr::sqrt(disc);
    let r1 = half(Expr::sub(minus_b.clone(), root.clone()));
    let r2 = half(Expr::add(minus_b, root));
    Some(vec![
        (Polynomial::linear(r1, var), 1),
        (Polynomial::linear(r2, var), 1),
    ])
}

// =============================================================================
// Cubic
// =============================================================================

/// Real factorization of the monic cubic `var^3 + a var^2 + b var + c`.
pub fn solve_cubic(var: &str, a: &Rc<Expr>, b: &Rc<Expr>, c: &Rc<Expr>) -> Option<RealFactors> {
    // x = z - a/3  =>  z^3 + p z + q
    let shift = simplify(&Expr::div(a.clone(), Expr::num(3)));
    let p = simplify(&Expr::sub(
        b.clone(),
        Expr::div(Expr::powi(a.clone(), 2), Expr::num(3)),
    ));
    let q = simplify(&Expr::sum_of([
        Expr::div(Expr::mul(Expr::num(2), Expr::powi(a.clone(), 3)), Expr::num(27)),
        Expr::neg(Expr::div(Expr::mul(a.clone(), b.clone()), Expr::num(3))),
        c.clone(),
    ]));
    let disc = simplify(&Expr::add(
        Expr::div(Expr::powi(q.clone(), 2), Expr::num(4)),
        Expr::div(Expr::powi(p.clone(), 3), Expr::num(27)),
    ));
    let unshift = |z: Rc<Expr>| simplify(&Expr::sub(z, shift.clone()));

    if is_zero(&disc) {
        if p.is_zero() {
            return Some(vec![(Polynomial::linear(Expr::neg(shift.clone()), var), 3)]);
        }
        // simple root 3q/p, double root -3q/(2p)
        let simple = Expr::div(Expr::mul(Expr::num(3), q.clone()), p.clone());
        let double = Expr::div(Expr::mul(Expr::num(-3), q), Expr::mul(Expr::num(2), p));
        return Some(vec![
            (Polynomial::linear(unshift(double), var), 2),
            (Polynomial::linear(unshift(simple), var), 1),
        ]);
    }

    if is_always_non_negative(&disc) {
        // one real root, complex pair folded into a quadratic
        let minus_half_q = half(Expr::neg(q.clone()));
        let root_disc = Expr::sqrt(disc);
        let u = real_cbrt(&simplify(&Expr::add(minus_half_q.clone(), root_disc.clone())))?;
        let v = real_cbrt(&simplify(&Expr::sub(minus_half_q, root_disc)))?;
        let r = unshift(Expr::add(u, v));
        // (x - r)(x^2 + s x + t) with s = a + r, t = b + r s
        let s = simplify(&Expr::add(a.clone(), r.clone()));
        let t = simplify(&Expr::add(b.clone(), Expr::mul(r.clone(), s.clone())));
        return Some(vec![
            (Polynomial::linear(r, var), 1),
            (Polynomial::new(vec![t, s, Expr::one()], var), 1),
        ]);
    }
    if !is_always_negative(&disc) {
        return None;
    }

    // three real roots: 2 sqrt(-p/3) cos(theta/3 - 2 pi k / 3)
    let amplitude = Expr::mul(
        Expr::num(2),
        Expr::sqrt(Expr::div(Expr::neg(p.clone()), Expr::num(3))),
    );
    let cos_arg = Expr::mul(
        Expr::div(Expr::mul(Expr::num(3), q), Expr::mul(Expr::num(2), p.clone())),
        Expr::sqrt(Expr::div(Expr::num(-3), p)),
    );
    let theta = Expr::func("arccos", vec![simplify(&cos_arg)]);
    let roots = (0..3).map(|k| {
        let angle = Expr::sub(
            Expr::div(theta.clone(), Expr::num(3)),
            Expr::mul(Expr::rational(2 * k, 3), Expr::pi()),
        );
        unshift(Expr::mul(amplitude.clone(), Expr::cos(angle)))
    });
    Some(roots.map(|r| (Polynomial::linear(r, var), 1)).collect())
}
