//! Structural expression predicates used by the polynomial engine.
//!
//! Sign predicates are exact and conservative: `None` / `false` means
//! "could not be decided from structure", never "numerically unclear".

use crate::normal_form::{Monomial, NormalForm, Normalizer};
use cas_ast::Expr;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{Signed, Zero};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    Negative,
    Zero,
    Positive,
}

impl Sign {
    pub fn of(value: &BigRational) -> Sign {
        if value.is_zero() {
            Sign::Zero
        } else if value.is_positive() {
            Sign::Positive
        } else {
            Sign::Negative
        }
    }

    fn flip(self) -> Sign {
        match self {
            Sign::Negative => Sign::Positive,
            Sign::Zero => Sign::Zero,
            Sign::Positive => Sign::Negative,
        }
    }

    fn times(self, other: Sign) -> Sign {
        match (self, other) {
            (Sign::Zero, _) | (_, Sign::Zero) => Sign::Zero,
            (a, b) if a == b => Sign::Positive,
            _ => Sign::Negative,
        }
    }
}

/// Check if an exponent represents an even root (`p/q` with even `q`).
pub fn is_even_root_exponent(n: &BigRational) -> bool {
    n.denom().is_even()
}

/// The exact rational value of `expr`, if it has one.
pub fn rational_value(expr: &Expr) -> Option<BigRational> {
    Normalizer::default().from_expr(expr).as_rational()
}

pub fn is_rational_constant(expr: &Expr) -> bool {
    rational_value(expr).is_some()
}

pub fn is_integer_constant(expr: &Expr) -> bool {
    rational_value(expr).is_some_and(|v| v.is_integer())
}

/// What structure alone proves about a sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bound {
    Exact(Sign),
    NonNegative,
    NonPositive,
}

impl Bound {
    fn negate(self) -> Bound {
        match self {
            Bound::Exact(s) => Bound::Exact(s.flip()),
            Bound::NonNegative => Bound::NonPositive,
            Bound::NonPositive => Bound::NonNegative,
        }
    }

    fn times(self, other: Bound) -> Bound {
        match (self, other) {
            (Bound::Exact(Sign::Zero), _) | (_, Bound::Exact(Sign::Zero)) => Bound::Exact(Sign::Zero),
            (Bound::Exact(a), Bound::Exact(b)) => Bound::Exact(a.times(b)),
            (Bound::Exact(Sign::Positive), b) | (b, Bound::Exact(Sign::Positive)) => b,
            (Bound::Exact(Sign::Negative), b) | (b, Bound::Exact(Sign::Negative)) => b.negate(),
            (a, b) if a == b => Bound::NonNegative,
            _ => Bound::NonPositive,
        }
    }

    fn is_non_negative(self) -> bool {
        matches!(
            self,
            Bound::Exact(Sign::Positive | Sign::Zero) | Bound::NonNegative
        )
    }

    fn is_non_positive(self) -> bool {
        matches!(
            self,
            Bound::Exact(Sign::Negative | Sign::Zero) | Bound::NonPositive
        )
    }
}

fn bound_of(expr: &Expr) -> Option<Bound> {
    bound_of_form(&Normalizer::default().from_expr(expr))
}

/// Sign of `expr` when it can be decided structurally.
pub fn sign_of(expr: &Expr) -> Option<Sign> {
    match bound_of(expr)? {
        Bound::Exact(s) => Some(s),
        _ => None,
    }
}

pub fn is_always_positive(expr: &Expr) -> bool {
    sign_of(expr) == Some(Sign::Positive)
}

/// `expr >= 0` for every real value of its free symbols.
pub fn is_always_non_negative(expr: &Expr) -> bool {
    bound_of(expr).is_some_and(Bound::is_non_negative)
}

pub fn is_always_non_positive(expr: &Expr) -> bool {
    bound_of(expr).is_some_and(Bound::is_non_positive)
}

pub fn is_always_negative(expr: &Expr) -> bool {
    sign_of(expr) == Some(Sign::Negative)
}

fn bound_of_form(nf: &NormalForm) -> Option<Bound> {
    if let Some(v) = nf.as_rational() {
        return Some(Bound::Exact(Sign::of(&v)));
    }

    let bounds: Vec<Option<Bound>> = nf.terms().map(|(m, c)| term_bound(c, m)).collect();
    if let Some(b) = sum_bound(&bounds) {
        return Some(b);
    }

    if nf.len() == 2 {
        return sign_of_rational_plus_radical(nf).map(Bound::Exact);
    }
    None
}

/// A sum of non-negative terms is non-negative, and positive as soon as one
/// term is; likewise on the negative side.
fn sum_bound(bounds: &[Option<Bound>]) -> Option<Bound> {
    let all = |pred: fn(Bound) -> bool| bounds.iter().all(|b| b.is_some_and(pred));
    let any_exact = |s: Sign| bounds.iter().any(|b| *b == Some(Bound::Exact(s)));
    if all(Bound::is_non_negative) {
        return Some(if any_exact(Sign::Positive) {
            Bound::Exact(Sign::Positive)
        } else {
            Bound::NonNegative
        });
    }
    if all(Bound::is_non_positive) {
        return Some(if any_exact(Sign::Negative) {
            Bound::Exact(Sign::Negative)
        } else {
            Bound::NonPositive
        });
    }
    None
}

/// `a + t` with rational `a` and `t^2` rational: compare `a^2` with `t^2`.
fn sign_of_rational_plus_radical(nf: &NormalForm) -> Option<Sign> {
    let mut terms = nf.terms();
    let (m0, c0) = terms.next()?;
    let (m1, c1) = terms.next()?;
    let (a, (tm, tc)) = if m0.is_empty() {
        (c0, (m1, c1))
    } else if m1.is_empty() {
        (c1, (m0, c0))
    } else {
        return None;
    };

    let Bound::Exact(t_sign) = term_bound(tc, tm)? else {
        return None;
    };
    let a_sign = Sign::of(a);
    if a_sign == t_sign {
        return Some(a_sign);
    }

    let n = Normalizer::default();
    let t = NormalForm::from_term(tc.clone(), tm.clone());
    let t_squared = n.pow_int(&t, 2).as_rational()?;
    match (a * a).cmp(&t_squared) {
        Ordering::Greater => Some(a_sign),
        Ordering::Equal => Some(Sign::Zero),
        Ordering::Less => Some(t_sign),
    }
}

fn term_bound(coeff: &BigRational, mono: &Monomial) -> Option<Bound> {
    let mut bound = Bound::Exact(Sign::of(coeff));
    for (atom, exp) in mono {
        bound = bound.times(power_bound(&atom.0, exp)?);
    }
    Some(bound)
}

/// Bound of `atom^exp`. Even powers are non-negative whatever the base.
fn power_bound(atom: &Expr, exp: &BigRational) -> Option<Bound> {
    let even_power = !is_even_root_exponent(exp) && exp.numer().is_even();
    match atom_bound(atom) {
        Some(Bound::Exact(Sign::Positive)) => Some(Bound::Exact(Sign::Positive)),
        Some(Bound::Exact(Sign::Zero)) => None,
        Some(Bound::Exact(Sign::Negative)) => {
            if is_even_root_exponent(exp) {
                None
            } else if even_power {
                Some(Bound::Exact(Sign::Positive))
            } else {
                Some(Bound::Exact(Sign::Negative))
            }
        }
        Some(Bound::NonNegative) => Some(Bound::NonNegative),
        Some(Bound::NonPositive) if !is_even_root_exponent(exp) => Some(if even_power {
            Bound::NonNegative
        } else {
            Bound::NonPositive
        }),
        _ if even_power => Some(Bound::NonNegative),
        _ => None,
    }
}

fn atom_bound(atom: &Expr) -> Option<Bound> {
    match atom {
        Expr::Number(n) => Some(Bound::Exact(Sign::of(n))),
        Expr::Constant(_) => Some(Bound::Exact(Sign::Positive)),
        // canonical residual cosines have their angle in (0, pi/2)
        Expr::Function(name, args) if name == "cos" && args.len() == 1 => {
            crate::normal_form::pi_multiple(&Normalizer::default().from_expr(&args[0])).and_then(
                |q| {
                    let quarter_turn = BigRational::new(1.into(), 2.into());
                    if q.is_positive() && q < quarter_turn {
                        Some(Bound::Exact(Sign::Positive))
                    } else {
                        None
                    }
                },
            )
        }
        Expr::Add(_, _) | Expr::Sub(_, _) => bound_of(atom),
        Expr::Neg(inner) => atom_bound(inner).map(Bound::negate),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    fn sqrt(n: i64) -> Rc<Expr> {
        Expr::sqrt(Expr::num(n))
    }

    #[test]
    fn rational_classification() {
        assert!(is_rational_constant(&Expr::div(Expr::num(3), Expr::num(4))));
        assert!(!is_integer_constant(&Expr::rational(3, 4)));
        assert!(is_integer_constant(&Expr::mul(sqrt(2), sqrt(8))));
        assert!(!is_rational_constant(&sqrt(2)));
        assert!(!is_rational_constant(&Expr::var("x")));
    }

    #[test]
    fn radical_sums() {
        // 3 - 2*sqrt(2) > 0 since 9 > 8
        let e = Expr::sub(Expr::num(3), Expr::mul(Expr::num(2), sqrt(2)));
        assert!(is_always_positive(&e));
        // 1 - sqrt(2) < 0
        let e = Expr::sub(Expr::num(1), sqrt(2));
        assert!(is_always_negative(&e));
        // 2 - sqrt(4) == 0
        let e = Expr::sub(Expr::num(2), sqrt(4));
        assert!(is_always_non_negative(&e));
        assert!(!is_always_positive(&e));
    }

    #[test]
    fn constants_and_cosines() {
        assert!(is_always_positive(&Expr::add(Expr::pi(), sqrt(3))));
        let c = Expr::cos(Expr::mul(Expr::rational(2, 9), Expr::pi()));
        assert!(is_always_positive(&c));
        let c = Expr::cos(Expr::mul(Expr::rational(8, 9), Expr::pi()));
        assert!(is_always_negative(&c));
    }

    #[test]
    fn variables_are_undecided() {
        let x = Expr::var("x");
        assert_eq!(sign_of(&x), None);
        assert!(!is_always_non_negative(&x));
        assert!(!is_always_non_negative(&Expr::powi(x.clone(), 3)));
        // x^2 - 1 changes sign
        assert!(!is_always_non_negative(&Expr::sub(Expr::powi(x, 2), Expr::one())));
    }

    #[test]
    fn even_powers_are_non_negative() {
        let a = Expr::var("a");
        let a2 = Expr::powi(a.clone(), 2);
        assert_eq!(sign_of(&a2), None);
        assert!(is_always_non_negative(&a2));
        assert!(!is_always_positive(&a2));
        assert!(is_always_non_positive(&Expr::neg(a2.clone())));

        // 4a^2 + a^4 stays non-negative, 1 + 4a^2 is strictly positive
        let sum = Expr::add(Expr::mul(Expr::num(4), a2.clone()), Expr::powi(a.clone(), 4));
        assert!(is_always_non_negative(&sum));
        let shifted = Expr::add(Expr::one(), Expr::mul(Expr::num(4), a2.clone()));
        assert!(is_always_positive(&shifted));
        assert!(is_always_negative(&Expr::neg(shifted)));

        // products of non-negatives, and a^2 * b^2
        let b2 = Expr::powi(Expr::var("b"), 2);
        assert!(is_always_non_negative(&Expr::mul(a2.clone(), b2.clone())));
        // sqrt(a^2 + b^2) + 1 > 0
        let root = Expr::sqrt(Expr::add(a2, b2));
        assert!(is_always_non_negative(&root));
        assert!(is_always_positive(&Expr::add(root, Expr::one())));
    }
}
