use crate::error::CasError;
use cas_ast::Expr;
use cas_math::matrix::Matrix;
use cas_math::numeric::lcm_of_denominators;
use cas_math::{are_equivalent, is_rational_constant, rational_value, simplify};
use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use std::cmp::max;
use std::rc::Rc;

/// Dense univariate coefficient sequence: `coeffs[i]` is the coefficient of `var^i`.
///
/// Every coefficient is kept simplified and the highest entry is never zero,
/// so the zero polynomial is the empty sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Polynomial {
    pub coeffs: Vec<Rc<Expr>>,
    pub var: String,
}

impl Polynomial {
    pub fn new(coeffs: Vec<Rc<Expr>>, var: &str) -> Self {
        let mut poly = Polynomial {
            coeffs: coeffs.iter().map(|c| simplify(c)).collect(),
            var: var.to_string(),
        };
        poly.trim();
        poly
    }

    pub fn from_rationals(coeffs: &[BigRational], var: &str) -> Self {
        let mut poly = Polynomial {
            coeffs: coeffs.iter().map(|c| Expr::number(c.clone())).collect(),
            var: var.to_string(),
        };
        poly.trim();
        poly
    }

    pub fn from_integers(coeffs: &[i64], var: &str) -> Self {
        let coeffs: Vec<BigRational> = coeffs
            .iter()
            .map(|&c| BigRational::from_integer(BigInt::from(c)))
            .collect();
        Self::from_rationals(&coeffs, var)
    }

    pub fn zero(var: &str) -> Self {
        Polynomial {
            coeffs: vec![],
            var: var.to_string(),
        }
    }

    pub fn one(var: &str) -> Self {
        Self::constant(Expr::one(), var)
    }

    pub fn constant(c: Rc<Expr>, var: &str) -> Self {
        Self::new(vec![c], var)
    }

    /// `c * var^k`
    pub fn monomial(c: Rc<Expr>, k: usize, var: &str) -> Self {
        let mut coeffs = vec![Expr::zero(); k + 1];
        coeffs[k] = c;
        Self::new(coeffs, var)
    }

    /// `var - root`
    pub fn linear(root: Rc<Expr>, var: &str) -> Self {
        Self::new(vec![Expr::neg(root), Expr::one()], var)
    }

    fn trim(&mut self) {
        while let Some(c) = self.coeffs.last() {
            if c.is_zero() {
                self.coeffs.pop();
            } else {
                break;
            }
        }
    }

    pub fn is_zero(&self) -> bool {
        self.coeffs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.coeffs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coeffs.is_empty()
    }

    pub fn degree(&self) -> usize {
        // -infinity for the zero polynomial; callers check is_zero first
        self.coeffs.len().saturating_sub(1)
    }

    /// Coefficient of `var^i` (zero past the end).
    pub fn coeff(&self, i: usize) -> Rc<Expr> {
        self.coeffs.get(i).cloned().unwrap_or_else(Expr::zero)
    }

    /// Overwrite the coefficient of `var^i`, growing or trimming as needed.
    pub fn set(&mut self, i: usize, value: Rc<Expr>) {
        if self.coeffs.len() <= i {
            self.coeffs.resize(i + 1, Expr::zero());
        }
        self.coeffs[i] = simplify(&value);
        self.trim();
    }

    pub fn leading_coeff(&self) -> Rc<Expr> {
        self.coeffs.last().cloned().unwrap_or_else(Expr::zero)
    }

    /// Index of the lowest non-zero coefficient (0 for the zero polynomial).
    pub fn min_degree(&self) -> usize {
        self.coeffs.iter().position(|c| !c.is_zero()).unwrap_or(0)
    }

    pub fn is_monic(&self) -> bool {
        self.leading_coeff().is_one()
    }

    /// All coefficients as exact rationals, if they are.
    pub fn rationals(&self) -> Option<Vec<BigRational>> {
        self.coeffs.iter().map(|c| rational_value(c)).collect()
    }

    pub fn is_rational(&self) -> bool {
        self.coeffs.iter().all(|c| is_rational_constant(c))
    }

    /// Coefficient-wise equivalence.
    pub fn is_equivalent(&self, other: &Self) -> bool {
        self.coeffs.len() == other.coeffs.len()
            && self
                .coeffs
                .iter()
                .zip(&other.coeffs)
                .all(|(a, b)| are_equivalent(a, b))
    }

    pub fn to_expr(&self) -> Rc<Expr> {
        // (negative, magnitude) summands, highest power first
        let mut parts: Vec<(bool, Rc<Expr>)> = Vec::new();
        for (i, coeff) in self.coeffs.iter().enumerate().rev() {
            if coeff.is_zero() {
                continue;
            }
            let var_part = match i {
                0 => None,
                1 => Some(Expr::var(&self.var)),
                _ => Some(Expr::pow(Expr::var(&self.var), Expr::num(i as i64))),
            };
            let Some(v) = var_part else {
                if parts.is_empty() {
                    parts.push((false, coeff.clone()));
                } else {
                    // a sum-valued constant term joins the outer sum
                    let mut pieces = Vec::new();
                    summands(coeff, false, &mut pieces);
                    for (negative, t) in pieces {
                        parts.push(match split_negation(&t) {
                            Some(m) => (!negative, m),
                            None => (negative, t),
                        });
                    }
                }
                continue;
            };
            let (negative, magnitude) = match split_negation(coeff) {
                Some(m) if !parts.is_empty() => (true, m),
                _ => (false, coeff.clone()),
            };
            let term = if magnitude.is_one() {
                v
            } else if *magnitude == *Expr::num(-1) {
                Expr::neg(v)
            } else {
                Expr::mul(magnitude, v)
            };
            parts.push((negative, term));
        }

        let mut parts = parts.into_iter();
        let Some((_, first)) = parts.next() else {
            return Expr::num(0);
        };
        parts.fold(first, |acc, (negative, term)| {
            if negative {
                Expr::sub(acc, term)
            } else {
                Expr::add(acc, term)
            }
        })
    }

    // =========================================================================
    // Arithmetic
    // =========================================================================

    pub fn add(&self, other: &Self) -> Self {
        let len = max(self.coeffs.len(), other.coeffs.len());
        let coeffs = (0..len)
            .map(|i| Expr::add(self.coeff(i), other.coeff(i)))
            .collect();
        Polynomial::new(coeffs, &self.var)
    }

    pub fn sub(&self, other: &Self) -> Self {
        let len = max(self.coeffs.len(), other.coeffs.len());
        let coeffs = (0..len)
            .map(|i| Expr::sub(self.coeff(i), other.coeff(i)))
            .collect();
        Polynomial::new(coeffs, &self.var)
    }

    pub fn mul(&self, other: &Self) -> Self {
        if self.is_zero() || other.is_zero() {
            return Polynomial::zero(&self.var);
        }
        let new_len = self.coeffs.len() + other.coeffs.len() - 1;
        let mut sums: Vec<Vec<Rc<Expr>>> = vec![Vec::new(); new_len];

        for (i, c1) in self.coeffs.iter().enumerate() {
            for (j, c2) in other.coeffs.iter().enumerate() {
                sums[i + j].push(Expr::mul(c1.clone(), c2.clone()));
            }
        }

        Polynomial::new(sums.into_iter().map(Expr::sum_of).collect(), &self.var)
    }

    pub fn neg(&self) -> Self {
        let coeffs = self.coeffs.iter().map(|c| Expr::neg(c.clone())).collect();
        Polynomial::new(coeffs, &self.var)
    }

    pub fn scale(&self, k: &Rc<Expr>) -> Self {
        let coeffs = self
            .coeffs
            .iter()
            .map(|c| Expr::mul(k.clone(), c.clone()))
            .collect();
        Polynomial::new(coeffs, &self.var)
    }

    /// Divide through by the leading coefficient (zero stays zero).
    pub fn monic(&self) -> Self {
        if self.is_zero() || self.is_monic() {
            return self.clone();
        }
        let inv = Expr::div(Expr::one(), self.leading_coeff());
        let mut res = self.scale(&inv);
        // exact by construction even when the simplifier cannot see it
        if let Some(last) = res.coeffs.last_mut() {
            *last = Expr::one();
        }
        res
    }

    pub fn derivative(&self) -> Self {
        let coeffs = self
            .coeffs
            .iter()
            .enumerate()
            .skip(1)
            .map(|(i, c)| Expr::mul(Expr::num(i as i64), c.clone()))
            .collect();
        Polynomial::new(coeffs, &self.var)
    }

    /// `p(var^k)`
    pub fn compose_power(&self, k: usize) -> Self {
        if k <= 1 || self.is_zero() {
            return self.clone();
        }
        let mut coeffs = vec![Expr::zero(); self.degree() * k + 1];
        for (i, c) in self.coeffs.iter().enumerate() {
            coeffs[i * k] = c.clone();
        }
        Polynomial::new(coeffs, &self.var)
    }

    /// Value at a rational point, when every coefficient is rational.
    pub fn eval_rational(&self, x: &BigRational) -> Option<BigRational> {
        let mut acc = BigRational::zero();
        for c in self.coeffs.iter().rev() {
            acc = acc * x + c.as_number()?;
        }
        Some(acc)
    }

    /// Integer coefficients with content 1 and positive leading coefficient,
    /// for rational polynomials.
    pub fn to_primitive_integers(&self) -> Option<Vec<BigInt>> {
        let values = self.rationals()?;
        let lcm = lcm_of_denominators(values.iter());
        let ints: Vec<BigInt> = values
            .iter()
            .map(|v| (v * BigRational::from_integer(lcm.clone())).to_integer())
            .collect();
        let mut content = ints.iter().fold(BigInt::zero(), |acc, c| acc.gcd(c));
        if content.is_zero() {
            return Some(ints);
        }
        if ints.last().is_some_and(|lc| lc.is_negative()) {
            content = -content;
        }
        Some(ints.into_iter().map(|c| c / &content).collect())
    }

    // =========================================================================
    // Euclidean algorithms
    // =========================================================================

    /// Returns `(quotient, remainder)` with `deg(remainder) < deg(divisor)`.
    pub fn div_rem(&self, divisor: &Self) -> Result<(Self, Self), CasError> {
        if divisor.is_zero() {
            return Err(CasError::DivisionByZero);
        }

        if self.is_zero() || self.degree() < divisor.degree() {
            return Ok((Polynomial::zero(&self.var), self.clone()));
        }

        let divisor_deg = divisor.degree();
        let divisor_lc = divisor.leading_coeff();
        let mut quotient = vec![Expr::zero(); self.degree() - divisor_deg + 1];
        let mut remainder = self.clone();

        while !remainder.is_zero() && remainder.degree() >= divisor_deg {
            let top = remainder.degree();
            let degree_diff = top - divisor_deg;
            let coeff_quot = simplify(&Expr::div(remainder.leading_coeff(), divisor_lc.clone()));
            quotient[degree_diff] = coeff_quot.clone();

            let mut coeffs = remainder.coeffs.clone();
            for (i, d) in divisor.coeffs.iter().enumerate().take(divisor_deg) {
                let k = i + degree_diff;
                coeffs[k] = Expr::sub(coeffs[k].clone(), Expr::mul(coeff_quot.clone(), d.clone()));
            }
            // the leading term cancels exactly
            coeffs.truncate(top);
            remainder = Polynomial::new(coeffs, &self.var);
        }

        Ok((Polynomial::new(quotient, &self.var), remainder))
    }

    /// Monic greatest common divisor. A zero operand returns the other unchanged.
    pub fn gcd(&self, other: &Self) -> Result<Self, CasError> {
        if self.is_zero() {
            return Ok(other.clone());
        }
        if other.is_zero() {
            return Ok(self.clone());
        }

        let mut a = self.clone();
        let mut b = other.clone();
        while !b.is_zero() {
            let (_, r) = a.div_rem(&b)?;
            a = b;
            b = r;
        }

        Ok(a.monic())
    }

    /// Bézout coefficients `(u, v)` with `u*self + v*other = gcd(self, other)`.
    pub fn extended_gcd(&self, other: &Self) -> Result<(Self, Self), CasError> {
        if self.is_zero() && other.is_zero() {
            return Err(CasError::PolynomialError(
                "extended gcd of two zero polynomials".to_string(),
            ));
        }

        // longer sequence is divided first
        let swapped = self.len() < other.len();
        let (mut r0, mut r1) = if swapped {
            (other.clone(), self.clone())
        } else {
            (self.clone(), other.clone())
        };
        let var = self.var.as_str();
        let (mut s0, mut s1) = (Polynomial::one(var), Polynomial::zero(var));
        let (mut t0, mut t1) = (Polynomial::zero(var), Polynomial::one(var));

        while !r1.is_zero() {
            let (q, r) = r0.div_rem(&r1)?;
            r0 = std::mem::replace(&mut r1, r);
            let s = s0.sub(&q.mul(&s1));
            s0 = std::mem::replace(&mut s1, s);
            let t = t0.sub(&q.mul(&t1));
            t0 = std::mem::replace(&mut t1, t);
        }

        let inv = Expr::div(Expr::one(), r0.leading_coeff());
        let (u, v) = (s0.scale(&inv), t0.scale(&inv));
        Ok(if swapped { (v, u) } else { (u, v) })
    }

    /// Determinant of the Sylvester matrix of `self` and `other`.
    pub fn resultant(&self, other: &Self) -> Result<Rc<Expr>, CasError> {
        if self.is_zero() || other.is_zero() {
            return Ok(Expr::zero());
        }
        let m = self.degree();
        let n = other.degree();
        let size = m + n;
        let mut sylvester = Matrix::zeros(size, size);

        for row in 0..n {
            for (j, c) in self.coeffs.iter().rev().enumerate() {
                sylvester.set(row, row + j, c.clone());
            }
        }
        for row in 0..m {
            for (j, c) in other.coeffs.iter().rev().enumerate() {
                sylvester.set(n + row, row + j, c.clone());
            }
        }

        sylvester
            .determinant()
            .ok_or_else(|| CasError::PolynomialError("Sylvester matrix is not square".to_string()))
    }
}

/// Top-level summands of `e` with their signs: `a - b + c` gives
/// `[(false, a), (true, b), (false, c)]`.
fn summands(e: &Rc<Expr>, negative: bool, out: &mut Vec<(bool, Rc<Expr>)>) {
    match e.as_ref() {
        Expr::Add(l, r) => {
            summands(l, negative, out);
            summands(r, negative, out);
        }
        Expr::Sub(l, r) => {
            summands(l, negative, out);
            summands(r, !negative, out);
        }
        _ => out.push((negative, e.clone())),
    }
}

/// `Some(-e)` if `e` is syntactically negative (`-a`, `-3`, `-3 * a`).
pub(crate) fn split_negation(e: &Rc<Expr>) -> Option<Rc<Expr>> {
    match e.as_ref() {
        Expr::Neg(inner) => Some(inner.clone()),
        Expr::Number(n) if n.is_negative() => Some(Expr::number(-n)),
        Expr::Mul(l, r) => match l.as_number() {
            Some(n) if n.is_negative() => {
                let m = -n;
                Some(if m.is_one() {
                    r.clone()
                } else {
                    Expr::mul(Expr::number(m), r.clone())
                })
            }
            _ => None,
        },
        _ => None,
    }
}
