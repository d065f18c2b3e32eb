//! Exact expanded normal form.
//!
//! A [`NormalForm`] is a finite sum `Σ c_i * m_i` of rational coefficients
//! times monomials, where a monomial maps canonical atoms to rational
//! exponents. Two expressions are equivalent iff their normal forms are equal.
//!
//! Atoms are variables, constants, functions/operators with canonical
//! arguments, sums that could not be expanded (negative, fractional or
//! oversized powers) and positive integers under fractional exponents.
//! Radicands are split into primes, so `sqrt(8)` becomes `2 * 2^(1/2)`.

use crate::numeric::{factor_integer, rational_powi};
use crate::trig_values::{reduce_cos_of_rational_pi, reduce_sin_of_rational_pi, CosForm};
use cas_ast::{Constant, Expr, ExprKey};
use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};
use std::collections::BTreeMap;
use std::rc::Rc;

/// Largest integer power of a sum that is multiplied out by default.
pub const DEFAULT_MAX_EXPAND_EXPONENT: u32 = 64;

/// Canonical atom -> rational exponent.
pub type Monomial = BTreeMap<ExprKey, BigRational>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalForm {
    terms: BTreeMap<Monomial, BigRational>,
}

fn ratio(n: i64, d: i64) -> BigRational {
    BigRational::new(BigInt::from(n), BigInt::from(d))
}

impl NormalForm {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn one() -> Self {
        Self::constant(BigRational::one())
    }

    pub fn constant(c: BigRational) -> Self {
        let mut nf = Self::zero();
        if !c.is_zero() {
            nf.terms.insert(Monomial::new(), c);
        }
        nf
    }

    pub fn from_term(coeff: BigRational, mono: Monomial) -> Self {
        let mut nf = Self::zero();
        if !coeff.is_zero() {
            nf.terms.insert(mono, coeff);
        }
        nf
    }

    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// `(monomial, coefficient)` pairs in ascending monomial order.
    pub fn terms(&self) -> impl DoubleEndedIterator<Item = (&Monomial, &BigRational)> {
        self.terms.iter()
    }

    /// The value if this is a rational constant (`0` for the empty sum).
    pub fn as_rational(&self) -> Option<BigRational> {
        match self.terms.len() {
            0 => Some(BigRational::zero()),
            1 => self
                .terms
                .iter()
                .next()
                .filter(|(m, _)| m.is_empty())
                .map(|(_, c)| c.clone()),
            _ => None,
        }
    }

    pub fn single_term(&self) -> Option<(&BigRational, &Monomial)> {
        if self.terms.len() == 1 {
            self.terms.iter().next().map(|(m, c)| (c, m))
        } else {
            None
        }
    }

    pub fn add_assign(&mut self, other: &NormalForm) {
        for (mono, c) in &other.terms {
            let remove = {
                let entry = self
                    .terms
                    .entry(mono.clone())
                    .or_insert_with(BigRational::zero);
                *entry += c;
                entry.is_zero()
            };
            if remove {
                self.terms.remove(mono);
            }
        }
    }

    pub fn add(&self, other: &NormalForm) -> NormalForm {
        let mut out = self.clone();
        out.add_assign(other);
        out
    }

    pub fn neg(&self) -> NormalForm {
        NormalForm {
            terms: self.terms.iter().map(|(m, c)| (m.clone(), -c)).collect(),
        }
    }

    pub fn sub(&self, other: &NormalForm) -> NormalForm {
        self.add(&other.neg())
    }

    pub fn scale(&self, k: &BigRational) -> NormalForm {
        if k.is_zero() {
            return NormalForm::zero();
        }
        NormalForm {
            terms: self.terms.iter().map(|(m, c)| (m.clone(), c * k)).collect(),
        }
    }

    /// Rebuild an expression tree, highest monomials first, constant last.
    pub fn to_expr(&self) -> Rc<Expr> {
        let mut acc: Option<Rc<Expr>> = None;
        for (mono, coeff) in self.terms.iter().rev() {
            acc = Some(match acc {
                None => term_to_expr(coeff, mono),
                Some(prev) if coeff.is_negative() => Expr::sub(prev, term_to_expr(&-coeff, mono)),
                Some(prev) => Expr::add(prev, term_to_expr(coeff, mono)),
            });
        }
        acc.unwrap_or_else(Expr::zero)
    }
}

/// Expression for a single `coeff * monomial` term.
pub fn term_to_expr(coeff: &BigRational, mono: &Monomial) -> Rc<Expr> {
    let factors: Vec<Rc<Expr>> = mono
        .iter()
        .map(|(k, e)| {
            if e.is_one() {
                k.0.clone()
            } else {
                Expr::pow(k.0.clone(), Expr::number(e.clone()))
            }
        })
        .collect();
    if factors.is_empty() {
        return Expr::number(coeff.clone());
    }
    let product = Expr::product_of(factors);
    if coeff.is_one() {
        product
    } else if *coeff == -BigRational::one() {
        Expr::neg(product)
    } else {
        Expr::mul(Expr::number(coeff.clone()), product)
    }
}

fn is_sum_atom(e: &Expr) -> bool {
    matches!(e, Expr::Add(_, _) | Expr::Sub(_, _))
}

/// Builds normal forms; carries the expansion limit for powers of sums.
#[derive(Debug, Clone, Copy)]
pub struct Normalizer {
    pub max_pow: u32,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self {
            max_pow: DEFAULT_MAX_EXPAND_EXPONENT,
        }
    }
}

impl Normalizer {
    pub fn new(max_pow: u32) -> Self {
        Self { max_pow }
    }

    pub fn from_expr(&self, expr: &Expr) -> NormalForm {
        match expr {
            Expr::Number(n) => NormalForm::constant(n.clone()),
            Expr::Constant(_) | Expr::Variable(_) => self.atom(Rc::new(expr.clone())),
            Expr::Add(l, r) => self.from_expr(l).add(&self.from_expr(r)),
            Expr::Sub(l, r) => self.from_expr(l).sub(&self.from_expr(r)),
            Expr::Neg(e) => self.from_expr(e).neg(),
            Expr::Mul(l, r) => self.mul(&self.from_expr(l), &self.from_expr(r)),
            Expr::Div(l, r) => {
                let den = self.from_expr(r);
                self.mul(&self.from_expr(l), &self.reciprocal(&den))
            }
            Expr::Pow(b, e) => self.pow(&self.from_expr(b), &self.from_expr(e)),
            Expr::Function(name, args) => self.function(name, args),
            Expr::Operator(name, args) => {
                let args = args.iter().map(|a| self.from_expr(a).to_expr()).collect();
                self.atom(Rc::new(Expr::Operator(name.clone(), args)))
            }
        }
    }

    fn atom(&self, atom: Rc<Expr>) -> NormalForm {
        let mut mono = Monomial::new();
        mono.insert(ExprKey(atom), BigRational::one());
        NormalForm::from_term(BigRational::one(), mono)
    }

    pub fn mul(&self, a: &NormalForm, b: &NormalForm) -> NormalForm {
        let mut out = NormalForm::zero();
        for (ma, ca) in &a.terms {
            for (mb, cb) in &b.terms {
                let mut mono = ma.clone();
                for (k, e) in mb {
                    *mono.entry(k.clone()).or_insert_with(BigRational::zero) += e;
                }
                out.add_assign(&self.normalize_term(ca * cb, mono));
            }
        }
        out
    }

    pub fn pow_int(&self, base: &NormalForm, n: u32) -> NormalForm {
        let mut result = NormalForm::one();
        let mut acc = base.clone();
        let mut e = n;
        while e > 0 {
            if e & 1 == 1 {
                result = self.mul(&result, &acc);
            }
            e >>= 1;
            if e > 0 {
                acc = self.mul(&acc, &acc);
            }
        }
        result
    }

    pub fn reciprocal(&self, nf: &NormalForm) -> NormalForm {
        self.pow(nf, &NormalForm::constant(-BigRational::one()))
    }

    /// Fold integer powers of primes into the coefficient and multiply out
    /// small positive integer powers of sums.
    fn normalize_term(&self, coeff: BigRational, mono: Monomial) -> NormalForm {
        let mut coeff = coeff;
        let mut kept = Monomial::new();
        let mut expansions = Vec::new();

        for (key, exp) in mono {
            if exp.is_zero() {
                continue;
            }
            let atom = key.0.clone();
            match &*atom {
                Expr::Number(n) if n.is_integer() && *n > BigRational::one() => {
                    let whole = exp.floor();
                    let frac = &exp - &whole;
                    if let Some(w) = whole.to_integer().to_i64() {
                        coeff *= rational_powi(n, w);
                        if !frac.is_zero() {
                            kept.insert(key, frac);
                        }
                    } else {
                        kept.insert(key, exp);
                    }
                }
                e if is_sum_atom(e) && exp.is_integer() && exp.is_positive() => {
                    match exp.to_integer().to_u32().filter(|n| *n <= self.max_pow) {
                        Some(n) => {
                            let base = self.from_expr(e);
                            expansions.push(self.pow_int(&base, n));
                        }
                        None => {
                            kept.insert(key, exp);
                        }
                    }
                }
                _ => {
                    kept.insert(key, exp);
                }
            }
        }

        let mut result = NormalForm::from_term(coeff, kept);
        for e in expansions {
            result = self.mul(&result, &e);
        }
        result
    }

    pub fn pow(&self, base: &NormalForm, exp: &NormalForm) -> NormalForm {
        let Some(r) = exp.as_rational() else {
            return self.atom(Expr::pow(base.to_expr(), exp.to_expr()));
        };
        if r.is_zero() {
            return NormalForm::one();
        }
        if let Some(c) = base.as_rational() {
            return self.rational_power(&c, &r);
        }
        if let Some((c, mono)) = base.single_term() {
            let cpart = self.rational_power(c, &r);
            let scaled: Monomial = mono.iter().map(|(k, e)| (k.clone(), e * &r)).collect();
            return self.mul(&cpart, &self.normalize_term(BigRational::one(), scaled));
        }
        if r.is_integer() && r.is_positive() {
            if let Some(n) = r.to_integer().to_u32().filter(|n| *n <= self.max_pow) {
                return self.pow_int(base, n);
            }
        }
        let mut mono = Monomial::new();
        mono.insert(ExprKey(base.to_expr()), r);
        NormalForm::from_term(BigRational::one(), mono)
    }

    /// `c^r` for rationals, splitting radicals into prime atoms.
    fn rational_power(&self, c: &BigRational, r: &BigRational) -> NormalForm {
        let opaque = || {
            let mut mono = Monomial::new();
            mono.insert(ExprKey(Expr::number(c.clone())), r.clone());
            NormalForm::from_term(BigRational::one(), mono)
        };

        if c.is_zero() {
            return if r.is_positive() {
                NormalForm::zero()
            } else {
                opaque()
            };
        }
        if r.is_integer() {
            return match r.to_integer().to_i64() {
                Some(k) => NormalForm::constant(rational_powi(c, k)),
                None => opaque(),
            };
        }

        let mut sign = BigRational::one();
        let mut base = c.clone();
        if c.is_negative() {
            // odd roots of negatives stay real
            if r.denom().is_even() {
                return opaque();
            }
            base = -c;
            if r.numer().is_odd() {
                sign = -sign;
            }
        }

        let whole = r.floor();
        let frac = r - &whole;
        let Some(w) = whole.to_integer().to_i64() else {
            return opaque();
        };
        let coeff = sign * rational_powi(&base, w);

        let mut mono = Monomial::new();
        for (p, mult) in factor_integer(base.numer()) {
            let key = ExprKey(Expr::number(BigRational::from_integer(p)));
            *mono.entry(key).or_insert_with(BigRational::zero) +=
                &frac * BigRational::from_integer(BigInt::from(mult));
        }
        for (p, mult) in factor_integer(base.denom()) {
            let key = ExprKey(Expr::number(BigRational::from_integer(p)));
            *mono.entry(key).or_insert_with(BigRational::zero) -=
                &frac * BigRational::from_integer(BigInt::from(mult));
        }
        self.normalize_term(coeff, mono)
    }

    fn function(&self, name: &str, args: &[Rc<Expr>]) -> NormalForm {
        let forms: Vec<NormalForm> = args.iter().map(|a| self.from_expr(a)).collect();
        if forms.len() == 1 {
            match name {
                "sqrt" => return self.pow(&forms[0], &NormalForm::constant(ratio(1, 2))),
                "cos" | "sin" => {
                    if let Some(q) = pi_multiple(&forms[0]) {
                        let reduced = if name == "cos" {
                            reduce_cos_of_rational_pi(&q)
                        } else {
                            reduce_sin_of_rational_pi(&q)
                        };
                        let value = self.cos_form(&reduced.form);
                        return if reduced.negative { value.neg() } else { value };
                    }
                }
                _ => {}
            }
        }
        let args = forms.iter().map(|f| f.to_expr()).collect();
        self.atom(Rc::new(Expr::Function(name.to_string(), args)))
    }

    fn cos_form(&self, form: &CosForm) -> NormalForm {
        let half = NormalForm::constant(ratio(1, 2));
        match form {
            CosForm::Zero => NormalForm::zero(),
            CosForm::One => NormalForm::one(),
            CosForm::Half => half,
            CosForm::HalfSqrt2 => self.mul(&half, &self.rational_power(&ratio(2, 1), &ratio(1, 2))),
            CosForm::HalfSqrt3 => self.mul(&half, &self.rational_power(&ratio(3, 1), &ratio(1, 2))),
            CosForm::Residual(r) => {
                let angle = if r.is_one() {
                    Expr::pi()
                } else {
                    Expr::mul(Expr::number(r.clone()), Expr::pi())
                };
                self.atom(Expr::cos(angle))
            }
        }
    }
}

/// `q` if the form equals `q * pi` for a rational `q`.
pub fn pi_multiple(nf: &NormalForm) -> Option<BigRational> {
    if nf.is_zero() {
        return Some(BigRational::zero());
    }
    let (c, mono) = nf.single_term()?;
    if mono.len() != 1 {
        return None;
    }
    let (atom, exp) = mono.iter().next()?;
    if exp.is_one() && matches!(&*atom.0, Expr::Constant(Constant::Pi)) {
        Some(c.clone())
    } else {
        None
    }
}

/// Canonical expanded form of `expr`.
pub fn simplify(expr: &Expr) -> Rc<Expr> {
    Normalizer::default().from_expr(expr).to_expr()
}

/// Like [`simplify`] but with an explicit limit on expanded powers of sums.
pub fn expand_with_limit(expr: &Expr, max_pow: u32) -> Rc<Expr> {
    Normalizer::new(max_pow).from_expr(expr).to_expr()
}

/// Semantic equality: `a - b` normalizes to zero.
pub fn are_equivalent(a: &Expr, b: &Expr) -> bool {
    let n = Normalizer::default();
    n.from_expr(a).sub(&n.from_expr(b)).is_zero()
}

/// True if `expr` normalizes to the zero expression.
pub fn is_zero_expr(expr: &Expr) -> bool {
    Normalizer::default().from_expr(expr).is_zero()
}
