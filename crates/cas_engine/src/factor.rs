//! Irreducible factorization dispatcher.
//!
//! A monic polynomial with non-zero constant term is handed to a fixed
//! cascade of strategies. Each one either produces a [`Factorization`] or
//! reports [`Decomposition::NotApplicable`]; the first real split wins and
//! sub-factors are decomposed recursively. Degree strictly decreases on every
//! recursive call, so the recursion depth is bounded by the input degree.
//!
//! Only resource bounds and cancellation are errors. A polynomial nothing
//! applies to is returned as is.

use crate::budget::PolyBudget;
use crate::closed_form::{
    antiperiodic_connector, cyclic_factors, periodic_connector, solve_cubic, solve_quadratic,
};
use crate::coefficients::get_coefficients;
use crate::error::CasError;
use crate::polynomial::Polynomial;
use crate::structure::{antiperiod_of, gcd_of_exponents, period_of};
use cas_ast::{compare_expr, Expr};
use cas_math::linear_system::{LinearSystem, SolveError};
use cas_math::numeric::positive_divisors;
use cas_math::simplify;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use std::collections::BTreeSet;
use std::rc::Rc;

/// Outcome of a single decomposition strategy.
#[derive(Debug, Clone, PartialEq)]
pub enum Decomposition<T = Rc<Expr>> {
    Factored(T),
    NotApplicable,
}

/// `unit * Π factor^multiplicity` with monic factors.
#[derive(Debug, Clone, PartialEq)]
pub struct Factorization {
    pub unit: Rc<Expr>,
    pub factors: Vec<(Polynomial, u32)>,
}

impl Factorization {
    pub fn constant(unit: Rc<Expr>) -> Self {
        Factorization {
            unit: simplify(&unit),
            factors: Vec::new(),
        }
    }

    pub fn one() -> Self {
        Self::constant(Expr::one())
    }

    fn push(&mut self, factor: Polynomial, multiplicity: u32) {
        self.factors.push((factor, multiplicity));
    }

    /// Multiply in `other^multiplicity`.
    fn absorb(&mut self, other: Factorization, multiplicity: u32) {
        if !other.unit.is_one() {
            let power = Expr::powi(other.unit, i64::from(multiplicity));
            self.unit = simplify(&Expr::mul(self.unit.clone(), power));
        }
        for (f, m) in other.factors {
            self.factors.push((f, m * multiplicity));
        }
    }

    fn scale_unit(&mut self, k: Rc<Expr>) {
        self.unit = simplify(&Expr::mul(self.unit.clone(), k));
    }

    /// True if this is just `p` again.
    fn is_trivial_for(&self, p: &Polynomial) -> bool {
        match self.factors.as_slice() {
            [] => true,
            [(f, 1)] => f.degree() == p.degree(),
            _ => false,
        }
    }

    pub fn degree(&self) -> usize {
        self.factors
            .iter()
            .map(|(f, m)| f.degree() * (*m as usize))
            .sum()
    }

    /// Merge factors that divide one another, accumulating multiplicities.
    ///
    /// Runs at most `budget.max_merge_iterations` passes; hitting the cap
    /// leaves a correct but possibly unmerged product.
    pub fn merge_equivalent(&mut self, budget: &PolyBudget) -> Result<(), CasError> {
        let mut passes = 0;
        'pass: loop {
            passes += 1;
            if passes > budget.max_merge_iterations {
                tracing::warn!(
                    target: "factor",
                    cap = budget.max_merge_iterations,
                    factors = self.factors.len(),
                    "merge_iteration_cap_reached"
                );
                return Ok(());
            }
            budget.check_abort()?;

            for i in 0..self.factors.len() {
                for j in 0..self.factors.len() {
                    let (di, dj) = (self.factors[i].0.degree(), self.factors[j].0.degree());
                    if i == j || di == 0 || di > dj {
                        continue;
                    }
                    let (q, r) = self.factors[j].0.div_rem(&self.factors[i].0)?;
                    if !r.is_zero() {
                        continue;
                    }
                    let mj = self.factors[j].1;
                    self.factors[i].1 += mj;
                    if q.degree() == 0 {
                        self.factors.remove(j);
                        if !q.coeff(0).is_one() {
                            self.scale_unit(Expr::powi(q.coeff(0), i64::from(mj)));
                        }
                    } else {
                        self.factors[j].0 = q;
                    }
                    continue 'pass;
                }
            }
            return Ok(());
        }
    }

    /// Order factors by degree, then structurally.
    pub fn sort(&mut self) {
        self.factors.sort_by(|(a, _), (b, _)| {
            a.degree()
                .cmp(&b.degree())
                .then_with(|| compare_expr(&a.to_expr(), &b.to_expr()))
        });
    }

    pub fn to_expr(&self) -> Rc<Expr> {
        if self.factors.is_empty() {
            return self.unit.clone();
        }
        let parts = self.factors.iter().map(|(f, m)| {
            let base = f.to_expr();
            if *m == 1 {
                base
            } else {
                Expr::pow(base, Expr::num(i64::from(*m)))
            }
        });
        let product = Expr::product_of(parts);
        if self.unit.is_one() {
            product
        } else if *self.unit == *Expr::num(-1) {
            Expr::neg(product)
        } else {
            Expr::mul(self.unit.clone(), product)
        }
    }
}

// =============================================================================
// Entry points
// =============================================================================

/// Factor `expr` as a polynomial in `var`. Non-polynomial input is returned
/// unchanged.
pub fn factor(expr: &Rc<Expr>, var: &str, budget: &PolyBudget) -> Result<Rc<Expr>, CasError> {
    match get_coefficients(expr, var, budget)? {
        Some(poly) => decompose_into_irreducible_factors(&poly, budget),
        None => Ok(expr.clone()),
    }
}

/// Product of irreducible (or maximally reduced) factors of `poly`.
/// Degree 0 and 1 come back unfactored.
pub fn decompose_into_irreducible_factors(
    poly: &Polynomial,
    budget: &PolyBudget,
) -> Result<Rc<Expr>, CasError> {
    if poly.degree() <= 1 {
        return Ok(poly.to_expr());
    }
    Ok(factorize(poly, budget)?.to_expr())
}

/// Structured form of [`decompose_into_irreducible_factors`].
pub fn factorize(poly: &Polynomial, budget: &PolyBudget) -> Result<Factorization, CasError> {
    let mut result = factor_poly(poly, budget)?;
    result.merge_equivalent(budget)?;
    result.sort();
    Ok(result)
}

/// Run the strategy cascade on a monic polynomial.
pub fn try_decompose(poly: &Polynomial, budget: &PolyBudget) -> Result<Decomposition, CasError> {
    if poly.degree() < 2 || !poly.is_monic() || poly.coeff(0).is_zero() {
        return Ok(Decomposition::NotApplicable);
    }
    Ok(match dispatch(poly, budget)? {
        Decomposition::Factored(mut f) => {
            f.merge_equivalent(budget)?;
            f.sort();
            Decomposition::Factored(f.to_expr())
        }
        Decomposition::NotApplicable => Decomposition::NotApplicable,
    })
}

/// Pull out the leading coefficient and `var^j`, then dispatch the rest.
fn factor_poly(p: &Polynomial, budget: &PolyBudget) -> Result<Factorization, CasError> {
    budget.check_abort()?;
    if p.degree() == 0 {
        return Ok(Factorization::constant(p.coeff(0)));
    }
    budget.check_degree(p.degree())?;

    let var = p.var.as_str();
    let monic = p.monic();
    let mut result = Factorization::constant(p.leading_coeff());

    let j = monic.min_degree();
    if j > 0 {
        result.push(Polynomial::monomial(Expr::one(), 1, var), j as u32);
    }
    let core = Polynomial::new(monic.coeffs[j..].to_vec(), var);
    match core.degree() {
        0 => {}
        1 => result.push(core, 1),
        _ => match dispatch(&core, budget)? {
            Decomposition::Factored(f) => result.absorb(f, 1),
            Decomposition::NotApplicable => result.push(core, 1),
        },
    }
    Ok(result)
}

type Strategy = fn(&Polynomial, &PolyBudget) -> Result<Decomposition<Factorization>, CasError>;

const STRATEGIES: &[(&str, Strategy)] = &[
    ("periodic", try_periodic),
    ("antiperiodic", try_antiperiodic),
    ("cyclic", try_cyclic),
    ("rational", try_rational),
    ("substitution", try_substitution),
    ("closed_form", try_closed_form),
];

fn dispatch(p: &Polynomial, budget: &PolyBudget) -> Result<Decomposition<Factorization>, CasError> {
    budget.check_degree(p.degree())?;
    for (name, strategy) in STRATEGIES {
        budget.check_abort()?;
        match strategy(p, budget)? {
            Decomposition::Factored(f) if !f.is_trivial_for(p) => {
                tracing::debug!(
                    target: "factor",
                    strategy = *name,
                    degree = p.degree(),
                    factors = f.factors.len(),
                    "strategy_applied"
                );
                return Ok(Decomposition::Factored(f));
            }
            _ => {
                tracing::trace!(target: "factor", strategy = *name, degree = p.degree(), "not_applicable");
            }
        }
    }
    Ok(Decomposition::NotApplicable)
}

// =============================================================================
// Strategies
// =============================================================================

fn try_periodic(p: &Polynomial, budget: &PolyBudget) -> Result<Decomposition<Factorization>, CasError> {
    let len = p.len();
    let m = period_of(&p.coeffs);
    if m >= len {
        return Ok(Decomposition::NotApplicable);
    }
    let k = len.div_ceil(m);
    let block = Polynomial::new(p.coeffs[..m].to_vec(), &p.var);
    let mut out = factor_poly(&block, budget)?;
    for f in periodic_connector(&p.var, m as u64, k as u64) {
        out.push(f, 1);
    }
    Ok(Decomposition::Factored(out))
}

fn try_antiperiodic(
    p: &Polynomial,
    budget: &PolyBudget,
) -> Result<Decomposition<Factorization>, CasError> {
    let len = p.len();
    let m = antiperiod_of(&p.coeffs);
    if m >= len {
        return Ok(Decomposition::NotApplicable);
    }
    let k = len.div_ceil(m);
    let block = Polynomial::new(p.coeffs[..m].to_vec(), &p.var);
    let mut out = factor_poly(&block, budget)?;
    // the connector's leading coefficient is (-1)^(k-1)
    if k % 2 == 0 {
        out.scale_unit(Expr::num(-1));
    }
    for f in antiperiodic_connector(&p.var, m as u64, k as u64) {
        out.push(f, 1);
    }
    Ok(Decomposition::Factored(out))
}

fn try_cyclic(p: &Polynomial, _budget: &PolyBudget) -> Result<Decomposition<Factorization>, CasError> {
    let n = p.degree();
    if p.coeffs[1..n].iter().any(|c| !c.is_zero()) {
        return Ok(Decomposition::NotApplicable);
    }
    // var^n = a
    let a = simplify(&Expr::neg(p.coeff(0)));
    Ok(match cyclic_factors(&p.var, n as u64, &a) {
        Some(fs) => {
            let mut out = Factorization::one();
            for f in fs {
                out.push(f, 1);
            }
            Decomposition::Factored(out)
        }
        None => Decomposition::NotApplicable,
    })
}

fn try_rational(p: &Polynomial, budget: &PolyBudget) -> Result<Decomposition<Factorization>, CasError> {
    if !p.is_rational() {
        return Ok(Decomposition::NotApplicable);
    }
    let (Some(values), Some(ints)) = (p.rationals(), p.to_primitive_integers()) else {
        return Ok(Decomposition::NotApplicable);
    };

    if let Decomposition::Factored(f) = rational_roots(p, &values, &ints, budget)? {
        return Ok(Decomposition::Factored(f));
    }
    if let Decomposition::Factored(f) = squarefree(p, budget)? {
        return Ok(Decomposition::Factored(f));
    }
    kronecker_split(p, &ints, budget)
}

/// Remove every root `±a/b` with `a | c_0`, `b | c_n`, with multiplicity.
fn rational_roots(
    p: &Polynomial,
    values: &[BigRational],
    ints: &[BigInt],
    budget: &PolyBudget,
) -> Result<Decomposition<Factorization>, CasError> {
    let (Some(c0), Some(cn)) = (ints.first(), ints.last()) else {
        return Ok(Decomposition::NotApplicable);
    };
    if !budget.allows_divisor_search(c0) || !budget.allows_divisor_search(cn) {
        tracing::warn!(
            target: "factor",
            constant = %c0,
            leading = %cn,
            limit = budget.max_divisor_search,
            "rational_root_search_skipped"
        );
        return Ok(Decomposition::NotApplicable);
    }

    let numerators = positive_divisors(c0, || budget.check_abort())?;
    let denominators = positive_divisors(cn, || budget.check_abort())?;
    let mut candidates = BTreeSet::new();
    for a in &numerators {
        for b in &denominators {
            let r = BigRational::new(a.clone(), b.clone());
            candidates.insert(-r.clone());
            candidates.insert(r);
        }
    }

    let mut rest = values.to_vec();
    let mut out = Factorization::one();
    for (i, r) in candidates.iter().enumerate() {
        if i % 64 == 0 {
            budget.check_abort()?;
        }
        let mut multiplicity = 0;
        while rest.len() > 1 && eval_at(&rest, r).is_zero() {
            rest = deflate(&rest, r);
            multiplicity += 1;
        }
        if multiplicity > 0 {
            out.push(Polynomial::linear(Expr::number(r.clone()), &p.var), multiplicity);
        }
    }

    if out.factors.is_empty() {
        return Ok(Decomposition::NotApplicable);
    }
    let quotient = Polynomial::from_rationals(&rest, &p.var);
    out.absorb(factor_poly(&quotient, budget)?, 1);
    Ok(Decomposition::Factored(out))
}

/// Yun's squarefree decomposition, then decompose and re-merge each piece.
fn squarefree(p: &Polynomial, budget: &PolyBudget) -> Result<Decomposition<Factorization>, CasError> {
    let dp = p.derivative();
    let g = p.gcd(&dp)?;
    if g.degree() == 0 {
        return Ok(Decomposition::NotApplicable);
    }

    let (mut b, _) = p.div_rem(&g)?;
    let (c, _) = dp.div_rem(&g)?;
    let mut d = c.sub(&b.derivative());
    let mut multiplicity = 1u32;
    let mut out = Factorization::one();

    while b.degree() >= 1 && (multiplicity as usize) <= p.degree() {
        budget.check_abort()?;
        let a = b.gcd(&d)?.monic();
        let (next_b, _) = b.div_rem(&a)?;
        let (c, _) = d.div_rem(&a)?;
        d = c.sub(&next_b.derivative());
        if a.degree() >= 1 {
            out.absorb(factor_poly(&a, budget)?, multiplicity);
        }
        b = next_b;
        multiplicity += 1;
    }

    out.merge_equivalent(budget)?;
    Ok(Decomposition::Factored(out))
}

/// Kronecker's method: interpolate candidate factors through divisors of
/// the values at small integer points and keep the first exact divisor.
fn kronecker_split(
    p: &Polynomial,
    ints: &[BigInt],
    budget: &PolyBudget,
) -> Result<Decomposition<Factorization>, CasError> {
    let n = ints.len() - 1;
    if n > budget.max_split_degree {
        tracing::warn!(
            target: "factor",
            degree = n,
            limit = budget.max_split_degree,
            "split_degree_exceeded"
        );
        return Ok(Decomposition::NotApplicable);
    }

    let f: Vec<BigRational> = ints.iter().cloned().map(BigRational::from_integer).collect();
    let points: Vec<BigRational> = evaluation_points(n / 2 + 1);
    let mut divisor_sets: Vec<Vec<BigInt>> = Vec::with_capacity(points.len());
    for x in &points {
        let value = eval_at(&f, x).to_integer();
        if value.is_zero() {
            return Ok(Decomposition::NotApplicable);
        }
        if !budget.allows_divisor_search(&value) {
            tracing::warn!(target: "factor", value = %value, "split_value_too_large");
            return Ok(Decomposition::NotApplicable);
        }
        let positive = positive_divisors(&value, || budget.check_abort())?;
        let mut set = positive.clone();
        set.extend(positive.into_iter().map(|d| -d));
        divisor_sets.push(set);
    }

    let mut tried = 0usize;
    for s in 1..=n / 2 {
        let vandermonde: Vec<Vec<BigRational>> = points[..=s]
            .iter()
            .map(|x| {
                let mut row = Vec::with_capacity(s + 1);
                let mut power = BigRational::one();
                for _ in 0..=s {
                    row.push(power.clone());
                    power *= x;
                }
                row
            })
            .collect();

        let sets = &divisor_sets[..=s];
        let mut index = vec![0usize; s + 1];
        loop {
            // g and -g are the same candidate
            if sets[0][index[0]].is_positive() {
                tried += 1;
                if tried > budget.max_split_candidates {
                    tracing::warn!(
                        target: "factor",
                        cap = budget.max_split_candidates,
                        degree = n,
                        "split_candidate_cap_reached"
                    );
                    return Ok(Decomposition::NotApplicable);
                }
                if tried % 64 == 0 {
                    budget.check_abort()?;
                }

                let rhs = index
                    .iter()
                    .zip(sets)
                    .map(|(&i, set)| BigRational::from_integer(set[i].clone()))
                    .collect();
                let system = LinearSystem::from_matrix(vandermonde.clone(), rhs)?;
                let g = match system.solve() {
                    Ok(g) => g,
                    Err(SolveError::Inconsistent | SolveError::Underdetermined { .. }) => Vec::new(),
                    Err(e) => return Err(e.into()),
                };
                let exact_degree = g.last().is_some_and(|c| !c.is_zero());
                if exact_degree && g.iter().all(|c| c.is_integer()) {
                    let (q, r) = rational_div_rem(&f, &g);
                    if r.iter().all(|c| c.is_zero()) {
                        let mut out = factor_poly(&Polynomial::from_rationals(&g, &p.var), budget)?;
                        out.absorb(factor_poly(&Polynomial::from_rationals(&q, &p.var), budget)?, 1);
                        // primitive form may differ from p by a constant
                        out.scale_unit(Expr::div(p.leading_coeff(), Expr::number(f[n].clone())));
                        return Ok(Decomposition::Factored(out));
                    }
                }
            }
            if !advance(&mut index, sets) {
                break;
            }
        }
    }
    Ok(Decomposition::NotApplicable)
}

/// `p(x) = q(x^k)`: factor `q`, substitute back and decompose each piece.
fn try_substitution(
    p: &Polynomial,
    budget: &PolyBudget,
) -> Result<Decomposition<Factorization>, CasError> {
    let k = gcd_of_exponents(&p.coeffs);
    if k <= 1 {
        return Ok(Decomposition::NotApplicable);
    }
    let reduced: Vec<Rc<Expr>> = (0..=p.degree() / k).map(|i| p.coeff(i * k)).collect();
    let q = Polynomial::new(reduced, &p.var);
    let fq = factor_poly(&q, budget)?;
    if fq.is_trivial_for(&q) {
        return Ok(Decomposition::NotApplicable);
    }

    let mut out = Factorization::constant(fq.unit.clone());
    for (f, m) in fq.factors {
        out.absorb(factor_poly(&f.compose_power(k), budget)?, m);
    }
    Ok(Decomposition::Factored(out))
}

fn try_closed_form(
    p: &Polynomial,
    _budget: &PolyBudget,
) -> Result<Decomposition<Factorization>, CasError> {
    let solved = match p.degree() {
        2 => solve_quadratic(&p.var, &p.coeff(1), &p.coeff(0)),
        3 => solve_cubic(&p.var, &p.coeff(2), &p.coeff(1), &p.coeff(0)),
        _ => None,
    };
    Ok(match solved {
        Some(factors) => Decomposition::Factored(Factorization {
            unit: Expr::one(),
            factors,
        }),
        None => Decomposition::NotApplicable,
    })
}

// =============================================================================
// Dense rational helpers
// =============================================================================

fn eval_at(coeffs: &[BigRational], x: &BigRational) -> BigRational {
    coeffs
        .iter()
        .rev()
        .fold(BigRational::zero(), |acc, c| acc * x + c)
}

/// Quotient of `coeffs` by `(x - r)`, assuming `r` is a root.
fn deflate(coeffs: &[BigRational], r: &BigRational) -> Vec<BigRational> {
    let n = coeffs.len() - 1;
    let mut q = vec![BigRational::zero(); n];
    let mut carry = BigRational::zero();
    for i in (1..=n).rev() {
        carry = &coeffs[i] + &carry * r;
        q[i - 1] = carry.clone();
    }
    q
}

/// Long division over the rationals; `den` must have a non-zero top entry.
fn rational_div_rem(num: &[BigRational], den: &[BigRational]) -> (Vec<BigRational>, Vec<BigRational>) {
    let dn = den.len() - 1;
    if num.len() < den.len() {
        return (Vec::new(), num.to_vec());
    }
    let mut rem = num.to_vec();
    let mut quot = vec![BigRational::zero(); num.len() - dn];
    for top in (dn..num.len()).rev() {
        let coeff = &rem[top] / &den[dn];
        if coeff.is_zero() {
            continue;
        }
        let shift = top - dn;
        for (i, d) in den.iter().enumerate() {
            let delta = &coeff * d;
            rem[shift + i] -= delta;
        }
        quot[shift] = coeff;
    }
    rem.truncate(dn);
    (quot, rem)
}

/// `0, 1, -1, 2, -2, ...`
fn evaluation_points(count: usize) -> Vec<BigRational> {
    (0..count)
        .map(|i| {
            let magnitude = BigInt::from((i + 1) / 2);
            let v = if i % 2 == 0 { -magnitude } else { magnitude };
            BigRational::from_integer(v)
        })
        .collect()
}

/// Odometer step over the cartesian product of `sets`.
fn advance(index: &mut [usize], sets: &[Vec<BigInt>]) -> bool {
    for (i, set) in index.iter_mut().zip(sets).rev() {
        *i += 1;
        if *i < set.len() {
            return true;
        }
        *i = 0;
    }
    false
}
