// =============================================================================
// Numerical Helpers (exact integer / rational arithmetic)
// =============================================================================

use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

/// Trial-division bound used when splitting radicands into primes.
const RADICAND_TRIAL_LIMIT: u64 = 100_000;

/// Checkpoint interval for long divisor enumerations.
const DIVISOR_CHECK_INTERVAL: u64 = 4096;

/// Least common multiple of the denominators of `values` (1 for an empty slice).
pub fn lcm_of_denominators<'a>(values: impl IntoIterator<Item = &'a BigRational>) -> BigInt {
    values
        .into_iter()
        .fold(BigInt::one(), |acc, v| acc.lcm(v.denom()))
}

/// `base^exp` for any integer exponent. `0^negative` yields `0`.
pub fn rational_powi(base: &BigRational, exp: i64) -> BigRational {
    if base.is_zero() {
        return if exp == 0 {
            BigRational::one()
        } else {
            BigRational::zero()
        };
    }
    let mut result = BigRational::one();
    let mut acc = if exp < 0 { base.recip() } else { base.clone() };
    let mut e = exp.unsigned_abs();
    while e > 0 {
        if e & 1 == 1 {
            result *= &acc;
        }
        acc = &acc * &acc;
        e >>= 1;
    }
    result
}

/// Split `n > 0` into prime powers by trial division up to a fixed bound.
/// A cofactor left over after the bound is reported as if it were prime.
pub fn factor_integer(n: &BigInt) -> Vec<(BigInt, u32)> {
    let mut out = Vec::new();
    let mut rest = n.abs();
    if rest <= BigInt::one() {
        return out;
    }
    let mut p = BigInt::from(2);
    let limit = BigInt::from(RADICAND_TRIAL_LIMIT);
    while &p * &p <= rest && p <= limit {
        let mut mult = 0u32;
        while (&rest % &p).is_zero() {
            rest /= &p;
            mult += 1;
        }
        if mult > 0 {
            out.push((p.clone(), mult));
        }
        p += if p == BigInt::from(2) { 1u32 } else { 2u32 };
    }
    if rest > BigInt::one() {
        out.push((rest, 1));
    }
    out
}

/// All positive divisors of `|n|` in ascending order (`n != 0`).
///
/// `checkpoint` is invoked periodically so callers can abort long searches.
pub fn positive_divisors<E>(
    n: &BigInt,
    mut checkpoint: impl FnMut() -> Result<(), E>,
) -> Result<Vec<BigInt>, E> {
    let n = n.abs();
    let mut small = Vec::new();
    let mut large = Vec::new();
    if n.is_zero() {
        return Ok(small);
    }
    let mut d = BigInt::one();
    let mut steps = 0u64;
    while &d * &d <= n {
        steps += 1;
        if steps % DIVISOR_CHECK_INTERVAL == 0 {
            checkpoint()?;
        }
        if (&n % &d).is_zero() {
            let other = &n / &d;
            if other != d {
                large.push(other);
            }
            small.push(d.clone());
        }
        d += 1u32;
    }
    large.reverse();
    small.extend(large);
    Ok(small)
}
