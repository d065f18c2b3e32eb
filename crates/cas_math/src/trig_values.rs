//! Exact values of `cos(q*pi)` for rational `q`.
//!
//! Every angle is reduced into `[0, pi/2]` together with a sign so that
//! equal cosines always produce the same atom.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Zero};

/// Closed form of a reduced cosine (before the sign is applied).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CosForm {
    Zero,
    One,
    /// `1/2`
    Half,
    /// `sqrt(2)/2`
    HalfSqrt2,
    /// `sqrt(3)/2`
    HalfSqrt3,
    /// `cos(r*pi)` with `0 < r < 1/2` and no table entry.
    Residual(BigRational),
}

/// `cos(q*pi) = sign * form`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReducedCos {
    pub negative: bool,
    pub form: CosForm,
}

fn ratio(n: i64, d: i64) -> BigRational {
    BigRational::new(BigInt::from(n), BigInt::from(d))
}

/// Reduce `cos(q*pi)` using periodicity, parity and `cos(pi - t) = -cos(t)`.
pub fn reduce_cos_of_rational_pi(q: &BigRational) -> ReducedCos {
    let two = ratio(2, 1);
    // r = q mod 2, in [0, 2)
    let mut r = q - &two * (q / &two).floor();
    if r > BigRational::one() {
        r = &two - r;
    }
    let half = ratio(1, 2);
    let mut negative = false;
    if r > half {
        r = BigRational::one() - r;
        negative = true;
    }

    let form = if r.is_zero() {
        CosForm::One
    } else if r == half {
        CosForm::Zero
    } else if r == ratio(1, 3) {
        CosForm::Half
    } else if r == ratio(1, 4) {
        CosForm::HalfSqrt2
    } else if r == ratio(1, 6) {
        CosForm::HalfSqrt3
    } else {
        CosForm::Residual(r)
    };

    ReducedCos { negative, form }
}

/// `sin(q*pi) = cos((1/2 - q)*pi)`.
pub fn reduce_sin_of_rational_pi(q: &BigRational) -> ReducedCos {
    reduce_cos_of_rational_pi(&(ratio(1, 2) - q))
}
